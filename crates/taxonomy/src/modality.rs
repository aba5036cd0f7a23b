use serde::{Deserialize, Serialize};

/// Sensory channel a span of text invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Visual,
    Auditory,
    Tactile,
    Olfactory,
    Gustatory,
    Kinesthetic,
}

impl Modality {
    pub const ALL: [Modality; 6] = [
        Modality::Visual,
        Modality::Auditory,
        Modality::Tactile,
        Modality::Olfactory,
        Modality::Gustatory,
        Modality::Kinesthetic,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Modality::Visual => "visual",
            Modality::Auditory => "auditory",
            Modality::Tactile => "tactile",
            Modality::Olfactory => "olfactory",
            Modality::Gustatory => "gustatory",
            Modality::Kinesthetic => "kinesthetic",
        }
    }

    /// Default emphasis weight for the modality, before cultural modifiers.
    ///
    /// Also the tie-breaker when a lexeme appears under several modalities.
    #[must_use]
    pub const fn base_weight(self) -> f32 {
        match self {
            Modality::Visual => 0.9,
            Modality::Tactile => 0.8,
            Modality::Auditory => 0.7,
            Modality::Kinesthetic => 0.65,
            Modality::Olfactory => 0.6,
            Modality::Gustatory => 0.5,
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visual" => Ok(Modality::Visual),
            "auditory" => Ok(Modality::Auditory),
            "tactile" => Ok(Modality::Tactile),
            "olfactory" => Ok(Modality::Olfactory),
            "gustatory" => Ok(Modality::Gustatory),
            "kinesthetic" => Ok(Modality::Kinesthetic),
            other => Err(format!("unknown modality '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn roundtrip_via_str() {
        for modality in Modality::ALL {
            let parsed: Modality = modality.as_str().parse().unwrap();
            assert_eq!(parsed, modality);
        }
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&Modality::Olfactory).unwrap();
        assert_eq!(json, "\"olfactory\"");
    }
}
