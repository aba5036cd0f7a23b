use sense_taxonomy::Modality;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Rewrite aggressiveness the user has drifted toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteStyle {
    Minimal,
    Gentle,
    Full,
}

/// Preference weights over rewrite styles, renormalized after every nudge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleWeights {
    pub minimal: f32,
    pub gentle: f32,
    pub full: f32,
}

impl Default for StyleWeights {
    fn default() -> Self {
        Self {
            minimal: 0.33,
            gentle: 0.33,
            full: 0.34,
        }
    }
}

impl StyleWeights {
    /// The style with the highest weight; ties resolve toward the least
    /// aggressive style.
    #[must_use]
    pub fn preferred(&self) -> RewriteStyle {
        if self.minimal >= self.gentle && self.minimal >= self.full {
            RewriteStyle::Minimal
        } else if self.gentle >= self.full {
            RewriteStyle::Gentle
        } else {
            RewriteStyle::Full
        }
    }

    /// Shift weight toward `style` and renormalize to sum 1.
    pub fn nudge(&mut self, style: RewriteStyle, learning_rate: f32) {
        match style {
            RewriteStyle::Minimal => self.minimal += learning_rate,
            RewriteStyle::Gentle => self.gentle += learning_rate,
            RewriteStyle::Full => self.full += learning_rate,
        }
        let total = self.minimal + self.gentle + self.full;
        if total > f32::EPSILON {
            self.minimal /= total;
            self.gentle /= total;
            self.full /= total;
        }
    }
}

/// Per-user sensory accessibility profile.
///
/// Read by the scorer, the retriever and the traversal; mutated only through
/// memory updates. Excluded modalities are the hard constraint: substitution
/// paths must never land on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityFingerprint {
    /// Sensitivity weight per modality in [0, 1]. Missing entries read 0.
    pub sensitivity: BTreeMap<Modality, f32>,

    /// Modalities the user cannot process at all.
    pub excluded: BTreeSet<Modality>,

    /// Ordered cultural-context tags, most salient first.
    pub cultural_tags: Vec<String>,

    /// Rewrite-style preference weights.
    #[serde(default)]
    pub style: StyleWeights,
}

impl Default for AccessibilityFingerprint {
    fn default() -> Self {
        Self {
            sensitivity: BTreeMap::new(),
            excluded: BTreeSet::new(),
            cultural_tags: Vec::new(),
            style: StyleWeights::default(),
        }
    }
}

impl AccessibilityFingerprint {
    /// Effective sensitivity for a modality; excluded modalities saturate
    /// at 1.0 so their spans are always actionable.
    #[must_use]
    pub fn sensitivity(&self, modality: Modality) -> f32 {
        if self.excluded.contains(&modality) {
            return 1.0;
        }
        self.sensitivity
            .get(&modality)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_excluded(&self, modality: Modality) -> bool {
        self.excluded.contains(&modality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn excluded_modality_saturates_sensitivity() {
        let mut fingerprint = AccessibilityFingerprint::default();
        fingerprint.excluded.insert(Modality::Auditory);
        assert_eq!(fingerprint.sensitivity(Modality::Auditory), 1.0);
        assert_eq!(fingerprint.sensitivity(Modality::Visual), 0.0);
    }

    #[test]
    fn style_nudge_renormalizes() {
        let mut weights = StyleWeights::default();
        weights.nudge(RewriteStyle::Gentle, 0.05);
        let total = weights.minimal + weights.gentle + weights.full;
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(weights.preferred(), RewriteStyle::Gentle);
    }

    #[test]
    fn default_prefers_full() {
        assert_eq!(StyleWeights::default().preferred(), RewriteStyle::Full);
    }
}
