use crate::modality::Modality;

/// Built-in modality emphasis modifiers for a handful of cultural tags.
///
/// Values multiply the modality base weight; unknown tags fall back to 1.0.
/// Deployments carry richer salience data on corpus documents and graph
/// nodes, so this table only needs to cover broad defaults.
const TAG_MODIFIERS: &[(&str, [f32; 6])] = &[
    // order follows Modality::ALL
    ("culture:us", [1.0, 0.95, 0.9, 0.8, 0.85, 0.9]),
    ("culture:jp", [0.95, 0.9, 0.7, 0.85, 0.9, 0.85]),
    ("culture:mx", [0.9, 1.0, 0.95, 0.95, 1.0, 0.9]),
];

/// Modifier a single tag applies to a modality (1.0 when the tag is unknown).
#[must_use]
pub fn tag_modifier(tag: &str, modality: Modality) -> f32 {
    let idx = Modality::ALL
        .iter()
        .position(|&m| m == modality)
        .unwrap_or(0);
    TAG_MODIFIERS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(tag))
        .map_or(1.0, |(_, weights)| weights[idx])
}

/// Cultural emphasis for a modality given the profile's ordered tags.
///
/// The first tag with a known modifier wins, mirroring the tags' priority
/// ordering; with no recognized tag the modality base weight stands alone.
#[must_use]
pub fn cultural_emphasis(modality: Modality, tags: &[String]) -> f32 {
    let modifier = tags
        .iter()
        .map(|tag| tag_modifier(tag, modality))
        .find(|&m| (m - 1.0).abs() > f32::EPSILON)
        .unwrap_or(1.0);
    modality.base_weight() * modifier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_is_neutral() {
        assert_eq!(tag_modifier("culture:zz", Modality::Visual), 1.0);
    }

    #[test]
    fn first_recognized_tag_wins() {
        let tags = vec!["culture:zz".to_string(), "culture:jp".to_string()];
        let emphasis = cultural_emphasis(Modality::Tactile, &tags);
        assert!((emphasis - 0.8 * 0.7).abs() < 1e-6);
    }

    #[test]
    fn no_tags_yields_base_weight() {
        assert_eq!(cultural_emphasis(Modality::Visual, &[]), 0.9);
    }
}
