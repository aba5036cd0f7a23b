use crate::fingerprint::AccessibilityFingerprint;
use sense_detect::SensoryExpression;
use serde::Serialize;

/// Accessibility-difficulty score for one span. Derived per request, never
/// persisted.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DifficultyScore {
    /// Difficulty in [0, 1].
    pub score: f32,

    /// Sensitivity weight that contributed the score, for auditability.
    pub modality_weight: f32,
}

impl DifficultyScore {
    /// A span proceeds to retrieval/traversal only above the threshold.
    #[must_use]
    pub fn is_actionable(&self, threshold: f32) -> bool {
        self.score > threshold
    }
}

/// Score a span against a fingerprint: `intensity × sensitivity[modality]`,
/// clamped into [0, 1]. Deterministic; no hidden state.
#[must_use]
pub fn score_expression(
    expression: &SensoryExpression,
    fingerprint: &AccessibilityFingerprint,
) -> DifficultyScore {
    let modality_weight = fingerprint.sensitivity(expression.modality);
    let score = (expression.intensity * modality_weight).clamp(0.0, 1.0);
    DifficultyScore {
        score,
        modality_weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sense_taxonomy::Modality;

    fn expression(modality: Modality, intensity: f32) -> SensoryExpression {
        SensoryExpression {
            start: 0,
            end: 4,
            surface: "test".to_string(),
            modality,
            intensity,
            confidence: 0.5,
        }
    }

    #[test]
    fn score_is_product_of_intensity_and_sensitivity() {
        let mut fingerprint = AccessibilityFingerprint::default();
        fingerprint.sensitivity.insert(Modality::Auditory, 0.8);
        let score = score_expression(&expression(Modality::Auditory, 0.5), &fingerprint);
        assert!((score.score - 0.4).abs() < 1e-6);
        assert!((score.modality_weight - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_sensitivity_never_actionable() {
        let fingerprint = AccessibilityFingerprint::default();
        let score = score_expression(&expression(Modality::Visual, 1.0), &fingerprint);
        assert!(!score.is_actionable(0.0));
    }

    #[test]
    fn excluded_modality_is_maximally_difficult() {
        let mut fingerprint = AccessibilityFingerprint::default();
        fingerprint.excluded.insert(Modality::Visual);
        let score = score_expression(&expression(Modality::Visual, 0.6), &fingerprint);
        assert!((score.score - 0.6).abs() < 1e-6);
        assert!(score.is_actionable(0.35));
    }

    #[test]
    fn identical_inputs_identical_scores() {
        let mut fingerprint = AccessibilityFingerprint::default();
        fingerprint.sensitivity.insert(Modality::Tactile, 0.7);
        let expr = expression(Modality::Tactile, 0.9);
        let a = score_expression(&expr, &fingerprint);
        let b = score_expression(&expr, &fingerprint);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
    }
}
