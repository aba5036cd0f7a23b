use sense_taxonomy::Modality;
use serde::{Deserialize, Serialize};

/// A detected sensory expression. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensoryExpression {
    /// Byte offset of the span start in the original text.
    pub start: usize,

    /// Byte offset one past the span end.
    pub end: usize,

    /// Surface text of the span.
    pub surface: String,

    /// Sensory channel the span invokes.
    pub modality: Modality,

    /// Perceived intensity in [0, 1].
    pub intensity: f32,

    /// Detector confidence in [0, 1]. Orders overlap resolution and the
    /// rewriter's least-confident-first fallback.
    pub confidence: f32,
}

impl SensoryExpression {
    #[must_use]
    pub fn span_len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn overlaps(&self, other: &SensoryExpression) -> bool {
        self.start < other.end && other.start < self.end
    }
}
