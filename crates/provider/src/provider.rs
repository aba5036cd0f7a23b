use crate::error::Result;
use async_trait::async_trait;

/// Constraints carried alongside a generation prompt.
///
/// The rewriter pins the replacements it has already committed to and the
/// similarity floor the output must clear; a conforming provider treats both
/// as hard requirements.
#[derive(Debug, Clone, Default)]
pub struct GenerationConstraints {
    /// Text the generation starts from.
    pub base_text: String,

    /// (original, replacement) pairs that must appear applied in the output.
    pub required_replacements: Vec<(String, String)>,

    /// Minimum semantic similarity to `base_text` the output must keep.
    pub min_similarity: f32,
}

/// Opaque text-generation/embedding service.
///
/// Implementations must surface failure (timeout, quota) as
/// [`crate::ProviderError`] rather than panicking; the core treats every
/// error as "unavailable" and falls back locally.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Embed a text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Zero-shot classification: score `text` against each label, returning
    /// a distribution in label order (non-negative, summing to 1).
    async fn classify(&self, text: &str, labels: &[String]) -> Result<Vec<f32>>;

    /// Generate text for `prompt` honoring `constraints`.
    async fn generate(&self, prompt: &str, constraints: &GenerationConstraints) -> Result<String>;
}
