use crate::error::Result;
use crate::provider::{GenerationConstraints, TextProvider};
use crate::similarity::cosine_similarity;
use async_trait::async_trait;
use ndarray::Array1;
use sha2::{Digest, Sha256};

const DEFAULT_DIMENSION: usize = 256;

/// Deterministic offline provider.
///
/// Embeddings are feature-hashed bags of words: each token is hashed with
/// sha2 into a bucket of a fixed-dimension vector, then the vector is
/// L2-normalized. Token overlap therefore dominates cosine similarity, which
/// is exactly the signal the meaning-preservation check needs, and every
/// call is reproducible without a model.
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
        }
    }

    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = Array1::<f32>::zeros(self.dimension);
        for token in tokenize(text) {
            let bucket = token_bucket(&token, self.dimension);
            vector[bucket] += 1.0;
        }
        let norm = vector.dot(&vector).sqrt();
        if norm > f32::EPSILON {
            vector /= norm;
        }
        vector.to_vec()
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn token_bucket(token: &str, dimension: usize) -> usize {
    let digest = Sha256::digest(token.as_bytes());
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(raw) % dimension as u64) as usize
}

#[async_trait]
impl TextProvider for HashingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    async fn classify(&self, text: &str, labels: &[String]) -> Result<Vec<f32>> {
        let target = self.embed_sync(text);
        let mut scores: Vec<f32> = labels
            .iter()
            .map(|label| cosine_similarity(&target, &self.embed_sync(label)).max(0.0))
            .collect();
        let total: f32 = scores.iter().sum();
        if total <= f32::EPSILON {
            // no lexical overlap with any label: uniform distribution
            let uniform = 1.0 / labels.len().max(1) as f32;
            scores.iter_mut().for_each(|s| *s = uniform);
        } else {
            scores.iter_mut().for_each(|s| *s /= total);
        }
        Ok(scores)
    }

    async fn generate(&self, prompt: &str, constraints: &GenerationConstraints) -> Result<String> {
        log::debug!(
            "Hashing generate: prompt {} chars, {} pinned replacements",
            prompt.len(),
            constraints.required_replacements.len()
        );
        if constraints.base_text.is_empty() {
            return Ok(prompt.to_string());
        }
        let mut out = constraints.base_text.clone();
        for (original, replacement) in &constraints.required_replacements {
            if !original.is_empty() {
                out = out.replace(original.as_str(), replacement);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn embedding_is_deterministic() {
        let provider = HashingProvider::new();
        let a = provider.embed("a glistening bell").await.unwrap();
        let b = provider.embed("a glistening bell").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn token_overlap_dominates_similarity() {
        let provider = HashingProvider::new();
        let original = provider
            .embed("her voice was a glistening bell")
            .await
            .unwrap();
        let one_word_off = provider
            .embed("her voice was a smooth bell")
            .await
            .unwrap();
        let unrelated = provider.embed("quarterly revenue projections").await.unwrap();

        let near = cosine_similarity(&original, &one_word_off);
        let far = cosine_similarity(&original, &unrelated);
        assert!(near > 0.6, "near similarity was {near}");
        assert!(near > far);
    }

    #[tokio::test]
    async fn classify_returns_distribution() {
        let provider = HashingProvider::new();
        let labels = vec!["warm touch".to_string(), "loud sound".to_string()];
        let dist = provider.classify("a warm touch", &labels).await.unwrap();
        assert_eq!(dist.len(), 2);
        let total: f32 = dist.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(dist[0] > dist[1]);
    }

    #[tokio::test]
    async fn generate_applies_pinned_replacements() {
        let provider = HashingProvider::new();
        let constraints = GenerationConstraints {
            base_text: "a glistening bell".to_string(),
            required_replacements: vec![("glistening".to_string(), "smooth".to_string())],
            min_similarity: 0.6,
        };
        let out = provider.generate("rewrite", &constraints).await.unwrap();
        assert_eq!(out, "a smooth bell");
    }
}
