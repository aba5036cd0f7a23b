use anyhow::{Context, Result};
use sense_detect::DetectorConfig;
use sense_profile::MemoryConfig;
use sense_retrieval::RetrievalConfig;
use sense_stg::TraversalConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Spans scoring above this proceed to retrieval/traversal.
    pub difficulty_threshold: f32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            difficulty_threshold: 0.35,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Weight on retrieval-candidate scores when merging justification
    /// sources.
    pub retrieval_weight: f32,

    /// Weight on inverse-path-cost scores.
    pub path_weight: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retrieval_weight: 0.5,
            path_weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// Minimum semantic similarity a rewritten sentence must keep to its
    /// original.
    pub similarity_floor: f32,

    /// Bounded generation retries before falling back.
    pub max_attempts: usize,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            similarity_floor: 0.6,
            max_attempts: 3,
        }
    }
}

/// Policy parameters for the whole pipeline. Tuning constants live here
/// rather than in code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub scorer: ScorerConfig,
    pub retrieval: RetrievalConfig,
    pub traversal: TraversalConfig,
    pub engine: EngineConfig,
    pub rewriter: RewriterConfig,
    pub memory: MemoryConfig,

    /// Per-span budget for provider-bound work; a span that misses it is
    /// treated as unresolved.
    pub span_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            scorer: ScorerConfig::default(),
            retrieval: RetrievalConfig::default(),
            traversal: TraversalConfig::default(),
            engine: EngineConfig::default(),
            rewriter: RewriterConfig::default(),
            memory: MemoryConfig::default(),
            span_timeout_ms: 10_000,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = std::str::from_utf8(bytes).context("config is not valid UTF-8")?;
        let config: Self = toml::from_str(raw).context("failed to parse pipeline config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.scorer.difficulty_threshold),
            "scorer.difficulty_threshold must be in [0, 1]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.rewriter.similarity_floor),
            "rewriter.similarity_floor must be in [0, 1]"
        );
        anyhow::ensure!(
            self.engine.retrieval_weight >= 0.0 && self.engine.path_weight >= 0.0,
            "engine weights must be non-negative"
        );
        Ok(())
    }

    #[must_use]
    pub fn span_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.span_timeout_ms)
    }
}

/// Per-call overrides for the tunables the operation contract exposes.
#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    pub difficulty_threshold: Option<f32>,
    pub max_hops: Option<usize>,
    pub max_attempts: Option<usize>,
    pub cultural_tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let config = PipelineConfig::from_toml_bytes(b"").unwrap();
        assert_eq!(config.scorer.difficulty_threshold, 0.35);
        assert_eq!(config.traversal.max_hops, 3);
        assert_eq!(config.rewriter.max_attempts, 3);
        assert_eq!(config.retrieval.top_k, 8);
    }

    #[test]
    fn sections_override_defaults() {
        let config = PipelineConfig::from_toml_bytes(
            br#"
            span_timeout_ms = 2500

            [scorer]
            difficulty_threshold = 0.2

            [traversal]
            max_hops = 2

            [engine]
            retrieval_weight = 0.8
            path_weight = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(config.scorer.difficulty_threshold, 0.2);
        assert_eq!(config.traversal.max_hops, 2);
        assert_eq!(config.engine.retrieval_weight, 0.8);
        assert_eq!(config.span_timeout().as_millis(), 2500);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let result = PipelineConfig::from_toml_bytes(
            br#"
            [scorer]
            difficulty_threshold = 1.5
            "#,
        );
        assert!(result.is_err());
    }
}
