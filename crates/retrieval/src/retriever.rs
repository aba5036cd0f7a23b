use crate::cache::TtlCache;
use crate::corpus::{MetaphorCorpus, MetaphorDoc};
use sense_provider::{cosine_similarity, TextProvider};
use sense_taxonomy::{modality_lexicon, Modality};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum candidates returned per span.
    pub top_k: usize,

    /// Score multiplier when doc provenance is disjoint from the user tags.
    pub mismatch_factor: f32,

    /// Score multiplier for docs without provenance tags.
    pub neutral_factor: f32,

    /// Maximum expansion queries per retrieval.
    pub expansion_limit: usize,

    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 8,
            mismatch_factor: 0.5,
            neutral_factor: 0.8,
            expansion_limit: 6,
            cache_capacity: 256,
            cache_ttl_secs: 300,
        }
    }
}

/// A retrieved alternative expression, ranked by blended score.
#[derive(Debug, Clone, Serialize)]
pub struct SubstitutionCandidate {
    pub text: String,
    pub modality: Modality,
    /// Cultural provenance tags of the source document.
    pub provenance: Vec<String>,
    /// Blended score: similarity × cultural match × modality affinity.
    pub score: f32,
}

struct IndexedDoc {
    doc: MetaphorDoc,
    vector: Option<Vec<f32>>,
    /// Zero-shot affinity between the doc text and its tagged modality.
    affinity: f32,
}

/// Retrieves and reranks alternative expressions from the corpus index.
pub struct MetaphorRetriever {
    provider: Arc<dyn TextProvider>,
    config: RetrievalConfig,
    docs: Vec<IndexedDoc>,
    cache: Mutex<TtlCache>,
}

impl MetaphorRetriever {
    /// Embed and classify the corpus once. Docs the provider fails on stay
    /// in the index without a vector and are invisible to queries.
    pub async fn build(
        provider: Arc<dyn TextProvider>,
        corpus: &MetaphorCorpus,
        config: RetrievalConfig,
    ) -> Self {
        let labels: Vec<String> = Modality::ALL.iter().map(|m| modality_label(*m)).collect();
        let mut docs = Vec::with_capacity(corpus.len());
        for doc in corpus.docs() {
            let vector = match provider.embed(&doc.text).await {
                Ok(vector) => Some(vector),
                Err(err) => {
                    log::warn!("Failed to embed corpus doc '{}': {err}", doc.id);
                    None
                }
            };
            let affinity = match provider.classify(&doc.text, &labels).await {
                Ok(dist) => Modality::ALL
                    .iter()
                    .position(|&m| m == doc.modality)
                    .and_then(|idx| dist.get(idx).copied())
                    .unwrap_or(0.5),
                Err(_) => 0.5,
            };
            docs.push(IndexedDoc {
                doc: doc.clone(),
                vector,
                affinity,
            });
        }
        log::info!(
            "Indexed {} corpus docs ({} embedded)",
            docs.len(),
            docs.iter().filter(|d| d.vector.is_some()).count()
        );

        let cache = Mutex::new(TtlCache::new(
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        ));
        Self {
            provider,
            config,
            docs,
            cache,
        }
    }

    /// Retrieve ranked candidates for an actionable span.
    ///
    /// Returns an empty sequence when the provider is unavailable or nothing
    /// clears the score floor; both are recoverable states for the caller.
    pub async fn retrieve(
        &self,
        surface: &str,
        modality: Modality,
        cultural_tags: &[String],
        excluded: &BTreeSet<Modality>,
    ) -> Vec<SubstitutionCandidate> {
        let cache_key = cache_key(surface, cultural_tags, excluded);
        if let Some(hit) = self.cache.lock().expect("cache lock").get(&cache_key) {
            log::debug!("Retrieval cache hit for '{surface}'");
            return hit;
        }

        let queries = self.expand_query(surface, modality, excluded);
        let mut query_vectors = Vec::with_capacity(queries.len());
        for query in &queries {
            match self.provider.embed(query).await {
                Ok(vector) => query_vectors.push(vector),
                Err(err) => {
                    log::warn!("Retrieval provider unavailable for '{surface}': {err}");
                    return Vec::new();
                }
            }
        }

        let mut candidates: Vec<SubstitutionCandidate> = self
            .docs
            .iter()
            .filter(|indexed| !excluded.contains(&indexed.doc.modality))
            .filter_map(|indexed| {
                let vector = indexed.vector.as_ref()?;
                let similarity = query_vectors
                    .iter()
                    .map(|q| cosine_similarity(q, vector))
                    .fold(0.0f32, f32::max);
                if similarity <= 0.0 {
                    return None;
                }
                let cultural = self.cultural_match(&indexed.doc, cultural_tags);
                let score = similarity * cultural * (0.5 + 0.5 * indexed.affinity);
                Some(SubstitutionCandidate {
                    text: indexed.doc.text.clone(),
                    modality: indexed.doc.modality,
                    provenance: indexed.doc.tags.clone(),
                    score,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        candidates.truncate(self.config.top_k);

        log::debug!("Retrieved {} candidates for '{surface}'", candidates.len());
        self.cache
            .lock()
            .expect("cache lock")
            .put(cache_key, candidates.clone());
        candidates
    }

    /// Expand a span into queries biased toward the modalities the user can
    /// process: the raw surface first, then one bag-of-lexemes query per
    /// accessible modality.
    fn expand_query(
        &self,
        surface: &str,
        modality: Modality,
        excluded: &BTreeSet<Modality>,
    ) -> Vec<String> {
        let mut queries = vec![surface.to_lowercase()];
        for target in Modality::ALL {
            if queries.len() >= self.config.expansion_limit {
                break;
            }
            if target == modality || excluded.contains(&target) {
                continue;
            }
            queries.push(format!("{} {}", surface.to_lowercase(), modality_label(target)));
        }
        queries
    }

    fn cultural_match(&self, doc: &MetaphorDoc, cultural_tags: &[String]) -> f32 {
        if doc.tags.is_empty() {
            return self.config.neutral_factor;
        }
        let overlaps = doc
            .tags
            .iter()
            .any(|tag| cultural_tags.iter().any(|t| t.eq_ignore_ascii_case(tag)));
        if overlaps {
            1.0
        } else {
            self.config.mismatch_factor
        }
    }
}

/// Bag of lexemes describing a modality, used for zero-shot labels and
/// cross-modal query expansion.
fn modality_label(modality: Modality) -> String {
    let block = modality_lexicon(modality);
    let mut parts: Vec<&str> = Vec::new();
    parts.extend(block.keywords.iter().copied());
    parts.extend(block.adjectives.iter().copied());
    parts.join(" ")
}

fn cache_key(surface: &str, tags: &[String], excluded: &BTreeSet<Modality>) -> String {
    let excluded: Vec<&str> = excluded.iter().map(|m| m.as_str()).collect();
    format!(
        "{}|{}|{}",
        surface.to_lowercase(),
        tags.join(","),
        excluded.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use sense_provider::{GenerationConstraints, HashingProvider, ProviderError};

    struct DownProvider;

    #[async_trait]
    impl TextProvider for DownProvider {
        async fn embed(&self, _text: &str) -> sense_provider::Result<Vec<f32>> {
            Err(ProviderError::Unavailable("quota exhausted".to_string()))
        }

        async fn classify(
            &self,
            _text: &str,
            _labels: &[String],
        ) -> sense_provider::Result<Vec<f32>> {
            Err(ProviderError::Unavailable("quota exhausted".to_string()))
        }

        async fn generate(
            &self,
            _prompt: &str,
            _constraints: &GenerationConstraints,
        ) -> sense_provider::Result<String> {
            Err(ProviderError::Unavailable("quota exhausted".to_string()))
        }
    }

    async fn retriever() -> MetaphorRetriever {
        MetaphorRetriever::build(
            Arc::new(HashingProvider::new()),
            &MetaphorCorpus::builtin(),
            RetrievalConfig::default(),
        )
        .await
    }

    #[tokio::test]
    async fn retrieves_accessible_modality_candidates() {
        let retriever = retriever().await;
        let tags = vec!["culture:A".to_string()];
        let excluded = BTreeSet::from([Modality::Visual]);
        let candidates = retriever
            .retrieve("glistening", Modality::Visual, &tags, &excluded)
            .await;

        assert!(!candidates.is_empty());
        for candidate in &candidates {
            assert_ne!(candidate.modality, Modality::Visual);
        }
        // culture:A tactile docs outrank mismatched-provenance docs
        assert_eq!(candidates[0].modality, Modality::Tactile);
        assert!(candidates[0].provenance.contains(&"culture:A".to_string()));
    }

    #[tokio::test]
    async fn excluded_modalities_are_filtered() {
        let retriever = retriever().await;
        let excluded = BTreeSet::from([Modality::Auditory]);
        let candidates = retriever
            .retrieve("ringing", Modality::Auditory, &[], &excluded)
            .await;
        for candidate in &candidates {
            assert_ne!(candidate.modality, Modality::Auditory);
        }
    }

    #[tokio::test]
    async fn provider_failure_returns_empty_not_error() {
        let retriever = MetaphorRetriever::build(
            Arc::new(DownProvider),
            &MetaphorCorpus::builtin(),
            RetrievalConfig::default(),
        )
        .await;
        let candidates = retriever
            .retrieve("glistening", Modality::Visual, &[], &BTreeSet::new())
            .await;
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn repeated_queries_hit_the_cache() {
        let retriever = retriever().await;
        let first = retriever
            .retrieve("glistening", Modality::Visual, &[], &BTreeSet::new())
            .await;
        let second = retriever
            .retrieve("glistening", Modality::Visual, &[], &BTreeSet::new())
            .await;
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.score.to_bits(), b.score.to_bits());
        }
    }

    #[tokio::test]
    async fn top_k_bounds_results() {
        let retriever = MetaphorRetriever::build(
            Arc::new(HashingProvider::new()),
            &MetaphorCorpus::builtin(),
            RetrievalConfig {
                top_k: 2,
                ..RetrievalConfig::default()
            },
        )
        .await;
        let candidates = retriever
            .retrieve("glistening", Modality::Visual, &[], &BTreeSet::new())
            .await;
        assert!(candidates.len() <= 2);
    }
}
