use crate::config::{PipelineConfig, RewriteOptions};
use crate::decision::{RewriteDecision, Verdict};
use crate::engine::ReasoningEngine;
use crate::error::Result;
use crate::rewriter::ConstrainedRewriter;
use sense_detect::{SensoryDetector, SensoryExpression};
use sense_profile::{
    score_expression, AccessibilityFingerprint, AgenticMemory, FingerprintStore, Outcome,
};
use sense_provider::TextProvider;
use sense_retrieval::{MetaphorCorpus, MetaphorRetriever};
use sense_stg::{traverse, SensoryGraph, TraversalConstraints};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use unicode_segmentation::UnicodeSegmentation;

/// Result of one `rewrite` call.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteOutcome {
    pub output_text: String,
    pub decisions: Vec<RewriteDecision>,
    /// Detected, actionable spans for which no acceptable substitution was
    /// found; left unmodified in the output.
    pub unresolved: Vec<SensoryExpression>,
}

/// The assembled reasoning core. Holds only read-only shared state plus the
/// append-only memory, so one pipeline serves concurrent requests.
pub struct RewritePipeline {
    provider: Arc<dyn TextProvider>,
    graph: Arc<SensoryGraph>,
    retriever: Arc<MetaphorRetriever>,
    memory: Arc<AgenticMemory>,
    detector: SensoryDetector,
    config: PipelineConfig,
}

impl RewritePipeline {
    pub async fn new(
        provider: Arc<dyn TextProvider>,
        graph: Arc<SensoryGraph>,
        corpus: &MetaphorCorpus,
        store: Arc<dyn FingerprintStore>,
        config: PipelineConfig,
    ) -> Self {
        let retriever = Arc::new(
            MetaphorRetriever::build(Arc::clone(&provider), corpus, config.retrieval.clone())
                .await,
        );
        let memory = Arc::new(AgenticMemory::new(store, config.memory.clone()));
        let detector = SensoryDetector::new(config.detector.clone());
        Self {
            provider,
            graph,
            retriever,
            memory,
            detector,
            config,
        }
    }

    /// Access to the memory for the feedback ingestion path.
    #[must_use]
    pub fn memory(&self) -> Arc<AgenticMemory> {
        Arc::clone(&self.memory)
    }

    /// Rewrite `text` for `user_id`.
    ///
    /// Deterministic for identical inputs and a pinned provider. Fails only
    /// on malformed input or profile-storage failure; provider trouble,
    /// candidate starvation and unsatisfiable graph constraints all degrade
    /// to partially- or fully-unmodified output.
    pub async fn rewrite(
        &self,
        text: &str,
        user_id: &str,
        options: &RewriteOptions,
    ) -> Result<RewriteOutcome> {
        let mut fingerprint = self.memory.effective_fingerprint(user_id).await?;
        if let Some(tags) = &options.cultural_tags {
            fingerprint.cultural_tags = tags.clone();
        }

        let spans = self.detector.detect(text, &fingerprint.cultural_tags)?;
        if spans.is_empty() {
            return Ok(RewriteOutcome {
                output_text: text.to_string(),
                decisions: Vec::new(),
                unresolved: Vec::new(),
            });
        }
        log::info!("Detected {} sensory spans for user {user_id}", spans.len());

        let mut decisions = self.decide_spans(&spans, &fingerprint, options).await;
        let output_text = self.rewrite_sentences(text, &mut decisions, options).await;

        let unresolved: Vec<SensoryExpression> = decisions
            .iter()
            .filter(|d| d.is_unresolved())
            .map(|d| d.expression.clone())
            .collect();

        self.append_memory(user_id, &decisions).await;

        Ok(RewriteOutcome {
            output_text,
            decisions,
            unresolved,
        })
    }

    /// Fan actionable spans out as independent work units; reassembly is
    /// keyed by span index (original offset order), never completion order.
    async fn decide_spans(
        &self,
        spans: &[SensoryExpression],
        fingerprint: &AccessibilityFingerprint,
        options: &RewriteOptions,
    ) -> Vec<RewriteDecision> {
        let threshold = options
            .difficulty_threshold
            .unwrap_or(self.config.scorer.difficulty_threshold);

        let mut traversal_config = self.config.traversal.clone();
        if let Some(max_hops) = options.max_hops {
            traversal_config.max_hops = max_hops;
        }
        let constraints = Arc::new(TraversalConstraints {
            excluded: fingerprint.excluded.clone(),
            cultural_tags: fingerprint.cultural_tags.clone(),
            penalty_factor: BTreeMap::new(),
        });
        let engine = Arc::new(ReasoningEngine::new(self.config.engine.clone()));
        let timeout = self.config.span_timeout();

        let mut actionable: Vec<(usize, SensoryExpression)> = Vec::new();
        for (idx, span) in spans.iter().enumerate() {
            let score = score_expression(span, fingerprint);
            if score.is_actionable(threshold) {
                actionable.push((idx, span.clone()));
            } else {
                log::debug!(
                    "Span '{}' below threshold ({:.3} <= {threshold:.3})",
                    span.surface,
                    score.score
                );
            }
        }

        let mut join_set = JoinSet::new();
        for (idx, span) in &actionable {
            let idx = *idx;
            let span = span.clone();
            let graph = Arc::clone(&self.graph);
            let retriever = Arc::clone(&self.retriever);
            let engine = Arc::clone(&engine);
            let constraints = Arc::clone(&constraints);
            let traversal_config = traversal_config.clone();
            let excluded = fingerprint.excluded.clone();
            let tags = fingerprint.cultural_tags.clone();

            join_set.spawn(async move {
                let (concept_key, paths) = match graph.find_source(&span.surface) {
                    Some(source) => {
                        let concept = graph
                            .node(source)
                            .map(|n| n.concept.clone())
                            .unwrap_or_else(|| span.surface.to_lowercase());
                        let paths = traverse(&graph, source, &constraints, &traversal_config);
                        (concept, paths)
                    }
                    None => (span.surface.to_lowercase(), Vec::new()),
                };

                let retrieved = tokio::time::timeout(
                    timeout,
                    retriever.retrieve(&span.surface, span.modality, &tags, &excluded),
                )
                .await;

                let decision = match retrieved {
                    Ok(candidates) => engine.decide(&concept_key, span, &candidates, &paths),
                    Err(_) => {
                        log::warn!("Span work timed out; marking unresolved");
                        RewriteDecision::unresolved(span)
                    }
                };
                (idx, decision)
            });
        }

        let mut by_idx: BTreeMap<usize, RewriteDecision> = BTreeMap::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, decision)) => {
                    by_idx.insert(idx, decision);
                }
                Err(err) => log::warn!("Span work unit failed: {err}"),
            }
        }
        // a panicked work unit degrades its span to unresolved
        for (idx, span) in &actionable {
            by_idx
                .entry(*idx)
                .or_insert_with(|| RewriteDecision::unresolved(span.clone()));
        }

        by_idx.into_values().collect()
    }

    /// Run the constrained rewriter per sentence and reassemble in original
    /// order.
    async fn rewrite_sentences(
        &self,
        text: &str,
        decisions: &mut [RewriteDecision],
        options: &RewriteOptions,
    ) -> String {
        let mut rewriter_config = self.config.rewriter.clone();
        if let Some(max_attempts) = options.max_attempts {
            rewriter_config.max_attempts = max_attempts;
        }
        let rewriter = ConstrainedRewriter::new(Arc::clone(&self.provider), rewriter_config);

        let mut output = String::with_capacity(text.len());
        for (sentence_start, sentence) in text.split_sentence_bound_indices() {
            let sentence_end = sentence_start + sentence.len();
            // decisions are ordered by span start, so each sentence owns a
            // contiguous run
            let lo = decisions
                .iter()
                .position(|d| d.expression.start >= sentence_start)
                .unwrap_or(decisions.len());
            let hi = decisions[lo..]
                .iter()
                .position(|d| d.expression.start >= sentence_end)
                .map_or(decisions.len(), |off| lo + off);

            if lo == hi {
                output.push_str(sentence);
            } else {
                let rewritten = rewriter
                    .rewrite_sentence(sentence, &mut decisions[lo..hi])
                    .await;
                output.push_str(&rewritten);
            }
        }
        output
    }

    /// Append one record per finalized decision. Write failures degrade to a
    /// warning; the response is already complete.
    async fn append_memory(&self, user_id: &str, decisions: &[RewriteDecision]) {
        for decision in decisions {
            let outcome = match (decision.verdict, decision.is_unresolved()) {
                (Verdict::Replaced, _) => Outcome::Accepted,
                (Verdict::NoChange, true) => Outcome::Unresolved,
                // reverted by the rewriter's fallback
                (Verdict::NoChange, false) => Outcome::Rejected,
            };
            if let Err(err) = self
                .memory
                .record_decision(
                    user_id,
                    &decision.expression.surface,
                    decision.expression.modality,
                    outcome,
                )
                .await
            {
                log::warn!("Memory append failed for user {user_id}: {err}");
            }
        }
    }
}
