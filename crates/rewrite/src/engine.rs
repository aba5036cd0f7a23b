use crate::config::EngineConfig;
use crate::decision::{Justification, RewriteDecision};
use sense_detect::SensoryExpression;
use sense_retrieval::SubstitutionCandidate;
use sense_stg::SubstitutionPath;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

struct MergedEntry {
    text: String,
    score: f32,
    justification: Justification,
}

/// Merges retrieval candidates and STG paths into one ranked list and picks
/// the substitution for a span.
///
/// One engine instance lives for one request. The consistency cache keeps
/// repeated occurrences of the same source concept mapped to the same
/// substitution for the duration of the request.
pub struct ReasoningEngine {
    config: EngineConfig,
    chosen: Mutex<HashMap<String, (String, Justification, f32)>>,
}

impl ReasoningEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            chosen: Mutex::new(HashMap::new()),
        }
    }

    /// Decide the substitution for one actionable span.
    ///
    /// `concept_key` identifies the source concept (graph concept label when
    /// the span anchors to one, normalized surface otherwise). Both sources
    /// empty yields an unresolved no-change decision.
    pub fn decide(
        &self,
        concept_key: &str,
        expression: SensoryExpression,
        candidates: &[SubstitutionCandidate],
        paths: &[SubstitutionPath],
    ) -> RewriteDecision {
        // held for the whole (synchronous) decision so concurrent spans of
        // the same concept serialize and the first decision sticks
        let mut chosen = self.chosen.lock().expect("consistency cache lock");
        if let Some((text, justification, confidence)) = chosen.get(concept_key).cloned() {
            log::debug!("Reusing decision for concept '{concept_key}'");
            return RewriteDecision::replaced(expression, text, justification, confidence);
        }

        let mut merged: Vec<MergedEntry> = Vec::with_capacity(candidates.len() + paths.len());
        for candidate in candidates {
            merged.push(MergedEntry {
                text: candidate.text.clone(),
                score: self.config.retrieval_weight * candidate.score,
                justification: Justification::Retrieval {
                    provenance: candidate.provenance.clone(),
                    score: candidate.score,
                },
            });
        }
        for path in paths {
            merged.push(MergedEntry {
                text: path.phrase.clone(),
                score: self.config.path_weight * path.score(),
                justification: Justification::Path {
                    concepts: path.concepts.clone(),
                    cost: path.cost,
                },
            });
        }

        // dedupe by text keeping the best-scored entry
        merged.sort_by(|a, b| {
            a.text.cmp(&b.text).then_with(|| {
                b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
            })
        });
        merged.dedup_by(|a, b| a.text == b.text);
        merged.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });

        let Some(top) = merged.into_iter().next() else {
            log::debug!("No justification source for '{}'", expression.surface);
            return RewriteDecision::unresolved(expression);
        };

        chosen.insert(
            concept_key.to_string(),
            (top.text.clone(), top.justification.clone(), top.score),
        );
        RewriteDecision::replaced(expression, top.text, top.justification, top.score)
    }
}
