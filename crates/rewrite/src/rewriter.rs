use crate::config::RewriterConfig;
use crate::decision::{RewriteDecision, Verdict};
use regex::{NoExpand, Regex};
use sense_provider::{cosine_similarity, GenerationConstraints, TextProvider};
use std::collections::HashSet;
use std::sync::Arc;

/// Explicit per-sentence state machine. Transition count is bounded, so the
/// rewriter always reaches `Accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceState {
    Draft,
    Validate,
    Retry,
    Fallback,
    Accept,
}

/// Applies substitution decisions to a sentence under a meaning-preservation
/// constraint.
///
/// VALIDATE failures retry generation with a tightened constraint a bounded
/// number of times, then fall back by reverting the least-confident
/// substitution first. The terminal state is always ACCEPT; worst case the
/// sentence comes back unchanged. Provider failure during validation reverts
/// the whole sentence rather than shipping an unvalidated rewrite.
pub struct ConstrainedRewriter {
    provider: Arc<dyn TextProvider>,
    config: RewriterConfig,
    capitalized: Regex,
}

impl ConstrainedRewriter {
    #[must_use]
    pub fn new(provider: Arc<dyn TextProvider>, config: RewriterConfig) -> Self {
        Self {
            provider,
            config,
            capitalized: Regex::new(r"\b[A-Z][A-Za-z0-9_]+\b").expect("static pattern"),
        }
    }

    /// Rewrite one sentence in place of its decisions. Reverted decisions
    /// are mutated to no-change; the returned string is the accepted text.
    pub async fn rewrite_sentence(
        &self,
        sentence: &str,
        decisions: &mut [RewriteDecision],
    ) -> String {
        let mut state = SentenceState::Draft;
        let mut draft = String::new();
        let mut attempts = 0usize;
        let mut transitions = 0usize;
        // Retry costs two transitions, each fallback step three (revert,
        // redraft, revalidate), plus slack for the initial pass.
        let limit = 2 * self.config.max_attempts + 3 * decisions.len() + 8;

        loop {
            transitions += 1;
            if transitions > limit {
                log::warn!("Rewriter transition limit hit; reverting sentence");
                revert_all(decisions);
                return sentence.to_string();
            }

            match state {
                SentenceState::Draft => {
                    let replacements = active_replacements(decisions);
                    if replacements.is_empty() {
                        return sentence.to_string();
                    }
                    draft = apply_replacements(sentence, &replacements);
                    state = SentenceState::Validate;
                }

                SentenceState::Validate => match self.validate(sentence, &draft).await {
                    Ok(true) => state = SentenceState::Accept,
                    Ok(false) => {
                        state = if attempts < self.config.max_attempts {
                            SentenceState::Retry
                        } else {
                            SentenceState::Fallback
                        };
                    }
                    Err(err) => {
                        log::warn!("Validation provider unavailable: {err}; reverting sentence");
                        revert_all(decisions);
                        return sentence.to_string();
                    }
                },

                SentenceState::Retry => {
                    attempts += 1;
                    let tightened = (self.config.similarity_floor + 0.1 * attempts as f32)
                        .min(0.95);
                    let constraints = GenerationConstraints {
                        base_text: sentence.to_string(),
                        required_replacements: active_replacements(decisions),
                        min_similarity: tightened,
                    };
                    let prompt = format!(
                        "Rewrite the sentence applying the required substitutions while \
                         keeping the meaning (similarity at least {tightened:.2}): {sentence}"
                    );
                    match self.provider.generate(&prompt, &constraints).await {
                        Ok(text) => {
                            draft = text;
                            state = SentenceState::Validate;
                        }
                        Err(err) => {
                            log::warn!("Generation unavailable on retry: {err}");
                            state = SentenceState::Fallback;
                        }
                    }
                }

                SentenceState::Fallback => {
                    match least_confident(decisions) {
                        Some(idx) => {
                            log::debug!(
                                "Reverting substitution for '{}' (confidence {:.3})",
                                decisions[idx].expression.surface,
                                decisions[idx].confidence
                            );
                            decisions[idx].revert();
                            state = SentenceState::Draft;
                        }
                        None => return sentence.to_string(),
                    }
                }

                SentenceState::Accept => return draft,
            }
        }
    }

    async fn validate(&self, original: &str, draft: &str) -> sense_provider::Result<bool> {
        if !self.entities_preserved(original, draft) {
            log::debug!("Named entities not preserved in draft");
            return Ok(false);
        }
        let original_vec = self.provider.embed(original).await?;
        let draft_vec = self.provider.embed(draft).await?;
        let similarity = cosine_similarity(&original_vec, &draft_vec);
        log::debug!(
            "Draft similarity {similarity:.3} (floor {:.3})",
            self.config.similarity_floor
        );
        Ok(similarity >= self.config.similarity_floor)
    }

    /// Capitalized tokens of the original (sentence-initial word excluded)
    /// must survive the rewrite.
    fn entities_preserved(&self, original: &str, draft: &str) -> bool {
        let originals = self.capitalized_tokens(original);
        if originals.is_empty() {
            return true;
        }
        let drafted = self.capitalized_tokens(draft);
        originals.is_subset(&drafted)
    }

    fn capitalized_tokens(&self, text: &str) -> HashSet<String> {
        let first_word_start = text.len() - text.trim_start().len();
        self.capitalized
            .find_iter(text)
            .filter(|m| m.start() != first_word_start)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

fn active_replacements(decisions: &[RewriteDecision]) -> Vec<(String, String)> {
    decisions
        .iter()
        .filter(|d| d.verdict == Verdict::Replaced)
        .filter_map(|d| {
            d.replacement
                .as_ref()
                .map(|r| (d.expression.surface.clone(), r.clone()))
        })
        .collect()
}

fn least_confident(decisions: &[RewriteDecision]) -> Option<usize> {
    decisions
        .iter()
        .enumerate()
        .filter(|(_, d)| d.verdict == Verdict::Replaced)
        .min_by(|(_, a), (_, b)| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
}

fn revert_all(decisions: &mut [RewriteDecision]) {
    for decision in decisions.iter_mut() {
        if decision.verdict == Verdict::Replaced {
            decision.revert();
        }
    }
}

/// Word-boundary-aware, case-insensitive replacement; avoids partial matches
/// inside other words.
fn apply_replacements(text: &str, replacements: &[(String, String)]) -> String {
    let mut out = text.to_string();
    for (original, replacement) in replacements {
        if original.is_empty() {
            continue;
        }
        let pattern = format!(r"(?i)\b{}\b", regex::escape(original));
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        out = re.replace_all(&out, NoExpand(replacement)).into_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Justification;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use sense_detect::SensoryExpression;
    use sense_provider::{HashingProvider, ProviderError};
    use sense_taxonomy::Modality;

    struct DownProvider;

    #[async_trait]
    impl TextProvider for DownProvider {
        async fn embed(&self, _text: &str) -> sense_provider::Result<Vec<f32>> {
            Err(ProviderError::Unavailable("down".to_string()))
        }

        async fn classify(
            &self,
            _text: &str,
            _labels: &[String],
        ) -> sense_provider::Result<Vec<f32>> {
            Err(ProviderError::Unavailable("down".to_string()))
        }

        async fn generate(
            &self,
            _prompt: &str,
            _constraints: &GenerationConstraints,
        ) -> sense_provider::Result<String> {
            Err(ProviderError::Unavailable("down".to_string()))
        }
    }

    fn decision(text: &str, surface: &str, replacement: &str, confidence: f32) -> RewriteDecision {
        let start = text.find(surface).unwrap();
        RewriteDecision::replaced(
            SensoryExpression {
                start,
                end: start + surface.len(),
                surface: surface.to_string(),
                modality: Modality::Visual,
                intensity: 0.6,
                confidence,
            },
            replacement.to_string(),
            Justification::Path {
                concepts: vec!["visual-shine".to_string()],
                cost: 0.5,
            },
            confidence,
        )
    }

    fn rewriter(floor: f32, max_attempts: usize) -> ConstrainedRewriter {
        ConstrainedRewriter::new(
            Arc::new(HashingProvider::new()),
            RewriterConfig {
                similarity_floor: floor,
                max_attempts,
            },
        )
    }

    #[tokio::test]
    async fn accepts_meaning_preserving_replacement() {
        let sentence = "her voice was a glistening bell";
        let mut decisions = vec![decision(sentence, "glistening", "gleaming", 0.8)];
        let out = rewriter(0.6, 3)
            .rewrite_sentence(sentence, &mut decisions)
            .await;
        assert_eq!(out, "her voice was a gleaming bell");
        assert_eq!(decisions[0].verdict, Verdict::Replaced);
    }

    #[tokio::test]
    async fn no_active_decisions_returns_original() {
        let sentence = "nothing sensory here";
        let mut decisions: Vec<RewriteDecision> = Vec::new();
        let out = rewriter(0.6, 3)
            .rewrite_sentence(sentence, &mut decisions)
            .await;
        assert_eq!(out, sentence);
    }

    #[tokio::test]
    async fn fallback_reverts_least_confident_first() {
        let sentence = "her voice was a glistening bell";
        let mut decisions = vec![
            decision(sentence, "glistening", "gleam", 0.9),
            decision(sentence, "bell", "smooth stone warm to touch", 0.2),
        ];
        let out = rewriter(0.8, 0)
            .rewrite_sentence(sentence, &mut decisions)
            .await;
        assert_eq!(out, "her voice was a gleam bell");
        assert_eq!(decisions[0].verdict, Verdict::Replaced);
        assert_eq!(decisions[1].verdict, Verdict::NoChange);
    }

    #[tokio::test]
    async fn impossible_floor_reverts_everything() {
        let sentence = "her voice was a glistening bell";
        let mut decisions = vec![
            decision(sentence, "glistening", "entirely unrelated phrasing", 0.9),
            decision(sentence, "bell", "other unrelated words", 0.2),
        ];
        let out = rewriter(0.99, 2)
            .rewrite_sentence(sentence, &mut decisions)
            .await;
        assert_eq!(out, sentence);
        for decision in &decisions {
            assert_eq!(decision.verdict, Verdict::NoChange);
        }
    }

    #[tokio::test]
    async fn provider_outage_reverts_sentence() {
        let sentence = "her voice was a glistening bell";
        let mut decisions = vec![decision(sentence, "glistening", "gleaming", 0.8)];
        let out = ConstrainedRewriter::new(
            Arc::new(DownProvider),
            RewriterConfig::default(),
        )
        .rewrite_sentence(sentence, &mut decisions)
        .await;
        assert_eq!(out, sentence);
        assert_eq!(decisions[0].verdict, Verdict::NoChange);
    }

    #[tokio::test]
    async fn named_entities_must_survive() {
        let sentence = "The bells of Notre Dame rang";
        let mut decisions = vec![decision(
            sentence,
            "bells",
            "lights of the city",
            0.8,
        )];
        // replacement keeps "Notre Dame" so entity check passes; similarity
        // decides. Now try a replacement that would swallow the entity.
        let out = rewriter(0.4, 0)
            .rewrite_sentence(sentence, &mut decisions)
            .await;
        assert!(out.contains("Notre"));
        assert!(out.contains("Dame"));
    }

    #[tokio::test]
    async fn replacement_respects_word_boundaries() {
        let replaced = apply_replacements(
            "the bellows near the bell rang",
            &[("bell".to_string(), "chime".to_string())],
        );
        assert_eq!(replaced, "the bellows near the chime rang");
    }
}
