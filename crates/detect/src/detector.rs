use crate::error::{DetectError, Result};
use crate::expression::SensoryExpression;
use regex::{Regex, RegexBuilder};
use sense_taxonomy::{cultural_emphasis, idioms, intensity_score, keyword_modality, Idiom};
use serde::Deserialize;
use std::cmp::Ordering;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Maximum accepted input size in bytes.
    pub max_input_bytes: usize,

    /// Tokens of context inspected on each side for intensity markers.
    pub context_window: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 64 * 1024,
            context_window: 3,
        }
    }
}

/// Scans text and tags spans with a modality, intensity and confidence.
pub struct SensoryDetector {
    config: DetectorConfig,
    idiom_patterns: Vec<(Regex, &'static Idiom)>,
}

struct Token<'a> {
    start: usize,
    end: usize,
    surface: &'a str,
    lemma: String,
}

impl SensoryDetector {
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        let idiom_patterns = idioms()
            .iter()
            .map(|idiom| {
                let pattern = RegexBuilder::new(&regex::escape(idiom.phrase))
                    .case_insensitive(true)
                    .build()
                    .expect("escaped idiom phrase is a valid pattern");
                (pattern, idiom)
            })
            .collect();
        Self {
            config,
            idiom_patterns,
        }
    }

    /// Detect sensory spans in `text`, ordered by start offset and
    /// non-overlapping.
    ///
    /// Fails only for empty or oversized input. Text without sensory
    /// language yields an empty sequence.
    pub fn detect(&self, text: &str, cultural_tags: &[String]) -> Result<Vec<SensoryExpression>> {
        if text.trim().is_empty() {
            return Err(DetectError::EmptyInput);
        }
        if text.len() > self.config.max_input_bytes {
            return Err(DetectError::InputTooLong {
                len: text.len(),
                max: self.config.max_input_bytes,
            });
        }

        let mut candidates = Vec::new();
        self.match_idioms(text, cultural_tags, &mut candidates);
        self.match_tokens(text, cultural_tags, &mut candidates);

        let spans = resolve_overlaps(candidates);
        log::debug!("Detected {} sensory spans", spans.len());
        Ok(spans)
    }

    fn match_idioms(
        &self,
        text: &str,
        cultural_tags: &[String],
        out: &mut Vec<SensoryExpression>,
    ) {
        for (pattern, idiom) in &self.idiom_patterns {
            for found in pattern.find_iter(text) {
                let emphasis = cultural_emphasis(idiom.modality, cultural_tags);
                out.push(SensoryExpression {
                    start: found.start(),
                    end: found.end(),
                    surface: found.as_str().to_string(),
                    modality: idiom.modality,
                    intensity: idiom.intensity,
                    confidence: (0.75 * emphasis).clamp(0.0, 1.0),
                });
            }
        }
    }

    fn match_tokens(&self, text: &str, cultural_tags: &[String], out: &mut Vec<SensoryExpression>) {
        let tokens: Vec<Token<'_>> = text
            .split_word_bound_indices()
            .filter(|(_, word)| word.chars().any(char::is_alphanumeric))
            .map(|(start, word)| Token {
                start,
                end: start + word.len(),
                surface: word,
                lemma: lemmatize(&word.to_lowercase()),
            })
            .collect();

        for (i, token) in tokens.iter().enumerate() {
            let normalized = token.surface.to_lowercase();
            let Some((modality, class)) = keyword_modality(&normalized)
                .or_else(|| keyword_modality(&token.lemma))
            else {
                continue;
            };

            // strongest intensity marker within the context window
            let window = self.config.context_window;
            let lo = i.saturating_sub(window);
            let hi = (i + window + 1).min(tokens.len());
            let marker = tokens[lo..hi]
                .iter()
                .enumerate()
                .filter(|(j, _)| lo + j != i)
                .filter_map(|(_, t)| {
                    intensity_score(&t.surface.to_lowercase()).or_else(|| intensity_score(&t.lemma))
                })
                .fold(None::<f32>, |acc, s| Some(acc.map_or(s, |a| a.max(s))));

            let intensity = marker.unwrap_or_else(|| class.base_intensity());
            let boost = marker.map_or(0.0, |s| 0.15 * s);
            let emphasis = cultural_emphasis(modality, cultural_tags);
            let confidence = (0.5 * emphasis + boost).clamp(0.0, 1.0);

            out.push(SensoryExpression {
                start: token.start,
                end: token.end,
                surface: token.surface.to_string(),
                modality,
                intensity: intensity.clamp(0.0, 1.0),
                confidence,
            });
        }
    }
}

/// Strip common English inflections before lexicon lookup.
fn lemmatize(token: &str) -> String {
    if let Some(stem) = token.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    if token.len() > 4 {
        if let Some(stem) = token.strip_suffix("ing") {
            return stem.to_string();
        }
        if let Some(stem) = token.strip_suffix("ed") {
            return stem.to_string();
        }
    }
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

/// Keep the highest-confidence span in each overlapping cluster; ties go to
/// the longer span, then the earlier start.
fn resolve_overlaps(mut candidates: Vec<SensoryExpression>) -> Vec<SensoryExpression> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.span_len().cmp(&a.span_len()))
            .then_with(|| a.start.cmp(&b.start))
    });

    let mut kept: Vec<SensoryExpression> = Vec::new();
    for candidate in candidates {
        if kept.iter().all(|existing| !existing.overlaps(&candidate)) {
            kept.push(candidate);
        }
    }
    kept.sort_by_key(|span| span.start);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use sense_taxonomy::Modality;

    fn detector() -> SensoryDetector {
        SensoryDetector::new(DetectorConfig::default())
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            detector().detect("   ", &[]),
            Err(DetectError::EmptyInput)
        ));
    }

    #[test]
    fn oversized_input_is_rejected() {
        let config = DetectorConfig {
            max_input_bytes: 8,
            ..DetectorConfig::default()
        };
        let err = SensoryDetector::new(config)
            .detect("a very loud noise", &[])
            .unwrap_err();
        assert!(matches!(err, DetectError::InputTooLong { max: 8, .. }));
    }

    #[test]
    fn non_sensory_text_yields_empty() {
        let spans = detector().detect("The committee approved the budget.", &[]).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn detects_modalities_with_offsets() {
        let text = "Her voice was a glistening bell";
        let spans = detector().detect(text, &[]).unwrap();
        let surfaces: Vec<(&str, Modality)> = spans
            .iter()
            .map(|s| (s.surface.as_str(), s.modality))
            .collect();
        assert_eq!(
            surfaces,
            vec![
                ("voice", Modality::Auditory),
                ("glistening", Modality::Visual),
                ("bell", Modality::Auditory),
            ]
        );
        for span in &spans {
            assert_eq!(&text[span.start..span.end], span.surface);
        }
    }

    #[test]
    fn idiom_wins_over_constituent_tokens() {
        let spans = detector()
            .detect("That remark was a slap in the face.", &[])
            .unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].surface, "a slap in the face");
        assert_eq!(spans[0].modality, Modality::Tactile);
    }

    #[test]
    fn intensity_marker_raises_intensity() {
        let quiet = detector().detect("a ringing sound", &[]).unwrap();
        let loud = detector().detect("a deafening ringing sound", &[]).unwrap();
        let quiet_ring = quiet.iter().find(|s| s.surface == "ringing").unwrap();
        let loud_ring = loud.iter().find(|s| s.surface == "ringing").unwrap();
        assert!(loud_ring.intensity > quiet_ring.intensity);
        assert!(loud_ring.confidence > quiet_ring.confidence);
    }

    #[test]
    fn inflected_forms_match_via_lemma() {
        let spans = detector().detect("The lights glistened on the water", &[]).unwrap();
        assert!(spans.iter().any(|s| s.surface == "glistened"));
    }

    proptest! {
        #[test]
        fn spans_are_ordered_and_disjoint(text in "[ a-zA-Z]{1,200}") {
            let Ok(spans) = detector().detect(&text, &[]) else {
                return Ok(());
            };
            for pair in spans.windows(2) {
                prop_assert!(pair[0].start <= pair[1].start);
                prop_assert!(pair[0].end <= pair[1].start);
            }
            for span in &spans {
                prop_assert_eq!(&text[span.start..span.end], span.surface.as_str());
            }
        }
    }
}
