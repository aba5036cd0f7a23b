use crate::error::Result;
use sense_taxonomy::Modality;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference data the graph is built from at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StgSeed {
    pub nodes: Vec<SeedNode>,
    pub edges: Vec<SeedEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedNode {
    pub concept: String,
    pub modality: Modality,
    pub phrase: String,
    #[serde(default)]
    pub surfaces: Vec<String>,
    #[serde(default)]
    pub salience: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedEdge {
    pub from: String,
    pub to: String,
    pub semantic_distance: f32,
    pub cross_modal_penalty: f32,
    #[serde(default)]
    pub cultural_mismatch: f32,
}

impl StgSeed {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Built-in reference seed covering all six modalities. Deployments load
    /// richer seeds from disk; this one backs tests and the CLI demo.
    #[must_use]
    pub fn builtin() -> Self {
        fn node(
            concept: &str,
            modality: Modality,
            phrase: &str,
            surfaces: &[&str],
            salience: &[(&str, f32)],
        ) -> SeedNode {
            SeedNode {
                concept: concept.to_string(),
                modality,
                phrase: phrase.to_string(),
                surfaces: surfaces.iter().map(|s| (*s).to_string()).collect(),
                salience: salience
                    .iter()
                    .map(|(tag, w)| ((*tag).to_string(), *w))
                    .collect(),
            }
        }
        fn edge(from: &str, to: &str, distance: f32, cross: f32, mismatch: f32) -> SeedEdge {
            SeedEdge {
                from: from.to_string(),
                to: to.to_string(),
                semantic_distance: distance,
                cross_modal_penalty: cross,
                cultural_mismatch: mismatch,
            }
        }

        Self {
            nodes: vec![
                node(
                    "visual-shine",
                    Modality::Visual,
                    "catching the light",
                    &["glistening", "sparkling", "shimmering", "gleaming"],
                    &[("culture:global", 0.6)],
                ),
                node(
                    "visual-bright",
                    Modality::Visual,
                    "a brilliant light",
                    &["bright", "brilliant", "dazzling"],
                    &[("culture:global", 0.7)],
                ),
                node(
                    "auditory-chime",
                    Modality::Auditory,
                    "a clear ringing tone",
                    &["bell", "chime", "ringing"],
                    &[("culture:global", 0.6)],
                ),
                node(
                    "auditory-hush",
                    Modality::Auditory,
                    "a hushed murmur",
                    &["whisper", "hush", "murmur"],
                    &[("culture:jp", 0.8)],
                ),
                node(
                    "tactile-smooth",
                    Modality::Tactile,
                    "smooth and polished to the touch",
                    &["smooth", "silky", "polished"],
                    &[("culture:A", 0.9), ("culture:global", 0.5)],
                ),
                node(
                    "tactile-warmth",
                    Modality::Tactile,
                    "a gentle warmth against the skin",
                    &["warm embrace", "warmth"],
                    &[("culture:A", 0.7), ("culture:mx", 0.8)],
                ),
                node(
                    "olfactory-fresh",
                    Modality::Olfactory,
                    "the smell of fresh rain",
                    &["fresh", "crisp scent"],
                    &[("culture:global", 0.5)],
                ),
                node(
                    "gustatory-sweet",
                    Modality::Gustatory,
                    "a honeyed sweetness",
                    &["sweet", "honeyed"],
                    &[("culture:mx", 0.9), ("culture:global", 0.5)],
                ),
                node(
                    "kinesthetic-drift",
                    Modality::Kinesthetic,
                    "a slow drifting motion",
                    &["drifting", "floating", "swaying"],
                    &[("culture:global", 0.5)],
                ),
            ],
            edges: vec![
                edge("visual-shine", "tactile-smooth", 0.4, 0.3, 0.2),
                edge("visual-shine", "visual-bright", 0.2, 0.0, 0.1),
                edge("visual-shine", "auditory-chime", 0.45, 0.3, 0.2),
                edge("visual-bright", "auditory-chime", 0.5, 0.3, 0.2),
                edge("auditory-chime", "tactile-warmth", 0.5, 0.3, 0.2),
                edge("auditory-chime", "visual-bright", 0.5, 0.3, 0.2),
                edge("auditory-hush", "tactile-warmth", 0.4, 0.3, 0.2),
                edge("tactile-warmth", "tactile-smooth", 0.3, 0.0, 0.1),
                edge("tactile-smooth", "gustatory-sweet", 0.6, 0.35, 0.2),
                edge("olfactory-fresh", "gustatory-sweet", 0.5, 0.3, 0.2),
                edge("kinesthetic-drift", "tactile-warmth", 0.5, 0.3, 0.2),
            ],
        }
    }
}
