use sense_taxonomy::Modality;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sensory/cultural concept. Immutable reference data loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptNode {
    /// Stable concept label, e.g. `visual-shine`.
    pub concept: String,

    pub modality: Modality,

    /// Plain-language rendering used as the substitution text when a path
    /// lands on this node.
    pub phrase: String,

    /// Surface forms that anchor a source expression to this node.
    #[serde(default)]
    pub surfaces: Vec<String>,

    /// Cultural-salience weight per culture tag.
    #[serde(default)]
    pub salience: BTreeMap<String, f32>,
}

impl ConceptNode {
    /// Highest salience weight among the given tags (0 when none match).
    #[must_use]
    pub fn salience_for(&self, tags: &[String]) -> f32 {
        tags.iter()
            .filter_map(|tag| self.salience.get(tag))
            .fold(0.0f32, |acc, &w| acc.max(w))
    }
}

/// Directed weighted transformation between two concepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TranslationEdge {
    /// How far apart the two concepts sit semantically.
    pub semantic_distance: f32,

    /// Penalty for crossing into a different modality.
    pub cross_modal_penalty: f32,

    /// Penalty applied when the target concept is culturally unfamiliar.
    #[serde(default)]
    pub cultural_mismatch: f32,
}

/// Ordered edge sequence from a source concept to a candidate target, with
/// aggregated cost. Produced per traversal call; never persisted.
#[derive(Debug, Clone)]
pub struct SubstitutionPath {
    /// Concept labels along the path, source first.
    pub concepts: Vec<String>,

    pub target_concept: String,
    pub target_modality: Modality,

    /// Substitution text the target node renders to.
    pub phrase: String,

    pub cost: f32,
    pub hops: usize,
}

impl SubstitutionPath {
    /// Lower cost maps to a higher score in (0, 1].
    #[must_use]
    pub fn score(&self) -> f32 {
        1.0 / (1.0 + self.cost.max(0.0))
    }
}
