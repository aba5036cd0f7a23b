use crate::error::{GraphError, Result};
use crate::seed::StgSeed;
use crate::types::{ConceptNode, TranslationEdge};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// The Sensory Translation Graph.
///
/// Built once from seed data; never mutated at request time, so concurrent
/// reads need no lock. Nodes live in petgraph's arena with integer indices.
pub struct SensoryGraph {
    graph: DiGraph<ConceptNode, TranslationEdge>,
    concept_index: HashMap<String, NodeIndex>,
    surface_index: HashMap<String, NodeIndex>,
}

impl SensoryGraph {
    pub fn from_seed(seed: StgSeed) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut concept_index = HashMap::new();
        let mut surface_index = HashMap::new();

        for seed_node in seed.nodes {
            if concept_index.contains_key(&seed_node.concept) {
                return Err(GraphError::DuplicateConcept(seed_node.concept));
            }
            let node = ConceptNode {
                concept: seed_node.concept.clone(),
                modality: seed_node.modality,
                phrase: seed_node.phrase,
                surfaces: seed_node.surfaces,
                salience: seed_node.salience,
            };
            let surfaces = node.surfaces.clone();
            let idx = graph.add_node(node);
            concept_index.insert(seed_node.concept, idx);
            for surface in surfaces {
                surface_index.entry(surface.to_lowercase()).or_insert(idx);
            }
        }

        for seed_edge in seed.edges {
            let from = *concept_index
                .get(&seed_edge.from)
                .ok_or_else(|| GraphError::UnknownConcept(seed_edge.from.clone()))?;
            let to = *concept_index
                .get(&seed_edge.to)
                .ok_or_else(|| GraphError::UnknownConcept(seed_edge.to.clone()))?;
            graph.add_edge(
                from,
                to,
                TranslationEdge {
                    semantic_distance: seed_edge.semantic_distance,
                    cross_modal_penalty: seed_edge.cross_modal_penalty,
                    cultural_mismatch: seed_edge.cultural_mismatch,
                },
            );
        }

        log::info!(
            "Built STG: {} concepts, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Self {
            graph,
            concept_index,
            surface_index,
        })
    }

    /// Resolve the node anchoring a source expression: exact concept label
    /// first, then surface-form lookup (case-insensitive).
    #[must_use]
    pub fn find_source(&self, surface: &str) -> Option<NodeIndex> {
        let normalized = surface.trim().to_lowercase();
        self.concept_index
            .get(normalized.as_str())
            .or_else(|| self.surface_index.get(normalized.as_str()))
            .copied()
    }

    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> Option<&ConceptNode> {
        self.graph.node_weight(idx)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn inner(&self) -> &DiGraph<ConceptNode, TranslationEdge> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sense_taxonomy::Modality;

    #[test]
    fn builtin_seed_builds() {
        let graph = SensoryGraph::from_seed(StgSeed::builtin()).unwrap();
        assert!(graph.node_count() >= 6);
        assert!(graph.edge_count() >= graph.node_count());
    }

    #[test]
    fn surfaces_resolve_case_insensitively() {
        let graph = SensoryGraph::from_seed(StgSeed::builtin()).unwrap();
        let idx = graph.find_source("Glistening").unwrap();
        let node = graph.node(idx).unwrap();
        assert_eq!(node.concept, "visual-shine");
        assert_eq!(node.modality, Modality::Visual);
    }

    #[test]
    fn dangling_edge_is_rejected() {
        let mut seed = StgSeed::builtin();
        seed.edges.push(crate::seed::SeedEdge {
            from: "visual-shine".to_string(),
            to: "no-such-concept".to_string(),
            semantic_distance: 0.1,
            cross_modal_penalty: 0.0,
            cultural_mismatch: 0.0,
        });
        assert!(matches!(
            SensoryGraph::from_seed(seed),
            Err(GraphError::UnknownConcept(_))
        ));
    }

    #[test]
    fn duplicate_concept_is_rejected() {
        let mut seed = StgSeed::builtin();
        let first = seed.nodes[0].clone();
        seed.nodes.push(first);
        assert!(matches!(
            SensoryGraph::from_seed(seed),
            Err(GraphError::DuplicateConcept(_))
        ));
    }
}
