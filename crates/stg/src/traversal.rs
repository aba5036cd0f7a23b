use crate::graph::SensoryGraph;
use crate::types::SubstitutionPath;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use sense_taxonomy::Modality;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashSet};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Maximum hop count from the source node.
    pub max_hops: usize,

    /// Maximum cumulative path cost.
    pub max_cost: f32,

    /// Maximum number of paths returned.
    pub max_paths: usize,

    /// Scale applied to cross-modal penalties.
    pub penalty_scale: f32,

    /// Scale applied to cultural-mismatch penalties.
    pub mismatch_scale: f32,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_hops: 3,
            max_cost: 4.0,
            max_paths: 8,
            penalty_scale: 1.0,
            mismatch_scale: 1.0,
        }
    }
}

/// Per-user constraints derived from the accessibility fingerprint.
#[derive(Debug, Clone, Default)]
pub struct TraversalConstraints {
    /// Modalities the traversal must never enter. Applies to intermediate
    /// nodes as well as destinations.
    pub excluded: BTreeSet<Modality>,

    /// Cultural tags matched against node salience.
    pub cultural_tags: Vec<String>,

    /// Extra multiplier on the cross-modal penalty per target modality.
    pub penalty_factor: BTreeMap<Modality, f32>,
}

/// Heap entry ordered so the cheapest (then fewest-hop, then
/// lexicographically smallest concept) state pops first. The label in the
/// ordering makes equal-cost expansion order reproducible.
struct State {
    cost: f32,
    hops: usize,
    concept: String,
    node: NodeIndex,
    path: Vec<NodeIndex>,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the cheapest state wins.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| other.concept.cmp(&self.concept))
    }
}

/// Constrained shortest-path search from `source`.
///
/// Every node reached within the hop and cost caps yields one
/// [`SubstitutionPath`]; results are sorted by (cost, hops, concept label).
/// An empty result means no path satisfies the constraints, which the
/// caller treats as a legitimate outcome.
#[must_use]
pub fn traverse(
    graph: &SensoryGraph,
    source: NodeIndex,
    constraints: &TraversalConstraints,
    config: &TraversalConfig,
) -> Vec<SubstitutionPath> {
    let inner = graph.inner();
    let Some(source_node) = inner.node_weight(source) else {
        return Vec::new();
    };

    let mut heap = BinaryHeap::new();
    let mut settled: HashSet<NodeIndex> = HashSet::new();
    let mut paths = Vec::new();

    heap.push(State {
        cost: 0.0,
        hops: 0,
        concept: source_node.concept.clone(),
        node: source,
        path: vec![source],
    });

    while let Some(state) = heap.pop() {
        if !settled.insert(state.node) {
            continue;
        }

        let node = &inner[state.node];
        if state.node != source {
            paths.push(SubstitutionPath {
                concepts: state
                    .path
                    .iter()
                    .map(|&idx| inner[idx].concept.clone())
                    .collect(),
                target_concept: node.concept.clone(),
                target_modality: node.modality,
                phrase: node.phrase.clone(),
                cost: state.cost,
                hops: state.hops,
            });
        }

        if state.hops >= config.max_hops {
            continue;
        }

        // deterministic expansion order by target concept label
        let mut outgoing: Vec<_> = inner
            .edges(state.node)
            .map(|edge| (edge.target(), *edge.weight()))
            .collect();
        outgoing.sort_by(|a, b| inner[a.0].concept.cmp(&inner[b.0].concept));

        for (target_idx, edge) in outgoing {
            let target = &inner[target_idx];
            if constraints.excluded.contains(&target.modality) {
                log::trace!("Skipping excluded modality node '{}'", target.concept);
                continue;
            }
            if settled.contains(&target_idx) {
                continue;
            }

            let factor = constraints
                .penalty_factor
                .get(&target.modality)
                .copied()
                .unwrap_or(1.0);
            let familiarity = target.salience_for(&constraints.cultural_tags).clamp(0.0, 1.0);
            let step = edge.semantic_distance
                + edge.cross_modal_penalty * config.penalty_scale * factor
                + edge.cultural_mismatch * config.mismatch_scale * (1.0 - familiarity);
            let cost = state.cost + step.max(0.0);
            if cost > config.max_cost {
                continue;
            }

            let mut path = state.path.clone();
            path.push(target_idx);
            heap.push(State {
                cost,
                hops: state.hops + 1,
                concept: target.concept.clone(),
                node: target_idx,
                path,
            });
        }
    }

    paths.sort_by(|a, b| {
        a.cost
            .total_cmp(&b.cost)
            .then_with(|| a.hops.cmp(&b.hops))
            .then_with(|| a.target_concept.cmp(&b.target_concept))
    });
    paths.truncate(config.max_paths);
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{SeedEdge, SeedNode, StgSeed};
    use pretty_assertions::assert_eq;

    fn builtin_graph() -> SensoryGraph {
        SensoryGraph::from_seed(StgSeed::builtin()).unwrap()
    }

    fn seed_node(concept: &str, modality: Modality) -> SeedNode {
        SeedNode {
            concept: concept.to_string(),
            modality,
            phrase: format!("{concept} phrase"),
            surfaces: Vec::new(),
            salience: BTreeMap::new(),
        }
    }

    fn seed_edge(from: &str, to: &str, distance: f32) -> SeedEdge {
        SeedEdge {
            from: from.to_string(),
            to: to.to_string(),
            semantic_distance: distance,
            cross_modal_penalty: 0.0,
            cultural_mismatch: 0.0,
        }
    }

    #[test]
    fn finds_cross_modal_path_from_surface() {
        let graph = builtin_graph();
        let source = graph.find_source("glistening").unwrap();
        let paths = traverse(
            &graph,
            source,
            &TraversalConstraints::default(),
            &TraversalConfig::default(),
        );
        assert!(!paths.is_empty());
        assert!(paths
            .iter()
            .any(|p| p.target_concept == "tactile-smooth" && p.hops == 1));
    }

    #[test]
    fn excluded_modality_is_never_entered() {
        let graph = builtin_graph();
        let source = graph.find_source("glistening").unwrap();
        let constraints = TraversalConstraints {
            excluded: BTreeSet::from([Modality::Auditory]),
            ..TraversalConstraints::default()
        };
        let paths = traverse(&graph, source, &constraints, &TraversalConfig::default());
        assert!(!paths.is_empty());
        for path in &paths {
            assert_ne!(path.target_modality, Modality::Auditory);
            assert!(!path.concepts.iter().any(|c| c.starts_with("auditory")));
        }
    }

    #[test]
    fn equal_cost_paths_resolve_lexicographically() {
        let seed = StgSeed {
            nodes: vec![
                seed_node("source", Modality::Visual),
                seed_node("target-beta", Modality::Tactile),
                seed_node("target-alpha", Modality::Tactile),
            ],
            edges: vec![
                seed_edge("source", "target-beta", 0.5),
                seed_edge("source", "target-alpha", 0.5),
            ],
        };
        let graph = SensoryGraph::from_seed(seed).unwrap();
        let source = graph.find_source("source").unwrap();

        for _ in 0..10 {
            let paths = traverse(
                &graph,
                source,
                &TraversalConstraints::default(),
                &TraversalConfig::default(),
            );
            assert_eq!(paths[0].target_concept, "target-alpha");
            assert_eq!(paths[1].target_concept, "target-beta");
        }
    }

    #[test]
    fn hop_cap_bounds_the_search() {
        let seed = StgSeed {
            nodes: vec![
                seed_node("a", Modality::Visual),
                seed_node("b", Modality::Visual),
                seed_node("c", Modality::Visual),
                seed_node("d", Modality::Visual),
                seed_node("e", Modality::Visual),
            ],
            edges: vec![
                seed_edge("a", "b", 0.1),
                seed_edge("b", "c", 0.1),
                seed_edge("c", "d", 0.1),
                seed_edge("d", "e", 0.1),
            ],
        };
        let graph = SensoryGraph::from_seed(seed).unwrap();
        let source = graph.find_source("a").unwrap();
        let paths = traverse(
            &graph,
            source,
            &TraversalConstraints::default(),
            &TraversalConfig::default(),
        );
        let targets: Vec<&str> = paths.iter().map(|p| p.target_concept.as_str()).collect();
        assert_eq!(targets, vec!["b", "c", "d"]);
    }

    #[test]
    fn cost_cap_prunes_expensive_paths() {
        let graph = builtin_graph();
        let source = graph.find_source("glistening").unwrap();
        let config = TraversalConfig {
            max_cost: 0.5,
            ..TraversalConfig::default()
        };
        let paths = traverse(&graph, source, &TraversalConstraints::default(), &config);
        for path in &paths {
            assert!(path.cost <= 0.5);
        }
    }

    #[test]
    fn dead_end_source_yields_empty_set() {
        let graph = builtin_graph();
        let source = graph.find_source("sweet").unwrap();
        let paths = traverse(
            &graph,
            source,
            &TraversalConstraints::default(),
            &TraversalConfig::default(),
        );
        assert!(paths.is_empty());
    }

    #[test]
    fn cultural_salience_lowers_cost() {
        let graph = builtin_graph();
        let source = graph.find_source("glistening").unwrap();
        let with_tag = TraversalConstraints {
            cultural_tags: vec!["culture:A".to_string()],
            ..TraversalConstraints::default()
        };
        let smooth_with = traverse(&graph, source, &with_tag, &TraversalConfig::default())
            .into_iter()
            .find(|p| p.target_concept == "tactile-smooth")
            .unwrap();
        let smooth_without = traverse(
            &graph,
            source,
            &TraversalConstraints::default(),
            &TraversalConfig::default(),
        )
        .into_iter()
        .find(|p| p.target_concept == "tactile-smooth")
        .unwrap();
        assert!(smooth_with.cost < smooth_without.cost);
    }
}
