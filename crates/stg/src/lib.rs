//! # Sense STG
//!
//! The Sensory Translation Graph: a static directed weighted graph over
//! sensory/cultural concepts, plus the constrained traversal that proposes
//! cross-modal substitution paths.
//!
//! ## Architecture
//!
//! ```text
//! StgSeed (reference data)
//!     │
//!     ├──> SensoryGraph (petgraph DiGraph, built once at startup)
//!     │      ├─ Nodes: concepts (modality, phrase, surfaces, salience)
//!     │      └─ Edges: weighted transformations
//!     │
//!     └──> Traversal (bounded Dijkstra)
//!            ├─ Modality exclusion (never enters an excluded node)
//!            ├─ Hop and cost caps
//!            └─ Deterministic tie-breaks (cost, hops, concept label)
//! ```
//!
//! The graph is immutable for the process lifetime and safe for
//! unsynchronized concurrent reads. An empty traversal result is a
//! legitimate outcome, not an error.

mod error;
mod graph;
mod seed;
mod traversal;
mod types;

pub use error::{GraphError, Result};
pub use graph::SensoryGraph;
pub use seed::{SeedEdge, SeedNode, StgSeed};
pub use traversal::{traverse, TraversalConfig, TraversalConstraints};
pub use types::{ConceptNode, SubstitutionPath, TranslationEdge};
