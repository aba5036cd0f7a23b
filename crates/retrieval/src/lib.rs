//! # Sense Retrieval
//!
//! Culturally-grounded metaphor retrieval over an embedded corpus.
//!
//! ## Architecture
//!
//! ```text
//! MetaphorCorpus (JSON reference data)
//!     │
//!     ├──> MetaphorRetriever
//!     │      ├─ Embed docs once (provider), verify modality (zero-shot)
//!     │      ├─ Query expansion per span
//!     │      ├─ Blended scoring: similarity × cultural match × affinity
//!     │      └─ Excluded-modality filter, top-k
//!     │
//!     └──> TTL session cache (lru)
//! ```
//!
//! Provider failure yields an empty candidate list, never an error:
//! candidate starvation is a recoverable state and traversal may still
//! succeed.

mod cache;
mod corpus;
mod error;
mod retriever;

pub use corpus::{MetaphorCorpus, MetaphorDoc, METAPHOR_CORPUS_SCHEMA_VERSION};
pub use error::{Result, RetrievalError};
pub use retriever::{MetaphorRetriever, RetrievalConfig, SubstitutionCandidate};
