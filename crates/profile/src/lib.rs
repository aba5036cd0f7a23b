//! # Sense Profile
//!
//! Per-user accessibility fingerprints, difficulty scoring and the
//! append-only agentic memory that feeds back into both.
//!
//! ## Architecture
//!
//! ```text
//! MemoryRecord log (append-only, per user)
//!     │
//!     ├──> effective fingerprint (materialized view)
//!     │      └─> Difficulty Scorer (pure)
//!     │
//!     └──> FingerprintStore (file-backed or in-memory)
//! ```
//!
//! Records are never mutated after write; the effective fingerprint is
//! recomputed from history so every sensitivity shift stays auditable.

mod error;
mod fingerprint;
mod memory;
mod scorer;
mod store;

pub use error::{ProfileError, Result};
pub use fingerprint::{AccessibilityFingerprint, RewriteStyle, StyleWeights};
pub use memory::{AgenticMemory, MemoryConfig, MemoryRecord, Outcome};
pub use scorer::{score_expression, DifficultyScore};
pub use store::{FileStore, FingerprintStore, MemoryStore};
