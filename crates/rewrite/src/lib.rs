//! # Sense Rewrite
//!
//! The reasoning and rewriting half of the pipeline: per-span substitution
//! decisions, constrained sentence rewriting, and the single `rewrite`
//! operation exposed to callers.
//!
//! ## Architecture
//!
//! ```text
//! text
//!   │
//!   ├──> SensoryDetector ──> DifficultyScorer (per span)
//!   │
//!   ├──> per actionable span, concurrently:
//!   │      ├─ MetaphorRetriever (suspension point, timeout-guarded)
//!   │      ├─ STG traversal (pure)
//!   │      └─ ReasoningEngine: merge, rank, decide
//!   │
//!   ├──> ConstrainedRewriter per sentence:
//!   │      DRAFT -> VALIDATE -> { ACCEPT, RETRY, FALLBACK }
//!   │
//!   └──> output + AgenticMemory append
//! ```
//!
//! Only detection and profile-storage failures surface as errors; everything
//! else degrades to a partially- or fully-unmodified output.

mod config;
mod decision;
mod engine;
mod error;
mod pipeline;
mod rewriter;

pub use config::{EngineConfig, PipelineConfig, RewriteOptions, RewriterConfig, ScorerConfig};
pub use decision::{Justification, RewriteDecision, Verdict};
pub use engine::ReasoningEngine;
pub use error::{Result, RewriteError};
pub use pipeline::{RewriteOutcome, RewritePipeline};
pub use rewriter::{ConstrainedRewriter, SentenceState};
