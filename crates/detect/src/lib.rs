//! # Sense Detect
//!
//! Context-aware detection of sensory expressions in text.
//!
//! ## Features
//!
//! - **Offset-preserving spans** - byte offsets into the original text, safe
//!   to splice back
//! - **Idiom handling** - phrase-level matches win over their constituent
//!   words
//! - **Intensity scoring** - nearby intensity markers modulate span intensity
//!   and confidence
//! - **Overlap resolution** - highest confidence wins, ties go to the longer
//!   span
//!
//! Absence of sensory language is a valid terminal state: detection returns
//! an empty sequence and the pipeline leaves the text untouched.

mod detector;
mod error;
mod expression;

pub use detector::{DetectorConfig, SensoryDetector};
pub use error::{DetectError, Result};
pub use expression::SensoryExpression;
