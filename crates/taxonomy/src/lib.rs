//! # Sense Taxonomy
//!
//! Modality-organized taxonomy of sensory language shared by the detection
//! and scoring crates.
//!
//! ## Features
//!
//! - **Modality enum** - the six sensory channels the pipeline reasons about
//! - **Lexicon tables** - keywords, verbs, adjectives and intensity markers
//!   per modality
//! - **Idiom table** - phrase-level expressions with an implied modality
//! - **Cultural emphasis** - per-tag modality weighting used by confidence
//!   and salience scoring
//!
//! The tables are intentionally lexically rich but not exhaustive; deployments
//! extend them through corpus and graph reference data rather than code.

mod culture;
mod lexicon;
mod modality;

pub use culture::{cultural_emphasis, tag_modifier};
pub use lexicon::{
    idioms, intensity_score, keyword_modality, modality_lexicon, Idiom, LexemeClass,
    ModalityLexicon,
};
pub use modality::Modality;
