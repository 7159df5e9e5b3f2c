//! Invented-language word generation library.
//!
//! This crate provides:
//! - Weighted word synthesis from phoneme-class templates
//! - Sound change rules rewriting words with literal, class and
//!   wildcard patterns
//! - JSON model loading for languages and concepts
//! - An injected randomness seam for reproducible generation
//!
//! Every random draw takes a `&mut dyn Entropy`; nothing in the crate
//! holds global random state.

/// Languages, phonemes, phonotactics, transform rules and lexicons.
pub mod model;

/// Error type shared by model construction and lookups.
pub mod error;

/// I/O utilities (file loading, path helpers).
pub mod io;

pub use error::{ModelError, ModelResult};
pub use model::concept::{Concept, PartOfSpeech};
pub use model::entropy::{Entropy, FixedEntropy, RngEntropy, SequenceEntropy};
pub use model::language::Language;
pub use model::language_model::LanguageModel;
pub use model::lexicon::{Lexicon, LexiconOptions};
