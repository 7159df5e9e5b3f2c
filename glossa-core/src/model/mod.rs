//! Top-level module for word synthesis and sound change.
//!
//! This module provides:
//! - Phoneme sets and tables (`phoneme`)
//! - Weighted word shapes (`phonotactics`)
//! - The pattern rewrite engine (`pattern`, `transform_rule`)
//! - Languages, model loading and lexicon building
//! - The injected source of randomness (`entropy`)

/// Injected source of randomness shared by every random choice.
pub mod entropy;

/// Phoneme sets (free or sticky) and the per-language phoneme table.
pub mod phoneme;

/// Word types and weighted word generation for one register.
pub mod phonotactics;

/// Compiled from- and to-patterns of transform rules.
pub mod pattern;

/// Sound change rules: matching, rewriting and conditioning.
pub mod transform_rule;

/// Concepts and parts of speech used to condition rules.
pub mod concept;

/// A language: phoneme table, registers and ordered rules.
pub mod language;

/// All languages and concepts of a model file.
pub mod language_model;

/// One coined word per concept, with duplicate avoidance.
pub mod lexicon;

/// Serde descriptors of the JSON model file.
pub mod config;
