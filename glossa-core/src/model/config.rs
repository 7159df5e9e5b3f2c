//! Descriptors of the JSON model file.
//!
//! These are plain data: validation happens when the descriptors are
//! turned into a `Language` or a `Concept`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::transform_rule::RuleGating;

/// Root of a model file: `{"concepts": [...], "languages": [...]}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageModelConfig {
	#[serde(default)]
	pub concepts: Vec<ConceptConfig>,
	pub languages: Vec<LanguageConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageConfig {
	pub name: String,
	pub phonemes: BTreeMap<String, PhonemeEntry>,
	/// Registers by name, each a list of word types.
	#[serde(default)]
	pub phonotactics: BTreeMap<String, Vec<WordTypeConfig>>,
	/// Sound changes, in application order.
	#[serde(default)]
	pub rules: Vec<RuleEntry>,
	#[serde(default)]
	pub gating: RuleGating,
}

/// One phoneme table entry.
///
/// Accepted shapes:
/// - `"P": "p"` (a single literal)
/// - `"V": ["a", "e", "i"]`
/// - `"H": {"choices": ["w", "h"], "sticky": true}`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum PhonemeEntry {
	Literal(String),
	Choices(Vec<String>),
	Configured {
		choices: Vec<String>,
		#[serde(default)]
		sticky: bool,
	},
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WordTypeConfig {
	pub phonemes: String,
	pub weight: u32,
}

/// A rule list item: either a rule or a rule group.
///
/// Groups are recognized so they can be skipped; they are not applied.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum RuleEntry {
	Group { group: serde_json::Value },
	Rule(RuleConfig),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
	pub from: String,
	pub to: Replacements,
	#[serde(default)]
	pub word_start: bool,
	#[serde(default)]
	pub word_end: bool,
	#[serde(rename = "class", default)]
	pub word_class: Option<i32>,
	/// Part of speech, `!`-prefixed for "every part of speech but this one".
	#[serde(rename = "POS", default)]
	pub part_of_speech: Option<String>,
	#[serde(default)]
	pub before: Option<String>,
	#[serde(default)]
	pub after: Option<String>,
}

/// `"to"` may be a single replacement or a list of alternatives.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Replacements {
	One(String),
	Many(Vec<String>),
}

impl Replacements {
	pub fn into_vec(self) -> Vec<String> {
		match self {
			Replacements::One(value) => vec![value],
			Replacements::Many(values) => values,
		}
	}
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConceptConfig {
	pub name: String,
	#[serde(rename = "POS", default)]
	pub part_of_speech: Option<String>,
	#[serde(rename = "class", default)]
	pub word_class: i32,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub phonotactics: Option<String>,
	#[serde(default)]
	pub appears_in: Option<String>,
	#[serde(default)]
	pub exclusive_to: Option<String>,
	#[serde(default)]
	pub translation: Option<String>,
}
