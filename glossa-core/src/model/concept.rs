use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use super::config::ConceptConfig;

/// Marker turning a part of speech into "every part of speech but this one".
pub const NEGATION_MARKER: char = '!';

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartOfSpeech {
	#[default]
	None,
	Verb,
	Noun,
	Pronoun,
	Honorific,
	Order,
	Hortative,
}

impl PartOfSpeech {
	pub const ALL: [PartOfSpeech; 7] = [
		PartOfSpeech::None,
		PartOfSpeech::Verb,
		PartOfSpeech::Noun,
		PartOfSpeech::Pronoun,
		PartOfSpeech::Honorific,
		PartOfSpeech::Order,
		PartOfSpeech::Hortative,
	];

	pub fn name(self) -> &'static str {
		match self {
			PartOfSpeech::None => "None",
			PartOfSpeech::Verb => "Verb",
			PartOfSpeech::Noun => "Noun",
			PartOfSpeech::Pronoun => "Pronoun",
			PartOfSpeech::Honorific => "Honorific",
			PartOfSpeech::Order => "Order",
			PartOfSpeech::Hortative => "Hortative",
		}
	}

	/// Parses a part-of-speech specifier into the set it denotes.
	///
	/// - `"Noun"` → `{Noun}`
	/// - `"!Noun"` → every part of speech except `Noun`
	pub fn parse_set(specifier: &str) -> ModelResult<BTreeSet<PartOfSpeech>> {
		match specifier.strip_prefix(NEGATION_MARKER) {
			Some(name) => {
				let excluded: PartOfSpeech = name.parse()?;
				Ok(PartOfSpeech::ALL.into_iter().filter(|pos| *pos != excluded).collect())
			}
			None => Ok(BTreeSet::from([specifier.parse()?])),
		}
	}
}

impl FromStr for PartOfSpeech {
	type Err = ModelError;

	/// Abbreviations first (`Hort`, `Hon`, `Ord`), then exact variant names.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"Hort" => Ok(PartOfSpeech::Hortative),
			"Hon" => Ok(PartOfSpeech::Honorific),
			"Ord" => Ok(PartOfSpeech::Order),
			_ => PartOfSpeech::ALL
				.into_iter()
				.find(|pos| pos.name() == s)
				.ok_or_else(|| ModelError::UnknownPartOfSpeech(s.to_owned())),
		}
	}
}

impl fmt::Display for PartOfSpeech {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A meaning to be given a word.
///
/// Rules only look at `part_of_speech` and `word_class`. The lexicon
/// builder reads `phonotactics` (register) and `exclusive_to`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Concept {
	pub name: String,
	pub part_of_speech: PartOfSpeech,
	pub word_class: i32,
	pub tags: Vec<String>,
	pub phonotactics: Option<String>,
	pub appears_in: Option<String>,
	pub exclusive_to: Option<String>,
	pub translation: Option<String>,
}

impl Concept {
	pub fn new(name: &str, part_of_speech: PartOfSpeech, word_class: i32) -> Self {
		Self {
			name: name.to_owned(),
			part_of_speech,
			word_class,
			..Self::default()
		}
	}

	/// # Errors
	/// Returns `UnknownPartOfSpeech` for an unrecognized `POS`.
	pub fn from_config(config: &ConceptConfig) -> ModelResult<Self> {
		let part_of_speech = match &config.part_of_speech {
			Some(name) => name.parse()?,
			None => PartOfSpeech::None,
		};
		Ok(Self {
			name: config.name.clone(),
			part_of_speech,
			word_class: config.word_class,
			tags: config.tags.clone(),
			phonotactics: config.phonotactics.clone(),
			appears_in: config.appears_in.clone(),
			exclusive_to: config.exclusive_to.clone(),
			translation: config.translation.clone(),
		})
	}

	/// False only when the concept is exclusive to another language.
	pub fn is_available_in(&self, language: &str) -> bool {
		self.exclusive_to.as_deref().is_none_or(|owner| owner == language)
	}
}
