use std::collections::HashSet;

use log::debug;

use crate::error::ModelResult;
use super::concept::Concept;
use super::entropy::Entropy;
use super::language::Language;

/// Parameters of a lexicon build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexiconOptions {
	/// Register used for concepts that do not name one.
	pub default_register: String,
	/// Number of retries when a coined word is already taken.
	pub nb_try: usize,
}

impl Default for LexiconOptions {
	fn default() -> Self {
		Self { default_register: "default".to_owned(), nb_try: 5 }
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexiconEntry {
	pub concept: String,
	pub word: String,
}

/// One word per concept for a language.
///
/// # Responsibilities
/// - Skip concepts exclusive to another language
/// - Coin each word in the concept's register (generation + sound changes)
/// - Avoid homophones by retrying up to `nb_try` times
///
/// Nothing is persisted; a lexicon lives as long as its caller keeps it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lexicon {
	language: String,
	entries: Vec<LexiconEntry>,
}

impl Lexicon {
	/// Coins a word for every concept available in `language`.
	///
	/// # Errors
	/// Returns `UnknownRegister` if a concept (or the default) names a
	/// register the language does not have.
	pub fn build(
		language: &Language,
		concepts: &[Concept],
		options: &LexiconOptions,
		entropy: &mut dyn Entropy,
	) -> ModelResult<Self> {
		let mut taken: HashSet<String> = HashSet::new();
		let mut entries = Vec::new();

		for concept in concepts.iter().filter(|concept| concept.is_available_in(language.name())) {
			let register = concept.phonotactics.as_deref().unwrap_or(&options.default_register);
			let word = Self::coin(language, register, concept, options.nb_try, &taken, entropy)?;
			taken.insert(word.to_lowercase());
			entries.push(LexiconEntry { concept: concept.name.clone(), word });
		}

		Ok(Self { language: language.name().to_owned(), entries })
	}

	/// Derives a word, retrying while it collides with `taken`.
	///
	/// Returns the first free word, or the last attempt once `nb_try`
	/// retries are exhausted.
	fn coin(
		language: &Language,
		register: &str,
		concept: &Concept,
		mut nb_try: usize,
		taken: &HashSet<String>,
		entropy: &mut dyn Entropy,
	) -> ModelResult<String> {
		let mut word = language.derive_word(register, concept, entropy)?;

		while nb_try > 0 && taken.contains(&word.to_lowercase()) {
			debug!("'{}' already coined, retrying for '{}'", word, concept.name);
			word = language.derive_word(register, concept, entropy)?;
			nb_try -= 1;
		}

		Ok(word)
	}

	pub fn language(&self) -> &str {
		&self.language
	}

	pub fn entries(&self) -> &[LexiconEntry] {
		&self.entries
	}

	/// Word coined for `concept`, if any.
	pub fn word(&self, concept: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|entry| entry.concept == concept)
			.map(|entry| entry.word.as_str())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ModelError;
	use crate::model::concept::PartOfSpeech;
	use crate::model::config::LanguageConfig;
	use crate::model::entropy::{FixedEntropy, SequenceEntropy};

	fn language() -> Language {
		let config: LanguageConfig = serde_json::from_str(
			r#"{
				"name": "Old",
				"phonemes": {"V": ["a", "o"]},
				"phonotactics": {
					"default": [{"phonemes": "tV", "weight": 1}],
					"names": [{"phonemes": "Vrn", "weight": 1}]
				}
			}"#,
		)
		.unwrap();
		Language::from_config(&config, &mut FixedEntropy(0.0)).unwrap()
	}

	#[test]
	fn uses_concept_register_or_default() {
		let mut named = Concept::new("hero", PartOfSpeech::Noun, 0);
		named.phonotactics = Some("names".to_owned());
		let concepts = vec![Concept::new("go", PartOfSpeech::Verb, 0), named];

		let lexicon = Lexicon::build(&language(), &concepts, &LexiconOptions::default(), &mut FixedEntropy(0.0)).unwrap();
		assert_eq!(lexicon.language(), "Old");
		assert_eq!(lexicon.word("go"), Some("ta"));
		assert_eq!(lexicon.word("hero"), Some("arn"));
	}

	#[test]
	fn skips_concepts_exclusive_to_other_languages() {
		let mut foreign = Concept::new("tea", PartOfSpeech::Noun, 0);
		foreign.exclusive_to = Some("New".to_owned());
		let concepts = vec![foreign, Concept::new("go", PartOfSpeech::Verb, 0)];

		let lexicon = Lexicon::build(&language(), &concepts, &LexiconOptions::default(), &mut FixedEntropy(0.0)).unwrap();
		assert_eq!(lexicon.len(), 1);
		assert_eq!(lexicon.word("tea"), None);
	}

	#[test]
	fn retries_duplicates() {
		let concepts = vec![Concept::new("go", PartOfSpeech::Verb, 0), Concept::new("come", PartOfSpeech::Verb, 0)];
		// each word costs two draws: word type, then vowel
		let mut entropy = SequenceEntropy::new(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.9]);

		let lexicon = Lexicon::build(&language(), &concepts, &LexiconOptions::default(), &mut entropy).unwrap();
		assert_eq!(lexicon.word("go"), Some("ta"));
		assert_eq!(lexicon.word("come"), Some("to"));
	}

	#[test]
	fn keeps_last_attempt_when_retries_run_out() {
		let concepts = vec![Concept::new("go", PartOfSpeech::Verb, 0), Concept::new("come", PartOfSpeech::Verb, 0)];
		let options = LexiconOptions { nb_try: 3, ..LexiconOptions::default() };

		let lexicon = Lexicon::build(&language(), &concepts, &options, &mut FixedEntropy(0.0)).unwrap();
		assert_eq!(lexicon.word("come"), Some("ta"));
	}

	#[test]
	fn unknown_register_fails() {
		let mut concept = Concept::new("hero", PartOfSpeech::Noun, 0);
		concept.phonotactics = Some("epic".to_owned());
		assert!(matches!(
			Lexicon::build(&language(), &[concept], &LexiconOptions::default(), &mut FixedEntropy(0.0)),
			Err(ModelError::UnknownRegister(_))
		));
	}
}
