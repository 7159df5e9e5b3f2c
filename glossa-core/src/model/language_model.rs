use std::path::Path;

use log::info;

use crate::error::{ModelError, ModelResult};
use crate::io::read_file;
use super::concept::Concept;
use super::config::LanguageModelConfig;
use super::entropy::Entropy;
use super::language::Language;

/// Every language of a model file, plus the concepts to name.
///
/// # Responsibilities
/// - Build each `Language` (resolving sticky phoneme sets once)
/// - Resolve languages by name
/// - Expose the two outward operations: word generation in a register
///   and rule application
#[derive(Clone, Debug, Default)]
pub struct LanguageModel {
	concepts: Vec<Concept>,
	languages: Vec<Language>,
}

impl LanguageModel {
	pub fn new(concepts: Vec<Concept>, languages: Vec<Language>) -> Self {
		Self { concepts, languages }
	}

	/// Loads a model from a JSON file.
	///
	/// # Errors
	/// - I/O or JSON errors
	/// - The first configuration error of any language
	pub fn from_file<P: AsRef<Path>>(filepath: P, entropy: &mut dyn Entropy) -> ModelResult<Self> {
		let contents = read_file(&filepath)?;
		let model = Self::from_json_str(&contents, entropy)?;
		info!(
			"loaded {} languages and {} concepts from {}",
			model.languages.len(),
			model.concepts.len(),
			filepath.as_ref().display()
		);
		Ok(model)
	}

	pub fn from_json_str(json: &str, entropy: &mut dyn Entropy) -> ModelResult<Self> {
		let config: LanguageModelConfig = serde_json::from_str(json)?;
		Self::from_config(&config, entropy)
	}

	pub fn from_config(config: &LanguageModelConfig, entropy: &mut dyn Entropy) -> ModelResult<Self> {
		let concepts = config
			.concepts
			.iter()
			.map(Concept::from_config)
			.collect::<ModelResult<Vec<_>>>()?;
		let languages = config
			.languages
			.iter()
			.map(|language| Language::from_config(language, entropy))
			.collect::<ModelResult<Vec<_>>>()?;
		Ok(Self::new(concepts, languages))
	}

	pub fn concepts(&self) -> &[Concept] {
		&self.concepts
	}

	pub fn concept(&self, name: &str) -> Option<&Concept> {
		self.concepts.iter().find(|concept| concept.name == name)
	}

	pub fn languages(&self) -> &[Language] {
		&self.languages
	}

	pub fn language_names(&self) -> Vec<String> {
		self.languages.iter().map(|language| language.name().to_owned()).collect()
	}

	/// # Errors
	/// Returns `UnknownLanguage` if no language has this name.
	pub fn language(&self, name: &str) -> ModelResult<&Language> {
		self.languages
			.iter()
			.find(|language| language.name() == name)
			.ok_or_else(|| ModelError::UnknownLanguage(name.to_owned()))
	}

	/// Generates a base word in `register` of `language`.
	pub fn generate_word(&self, language: &str, register: &str, entropy: &mut dyn Entropy) -> ModelResult<String> {
		self.language(language)?.generate_word(register, entropy)
	}

	/// Applies the rules of `language` to `word`.
	pub fn apply_rules(&self, language: &str, concept: &Concept, word: &str, entropy: &mut dyn Entropy) -> ModelResult<String> {
		Ok(self.language(language)?.apply_rules(concept, word, entropy))
	}
}
