use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::{ModelError, ModelResult};
use super::concept::Concept;
use super::config::{LanguageConfig, RuleEntry};
use super::entropy::Entropy;
use super::phoneme::PhonemeTable;
use super::phonotactics::Phonotactics;
use super::transform_rule::TransformRule;

/// A language: its phonemes, word shapes and sound changes.
///
/// The phoneme table is shared by every register and every rule.
#[derive(Clone, Debug)]
pub struct Language {
	name: String,
	table: Arc<PhonemeTable>,
	phonotactics: BTreeMap<String, Phonotactics>,
	rules: Vec<TransformRule>,
}

impl Language {
	pub fn new(
		name: &str,
		table: Arc<PhonemeTable>,
		phonotactics: BTreeMap<String, Phonotactics>,
		rules: Vec<TransformRule>,
	) -> Self {
		Self { name: name.to_owned(), table, phonotactics, rules }
	}

	/// Builds a language from its descriptor.
	///
	/// Sticky phoneme sets are resolved here, once.
	/// Rule groups are skipped; the other rules keep their declared order.
	///
	/// # Errors
	/// Any configuration error, wrapped with the language name.
	pub fn from_config(config: &LanguageConfig, entropy: &mut dyn Entropy) -> ModelResult<Self> {
		Self::build(config, entropy).map_err(|e| e.in_language(&config.name))
	}

	fn build(config: &LanguageConfig, entropy: &mut dyn Entropy) -> ModelResult<Self> {
		let table = Arc::new(PhonemeTable::from_config(&config.phonemes, entropy)?);

		let mut phonotactics = BTreeMap::new();
		for (register, word_types) in &config.phonotactics {
			let register_phonotactics = Phonotactics::from_config(register, Arc::clone(&table), word_types)?;
			phonotactics.insert(register.clone(), register_phonotactics);
		}

		let mut rules = Vec::with_capacity(config.rules.len());
		for entry in &config.rules {
			match entry {
				RuleEntry::Rule(rule) => {
					rules.push(TransformRule::from_config(Arc::clone(&table), rule, config.gating)?);
				}
				RuleEntry::Group { group } => {
					warn!("language '{}': rule group {} is not supported, skipped", config.name, group);
				}
			}
		}

		debug!(
			"language '{}' built: {} phonemes, {} registers, {} rules",
			config.name,
			config.phonemes.len(),
			phonotactics.len(),
			rules.len()
		);

		Ok(Self::new(&config.name, table, phonotactics, rules))
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn phoneme_table(&self) -> &PhonemeTable {
		&self.table
	}

	pub fn rules(&self) -> &[TransformRule] {
		&self.rules
	}

	pub fn register_names(&self) -> impl Iterator<Item = &str> {
		self.phonotactics.keys().map(String::as_str)
	}

	/// # Errors
	/// Returns `UnknownRegister` if the language has no such register.
	pub fn register(&self, register: &str) -> ModelResult<&Phonotactics> {
		self.phonotactics
			.get(register)
			.ok_or_else(|| ModelError::UnknownRegister(register.to_owned()))
	}

	/// Generates a base word (no sound change applied).
	pub fn generate_word(&self, register: &str, entropy: &mut dyn Entropy) -> ModelResult<String> {
		Ok(self.register(register)?.generate_word(entropy))
	}

	/// Folds every rule over `word`, in declaration order.
	pub fn apply_rules(&self, concept: &Concept, word: &str, entropy: &mut dyn Entropy) -> String {
		self.rules
			.iter()
			.fold(word.to_owned(), |current, rule| rule.apply(concept, &current, entropy))
	}

	/// Generates a word in `register` then applies every rule to it.
	pub fn derive_word(&self, register: &str, concept: &Concept, entropy: &mut dyn Entropy) -> ModelResult<String> {
		let base = self.generate_word(register, entropy)?;
		Ok(self.apply_rules(concept, &base, entropy))
	}
}
