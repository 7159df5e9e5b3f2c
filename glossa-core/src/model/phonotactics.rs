use std::sync::Arc;

use crate::error::{ModelError, ModelResult};
use super::config::WordTypeConfig;
use super::entropy::{draw_below, Entropy};
use super::phoneme::PhonemeTable;

/// A word shape: lowercase characters are copied, uppercase ones are
/// phoneme classes. Example: `"CVCa"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordType {
	pub phonemes: String,
	pub weight: u32,
}

impl WordType {
	pub fn new(phonemes: &str, weight: u32) -> Self {
		Self { phonemes: phonemes.to_owned(), weight }
	}
}

impl From<&WordTypeConfig> for WordType {
	fn from(config: &WordTypeConfig) -> Self {
		Self::new(&config.phonemes, config.weight)
	}
}

/// Weighted collection of word types for one register of a language.
///
/// ## Responsibilities
/// - Select a word type with probability `weight / total weight`
/// - Expand the selected template through the phoneme table
///
/// ## Invariants
/// - `total` is positive and equals the last entry of `cumulative`
/// - Every uppercase character of every template exists in `table`
/// - A word type of weight 0 owns an empty interval and is never selected
#[derive(Clone, Debug)]
pub struct Phonotactics {
	table: Arc<PhonemeTable>,
	word_types: Vec<WordType>,
	/// Running sum of weights: word type `i` owns `[cumulative[i-1], cumulative[i])`.
	cumulative: Vec<u64>,
	total: u64,
}

impl Phonotactics {
	/// Creates a register from its word types.
	///
	/// # Errors
	/// - `UnknownSymbol` if a template uses a class missing from `table`
	/// - `EmptyPhonotactics` if no word type has a positive weight
	pub fn new(register: &str, table: Arc<PhonemeTable>, word_types: Vec<WordType>) -> ModelResult<Self> {
		for word_type in &word_types {
			if let Some(symbol) = word_type.phonemes.chars().find(|c| c.is_uppercase() && !table.contains(*c)) {
				return Err(ModelError::UnknownSymbol {
					symbol,
					context: format!("word type '{}' of register '{}'", word_type.phonemes, register),
				});
			}
		}

		let mut total = 0u64;
		let cumulative: Vec<u64> = word_types
			.iter()
			.map(|word_type| {
				total += u64::from(word_type.weight);
				total
			})
			.collect();
		if total == 0 {
			return Err(ModelError::EmptyPhonotactics(register.to_owned()));
		}

		Ok(Self { table, word_types, cumulative, total })
	}

	pub fn from_config(register: &str, table: Arc<PhonemeTable>, config: &[WordTypeConfig]) -> ModelResult<Self> {
		Self::new(register, table, config.iter().map(WordType::from).collect())
	}

	/// Generates a word.
	///
	/// One draw selects the word type (`floor(v * total weight)`), then each
	/// class of the template is drawn in order.
	pub fn generate_word(&self, entropy: &mut dyn Entropy) -> String {
		let Some(target) = draw_below(self.total, entropy) else {
			return String::new();
		};
		let index = self.cumulative.partition_point(|&bound| bound <= target);
		let mut word = String::new();
		for c in self.word_types[index].phonemes.chars() {
			match self.table.get(c) {
				Some(set) if c.is_uppercase() => word.push_str(set.generate(entropy)),
				_ => word.push(c),
			}
		}
		word
	}

	pub fn word_types(&self) -> &[WordType] {
		&self.word_types
	}

	/// Sum of all weights.
	pub fn total_weight(&self) -> u64 {
		self.total
	}
}
