use std::collections::BTreeMap;

use log::debug;

use crate::error::{ModelError, ModelResult};
use super::config::PhonemeEntry;
use super::entropy::{choose, Entropy};

/// Set of interchangeable surface strings standing for one phoneme class.
///
/// # Invariants
/// - `choices` is never empty
/// - A sticky set holds exactly one choice, drawn at construction
#[derive(Clone, Debug, PartialEq)]
pub struct PhonemeSet {
	choices: Vec<String>,
	sticky: bool,
}

impl PhonemeSet {
	/// Creates a free set: a choice is drawn on every `generate` call.
	///
	/// # Errors
	/// Returns `EmptyPhonemeSet` if `choices` is empty.
	pub fn free(symbol: char, choices: Vec<String>) -> ModelResult<Self> {
		if choices.is_empty() {
			return Err(ModelError::EmptyPhonemeSet(symbol));
		}
		Ok(Self { choices, sticky: false })
	}

	/// Creates a sticky set: one choice is drawn now and kept forever.
	///
	/// # Errors
	/// Returns `EmptyPhonemeSet` if `choices` is empty.
	pub fn sticky(symbol: char, choices: Vec<String>, entropy: &mut dyn Entropy) -> ModelResult<Self> {
		let choice = choose(&choices, entropy)
			.cloned()
			.ok_or(ModelError::EmptyPhonemeSet(symbol))?;
		debug!("sticky phoneme set '{}' resolved to '{}'", symbol, choice);
		Ok(Self { choices: vec![choice], sticky: true })
	}

	/// Returns one of the choices.
	///
	/// Free sets draw `floor(v * n)` from `entropy`; sticky sets return
	/// their fixed choice and do not consume entropy.
	pub fn generate(&self, entropy: &mut dyn Entropy) -> &str {
		if self.sticky {
			return &self.choices[0];
		}
		choose(&self.choices, entropy).map_or("", String::as_str)
	}

	/// Choices in declaration order (a single choice for sticky sets).
	pub fn choices(&self) -> &[String] {
		&self.choices
	}

	pub fn is_sticky(&self) -> bool {
		self.sticky
	}
}

/// Maps phoneme class symbols to their `PhonemeSet`.
///
/// Built once per language, then shared read-only by the phonotactics
/// registers and every transform rule of that language.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhonemeTable {
	phonemes: BTreeMap<char, PhonemeSet>,
}

impl PhonemeTable {
	pub fn new(phonemes: BTreeMap<char, PhonemeSet>) -> Self {
		Self { phonemes }
	}

	/// Builds a table from configuration entries.
	///
	/// Entries are resolved in key order, so sticky draws are reproducible
	/// for a given entropy source.
	///
	/// # Errors
	/// - `InvalidSymbol` if a key is not exactly one character
	/// - `EmptyPhonemeSet` if an entry has no choices
	pub fn from_config(entries: &BTreeMap<String, PhonemeEntry>, entropy: &mut dyn Entropy) -> ModelResult<Self> {
		let mut phonemes = BTreeMap::new();
		for (key, entry) in entries {
			let symbol = single_char(key)?;
			let set = match entry {
				PhonemeEntry::Literal(value) => PhonemeSet::free(symbol, vec![value.clone()])?,
				PhonemeEntry::Choices(choices) => PhonemeSet::free(symbol, choices.clone())?,
				PhonemeEntry::Configured { choices, sticky: true } => PhonemeSet::sticky(symbol, choices.clone(), entropy)?,
				PhonemeEntry::Configured { choices, sticky: false } => PhonemeSet::free(symbol, choices.clone())?,
			};
			phonemes.insert(symbol, set);
		}
		Ok(Self { phonemes })
	}

	/// Draws a surface string for `symbol`.
	///
	/// # Errors
	/// Returns `UnknownSymbol` if the table has no entry for `symbol`.
	pub fn generate(&self, symbol: char, entropy: &mut dyn Entropy) -> ModelResult<String> {
		self.phonemes
			.get(&symbol)
			.map(|set| set.generate(entropy).to_owned())
			.ok_or_else(|| ModelError::UnknownSymbol { symbol, context: "phoneme table".to_owned() })
	}

	pub fn get(&self, symbol: char) -> Option<&PhonemeSet> {
		self.phonemes.get(&symbol)
	}

	pub fn contains(&self, symbol: char) -> bool {
		self.phonemes.contains_key(&symbol)
	}

	pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
		self.phonemes.keys().copied()
	}
}

fn single_char(key: &str) -> ModelResult<char> {
	let mut chars = key.chars();
	match (chars.next(), chars.next()) {
		(Some(c), None) => Ok(c),
		_ => Err(ModelError::InvalidSymbol(key.to_owned())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::entropy::{FixedEntropy, SequenceEntropy};

	fn strings(values: &[&str]) -> Vec<String> {
		values.iter().map(|v| v.to_string()).collect()
	}

	#[test]
	fn single_choice_set_always_returns_it() {
		let set = PhonemeSet::free('O', strings(&["o"])).unwrap();
		assert_eq!(set.generate(&mut FixedEntropy(0.7)), "o");
	}

	#[test]
	fn free_set_uses_floor_of_scaled_value() {
		let set = PhonemeSet::free('V', strings(&["a", "e", "i", "o"])).unwrap();
		assert_eq!(set.generate(&mut FixedEntropy(0.0)), "a");
		assert_eq!(set.generate(&mut FixedEntropy(0.3)), "e");
		assert_eq!(set.generate(&mut FixedEntropy(0.6)), "i");
		assert_eq!(set.generate(&mut FixedEntropy(0.95)), "o");
	}

	#[test]
	fn sticky_set_ignores_later_entropy() {
		let set = PhonemeSet::sticky('H', strings(&["w", "h", "f"]), &mut FixedEntropy(0.5)).unwrap();
		assert!(set.is_sticky());
		assert_eq!(set.choices(), ["h"]);
		let mut later = SequenceEntropy::new(vec![0.0, 0.99, 0.4]);
		for _ in 0..10 {
			assert_eq!(set.generate(&mut later), "h");
		}
	}

	#[test]
	fn empty_set_is_rejected() {
		assert!(matches!(PhonemeSet::free('X', Vec::new()), Err(ModelError::EmptyPhonemeSet('X'))));
		assert!(matches!(
			PhonemeSet::sticky('X', Vec::new(), &mut FixedEntropy(0.1)),
			Err(ModelError::EmptyPhonemeSet('X'))
		));
	}

	#[test]
	fn table_generates_and_reports_unknown_symbols() {
		let mut phonemes = BTreeMap::new();
		phonemes.insert('P', PhonemeSet::free('P', strings(&["p"])).unwrap());
		phonemes.insert('H', PhonemeSet::free('H', strings(&["wh"])).unwrap());
		let table = PhonemeTable::new(phonemes);

		assert_eq!(table.generate('P', &mut FixedEntropy(0.2)).unwrap(), "p");
		assert_eq!(table.generate('H', &mut FixedEntropy(0.2)).unwrap(), "wh");
		assert!(matches!(
			table.generate('Z', &mut FixedEntropy(0.2)),
			Err(ModelError::UnknownSymbol { symbol: 'Z', .. })
		));
	}

	#[test]
	fn table_from_config_handles_every_entry_shape() {
		let mut entries = BTreeMap::new();
		entries.insert("C".to_owned(), PhonemeEntry::Choices(strings(&["p", "t", "k"])));
		entries.insert("L".to_owned(), PhonemeEntry::Literal("l".to_owned()));
		entries.insert("S".to_owned(), PhonemeEntry::Configured { choices: strings(&["s", "sh"]), sticky: true });
		entries.insert("V".to_owned(), PhonemeEntry::Configured { choices: strings(&["a", "o"]), sticky: false });

		let table = PhonemeTable::from_config(&entries, &mut FixedEntropy(0.75)).unwrap();
		assert_eq!(table.get('C').unwrap().choices().len(), 3);
		assert_eq!(table.get('L').unwrap().choices(), ["l"]);
		assert_eq!(table.get('S').unwrap().choices(), ["sh"]);
		assert!(!table.get('V').unwrap().is_sticky());
		assert_eq!(table.symbols().collect::<String>(), "CLSV");
	}

	#[test]
	fn table_from_config_rejects_long_keys() {
		let mut entries = BTreeMap::new();
		entries.insert("CH".to_owned(), PhonemeEntry::Literal("ch".to_owned()));
		assert!(matches!(
			PhonemeTable::from_config(&entries, &mut FixedEntropy(0.0)),
			Err(ModelError::InvalidSymbol(_))
		));
	}
}
