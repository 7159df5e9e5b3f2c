use std::fmt;

use crate::error::{ModelError, ModelResult};
use super::phoneme::PhonemeTable;

pub const WILDCARD: char = '*';

/// One element of a rule pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternElement {
	/// Matches or emits this exact character.
	Literal(char),
	/// Matches any choice of the phoneme class, or emits a fresh draw.
	Class(char),
	/// Captures the rest of the word, or emits the capture.
	Wildcard,
}

impl PatternElement {
	fn classify(c: char) -> Self {
		if c == WILDCARD {
			PatternElement::Wildcard
		} else if c.is_uppercase() {
			PatternElement::Class(c)
		} else {
			PatternElement::Literal(c)
		}
	}
}

/// A from- or to-pattern of a transform rule, checked against its table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
	text: String,
	elements: Vec<PatternElement>,
}

impl Pattern {
	/// Compiles a from-pattern.
	///
	/// # Errors
	/// - `EmptyPattern` if `text` is empty
	/// - `MisplacedWildcard` if `*` is not the last character
	/// - `UnknownSymbol` if a class is missing from `table`
	pub fn matcher(text: &str, table: &PhonemeTable) -> ModelResult<Self> {
		if text.is_empty() {
			return Err(ModelError::EmptyPattern(text.to_owned()));
		}
		let pattern = Self::compile(text, table)?;
		let last = pattern.elements.len() - 1;
		if pattern.elements[..last].contains(&PatternElement::Wildcard) {
			return Err(ModelError::MisplacedWildcard(text.to_owned()));
		}
		Ok(pattern)
	}

	/// Compiles a to-pattern. An empty replacement deletes the match.
	///
	/// # Errors
	/// - `UnboundWildcard` if `*` is used while `from` has no wildcard
	/// - `UnknownSymbol` if a class is missing from `table`
	pub fn replacement(text: &str, from: &Pattern, table: &PhonemeTable) -> ModelResult<Self> {
		let pattern = Self::compile(text, table)?;
		if pattern.has_wildcard() && !from.has_wildcard() {
			return Err(ModelError::UnboundWildcard {
				from: from.text.clone(),
				replacement: text.to_owned(),
			});
		}
		Ok(pattern)
	}

	fn compile(text: &str, table: &PhonemeTable) -> ModelResult<Self> {
		let elements: Vec<PatternElement> = text.chars().map(PatternElement::classify).collect();
		for element in &elements {
			if let PatternElement::Class(symbol) = *element {
				if !table.contains(symbol) {
					return Err(ModelError::UnknownSymbol {
						symbol,
						context: format!("pattern '{}'", text),
					});
				}
			}
		}
		Ok(Self { text: text.to_owned(), elements })
	}

	pub fn elements(&self) -> &[PatternElement] {
		&self.elements
	}

	pub fn has_wildcard(&self) -> bool {
		self.elements.contains(&PatternElement::Wildcard)
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}
}

impl fmt::Display for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}
