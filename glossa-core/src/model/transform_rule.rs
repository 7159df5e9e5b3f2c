use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use super::concept::{Concept, PartOfSpeech};
use super::config::RuleConfig;
use super::entropy::{choose, Entropy};
use super::pattern::{Pattern, PatternElement};
use super::phoneme::PhonemeTable;

/// How the conditioning attributes of a rule are used.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleGating {
	/// Conditions are stored but never consulted.
	#[default]
	Inert,
	/// A rule is skipped for a concept whose word class or part of speech
	/// does not satisfy it. Positional conditions stay inert.
	Concept,
}

/// Conditioning attributes declared on a rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleConditions {
	pub word_start: bool,
	pub word_end: bool,
	pub word_class: Option<i32>,
	pub parts_of_speech: Option<BTreeSet<PartOfSpeech>>,
	pub before: Option<String>,
	pub after: Option<String>,
}

impl RuleConditions {
	/// Checks the concept-level conditions (word class, part of speech).
	pub fn admits(&self, concept: &Concept) -> bool {
		self.word_class.is_none_or(|class| class == concept.word_class)
			&& self
				.parts_of_speech
				.as_ref()
				.is_none_or(|set| set.contains(&concept.part_of_speech))
	}
}

/// A sound change: rewrites every occurrence of `from` with one of `to`.
///
/// # Matching
/// The word is scanned left to right. At each position the from-pattern
/// is tried; on success a replacement is emitted and the scan resumes
/// after the match, otherwise one character is copied. Matches never
/// overlap and nothing is re-scanned.
///
/// - A literal must equal the next character.
/// - A class consumes the first of its choices (in declared order) that
///   prefixes the remaining input.
/// - `*` consumes the rest of the word.
///
/// # Replacement
/// One alternative of `to` is drawn per match. Its literals are copied,
/// its classes are drawn fresh from the table, and `*` emits the text
/// captured by the from-pattern.
#[derive(Clone, Debug)]
pub struct TransformRule {
	table: Arc<PhonemeTable>,
	from: Pattern,
	to: Vec<Pattern>,
	conditions: RuleConditions,
	gating: RuleGating,
}

/// Result of a successful match at some offset.
struct Match<'a> {
	/// Number of bytes consumed.
	length: usize,
	capture: Option<&'a str>,
}

impl TransformRule {
	/// Creates an unconditioned rule.
	///
	/// # Errors
	/// - `EmptyReplacement` if `to` is empty
	/// - any pattern error (see `Pattern::matcher` and `Pattern::replacement`)
	pub fn new<S: AsRef<str>>(table: Arc<PhonemeTable>, from: &str, to: &[S]) -> ModelResult<Self> {
		if to.is_empty() {
			return Err(ModelError::EmptyReplacement(from.to_owned()));
		}
		let from = Pattern::matcher(from, &table)?;
		let to = to
			.iter()
			.map(|replacement| Pattern::replacement(replacement.as_ref(), &from, &table))
			.collect::<ModelResult<Vec<_>>>()?;
		Ok(Self {
			table,
			from,
			to,
			conditions: RuleConditions::default(),
			gating: RuleGating::Inert,
		})
	}

	/// Builds a rule from its descriptor.
	///
	/// # Errors
	/// Same as `new`, plus `UnknownPartOfSpeech` for a bad `POS`.
	pub fn from_config(table: Arc<PhonemeTable>, config: &RuleConfig, gating: RuleGating) -> ModelResult<Self> {
		let to = config.to.clone().into_vec();
		let parts_of_speech = config
			.part_of_speech
			.as_deref()
			.map(PartOfSpeech::parse_set)
			.transpose()?;
		let conditions = RuleConditions {
			word_start: config.word_start,
			word_end: config.word_end,
			word_class: config.word_class,
			parts_of_speech,
			before: config.before.clone(),
			after: config.after.clone(),
		};
		Ok(Self::new(table, &config.from, &to)?
			.with_conditions(conditions)
			.with_gating(gating))
	}

	pub fn with_conditions(mut self, conditions: RuleConditions) -> Self {
		self.conditions = conditions;
		self
	}

	pub fn with_gating(mut self, gating: RuleGating) -> Self {
		self.gating = gating;
		self
	}

	pub fn conditions(&self) -> &RuleConditions {
		&self.conditions
	}

	pub fn from_pattern(&self) -> &Pattern {
		&self.from
	}

	pub fn replacements(&self) -> &[Pattern] {
		&self.to
	}

	/// Whether the rule runs at all for `concept`.
	pub fn applies_to(&self, concept: &Concept) -> bool {
		match self.gating {
			RuleGating::Inert => true,
			RuleGating::Concept => self.conditions.admits(concept),
		}
	}

	/// Rewrites `source`. Never fails; without a match the input is
	/// returned unchanged.
	pub fn apply(&self, concept: &Concept, source: &str, entropy: &mut dyn Entropy) -> String {
		if !self.applies_to(concept) {
			return source.to_owned();
		}

		let mut output = String::with_capacity(source.len());
		let mut cursor = 0;
		while cursor < source.len() {
			let mut advance = 0;
			if let Some(found) = self.match_at(source, cursor) {
				trace!("rule {} matched '{}' at {}", self, &source[cursor..cursor + found.length], cursor);
				self.append_replacement(&mut output, &found, entropy);
				advance = found.length;
			}
			// Copy one character on a miss, or after an empty match so the scan progresses.
			if advance == 0 {
				match source[cursor..].chars().next() {
					Some(c) => {
						output.push(c);
						advance = c.len_utf8();
					}
					None => break,
				}
			}
			cursor += advance;
		}
		output
	}

	fn match_at<'a>(&self, source: &'a str, start: usize) -> Option<Match<'a>> {
		let mut position = start;
		for element in self.from.elements() {
			let rest = &source[position..];
			match *element {
				PatternElement::Wildcard => {
					return Some(Match { length: source.len() - start, capture: Some(rest) });
				}
				PatternElement::Literal(c) => {
					if !rest.starts_with(c) {
						return None;
					}
					position += c.len_utf8();
				}
				PatternElement::Class(symbol) => {
					let set = self.table.get(symbol)?;
					let choice = set.choices().iter().find(|choice| rest.starts_with(choice.as_str()))?;
					position += choice.len();
				}
			}
		}
		Some(Match { length: position - start, capture: None })
	}

	fn append_replacement(&self, output: &mut String, found: &Match<'_>, entropy: &mut dyn Entropy) {
		let Some(replacement) = choose(&self.to, entropy) else {
			return;
		};
		for element in replacement.elements() {
			match *element {
				PatternElement::Wildcard => output.push_str(found.capture.unwrap_or_default()),
				PatternElement::Literal(c) => output.push(c),
				PatternElement::Class(symbol) => {
					if let Some(set) = self.table.get(symbol) {
						output.push_str(set.generate(entropy));
					}
				}
			}
		}
	}
}

impl fmt::Display for TransformRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} -> ", self.from)?;
		for (index, replacement) in self.to.iter().enumerate() {
			if index > 0 {
				f.write_str(" | ")?;
			}
			write!(f, "{}", replacement)?;
		}
		Ok(())
	}
}
