use thiserror::Error;

/// Errors raised while building or querying a language model.
///
/// Everything except the `Unknown{Language,Register,Concept}` lookups is a
/// configuration error: it is detected when a language is constructed
/// and aborts loading of that language.
#[derive(Debug, Error)]
pub enum ModelError {
	#[error("unknown phoneme symbol '{symbol}' in {context}")]
	UnknownSymbol { symbol: char, context: String },
	#[error("phoneme key '{0}' must be exactly one character")]
	InvalidSymbol(String),
	#[error("phoneme set '{0}' has no choices")]
	EmptyPhonemeSet(char),
	#[error("pattern '{0}' is empty")]
	EmptyPattern(String),
	#[error("wildcard must be the last character of pattern '{0}'")]
	MisplacedWildcard(String),
	#[error("replacement '{replacement}' uses '*' but pattern '{from}' captures nothing")]
	UnboundWildcard { from: String, replacement: String },
	#[error("rule '{0}' has no replacement")]
	EmptyReplacement(String),
	#[error("phonotactics register '{0}' has no selectable word type")]
	EmptyPhonotactics(String),
	#[error("unknown part of speech '{0}'")]
	UnknownPartOfSpeech(String),
	#[error("unknown language '{0}'")]
	UnknownLanguage(String),
	#[error("unknown phonotactics register '{0}'")]
	UnknownRegister(String),
	#[error("unknown concept '{0}'")]
	UnknownConcept(String),
	#[error("language '{name}': {source}")]
	Language {
		name: String,
		#[source]
		source: Box<ModelError>,
	},
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),
}

impl ModelError {
	/// Wraps an error with the name of the language being built.
	pub(crate) fn in_language(self, name: &str) -> Self {
		ModelError::Language {
			name: name.to_owned(),
			source: Box::new(self),
		}
	}
}

pub type ModelResult<T> = Result<T, ModelError>;
