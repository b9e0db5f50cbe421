use std::fmt;

/// The resolver's error taxonomy. Every fallible operation in this workspace
/// returns (a `Result` wrapping) one of these variants, except
/// [`Error::Validation`], which callers build up by joining several
/// [`Error`]s collected across the siblings of a mapping or the elements of a
/// list (see [`Error::join`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Malformed YAML/JSON text.
	#[error("syntax error: {0}")]
	Syntax(String),

	/// I/O or HTTP transport failure.
	#[error("transport failure fetching `{url}`: {cause}")]
	Transport { url: String, cause: String },

	/// A URL scheme the fetcher does not handle.
	#[error("unsupported scheme in url: {0}")]
	UnsupportedScheme(String),

	/// `$import`/`$include` with sibling fields, a non-string identifier
	/// value, or an idmap value that is neither a mapping nor convertible via
	/// `mapPredicate`.
	#[error("{0}")]
	DirectiveMisuse(String),

	/// A URL (or fragment) that is not present in the index after resolution.
	#[error("{0}")]
	UnknownReference(String),

	/// A context was built on top of a loader whose vocabulary is already
	/// populated.
	#[error("refreshing context that already has stuff in it")]
	ContextRebuild,

	/// A URL-field value that is neither a string, a list, nor a mapping.
	#[error("link must be a string, list, or mapping")]
	BadLinkType,

	/// One or more link-validation failures collected across the siblings of
	/// a mapping or the elements of a list. Displays as the single inner
	/// error unchanged when there is exactly one, or as all inner errors
	/// joined with newlines when there are several.
	#[error("{}", join_messages(.0))]
	Validation(Vec<Error>),

	/// A lower-level error re-thrown with a short description of where it
	/// happened: the loader identity and file base during resolution, or
	/// the field name/list position during link validation. Carries the
	/// fully formatted message rather than a structured cause chain,
	/// matching the habit of re-raising with positional context baked into
	/// the text.
	#[error("{0}")]
	Context(String),
}

fn join_messages(errors: &[Error]) -> String {
	errors
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join("\n")
}

impl Error {
	/// Builds a [`Error::Validation`] from collected errors: a single error is
	/// returned unchanged, not wrapped, so joining is transparent to callers
	/// that only expect one.
	pub fn join(mut errors: Vec<Error>) -> Option<Error> {
		match errors.len() {
			0 => None,
			1 => errors.pop(),
			_ => Some(Error::Validation(errors)),
		}
	}

	pub fn directive_misuse(msg: impl fmt::Display) -> Self {
		Self::DirectiveMisuse(msg.to_string())
	}

	pub fn unknown_reference(msg: impl fmt::Display) -> Self {
		Self::UnknownReference(msg.to_string())
	}

	pub fn context(msg: impl fmt::Display) -> Self {
		Self::Context(msg.to_string())
	}

	/// Indents every line of `s` by two spaces, used when nesting one error's
	/// text inside another's.
	pub fn indent(s: &str) -> String {
		s.lines().map(|line| format!("  {line}")).collect::<Vec<_>>().join("\n")
	}
}
