use indexmap::IndexMap;
use std::fmt;

/// An ordered mapping from field name to [`Node`].
///
/// Order is insertion order; it is preserved for diagnostics only, except
/// for idmap desugaring, where callers are required to iterate keys in
/// lexicographic order explicitly (the map itself does not sort).
pub type Mapping = IndexMap<String, Node>;

/// A YAML/JSON scalar number, kept as whichever shape the collaborator parser
/// produced it in rather than normalized to a single Rust numeric type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
	Int(i64),
	Float(f64),
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(i) => write!(f, "{i}"),
			Self::Float(v) => write!(f, "{v}"),
		}
	}
}

/// A node in the raw document tree: a scalar, an ordered sequence, or an
/// ordered mapping. Field values are never parsed further than this by the
/// collaborator — every structural decision (identifiers, URL fields, idmap,
/// type-DSL, ...) happens downstream, driven by the [`Context`].
///
/// [`Context`]: ../schema_ld_core/context/struct.Context.html
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	Null,
	Bool(bool),
	Number(Number),
	String(String),
	Sequence(Vec<Node>),
	Mapping(Mapping),
}

impl Node {
	pub fn string(s: impl Into<String>) -> Self {
		Self::String(s.into())
	}

	pub fn mapping() -> Self {
		Self::Mapping(Mapping::new())
	}

	pub fn mapping_from(pairs: Vec<(&str, Node)>) -> Self {
		Self::Mapping(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_mapping(&self) -> Option<&Mapping> {
		match self {
			Self::Mapping(m) => Some(m),
			_ => None,
		}
	}

	pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
		match self {
			Self::Mapping(m) => Some(m),
			_ => None,
		}
	}

	pub fn as_sequence(&self) -> Option<&[Node]> {
		match self {
			Self::Sequence(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Node>> {
		match self {
			Self::Sequence(s) => Some(s),
			_ => None,
		}
	}

	pub fn is_mapping(&self) -> bool {
		matches!(self, Self::Mapping(_))
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Collects the string elements of a `Sequence`, skipping non-string
	/// elements (callers that need to reject non-strings check that
	/// separately; several rewriter steps only touch the string elements of
	/// a mixed list and leave the rest untouched).
	pub fn string_elements(&self) -> Vec<&str> {
		match self {
			Self::Sequence(items) => items.iter().filter_map(Node::as_str).collect(),
			_ => Vec::new(),
		}
	}
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => write!(f, "null"),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Number(n) => write!(f, "{n}"),
			Self::String(s) => write!(f, "{s:?}"),
			Self::Sequence(items) => {
				write!(f, "[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{item}")?;
				}
				write!(f, "]")
			}
			Self::Mapping(m) => {
				write!(f, "{{")?;
				for (i, (k, v)) in m.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{k:?}: {v}")?;
				}
				write!(f, "}}")
			}
		}
	}
}

impl From<&str> for Node {
	fn from(s: &str) -> Self {
		Self::String(s.to_owned())
	}
}

impl From<String> for Node {
	fn from(s: String) -> Self {
		Self::String(s)
	}
}

impl From<bool> for Node {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

impl From<Vec<Node>> for Node {
	fn from(v: Vec<Node>) -> Self {
		Self::Sequence(v)
	}
}

impl From<Mapping> for Node {
	fn from(m: Mapping) -> Self {
		Self::Mapping(m)
	}
}
