use indexmap::IndexSet;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// The compiled form of a `@context`-like mapping. Immutable once built:
/// `schema_ld_context_processing::build_context` produces one from a raw
/// mapping, and a loader that already has one rejects another with
/// [`crate::Error::ContextRebuild`].
///
/// `foreign_properties` is the one field that survives a rebuild: a
/// sub-loader gets a fresh `Context` (distinct vocabulary, fields, idmap...)
/// but keeps pointing at the *same* foreign-property set as its parent,
/// shared across sub-loaders rather than owned per-context. A caller
/// building a brand new, unrelated `Context` gets its own empty set;
/// carrying the parent's handle across a rebuild is the loader's job (see
/// `schema_ld_expansion::Loader::add_context`/`sub_loader`).
#[derive(Debug, Clone)]
pub struct Context {
	/// Prefix/term → absolute URL.
	pub vocab: HashMap<String, String>,
	/// Inverse of `vocab`, after expanding each value (absolute URL → term).
	pub rvocab: HashMap<String, String>,
	/// Field names whose string value is the node's identifier. Order is
	/// insertion order: "first match wins" when more than one is present on
	/// a node.
	pub identifiers: IndexSet<String>,
	/// Field names whose string values are URLs to expand/resolve.
	pub url_fields: HashSet<String>,
	/// Subset of `url_fields` whose values are also vocabulary terms.
	pub vocab_fields: HashSet<String>,
	/// Subset of `url_fields` (plus any identifier fields marked `identity`)
	/// naming standalone identities, scoped like identifiers.
	pub identity_links: IndexSet<String>,
	/// Field → upward-search depth for scoped references.
	pub scoped_ref_fields: HashMap<String, u32>,
	/// Fields whose references are never link-validated.
	pub nolinkcheck: HashSet<String>,
	/// Field → subject-key name, for idmap desugaring.
	pub idmap: HashMap<String, String>,
	/// Field → attribute name used when an idmap value is a scalar.
	pub map_predicate: HashMap<String, String>,
	/// Fields subject to the type-DSL rewrite.
	pub type_dsl_fields: HashSet<String>,
	/// URLs known to the graph but outside the vocabulary (populated by
	/// `schema_ld_context_processing::add_schema`). Shared across sub-loaders.
	pub foreign_properties: Rc<RefCell<HashSet<String>>>,
}

impl Context {
	pub fn new() -> Self {
		Self::with_foreign_properties(Rc::new(RefCell::new(HashSet::new())))
	}

	/// Builds an empty context that shares its foreign-property set with an
	/// existing one — the shape a sub-loader's fresh context takes.
	pub fn with_foreign_properties(foreign_properties: Rc<RefCell<HashSet<String>>>) -> Self {
		Self {
			vocab: HashMap::new(),
			rvocab: HashMap::new(),
			identifiers: IndexSet::new(),
			url_fields: HashSet::new(),
			vocab_fields: HashSet::new(),
			identity_links: IndexSet::new(),
			scoped_ref_fields: HashMap::new(),
			nolinkcheck: HashSet::new(),
			idmap: HashMap::new(),
			map_predicate: HashMap::new(),
			type_dsl_fields: HashSet::new(),
			foreign_properties,
		}
	}

	/// A context is "empty" (buildable) iff its vocabulary has never been
	/// populated.
	pub fn is_empty(&self) -> bool {
		self.vocab.is_empty()
	}
}

impl Default for Context {
	fn default() -> Self {
		Self::new()
	}
}
