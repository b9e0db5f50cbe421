use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use schema_ld_core::context::Context;
use schema_ld_core::fetch::TextFetcher;
use schema_ld_core::graph::{self, Graph};
use schema_ld_core::index::Index;
use schema_ld_core::url_expand::{expand_url, ExpandOptions};
use schema_ld_core::{Error, Mapping, Node};

use crate::yaml;

/// The state a sub-loader must inherit from its parent: the index, RDF
/// graph, foreign-property set, and fetched-text cache are all shared
/// read-write across a loader and every sub-loader it spawns.
#[derive(Clone)]
pub struct SharedState {
	pub graph: Rc<RefCell<Graph>>,
	pub foreign_properties: Rc<RefCell<HashSet<String>>>,
	pub index: Rc<RefCell<Index>>,
	pub cache: Rc<RefCell<HashMap<String, String>>>,
}

impl Default for SharedState {
	fn default() -> Self {
		Self {
			graph: Rc::new(RefCell::new(Graph::new())),
			foreign_properties: Rc::new(RefCell::new(HashSet::new())),
			index: Rc::new(RefCell::new(Index::new())),
			cache: Rc::new(RefCell::new(HashMap::new())),
		}
	}
}

/// Fetches, rewrites, resolves, and link-validates schema-ld documents.
///
/// Holds its shared state (index, graph, foreign properties, text cache)
/// behind `Rc<RefCell<_>>`: single-threaded, shared-by-reference, no
/// locking. A sub-loader clones these handles rather than the data they
/// point to, so mutations made through one loader are visible through
/// every loader sharing its state. `Loader` is therefore intentionally
/// `!Send`/`!Sync` — callers must serialize external use of one loader
/// across threads themselves.
pub struct Loader<F> {
	pub(crate) context: Context,
	pub(crate) index: Rc<RefCell<Index>>,
	pub(crate) graph: Rc<RefCell<Graph>>,
	pub(crate) text_cache: Rc<RefCell<HashMap<String, String>>>,
	pub(crate) fetcher: Rc<F>,
}

impl<F: TextFetcher> Loader<F> {
	/// Builds a loader with a fresh index, graph, and cache, compiling
	/// `context` right away.
	pub fn new(fetcher: F, context: &Mapping) -> Result<Self, Error> {
		Self::with_shared(fetcher, context, SharedState::default())
	}

	/// Builds a loader that shares `shared`'s index/graph/foreign
	/// properties/cache with whatever else already holds it — the
	/// constructor shape `new_loader(context, [shared_graph,
	/// shared_foreign_properties, shared_index, shared_cache])` calls for.
	pub fn with_shared(fetcher: F, context: &Mapping, shared: SharedState) -> Result<Self, Error> {
		let mut loader = Self {
			context: Context::with_foreign_properties(shared.foreign_properties),
			index: shared.index,
			graph: shared.graph,
			text_cache: shared.cache,
			fetcher: Rc::new(fetcher),
		};
		loader.add_context(context)?;
		Ok(loader)
	}

	pub fn context(&self) -> &Context {
		&self.context
	}

	pub fn index(&self) -> &Rc<RefCell<Index>> {
		&self.index
	}

	/// Compiles `raw` into this loader's context. Fails if a context has
	/// already been built.
	pub fn add_context(&mut self, raw: &Mapping) -> Result<(), Error> {
		if !self.context.is_empty() {
			return Err(Error::ContextRebuild);
		}
		let foreign_properties = Rc::clone(&self.context.foreign_properties);
		let mut built = schema_ld_context_processing::build_context(raw);
		built.foreign_properties = foreign_properties;
		self.context = built;
		Ok(())
	}

	/// Adds vocabulary prefixes directly, bypassing `add_context`'s
	/// rebuild guard — used by `$namespaces`.
	pub fn add_namespaces(&mut self, ns: &Mapping) {
		for (key, value) in ns {
			if let Some(s) = value.as_str() {
				self.context.vocab.insert(key.clone(), s.to_string());
			}
		}
	}

	/// Registers RDF schemas relative to `base`, classifying properties into
	/// `url_fields`/`foreign_properties`. A schema that fails to fetch is
	/// logged and skipped, mirroring `add_schemas`'s silent per-format
	/// fallthrough extended to the fetch step itself.
	pub fn add_schemas(&mut self, schemas: &[String], base: &str) -> Result<(), Error> {
		let formats = graph::default_formats();
		for schema in schemas {
			let joined = join_url(base, schema);
			let text = match self.fetch_text(&joined) {
				Ok(text) => text,
				Err(e) => {
					log::warn!("could not fetch schema `{joined}`: {e}");
					continue;
				}
			};
			let mut graph_store = self.graph.borrow_mut();
			let mut index = self.index.borrow_mut();
			schema_ld_context_processing::add_schema(
				&mut self.context,
				&mut graph_store,
				&mut index,
				&formats,
				&text,
				&joined,
			);
		}
		Ok(())
	}

	/// Returns cached text for `url` if present, else fetches and caches it.
	pub fn fetch_text(&self, url: &str) -> Result<String, Error> {
		if let Some(text) = self.text_cache.borrow().get(url) {
			return Ok(text.clone());
		}
		let text = self.fetcher.fetch_text(url)?;
		self.text_cache.borrow_mut().insert(url.to_string(), text.clone());
		Ok(text)
	}

	/// Returns the indexed node at `url` if already fetched. Otherwise
	/// fetches and parses it, injecting `url` into every absent identifier
	/// field and indexing the result under every identifier's expansion
	/// (default, non-scoped) when `inject_ids` and the context declares at
	/// least one identifier field; indexes under the bare `url` otherwise.
	pub fn fetch(&mut self, url: &str, inject_ids: bool) -> Result<Node, Error> {
		if let Some(existing) = self.index.borrow().get(url).cloned() {
			return Ok(existing);
		}

		let text = self.fetch_text(url)?;
		let mut result = yaml::parse(&text)?;

		let identifiers: Vec<String> = self.context.identifiers.iter().cloned().collect();
		if result.is_mapping() && inject_ids && !identifiers.is_empty() {
			if let Some(map) = result.as_mapping_mut() {
				for identifier in &identifiers {
					if !map.contains_key(identifier) {
						map.insert(identifier.clone(), Node::string(url));
					}
				}
			}
			for identifier in &identifiers {
				let id_value = result.as_mapping().and_then(|m| m.get(identifier)).and_then(Node::as_str).map(str::to_string);
				if let Some(id_value) = id_value {
					let key = expand_url(&self.context, &id_value, url, ExpandOptions::default());
					self.index.borrow_mut().insert(&key, result.clone());
				}
			}
		} else {
			self.index.borrow_mut().insert(url, result.clone());
		}

		Ok(result)
	}

	/// Produces a child loader sharing index/graph/foreign
	/// properties/cache/fetcher, starting from an empty compiled context to
	/// be populated by `$namespaces`/`$schemas`.
	pub fn sub_loader(&self) -> Self {
		Self {
			context: Context::with_foreign_properties(Rc::clone(&self.context.foreign_properties)),
			index: Rc::clone(&self.index),
			graph: Rc::clone(&self.graph),
			text_cache: Rc::clone(&self.text_cache),
			fetcher: Rc::clone(&self.fetcher),
		}
	}
}

fn join_url(base: &str, relative: &str) -> String {
	match url::Url::parse(base).and_then(|b| b.join(relative)) {
		Ok(joined) => joined.to_string(),
		Err(_) => relative.to_string(),
	}
}

/// Collects the string elements of a list-or-scalar node.
pub(crate) fn string_list(node: &Node) -> Vec<String> {
	match node {
		Node::String(s) => vec![s.clone()],
		Node::Sequence(items) => items.iter().filter_map(Node::as_str).map(str::to_string).collect(),
		_ => Vec::new(),
	}
}
