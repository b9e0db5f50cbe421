//! Schema-aware reference resolver for a JSON-LD-inspired workflow schema
//! format: loads a document, desugars its shorthand, expands every
//! identifier and reference against a compiled vocabulary, and (optionally)
//! validates that every reference it produced actually resolves.
//!
//! This crate re-exports the workspace's pieces and adds [`new_loader`], the
//! single entry point most callers need.

pub use schema_ld_core::context::Context;
pub use schema_ld_core::fetch::{self, TextFetcher};
pub use schema_ld_core::graph::{self, Graph, SchemaFormat, Triple};
pub use schema_ld_core::index::Index;
pub use schema_ld_core::url_expand::{self, expand_url, ExpandOptions};
pub use schema_ld_core::{Error, Mapping, Node, Number};
pub use schema_ld_context_processing::{add_schema, build_context};
pub use schema_ld_expansion::{parse_yaml, resolve_all, resolve_ref, validate_links, yaml_to_string, Loader, SharedState};

/// Builds a loader compiling `context`, sharing `shared`'s index, RDF graph,
/// foreign-property set, and text cache with whatever else already holds it.
/// Pass [`SharedState::default()`] to start a fresh, unshared loader instead.
pub fn new_loader<F: TextFetcher>(fetcher: F, context: &Mapping, shared: SharedState) -> Result<Loader<F>, Error> {
	Loader::with_shared(fetcher, context, shared)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::RefCell;
	use std::collections::HashMap;

	struct MapFetcher(RefCell<HashMap<String, String>>);

	impl TextFetcher for MapFetcher {
		fn fetch_text(&self, url: &str) -> Result<String, Error> {
			self.0.borrow().get(url).cloned().ok_or_else(|| Error::Transport { url: url.to_string(), cause: "not found".to_string() })
		}
	}

	#[test]
	fn new_loader_shares_state_across_two_handles() {
		let shared = SharedState::default();
		let docs: HashMap<String, String> = [("file:///a.yaml".to_string(), "foo: bar\n".to_string())].into_iter().collect();
		let fetcher = MapFetcher(RefCell::new(docs));

		let loader_a = new_loader(fetcher, &Mapping::new(), shared.clone()).unwrap();
		let _ = loader_a.fetch_text("file:///a.yaml").unwrap();

		assert!(std::rc::Rc::ptr_eq(loader_a.index(), &shared.index));
	}
}
