//! Loader, Document Rewriter, Reference Resolver and Link Validator for
//! schema-ld documents: the layer that turns raw YAML/JSON text into a fully
//! expanded, cross-referenced document tree.

mod loader;
mod resolve;
mod rewrite;
mod validate;
mod yaml;

pub use loader::{Loader, SharedState};
pub use resolve::{resolve_all, resolve_ref};
pub use validate::validate_links;
pub use yaml::parse as parse_yaml;
pub use yaml::to_string as yaml_to_string;

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::HashMap;

	use schema_ld_core::fetch::TextFetcher;
	use schema_ld_core::{Error, Mapping, Node};

	use super::*;

	/// An in-memory fetcher backed by a fixed URL → text map, for exercising
	/// the resolver end to end without touching the filesystem or network.
	struct MapFetcher {
		docs: RefCell<HashMap<String, String>>,
	}

	impl MapFetcher {
		fn new(docs: &[(&str, &str)]) -> Self {
			Self {
				docs: RefCell::new(docs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()),
			}
		}
	}

	impl TextFetcher for MapFetcher {
		fn fetch_text(&self, url: &str) -> Result<String, Error> {
			self.docs
				.borrow()
				.get(url)
				.cloned()
				.ok_or_else(|| Error::Transport { url: url.to_string(), cause: "not found".to_string() })
		}
	}

	fn loader_with(docs: &[(&str, &str)]) -> Loader<MapFetcher> {
		let mut context = Mapping::new();
		context.insert("id".to_string(), Node::string("@id"));
		context.insert("run".to_string(), Node::mapping_from(vec![("@type", Node::string("@id"))]));
		Loader::new(MapFetcher::new(docs), &context).unwrap()
	}

	#[test]
	fn import_is_replaced_with_the_imported_documents_content() {
		let mut loader = loader_with(&[
			("file:///a.yaml", "id: a\nrun: {$import: 'file:///b.yaml'}\n"),
			("file:///b.yaml", "id: b\nfoo: bar\n"),
		]);
		let doc = parse_yaml(&loader.fetch_text("file:///a.yaml").unwrap()).unwrap();
		let (resolved, _) = resolve_all(&mut loader, doc, "file:///a.yaml".to_string(), "file:///a.yaml", false).unwrap();
		let map = resolved.as_mapping().unwrap();
		let run = map.get("run").unwrap().as_mapping().unwrap();
		assert_eq!(run.get("foo"), Some(&Node::string("bar")));
	}

	#[test]
	fn import_of_a_graph_fragment_resolves_to_the_named_entry() {
		let mut ctx = Mapping::new();
		ctx.insert("id".to_string(), Node::string("@id"));
		let mut loader = Loader::new(
			MapFetcher::new(&[
				("file:///root.yaml", "steps: [{$import: 'file:///b.yaml#step1'}]\n"),
				("file:///b.yaml", "id: b.yaml\n$graph:\n  - {id: step1, run: echo}\n"),
			]),
			&ctx,
		)
		.unwrap();
		let doc = parse_yaml(&loader.fetch_text("file:///root.yaml").unwrap()).unwrap();
		let (resolved, _) = resolve_all(&mut loader, doc, "file:///root.yaml".to_string(), "file:///root.yaml", false).unwrap();
		let map = resolved.as_mapping().unwrap();
		let steps = map.get("steps").unwrap().as_sequence().unwrap();
		let step0 = steps[0].as_mapping().unwrap();
		assert_eq!(step0.get("id"), Some(&Node::string("file:///b.yaml#step1")));
		assert_eq!(step0.get("run"), Some(&Node::string("echo")));
	}

	#[test]
	fn include_is_replaced_with_raw_text() {
		let mut loader = loader_with(&[
			("file:///a.yaml", "id: a\nrun: {$include: 'file:///notes.txt'}\n"),
			("file:///notes.txt", "plain text, not yaml: [unterminated"),
		]);
		let doc = parse_yaml(&loader.fetch_text("file:///a.yaml").unwrap()).unwrap();
		let (resolved, _) = resolve_all(&mut loader, doc, "file:///a.yaml".to_string(), "file:///a.yaml", false).unwrap();
		let map = resolved.as_mapping().unwrap();
		assert_eq!(map.get("run"), Some(&Node::string("plain text, not yaml: [unterminated")));
	}

	#[test]
	fn mixin_overlays_sibling_keys_on_the_fetched_document() {
		let mut loader = loader_with(&[
			("file:///a.yaml", "id: a\nrun: {$mixin: 'file:///base.yaml', extra: yes, label: from-mixin}\n"),
			("file:///base.yaml", "id: base\nfoo: bar\nlabel: from-base\n"),
		]);
		let doc = parse_yaml(&loader.fetch_text("file:///a.yaml").unwrap()).unwrap();
		let (resolved, _) = resolve_all(&mut loader, doc, "file:///a.yaml".to_string(), "file:///a.yaml", false).unwrap();
		let map = resolved.as_mapping().unwrap();
		let run = map.get("run").unwrap().as_mapping().unwrap();
		assert_eq!(run.get("foo"), Some(&Node::string("bar")));
		assert_eq!(run.get("extra"), Some(&Node::Bool(true)));
		assert_eq!(run.get("label"), Some(&Node::string("from-mixin")));
		assert!(run.get("$mixin").is_none());

		let index = loader.index().borrow();
		let base = index.get("file:///base.yaml").unwrap().as_mapping().unwrap();
		assert_eq!(base.get("label"), Some(&Node::string("from-base")));
		assert_eq!(base.get("foo"), Some(&Node::string("bar")));
	}

	#[test]
	fn import_with_sibling_keys_is_a_directive_misuse_error() {
		let mut loader = loader_with(&[("file:///a.yaml", "id: a\nrun: {$import: 'file:///b.yaml', extra: yes}\n")]);
		let doc = parse_yaml(&loader.fetch_text("file:///a.yaml").unwrap()).unwrap();
		let result = resolve_all(&mut loader, doc, "file:///a.yaml".to_string(), "file:///a.yaml", false);
		assert!(result.is_err());
	}

	#[test]
	fn identifiers_are_scoped_under_the_enclosing_documents_fragment() {
		let mut loader = loader_with(&[("file:///wf.yaml", "id: main\nrun: {id: step1, foo: bar}\n")]);
		let doc = parse_yaml(&loader.fetch_text("file:///wf.yaml").unwrap()).unwrap();
		let (resolved, _) = resolve_all(&mut loader, doc, "file:///wf.yaml".to_string(), "file:///wf.yaml", false).unwrap();
		let map = resolved.as_mapping().unwrap();
		assert_eq!(map.get("id"), Some(&Node::string("file:///wf.yaml#main")));
		let run = map.get("run").unwrap().as_mapping().unwrap();
		assert_eq!(run.get("id"), Some(&Node::string("file:///wf.yaml#main/step1")));
	}

	#[test]
	fn resolving_an_already_resolved_document_again_is_a_no_op() {
		let mut loader = loader_with(&[("file:///wf.yaml", "id: main\nrun: {id: step1, foo: bar}\n")]);
		let doc = parse_yaml(&loader.fetch_text("file:///wf.yaml").unwrap()).unwrap();
		let (resolved_once, _) = resolve_all(&mut loader, doc, "file:///wf.yaml".to_string(), "file:///wf.yaml", false).unwrap();
		let (resolved_twice, _) =
			resolve_all(&mut loader, resolved_once.clone(), "file:///wf.yaml".to_string(), "file:///wf.yaml", false).unwrap();
		assert_eq!(resolved_once, resolved_twice);
	}

	#[test]
	fn checklinks_catches_an_unresolvable_reference() {
		let mut ctx = Mapping::new();
		ctx.insert("run".to_string(), Node::mapping_from(vec![("@type", Node::string("@id"))]));
		let mut loader = Loader::new(MapFetcher::new(&[("file:///a.yaml", "run: 'file:///missing.yaml'\n")]), &ctx).unwrap();
		let doc = parse_yaml(&loader.fetch_text("file:///a.yaml").unwrap()).unwrap();
		let result = resolve_all(&mut loader, doc, "file:///a.yaml".to_string(), "file:///a.yaml", true);
		assert!(result.is_err());
	}
}
