use indexmap::IndexMap;
use schema_ld_syntax::Node;

/// Canonicalizes a URL by parse-then-reassemble. Falls back to the input
/// unchanged when it doesn't parse as an absolute URL — this happens
/// routinely for scoped-ref search candidates and vocabulary terms, which
/// pass through the same code paths as real URLs but aren't always one yet.
pub fn normalize(url: &str) -> String {
	match url::Url::parse(url) {
		Ok(parsed) => parsed.to_string(),
		Err(_) => url.to_owned(),
	}
}

/// The shared, normalizing URL → [`Node`] store. Entries are created by
/// fetching and by identifier assignment and are never deleted; re-inserting
/// under the same normalized key overwrites the previous value.
///
/// A stored [`Node::Null`] or [`Node::String`] value is a *placeholder*: an
/// RDF schema subject registered by [`crate::graph::Graph::add_schemas`]
/// (`Null`), or a not-yet-fetched identifier recorded ahead of its document
/// (`String`, carrying the URL it was assigned from).
#[derive(Debug, Default, Clone)]
pub struct Index {
	map: IndexMap<String, Node>,
}

impl Index {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, url: &str) -> bool {
		self.map.contains_key(&normalize(url))
	}

	pub fn get(&self, url: &str) -> Option<&Node> {
		self.map.get(&normalize(url))
	}

	pub fn insert(&mut self, url: &str, value: Node) {
		self.map.insert(normalize(url), value);
	}

	pub fn remove(&mut self, url: &str) -> Option<Node> {
		self.map.shift_remove(&normalize(url))
	}

	/// Whether the placeholder at `url` is a bare `String`/`Null` rather than
	/// a fully resolved document — used by `_resolve_identifier` to decide
	/// whether an already-registered identifier should be overwritten with
	/// the real document.
	pub fn is_placeholder(&self, url: &str) -> bool {
		matches!(
			self.map.get(&normalize(url)),
			Some(Node::Null) | Some(Node::String(_))
		)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.map.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_equivalent_urls_to_the_same_key() {
		let mut idx = Index::new();
		idx.insert("http://EXAMPLE.org:80/a", Node::string("first"));
		assert!(idx.contains("http://example.org/a"));
		assert_eq!(idx.get("http://example.org/a"), Some(&Node::string("first")));
	}

	#[test]
	fn placeholder_detection() {
		let mut idx = Index::new();
		idx.insert("file:///a", Node::Null);
		idx.insert("file:///b", Node::string("file:///b"));
		idx.insert("file:///c", Node::mapping());
		assert!(idx.is_placeholder("file:///a"));
		assert!(idx.is_placeholder("file:///b"));
		assert!(!idx.is_placeholder("file:///c"));
	}
}
