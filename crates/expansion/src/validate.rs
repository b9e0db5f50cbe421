//! The Link Validator: a second pass over an already-resolved document that
//! checks every `url_field` value resolves into the index, the reverse
//! vocabulary, or (for `file://` URLs only) an on-disk file.

use schema_ld_core::context::Context;
use schema_ld_core::index::Index;
use schema_ld_core::url_expand::{split_absolute, urlunsplit};
use schema_ld_core::{Error, Node};

/// The identifier of a mapping node, if it has one.
fn getid(ctx: &Context, node: &Node) -> Option<String> {
	let map = node.as_mapping()?;
	for identifier in &ctx.identifiers {
		if let Some(s) = map.get(identifier).and_then(Node::as_str) {
			return Some(s.to_string());
		}
	}
	None
}

/// `file://` URLs are checked against the local filesystem; any other
/// scheme without an index/`rvocab` hit is an unconditional failure (Open
/// Question (c)).
fn check_file(link: &str) -> bool {
	link.strip_prefix("file://").map(|path| std::path::Path::new(path).exists()).unwrap_or(false)
}

/// Walks up `docid`'s fragment hierarchy, popping `scoped_ref_fields[field]`
/// components first, then one component per iteration, trying `link`
/// appended at each level until a match is found in the index.
fn validate_scoped(ctx: &Context, index: &Index, field: &str, link: &str, docid: &str) -> Result<String, Error> {
	let depth = *ctx.scoped_ref_fields.get(field).expect("caller checked scoped_ref_fields");
	let (scheme, authority, path, query, fragment) = split_absolute(docid);
	let mut segments: Vec<String> = if fragment.is_empty() { Vec::new() } else { fragment.split('/').map(str::to_string).collect() };

	let mut remaining = depth;
	while remaining > 0 && !segments.is_empty() {
		segments.pop();
		remaining -= 1;
	}

	let mut tried = Vec::new();
	loop {
		segments.push(link.to_string());
		let candidate = urlunsplit(&scheme, &authority, &path, query.as_deref(), &segments.join("/"));
		tried.push(candidate.clone());
		if index.contains(&candidate) {
			return Ok(candidate);
		}
		segments.pop();
		if segments.is_empty() {
			break;
		}
		segments.pop();
	}

	Err(Error::unknown_reference(format!(
		"field `{field}` contains undefined reference to `{link}`, tried {tried:?}"
	)))
}

/// Validates one `url_field` value: a string, a list (validated
/// element-wise, errors aggregated), or a mapping (recursed into via
/// [`validate_links`]). Fields in `nolinkcheck` are returned unchanged.
fn validate_link(ctx: &Context, index: &Index, field: &str, link: Node, docid: &str) -> Result<Node, Error> {
	if ctx.nolinkcheck.contains(field) {
		return Ok(link);
	}

	match link {
		Node::String(s) => {
			let in_vocab_scope = if ctx.vocab_fields.contains(field) {
				ctx.vocab.contains_key(&s) || index.contains(&s) || ctx.rvocab.contains_key(&s)
			} else {
				index.contains(&s) || ctx.rvocab.contains_key(&s)
			};
			if in_vocab_scope {
				return Ok(Node::String(s));
			}
			if ctx.scoped_ref_fields.contains_key(field) {
				return Ok(Node::string(validate_scoped(ctx, index, field, &s, docid)?));
			}
			if check_file(&s) {
				return Ok(Node::String(s));
			}
			Err(Error::unknown_reference(format!("field `{field}` contains undefined reference to `{s}`")))
		}
		Node::Sequence(items) => {
			let mut out = Vec::with_capacity(items.len());
			let mut errors = Vec::new();
			for item in items {
				match validate_link(ctx, index, field, item, docid) {
					Ok(v) => out.push(v),
					Err(e) => errors.push(e),
				}
			}
			if let Some(e) = Error::join(errors) {
				return Err(e);
			}
			Ok(Node::Sequence(out))
		}
		Node::Mapping(_) => validate_links(ctx, index, link, docid),
		_ => Err(Error::BadLinkType),
	}
}

/// Validates every `url_field` present in `doc` (and recursively, every
/// nested mapping/list), establishing `docid` from `getid(doc)` or falling
/// back to `base`. A single validation failure is returned unchanged; more
/// than one is joined via [`Error::join`].
pub fn validate_links(ctx: &Context, index: &Index, document: Node, base: &str) -> Result<Node, Error> {
	let docid = getid(ctx, &document).unwrap_or_else(|| base.to_string());

	match document {
		Node::Mapping(mut map) => {
			let mut errors = Vec::new();
			for field in ctx.url_fields.iter() {
				if ctx.identity_links.contains(field) {
					continue;
				}
				if let Some(value) = map.get(field).cloned() {
					match validate_link(ctx, index, field, value, &docid) {
						Ok(validated) => {
							map.insert(field.clone(), validated);
						}
						Err(e) => errors.push(e),
					}
				}
			}
			if let Some(e) = Error::join(errors) {
				return Err(e);
			}

			let keys: Vec<String> = map.keys().cloned().collect();
			let mut nested_errors = Vec::new();
			for key in keys {
				let value = map.get(&key).cloned().unwrap_or(Node::Null);
				match validate_links(ctx, index, value.clone(), &docid) {
					Ok(validated) => {
						map.insert(key, validated);
					}
					Err(e) => {
						if ctx.nolinkcheck.contains(&key) {
							continue;
						}
						let wrapped = match getid(ctx, &value) {
							Some(id) => Error::context(format!("while checking object `{id}`\n{}", Error::indent(&e.to_string()))),
							None => Error::context(format!("while checking field `{key}`\n{}", Error::indent(&e.to_string()))),
						};
						nested_errors.push(wrapped);
					}
				}
			}
			if let Some(e) = Error::join(nested_errors) {
				return Err(e);
			}
			Ok(Node::Mapping(map))
		}
		Node::Sequence(items) => {
			let mut out = Vec::with_capacity(items.len());
			let mut errors = Vec::new();
			for (i, item) in items.into_iter().enumerate() {
				match validate_links(ctx, index, item, &docid) {
					Ok(v) => out.push(v),
					Err(e) => errors.push(Error::context(format!("while checking position {i}\n{}", Error::indent(&e.to_string())))),
				}
			}
			if let Some(e) = Error::join(errors) {
				return Err(e);
			}
			Ok(Node::Sequence(out))
		}
		other => Ok(other),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use schema_ld_syntax::Mapping;

	fn mapping(pairs: Vec<(&str, Node)>) -> Mapping {
		pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
	}

	#[test]
	fn resolved_reference_present_in_index_passes() {
		let mut ctx = Context::new();
		ctx.url_fields.insert("run".to_string());
		let mut index = Index::new();
		index.insert("file:///b.yaml", Node::mapping());
		let doc = Node::Mapping(mapping(vec![("run", Node::string("file:///b.yaml"))]));
		let result = validate_links(&ctx, &index, doc, "file:///a.yaml").unwrap();
		assert!(result.is_mapping());
	}

	#[test]
	fn missing_reference_fails() {
		let mut ctx = Context::new();
		ctx.url_fields.insert("run".to_string());
		let index = Index::new();
		let doc = Node::Mapping(mapping(vec![("run", Node::string("file:///missing.yaml"))]));
		assert!(validate_links(&ctx, &index, doc, "file:///a.yaml").is_err());
	}

	#[test]
	fn scoped_reference_resolves_by_walking_up_the_fragment() {
		let mut ctx = Context::new();
		ctx.url_fields.insert("source".to_string());
		ctx.scoped_ref_fields.insert("source".to_string(), 2);
		let mut index = Index::new();
		index.insert("file:///w#main/outA", Node::mapping());
		assert_eq!(
			validate_scoped(&ctx, &index, "source", "outA", "file:///w#main/x/step1").unwrap(),
			"file:///w#main/outA"
		);
	}

	#[test]
	fn nolinkcheck_field_is_never_validated() {
		let mut ctx = Context::new();
		ctx.url_fields.insert("run".to_string());
		ctx.nolinkcheck.insert("run".to_string());
		let index = Index::new();
		let doc = Node::Mapping(mapping(vec![("run", Node::string("file:///missing.yaml"))]));
		assert!(validate_links(&ctx, &index, doc, "file:///a.yaml").is_ok());
	}
}
