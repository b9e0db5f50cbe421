//! Per-node transformations applied to every mapping before it is recursed
//! into: field-name normalization, idmap desugaring, type-DSL desugaring,
//! identifier resolution, identity-link resolution, and URL-field expansion.
//! Applied in that fixed order by `resolve_all`.

use std::cell::RefCell;
use std::rc::Rc;

use schema_ld_core::context::Context;
use schema_ld_core::index::Index;
use schema_ld_core::url_expand::{expand_url, ExpandOptions};
use schema_ld_core::{Error, Mapping, Node};

/// Replaces every key with its vocabulary-normalized form
/// (`expand_url(key, "", vocab_term=true)`), canonicalizing prefixed and
/// already-absolute field names down to bare vocabulary terms.
pub fn normalize_fields(ctx: &Context, document: &mut Mapping) {
	let keys: Vec<String> = document.keys().cloned().collect();
	for key in keys {
		let expanded = expand_url(ctx, &key, "", ExpandOptions { vocab_term: true, ..Default::default() });
		if expanded != key {
			if let Some(value) = document.shift_remove(&key) {
				document.insert(expanded, value);
			}
		}
	}
}

/// Desugars every idmap field present whose value is a mapping not carrying
/// `$import`/`$include`: promotes each key to the declared subject attribute
/// and replaces the field with the resulting list, keys visited in
/// lexicographic order.
pub fn resolve_idmap(ctx: &Context, document: &mut Mapping) -> Result<(), Error> {
	let idmap: Vec<(String, String)> = ctx.idmap.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
	for (idmap_field, subject_key) in idmap {
		let Some(Node::Mapping(inner)) = document.get(&idmap_field) else {
			continue;
		};
		if inner.contains_key(schema_ld_syntax::keyword::IMPORT) || inner.contains_key(schema_ld_syntax::keyword::INCLUDE) {
			continue;
		}

		let mut keys: Vec<String> = inner.keys().cloned().collect();
		keys.sort();

		let mut list = Vec::with_capacity(keys.len());
		for key in keys {
			let value = inner.get(&key).cloned().unwrap_or(Node::Null);
			let mut entry = match value {
				Node::Mapping(m) => m,
				other => {
					let Some(predicate) = ctx.map_predicate.get(&idmap_field) else {
						return Err(Error::directive_misuse(format!(
							"mapSubject `{key}` value `{other}` is not a mapping and `{idmap_field}` has no mapPredicate"
						)));
					};
					let mut m = Mapping::new();
					m.insert(predicate.clone(), other);
					m
				}
			};
			entry.insert(subject_key.clone(), Node::string(key));
			list.push(Node::Mapping(entry));
		}
		document.insert(idmap_field, Node::Sequence(list));
	}
	Ok(())
}

/// Matches the type-DSL grammar `^([^[?]+)(\[\])?(\?)?$` by hand: a first
/// group excluding `[`/`?`, an optional trailing `[]`, an optional trailing
/// `?`. Returns `None` (pass through unchanged) when `t` doesn't fit.
fn parse_type_dsl(t: &str) -> Option<(String, bool, bool)> {
	let (rest, has_question) = match t.strip_suffix('?') {
		Some(rest) => (rest, true),
		None => (t, false),
	};
	let (first, has_array) = match rest.strip_suffix("[]") {
		Some(first) => (first, true),
		None => (rest, false),
	};
	if first.is_empty() || first.contains('[') || first.contains('?') {
		return None;
	}
	Some((first.to_string(), has_array, has_question))
}

fn type_dsl_one(t: &str) -> Node {
	let Some((first, has_array, has_question)) = parse_type_dsl(t) else {
		return Node::string(t);
	};
	let base = if has_array {
		Node::mapping_from(vec![("type", Node::string("array")), ("items", Node::string(first))])
	} else {
		Node::string(first)
	};
	if has_question {
		Node::Sequence(vec![Node::string("null"), base])
	} else {
		base
	}
}

/// For every `type_dsl_field` present, rewrites string values (and the
/// string elements of list values) through [`type_dsl_one`]; when the
/// result is a list, flattens one level and deduplicates preserving
/// first-seen order.
pub fn resolve_type_dsl(ctx: &Context, document: &mut Mapping) {
	for field in ctx.type_dsl_fields.iter() {
		let Some(value) = document.get(field).cloned() else {
			continue;
		};
		let rewritten = match value {
			Node::String(s) => type_dsl_one(&s),
			Node::Sequence(items) => Node::Sequence(
				items
					.into_iter()
					.map(|item| match item {
						Node::String(s) => type_dsl_one(&s),
						other => other,
					})
					.collect(),
			),
			other => other,
		};

		let final_value = match rewritten {
			Node::Sequence(items) => {
				let mut flat = Vec::new();
				for item in items {
					match item {
						Node::Sequence(inner) => flat.extend(inner),
						other => flat.push(other),
					}
				}
				let mut seen: Vec<Node> = Vec::new();
				let mut uniq = Vec::new();
				for item in flat {
					if !seen.contains(&item) {
						seen.push(item.clone());
						uniq.push(item);
					}
				}
				Node::Sequence(uniq)
			}
			other => other,
		};
		document.insert(field.clone(), final_value);
	}
}

/// Expands every identifier field present (string-valued only; any other
/// shape is a hard error) with `scoped_id=true`, inserts the current node
/// into the index under the expanded URL unless something other than a
/// placeholder is already there, and advances `base_url` to the last
/// expanded identifier ("first match wins" for the returned base when
/// several identifier fields are present — later ones simply overwrite
/// the running `base_url`).
pub fn resolve_identifier(
	ctx: &Context,
	index: &Rc<RefCell<Index>>,
	document: &mut Mapping,
	mut base_url: String,
) -> Result<String, Error> {
	let identifiers: Vec<String> = ctx.identifiers.iter().cloned().collect();
	for identifier in identifiers {
		let Some(value) = document.get(&identifier).cloned() else {
			continue;
		};
		let Node::String(s) = value else {
			return Err(Error::directive_misuse(format!("identifier field `{identifier}` must be a string")));
		};
		let expanded = expand_url(ctx, &s, &base_url, ExpandOptions { scoped_id: true, ..Default::default() });
		document.insert(identifier, Node::string(expanded.clone()));

		let should_insert = {
			let idx = index.borrow();
			!idx.contains(&expanded) || idx.is_placeholder(&expanded)
		};
		if should_insert {
			index.borrow_mut().insert(&expanded, Node::Mapping(document.clone()));
		}
		base_url = expanded;
	}
	Ok(base_url)
}

/// For every identity-link field whose value is a list of strings, expands
/// each element with `scoped_id=true` and records its bare existence in the
/// index (as its own URL value) if not already present.
pub fn resolve_identity(ctx: &Context, index: &Rc<RefCell<Index>>, document: &mut Mapping, base_url: &str) {
	for identifier in ctx.identity_links.iter() {
		let Some(Node::Sequence(items)) = document.get_mut(identifier) else {
			continue;
		};
		for item in items.iter_mut() {
			let Node::String(s) = item else { continue };
			let expanded = expand_url(ctx, s, base_url, ExpandOptions { scoped_id: true, ..Default::default() });
			*item = Node::string(expanded.clone());
			if !index.borrow().contains(&expanded) {
				index.borrow_mut().insert(&expanded, Node::string(expanded.clone()));
			}
		}
	}
}

/// Expands every `url_field` present (string value, or each string element
/// of a list value) against `base_url`, with `vocab_term`/`scoped_ref` set
/// per the field's classification.
pub fn resolve_uris(ctx: &Context, document: &mut Mapping, base_url: &str) {
	let fields: Vec<String> = ctx.url_fields.iter().cloned().collect();
	for field in fields {
		let Some(value) = document.get(&field).cloned() else {
			continue;
		};
		let opts = ExpandOptions {
			vocab_term: ctx.vocab_fields.contains(&field),
			scoped_ref: ctx.scoped_ref_fields.get(&field).copied(),
			..Default::default()
		};
		let rewritten = match value {
			Node::String(s) => Node::string(expand_url(ctx, &s, base_url, opts)),
			Node::Sequence(items) => Node::Sequence(
				items
					.into_iter()
					.map(|item| match item {
						Node::String(s) => Node::string(expand_url(ctx, &s, base_url, opts)),
						other => other,
					})
					.collect(),
			),
			other => other,
		};
		document.insert(field, rewritten);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn mapping(pairs: Vec<(&str, Node)>) -> Mapping {
		pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
	}

	#[test]
	fn idmap_desugars_to_a_lexicographically_ordered_list() {
		let mut ctx = Context::new();
		ctx.idmap.insert("inputs".to_string(), "id".to_string());
		ctx.map_predicate.insert("inputs".to_string(), "type".to_string());

		let mut document = mapping(vec![(
			"inputs",
			Node::Mapping(mapping(vec![
				("y", Node::Mapping(mapping(vec![("type", Node::string("int"))]))),
				("x", Node::string("string")),
			])),
		)]);

		resolve_idmap(&ctx, &mut document).unwrap();

		let expected = Node::Sequence(vec![
			Node::Mapping(mapping(vec![("type", Node::string("string")), ("id", Node::string("x"))])),
			Node::Mapping(mapping(vec![("type", Node::string("int")), ("id", Node::string("y"))])),
		]);
		assert_eq!(document.get("inputs"), Some(&expected));
	}

	#[test]
	fn type_dsl_expands_array_and_optional_suffixes() {
		let mut ctx = Context::new();
		ctx.type_dsl_fields.insert("type".to_string());
		let mut document = mapping(vec![("type", Node::string("File[]?"))]);
		resolve_type_dsl(&ctx, &mut document);
		assert_eq!(
			document.get("type"),
			Some(&Node::Sequence(vec![
				Node::string("null"),
				Node::mapping_from(vec![("type", Node::string("array")), ("items", Node::string("File"))])
			]))
		);
	}

	#[test]
	fn type_dsl_flattens_and_dedupes_list_values() {
		let mut ctx = Context::new();
		ctx.type_dsl_fields.insert("type".to_string());
		let mut document = mapping(vec![("type", Node::Sequence(vec![Node::string("int"), Node::string("int?")]))]);
		resolve_type_dsl(&ctx, &mut document);
		assert_eq!(
			document.get("type"),
			Some(&Node::Sequence(vec![Node::string("int"), Node::string("null")]))
		);
	}

	#[test]
	fn identifier_is_expanded_and_indexed() {
		let mut ctx = Context::new();
		ctx.identifiers.insert("id".to_string());
		let index = Rc::new(RefCell::new(Index::new()));
		let mut document = mapping(vec![("id", Node::string("step1"))]);
		let base = resolve_identifier(&ctx, &index, &mut document, "file:///w.yaml#main".to_string()).unwrap();
		assert_eq!(base, "file:///w.yaml#main/step1");
		assert!(index.borrow().contains("file:///w.yaml#main/step1"));
	}
}
