use schema_ld_core::context::Context;
use schema_ld_core::url_expand::{expand_url, ExpandOptions};
use schema_ld_syntax::{Mapping, Node, Number};

/// Compiles a raw `@context`-like mapping into a [`Context`]. The caller is
/// responsible for rejecting a rebuild attempt (a loader whose context is
/// already populated) before calling this — building itself never fails.
pub fn build_context(raw: &Mapping) -> Context {
	let mut ctx = Context::new();

	for (key, value) in raw {
		if key == "@context" {
			continue;
		}
		apply_term_definition(&mut ctx, key, value);
	}

	let vocab_snapshot: Vec<(String, String)> =
		ctx.vocab.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
	for (term, expansion) in vocab_snapshot {
		let expanded = expand_url(&ctx, &expansion, "", ExpandOptions::default());
		ctx.rvocab.insert(expanded, term);
	}

	log::debug!(
		"built context: {} vocab entries, {} url fields, {} identifiers",
		ctx.vocab.len(),
		ctx.url_fields.len(),
		ctx.identifiers.len()
	);

	ctx
}

fn apply_term_definition(ctx: &mut Context, key: &str, value: &Node) {
	if let Some(s) = value.as_str() {
		if s == "@id" {
			ctx.identifiers.insert(key.to_string());
			ctx.identity_links.insert(key.to_string());
		}
		ctx.vocab.insert(key.to_string(), s.to_string());
		return;
	}

	let Some(m) = value.as_mapping() else {
		return;
	};

	match m.get("@type").and_then(Node::as_str) {
		Some("@id") => {
			ctx.url_fields.insert(key.to_string());
			if let Some(depth) = m.get("refScope").and_then(node_as_depth) {
				ctx.scoped_ref_fields.insert(key.to_string(), depth);
			}
			if m.get("identity").is_some_and(node_truthy) {
				ctx.identity_links.insert(key.to_string());
			}
		}
		Some("@vocab") => {
			ctx.url_fields.insert(key.to_string());
			ctx.vocab_fields.insert(key.to_string());
			if let Some(depth) = m.get("refScope").and_then(node_as_depth) {
				ctx.scoped_ref_fields.insert(key.to_string(), depth);
			}
			if m.get("typeDSL").is_some_and(node_truthy) {
				ctx.type_dsl_fields.insert(key.to_string());
			}
		}
		_ => {}
	}

	if m.get("noLinkCheck").is_some_and(node_truthy) {
		ctx.nolinkcheck.insert(key.to_string());
	}

	if let Some(subject_key) = m.get("mapSubject").and_then(Node::as_str) {
		ctx.idmap.insert(key.to_string(), subject_key.to_string());
		if let Some(predicate) = m.get("mapPredicate").and_then(Node::as_str) {
			ctx.map_predicate.insert(key.to_string(), predicate.to_string());
		}
	}

	if let Some(id) = m.get("@id").and_then(Node::as_str) {
		ctx.vocab.insert(key.to_string(), id.to_string());
	}
}

fn node_truthy(n: &Node) -> bool {
	!matches!(n, Node::Null | Node::Bool(false))
}

fn node_as_depth(n: &Node) -> Option<u32> {
	match n {
		Node::Number(Number::Int(i)) if *i >= 0 => Some(*i as u32),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn mapping(pairs: Vec<(&str, Node)>) -> Mapping {
		pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
	}

	#[test]
	fn identifier_field_is_classified() {
		let raw = mapping(vec![("id", Node::string("@id"))]);
		let ctx = build_context(&raw);
		assert!(ctx.identifiers.contains("id"));
		assert!(ctx.identity_links.contains("id"));
	}

	#[test]
	fn vocab_term_with_type_id_becomes_a_url_field() {
		let raw = mapping(vec![(
			"source",
			Node::mapping_from(vec![("@type", Node::string("@id")), ("refScope", Node::Number(Number::Int(2)))]),
		)]);
		let ctx = build_context(&raw);
		assert!(ctx.url_fields.contains("source"));
		assert_eq!(ctx.scoped_ref_fields.get("source"), Some(&2));
	}

	#[test]
	fn vocab_prefix_is_registered_both_ways() {
		let raw = mapping(vec![("cwl", Node::string("https://w3id.org/cwl/cwl#"))]);
		let ctx = build_context(&raw);
		assert_eq!(ctx.vocab.get("cwl").map(String::as_str), Some("https://w3id.org/cwl/cwl#"));
		assert_eq!(ctx.rvocab.get("https://w3id.org/cwl/cwl#").map(String::as_str), Some("cwl"));
	}

	#[test]
	fn idmap_and_map_predicate_are_recorded() {
		let raw = mapping(vec![(
			"inputs",
			Node::mapping_from(vec![
				("mapSubject", Node::string("id")),
				("mapPredicate", Node::string("type")),
			]),
		)]);
		let ctx = build_context(&raw);
		assert_eq!(ctx.idmap.get("inputs").map(String::as_str), Some("id"));
		assert_eq!(ctx.map_predicate.get("inputs").map(String::as_str), Some("type"));
	}
}
