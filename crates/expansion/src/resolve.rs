//! The Reference Resolver: `resolve_ref` handles one `$import`/`$include`/
//! `$mixin`/inline-object reference; `resolve_all` drives directive
//! handling, the Document Rewriter, and recursive resolution of a
//! document's fields or list elements.

use schema_ld_core::fetch::TextFetcher;
use schema_ld_core::{Error, Mapping, Node};
use schema_ld_syntax::keyword;

use crate::loader::{string_list, Loader};
use crate::rewrite;
use crate::validate;

fn loader_identity<F>(loader: &Loader<F>) -> usize {
	loader as *const _ as usize
}

fn split_fragment(url: &str) -> (String, String) {
	match url.split_once('#') {
		Some((doc, frag)) => (doc.to_string(), frag.to_string()),
		None => (url.to_string(), String::new()),
	}
}

/// Resolves a single reference: a mapping carrying `$import`/`$include`/
/// `$mixin`, or an inline object located via its identifier field. Returns
/// `(resolved, metadata)`, splitting a trailing `$graph` out of the result
/// exactly as [`resolve_all`] would for a directly-fetched document.
pub fn resolve_ref<F: TextFetcher>(loader: &mut Loader<F>, reference: Node, base_url: &str, checklinks: bool) -> Result<(Node, Node), Error> {
	let mut obj: Option<Mapping> = None;
	let mut include = false;
	let mut mixin: Option<Mapping> = None;
	let ref_str: String;

	match reference {
		Node::Mapping(map) => {
			if map.contains_key(keyword::IMPORT) {
				if map.len() != 1 {
					return Err(Error::directive_misuse(format!("'$import' must be the only field in {}", Node::Mapping(map))));
				}
				ref_str = map.get(keyword::IMPORT).and_then(Node::as_str).map(str::to_string).ok_or_else(|| {
					Error::directive_misuse("'$import' value must be a string")
				})?;
			} else if map.contains_key(keyword::INCLUDE) {
				if map.len() != 1 {
					return Err(Error::directive_misuse(format!("'$include' must be the only field in {}", Node::Mapping(map))));
				}
				include = true;
				ref_str = map.get(keyword::INCLUDE).and_then(Node::as_str).map(str::to_string).ok_or_else(|| {
					Error::directive_misuse("'$include' value must be a string")
				})?;
			} else if map.contains_key(keyword::MIXIN) {
				ref_str = map.get(keyword::MIXIN).and_then(Node::as_str).map(str::to_string).ok_or_else(|| {
					Error::directive_misuse("'$mixin' value must be a string")
				})?;
				mixin = Some(map);
			} else {
				let mut found = None;
				for identifier in &loader.context().identifiers {
					if let Some(v) = map.get(identifier).and_then(Node::as_str) {
						found = Some(v.to_string());
						break;
					}
				}
				let Some(found) = found else {
					return Err(Error::directive_misuse(format!(
						"object `{}` does not have an identifier field in {:?}",
						Node::Mapping(map.clone()),
						loader.context().identifiers
					)));
				};
				ref_str = found;
				obj = Some(map);
			}
		}
		Node::String(s) => ref_str = s,
		other => return Err(Error::directive_misuse(format!("must be a string: `{other}`"))),
	}

	let url = schema_ld_core::url_expand::expand_url(
		loader.context(),
		&ref_str,
		base_url,
		schema_ld_core::url_expand::ExpandOptions { scoped_id: obj.is_some(), ..Default::default() },
	);

	if mixin.is_none() {
		if let Some(existing) = loader.index().borrow().get(&url).cloned() {
			return Ok((existing, Node::mapping()));
		}
	}

	if include {
		return Ok((Node::string(loader.fetch_text(&url)?), Node::mapping()));
	}

	let doc_url: String;
	let mut fetched: Option<Node> = None;
	if let Some(mut obj_map) = obj {
		let identifiers: Vec<String> = loader.context().identifiers.iter().cloned().collect();
		for identifier in identifiers {
			obj_map.insert(identifier, Node::string(url.clone()));
		}
		doc_url = url.clone();
		obj = Some(obj_map);
	} else {
		let (base_doc_url, fragment) = split_fragment(&url);
		if mixin.is_none() && loader.index().borrow().contains(&base_doc_url) {
			return Err(Error::unknown_reference(format!("reference `#{fragment}` not found in file `{base_doc_url}`")));
		}
		fetched = Some(loader.fetch(&base_doc_url, mixin.is_none())?);
		doc_url = base_doc_url;
	}

	let mut lookup_url = Some(url);
	let (mut resolved_obj, mut metadata) = if let Some(mixin_map) = mixin {
		let mut merged = fetched.as_ref().and_then(Node::as_mapping).cloned().unwrap_or_default();
		for (key, value) in mixin_map.into_iter() {
			if key != keyword::MIXIN {
				merged.insert(key, value);
			}
		}
		lookup_url = None;
		resolve_all(loader, Node::Mapping(merged), base_url.to_string(), &doc_url, checklinks)?
	} else {
		let body = fetched.unwrap_or_else(|| Node::Mapping(obj.unwrap_or_default()));
		resolve_all(loader, body, doc_url.clone(), &doc_url, checklinks)?
	};

	if let Some(lookup_url) = lookup_url {
		resolved_obj = loader.index().borrow().get(&lookup_url).cloned().ok_or_else(|| {
			Error::context(format!("reference `{lookup_url}` is not in the index after resolution"))
		})?;
	}

	if let Node::Mapping(map) = &resolved_obj {
		if let Some(body) = map.get(keyword::GRAPH).cloned() {
			let mut without_graph = map.clone();
			without_graph.shift_remove(keyword::GRAPH);
			metadata = Node::Mapping(without_graph);
			return Ok((body, metadata));
		}
	}

	Ok((resolved_obj, metadata))
}

/// Drives directive handling (`$base`, `$profile`, `$namespaces`,
/// `$schemas`, `$graph`), the Document Rewriter, and recursive resolution
/// of a mapping's fields or a list's elements. Returns `(resolved,
/// metadata)`.
pub fn resolve_all<F: TextFetcher>(
	loader: &mut Loader<F>,
	document: Node,
	mut base_url: String,
	file_base: &str,
	checklinks: bool,
) -> Result<(Node, Node), Error> {
	match &document {
		Node::Mapping(map) if map.contains_key(keyword::IMPORT) || map.contains_key(keyword::INCLUDE) => {
			return resolve_ref(loader, document, file_base, checklinks);
		}
		Node::Mapping(map) if map.contains_key(keyword::MIXIN) => {
			return resolve_ref(loader, document, &base_url, checklinks);
		}
		Node::Mapping(_) | Node::Sequence(_) => {}
		_ => return Ok((document, Node::mapping())),
	}

	let mut document = document;
	let mut metadata = Node::mapping();
	let mut sub_loader: Option<Loader<F>> = None;

	if let Node::Mapping(map) = &document {
		if let Some(b) = map.get(keyword::BASE).and_then(Node::as_str) {
			base_url = b.to_string();
		}

		if let Some(profile) = map.get(keyword::PROFILE).and_then(Node::as_str).map(str::to_string) {
			loader.fetch(&profile, true)?;
			let active = sub_loader.get_or_insert_with(|| loader.sub_loader());
			if let Some(Node::Mapping(ns)) = map.get(keyword::NAMESPACES) {
				active.add_namespaces(ns);
			}
			let schemas = map.get(keyword::SCHEMAS).map(string_list).unwrap_or_default();
			active.add_schemas(&schemas, &profile)?;
		}

		if let Some(Node::Mapping(ns)) = map.get(keyword::NAMESPACES) {
			let active = sub_loader.get_or_insert_with(|| loader.sub_loader());
			active.add_namespaces(ns);
		}

		if let Some(schemas_node) = map.get(keyword::SCHEMAS) {
			let schemas = string_list(schemas_node);
			let active = sub_loader.get_or_insert_with(|| loader.sub_loader());
			active.add_schemas(&schemas, file_base)?;
		}
	}

	if let Node::Mapping(map) = &mut document {
		if let Some(body) = map.shift_remove(keyword::GRAPH) {
			let active: &mut Loader<F> = sub_loader.as_mut().unwrap_or(&mut *loader);
			metadata = Node::Mapping(map.clone());
			let (resolved_metadata, _) = resolve_all(active, metadata, base_url.clone(), file_base, false)?;
			if !resolved_metadata.is_mapping() {
				return Err(Error::directive_misuse("metadata must be a mapping"));
			}
			metadata = resolved_metadata;
			document = body;
		}
	}

	let active: &mut Loader<F> = sub_loader.as_mut().unwrap_or(&mut *loader);

	match &mut document {
		Node::Mapping(map) => {
			rewrite::normalize_fields(active.context(), map);
			rewrite::resolve_idmap(active.context(), map)?;
			rewrite::resolve_type_dsl(active.context(), map);
			base_url = rewrite::resolve_identifier(active.context(), active.index(), map, base_url)?;
			rewrite::resolve_identity(active.context(), active.index(), map, &base_url);
			rewrite::resolve_uris(active.context(), map, &base_url);

			let keys: Vec<String> = map.keys().cloned().collect();
			for key in keys {
				let value = map.get(&key).cloned().unwrap_or(Node::Null);
				let resolved = resolve_all(active, value, base_url.clone(), file_base, false).map_err(|e| {
					Error::context(format!(
						"({}) ({file_base}) validation error in field `{key}`:\n{}",
						loader_identity(active),
						Error::indent(&e.to_string())
					))
				})?;
				map.insert(key, resolved.0);
			}

			let identifiers: Vec<String> = active.context().identifiers.iter().cloned().collect();
			for identifier in identifiers {
				if let Some(id_value) = map.get(&identifier).and_then(Node::as_str).map(str::to_string) {
					active.index().borrow_mut().insert(&id_value, Node::Mapping(map.clone()));
				}
			}
		}
		Node::Sequence(items) => {
			let mut i = 0usize;
			while i < items.len() {
				let val = items[i].clone();
				let is_spliceable = matches!(&val, Node::Mapping(m) if m.contains_key(keyword::IMPORT) || m.contains_key(keyword::MIXIN));
				if is_spliceable {
					let (resolved, _) = resolve_ref(active, val, file_base, false).map_err(|e| {
						Error::context(format!(
							"({}) ({file_base}) validation error in position {i}:\n{}",
							loader_identity(active),
							Error::indent(&e.to_string())
						))
					})?;
					match resolved {
						Node::Sequence(spliced) => {
							let count = spliced.len();
							items.splice(i..i + 1, spliced);
							i += count;
						}
						other => {
							items[i] = other;
							i += 1;
						}
					}
					continue;
				}
				let (resolved, _) = resolve_all(active, val, base_url.clone(), file_base, false).map_err(|e| {
					Error::context(format!(
						"({}) ({file_base}) validation error in position {i}:\n{}",
						loader_identity(active),
						Error::indent(&e.to_string())
					))
				})?;
				items[i] = resolved;
				i += 1;
			}

			if let Node::Mapping(meta_map) = &mut metadata {
				let identity_links: Vec<String> = active.context().identity_links.iter().cloned().collect();
				for identifier in identity_links {
					if let Some(v) = meta_map.get(&identifier).and_then(Node::as_str).map(str::to_string) {
						let expanded = schema_ld_core::url_expand::expand_url(
							active.context(),
							&v,
							&base_url,
							schema_ld_core::url_expand::ExpandOptions { scoped_id: true, ..Default::default() },
						);
						meta_map.insert(identifier, Node::string(expanded.clone()));
						active.index().borrow_mut().insert(&expanded, document.clone());
					}
				}
			}
		}
		_ => {}
	}

	if checklinks {
		let index = active.index().borrow();
		document = validate::validate_links(active.context(), &index, document, "")?;
	}

	Ok((document, metadata))
}
