use schema_ld_core::context::Context;
use schema_ld_core::graph::{self, Graph, SchemaFormat};
use schema_ld_core::index::Index;
use schema_ld_syntax::Node;

/// Parses one schema document's text with the first format in `formats` that
/// succeeds, merges its triples into `graph_store`, registers every subject
/// in the whole graph as an index placeholder, and classifies properties
/// into `ctx.url_fields`/`ctx.foreign_properties`.
///
/// Tries each format in order, silently falling through on failure; a schema
/// this crate can't parse at all is simply not consulted, not an error.
pub fn add_schema(
	ctx: &mut Context,
	graph_store: &mut Graph,
	index: &mut Index,
	formats: &[Box<dyn SchemaFormat>],
	text: &str,
	base: &str,
) {
	let triples = formats.iter().find_map(|fmt| fmt.parse(text, base).ok());

	let Some(triples) = triples else {
		log::warn!("schema at {base} did not parse under any known format; ignoring");
		return;
	};

	graph_store.extend(triples);

	for subject in graph_store.subjects().map(str::to_string).collect::<Vec<_>>() {
		if !index.contains(&subject) {
			index.insert(&subject, Node::Null);
		}
	}

	for subject in graph_store
		.pairs_with_predicate(graph::RDF_TYPE)
		.filter(|(_, object)| *object == graph::RDF_PROPERTY)
		.map(|(subject, _)| subject.to_string())
		.collect::<Vec<_>>()
	{
		classify_property(ctx, graph_store, &subject);
	}

	for (subject, object) in graph_store
		.pairs_with_predicate(graph::RDFS_SUBPROPERTY_OF)
		.map(|(s, o)| (s.to_string(), o.to_string()))
		.collect::<Vec<_>>()
	{
		classify_property(ctx, graph_store, &subject);
		classify_property(ctx, graph_store, &object);
	}

	for subject in graph_store
		.subjects_with_predicate(graph::RDFS_RANGE)
		.map(str::to_string)
		.collect::<Vec<_>>()
	{
		classify_property(ctx, graph_store, &subject);
	}

	for subject in graph_store
		.pairs_with_predicate(graph::RDF_TYPE)
		.filter(|(_, object)| *object == graph::OWL_OBJECT_PROPERTY)
		.map(|(subject, _)| subject.to_string())
		.collect::<Vec<_>>()
	{
		classify_property(ctx, graph_store, &subject);
	}
}

fn classify_property(ctx: &mut Context, graph_store: &Graph, subject: &str) {
	for range in graph_store.ranges_of(subject).collect::<Vec<_>>() {
		let is_xsd = range.starts_with(graph::XSD_NS) && range != graph::XSD_ANY_URI;
		let is_literal = is_xsd || range == graph::RDFS_LITERAL;
		if !is_literal {
			ctx.url_fields.insert(subject.to_string());
		}
	}
	ctx.foreign_properties.borrow_mut().insert(subject.to_string());
}

#[cfg(test)]
mod tests {
	use super::*;
	use schema_ld_core::graph::default_formats;

	#[test]
	fn property_with_non_literal_range_becomes_a_url_field() {
		let mut ctx = Context::new();
		let mut graph_store = Graph::new();
		let mut index = Index::new();
		let text = r#"
			@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
			@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
			@prefix ex: <http://example.org/schema#> .
			ex:run rdf:type rdf:Property .
			ex:run rdfs:range ex:Process .
		"#;
		add_schema(&mut ctx, &mut graph_store, &mut index, &default_formats(), text, "file:///schema.ttl");
		assert!(ctx.url_fields.contains("http://example.org/schema#run"));
		assert!(ctx.foreign_properties.borrow().contains("http://example.org/schema#run"));
	}

	#[test]
	fn property_with_xsd_string_range_is_not_a_url_field() {
		let mut ctx = Context::new();
		let mut graph_store = Graph::new();
		let mut index = Index::new();
		let text = r#"
			@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
			@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
			@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
			@prefix ex: <http://example.org/schema#> .
			ex:label rdf:type rdf:Property .
			ex:label rdfs:range xsd:string .
		"#;
		add_schema(&mut ctx, &mut graph_store, &mut index, &default_formats(), text, "file:///schema.ttl");
		assert!(!ctx.url_fields.contains("http://example.org/schema#label"));
		assert!(ctx.foreign_properties.borrow().contains("http://example.org/schema#label"));
	}

	#[test]
	fn unparseable_schema_is_ignored_without_error() {
		let mut ctx = Context::new();
		let mut graph_store = Graph::new();
		let mut index = Index::new();
		add_schema(&mut ctx, &mut graph_store, &mut index, &default_formats(), "not valid turtle (((", "file:///x");
		assert!(ctx.foreign_properties.borrow().is_empty());
	}
}
