//! The RDF graph consulted at context-build time: a triple store populated
//! by [`SchemaFormat`] parsers, isolated behind that trait so property
//! classification never depends on a particular RDF library.

use crate::Error;
use std::collections::HashMap;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
pub const RDFS_SUBPROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
pub const RDFS_LITERAL: &str = "http://www.w3.org/2000/01/rdf-schema#Literal";
pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const XSD_ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

/// A single RDF triple. Kept as three plain strings (absolute IRIs or
/// literal text) rather than a typed term enum — the only thing classifying
/// properties needs is IRI equality, so there is nothing to gain from a
/// richer term model here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
	pub subject: String,
	pub predicate: String,
	pub object: String,
}

/// A parser for one RDF serialization, yielding the triples it finds. The
/// only thing context building cares about is this contract — isolating
/// ingestion behind an interface that yields triples keeps the core
/// independent of any particular RDF library.
pub trait SchemaFormat {
	fn parse(&self, text: &str, base: &str) -> Result<Vec<Triple>, Error>;
}

/// RDF/XML parsing itself is out of scope here — only the triples it would
/// yield are ever consumed. Kept in the fixed try-order so a deployment that
/// cares can swap in a real implementation without touching `add_schemas`.
pub struct XmlRdfFormat;

impl SchemaFormat for XmlRdfFormat {
	fn parse(&self, _text: &str, _base: &str) -> Result<Vec<Triple>, Error> {
		Err(Error::UnsupportedScheme("rdf/xml schema parsing is not implemented".into()))
	}
}

/// RDFa is not implemented, for the same reason as [`XmlRdfFormat`].
pub struct RdfaFormat;

impl SchemaFormat for RdfaFormat {
	fn parse(&self, _text: &str, _base: &str) -> Result<Vec<Triple>, Error> {
		Err(Error::UnsupportedScheme("rdfa schema parsing is not implemented".into()))
	}
}

/// A pragmatic subset of Turtle: `@prefix` declarations and
/// `subject predicate object .` statements using `<iri>` or `prefix:local`
/// terms (plus the `a` shorthand for `rdf:type`). Enough to classify the
/// properties declared by a schema file; not a conformant Turtle parser
/// (no blank nodes, collections, or literal datatypes/langtags).
pub struct TurtleFormat;

impl SchemaFormat for TurtleFormat {
	fn parse(&self, text: &str, base: &str) -> Result<Vec<Triple>, Error> {
		let mut prefixes = HashMap::new();
		let mut triples = Vec::new();

		for statement in text.split('.') {
			let statement = statement.trim();
			if statement.is_empty() || statement.starts_with('#') {
				continue;
			}

			if let Some(rest) = statement.strip_prefix("@prefix") {
				let (name, iri) = parse_prefix_decl(rest.trim())
					.ok_or_else(|| Error::Syntax(format!("malformed @prefix directive: `{statement}`")))?;
				prefixes.insert(name, iri);
				continue;
			}

			if statement.starts_with('@') {
				// Other directives (e.g. @base) are outside this subset; skip.
				continue;
			}

			let tokens: Vec<&str> = statement.split_whitespace().collect();
			if tokens.len() != 3 {
				return Err(Error::Syntax(format!(
					"expected `subject predicate object`, got: `{statement}`"
				)));
			}

			triples.push(Triple {
				subject: resolve_term(tokens[0], &prefixes, base)?,
				predicate: resolve_term(tokens[1], &prefixes, base)?,
				object: resolve_term(tokens[2], &prefixes, base)?,
			});
		}

		Ok(triples)
	}
}

fn parse_prefix_decl(rest: &str) -> Option<(String, String)> {
	let (name, rest) = rest.split_once(':')?;
	let rest = rest.trim();
	let iri = rest.strip_prefix('<')?.strip_suffix('>')?;
	Some((name.trim().to_string(), iri.to_string()))
}

fn resolve_term(token: &str, prefixes: &HashMap<String, String>, base: &str) -> Result<String, Error> {
	if let Some(iri) = token.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
		return Ok(crate::url_expand::expand_url(
			&crate::context::Context::new(),
			iri,
			base,
			crate::url_expand::ExpandOptions::default(),
		));
	}

	if token == "a" {
		return Ok(RDF_TYPE.to_string());
	}

	if let Some(colon) = token.find(':') {
		let (prefix, local) = (&token[..colon], &token[colon + 1..]);
		if let Some(ns) = prefixes.get(prefix) {
			return Ok(format!("{ns}{local}"));
		}
	}

	Err(Error::Syntax(format!("cannot resolve RDF term `{token}`")))
}

/// The schema formats tried in order by `add_schemas`.
pub fn default_formats() -> Vec<Box<dyn SchemaFormat>> {
	vec![Box::new(XmlRdfFormat), Box::new(TurtleFormat), Box::new(RdfaFormat)]
}

/// The RDF triple store. Populated exclusively at context-build time by
/// `add_schemas`; never consulted afterwards except through
/// `foreign_properties`/`url_fields`, which are derived from it once.
#[derive(Debug, Default, Clone)]
pub struct Graph {
	triples: Vec<Triple>,
}

impl Graph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, triple: Triple) {
		self.triples.push(triple);
	}

	pub fn extend(&mut self, triples: impl IntoIterator<Item = Triple>) {
		self.triples.extend(triples);
	}

	pub fn triples(&self) -> impl Iterator<Item = &Triple> {
		self.triples.iter()
	}

	/// Distinct subjects of any triple with the given predicate.
	pub fn subjects_with_predicate<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a str> {
		self.triples
			.iter()
			.filter(move |t| t.predicate == predicate)
			.map(|t| t.subject.as_str())
	}

	/// `(subject, object)` pairs of any triple with the given predicate.
	pub fn pairs_with_predicate<'a>(
		&'a self,
		predicate: &'a str,
	) -> impl Iterator<Item = (&'a str, &'a str)> {
		self.triples
			.iter()
			.filter(move |t| t.predicate == predicate)
			.map(|t| (t.subject.as_str(), t.object.as_str()))
	}

	/// Objects of `rdfs:range` triples for the given subject.
	pub fn ranges_of<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a str> {
		self.triples
			.iter()
			.filter(move |t| t.predicate == RDFS_RANGE && t.subject == subject)
			.map(|t| t.object.as_str())
	}

	/// Every distinct subject mentioned anywhere in the graph.
	pub fn subjects(&self) -> impl Iterator<Item = &str> {
		self.triples.iter().map(|t| t.subject.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn turtle_subset_parses_prefixed_and_absolute_terms() {
		let text = r#"
			@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
			@prefix ex: <http://example.org/schema#> .
			ex:name rdf:type rdf:Property .
			ex:name rdfs:range <http://www.w3.org/2001/XMLSchema#string> .
		"#;
		// rdfs: deliberately left undeclared to exercise the absolute-IRI path below.
		let text = text.replace("rdfs:range", "<http://www.w3.org/2000/01/rdf-schema#range>");
		let triples = TurtleFormat.parse(&text, "file:///schema.ttl").unwrap();
		assert_eq!(triples.len(), 2);
		assert_eq!(triples[0].subject, "http://example.org/schema#name");
		assert_eq!(triples[0].predicate, RDF_TYPE);
		assert_eq!(triples[0].object, RDF_PROPERTY);
		assert_eq!(triples[1].predicate, RDFS_RANGE);
		assert_eq!(triples[1].object, "http://www.w3.org/2001/XMLSchema#string");
	}

	#[test]
	fn unresolved_prefix_is_a_syntax_error() {
		let text = "ex:name rdf:type rdf:Property .";
		assert!(TurtleFormat.parse(text, "file:///schema.ttl").is_err());
	}
}
