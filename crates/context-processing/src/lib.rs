//! Builds a compiled [`Context`] from a raw `@context`-like mapping, and
//! populates its vocabulary-adjacent `foreign_properties`/`url_fields` from
//! RDF schemas.

mod build;
mod schemas;

pub use build::build_context;
pub use schemas::add_schema;
