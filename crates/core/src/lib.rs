//! Core types shared by the context builder and the resolver: the compiled
//! [`Context`](context::Context), the normalizing [`Index`](index::Index),
//! the RDF [`Graph`](graph::Graph) consulted at context-build time, the
//! transport-only [`fetch::TextFetcher`] trait and its implementations, and
//! the [`Error`] taxonomy.

pub mod context;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod index;
pub mod url_expand;

pub use error::Error;
pub use index::Index;

pub use schema_ld_syntax::{keyword, Mapping, Node, Number};
