//! Raw document data model: the tagged [`Node`] tree produced by the YAML/JSON
//! collaborator, plus the reserved keyword table consulted by the resolver.

mod node;

pub mod keyword;

pub use node::{Mapping, Node, Number};
