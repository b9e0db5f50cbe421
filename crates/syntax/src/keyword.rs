//! Reserved keys consulted by the reference resolver.
//!
//! These never double as vocabulary terms or ordinary field names: a mapping
//! that carries one of the directive keys is handled by
//! [`schema_ld_expansion::resolve`](../../schema_ld_expansion/index.html)
//! before the document rewriter ever sees it.

/// `$import`: replace this node with the resolved, indexed content at the
/// target URL. Must be the only key in its mapping.
pub const IMPORT: &str = "$import";

/// `$include`: replace this node with the *raw text* fetched from the target
/// URL, bypassing YAML parsing entirely. Must be the only key in its mapping.
pub const INCLUDE: &str = "$include";

/// `$mixin`: fetch the target, deep-copy it, and overlay the sibling keys of
/// this mapping on top before resolving. Unlike `$import`/`$include`, sibling
/// keys are allowed (and expected).
pub const MIXIN: &str = "$mixin";

/// `$base`: overrides the base URL used to resolve the remainder of this
/// mapping and its descendants.
pub const BASE: &str = "$base";

/// `$profile`: fetches a context profile document and applies its
/// `$namespaces`/`$schemas` through a [sub-loader](crate).
pub const PROFILE: &str = "$profile";

/// `$namespaces`: adds vocabulary prefixes, scoped to this subtree via a
/// sub-loader.
pub const NAMESPACES: &str = "$namespaces";

/// `$schemas`: registers RDF schemas used to auto-classify foreign
/// properties, scoped to this subtree via a sub-loader.
pub const SCHEMAS: &str = "$schemas";

/// `$graph`: splits this mapping into metadata (everything else) and a body
/// (the value of `$graph`), which is what actually gets indexed/returned.
pub const GRAPH: &str = "$graph";

/// `@context`: the compiled-away context definition; stripped before a
/// mapping is treated as a context definition to build from.
pub const CONTEXT: &str = "@context";

/// `@id`: passed through [`expand_url`](super) unchanged; also the special
/// value that marks a context entry as an identifier field.
pub const ID: &str = "@id";

/// `@type`: passed through [`expand_url`](super) unchanged.
pub const TYPE: &str = "@type";

/// `@vocab`: marks a context entry's field values as vocabulary-relative
/// terms (as opposed to `@id`-relative references).
pub const VOCAB: &str = "@vocab";

/// All directive keys that can appear as the sole key of a reference mapping
/// and must never coexist with other keys (the `$mixin` exception is handled
/// by callers explicitly).
pub const EXCLUSIVE_DIRECTIVES: [&str; 2] = [IMPORT, INCLUDE];
