//! The URL Expander: a pure, deterministic function with no I/O, sensitive
//! to vocabulary prefixes, fragment scoping, and the caller's declared
//! reference kind (`scoped_id`, `vocab_term`, `scoped_ref`).

use crate::context::Context;

/// Options controlling how `expand_url` treats `r`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpandOptions {
	/// `r` names the identifier of the enclosing node: scope it under the
	/// base's fragment hierarchy rather than resolving it as a reference.
	pub scoped_id: bool,
	/// `r` is (or may be) a bare vocabulary term: short-circuit on exact
	/// matches and compress the result back to a term when possible.
	pub vocab_term: bool,
	/// `r` is a scoped reference with the given upward-search depth: leave
	/// fragment-less values unresolved for [`crate::Error`]-free, later,
	/// scoped lookup.
	pub scoped_ref: Option<u32>,
}

pub fn expand_url(ctx: &Context, r: &str, base: &str, opts: ExpandOptions) -> String {
	if r == "@id" || r == "@type" {
		return r.to_string();
	}

	if opts.vocab_term && ctx.vocab.contains_key(r) {
		return r.to_string();
	}

	let mut url = r.to_string();
	if !ctx.vocab.is_empty() {
		if let Some(colon) = url.find(':') {
			let prefix = &url[..colon];
			if let Some(expansion) = ctx.vocab.get(prefix) {
				url = format!("{expansion}{}", &url[colon + 1..]);
			}
		}
	}

	if has_scheme(&url) || url.starts_with("$(") || url.starts_with("${") {
		// Already absolute, or an expression-language passthrough: stop.
	} else {
		let (path, query, fragment) = split_relative(&url);
		if opts.scoped_id && fragment.is_none() {
			url = expand_scoped_id(base, path);
		} else if opts.scoped_ref.is_some() && fragment.is_none() {
			// Leave as-is; the Link Validator performs the upward search.
			let _ = query;
		} else {
			url = urljoin(base, &url);
		}
	}

	if opts.vocab_term {
		if let Some(term) = ctx.rvocab.get(&url) {
			return term.clone();
		}
	}

	url
}

/// Sniffs whether `s` begins with an RFC 3986 `scheme ":"` (letter, then
/// letters/digits/`+`/`-`/`.`, before the first `:`) without requiring the
/// rest of `s` to be a well-formed absolute URL — `url::Url::parse` rejects
/// plain relative references outright, so this check has to run first.
fn has_scheme(s: &str) -> bool {
	match s.find(':') {
		Some(colon) if colon > 0 => {
			let scheme = &s[..colon];
			let mut chars = scheme.chars();
			chars.next().is_some_and(|c| c.is_ascii_alphabetic())
				&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
		}
		_ => false,
	}
}

/// Splits a schemeless reference into `(path, query, fragment)`, mirroring
/// `urllib.parse.urlsplit` applied to a string with no authority.
fn split_relative(s: &str) -> (&str, Option<&str>, Option<&str>) {
	let (before_fragment, fragment) = match s.split_once('#') {
		Some((a, b)) => (a, Some(b)),
		None => (s, None),
	};
	let (path, query) = match before_fragment.split_once('?') {
		Some((a, b)) => (a, Some(b)),
		None => (before_fragment, None),
	};
	(path, query, fragment)
}

/// Scopes `path` under `base`'s fragment hierarchy.
fn expand_scoped_id(base: &str, path: &str) -> String {
	let (scheme, authority, base_path, query, fragment) = split_absolute(base);
	let new_fragment = if fragment.is_empty() {
		path.to_string()
	} else {
		format!("{fragment}/{path}")
	};
	let new_path = if base_path.is_empty() {
		"/".to_string()
	} else {
		base_path
	};
	urlunsplit(&scheme, &authority, &new_path, query.as_deref(), &new_fragment)
}

/// Resolves `r` against `base` by RFC 3986 reference resolution.
fn urljoin(base: &str, r: &str) -> String {
	match url::Url::parse(base).and_then(|b| b.join(r)) {
		Ok(joined) => joined.to_string(),
		// `base` itself isn't a well-formed absolute URL: callers are
		// expected to always supply one, but degrade to naive
		// concatenation rather than panicking.
		Err(_) => format!("{base}{r}"),
	}
}

/// Splits an absolute URL into `(scheme, authority, path, query, fragment)`.
/// Falls back to an all-empty split (except `path`, which becomes `"/"`) if
/// `s` doesn't parse, matching `urlsplit`'s leniency as closely as a strict
/// parser can.
///
/// Exposed (rather than kept private to this module) for the Link
/// Validator's scoped-reference search, which needs the same split/reassemble
/// primitives to walk a document id's fragment hierarchy.
pub fn split_absolute(s: &str) -> (String, String, String, Option<String>, String) {
	match url::Url::parse(s) {
		Ok(u) => (
			u.scheme().to_string(),
			u.authority().to_string(),
			u.path().to_string(),
			u.query().map(str::to_string),
			u.fragment().unwrap_or("").to_string(),
		),
		Err(_) => (String::new(), String::new(), "/".to_string(), None, String::new()),
	}
}

/// Reassembles URL components, mirroring `urllib.parse.urlunsplit`. Exposed
/// alongside [`split_absolute`] for the same reason.
pub fn urlunsplit(scheme: &str, authority: &str, path: &str, query: Option<&str>, fragment: &str) -> String {
	let mut out = String::new();
	if !scheme.is_empty() {
		out.push_str(scheme);
		out.push(':');
	}
	if !authority.is_empty() || !scheme.is_empty() {
		out.push_str("//");
		out.push_str(authority);
	}
	out.push_str(path);
	if let Some(q) = query {
		if !q.is_empty() {
			out.push('?');
			out.push_str(q);
		}
	}
	if !fragment.is_empty() {
		out.push('#');
		out.push_str(fragment);
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ctx_with_vocab(pairs: &[(&str, &str)]) -> Context {
		let mut ctx = Context::new();
		for (k, v) in pairs {
			ctx.vocab.insert((*k).to_string(), (*v).to_string());
			ctx.rvocab.insert((*v).to_string(), (*k).to_string());
		}
		ctx
	}

	#[test]
	fn reserved_tokens_pass_through_unchanged() {
		let ctx = Context::new();
		assert_eq!(expand_url(&ctx, "@id", "file:///a", ExpandOptions::default()), "@id");
		assert_eq!(expand_url(&ctx, "@type", "file:///a", ExpandOptions::default()), "@type");
		assert_eq!(
			expand_url(&ctx, "$(inputs.x)", "file:///a", ExpandOptions::default()),
			"$(inputs.x)"
		);
		assert_eq!(
			expand_url(&ctx, "${self}", "file:///a", ExpandOptions::default()),
			"${self}"
		);
	}

	#[test]
	fn vocab_prefix_expansion() {
		let ctx = ctx_with_vocab(&[("cwl", "https://w3id.org/cwl/cwl#")]);
		let got = expand_url(&ctx, "cwl:CommandLineTool", "file:///a", ExpandOptions::default());
		assert_eq!(got, "https://w3id.org/cwl/cwl#CommandLineTool");
	}

	#[test]
	fn vocab_term_compresses_back_to_the_term() {
		let ctx = ctx_with_vocab(&[("string", "http://www.w3.org/2001/XMLSchema#string")]);
		let opts = ExpandOptions {
			vocab_term: true,
			..Default::default()
		};
		let got = expand_url(
			&ctx,
			"http://www.w3.org/2001/XMLSchema#string",
			"file:///a",
			opts,
		);
		assert_eq!(got, "string");
	}

	#[test]
	fn scoped_id_appends_to_base_fragment() {
		let ctx = Context::new();
		let opts = ExpandOptions {
			scoped_id: true,
			..Default::default()
		};
		let got = expand_url(&ctx, "out1", "file:///w.yaml#main", opts);
		assert_eq!(got, "file:///w.yaml#main/out1");
	}

	#[test]
	fn scoped_id_with_no_existing_fragment_becomes_the_fragment() {
		let ctx = Context::new();
		let opts = ExpandOptions {
			scoped_id: true,
			..Default::default()
		};
		let got = expand_url(&ctx, "step1", "file:///b.yaml", opts);
		assert_eq!(got, "file:///b.yaml#step1");
	}

	#[test]
	fn plain_join_against_base() {
		let ctx = Context::new();
		let got = expand_url(&ctx, "b.yaml", "file:///dir/a.yaml", ExpandOptions::default());
		assert_eq!(got, "file:///dir/b.yaml");
	}

	#[test]
	fn absolute_scheme_stops_expansion() {
		let ctx = Context::new();
		let got = expand_url(
			&ctx,
			"http://example.org/x",
			"file:///a.yaml",
			ExpandOptions::default(),
		);
		assert_eq!(got, "http://example.org/x");
	}

	#[test]
	fn scoped_ref_with_fragment_is_left_untouched() {
		let ctx = Context::new();
		let opts = ExpandOptions {
			scoped_ref: Some(2),
			..Default::default()
		};
		let got = expand_url(&ctx, "outA", "file:///w#main/step1", opts);
		assert_eq!(got, "outA");
	}
}
