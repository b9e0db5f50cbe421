//! Pure text transport: fetching the bytes behind a URL, with no awareness
//! of YAML, contexts, or identifiers. Kept synchronous and trait-object
//! friendly, matching how the rest of this workspace is built around a
//! single-threaded, shared-mutable-state loader rather than an async one.

mod chain;
mod fs;
mod none;

pub use chain::ChainFetcher;
pub use fs::FsFetcher;
pub use none::NoFetcher;

#[cfg(feature = "reqwest")]
mod http;
#[cfg(feature = "reqwest")]
pub use http::HttpFetcher;

use crate::Error;

/// Fetches the raw text behind a URL.
///
/// A few default implementations are provided:
///   - [`NoFetcher`]: always fails. Useful when every reference is expected
///     to already be in the index.
///   - [`FsFetcher`]: reads `file:` URLs from the local filesystem.
///   - [`HttpFetcher`]: downloads `http:`/`https:` URLs with `reqwest`
///     (behind the `reqwest` feature).
///   - [`ChainFetcher`]: tries one fetcher, falling back to a second.
pub trait TextFetcher {
	fn fetch_text(&self, url: &str) -> Result<String, Error>;
}

impl<T: TextFetcher + ?Sized> TextFetcher for &T {
	fn fetch_text(&self, url: &str) -> Result<String, Error> {
		(**self).fetch_text(url)
	}
}

impl<T: TextFetcher + ?Sized> TextFetcher for Box<T> {
	fn fetch_text(&self, url: &str) -> Result<String, Error> {
		(**self).fetch_text(url)
	}
}
