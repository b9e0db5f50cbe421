use super::TextFetcher;
use crate::Error;

/// Tries `first`, falling back to `second` if it fails. Useful for combining,
/// say, an [`FsFetcher`](super::FsFetcher) serving a local cache with an
/// [`HttpFetcher`](super::HttpFetcher) for everything else. Chains can be
/// nested to combine more than two fetchers.
pub struct ChainFetcher<A, B> {
	first: A,
	second: B,
}

impl<A, B> ChainFetcher<A, B> {
	pub fn new(first: A, second: B) -> Self {
		Self { first, second }
	}
}

impl<A: TextFetcher, B: TextFetcher> TextFetcher for ChainFetcher<A, B> {
	fn fetch_text(&self, url: &str) -> Result<String, Error> {
		match self.first.fetch_text(url) {
			Ok(text) => Ok(text),
			Err(_) => self.second.fetch_text(url),
		}
	}
}
