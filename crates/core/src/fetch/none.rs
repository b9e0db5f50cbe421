use super::TextFetcher;
use crate::Error;

/// A fetcher that never succeeds. Useful when every reference is expected to
/// already be present in the index and any attempt to fetch indicates a bug
/// upstream.
#[derive(Debug, Default)]
pub struct NoFetcher;

impl TextFetcher for NoFetcher {
	fn fetch_text(&self, url: &str) -> Result<String, Error> {
		Err(Error::Transport {
			url: url.to_string(),
			cause: "no fetcher configured".to_string(),
		})
	}
}
