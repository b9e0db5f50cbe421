use super::TextFetcher;
use crate::Error;
use std::fs;

/// Reads `file:` URLs from the local filesystem. Nothing is cached: a
/// repeated fetch of the same URL reads the file again.
#[derive(Debug, Default)]
pub struct FsFetcher;

impl FsFetcher {
	pub fn new() -> Self {
		Self
	}

	fn path_of(url: &str) -> Result<&str, Error> {
		url.strip_prefix("file://")
			.or_else(|| url.strip_prefix("file:"))
			.ok_or_else(|| Error::UnsupportedScheme(url.to_string()))
	}
}

impl TextFetcher for FsFetcher {
	fn fetch_text(&self, url: &str) -> Result<String, Error> {
		let path = Self::path_of(url)?;
		fs::read_to_string(path).map_err(|e| Error::Transport {
			url: url.to_string(),
			cause: e.to_string(),
		})
	}
}
