use super::TextFetcher;
use crate::Error;

/// Downloads `http:`/`https:` URLs with a blocking `reqwest` client.
///
/// Nothing is cached here: repeated fetches of the same URL issue a new
/// request. Caching identifiers and already-fetched documents is the
/// loader's job, not the transport's.
pub struct HttpFetcher {
	client: reqwest::blocking::Client,
}

impl HttpFetcher {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Default for HttpFetcher {
	fn default() -> Self {
		Self {
			client: reqwest::blocking::Client::new(),
		}
	}
}

impl TextFetcher for HttpFetcher {
	fn fetch_text(&self, url: &str) -> Result<String, Error> {
		log::debug!("downloading: {url}");
		let response = self.client.get(url).send().map_err(|e| Error::Transport {
			url: url.to_string(),
			cause: e.to_string(),
		})?;

		let response = response.error_for_status().map_err(|e| Error::Transport {
			url: url.to_string(),
			cause: e.to_string(),
		})?;

		response.text().map_err(|e| Error::Transport {
			url: url.to_string(),
			cause: e.to_string(),
		})
	}
}
