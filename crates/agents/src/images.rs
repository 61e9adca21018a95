//! Stock photo search and download.
//!
//! Neither operation fails: a miss, a bad status or a transport error all
//! end in `None`, and the slide is laid out without a picture.

use crate::config::{AgentConfig, RetryPolicy};
use crate::error::ConfigError;
use deckgen_core::ImageProvider;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::thread;
use std::time::Duration;

const USER_AGENT: &str = concat!("deckgen/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    src: PhotoSources,
}

#[derive(Debug, Default, Deserialize)]
struct PhotoSources {
    landscape: Option<String>,
}

fn http_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Single-request photo search returning the first landscape result.
#[derive(Clone)]
pub struct ImageSearch {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ImageSearch {
    /// Fails with [`ConfigError::Missing`] when no search API key is configured.
    pub fn new(config: &AgentConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .pexels_api_key
            .clone()
            .ok_or(ConfigError::Missing(crate::config::PEXELS_API_KEY))?;

        Ok(Self {
            client: http_client(config.image_timeout)?,
            endpoint: format!("{}/search", config.pexels_api_url),
            api_key,
        })
    }

    /// URL of the first landscape photo for `query`. Never retries.
    pub fn find_image(&self, query: &str) -> Option<String> {
        log::debug!("Searching images for '{}'", query);

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, &self.api_key)
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "landscape"),
                ("size", "large"),
            ])
            .send();

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Image search for '{}' failed: {}", query, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::warn!("Image search API returned {}: {}", status, body);
            return None;
        }

        let parsed: SearchResponse = match response.json() {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Unreadable image search response for '{}': {}", query, e);
                return None;
            }
        };

        let url = parsed
            .photos
            .into_iter()
            .next()
            .and_then(|photo| photo.src.landscape);
        match &url {
            Some(url) => log::debug!("Image found for '{}': {}", query, url),
            None => log::info!("No images found for '{}'", query),
        }
        url
    }
}

/// Downloads image bytes with a bounded, linearly backed-off retry.
///
/// Every failed attempt is followed by its backoff sleep, so a photo that
/// never arrives costs at most `max_attempts` timeouts plus the total backoff.
#[derive(Clone)]
pub struct ImageDownloader {
    client: Client,
    retry: RetryPolicy,
}

impl ImageDownloader {
    pub fn new(config: &AgentConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(config.download_timeout)?,
            retry: config.retry,
        })
    }

    /// Bytes at `url`, or `None` once every attempt has failed.
    pub fn download(&self, url: &str) -> Option<Vec<u8>> {
        for attempt in 1..=self.retry.max_attempts {
            match self.try_download(url) {
                Ok(bytes) => return Some(bytes),
                Err(reason) => {
                    log::warn!(
                        "Image download attempt {}/{} for {} failed: {}",
                        attempt,
                        self.retry.max_attempts,
                        url,
                        reason
                    );
                }
            }

            if let Some(delay) = self.retry.backoff(attempt) {
                thread::sleep(delay);
            }
        }

        log::warn!(
            "Giving up on {} after {} attempts",
            url,
            self.retry.max_attempts
        );
        None
    }

    fn try_download(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self.client.get(url).send().map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("status {}", status));
        }

        let bytes = response.bytes().map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

/// [`ImageProvider`] backed by the stock photo search and downloader.
#[derive(Clone)]
pub struct StockImages {
    search: ImageSearch,
    downloader: ImageDownloader,
}

impl StockImages {
    pub fn new(search: ImageSearch, downloader: ImageDownloader) -> Self {
        Self { search, downloader }
    }

    /// `Ok(None)` when no search API key is configured.
    pub fn from_config(config: &AgentConfig) -> Result<Option<Self>, ConfigError> {
        if !config.images_enabled() {
            return Ok(None);
        }
        Ok(Some(Self::new(
            ImageSearch::new(config)?,
            ImageDownloader::new(config)?,
        )))
    }
}

impl ImageProvider for StockImages {
    fn fetch_image(&self, query: &str) -> Option<Vec<u8>> {
        let url = self.search.find_image(query)?;
        self.downloader.download(&url)
    }
}
