//! Retrieval of media bytes from source references.
//!
//! Two kinds of reference reach this module:
//!
//! - inline `data:` references, decoded locally without any round trip
//! - everything else, handed to a [`Fetcher`]
//!
//! Fetchers are plain blocking calls; the engine runs on one thread and a
//! fetch is one of its suspension points.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use thiserror::Error;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors from retrieving a media reference.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Failed to decode inline payload: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No fetcher can resolve reference: {0}")]
    UnknownReference(String),

    #[error("Reference resolved to an empty payload")]
    Empty,
}

/// Strategy for turning a source reference into bytes.
pub trait Fetcher {
    /// Retrieve the bytes behind `reference`.
    fn fetch(&self, reference: &str) -> FetchResult<Vec<u8>>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, reference: &str) -> FetchResult<Vec<u8>> {
        (**self).fetch(reference)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, reference: &str) -> FetchResult<Vec<u8>> {
        (**self).fetch(reference)
    }
}

/// Whether the reference is an inline-encoded payload.
pub fn is_data_reference(reference: &str) -> bool {
    reference.starts_with("data:")
}

/// Whether the reference is an http(s) URL.
pub fn is_http_reference(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Decode an inline `data:[<mime>][;base64],<payload>` reference.
pub fn decode_data_reference(reference: &str) -> FetchResult<Vec<u8>> {
    let body = reference
        .strip_prefix("data:")
        .ok_or_else(|| FetchError::Decode("missing data: prefix".to_string()))?;
    let (meta, payload) = body
        .split_once(',')
        .ok_or_else(|| FetchError::Decode("missing ',' separator".to_string()))?;

    let bytes = if meta.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        // Some renderers wrap long payloads; whitespace is not part of the alphabet.
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        BASE64_STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| FetchError::Decode(e.to_string()))?
    } else {
        payload.as_bytes().to_vec()
    };

    if bytes.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(bytes)
}

/// Fetcher for http(s) references.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, reference: &str) -> FetchResult<Vec<u8>> {
        if !is_http_reference(reference) {
            return Err(FetchError::UnknownReference(reference.to_string()));
        }

        let response = self
            .client
            .get(reference)
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        if bytes.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(bytes.to_vec())
    }
}
