//! The fetch collaborator: blocking HTTP retrieval with conditional GET.
//!
//! Remote import is the only I/O in the crate. The [`Fetcher`] trait keeps it
//! swappable; [`HttpFetcher`] is the stock implementation on a blocking
//! reqwest client. [`FeedCache`] remembers bodies and their ETag /
//! Last-Modified validators so a later import of the same URI can send
//! `If-None-Match` / `If-Modified-Since` and serve the stored copy on 304.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use reqwest::header;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Stored response validators for a conditional request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheValidators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// A fetched response, reduced to what feed import needs.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// Blocking retrieval of a feed document.
///
/// Implementations perform exactly one request per call: no retries, no
/// redirect policy beyond the client's own, no backoff. A non-2xx/304
/// status is not an error at this layer; the caller decides.
pub trait Fetcher {
    /// Fetches `uri`, sending `If-None-Match`/`If-Modified-Since` headers
    /// when validators are supplied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] for connection, TLS, or body-read
    /// failures.
    fn get(&self, uri: &str, validators: Option<&CacheValidators>) -> Result<FetchResponse>;
}

/// Stock [`Fetcher`] over `reqwest::blocking`, with a 30-second request
/// timeout.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Builds the fetcher and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<HttpFetcher> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, uri: &str, validators: Option<&CacheValidators>) -> Result<FetchResponse> {
        let mut request = self.client.get(uri);
        if let Some(validators) = validators {
            if let Some(etag) = &validators.etag {
                request = request.header(header::IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = &validators.last_modified {
                request = request.header(header::IF_MODIFIED_SINCE, last_modified);
            }
        }

        let response = request.send().map_err(|e| Error::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let header_string = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let etag = header_string(header::ETAG);
        let last_modified = header_string(header::LAST_MODIFIED);
        let body = response.text().map_err(|e| Error::Transport(e.to_string()))?;

        Ok(FetchResponse {
            status,
            body,
            etag,
            last_modified,
        })
    }
}

#[derive(Debug, Clone)]
struct CachedFeed {
    body: String,
    validators: CacheValidators,
}

/// LRU cache of fetched feed bodies, keyed by the SHA-256 of the URI.
pub struct FeedCache {
    entries: LruCache<String, CachedFeed>,
}

impl FeedCache {
    /// A cache holding up to `capacity` feeds. Zero is clamped to one.
    pub fn new(capacity: usize) -> FeedCache {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        FeedCache {
            entries: LruCache::new(capacity),
        }
    }

    pub(crate) fn key(uri: &str) -> String {
        let hash = Sha256::digest(uri.as_bytes());
        format!("{hash:x}")
    }

    pub(crate) fn validators(&mut self, key: &str) -> Option<CacheValidators> {
        self.entries.get(key).map(|c| c.validators.clone())
    }

    pub(crate) fn body(&mut self, key: &str) -> Option<String> {
        self.entries.get(key).map(|c| c.body.clone())
    }

    pub(crate) fn store(&mut self, key: String, body: String, validators: CacheValidators) {
        self.entries.put(key, CachedFeed { body, validators });
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        FeedCache::new(DEFAULT_CACHE_CAPACITY)
    }
}
