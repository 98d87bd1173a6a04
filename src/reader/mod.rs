//! Importing feeds: the [`Reader`] context object and its entry points.
//!
//! A `Reader` owns the three collaborators import needs: the extension
//! registry, the fetch collaborator, and an optional response cache. There
//! is no process-wide state; tests get isolation by constructing their own
//! `Reader` (or calling [`Reader::reset`]).

pub(crate) mod date;
mod entry;
mod feed;
pub(crate) mod resolve;

pub use entry::Entry;
pub use feed::Feed;

use std::path::Path;

use crate::error::{Error, Result};
use crate::extension::ExtensionRegistry;
use crate::http::{CacheValidators, FeedCache, Fetcher, HttpFetcher};
use crate::util;
use crate::xml::Document;

/// Import context: extension registry, fetcher, and optional cache.
///
/// ```no_run
/// use kiosk::Reader;
///
/// let mut reader = Reader::new();
/// let feed = reader.import_from_uri("https://example.com/feed.xml")?;
/// println!("{}: {} entries", feed.title().unwrap_or("untitled"), feed.len());
/// # Ok::<(), kiosk::Error>(())
/// ```
pub struct Reader {
    registry: ExtensionRegistry,
    fetcher: Option<Box<dyn Fetcher>>,
    cache: Option<FeedCache>,
}

impl Reader {
    /// A reader with the stock extension set, the default HTTP fetcher
    /// (built lazily on first remote import), and no cache.
    pub fn new() -> Reader {
        Reader {
            registry: ExtensionRegistry::core(),
            fetcher: None,
            cache: None,
        }
    }

    /// Restores the stock registry and default collaborators.
    pub fn reset(&mut self) {
        *self = Reader::new();
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Mutable access for registering additional extensions.
    pub fn registry_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.registry
    }

    /// Replaces the fetch collaborator.
    pub fn set_fetcher(&mut self, fetcher: Box<dyn Fetcher>) {
        self.fetcher = Some(fetcher);
    }

    /// Enables response caching (and with it, conditional GET) for remote
    /// imports.
    pub fn set_cache(&mut self, cache: FeedCache) {
        self.cache = Some(cache);
    }

    /// Builder form of [`Reader::set_fetcher`].
    pub fn with_fetcher(mut self, fetcher: Box<dyn Fetcher>) -> Reader {
        self.set_fetcher(fetcher);
        self
    }

    /// Builder form of [`Reader::set_cache`].
    pub fn with_cache(mut self, cache: FeedCache) -> Reader {
        self.set_cache(cache);
        self
    }

    /// Parses a feed document from a string.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for empty input, malformed XML, or a DOCTYPE
    /// declaration; [`Error::UnsupportedDocument`] when the structure
    /// matches no known dialect.
    pub fn import_from_string(&self, content: &str) -> Result<Feed> {
        if content.trim().is_empty() {
            return Err(Error::InvalidInput(
                "only non-empty strings can be imported".to_string(),
            ));
        }
        let doc = Document::parse(content)?;
        Feed::from_document(doc, &self.registry)
    }

    /// Reads and parses a feed document from a file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] for filesystem failures, plus everything
    /// [`Reader::import_from_string`] returns.
    pub fn import_from_file(&self, path: impl AsRef<Path>) -> Result<Feed> {
        let content = std::fs::read_to_string(path.as_ref())?;
        self.import_from_string(&content)
    }

    /// Fetches and parses a feed document over http(s).
    ///
    /// With a cache enabled, stored ETag/Last-Modified validators are sent
    /// as `If-None-Match`/`If-Modified-Since`, and a 304 answer is served
    /// from the stored body.
    ///
    /// # Errors
    ///
    /// [`Error::FieldIntegrity`] for a non-http(s) URI, [`Error::Transport`]
    /// for connection failures, [`Error::HttpStatus`] for any status other
    /// than 2xx or 304, plus everything [`Reader::import_from_string`]
    /// returns.
    pub fn import_from_uri(&mut self, uri: &str) -> Result<Feed> {
        util::uri::validate_http_url("uri", uri)?;
        if self.fetcher.is_none() {
            self.fetcher = Some(Box::new(HttpFetcher::new()?));
        }
        let Some(fetcher) = self.fetcher.as_deref() else {
            return Err(Error::Transport("no fetcher configured".to_string()));
        };

        tracing::debug!(%uri, cached = self.cache.is_some(), "Importing remote feed");
        let body = fetch_with_cache(fetcher, &mut self.cache, uri)?;
        self.import_from_string(&body)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Reader::new()
    }
}

fn fetch_with_cache(
    fetcher: &dyn Fetcher,
    cache: &mut Option<FeedCache>,
    uri: &str,
) -> Result<String> {
    let key = FeedCache::key(uri);
    let validators = cache.as_mut().and_then(|c| c.validators(&key));
    let response = fetcher.get(uri, validators.as_ref())?;

    match response.status {
        200..=299 => {
            if let Some(cache) = cache.as_mut() {
                cache.store(
                    key,
                    response.body.clone(),
                    CacheValidators {
                        etag: response.etag,
                        last_modified: response.last_modified,
                    },
                );
            }
            Ok(response.body)
        }
        304 => cache
            .as_mut()
            .and_then(|c| c.body(&key))
            .ok_or_else(|| {
                Error::Transport(
                    "server answered 304 but no cached copy exists".to_string(),
                )
            }),
        status => Err(Error::HttpStatus(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FetchResponse;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Scripted fetcher: pops one canned response per call and records the
    /// validators it was asked to send.
    struct Scripted {
        responses: RefCell<Vec<FetchResponse>>,
        seen_validators: Rc<RefCell<Vec<Option<CacheValidators>>>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<FetchResponse>) -> Scripted {
            responses.reverse();
            Scripted {
                responses: RefCell::new(responses),
                seen_validators: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn seen(&self) -> Rc<RefCell<Vec<Option<CacheValidators>>>> {
            self.seen_validators.clone()
        }
    }

    impl Fetcher for Scripted {
        fn get(
            &self,
            _uri: &str,
            validators: Option<&CacheValidators>,
        ) -> Result<FetchResponse> {
            self.seen_validators
                .borrow_mut()
                .push(validators.cloned());
            self.responses
                .borrow_mut()
                .pop()
                .ok_or_else(|| Error::Transport("no scripted response left".to_string()))
        }
    }

    const RSS: &str = r#"<rss version="2.0"><channel>
        <title>Cached</title><description>D</description>
    </channel></rss>"#;

    fn ok_response(etag: Option<&str>) -> FetchResponse {
        FetchResponse {
            status: 200,
            body: RSS.to_string(),
            etag: etag.map(String::from),
            last_modified: None,
        }
    }

    #[test]
    fn import_from_string_rejects_empty_input() {
        let reader = Reader::new();
        let err = reader.import_from_string("   ").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{err}");
    }

    #[test]
    fn import_from_uri_rejects_non_http_schemes() {
        let mut reader = Reader::new();
        let err = reader.import_from_uri("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("http"), "{err}");
    }

    #[test]
    fn non_success_status_maps_to_http_status_error() {
        let mut reader = Reader::new();
        reader.set_fetcher(Box::new(Scripted::new(vec![FetchResponse {
            status: 404,
            body: String::new(),
            etag: None,
            last_modified: None,
        }])));
        let err = reader.import_from_uri("http://example.com/feed").unwrap_err();
        assert!(matches!(err, Error::HttpStatus(404)), "{err}");
    }

    #[test]
    fn conditional_get_round_trip_serves_cached_body_on_304() {
        let scripted = Scripted::new(vec![
            ok_response(Some("\"v1\"")),
            FetchResponse {
                status: 304,
                body: String::new(),
                etag: None,
                last_modified: None,
            },
        ]);
        let mut reader = Reader::new();
        reader.set_fetcher(Box::new(scripted));
        reader.set_cache(FeedCache::new(8));

        let first = reader.import_from_uri("http://example.com/feed").unwrap();
        assert_eq!(first.title(), Some("Cached"));

        let second = reader.import_from_uri("http://example.com/feed").unwrap();
        assert_eq!(second.title(), Some("Cached"));
    }

    #[test]
    fn second_request_carries_stored_validators() {
        let scripted = Scripted::new(vec![
            ok_response(Some("\"v1\"")),
            ok_response(Some("\"v2\"")),
        ]);
        let seen = scripted.seen();
        let mut reader = Reader::new();
        reader.set_fetcher(Box::new(scripted));
        reader.set_cache(FeedCache::new(8));

        reader.import_from_uri("http://example.com/feed").unwrap();
        reader.import_from_uri("http://example.com/feed").unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], None);
        let second = seen[1].clone().unwrap();
        assert_eq!(second.etag.as_deref(), Some("\"v1\""));
    }

    #[test]
    fn a_304_without_cache_is_a_transport_error() {
        let mut reader = Reader::new();
        reader.set_fetcher(Box::new(Scripted::new(vec![FetchResponse {
            status: 304,
            body: String::new(),
            etag: None,
            last_modified: None,
        }])));
        let err = reader.import_from_uri("http://example.com/feed").unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "{err}");
    }

    #[test]
    fn reset_restores_the_stock_registry() {
        let mut reader = Reader::new();
        reader
            .registry_mut()
            .register_reader("custom/feed", crate::extension::dublincore::feed_extension);
        assert!(reader.registry().has("custom/feed"));
        reader.reset();
        assert!(!reader.registry().has("custom/feed"));
    }
}
