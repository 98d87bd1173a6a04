//! Integration tests for remote import: conditional GET against a local
//! mock server, cache eviction, and HTTP error mapping.
//!
//! The fetcher is blocking, so each test holds a runtime to drive the
//! mock server and issues imports from the test thread itself.

use kiosk::{CacheValidators, Error, FeedCache, FetchResponse, Fetcher, Reader, Result};
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Remote Feed</title>
    <description>Served by the mock</description>
    <link>https://remote.example.com/</link>
    <item><title>only entry</title></item>
  </channel>
</rss>"#;

fn server() -> (Runtime, MockServer) {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    (rt, server)
}

// ============================================================================
// Happy Path and Fetcher Injection
// ============================================================================

#[test]
fn test_import_parses_a_served_feed() {
    let (rt, server) = server();
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED_BODY))
            .mount(&server),
    );

    let mut reader = Reader::new();
    let feed = reader
        .import_from_uri(&format!("{}/feed.xml", server.uri()))
        .unwrap();

    assert_eq!(feed.title(), Some("Remote Feed"));
    assert_eq!(feed.len(), 1);
    assert_eq!(feed.entry(0).unwrap().title(), Some("only entry"));
}

/// Serves the same canned body for every URI.
struct Canned;

impl Fetcher for Canned {
    fn get(&self, _uri: &str, _validators: Option<&CacheValidators>) -> Result<FetchResponse> {
        Ok(FetchResponse {
            status: 200,
            body: FEED_BODY.to_string(),
            etag: None,
            last_modified: None,
        })
    }
}

#[test]
fn test_a_custom_fetcher_replaces_the_network() {
    let mut reader = Reader::new().with_fetcher(Box::new(Canned));
    let feed = reader
        .import_from_uri("https://anywhere.example.com/feed.xml")
        .unwrap();
    assert_eq!(feed.title(), Some("Remote Feed"));
}

// ============================================================================
// Conditional GET Tests
// ============================================================================

#[test]
fn test_conditional_get_serves_the_cached_body_on_304() {
    let (rt, server) = server();
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(FEED_BODY)
                    .insert_header("ETag", "\"v1\"")
                    .insert_header("Last-Modified", "Sat, 02 Mar 2024 10:00:00 GMT"),
            )
            .up_to_n_times(1)
            .mount(&server),
    );
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .and(header("If-None-Match", "\"v1\""))
            .and(header("If-Modified-Since", "Sat, 02 Mar 2024 10:00:00 GMT"))
            .respond_with(ResponseTemplate::new(304))
            .expect(1)
            .mount(&server),
    );

    let mut reader = Reader::new().with_cache(FeedCache::new(8));
    let uri = format!("{}/feed.xml", server.uri());

    let first = reader.import_from_uri(&uri).unwrap();
    assert_eq!(first.title(), Some("Remote Feed"));

    // The 304 answer has no body; the parse works off the stored copy.
    let second = reader.import_from_uri(&uri).unwrap();
    assert_eq!(second.title(), Some("Remote Feed"));
    assert_eq!(second.len(), 1);

    rt.block_on(server.verify());
}

#[test]
fn test_a_tiny_cache_evicts_validators_for_older_uris() {
    let (rt, server) = server();
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(FEED_BODY)
                    .insert_header("ETag", "\"v1\""),
            )
            .mount(&server),
    );

    let mut reader = Reader::new().with_cache(FeedCache::new(1));
    let first_uri = format!("{}/a.xml", server.uri());
    let second_uri = format!("{}/b.xml", server.uri());

    reader.import_from_uri(&first_uri).unwrap();
    reader.import_from_uri(&second_uri).unwrap();
    reader.import_from_uri(&first_uri).unwrap();

    let requests = rt.block_on(server.received_requests()).unwrap();
    let revisits: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/a.xml")
        .collect();
    assert_eq!(revisits.len(), 2);
    // The validators were evicted, so the second visit is unconditional.
    assert!(revisits.iter().all(|r| !r.headers.contains_key("if-none-match")));
}

#[test]
fn test_304_without_a_cached_copy_is_a_transport_error() {
    let (rt, server) = server();
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(304))
            .mount(&server),
    );

    // No cache configured, so there is nothing to serve the 304 from.
    let mut reader = Reader::new();
    let err = reader
        .import_from_uri(&format!("{}/feed.xml", server.uri()))
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains("304"), "got: {err}");
}

// ============================================================================
// Error Mapping Tests
// ============================================================================

#[test]
fn test_non_success_status_maps_to_http_status() {
    let (rt, server) = server();
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server),
    );

    let mut reader = Reader::new();
    let err = reader
        .import_from_uri(&format!("{}/gone.xml", server.uri()))
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus(404)));
}

#[test]
fn test_non_http_schemes_are_rejected_before_any_request() {
    let mut reader = Reader::new();

    for uri in ["ftp://example.com/feed.xml", "file:///etc/feed.xml", "not a uri"] {
        let err = reader.import_from_uri(uri).unwrap_err();
        assert!(
            matches!(err, Error::FieldIntegrity { field: "uri", .. }),
            "uri {uri:?} gave {err:?}"
        );
    }
}

#[test]
fn test_connection_failure_is_a_transport_error() {
    // Nothing listens on port 1.
    let mut reader = Reader::new();
    let err = reader
        .import_from_uri("http://127.0.0.1:1/feed.xml")
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[test]
fn test_a_served_document_that_is_no_feed_is_unsupported() {
    let (rt, server) = server();
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body/></html>"))
            .mount(&server),
    );

    let mut reader = Reader::new();
    let err = reader
        .import_from_uri(&format!("{}/page.html", server.uri()))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedDocument(_)));
}
