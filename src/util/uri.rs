//! URI validation for writer fields and import sources.

use url::Url;

use crate::error::{Error, Result};

/// Validates that a writer field holds an absolute RFC 3986 URI.
///
/// # Errors
///
/// Returns [`Error::FieldIntegrity`] naming the offending field when the
/// value is relative or unparsable.
pub(crate) fn validate_absolute_uri(field: &'static str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::FieldIntegrity {
        field,
        message: format!("must be an absolute URI ({e}): {value}"),
    })
}

/// Validates a URL for use as a remote import source.
///
/// Only the scheme is policed: feeds are fetched over `http` or `https`,
/// never `file` or other local schemes.
pub(crate) fn validate_http_url(field: &'static str, value: &str) -> Result<Url> {
    let url = validate_absolute_uri(field, value)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::FieldIntegrity {
            field,
            message: format!("unsupported scheme {scheme} (only http/https allowed)"),
        }),
    }
}

/// Validates a feed or entry id: an absolute URI, or an RFC 4151 tag URI
/// (`tag:authority,date:specific` with a `YYYY[-MM[-DD]]` date).
pub(crate) fn validate_feed_id(field: &'static str, value: &str) -> Result<()> {
    if let Some(rest) = value.strip_prefix("tag:") {
        if is_valid_tag(rest) {
            return Ok(());
        }
        return Err(Error::FieldIntegrity {
            field,
            message: format!("invalid RFC 4151 tag URI: {value}"),
        });
    }
    validate_absolute_uri(field, value)?;
    Ok(())
}

fn is_valid_tag(rest: &str) -> bool {
    let Some((tagging, specific)) = rest.split_once(':') else {
        return false;
    };
    let Some((authority, date)) = tagging.split_once(',') else {
        return false;
    };
    !authority.is_empty() && !specific.is_empty() && is_valid_tag_date(date)
}

fn is_valid_tag_date(date: &str) -> bool {
    let parts: Vec<&str> = date.split('-').collect();
    let digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
    match parts.as_slice() {
        [y] => digits(y, 4),
        [y, m] => digits(y, 4) && digits(m, 2),
        [y, m, d] => digits(y, 4) && digits(m, 2) && digits(d, 2),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_uris_accepted() {
        assert!(validate_absolute_uri("link", "https://example.com/feed.xml").is_ok());
        assert!(validate_absolute_uri("link", "urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6").is_ok());
    }

    #[test]
    fn test_relative_uris_rejected() {
        let err = validate_absolute_uri("link", "/feed.xml").unwrap_err();
        assert!(err.to_string().contains("link"));
    }

    #[test]
    fn test_http_url_schemes() {
        assert!(validate_http_url("uri", "http://example.com/feed").is_ok());
        assert!(validate_http_url("uri", "https://example.com/feed").is_ok());
        assert!(validate_http_url("uri", "file:///etc/passwd").is_err());
        assert!(validate_http_url("uri", "ftp://example.com/feed").is_err());
    }

    #[test]
    fn test_tag_uris() {
        assert!(validate_feed_id("id", "tag:example.com,2006:blogs/1").is_ok());
        assert!(validate_feed_id("id", "tag:example.com,2006-08:feed").is_ok());
        assert!(validate_feed_id("id", "tag:example.com,2006-08-25:feed").is_ok());
        assert!(validate_feed_id("id", "tag:example.com,06:feed").is_err());
        assert!(validate_feed_id("id", "tag:example.com:feed").is_err());
        assert!(validate_feed_id("id", "tag:,2006:feed").is_err());
    }

    #[test]
    fn test_plain_uri_ids() {
        assert!(validate_feed_id("id", "http://example.com/feed").is_ok());
        assert!(validate_feed_id("id", "not a uri").is_err());
    }
}
