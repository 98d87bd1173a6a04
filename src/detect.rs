//! Structural feed-type detection.
//!
//! Detection is purely structural: it inspects the root element (and, for
//! Atom, descendants) of an already-parsed [`Document`] and never consults
//! field content. It runs once per import and the result is immutable for
//! the life of the containers; every resolution chain branches on it.

use serde::Serialize;

use crate::error::Result;
use crate::xml::{ns, Document, NodeId};

/// The closed set of dialects this crate recognises.
///
/// `RssAny` is a real classification, not an error: a bare `<rss>` root with
/// a missing or unrecognised `version` attribute is treated as generic RSS
/// and resolved with the RSS 2.0 element locations. `Unknown` documents are
/// rejected at import time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeedType {
    /// RSS 0.90 (Netscape RDF).
    Rss090,
    /// RSS 0.91. The historical Netscape/Userland split was carried by the
    /// DOCTYPE URI, which this crate rejects, so both collapse here.
    Rss091,
    /// RSS 0.92.
    Rss092,
    /// RSS 0.93.
    Rss093,
    /// RSS 0.94.
    Rss094,
    /// RSS 1.0 (RDF).
    Rss10,
    /// RSS 2.0.
    Rss20,
    /// `<rss>` root without a recognised version attribute.
    RssAny,
    /// Atom 0.3 (pre-standardization draft).
    Atom03,
    /// Atom 1.0 (RFC 4287).
    Atom10,
    /// A standalone Atom 1.0 `<entry>` document.
    Atom10Entry,
    /// No dialect matched.
    Unknown,
}

impl FeedType {
    /// Stable string tag, usable in logs and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Rss090 => "rss-090",
            FeedType::Rss091 => "rss-091",
            FeedType::Rss092 => "rss-092",
            FeedType::Rss093 => "rss-093",
            FeedType::Rss094 => "rss-094",
            FeedType::Rss10 => "rss-10",
            FeedType::Rss20 => "rss-20",
            FeedType::RssAny => "rss",
            FeedType::Atom03 => "atom-03",
            FeedType::Atom10 => "atom-10",
            FeedType::Atom10Entry => "atom-10-entry",
            FeedType::Unknown => "unknown",
        }
    }

    /// True for every member of the RSS family, including generic RSS.
    pub fn is_rss(&self) -> bool {
        matches!(
            self,
            FeedType::Rss090
                | FeedType::Rss091
                | FeedType::Rss092
                | FeedType::Rss093
                | FeedType::Rss094
                | FeedType::Rss10
                | FeedType::Rss20
                | FeedType::RssAny
        )
    }

    /// True for Atom feeds and standalone Atom entries.
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            FeedType::Atom03 | FeedType::Atom10 | FeedType::Atom10Entry
        )
    }

    /// RDF-based dialects place items outside the channel and carry their
    /// own content namespace on plain elements.
    pub(crate) fn is_rdf(&self) -> bool {
        matches!(self, FeedType::Rss090 | FeedType::Rss10)
    }
}

impl std::fmt::Display for FeedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a parsed document. Standalone Atom entry documents report as
/// [`FeedType::Atom10Entry`].
pub fn detect_type(doc: &Document) -> FeedType {
    detect(doc, false)
}

/// Like [`detect_type`], but reports standalone Atom entry documents as
/// [`FeedType::Atom10`], since an entry is a spec-compliant fragment of an
/// Atom 1.0 feed.
pub fn detect_type_spec_only(doc: &Document) -> FeedType {
    detect(doc, true)
}

/// Parses and classifies in one step, without building containers.
///
/// # Errors
///
/// Fails with the parse error (malformed XML, illegal DOCTYPE) before any
/// detection is attempted; detection itself cannot fail.
pub fn detect_type_from_str(content: &str) -> Result<FeedType> {
    let doc = Document::parse(content)?;
    Ok(detect_type(&doc))
}

fn detect(doc: &Document, spec_only: bool) -> FeedType {
    let root = doc.root();

    // Precedence is fixed: rss root, RDF root, then Atom by descendant
    // search. First match wins.
    if doc.local_name(root) == "rss" {
        return match doc.attr(root, "version") {
            Some("2.0") => FeedType::Rss20,
            Some("0.94") => FeedType::Rss094,
            Some("0.93") => FeedType::Rss093,
            Some("0.92") => FeedType::Rss092,
            Some("0.91") => FeedType::Rss091,
            _ => FeedType::RssAny,
        };
    }

    if doc.local_name(root) == "RDF" && doc.namespace(root) == Some(ns::RDF) {
        if has_rdf_content(doc, root, ns::RSS_10) {
            return FeedType::Rss10;
        }
        if has_rdf_content(doc, root, ns::RSS_090) {
            return FeedType::Rss090;
        }
    }

    if doc.find_descendant(root, ns::ATOM_10, "feed").is_some() {
        return FeedType::Atom10;
    }
    if doc.find_descendant(root, ns::ATOM_10, "entry").is_some() {
        return if spec_only {
            FeedType::Atom10
        } else {
            FeedType::Atom10Entry
        };
    }
    if doc.find_descendant(root, ns::ATOM_03, "feed").is_some() {
        return FeedType::Atom03;
    }

    FeedType::Unknown
}

/// An RDF document counts as RSS when the root has any channel, image, item,
/// or textinput child in the candidate content namespace.
fn has_rdf_content(doc: &Document, root: NodeId, namespace: &str) -> bool {
    ["channel", "image", "item", "textinput"]
        .iter()
        .any(|local| doc.find_child(root, Some(namespace), local).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_str(xml: &str) -> FeedType {
        detect_type(&Document::parse(xml).expect("fixture should parse"))
    }

    #[test]
    fn detects_rss_versions_from_attribute() {
        for (version, expected) in [
            ("2.0", FeedType::Rss20),
            ("0.94", FeedType::Rss094),
            ("0.93", FeedType::Rss093),
            ("0.92", FeedType::Rss092),
            ("0.91", FeedType::Rss091),
        ] {
            let xml = format!(r#"<rss version="{version}"><channel/></rss>"#);
            assert_eq!(detect_str(&xml), expected, "version {version}");
        }
    }

    #[test]
    fn bare_rss_root_is_generic_rss() {
        assert_eq!(detect_str("<rss><channel/></rss>"), FeedType::RssAny);
        assert_eq!(
            detect_str(r#"<rss version="3.7"><channel/></rss>"#),
            FeedType::RssAny
        );
        // An rss root on its own classifies; structural validation happens
        // at import, not detection.
        assert_eq!(detect_str("<rss/>"), FeedType::RssAny);
    }

    #[test]
    fn detects_rss_10_by_rdf_children() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                              xmlns="http://purl.org/rss/1.0/">
                       <channel/><item/>
                     </rdf:RDF>"#;
        assert_eq!(detect_str(xml), FeedType::Rss10);
    }

    #[test]
    fn detects_rss_090_by_netscape_namespace() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                              xmlns="http://my.netscape.com/rdf/simple/0.9/">
                       <channel/>
                     </rdf:RDF>"#;
        assert_eq!(detect_str(xml), FeedType::Rss090);
    }

    #[test]
    fn rdf_without_known_children_is_unknown() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"/>"#;
        assert_eq!(detect_str(xml), FeedType::Unknown);
    }

    #[test]
    fn detects_atom_10_feed() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>A</title></feed>"#;
        assert_eq!(detect_str(xml), FeedType::Atom10);
    }

    #[test]
    fn detects_atom_03_feed() {
        let xml = r#"<feed version="0.3" xmlns="http://purl.org/atom/ns#"><title>A</title></feed>"#;
        assert_eq!(detect_str(xml), FeedType::Atom03);
    }

    #[test]
    fn detects_standalone_atom_entry() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom"><title>E</title></entry>"#;
        assert_eq!(detect_str(xml), FeedType::Atom10Entry);
        let doc = Document::parse(xml).unwrap();
        assert_eq!(detect_type_spec_only(&doc), FeedType::Atom10);
    }

    #[test]
    fn atom_feed_wins_over_entry_descendants() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry/></feed>"#;
        assert_eq!(detect_str(xml), FeedType::Atom10);
    }

    #[test]
    fn unrelated_document_is_unknown() {
        assert_eq!(detect_str("<html><body/></html>"), FeedType::Unknown);
    }

    #[test]
    fn detect_from_str_propagates_parse_failures() {
        assert!(detect_type_from_str("<rss").is_err());
        assert!(detect_type_from_str("<!DOCTYPE rss><rss/>").is_err());
    }

    #[test]
    fn family_predicates() {
        assert!(FeedType::RssAny.is_rss());
        assert!(FeedType::Rss10.is_rdf());
        assert!(FeedType::Atom10Entry.is_atom());
        assert!(!FeedType::Unknown.is_rss());
        assert!(!FeedType::Unknown.is_atom());
    }
}
