//! Namespace URIs the detector, resolver, and extensions match against.

/// RDF syntax namespace (RSS 1.0/0.90 document roots).
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// RSS 1.0 content namespace.
pub const RSS_10: &str = "http://purl.org/rss/1.0/";
/// RSS 0.90 (Netscape RDF) content namespace.
pub const RSS_090: &str = "http://my.netscape.com/rdf/simple/0.9/";
/// Atom 1.0 (RFC 4287).
pub const ATOM_10: &str = "http://www.w3.org/2005/Atom";
/// Atom 0.3 (pre-standardization draft).
pub const ATOM_03: &str = "http://purl.org/atom/ns#";
/// Atom tombstones (RFC 6721).
pub const ATOM_TOMBSTONES: &str = "http://purl.org/atompub/tombstones/1.0";
/// Dublin Core 1.0.
pub const DC_10: &str = "http://purl.org/dc/elements/1.0/";
/// Dublin Core 1.1.
pub const DC_11: &str = "http://purl.org/dc/elements/1.1/";
/// RSS 1.0 content module (`content:encoded`).
pub const CONTENT: &str = "http://purl.org/rss/1.0/modules/content/";
/// Slash module (comment counts, sections).
pub const SLASH: &str = "http://purl.org/rss/1.0/modules/slash/";
/// WellFormedWeb CommentAPI.
pub const WFW: &str = "http://wellformedweb.org/CommentAPI/";
/// Atom Threading extension (RFC 4685).
pub const THREAD: &str = "http://purl.org/syndication/thread/1.0";
/// Apple iTunes podcast tags.
pub const ITUNES: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
/// Google Play podcast tags.
pub const GOOGLEPLAY: &str = "http://www.google.com/schemas/play-podcasts/1.0";
/// Podcast Index namespace.
pub const PODCAST_INDEX: &str = "https://podcastindex.org/namespace/1.0";
/// The implicitly bound `xml:` prefix namespace.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
