//! Feed reading and writing for RSS (0.90 through 2.0) and Atom (0.3/1.0).
//!
//! The reader parses any supported dialect into one normalized view:
//! [`reader::Feed`] and [`reader::Entry`] answer `title()`, `authors()`,
//! `date_modified()` and the rest identically whether the document was
//! RSS 1.0 with Dublin Core metadata, a podcast feed full of `itunes:*`
//! tags, or a bare Atom entry fragment. Each field resolves through a
//! candidate chain: the native dialect location first, then registered
//! extension vocabularies, in a fixed order.
//!
//! The writer goes the other way: [`writer::Feed`] and [`writer::Entry`]
//! are validated property bags exported to RSS 2.0 or Atom 1.0 with
//! [`writer::Feed::export`].
//!
//! # Reading
//!
//! ```no_run
//! use kiosk::Reader;
//!
//! # fn main() -> kiosk::Result<()> {
//! let mut reader = Reader::new();
//! let feed = reader.import_from_uri("https://example.com/feed.xml")?;
//! println!("{}", feed.title().unwrap_or("untitled"));
//! for entry in feed.entries() {
//!     println!("- {}", entry.title().unwrap_or("untitled"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Writing
//!
//! ```
//! use kiosk::{writer, Dialect, MissingFieldPolicy};
//!
//! # fn main() -> kiosk::Result<()> {
//! let mut feed = writer::Feed::new();
//! feed.set_title("Example")?.set_description("An example feed")?;
//! let xml = feed.export(Dialect::Rss, MissingFieldPolicy::Error)?;
//! assert!(xml.contains("<title>Example</title>"));
//! # Ok(())
//! # }
//! ```
//!
//! No logging subscriber is installed by this crate; it emits `tracing`
//! events (missing optional extensions, omitted fields, skipped
//! tombstones) for the host application to collect.

pub mod detect;
pub mod error;
pub mod extension;
pub mod http;
pub mod model;
pub mod reader;
mod util;
pub mod writer;
pub mod xml;

pub use detect::{detect_type, detect_type_from_str, detect_type_spec_only, FeedType};
pub use error::{Error, Result};
pub use extension::{Extension, ExtensionContext, ExtensionRegistry, ExtensionValue};
pub use http::{CacheValidators, FeedCache, FetchResponse, Fetcher, HttpFetcher};
pub use model::{Category, Enclosure, Generator, Image, Person};
pub use reader::Reader;
pub use writer::{Dialect, MissingFieldPolicy};
pub use xml::{Document, NodeId};
