//! Building feeds in memory and serializing them to XML.
//!
//! The writer is the inverse of the reader: mutable property bags
//! ([`Feed`], [`Entry`], [`Deleted`]) validate values as they are set, then
//! [`Feed::export`] renders the whole bag to RSS 2.0 or Atom 1.0. Validation
//! is split in two:
//!
//! - **set time**: values must be well formed (non-empty strings, absolute
//!   URIs, valid ids) or the setter fails immediately;
//! - **render time**: each dialect mandates certain elements (an Atom feed
//!   must carry `updated`), and a bag missing one fails the export unless
//!   the caller chose [`MissingFieldPolicy::Omit`].
//!
//! Tombstones ([`Deleted`]) serialize only to Atom; the RSS renderer skips
//! them with a warning since RSS has no deleted-entry vocabulary.

pub mod entry;
pub mod feed;
pub mod podcast;
mod render;

pub use entry::{Deleted, Entry};
pub use feed::Feed;
pub use podcast::Podcast;

use crate::error::Result;

/// Writer output target used by the renderers, re-exported so custom
/// [`WriterExtension`] implementations can name it.
pub type XmlWriter = quick_xml::Writer<std::io::Cursor<Vec<u8>>>;

/// Serialization dialect accepted by [`Feed::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// RSS 2.0.
    Rss,
    /// Atom 1.0.
    Atom,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Rss => "rss",
            Dialect::Atom => "atom",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the renderers do when a dialect-mandated element has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFieldPolicy {
    /// Abort the export with
    /// [`Error::MissingRequiredField`](crate::Error::MissingRequiredField).
    #[default]
    Error,
    /// Log a warning and leave the element out of the output.
    Omit,
}

/// Validates and normalizes a person before it enters a writer bag: the
/// display name must be non-blank and any uri must be absolute.
pub(crate) fn checked_person(
    field: &'static str,
    mut person: crate::model::Person,
) -> Result<crate::model::Person> {
    person.name = crate::util::text::require_non_empty(field, &person.name)?;
    if let Some(uri) = &person.uri {
        crate::util::uri::validate_absolute_uri(field, uri)?;
    }
    Ok(person)
}

/// Validates and normalizes a category: the term must be non-blank and any
/// scheme must be an absolute URI.
pub(crate) fn checked_category(
    mut category: crate::model::Category,
) -> Result<crate::model::Category> {
    category.term = crate::util::text::require_non_empty("category term", &category.term)?;
    if let Some(scheme) = &category.scheme {
        crate::util::uri::validate_absolute_uri("category scheme", scheme)?;
    }
    Ok(category)
}

/// A write-side extension: contributes namespace declarations and extra
/// elements after the core fields of each feed and entry.
///
/// The stock set registers one of these for iTunes podcast metadata; custom
/// renderers are added with
/// [`ExtensionRegistry::register_writer`](crate::ExtensionRegistry::register_writer)
/// and passed to [`Feed::export_with`].
pub trait WriterExtension {
    /// The capability name this renderer was registered under.
    fn name(&self) -> &'static str;

    /// Namespace declarations (`prefix`, `uri`) the root element needs when
    /// this extension contributes output for `feed`. Return an empty list
    /// when the feed carries none of the extension's data.
    fn namespaces(&self, feed: &Feed) -> Vec<(&'static str, &'static str)>;

    /// Appends feed-level elements. Called after the core channel/feed
    /// fields, before any entries.
    fn render_feed(&self, writer: &mut XmlWriter, feed: &Feed) -> Result<()>;

    /// Appends entry-level elements. Called after the core item/entry
    /// fields of each entry.
    fn render_entry(&self, writer: &mut XmlWriter, entry: &Entry) -> Result<()>;
}
