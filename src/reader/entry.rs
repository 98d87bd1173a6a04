//! Read-side entry container.

use std::cell::OnceCell;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset};

use crate::detect::FeedType;
use crate::error::Result;
use crate::extension::{
    self, Extension, ExtensionContext, ExtensionRegistry, ExtensionValue,
};
use crate::model::{Category, Enclosure, Person};
use crate::reader::resolve::{self, Cx};
use crate::xml::{Document, NodeId};

/// One entry of a parsed feed: an immutable view over the entry's element,
/// with per-field caching and the bound extension set.
///
/// Accessors resolve through the candidate chains on first call and cache
/// the outcome; asking twice returns the identical value. Date accessors
/// are fallible because a present-but-malformed date is an integrity error,
/// not an absent value.
pub struct Entry {
    doc: Rc<Document>,
    node: NodeId,
    feed_type: FeedType,
    extensions: Vec<Box<dyn Extension>>,
    cache: FieldCache,
}

#[derive(Default)]
struct FieldCache {
    title: OnceCell<Option<String>>,
    description: OnceCell<Option<String>>,
    content: OnceCell<Option<String>>,
    link: OnceCell<Option<String>>,
    links: OnceCell<Option<Vec<String>>>,
    id: OnceCell<Option<String>>,
    authors: OnceCell<Option<Vec<Person>>>,
    categories: OnceCell<Option<Vec<Category>>>,
    enclosure: OnceCell<Option<Enclosure>>,
    comment_count: OnceCell<Option<i64>>,
    comment_link: OnceCell<Option<String>>,
    comment_feed_link: OnceCell<Option<String>>,
    date_modified: OnceCell<Option<DateTime<FixedOffset>>>,
    date_created: OnceCell<Option<DateTime<FixedOffset>>>,
}

impl Entry {
    pub(crate) fn new(
        doc: Rc<Document>,
        node: NodeId,
        feed_type: FeedType,
        registry: &ExtensionRegistry,
    ) -> Entry {
        let extensions = registry.instantiate_entry(&ExtensionContext {
            doc: doc.clone(),
            node,
            feed_type,
        });
        Entry {
            doc,
            node,
            feed_type,
            extensions,
            cache: FieldCache::default(),
        }
    }

    fn cx(&self) -> Cx<'_> {
        Cx {
            doc: &self.doc,
            node: self.node,
            feed_type: self.feed_type,
            extensions: &self.extensions,
        }
    }

    pub fn feed_type(&self) -> FeedType {
        self.feed_type
    }

    pub fn title(&self) -> Option<&str> {
        self.cache
            .title
            .get_or_init(|| resolve::entry_title(&self.cx()))
            .as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.cache
            .description
            .get_or_init(|| resolve::entry_description(&self.cx()))
            .as_deref()
    }

    /// Full content, falling back to the description.
    pub fn content(&self) -> Option<&str> {
        self.cache
            .content
            .get_or_init(|| resolve::entry_content(&self.cx()))
            .as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.cache
            .link
            .get_or_init(|| resolve::entry_link(&self.cx()))
            .as_deref()
    }

    pub fn links(&self) -> Option<&[String]> {
        self.cache
            .links
            .get_or_init(|| resolve::entry_links(&self.cx()))
            .as_deref()
    }

    /// The entry id, or the title as a pseudo-id for legacy RSS, or `None`
    /// when both are absent.
    pub fn id(&self) -> Option<&str> {
        self.cache
            .id
            .get_or_init(|| resolve::entry_id(&self.cx()))
            .as_deref()
    }

    pub fn authors(&self) -> Option<&[Person]> {
        self.cache
            .authors
            .get_or_init(|| resolve::entry_authors(&self.cx()))
            .as_deref()
    }

    pub fn author(&self, index: usize) -> Option<&Person> {
        self.authors().and_then(|authors| authors.get(index))
    }

    pub fn categories(&self) -> Option<&[Category]> {
        self.cache
            .categories
            .get_or_init(|| resolve::entry_categories(&self.cx()))
            .as_deref()
    }

    pub fn enclosure(&self) -> Option<&Enclosure> {
        self.cache
            .enclosure
            .get_or_init(|| resolve::entry_enclosure(&self.cx()))
            .as_ref()
    }

    pub fn comment_count(&self) -> Option<i64> {
        *self
            .cache
            .comment_count
            .get_or_init(|| resolve::entry_comment_count(&self.cx()))
    }

    pub fn comment_link(&self) -> Option<&str> {
        self.cache
            .comment_link
            .get_or_init(|| resolve::entry_comment_link(&self.cx()))
            .as_deref()
    }

    pub fn comment_feed_link(&self) -> Option<&str> {
        self.cache
            .comment_feed_link
            .get_or_init(|| resolve::entry_comment_feed_link(&self.cx()))
            .as_deref()
    }

    /// # Errors
    ///
    /// Returns [`Error::FieldIntegrity`](crate::Error::FieldIntegrity) when a
    /// date is present but unparsable. Only a successful resolution is
    /// cached.
    pub fn date_modified(&self) -> Result<Option<DateTime<FixedOffset>>> {
        if let Some(cached) = self.cache.date_modified.get() {
            return Ok(*cached);
        }
        let value = resolve::entry_date_modified(&self.cx())?;
        let _ = self.cache.date_modified.set(value);
        Ok(value)
    }

    /// # Errors
    ///
    /// Same contract as [`Entry::date_modified`].
    pub fn date_created(&self) -> Result<Option<DateTime<FixedOffset>>> {
        if let Some(cached) = self.cache.date_created.get() {
            return Ok(*cached);
        }
        let value = resolve::entry_date_created(&self.cx())?;
        let _ = self.cache.date_created.set(value);
        Ok(value)
    }

    /// The bound extension instance for a capability, if registered.
    pub fn extension(&self, capability: &str) -> Option<&dyn Extension> {
        extension::find(&self.extensions, capability)
    }

    /// Dynamic dispatch: forwards to the first bound extension whose
    /// vocabulary contains `accessor`, in registration order.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownAccessor`](crate::Error::UnknownAccessor) when no
    /// bound extension implements the accessor; extension-level integrity
    /// errors pass through.
    pub fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        extension::dispatch(&self.extensions, accessor)
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("feed_type", &self.feed_type)
            .field("title", &self.title())
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}
