//! Read-side feed container: dialect binding, field caching, entry list.

use std::cell::OnceCell;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset};

use crate::detect::{detect_type, FeedType};
use crate::error::{Error, Result};
use crate::extension::{
    self, capability, Extension, ExtensionContext, ExtensionRegistry, ExtensionValue,
};
use crate::model::{Category, Generator, Image, Person};
use crate::reader::entry::Entry;
use crate::reader::resolve::{self, Cx};
use crate::xml::{ns, Document, NodeId};

/// A parsed feed: detected dialect, bound extension set, lazily cached
/// field access, and the entries in document order.
///
/// The container is a read-only view; nothing here mutates the tree. An
/// imported standalone Atom entry document is represented as a feed whose
/// single entry is the root element, with feed-level accessors evaluating
/// against that same element.
pub struct Feed {
    doc: Rc<Document>,
    node: NodeId,
    feed_type: FeedType,
    extensions: Vec<Box<dyn Extension>>,
    entries: Vec<Entry>,
    cache: FieldCache,
}

#[derive(Default)]
struct FieldCache {
    title: OnceCell<Option<String>>,
    description: OnceCell<Option<String>>,
    link: OnceCell<Option<String>>,
    feed_link: OnceCell<Option<String>>,
    hubs: OnceCell<Option<Vec<String>>>,
    id: OnceCell<Option<String>>,
    language: OnceCell<Option<String>>,
    copyright: OnceCell<Option<String>>,
    authors: OnceCell<Option<Vec<Person>>>,
    generator: OnceCell<Option<Generator>>,
    image: OnceCell<Option<Image>>,
    categories: OnceCell<Option<Vec<Category>>>,
    date_modified: OnceCell<Option<DateTime<FixedOffset>>>,
    last_build_date: OnceCell<Option<DateTime<FixedOffset>>>,
}

impl Feed {
    /// Binds a parsed document: detects the dialect, locates the feed node
    /// and its entries, and instantiates the registered extensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDocument`] when detection yields
    /// [`FeedType::Unknown`] or the dialect's required structure (an RSS
    /// `channel`, an Atom `feed`) is missing.
    pub(crate) fn from_document(doc: Document, registry: &ExtensionRegistry) -> Result<Feed> {
        let doc = Rc::new(doc);
        let feed_type = detect_type(&doc);
        tracing::debug!(feed_type = %feed_type, "Detected feed dialect");
        warn_missing_capabilities(registry);

        let (node, entry_nodes) = locate(&doc, feed_type)?;
        let extensions = registry.instantiate_feed(&ExtensionContext {
            doc: doc.clone(),
            node,
            feed_type,
        });
        let entries = entry_nodes
            .into_iter()
            .map(|entry_node| Entry::new(doc.clone(), entry_node, feed_type, registry))
            .collect();

        Ok(Feed {
            doc,
            node,
            feed_type,
            extensions,
            entries,
            cache: FieldCache::default(),
        })
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

    /// The document's declared encoding, `UTF-8` when the declaration
    /// omitted it.
    pub fn encoding(&self) -> &str {
        self.doc.encoding()
    }

    pub fn title(&self) -> Option<&str> {
        self.cache
            .title
            .get_or_init(|| resolve::feed_title(&self.cx()))
            .as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.cache
            .description
            .get_or_init(|| resolve::feed_description(&self.cx()))
            .as_deref()
    }

    /// The feed's website link.
    pub fn link(&self) -> Option<&str> {
        self.cache
            .link
            .get_or_init(|| resolve::feed_link(&self.cx()))
            .as_deref()
    }

    /// The feed's own URL (Atom `rel="self"`).
    pub fn feed_link(&self) -> Option<&str> {
        self.cache
            .feed_link
            .get_or_init(|| resolve::feed_self_link(&self.cx()))
            .as_deref()
    }

    /// Hub endpoints announced by the feed (`rel="hub"` links).
    pub fn hubs(&self) -> Option<&[String]> {
        self.cache
            .hubs
            .get_or_init(|| resolve::feed_hubs(&self.cx()))
            .as_deref()
    }

    /// The feed id; falls back to the website link, then the title.
    pub fn id(&self) -> Option<&str> {
        self.cache
            .id
            .get_or_init(|| resolve::feed_id(&self.cx()))
            .as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.cache
            .language
            .get_or_init(|| resolve::feed_language(&self.cx()))
            .as_deref()
    }

    pub fn copyright(&self) -> Option<&str> {
        self.cache
            .copyright
            .get_or_init(|| resolve::feed_copyright(&self.cx()))
            .as_deref()
    }

    pub fn authors(&self) -> Option<&[Person]> {
        self.cache
            .authors
            .get_or_init(|| resolve::feed_authors(&self.cx()))
            .as_deref()
    }

    pub fn author(&self, index: usize) -> Option<&Person> {
        self.authors().and_then(|authors| authors.get(index))
    }

    pub fn generator(&self) -> Option<&Generator> {
        self.cache
            .generator
            .get_or_init(|| resolve::feed_generator(&self.cx()))
            .as_ref()
    }

    pub fn image(&self) -> Option<&Image> {
        self.cache
            .image
            .get_or_init(|| resolve::feed_image(&self.cx()))
            .as_ref()
    }

    pub fn categories(&self) -> Option<&[Category]> {
        self.cache
            .categories
            .get_or_init(|| resolve::feed_categories(&self.cx()))
            .as_deref()
    }

    /// # Errors
    ///
    /// Returns [`Error::FieldIntegrity`] when a date is present but
    /// unparsable. Only a successful resolution is cached.
    pub fn date_modified(&self) -> Result<Option<DateTime<FixedOffset>>> {
        if let Some(cached) = self.cache.date_modified.get() {
            return Ok(*cached);
        }
        let value = resolve::feed_date_modified(&self.cx())?;
        let _ = self.cache.date_modified.set(value);
        Ok(value)
    }

    /// # Errors
    ///
    /// Same contract as [`Feed::date_modified`].
    pub fn last_build_date(&self) -> Result<Option<DateTime<FixedOffset>>> {
        if let Some(cached) = self.cache.last_build_date.get() {
            return Ok(*cached);
        }
        let value = resolve::feed_last_build_date(&self.cx())?;
        let _ = self.cache.last_build_date.set(value);
        Ok(value)
    }

    /// Entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
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
    /// [`Error::UnknownAccessor`] when no bound extension implements the
    /// accessor; extension-level integrity errors pass through.
    pub fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        extension::dispatch(&self.extensions, accessor)
    }
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("feed_type", &self.feed_type)
            .field("title", &self.title())
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Locates the feed-level node and the entry nodes for a detected dialect.
fn locate(doc: &Rc<Document>, feed_type: FeedType) -> Result<(NodeId, Vec<NodeId>)> {
    match feed_type {
        FeedType::Unknown => Err(Error::UnsupportedDocument(
            "root structure matches no known feed dialect".to_string(),
        )),
        FeedType::Rss10 | FeedType::Rss090 => {
            let content_ns = if feed_type == FeedType::Rss090 {
                ns::RSS_090
            } else {
                ns::RSS_10
            };
            let channel = doc
                .find_child(doc.root(), Some(content_ns), "channel")
                .ok_or_else(|| {
                    Error::UnsupportedDocument("RDF feed has no channel element".to_string())
                })?;
            // Items are siblings of the channel; tolerate feeds that nest
            // them inside it anyway.
            let mut items: Vec<NodeId> =
                doc.find_children(doc.root(), Some(content_ns), "item").collect();
            if items.is_empty() {
                items = doc.find_children(channel, Some(content_ns), "item").collect();
            }
            Ok((channel, items))
        }
        t if t.is_rss() => {
            let channel = doc.find_child(doc.root(), None, "channel").ok_or_else(|| {
                Error::UnsupportedDocument("RSS document has no channel element".to_string())
            })?;
            Ok((channel, doc.find_children(channel, None, "item").collect()))
        }
        FeedType::Atom10Entry => Ok((doc.root(), vec![doc.root()])),
        t => {
            let atom_ns = if t == FeedType::Atom03 {
                ns::ATOM_03
            } else {
                ns::ATOM_10
            };
            let feed = if doc.local_name(doc.root()) == "feed"
                && doc.namespace(doc.root()) == Some(atom_ns)
            {
                doc.root()
            } else {
                doc.find_descendant(doc.root(), atom_ns, "feed").ok_or_else(|| {
                    Error::UnsupportedDocument("Atom document has no feed element".to_string())
                })?
            };
            Ok((feed, doc.find_children(feed, Some(atom_ns), "entry").collect()))
        }
    }
}

/// A registry missing part of the stock set still imports; the gap is
/// only worth a log line.
fn warn_missing_capabilities(registry: &ExtensionRegistry) {
    for name in capability::STOCK {
        if !name.ends_with("/writer") && !registry.has(name) {
            tracing::warn!(capability = name, "Optional extension capability not registered");
        }
    }
}
