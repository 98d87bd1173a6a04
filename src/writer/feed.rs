//! Feed property bag, entry index, and export entry points.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};

use crate::error::{Error, Result};
use crate::extension::ExtensionRegistry;
use crate::model::{Category, Generator, Image, Person};
use crate::util::{text, uri};
use crate::writer::entry::{Deleted, Entry};
use crate::writer::podcast::Podcast;
use crate::writer::render;
use crate::writer::{checked_category, checked_person, Dialect, MissingFieldPolicy};

/// An indexed slot in a feed: a live entry or a tombstone.
#[derive(Debug, Clone)]
pub(crate) enum Item {
    Entry(Entry),
    Tombstone(Deleted),
}

impl Item {
    /// Sort key for [`Feed::order_by_date`]: modified beats created for
    /// entries, tombstones use their deletion instant.
    fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Item::Entry(entry) => entry.date_modified().or(entry.date_created()),
            Item::Tombstone(deleted) => deleted.when(),
        }
    }
}

/// A feed under construction.
///
/// Field setters validate at set time exactly like [`Entry`]'s. Entries and
/// tombstones share one index space keyed by insertion order;
/// [`Feed::remove_entry`] unsets a key without renumbering the rest, so
/// indices may be sparse until [`Feed::order_by_date`] reassigns them.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
    feed_link: Option<String>,
    hubs: Vec<String>,
    id: Option<String>,
    language: Option<String>,
    copyright: Option<String>,
    encoding: Option<String>,
    authors: Vec<Person>,
    categories: Vec<Category>,
    generator: Option<Generator>,
    image: Option<Image>,
    date_created: Option<DateTime<FixedOffset>>,
    date_modified: Option<DateTime<FixedOffset>>,
    last_build_date: Option<DateTime<FixedOffset>>,
    podcast: Podcast,
    items: BTreeMap<usize, Item>,
    next_index: usize,
}

impl Feed {
    pub fn new() -> Feed {
        Feed::default()
    }

    /// Sets the feed title. Rejects blank input.
    pub fn set_title(&mut self, value: &str) -> Result<&mut Feed> {
        self.title = Some(text::require_non_empty("title", value)?);
        Ok(self)
    }

    /// Sets the description (RSS `description`, Atom `subtitle`).
    pub fn set_description(&mut self, value: &str) -> Result<&mut Feed> {
        self.description = Some(text::require_non_empty("description", value)?);
        Ok(self)
    }

    /// Sets the website link. Must be an absolute URI.
    pub fn set_link(&mut self, value: &str) -> Result<&mut Feed> {
        uri::validate_absolute_uri("link", value)?;
        self.link = Some(value.trim().to_string());
        Ok(self)
    }

    /// Sets the feed's own URL, rendered as a `rel="self"` link.
    pub fn set_feed_link(&mut self, value: &str) -> Result<&mut Feed> {
        uri::validate_absolute_uri("feed link", value)?;
        self.feed_link = Some(value.trim().to_string());
        Ok(self)
    }

    /// Appends a hub endpoint, rendered as a `rel="hub"` link.
    pub fn add_hub(&mut self, value: &str) -> Result<&mut Feed> {
        uri::validate_absolute_uri("hub", value)?;
        self.hubs.push(value.trim().to_string());
        Ok(self)
    }

    /// Sets the feed id: an absolute URI or an RFC 4151 `tag:` URI.
    pub fn set_id(&mut self, value: &str) -> Result<&mut Feed> {
        uri::validate_feed_id("id", value.trim())?;
        self.id = Some(value.trim().to_string());
        Ok(self)
    }

    /// Sets the feed language (RSS `language`, Atom `xml:lang`).
    pub fn set_language(&mut self, value: &str) -> Result<&mut Feed> {
        self.language = Some(text::require_non_empty("language", value)?);
        Ok(self)
    }

    pub fn set_copyright(&mut self, value: &str) -> Result<&mut Feed> {
        self.copyright = Some(text::require_non_empty("copyright", value)?);
        Ok(self)
    }

    /// Sets the encoding named in the XML declaration. Output bytes are
    /// always UTF-8; this only changes the declared label.
    pub fn set_encoding(&mut self, value: &str) -> Result<&mut Feed> {
        self.encoding = Some(text::require_non_empty("encoding", value)?);
        Ok(self)
    }

    /// Appends a feed-level author.
    pub fn add_author(&mut self, author: Person) -> Result<&mut Feed> {
        self.authors.push(checked_person("author", author)?);
        Ok(self)
    }

    pub fn add_category(&mut self, category: Category) -> Result<&mut Feed> {
        self.categories.push(checked_category(category)?);
        Ok(self)
    }

    /// Sets the generator. The name is required; a `uri` must be absolute
    /// when given. When no generator is set at all, export emits this
    /// crate's name and version instead.
    pub fn set_generator(&mut self, mut generator: Generator) -> Result<&mut Feed> {
        generator.name = text::require_non_empty("generator", &generator.name)?;
        if let Some(uri_value) = &generator.uri {
            uri::validate_absolute_uri("generator", uri_value)?;
        }
        self.generator = Some(generator);
        Ok(self)
    }

    /// Sets the channel image (RSS) / logo (Atom). The URL must be
    /// absolute; RSS caps image dimensions at 144x400.
    pub fn set_image(&mut self, image: Image) -> Result<&mut Feed> {
        uri::validate_absolute_uri("image", &image.url)?;
        if image.width.is_some_and(|w| w == 0 || w > 144) {
            return Err(Error::FieldIntegrity {
                field: "image",
                message: "width must be between 1 and 144 pixels".to_string(),
            });
        }
        if image.height.is_some_and(|h| h == 0 || h > 400) {
            return Err(Error::FieldIntegrity {
                field: "image",
                message: "height must be between 1 and 400 pixels".to_string(),
            });
        }
        self.image = Some(image);
        Ok(self)
    }

    pub fn set_date_created(&mut self, value: DateTime<FixedOffset>) -> &mut Feed {
        self.date_created = Some(value);
        self
    }

    pub fn set_date_modified(&mut self, value: DateTime<FixedOffset>) -> &mut Feed {
        self.date_modified = Some(value);
        self
    }

    /// Sets the RSS `lastBuildDate`. Atom output has no equivalent element.
    pub fn set_last_build_date(&mut self, value: DateTime<FixedOffset>) -> &mut Feed {
        self.last_build_date = Some(value);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn feed_link(&self) -> Option<&str> {
        self.feed_link.as_deref()
    }

    pub fn hubs(&self) -> &[String] {
        &self.hubs
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn copyright(&self) -> Option<&str> {
        self.copyright.as_deref()
    }

    /// The label written into the XML declaration; defaults to UTF-8.
    pub fn encoding(&self) -> &str {
        self.encoding.as_deref().unwrap_or("UTF-8")
    }

    pub fn authors(&self) -> &[Person] {
        &self.authors
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn generator(&self) -> Option<&Generator> {
        self.generator.as_ref()
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn date_created(&self) -> Option<DateTime<FixedOffset>> {
        self.date_created
    }

    pub fn date_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.date_modified
    }

    pub fn last_build_date(&self) -> Option<DateTime<FixedOffset>> {
        self.last_build_date
    }

    /// iTunes podcast metadata for the feed.
    pub fn podcast(&self) -> &Podcast {
        &self.podcast
    }

    pub fn podcast_mut(&mut self) -> &mut Podcast {
        &mut self.podcast
    }

    /// Adds an entry and returns its index.
    pub fn add_entry(&mut self, entry: Entry) -> usize {
        self.insert(Item::Entry(entry))
    }

    /// Adds a tombstone and returns its index. Tombstones share the entry
    /// index space but only appear in Atom output.
    pub fn add_tombstone(&mut self, deleted: Deleted) -> usize {
        self.insert(Item::Tombstone(deleted))
    }

    fn insert(&mut self, item: Item) -> usize {
        let index = self.next_index;
        self.items.insert(index, item);
        self.next_index += 1;
        index
    }

    /// Removes the entry or tombstone at `index`. Later indices keep their
    /// positions, leaving a gap.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when nothing lives at that index.
    pub fn remove_entry(&mut self, index: usize) -> Result<()> {
        match self.items.remove(&index) {
            Some(_) => Ok(()),
            None => Err(Error::InvalidInput(format!("no entry at index {index}"))),
        }
    }

    /// The entry at `index`, if one exists there (tombstones return `None`).
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        match self.items.get(&index) {
            Some(Item::Entry(entry)) => Some(entry),
            _ => None,
        }
    }

    pub fn entry_mut(&mut self, index: usize) -> Option<&mut Entry> {
        match self.items.get_mut(&index) {
            Some(Item::Entry(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Entries in index order, with their indices.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &Entry)> + '_ {
        self.items.iter().filter_map(|(i, item)| match item {
            Item::Entry(entry) => Some((*i, entry)),
            Item::Tombstone(_) => None,
        })
    }

    /// Tombstones in index order, with their indices.
    pub fn tombstones(&self) -> impl Iterator<Item = (usize, &Deleted)> + '_ {
        self.items.iter().filter_map(|(i, item)| match item {
            Item::Tombstone(deleted) => Some((*i, deleted)),
            Item::Entry(_) => None,
        })
    }

    /// Total number of entries and tombstones.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every slot in index order, for the renderers.
    pub(crate) fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.values()
    }

    /// Reassigns indices so iteration runs newest-first by modified-else-
    /// created timestamp (tombstones sort by their deletion instant). Ties
    /// and undated items keep their relative insertion order; undated items
    /// sort after all dated ones. Indices come out dense starting at 0.
    pub fn order_by_date(&mut self) {
        let mut items: Vec<Item> = std::mem::take(&mut self.items).into_values().collect();
        items.sort_by(|a, b| match (a.timestamp(), b.timestamp()) {
            (Some(left), Some(right)) => right.cmp(&left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        self.next_index = items.len();
        self.items = items.into_iter().enumerate().collect();
    }

    /// Serializes the feed with the stock writer extensions.
    ///
    /// # Errors
    ///
    /// [`Error::MissingRequiredField`](crate::Error::MissingRequiredField)
    /// when a dialect-mandated element has no value and `policy` is
    /// [`MissingFieldPolicy::Error`].
    pub fn export(&self, dialect: Dialect, policy: MissingFieldPolicy) -> Result<String> {
        self.export_with(&ExtensionRegistry::core(), dialect, policy)
    }

    /// Serializes the feed using `registry`'s writer extensions instead of
    /// the stock set.
    pub fn export_with(
        &self,
        registry: &ExtensionRegistry,
        dialect: Dialect,
        policy: MissingFieldPolicy,
    ) -> Result<String> {
        let extensions = registry.writer_extensions();
        match dialect {
            Dialect::Rss => render::rss::render(self, policy, &extensions),
            Dialect::Atom => render::atom::render(self, policy, &extensions),
        }
    }
}
