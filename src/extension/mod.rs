//! Pluggable metadata extensions.
//!
//! Feeds routinely carry vocabulary from outside their own dialect: Dublin
//! Core terms on RSS 1.0, `content:encoded` on RSS 2.0, iTunes tags on
//! podcast feeds, Atom self-links inside RSS channels. Each vocabulary is an
//! [`Extension`]: a named capability with an accessor vocabulary, bound at
//! container construction to the channel/feed element (`*/feed` scope) or an
//! item/entry element (`*/entry` scope).
//!
//! Extensions serve two masters:
//!
//! - the resolver's candidate chains call *specific* capabilities by name as
//!   fallback sources (Dublin Core `identifier` when RSS lacks a `guid`);
//! - dynamic container calls (`feed.get("comment_count")`) are dispatched to
//!   the **first registered** extension whose vocabulary contains the
//!   accessor. Registration order therefore matters, and an accessor no
//!   registered extension implements is a hard
//!   [`UnknownAccessor`](crate::Error::UnknownAccessor) error.
//!
//! The registry is a plain value owned by the [`Reader`](crate::Reader)
//! context, not process state. [`ExtensionRegistry::core`] registers the
//! stock set; custom extensions are added with
//! [`ExtensionRegistry::register_reader`].

use std::rc::Rc;

use chrono::{DateTime, FixedOffset};

use crate::detect::FeedType;
use crate::error::{Error, Result};
use crate::model::{Category, Enclosure, Generator, Person};
use crate::writer::WriterExtension;
use crate::xml::{Document, NodeId};

pub mod atom;
pub mod content;
pub mod dublincore;
pub mod googleplay;
pub mod podcast;
pub mod podcastindex;
pub mod slash;
pub mod thread;
pub mod wellformedweb;

/// Capability names of the stock extension set.
pub mod capability {
    pub const DUBLIN_CORE_FEED: &str = "dublincore/feed";
    pub const DUBLIN_CORE_ENTRY: &str = "dublincore/entry";
    pub const CONTENT_ENTRY: &str = "content/entry";
    pub const ATOM_FEED: &str = "atom/feed";
    pub const ATOM_ENTRY: &str = "atom/entry";
    pub const SLASH_ENTRY: &str = "slash/entry";
    pub const WELL_FORMED_WEB_ENTRY: &str = "wellformedweb/entry";
    pub const THREAD_ENTRY: &str = "thread/entry";
    pub const PODCAST_FEED: &str = "podcast/feed";
    pub const PODCAST_ENTRY: &str = "podcast/entry";
    pub const GOOGLEPLAY_FEED: &str = "googleplaypodcast/feed";
    pub const GOOGLEPLAY_ENTRY: &str = "googleplaypodcast/entry";
    pub const PODCAST_INDEX_FEED: &str = "podcastindex/feed";
    pub const PODCAST_INDEX_ENTRY: &str = "podcastindex/entry";
    pub const PODCAST_WRITER: &str = "podcast/writer";

    /// The full stock set. Containers built against a registry missing one of
    /// these log a warning; the absence itself is never an error.
    pub const STOCK: &[&str] = &[
        DUBLIN_CORE_FEED,
        DUBLIN_CORE_ENTRY,
        CONTENT_ENTRY,
        ATOM_FEED,
        ATOM_ENTRY,
        SLASH_ENTRY,
        WELL_FORMED_WEB_ENTRY,
        THREAD_ENTRY,
        PODCAST_FEED,
        PODCAST_ENTRY,
        GOOGLEPLAY_FEED,
        GOOGLEPLAY_ENTRY,
        PODCAST_INDEX_FEED,
        PODCAST_INDEX_ENTRY,
        PODCAST_WRITER,
    ];
}

/// Everything an extension needs to answer queries: the shared document, the
/// element it is scoped to, and the detected dialect.
#[derive(Clone)]
pub struct ExtensionContext {
    pub doc: Rc<Document>,
    /// Channel/feed element for `*/feed` scope, item/entry element for
    /// `*/entry` scope.
    pub node: NodeId,
    pub feed_type: FeedType,
}

/// A value produced by an extension accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    Text(String),
    Integer(i64),
    Flag(bool),
    Date(DateTime<FixedOffset>),
    TextList(Vec<String>),
    People(Vec<Person>),
    Categories(Vec<Category>),
    Enclosure(Enclosure),
    Generator(Generator),
}

impl ExtensionValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            ExtensionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_integer(self) -> Option<i64> {
        match self {
            ExtensionValue::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn into_date(self) -> Option<DateTime<FixedOffset>> {
        match self {
            ExtensionValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_text_list(self) -> Option<Vec<String>> {
        match self {
            ExtensionValue::TextList(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_people(self) -> Option<Vec<Person>> {
        match self {
            ExtensionValue::People(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_categories(self) -> Option<Vec<Category>> {
        match self {
            ExtensionValue::Categories(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_enclosure(self) -> Option<Enclosure> {
        match self {
            ExtensionValue::Enclosure(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_generator(self) -> Option<Generator> {
        match self {
            ExtensionValue::Generator(g) => Some(g),
            _ => None,
        }
    }
}

/// A read-side extension bound to one container.
pub trait Extension {
    /// The capability name this instance was registered under.
    fn capability(&self) -> &'static str;

    /// Accessors this extension answers; drives first-wins dynamic dispatch.
    fn accessors(&self) -> &'static [&'static str];

    /// Resolves one accessor. `Ok(None)` means the document simply lacks the
    /// data; malformed present values (dates) are integrity errors.
    ///
    /// Callers must only pass accessors listed by [`Extension::accessors`];
    /// others return `Ok(None)`.
    fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>>;
}

/// Constructor for a read-side extension.
pub type ExtensionCtor = fn(ExtensionContext) -> Box<dyn Extension>;

/// Constructor for a write-side extension renderer.
pub type WriterExtensionCtor = fn() -> Box<dyn WriterExtension>;

enum Registration {
    Reader(ExtensionCtor),
    Writer(WriterExtensionCtor),
}

/// Ordered extension registry.
///
/// Owned by the [`Reader`](crate::Reader) context (and passed explicitly to
/// the writer's `export_with`); there is no process-wide registry to reset.
pub struct ExtensionRegistry {
    entries: Vec<(&'static str, Registration)>,
}

impl ExtensionRegistry {
    /// A registry with nothing registered. Containers built from it still
    /// resolve native dialect fields, but every fallback chain stops at the
    /// native step and dynamic accessors all fail.
    pub fn empty() -> ExtensionRegistry {
        ExtensionRegistry {
            entries: Vec::new(),
        }
    }

    /// The stock extension set, in its documented dispatch order.
    pub fn core() -> ExtensionRegistry {
        let mut registry = ExtensionRegistry::empty();
        registry.register_reader(capability::DUBLIN_CORE_FEED, dublincore::feed_extension);
        registry.register_reader(capability::DUBLIN_CORE_ENTRY, dublincore::entry_extension);
        registry.register_reader(capability::CONTENT_ENTRY, content::entry_extension);
        registry.register_reader(capability::ATOM_FEED, atom::feed_extension);
        registry.register_reader(capability::ATOM_ENTRY, atom::entry_extension);
        registry.register_reader(capability::SLASH_ENTRY, slash::entry_extension);
        registry.register_reader(
            capability::WELL_FORMED_WEB_ENTRY,
            wellformedweb::entry_extension,
        );
        registry.register_reader(capability::THREAD_ENTRY, thread::entry_extension);
        registry.register_reader(capability::PODCAST_FEED, podcast::feed_extension);
        registry.register_reader(capability::PODCAST_ENTRY, podcast::entry_extension);
        registry.register_reader(capability::GOOGLEPLAY_FEED, googleplay::feed_extension);
        registry.register_reader(capability::GOOGLEPLAY_ENTRY, googleplay::entry_extension);
        registry.register_reader(capability::PODCAST_INDEX_FEED, podcastindex::feed_extension);
        registry.register_reader(capability::PODCAST_INDEX_ENTRY, podcastindex::entry_extension);
        registry.register_writer(
            capability::PODCAST_WRITER,
            crate::writer::podcast::writer_extension,
        );
        registry
    }

    /// Whether a capability is registered under this exact name.
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| *n == name)
    }

    /// Registered capability names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    /// Registers a read-side extension. Names use a `<vocabulary>/<scope>`
    /// convention where scope is `feed` or `entry`; the suffix decides which
    /// containers instantiate it. Re-registering a name replaces the
    /// constructor but keeps the original position.
    pub fn register_reader(&mut self, name: &'static str, ctor: ExtensionCtor) {
        self.register(name, Registration::Reader(ctor));
    }

    /// Registers a write-side renderer extension.
    pub fn register_writer(&mut self, name: &'static str, ctor: WriterExtensionCtor) {
        self.register(name, Registration::Writer(ctor));
    }

    fn register(&mut self, name: &'static str, registration: Registration) {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = registration;
        } else {
            self.entries.push((name, registration));
        }
    }

    /// Instantiates every `*/feed` extension for a container.
    pub(crate) fn instantiate_feed(&self, cx: &ExtensionContext) -> Vec<Box<dyn Extension>> {
        self.instantiate_scope(cx, "/feed")
    }

    /// Instantiates every `*/entry` extension for a container.
    pub(crate) fn instantiate_entry(&self, cx: &ExtensionContext) -> Vec<Box<dyn Extension>> {
        self.instantiate_scope(cx, "/entry")
    }

    fn instantiate_scope(&self, cx: &ExtensionContext, suffix: &str) -> Vec<Box<dyn Extension>> {
        self.entries
            .iter()
            .filter(|(name, _)| name.ends_with(suffix))
            .filter_map(|(_, reg)| match reg {
                Registration::Reader(ctor) => Some(ctor(cx.clone())),
                Registration::Writer(_) => None,
            })
            .collect()
    }

    /// Instantiates the write-side renderer extensions, in order.
    pub(crate) fn writer_extensions(&self) -> Vec<Box<dyn WriterExtension>> {
        self.entries
            .iter()
            .filter_map(|(_, reg)| match reg {
                Registration::Writer(ctor) => Some(ctor()),
                Registration::Reader(_) => None,
            })
            .collect()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        ExtensionRegistry::core()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// First-wins dynamic dispatch over a container's bound extensions.
pub(crate) fn dispatch(
    extensions: &[Box<dyn Extension>],
    accessor: &str,
) -> Result<Option<ExtensionValue>> {
    for ext in extensions {
        if ext.accessors().contains(&accessor) {
            return ext.get(accessor);
        }
    }
    Err(Error::UnknownAccessor(accessor.to_string()))
}

/// Looks up a bound extension instance by capability name.
pub(crate) fn find<'a>(
    extensions: &'a [Box<dyn Extension>],
    capability: &str,
) -> Option<&'a dyn Extension> {
    extensions
        .iter()
        .find(|e| e.capability() == capability)
        .map(|e| e.as_ref())
}

/// Multi-valued accessors report "no value" as `None`, never as an empty
/// list, so chain evaluation can fall through to the next source.
pub(crate) fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
