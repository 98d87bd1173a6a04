//! Declarative candidate chains for field resolution.
//!
//! Every logical field maps to two ordered source lists, one per dialect
//! family (RSS and Atom). A source is either a native tree lookup, a named
//! accessor on a registered capability, or a plain function for the shapes
//! the first two forms cannot express. Chains are evaluated strictly in
//! order and the first source yielding a value wins; multi-valued fields
//! take the complete set from that source, never a union across sources.
//!
//! Date chains are the one fallible kind: a present-but-malformed date
//! aborts resolution with a [`FieldIntegrity`](crate::Error::FieldIntegrity)
//! error instead of falling through, because a broken date and an absent
//! date are different conditions.

use chrono::{DateTime, FixedOffset};

use crate::detect::FeedType;
use crate::error::Result;
use crate::extension::{self, capability, non_empty, Extension, ExtensionValue};
use crate::model::{Category, Enclosure, Generator, Image, Person};
use crate::reader::date;
use crate::util;
use crate::xml::{ns, Document, NodeId};

/// Everything a resolution strategy may consult: the container's position in
/// the tree, the detected dialect, and the container's bound extensions.
pub(crate) struct Cx<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) node: NodeId,
    pub(crate) feed_type: FeedType,
    pub(crate) extensions: &'a [Box<dyn Extension>],
}

impl Cx<'_> {
    /// Namespace of the dialect's own child elements. RSS 2.0/0.9x elements
    /// are unqualified; the RDF dialects qualify them.
    fn native_ns(&self) -> Option<&'static str> {
        match self.feed_type {
            FeedType::Rss10 => Some(ns::RSS_10),
            FeedType::Rss090 => Some(ns::RSS_090),
            _ => None,
        }
    }

    fn native_text(&self, local: &str) -> Option<String> {
        self.doc.child_text(self.node, self.native_ns(), local)
    }

    fn native_child(&self, local: &str) -> Option<NodeId> {
        self.doc.find_child(self.node, self.native_ns(), local)
    }

    fn ext(&self, capability: &str) -> Option<&dyn Extension> {
        extension::find(self.extensions, capability)
    }

    /// Infallible extension lookup. The accessors routed through here never
    /// produce integrity errors; anything else is a bug worth a log line,
    /// not a resolution failure.
    fn ext_value(&self, capability: &str, accessor: &str) -> Option<ExtensionValue> {
        match self.ext(capability)?.get(accessor) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(capability, accessor, error = %e, "Extension lookup failed");
                None
            }
        }
    }

    fn ext_text(&self, capability: &str, accessor: &str) -> Option<String> {
        self.ext_value(capability, accessor)?.into_text()
    }

    fn ext_date(
        &self,
        capability: &str,
        accessor: &str,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        match self.ext(capability) {
            Some(ext) => Ok(ext.get(accessor)?.and_then(ExtensionValue::into_date)),
            None => Ok(None),
        }
    }
}

/// One link in a text chain.
#[derive(Clone, Copy)]
enum Text {
    /// Child element of the container node in the dialect's own namespace.
    Native(&'static str),
    /// Named accessor on a registered capability.
    Ext(&'static str, &'static str),
    /// Free-form strategy.
    Fn(fn(&Cx) -> Option<String>),
}

fn first_text(cx: &Cx, chain: &[Text]) -> Option<String> {
    chain.iter().find_map(|source| match source {
        Text::Native(local) => cx.native_text(local),
        Text::Ext(capability, accessor) => cx.ext_text(capability, accessor),
        Text::Fn(f) => f(cx),
    })
}

/// One link in a date chain.
#[derive(Clone, Copy)]
enum Date {
    /// Child element text parsed as RFC 822/2822, the RSS convention.
    NativeRfc2822(&'static str),
    /// Capability accessor already yielding a parsed date (Atom and Dublin
    /// Core sources parse RFC 3339/ISO 8601 themselves).
    Ext(&'static str, &'static str),
}

fn first_date(cx: &Cx, chain: &[Date]) -> Result<Option<DateTime<FixedOffset>>> {
    for source in chain {
        let resolved = match *source {
            Date::NativeRfc2822(local) => match cx.native_text(local) {
                Some(raw) => Some(date::parse_rfc2822_date(local, &raw)?),
                None => None,
            },
            Date::Ext(capability, accessor) => cx.ext_date(capability, accessor)?,
        };
        if resolved.is_some() {
            return Ok(resolved);
        }
    }
    Ok(None)
}

/// Structured fields (people, categories, enclosures, images) chain plain
/// strategy functions.
fn first<T>(cx: &Cx, chain: &[fn(&Cx) -> Option<T>]) -> Option<T> {
    chain.iter().find_map(|f| f(cx))
}

fn pick<'c, T>(cx: &Cx, rss: &'c [T], atom: &'c [T]) -> &'c [T] {
    if cx.feed_type.is_atom() {
        atom
    } else {
        rss
    }
}

// ===== Feed-level fields =====

pub(crate) fn feed_title(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("title"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "title"),
        Text::Ext(capability::ATOM_FEED, "title"),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_FEED, "title"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "title"),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn feed_description(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("description"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "description"),
        Text::Ext(capability::ATOM_FEED, "subtitle"),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_FEED, "subtitle"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "description"),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}

/// The feed's website link (Atom `rel="alternate"`).
pub(crate) fn feed_link(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("link"),
        Text::Ext(capability::ATOM_FEED, "link"),
    ];
    const ATOM: &[Text] = &[Text::Ext(capability::ATOM_FEED, "link")];
    first_text(cx, pick(cx, RSS, ATOM))
}

/// The feed's own URL (Atom `rel="self"`); RSS documents only carry this
/// through an Atom decoration.
pub(crate) fn feed_self_link(cx: &Cx) -> Option<String> {
    const CHAIN: &[Text] = &[Text::Ext(capability::ATOM_FEED, "feed_link")];
    first_text(cx, CHAIN)
}

pub(crate) fn feed_hubs(cx: &Cx) -> Option<Vec<String>> {
    cx.ext_value(capability::ATOM_FEED, "hubs")?.into_text_list()
}

/// Native guid first, as at entry level; the link and title fallbacks only
/// apply once the identifier sources are exhausted.
pub(crate) fn feed_id(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("guid"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "identifier"),
        Text::Ext(capability::ATOM_FEED, "id"),
        Text::Fn(feed_link),
        Text::Fn(feed_title),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_FEED, "id"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "identifier"),
        Text::Fn(feed_link),
        Text::Fn(feed_title),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn feed_language(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("language"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "language"),
        Text::Fn(rdf_root_language),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_FEED, "language"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "language"),
        Text::Fn(root_xml_lang),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}

/// RDF dialects have no language element of their own; an `xml:lang` on the
/// root stands in.
fn rdf_root_language(cx: &Cx) -> Option<String> {
    if cx.feed_type.is_rdf() {
        root_xml_lang(cx)
    } else {
        None
    }
}

fn root_xml_lang(cx: &Cx) -> Option<String> {
    cx.doc.attr(cx.doc.root(), "xml:lang").map(String::from)
}

pub(crate) fn feed_copyright(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("copyright"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "rights"),
        Text::Ext(capability::ATOM_FEED, "rights"),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_FEED, "rights"),
        Text::Ext(capability::DUBLIN_CORE_FEED, "rights"),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn feed_authors(cx: &Cx) -> Option<Vec<Person>> {
    const RSS: &[fn(&Cx) -> Option<Vec<Person>>] = &[
        rss_channel_people,
        |cx| cx.ext_value(capability::DUBLIN_CORE_FEED, "creators")?.into_people(),
        |cx| cx.ext_value(capability::ATOM_FEED, "authors")?.into_people(),
    ];
    const ATOM: &[fn(&Cx) -> Option<Vec<Person>>] = &[
        |cx| cx.ext_value(capability::ATOM_FEED, "authors")?.into_people(),
        |cx| cx.ext_value(capability::DUBLIN_CORE_FEED, "creators")?.into_people(),
    ];
    first(cx, pick(cx, RSS, ATOM))
}

/// RSS 2.0 names its responsible humans `managingEditor` and `webMaster`.
fn rss_channel_people(cx: &Cx) -> Option<Vec<Person>> {
    let mut people = Vec::new();
    for local in ["managingEditor", "webMaster"] {
        if let Some(person) = cx.native_text(local).as_deref().and_then(util::text::parse_author)
        {
            people.push(person);
        }
    }
    non_empty(people)
}

pub(crate) fn feed_generator(cx: &Cx) -> Option<Generator> {
    const RSS: &[fn(&Cx) -> Option<Generator>] = &[rss_generator, atom_generator];
    const ATOM: &[fn(&Cx) -> Option<Generator>] = &[atom_generator];
    first(cx, pick(cx, RSS, ATOM))
}

fn rss_generator(cx: &Cx) -> Option<Generator> {
    cx.native_text("generator").map(Generator::named)
}

fn atom_generator(cx: &Cx) -> Option<Generator> {
    cx.ext_value(capability::ATOM_FEED, "generator")?.into_generator()
}

pub(crate) fn feed_image(cx: &Cx) -> Option<Image> {
    const RSS: &[fn(&Cx) -> Option<Image>] = &[rss_image, atom_logo];
    const ATOM: &[fn(&Cx) -> Option<Image>] = &[atom_logo];
    first(cx, pick(cx, RSS, ATOM))
}

fn rss_image(cx: &Cx) -> Option<Image> {
    // RDF dialects attach the image to the root, as a sibling of the channel.
    let node = cx.native_child("image").or_else(|| {
        cx.feed_type
            .is_rdf()
            .then(|| cx.doc.find_child(cx.doc.root(), cx.native_ns(), "image"))
            .flatten()
    })?;
    let doc = cx.doc;
    let url = doc.child_text(node, cx.native_ns(), "url")?;
    let dimension = |local: &str| {
        let raw = doc.child_text(node, cx.native_ns(), local)?;
        match raw.trim().parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => {
                tracing::debug!(element = local, value = %raw, "Ignoring non-numeric image dimension");
                None
            }
        }
    };
    Some(Image {
        url,
        title: doc.child_text(node, cx.native_ns(), "title"),
        link: doc.child_text(node, cx.native_ns(), "link"),
        width: dimension("width"),
        height: dimension("height"),
        description: doc.child_text(node, cx.native_ns(), "description"),
    })
}

fn atom_logo(cx: &Cx) -> Option<Image> {
    let url = cx.ext_text(capability::ATOM_FEED, "image")?;
    Some(Image {
        url,
        ..Image::default()
    })
}

pub(crate) fn feed_categories(cx: &Cx) -> Option<Vec<Category>> {
    const RSS: &[fn(&Cx) -> Option<Vec<Category>>] = &[
        rss_categories,
        |cx| cx.ext_value(capability::DUBLIN_CORE_FEED, "subjects")?.into_categories(),
        |cx| cx.ext_value(capability::ATOM_FEED, "categories")?.into_categories(),
    ];
    const ATOM: &[fn(&Cx) -> Option<Vec<Category>>] = &[
        |cx| cx.ext_value(capability::ATOM_FEED, "categories")?.into_categories(),
        |cx| cx.ext_value(capability::DUBLIN_CORE_FEED, "subjects")?.into_categories(),
    ];
    first(cx, pick(cx, RSS, ATOM))
}

/// RSS `category` text with an optional `domain` scheme attribute.
fn rss_categories(cx: &Cx) -> Option<Vec<Category>> {
    let categories = cx
        .doc
        .find_children(cx.node, cx.native_ns(), "category")
        .filter_map(|n| {
            let term = cx.doc.text(n)?;
            Some(Category {
                term,
                scheme: cx.doc.attr(n, "domain").map(String::from),
                label: None,
            })
        })
        .collect();
    non_empty(categories)
}

pub(crate) fn feed_date_modified(cx: &Cx) -> Result<Option<DateTime<FixedOffset>>> {
    const RSS: &[Date] = &[
        Date::NativeRfc2822("pubDate"),
        Date::NativeRfc2822("lastBuildDate"),
        Date::Ext(capability::DUBLIN_CORE_FEED, "date"),
        Date::Ext(capability::ATOM_FEED, "updated"),
    ];
    const ATOM: &[Date] = &[
        Date::Ext(capability::ATOM_FEED, "updated"),
        Date::Ext(capability::DUBLIN_CORE_FEED, "date"),
    ];
    first_date(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn feed_last_build_date(cx: &Cx) -> Result<Option<DateTime<FixedOffset>>> {
    const RSS: &[Date] = &[Date::NativeRfc2822("lastBuildDate")];
    const ATOM: &[Date] = &[];
    first_date(cx, pick(cx, RSS, ATOM))
}

// ===== Entry-level fields =====

pub(crate) fn entry_title(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("title"),
        Text::Ext(capability::DUBLIN_CORE_ENTRY, "title"),
        Text::Ext(capability::ATOM_ENTRY, "title"),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_ENTRY, "title"),
        Text::Ext(capability::DUBLIN_CORE_ENTRY, "title"),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn entry_description(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("description"),
        Text::Ext(capability::DUBLIN_CORE_ENTRY, "description"),
        Text::Ext(capability::ATOM_ENTRY, "summary"),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_ENTRY, "summary"),
        Text::Ext(capability::DUBLIN_CORE_ENTRY, "description"),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}

/// Full content; falls back to the description when no dedicated content
/// element exists.
pub(crate) fn entry_content(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Ext(capability::CONTENT_ENTRY, "content"),
        Text::Fn(entry_description),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_ENTRY, "content"),
        Text::Fn(entry_description),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn entry_link(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("link"),
        Text::Ext(capability::ATOM_ENTRY, "link"),
    ];
    const ATOM: &[Text] = &[Text::Ext(capability::ATOM_ENTRY, "link")];
    first_text(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn entry_links(cx: &Cx) -> Option<Vec<String>> {
    const RSS: &[fn(&Cx) -> Option<Vec<String>>] = &[
        rss_links,
        |cx| cx.ext_value(capability::ATOM_ENTRY, "links")?.into_text_list(),
    ];
    const ATOM: &[fn(&Cx) -> Option<Vec<String>>] =
        &[|cx| cx.ext_value(capability::ATOM_ENTRY, "links")?.into_text_list()];
    first(cx, pick(cx, RSS, ATOM))
}

fn rss_links(cx: &Cx) -> Option<Vec<String>> {
    let links = cx
        .doc
        .find_children(cx.node, cx.native_ns(), "link")
        .filter_map(|n| cx.doc.text(n))
        .collect();
    non_empty(links)
}

/// Native id first; Dublin Core identifier next; then the title as a
/// pseudo-id, a deliberate normalization for legacy RSS. `None` only when
/// the title is absent too.
pub(crate) fn entry_id(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("guid"),
        Text::Ext(capability::DUBLIN_CORE_ENTRY, "identifier"),
        Text::Fn(entry_title),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_ENTRY, "id"),
        Text::Ext(capability::DUBLIN_CORE_ENTRY, "identifier"),
        Text::Fn(entry_title),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn entry_authors(cx: &Cx) -> Option<Vec<Person>> {
    const RSS: &[fn(&Cx) -> Option<Vec<Person>>] = &[
        rss_entry_people,
        |cx| cx.ext_value(capability::DUBLIN_CORE_ENTRY, "creators")?.into_people(),
        |cx| cx.ext_value(capability::ATOM_ENTRY, "authors")?.into_people(),
    ];
    const ATOM: &[fn(&Cx) -> Option<Vec<Person>>] = &[
        |cx| cx.ext_value(capability::ATOM_ENTRY, "authors")?.into_people(),
        |cx| cx.ext_value(capability::DUBLIN_CORE_ENTRY, "creators")?.into_people(),
    ];
    first(cx, pick(cx, RSS, ATOM))
}

fn rss_entry_people(cx: &Cx) -> Option<Vec<Person>> {
    let people = cx
        .doc
        .find_children(cx.node, cx.native_ns(), "author")
        .filter_map(|n| cx.doc.text(n))
        .filter_map(|raw| util::text::parse_author(&raw))
        .collect();
    non_empty(people)
}

pub(crate) fn entry_categories(cx: &Cx) -> Option<Vec<Category>> {
    const RSS: &[fn(&Cx) -> Option<Vec<Category>>] = &[
        rss_categories,
        |cx| cx.ext_value(capability::DUBLIN_CORE_ENTRY, "subjects")?.into_categories(),
        |cx| cx.ext_value(capability::ATOM_ENTRY, "categories")?.into_categories(),
    ];
    const ATOM: &[fn(&Cx) -> Option<Vec<Category>>] = &[
        |cx| cx.ext_value(capability::ATOM_ENTRY, "categories")?.into_categories(),
        |cx| cx.ext_value(capability::DUBLIN_CORE_ENTRY, "subjects")?.into_categories(),
    ];
    first(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn entry_date_modified(cx: &Cx) -> Result<Option<DateTime<FixedOffset>>> {
    const RSS: &[Date] = &[
        Date::NativeRfc2822("pubDate"),
        Date::Ext(capability::DUBLIN_CORE_ENTRY, "date"),
        Date::Ext(capability::ATOM_ENTRY, "updated"),
    ];
    const ATOM: &[Date] = &[
        Date::Ext(capability::ATOM_ENTRY, "updated"),
        Date::Ext(capability::DUBLIN_CORE_ENTRY, "date"),
    ];
    first_date(cx, pick(cx, RSS, ATOM))
}

/// RSS has no separate creation date; `pubDate` serves both.
pub(crate) fn entry_date_created(cx: &Cx) -> Result<Option<DateTime<FixedOffset>>> {
    const RSS: &[Date] = &[
        Date::NativeRfc2822("pubDate"),
        Date::Ext(capability::DUBLIN_CORE_ENTRY, "date"),
        Date::Ext(capability::ATOM_ENTRY, "published"),
    ];
    const ATOM: &[Date] = &[
        Date::Ext(capability::ATOM_ENTRY, "published"),
        Date::Ext(capability::DUBLIN_CORE_ENTRY, "date"),
    ];
    first_date(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn entry_enclosure(cx: &Cx) -> Option<Enclosure> {
    const RSS: &[fn(&Cx) -> Option<Enclosure>] = &[rss_enclosure, atom_enclosure];
    const ATOM: &[fn(&Cx) -> Option<Enclosure>] = &[atom_enclosure];
    first(cx, pick(cx, RSS, ATOM))
}

fn rss_enclosure(cx: &Cx) -> Option<Enclosure> {
    let node = cx.native_child("enclosure")?;
    let url = cx.doc.attr(node, "url")?.to_string();
    let length = cx.doc.attr(node, "length").and_then(|raw| {
        match raw.trim().parse::<u64>() {
            Ok(n) => Some(n),
            Err(_) => {
                tracing::debug!(value = %raw, "Ignoring non-numeric enclosure length");
                None
            }
        }
    });
    Some(Enclosure {
        url,
        length,
        mime_type: cx.doc.attr(node, "type").map(String::from),
    })
}

fn atom_enclosure(cx: &Cx) -> Option<Enclosure> {
    cx.ext_value(capability::ATOM_ENTRY, "enclosure")?.into_enclosure()
}

pub(crate) fn entry_comment_count(cx: &Cx) -> Option<i64> {
    const RSS: &[fn(&Cx) -> Option<i64>] = &[
        |cx| cx.ext_value(capability::SLASH_ENTRY, "comment_count")?.into_integer(),
        |cx| cx.ext_value(capability::THREAD_ENTRY, "total")?.into_integer(),
    ];
    const ATOM: &[fn(&Cx) -> Option<i64>] = &[
        |cx| cx.ext_value(capability::THREAD_ENTRY, "total")?.into_integer(),
        |cx| cx.ext_value(capability::SLASH_ENTRY, "comment_count")?.into_integer(),
    ];
    first(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn entry_comment_link(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Native("comments"),
        Text::Ext(capability::ATOM_ENTRY, "comment_link"),
    ];
    const ATOM: &[Text] = &[Text::Ext(capability::ATOM_ENTRY, "comment_link")];
    first_text(cx, pick(cx, RSS, ATOM))
}

pub(crate) fn entry_comment_feed_link(cx: &Cx) -> Option<String> {
    const RSS: &[Text] = &[
        Text::Ext(capability::WELL_FORMED_WEB_ENTRY, "comment_feed_link"),
        Text::Ext(capability::ATOM_ENTRY, "comment_feed_link"),
    ];
    const ATOM: &[Text] = &[
        Text::Ext(capability::ATOM_ENTRY, "comment_feed_link"),
        Text::Ext(capability::WELL_FORMED_WEB_ENTRY, "comment_feed_link"),
    ];
    first_text(cx, pick(cx, RSS, ATOM))
}
