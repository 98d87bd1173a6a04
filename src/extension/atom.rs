//! Atom vocabulary, both 0.3 and 1.0.
//!
//! Double duty: for Atom containers this *is* the native dialect logic, and
//! for RSS containers it is the fallback source for fields RSS lacks
//! (self-links, hub links, structured authors). Element naming differences
//! between the 0.3 draft and RFC 4287 (`tagline`/`subtitle`,
//! `modified`/`updated`, `issued`/`published`, `copyright`/`rights`) are
//! absorbed here; everything downstream sees one vocabulary.

use chrono::{DateTime, FixedOffset};

use crate::detect::FeedType;
use crate::error::Result;
use crate::extension::{
    capability, non_empty, Extension, ExtensionContext, ExtensionValue,
};
use crate::model::{Category, Enclosure, Generator, Person};
use crate::xml::{ns, NodeId};

const FEED_ACCESSORS: &[&str] = &[
    "title",
    "subtitle",
    "id",
    "updated",
    "published",
    "rights",
    "language",
    "generator",
    "link",
    "links",
    "feed_link",
    "hubs",
    "authors",
    "contributors",
    "categories",
    "image",
    "icon",
];

const ENTRY_ACCESSORS: &[&str] = &[
    "title",
    "summary",
    "content",
    "id",
    "updated",
    "published",
    "rights",
    "link",
    "links",
    "authors",
    "contributors",
    "categories",
    "enclosure",
    "comment_link",
    "comment_feed_link",
];

pub(crate) fn feed_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(Atom {
        cx,
        capability: capability::ATOM_FEED,
        accessors: FEED_ACCESSORS,
    })
}

pub(crate) fn entry_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(Atom {
        cx,
        capability: capability::ATOM_ENTRY,
        accessors: ENTRY_ACCESSORS,
    })
}

struct Atom {
    cx: ExtensionContext,
    capability: &'static str,
    accessors: &'static [&'static str],
}

impl Atom {
    /// Atom 0.3 documents bind the draft namespace; everything else,
    /// including RSS feeds decorated with Atom elements, uses RFC 4287.
    fn ns(&self) -> &'static str {
        if self.cx.feed_type == FeedType::Atom03 {
            ns::ATOM_03
        } else {
            ns::ATOM_10
        }
    }

    fn is_03(&self) -> bool {
        self.cx.feed_type == FeedType::Atom03
    }

    fn text_of(&self, local: &str) -> Option<String> {
        self.cx.doc.child_text(self.cx.node, Some(self.ns()), local)
    }

    fn link_nodes(&self) -> Vec<NodeId> {
        self.cx
            .doc
            .find_children(self.cx.node, Some(self.ns()), "link")
            .collect()
    }

    /// hrefs of links with the given rel; a missing rel means "alternate".
    fn links_with_rel(&self, rel: &str) -> Vec<String> {
        self.link_nodes()
            .into_iter()
            .filter(|&n| self.cx.doc.attr(n, "rel").unwrap_or("alternate") == rel)
            .filter_map(|n| self.cx.doc.attr(n, "href").map(String::from))
            .collect()
    }

    fn updated(&self) -> Result<Option<DateTime<FixedOffset>>> {
        let local = if self.is_03() { "modified" } else { "updated" };
        self.date_of(local, "atom:updated")
    }

    fn published(&self) -> Result<Option<DateTime<FixedOffset>>> {
        if self.is_03() {
            // The draft had both; issued is the publication date, created
            // the fallback some producers used instead.
            match self.date_of("issued", "atom:published")? {
                Some(d) => Ok(Some(d)),
                None => self.date_of("created", "atom:published"),
            }
        } else {
            self.date_of("published", "atom:published")
        }
    }

    fn date_of(
        &self,
        local: &str,
        field: &'static str,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        match self.text_of(local) {
            Some(raw) => crate::reader::date::parse_iso8601_date(field, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Content with `type` dispatch: plain and escaped-HTML variants read as
    /// text (the markup arrives as character data), inline XHTML serializes
    /// the child elements back to a string with prefixes preserved.
    fn content(&self) -> Option<String> {
        let doc = &self.cx.doc;
        let node = doc.find_child(self.cx.node, Some(self.ns()), "content")?;
        match doc.attr(node, "type").unwrap_or("text") {
            "xhtml" | "application/xhtml+xml" => {
                let markup = doc.serialize_children(node);
                if markup.trim().is_empty() {
                    None
                } else {
                    Some(markup)
                }
            }
            _ => doc.text(node),
        }
    }

    fn people_of(&self, local: &str) -> Vec<Person> {
        let doc = &self.cx.doc;
        doc.find_children(self.cx.node, Some(self.ns()), local)
            .filter_map(|n| {
                let name = doc.child_text(n, Some(self.ns()), "name");
                let email = doc.child_text(n, Some(self.ns()), "email");
                let uri = doc.child_text(n, Some(self.ns()), "uri")
                    .or_else(|| doc.child_text(n, Some(self.ns()), "url"));
                // A person construct with no name still identifies someone
                // when an email or uri is present.
                let display = name.or_else(|| email.clone()).or_else(|| uri.clone())?;
                Some(Person {
                    name: display,
                    email,
                    uri,
                })
            })
            .collect()
    }

    fn categories(&self) -> Vec<Category> {
        let doc = &self.cx.doc;
        doc.find_children(self.cx.node, Some(self.ns()), "category")
            .filter_map(|n| {
                let term = doc.attr(n, "term")?.to_string();
                Some(Category {
                    term,
                    scheme: doc.attr(n, "scheme").map(String::from),
                    label: doc.attr(n, "label").map(String::from),
                })
            })
            .collect()
    }

    fn generator(&self) -> Option<Generator> {
        let doc = &self.cx.doc;
        let node = doc.find_child(self.cx.node, Some(self.ns()), "generator")?;
        let name = doc.text(node)?;
        Some(Generator {
            name,
            version: doc.attr(node, "version").map(String::from),
            uri: doc
                .attr(node, "uri")
                .or_else(|| doc.attr(node, "url"))
                .map(String::from),
        })
    }

    fn enclosure(&self) -> Option<Enclosure> {
        let doc = &self.cx.doc;
        let node = self
            .link_nodes()
            .into_iter()
            .find(|&n| doc.attr(n, "rel") == Some("enclosure"))?;
        let url = doc.attr(node, "href")?.to_string();
        let length = doc.attr(node, "length").and_then(|raw| {
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
            mime_type: doc.attr(node, "type").map(String::from),
        })
    }

    /// Replies link carrying HTML, the entry's comment page.
    fn comment_link(&self) -> Option<String> {
        let doc = &self.cx.doc;
        self.link_nodes().into_iter().find_map(|n| {
            let rel = doc.attr(n, "rel")?;
            if rel != "replies" {
                return None;
            }
            match doc.attr(n, "type") {
                None | Some("text/html") | Some("application/xhtml+xml") => {
                    doc.attr(n, "href").map(String::from)
                }
                _ => None,
            }
        })
    }

    /// Replies link carrying a feed, the entry's comment feed.
    fn comment_feed_link(&self) -> Option<String> {
        let doc = &self.cx.doc;
        self.link_nodes().into_iter().find_map(|n| {
            if doc.attr(n, "rel")? != "replies" {
                return None;
            }
            match doc.attr(n, "type") {
                Some("application/atom+xml") | Some("application/rss+xml") => {
                    doc.attr(n, "href").map(String::from)
                }
                _ => None,
            }
        })
    }
}

impl Extension for Atom {
    fn capability(&self) -> &'static str {
        self.capability
    }

    fn accessors(&self) -> &'static [&'static str] {
        self.accessors
    }

    fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        use ExtensionValue as V;

        let value = match accessor {
            "title" => self.text_of("title").map(V::Text),
            "subtitle" => {
                let local = if self.is_03() { "tagline" } else { "subtitle" };
                self.text_of(local).map(V::Text)
            }
            "summary" => self.text_of("summary").map(V::Text),
            "content" => self.content().map(V::Text),
            "id" => self.text_of("id").map(V::Text),
            "rights" => {
                let local = if self.is_03() { "copyright" } else { "rights" };
                self.text_of(local).map(V::Text)
            }
            "language" => self
                .cx
                .doc
                .attr(self.cx.node, "xml:lang")
                .map(|l| V::Text(l.to_string())),
            "updated" => return Ok(self.updated()?.map(V::Date)),
            "published" => return Ok(self.published()?.map(V::Date)),
            "generator" => self.generator().map(V::Generator),
            "link" => self.links_with_rel("alternate").into_iter().next().map(V::Text),
            "links" => non_empty(self.links_with_rel("alternate")).map(V::TextList),
            "feed_link" => self.links_with_rel("self").into_iter().next().map(V::Text),
            "hubs" => non_empty(self.links_with_rel("hub")).map(V::TextList),
            "authors" => non_empty(self.people_of("author")).map(V::People),
            "contributors" => non_empty(self.people_of("contributor")).map(V::People),
            "categories" => non_empty(self.categories()).map(V::Categories),
            "image" => self.text_of("logo").map(V::Text),
            "icon" => self.text_of("icon").map(V::Text),
            "enclosure" => self.enclosure().map(V::Enclosure),
            "comment_link" => self.comment_link().map(V::Text),
            "comment_feed_link" => self.comment_feed_link().map(V::Text),
            _ => None,
        };
        Ok(value)
    }
}
