//! Podcasting 2.0 (`podcast:`) vocabulary from the Podcast Index project.

use crate::error::Result;
use crate::extension::{capability, Extension, ExtensionContext, ExtensionValue};
use crate::xml::ns;

const FEED_ACCESSORS: &[&str] = &["locked", "funding", "guid"];
const ENTRY_ACCESSORS: &[&str] = &["transcript", "chapters"];

pub(crate) fn feed_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(PodcastIndex {
        cx,
        capability: capability::PODCAST_INDEX_FEED,
        accessors: FEED_ACCESSORS,
    })
}

pub(crate) fn entry_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(PodcastIndex {
        cx,
        capability: capability::PODCAST_INDEX_ENTRY,
        accessors: ENTRY_ACCESSORS,
    })
}

struct PodcastIndex {
    cx: ExtensionContext,
    capability: &'static str,
    accessors: &'static [&'static str],
}

impl PodcastIndex {
    fn url_of(&self, local: &str) -> Option<String> {
        let doc = &self.cx.doc;
        let node = doc.find_child(self.cx.node, Some(ns::PODCAST_INDEX), local)?;
        doc.attr(node, "url").map(String::from)
    }
}

impl Extension for PodcastIndex {
    fn capability(&self) -> &'static str {
        self.capability
    }

    fn accessors(&self) -> &'static [&'static str] {
        self.accessors
    }

    fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        use ExtensionValue as V;
        let doc = &self.cx.doc;

        let value = match accessor {
            "locked" => doc
                .child_text(self.cx.node, Some(ns::PODCAST_INDEX), "locked")
                .map(|v| V::Flag(v.eq_ignore_ascii_case("yes"))),
            "funding" => self.url_of("funding").map(V::Text),
            "guid" => doc
                .child_text(self.cx.node, Some(ns::PODCAST_INDEX), "guid")
                .map(V::Text),
            "transcript" => self.url_of("transcript").map(V::Text),
            "chapters" => self.url_of("chapters").map(V::Text),
            _ => None,
        };
        Ok(value)
    }
}
