//! Google Play Podcasts vocabulary.

use crate::error::Result;
use crate::extension::{capability, Extension, ExtensionContext, ExtensionValue};
use crate::xml::ns;

const FEED_ACCESSORS: &[&str] = &["author", "description", "explicit", "image"];
const ENTRY_ACCESSORS: &[&str] = &["description", "explicit", "block"];

pub(crate) fn feed_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(GooglePlay {
        cx,
        capability: capability::GOOGLEPLAY_FEED,
        accessors: FEED_ACCESSORS,
    })
}

pub(crate) fn entry_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(GooglePlay {
        cx,
        capability: capability::GOOGLEPLAY_ENTRY,
        accessors: ENTRY_ACCESSORS,
    })
}

struct GooglePlay {
    cx: ExtensionContext,
    capability: &'static str,
    accessors: &'static [&'static str],
}

impl GooglePlay {
    fn text_of(&self, local: &str) -> Option<String> {
        self.cx
            .doc
            .child_text(self.cx.node, Some(ns::GOOGLEPLAY), local)
    }
}

impl Extension for GooglePlay {
    fn capability(&self) -> &'static str {
        self.capability
    }

    fn accessors(&self) -> &'static [&'static str] {
        self.accessors
    }

    fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        use ExtensionValue as V;

        let value = match accessor {
            "author" => self.text_of("author").map(V::Text),
            "description" => self.text_of("description").map(V::Text),
            "explicit" => self.text_of("explicit").map(V::Text),
            "block" => self
                .text_of("block")
                .map(|v| V::Flag(v.eq_ignore_ascii_case("yes"))),
            "image" => {
                let doc = &self.cx.doc;
                doc.find_child(self.cx.node, Some(ns::GOOGLEPLAY), "image")
                    .and_then(|n| doc.attr(n, "href").map(String::from))
                    .map(V::Text)
            }
            _ => None,
        };
        Ok(value)
    }
}
