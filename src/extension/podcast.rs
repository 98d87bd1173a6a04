//! Apple Podcasts (`itunes:`) vocabulary.

use crate::error::Result;
use crate::extension::{capability, Extension, ExtensionContext, ExtensionValue};
use crate::xml::ns;

const FEED_ACCESSORS: &[&str] = &[
    "author",
    "block",
    "explicit",
    "image",
    "summary",
    "keywords",
    "podcast_type",
];

const ENTRY_ACCESSORS: &[&str] = &[
    "author",
    "block",
    "duration",
    "explicit",
    "episode",
    "season",
    "episode_type",
    "image",
    "summary",
];

pub(crate) fn feed_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(Podcast {
        cx,
        capability: capability::PODCAST_FEED,
        accessors: FEED_ACCESSORS,
    })
}

pub(crate) fn entry_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(Podcast {
        cx,
        capability: capability::PODCAST_ENTRY,
        accessors: ENTRY_ACCESSORS,
    })
}

struct Podcast {
    cx: ExtensionContext,
    capability: &'static str,
    accessors: &'static [&'static str],
}

impl Podcast {
    fn text_of(&self, local: &str) -> Option<String> {
        self.cx.doc.child_text(self.cx.node, Some(ns::ITUNES), local)
    }

    fn integer_of(&self, local: &str) -> Option<i64> {
        let raw = self.text_of(local)?;
        match raw.trim().parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                tracing::debug!(element = local, value = %raw, "Ignoring non-numeric itunes value");
                None
            }
        }
    }

    /// `itunes:image` carries the URL in `href`; very old feeds put it in
    /// the element text instead.
    fn image(&self) -> Option<String> {
        let doc = &self.cx.doc;
        let node = doc.find_child(self.cx.node, Some(ns::ITUNES), "image")?;
        doc.attr(node, "href")
            .map(String::from)
            .or_else(|| doc.text(node))
    }
}

impl Extension for Podcast {
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
            "block" => self
                .text_of("block")
                .map(|v| V::Flag(v.eq_ignore_ascii_case("yes"))),
            // Tri-state in the wild ("yes", "no", "clean", "true"), so the
            // raw keyword is preserved rather than collapsed to a bool.
            "explicit" => self.text_of("explicit").map(V::Text),
            "image" => self.image().map(V::Text),
            "summary" => self.text_of("summary").map(V::Text),
            "keywords" => self.text_of("keywords").map(|raw| {
                V::TextList(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|k| !k.is_empty())
                        .map(String::from)
                        .collect(),
                )
            }),
            "podcast_type" => self.text_of("type").map(V::Text),
            "duration" => self.text_of("duration").map(V::Text),
            "episode" => self.integer_of("episode").map(V::Integer),
            "season" => self.integer_of("season").map(V::Integer),
            "episode_type" => self.text_of("episodeType").map(V::Text),
            _ => None,
        };
        Ok(value)
    }
}
