//! WellFormedWeb CommentAPI (`wfw:commentRss`, `wfw:comment`).

use crate::error::Result;
use crate::extension::{capability, Extension, ExtensionContext, ExtensionValue};
use crate::xml::ns;

const ACCESSORS: &[&str] = &["comment_feed_link", "comment_link"];

pub(crate) fn entry_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(WellFormedWeb { cx })
}

struct WellFormedWeb {
    cx: ExtensionContext,
}

impl Extension for WellFormedWeb {
    fn capability(&self) -> &'static str {
        capability::WELL_FORMED_WEB_ENTRY
    }

    fn accessors(&self) -> &'static [&'static str] {
        ACCESSORS
    }

    fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        let doc = &self.cx.doc;
        let value = match accessor {
            // Historically written both capitalized and not; accept either.
            "comment_feed_link" => doc
                .child_text(self.cx.node, Some(ns::WFW), "commentRss")
                .or_else(|| doc.child_text(self.cx.node, Some(ns::WFW), "commentRSS"))
                .map(ExtensionValue::Text),
            "comment_link" => doc
                .child_text(self.cx.node, Some(ns::WFW), "comment")
                .map(ExtensionValue::Text),
            _ => None,
        };
        Ok(value)
    }
}
