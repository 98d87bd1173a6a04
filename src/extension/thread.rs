//! Atom Threading extension (RFC 4685): reply counts and in-reply-to links.

use crate::error::Result;
use crate::extension::{capability, Extension, ExtensionContext, ExtensionValue};
use crate::xml::ns;

const ACCESSORS: &[&str] = &["total", "in_reply_to"];

pub(crate) fn entry_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(Thread { cx })
}

struct Thread {
    cx: ExtensionContext,
}

impl Extension for Thread {
    fn capability(&self) -> &'static str {
        capability::THREAD_ENTRY
    }

    fn accessors(&self) -> &'static [&'static str] {
        ACCESSORS
    }

    fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        let doc = &self.cx.doc;
        let value = match accessor {
            "total" => doc
                .child_text(self.cx.node, Some(ns::THREAD), "total")
                .and_then(|raw| match raw.trim().parse::<i64>() {
                    Ok(n) => Some(ExtensionValue::Integer(n)),
                    Err(_) => {
                        tracing::debug!(value = %raw, "Ignoring non-numeric thr:total");
                        None
                    }
                }),
            "in_reply_to" => doc
                .find_child(self.cx.node, Some(ns::THREAD), "in-reply-to")
                .and_then(|node| doc.attr(node, "ref"))
                .map(|r| ExtensionValue::Text(r.to_string())),
            _ => None,
        };
        Ok(value)
    }
}
