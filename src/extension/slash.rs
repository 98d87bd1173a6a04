//! Slash module (Slashcode metadata: comment counts, sections).

use crate::error::Result;
use crate::extension::{capability, non_empty, Extension, ExtensionContext, ExtensionValue};
use crate::xml::ns;

const ACCESSORS: &[&str] = &["comment_count", "section", "department", "hit_parade"];

pub(crate) fn entry_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(Slash { cx })
}

struct Slash {
    cx: ExtensionContext,
}

impl Slash {
    fn text_of(&self, local: &str) -> Option<String> {
        self.cx.doc.child_text(self.cx.node, Some(ns::SLASH), local)
    }
}

impl Extension for Slash {
    fn capability(&self) -> &'static str {
        capability::SLASH_ENTRY
    }

    fn accessors(&self) -> &'static [&'static str] {
        ACCESSORS
    }

    fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        let value = match accessor {
            "comment_count" => self.text_of("comments").and_then(|raw| {
                match raw.trim().parse::<i64>() {
                    Ok(n) => Some(ExtensionValue::Integer(n)),
                    Err(_) => {
                        tracing::debug!(value = %raw, "Ignoring non-numeric slash:comments");
                        None
                    }
                }
            }),
            "section" => self.text_of("section").map(ExtensionValue::Text),
            "department" => self.text_of("department").map(ExtensionValue::Text),
            "hit_parade" => self.text_of("hit_parade").and_then(|raw| {
                non_empty(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                )
                .map(ExtensionValue::TextList)
            }),
            _ => None,
        };
        Ok(value)
    }
}
