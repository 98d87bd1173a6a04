//! RSS 1.0 content module (`content:encoded`).

use crate::error::Result;
use crate::extension::{capability, Extension, ExtensionContext, ExtensionValue};
use crate::xml::ns;

const ACCESSORS: &[&str] = &["content"];

pub(crate) fn entry_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(Content { cx })
}

struct Content {
    cx: ExtensionContext,
}

impl Extension for Content {
    fn capability(&self) -> &'static str {
        capability::CONTENT_ENTRY
    }

    fn accessors(&self) -> &'static [&'static str] {
        ACCESSORS
    }

    fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        let value = match accessor {
            "content" => self
                .cx
                .doc
                .child_text(self.cx.node, Some(ns::CONTENT), "encoded")
                .map(ExtensionValue::Text),
            _ => None,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::FeedType;
    use crate::xml::Document;
    use std::rc::Rc;

    #[test]
    fn reads_cdata_encoded_content() {
        let xml = r#"<rss version="2.0"
                xmlns:content="http://purl.org/rss/1.0/modules/content/">
              <channel><item>
                <description>plain</description>
                <content:encoded><![CDATA[<p>Full <em>story</em></p>]]></content:encoded>
              </item></channel>
            </rss>"#;
        let doc = Rc::new(Document::parse(xml).unwrap());
        let channel = doc.find_child(doc.root(), None, "channel").unwrap();
        let item = doc.find_child(channel, None, "item").unwrap();
        let ext = entry_extension(ExtensionContext {
            doc,
            node: item,
            feed_type: FeedType::Rss20,
        });

        assert_eq!(
            ext.get("content").unwrap().unwrap().into_text().as_deref(),
            Some("<p>Full <em>story</em></p>")
        );
        assert_eq!(ext.get("nonesuch").unwrap(), None);
    }
}
