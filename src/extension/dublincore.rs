//! Dublin Core Metadata Element Set (1.0 and 1.1).
//!
//! The workhorse fallback vocabulary: RSS 1.0 feeds carry authorship, dates,
//! and identifiers almost exclusively through `dc:*` elements. Both
//! namespace revisions are honored, 1.1 first.

use crate::error::Result;
use crate::extension::{
    capability, non_empty, Extension, ExtensionContext, ExtensionValue,
};
use crate::model::{Category, Person};
use crate::reader::date::parse_iso8601_date;
use crate::xml::ns;

const ACCESSORS: &[&str] = &[
    "title",
    "description",
    "identifier",
    "language",
    "rights",
    "publisher",
    "date",
    "creators",
    "contributors",
    "subjects",
];

pub(crate) fn feed_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(DublinCore {
        cx,
        capability: capability::DUBLIN_CORE_FEED,
    })
}

pub(crate) fn entry_extension(cx: ExtensionContext) -> Box<dyn Extension> {
    Box::new(DublinCore {
        cx,
        capability: capability::DUBLIN_CORE_ENTRY,
    })
}

struct DublinCore {
    cx: ExtensionContext,
    capability: &'static str,
}

impl DublinCore {
    fn text_of(&self, local: &str) -> Option<String> {
        let doc = &self.cx.doc;
        doc.child_text(self.cx.node, Some(ns::DC_11), local)
            .or_else(|| doc.child_text(self.cx.node, Some(ns::DC_10), local))
    }

    fn texts_of(&self, local: &str) -> Vec<String> {
        let doc = &self.cx.doc;
        let from_11: Vec<String> = doc
            .find_children(self.cx.node, Some(ns::DC_11), local)
            .filter_map(|id| doc.text(id))
            .collect();
        if !from_11.is_empty() {
            return from_11;
        }
        doc.find_children(self.cx.node, Some(ns::DC_10), local)
            .filter_map(|id| doc.text(id))
            .collect()
    }

    fn people_of(&self, local: &str) -> Vec<Person> {
        self.texts_of(local).into_iter().map(Person::named).collect()
    }

    fn subjects(&self) -> Vec<Category> {
        self.texts_of("subject")
            .into_iter()
            .map(Category::new)
            .collect()
    }
}

impl Extension for DublinCore {
    fn capability(&self) -> &'static str {
        self.capability
    }

    fn accessors(&self) -> &'static [&'static str] {
        ACCESSORS
    }

    fn get(&self, accessor: &str) -> Result<Option<ExtensionValue>> {
        let value = match accessor {
            "title" => self.text_of("title").map(ExtensionValue::Text),
            "description" => self.text_of("description").map(ExtensionValue::Text),
            "identifier" => self.text_of("identifier").map(ExtensionValue::Text),
            "language" => self.text_of("language").map(ExtensionValue::Text),
            "rights" => self.text_of("rights").map(ExtensionValue::Text),
            "publisher" => self.text_of("publisher").map(ExtensionValue::Text),
            "date" => match self.text_of("date") {
                Some(raw) => Some(ExtensionValue::Date(parse_iso8601_date("dc:date", &raw)?)),
                None => None,
            },
            "creators" => non_empty(self.people_of("creator")).map(ExtensionValue::People),
            "contributors" => non_empty(self.people_of("contributor")).map(ExtensionValue::People),
            "subjects" => non_empty(self.subjects()).map(ExtensionValue::Categories),
            _ => None,
        };
        Ok(value)
    }
}
