//! Value types shared by the reader and the writer.
//!
//! Every dialect normalizes into these shapes: the resolver produces them
//! from whichever XML location won the candidate chain, and the writer bags
//! accept them directly. They are plain data; validation belongs to the
//! writer setters and rendering belongs to the renderers.

use serde::Serialize;

/// A feed or entry author/contributor.
///
/// RSS carries authors as a single `email (Name)` string; Atom splits them
/// into `name`/`email`/`uri` children. Both normalize here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
    pub email: Option<String>,
    pub uri: Option<String>,
}

impl Person {
    /// A person with only a display name.
    pub fn named(name: impl Into<String>) -> Person {
        Person {
            name: name.into(),
            email: None,
            uri: None,
        }
    }
}

/// A category/tag attached to a feed or entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// The machine-readable term. Atom `@term`, RSS element text, Dublin
    /// Core `subject` text.
    pub term: String,
    /// Categorization scheme URI. Atom `@scheme`, RSS `@domain`.
    pub scheme: Option<String>,
    /// Explicit human-readable label, when the document carried one.
    pub label: Option<String>,
}

impl Category {
    pub fn new(term: impl Into<String>) -> Category {
        Category {
            term: term.into(),
            scheme: None,
            label: None,
        }
    }

    /// The human-readable label; falls back to the term when the document
    /// did not carry an explicit one.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.term)
    }
}

/// A media enclosure. Either fully present or absent: resolution never
/// yields an enclosure without a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enclosure {
    pub url: String,
    /// Size in bytes. Documents with a non-numeric length lose only this
    /// field; the enclosure itself still resolves.
    pub length: Option<u64>,
    pub mime_type: Option<String>,
}

/// Channel image (RSS) or feed logo (Atom).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Image {
    pub url: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub description: Option<String>,
}

/// The software that produced a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generator {
    pub name: String,
    pub version: Option<String>,
    pub uri: Option<String>,
}

impl Generator {
    pub fn named(name: impl Into<String>) -> Generator {
        Generator {
            name: name.into(),
            version: None,
            uri: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_label_defaults_to_term() {
        let plain = Category::new("rust");
        assert_eq!(plain.display_label(), "rust");

        let labelled = Category {
            term: "rust".into(),
            scheme: None,
            label: Some("Rust Programming".into()),
        };
        assert_eq!(labelled.display_label(), "Rust Programming");
    }

    #[test]
    fn model_types_serialize() {
        let person = Person {
            name: "Alice".into(),
            email: Some("alice@example.com".into()),
            uri: None,
        };
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["email"], "alice@example.com");
        assert!(json["uri"].is_null());
    }
}
