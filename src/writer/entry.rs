//! Entry and tombstone property bags.

use chrono::{DateTime, FixedOffset};

use crate::error::Result;
use crate::model::{Category, Enclosure, Person};
use crate::util::{text, uri};
use crate::writer::podcast::Podcast;
use crate::writer::{checked_category, checked_person};

/// A single entry under construction.
///
/// Fallible setters validate their input and return `&mut Entry` so calls
/// chain with `?`:
///
/// ```
/// # use kiosk::writer::Entry;
/// # fn build() -> kiosk::Result<Entry> {
/// let mut entry = Entry::new();
/// entry
///     .set_title("Release notes")?
///     .set_link("https://example.com/notes/1")?;
/// # Ok(entry)
/// # }
/// ```
///
/// Which fields are *required* depends on the output dialect and is checked
/// at export time, not here; see [`MissingFieldPolicy`](crate::writer::MissingFieldPolicy).
#[derive(Debug, Clone, Default)]
pub struct Entry {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    link: Option<String>,
    id: Option<String>,
    copyright: Option<String>,
    authors: Vec<Person>,
    categories: Vec<Category>,
    enclosure: Option<Enclosure>,
    comment_link: Option<String>,
    comment_feed_link: Option<String>,
    comment_count: Option<u64>,
    date_created: Option<DateTime<FixedOffset>>,
    date_modified: Option<DateTime<FixedOffset>>,
    podcast: Podcast,
}

impl Entry {
    pub fn new() -> Entry {
        Entry::default()
    }

    /// Sets the entry title. Rejects blank input.
    pub fn set_title(&mut self, value: &str) -> Result<&mut Entry> {
        self.title = Some(text::require_non_empty("title", value)?);
        Ok(self)
    }

    /// Sets the short description (RSS `description`, Atom `summary`).
    pub fn set_description(&mut self, value: &str) -> Result<&mut Entry> {
        self.description = Some(text::require_non_empty("description", value)?);
        Ok(self)
    }

    /// Sets the full content body (RSS `content:encoded`, Atom `content`).
    /// The value is treated as HTML and emitted inside CDATA for RSS.
    pub fn set_content(&mut self, value: &str) -> Result<&mut Entry> {
        self.content = Some(text::require_non_empty("content", value)?);
        Ok(self)
    }

    /// Sets the permalink. Must be an absolute URI.
    pub fn set_link(&mut self, value: &str) -> Result<&mut Entry> {
        uri::validate_absolute_uri("link", value)?;
        self.link = Some(value.trim().to_string());
        Ok(self)
    }

    /// Sets the entry id: an absolute URI or an RFC 4151 `tag:` URI.
    pub fn set_id(&mut self, value: &str) -> Result<&mut Entry> {
        uri::validate_feed_id("id", value.trim())?;
        self.id = Some(value.trim().to_string());
        Ok(self)
    }

    /// Sets the rights statement (Atom `rights`; RSS has no item-level
    /// equivalent, so it only surfaces in Atom output).
    pub fn set_copyright(&mut self, value: &str) -> Result<&mut Entry> {
        self.copyright = Some(text::require_non_empty("copyright", value)?);
        Ok(self)
    }

    /// Appends an author. The display name is required; a `uri` must be
    /// absolute when given.
    pub fn add_author(&mut self, author: Person) -> Result<&mut Entry> {
        self.authors.push(checked_person("author", author)?);
        Ok(self)
    }

    /// Appends a category. The term is required; a `scheme` must be an
    /// absolute URI when given.
    pub fn add_category(&mut self, category: Category) -> Result<&mut Entry> {
        self.categories.push(checked_category(category)?);
        Ok(self)
    }

    /// Attaches a media enclosure. The URL must be absolute; `length` and
    /// `mime_type` stay optional here but RSS output requires both at
    /// export time.
    pub fn set_enclosure(&mut self, enclosure: Enclosure) -> Result<&mut Entry> {
        uri::validate_absolute_uri("enclosure url", &enclosure.url)?;
        self.enclosure = Some(enclosure);
        Ok(self)
    }

    /// Sets the HTML comment page link (RSS `comments`, Atom
    /// `link rel="replies"`).
    pub fn set_comment_link(&mut self, value: &str) -> Result<&mut Entry> {
        uri::validate_absolute_uri("comment link", value)?;
        self.comment_link = Some(value.trim().to_string());
        Ok(self)
    }

    /// Sets the comment feed link (`wfw:commentRss` in RSS output, an Atom
    /// replies link in Atom output).
    pub fn set_comment_feed_link(&mut self, value: &str) -> Result<&mut Entry> {
        uri::validate_absolute_uri("comment feed link", value)?;
        self.comment_feed_link = Some(value.trim().to_string());
        Ok(self)
    }

    pub fn set_comment_count(&mut self, value: u64) -> &mut Entry {
        self.comment_count = Some(value);
        self
    }

    pub fn set_date_created(&mut self, value: DateTime<FixedOffset>) -> &mut Entry {
        self.date_created = Some(value);
        self
    }

    pub fn set_date_modified(&mut self, value: DateTime<FixedOffset>) -> &mut Entry {
        self.date_modified = Some(value);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn copyright(&self) -> Option<&str> {
        self.copyright.as_deref()
    }

    pub fn authors(&self) -> &[Person] {
        &self.authors
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn enclosure(&self) -> Option<&Enclosure> {
        self.enclosure.as_ref()
    }

    pub fn comment_link(&self) -> Option<&str> {
        self.comment_link.as_deref()
    }

    pub fn comment_feed_link(&self) -> Option<&str> {
        self.comment_feed_link.as_deref()
    }

    pub fn comment_count(&self) -> Option<u64> {
        self.comment_count
    }

    pub fn date_created(&self) -> Option<DateTime<FixedOffset>> {
        self.date_created
    }

    pub fn date_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.date_modified
    }

    /// iTunes podcast metadata for this entry.
    pub fn podcast(&self) -> &Podcast {
        &self.podcast
    }

    pub fn podcast_mut(&mut self) -> &mut Podcast {
        &mut self.podcast
    }
}

/// A tombstone marking an entry as deleted (RFC 6721 `at:deleted-entry`).
///
/// Tombstones live in the same index space as entries and only render to
/// Atom. At export time `reference` and `when` are required.
#[derive(Debug, Clone, Default)]
pub struct Deleted {
    reference: Option<String>,
    when: Option<DateTime<FixedOffset>>,
    by: Option<Person>,
    comment: Option<String>,
}

impl Deleted {
    pub fn new() -> Deleted {
        Deleted::default()
    }

    /// Sets the id of the entry this tombstone withdraws.
    pub fn set_reference(&mut self, value: &str) -> Result<&mut Deleted> {
        self.reference = Some(text::require_non_empty("reference", value)?);
        Ok(self)
    }

    /// Sets the instant the entry was deleted.
    pub fn set_when(&mut self, value: DateTime<FixedOffset>) -> &mut Deleted {
        self.when = Some(value);
        self
    }

    /// Sets who performed the deletion.
    pub fn set_by(&mut self, by: Person) -> Result<&mut Deleted> {
        self.by = Some(checked_person("by", by)?);
        Ok(self)
    }

    /// Sets a free-text reason for the deletion.
    pub fn set_comment(&mut self, value: &str) -> Result<&mut Deleted> {
        self.comment = Some(text::require_non_empty("comment", value)?);
        Ok(self)
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn when(&self) -> Option<DateTime<FixedOffset>> {
        self.when
    }

    pub fn by(&self) -> Option<&Person> {
        self.by.as_ref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn setters_chain_and_trim() {
        let mut entry = Entry::new();
        entry
            .set_title("  Hello  ")
            .unwrap()
            .set_link("https://example.com/1")
            .unwrap()
            .set_id("tag:example.com,2024:1")
            .unwrap();
        assert_eq!(entry.title(), Some("Hello"));
        assert_eq!(entry.link(), Some("https://example.com/1"));
        assert_eq!(entry.id(), Some("tag:example.com,2024:1"));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut entry = Entry::new();
        let err = entry.set_title("   ").unwrap_err();
        assert!(matches!(err, Error::FieldIntegrity { field: "title", .. }));
    }

    #[test]
    fn relative_link_is_rejected() {
        let mut entry = Entry::new();
        assert!(entry.set_link("/posts/1").is_err());
        assert_eq!(entry.link(), None);
    }

    #[test]
    fn invalid_id_is_rejected() {
        let mut entry = Entry::new();
        assert!(entry.set_id("not a uri at all").is_err());
        assert!(entry.set_id("tag:example.com,06:bad-year").is_err());
        assert!(entry.set_id("urn:uuid:6e8bc430-9c3a-11d9-9669-0800200c9a66").is_ok());
    }

    #[test]
    fn author_requires_name_and_absolute_uri() {
        let mut entry = Entry::new();
        assert!(entry.add_author(Person::named("  ")).is_err());

        let bad_uri = Person {
            name: "Jo".into(),
            email: None,
            uri: Some("not-absolute".into()),
        };
        assert!(entry.add_author(bad_uri).is_err());

        entry.add_author(Person::named("Jo")).unwrap();
        assert_eq!(entry.authors().len(), 1);
    }

    #[test]
    fn category_requires_term() {
        let mut entry = Entry::new();
        assert!(entry.add_category(Category::new("")).is_err());
        entry.add_category(Category::new("rust")).unwrap();
        assert_eq!(entry.categories()[0].term, "rust");
    }

    #[test]
    fn enclosure_requires_absolute_url() {
        let mut entry = Entry::new();
        let bad = Enclosure {
            url: "episode.mp3".into(),
            length: Some(1000),
            mime_type: Some("audio/mpeg".into()),
        };
        assert!(entry.set_enclosure(bad).is_err());

        let good = Enclosure {
            url: "https://example.com/episode.mp3".into(),
            length: None,
            mime_type: None,
        };
        entry.set_enclosure(good).unwrap();
        assert!(entry.enclosure().is_some());
    }

    #[test]
    fn tombstone_fields() {
        let mut deleted = Deleted::new();
        deleted
            .set_reference("tag:example.com,2024:gone")
            .unwrap()
            .set_when(
                DateTime::parse_from_rfc3339("2024-03-01T12:00:00+00:00").unwrap(),
            );
        deleted.set_by(Person::named("Moderator")).unwrap();
        assert_eq!(deleted.reference(), Some("tag:example.com,2024:gone"));
        assert!(deleted.when().is_some());
        assert_eq!(deleted.by().unwrap().name, "Moderator");
    }
}
