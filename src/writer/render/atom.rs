//! Atom 1.0 renderer, including RFC 6721 tombstones.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::Result;
use crate::model::{Category, Person};
use crate::writer::feed::Item;
use crate::writer::render::{
    default_generator, empty_element, finish, missing, new_writer, text_element,
    text_element_attrs, xml_error,
};
use crate::writer::{Deleted, Dialect, Entry, Feed, MissingFieldPolicy, WriterExtension, XmlWriter};
use crate::xml::ns;

/// Serializes `feed` as an Atom 1.0 document.
pub(crate) fn render(
    feed: &Feed,
    policy: MissingFieldPolicy,
    extensions: &[Box<dyn WriterExtension>],
) -> Result<String> {
    let mut writer = new_writer();
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some(feed.encoding()), None)))
        .map_err(xml_error)?;

    let mut root = BytesStart::new("feed");
    root.push_attribute(("xmlns", ns::ATOM_10));
    if feed.entries().any(|(_, e)| e.comment_count().is_some()) {
        root.push_attribute(("xmlns:thr", ns::THREAD));
    }
    if feed.tombstones().next().is_some() {
        root.push_attribute(("xmlns:at", ns::ATOM_TOMBSTONES));
    }
    for extension in extensions {
        for (prefix, uri) in extension.namespaces(feed) {
            root.push_attribute((prefix, uri));
        }
    }
    if let Some(language) = feed.language() {
        root.push_attribute(("xml:lang", language));
    }
    writer.write_event(Event::Start(root)).map_err(xml_error)?;

    match feed.title() {
        Some(title) => text_element_attrs(&mut writer, "title", &[("type", "text")], title)?,
        None => missing(Dialect::Atom, "title", policy)?,
    }
    if let Some(description) = feed.description() {
        text_element_attrs(&mut writer, "subtitle", &[("type", "text")], description)?;
    }
    match feed.date_modified() {
        Some(date) => text_element(&mut writer, "updated", &atom_date(date))?,
        None => missing(Dialect::Atom, "updated", policy)?,
    }
    // Atom requires an id; the feed link doubles as one when none is set.
    match feed.id().or(feed.link()) {
        Some(id) => text_element(&mut writer, "id", id)?,
        None => missing(Dialect::Atom, "id", policy)?,
    }
    if let Some(link) = feed.link() {
        empty_element(
            &mut writer,
            "link",
            &[("rel", "alternate"), ("type", "text/html"), ("href", link)],
        )?;
    }
    if let Some(feed_link) = feed.feed_link() {
        empty_element(
            &mut writer,
            "link",
            &[
                ("rel", "self"),
                ("type", "application/atom+xml"),
                ("href", feed_link),
            ],
        )?;
    }
    for hub in feed.hubs() {
        empty_element(&mut writer, "link", &[("rel", "hub"), ("href", hub)])?;
    }
    if let Some(copyright) = feed.copyright() {
        text_element(&mut writer, "rights", copyright)?;
    }
    let generator = feed.generator().cloned().unwrap_or_else(default_generator);
    {
        let mut attrs: Vec<(&str, &str)> = Vec::new();
        if let Some(version) = &generator.version {
            attrs.push(("version", version));
        }
        if let Some(uri) = &generator.uri {
            attrs.push(("uri", uri));
        }
        text_element_attrs(&mut writer, "generator", &attrs, &generator.name)?;
    }
    if let Some(image) = feed.image() {
        text_element(&mut writer, "logo", &image.url)?;
    }
    for author in feed.authors() {
        render_person(&mut writer, "author", author)?;
    }
    for category in feed.categories() {
        render_category(&mut writer, category)?;
    }
    for extension in extensions {
        extension.render_feed(&mut writer, feed)?;
    }

    for item in feed.items() {
        match item {
            Item::Entry(entry) => render_entry(&mut writer, entry, policy, extensions)?,
            Item::Tombstone(deleted) => render_tombstone(&mut writer, deleted, policy)?,
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("feed")))
        .map_err(xml_error)?;
    finish(writer)
}

fn render_entry(
    writer: &mut XmlWriter,
    entry: &Entry,
    policy: MissingFieldPolicy,
    extensions: &[Box<dyn WriterExtension>],
) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("entry")))
        .map_err(xml_error)?;

    match entry.title() {
        Some(title) => text_element_attrs(writer, "title", &[("type", "text")], title)?,
        None => missing(Dialect::Atom, "title", policy)?,
    }
    match entry.date_modified() {
        Some(date) => text_element(writer, "updated", &atom_date(date))?,
        None => missing(Dialect::Atom, "updated", policy)?,
    }
    if let Some(date) = entry.date_created() {
        text_element(writer, "published", &atom_date(date))?;
    }
    match entry.id().or(entry.link()) {
        Some(id) => text_element(writer, "id", id)?,
        None => missing(Dialect::Atom, "id", policy)?,
    }
    if let Some(link) = entry.link() {
        empty_element(
            writer,
            "link",
            &[("rel", "alternate"), ("type", "text/html"), ("href", link)],
        )?;
    }
    if let Some(description) = entry.description() {
        text_element_attrs(writer, "summary", &[("type", "text")], description)?;
    }
    if let Some(content) = entry.content() {
        text_element_attrs(writer, "content", &[("type", "html")], content)?;
    }
    if let Some(copyright) = entry.copyright() {
        text_element(writer, "rights", copyright)?;
    }
    for author in entry.authors() {
        render_person(writer, "author", author)?;
    }
    for category in entry.categories() {
        render_category(writer, category)?;
    }
    if let Some(enclosure) = entry.enclosure() {
        let mut attrs: Vec<(&str, String)> = vec![
            ("rel", "enclosure".to_string()),
            ("href", enclosure.url.clone()),
        ];
        if let Some(mime_type) = &enclosure.mime_type {
            attrs.push(("type", mime_type.clone()));
        }
        if let Some(length) = enclosure.length {
            attrs.push(("length", length.to_string()));
        }
        let borrowed: Vec<(&str, &str)> =
            attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        empty_element(writer, "link", &borrowed)?;
    }
    if let Some(comment_link) = entry.comment_link() {
        empty_element(
            writer,
            "link",
            &[
                ("rel", "replies"),
                ("type", "text/html"),
                ("href", comment_link),
            ],
        )?;
    }
    if let Some(comment_feed_link) = entry.comment_feed_link() {
        empty_element(
            writer,
            "link",
            &[
                ("rel", "replies"),
                ("type", "application/atom+xml"),
                ("href", comment_feed_link),
            ],
        )?;
    }
    if let Some(count) = entry.comment_count() {
        text_element(writer, "thr:total", &count.to_string())?;
    }
    for extension in extensions {
        extension.render_entry(writer, entry)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("entry")))
        .map_err(xml_error)?;
    Ok(())
}

/// RFC 6721 `at:deleted-entry`. Both `ref` and `when` are mandatory; under
/// the lenient policy an incomplete tombstone is dropped whole.
fn render_tombstone(
    writer: &mut XmlWriter,
    deleted: &Deleted,
    policy: MissingFieldPolicy,
) -> Result<()> {
    let Some(reference) = deleted.reference() else {
        missing(Dialect::Atom, "deleted-entry ref", policy)?;
        return Ok(());
    };
    let Some(when) = deleted.when() else {
        missing(Dialect::Atom, "deleted-entry when", policy)?;
        return Ok(());
    };

    let mut element = BytesStart::new("at:deleted-entry");
    element.push_attribute(("ref", reference));
    element.push_attribute(("when", atom_date(when).as_str()));

    match (deleted.by(), deleted.comment()) {
        (None, None) => {
            writer.write_event(Event::Empty(element)).map_err(xml_error)?;
        }
        (by, comment) => {
            writer.write_event(Event::Start(element)).map_err(xml_error)?;
            if let Some(person) = by {
                render_person(writer, "at:by", person)?;
            }
            if let Some(text) = comment {
                text_element_attrs(writer, "at:comment", &[("type", "text")], text)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("at:deleted-entry")))
                .map_err(xml_error)?;
        }
    }
    Ok(())
}

/// Atom person construct: `name` required, `email`/`uri` optional.
fn render_person(writer: &mut XmlWriter, element: &str, person: &Person) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(element)))
        .map_err(xml_error)?;
    text_element(writer, "name", &person.name)?;
    if let Some(email) = &person.email {
        text_element(writer, "email", email)?;
    }
    if let Some(uri) = &person.uri {
        text_element(writer, "uri", uri)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element)))
        .map_err(xml_error)?;
    Ok(())
}

fn render_category(writer: &mut XmlWriter, category: &Category) -> Result<()> {
    let mut attrs: Vec<(&str, &str)> = vec![("term", category.term.as_str())];
    if let Some(scheme) = category.scheme.as_deref() {
        attrs.push(("scheme", scheme));
    }
    if let Some(label) = category.label.as_deref() {
        attrs.push(("label", label));
    }
    empty_element(writer, "category", &attrs)
}

/// RFC 3339 with an explicit numeric offset, never `Z`.
fn atom_date(date: DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}
