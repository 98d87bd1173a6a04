//! RSS 2.0 renderer.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::Result;
use crate::model::Generator;
use crate::util::text::compose_author;
use crate::writer::feed::Item;
use crate::writer::render::{
    cdata_element, default_generator, empty_element, finish, missing, new_writer, text_element,
    text_element_attrs, xml_error,
};
use crate::writer::{Dialect, Entry, Feed, MissingFieldPolicy, WriterExtension, XmlWriter};
use crate::xml::ns;

/// Serializes `feed` as an RSS 2.0 document.
pub(crate) fn render(
    feed: &Feed,
    policy: MissingFieldPolicy,
    extensions: &[Box<dyn WriterExtension>],
) -> Result<String> {
    let mut writer = new_writer();
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some(feed.encoding()), None)))
        .map_err(xml_error)?;

    let mut root = BytesStart::new("rss");
    root.push_attribute(("version", "2.0"));
    // Module namespaces only when something below will use them.
    if feed.entries().any(|(_, e)| e.content().is_some()) {
        root.push_attribute(("xmlns:content", ns::CONTENT));
    }
    if feed.entries().any(|(_, e)| e.comment_count().is_some()) {
        root.push_attribute(("xmlns:slash", ns::SLASH));
    }
    if feed.entries().any(|(_, e)| e.comment_feed_link().is_some()) {
        root.push_attribute(("xmlns:wfw", ns::WFW));
    }
    if feed.feed_link().is_some() || !feed.hubs().is_empty() {
        root.push_attribute(("xmlns:atom", ns::ATOM_10));
    }
    for extension in extensions {
        for (prefix, uri) in extension.namespaces(feed) {
            root.push_attribute((prefix, uri));
        }
    }
    writer.write_event(Event::Start(root)).map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .map_err(xml_error)?;

    match feed.title() {
        Some(title) => text_element(&mut writer, "title", title)?,
        None => missing(Dialect::Rss, "title", policy)?,
    }
    match feed.description() {
        Some(description) => text_element(&mut writer, "description", description)?,
        None => missing(Dialect::Rss, "description", policy)?,
    }
    if let Some(link) = feed.link() {
        text_element(&mut writer, "link", link)?;
    }
    if let Some(language) = feed.language() {
        text_element(&mut writer, "language", language)?;
    }
    if let Some(copyright) = feed.copyright() {
        text_element(&mut writer, "copyright", copyright)?;
    }
    for author in feed.authors() {
        text_element(&mut writer, "author", &compose_author(author))?;
    }
    if let Some(date) = feed.date_modified().or(feed.date_created()) {
        text_element(&mut writer, "pubDate", &date.to_rfc2822())?;
    }
    if let Some(date) = feed.last_build_date() {
        text_element(&mut writer, "lastBuildDate", &date.to_rfc2822())?;
    }
    let generator = feed.generator().cloned().unwrap_or_else(default_generator);
    text_element(&mut writer, "generator", &generator_text(&generator))?;
    if let Some(image) = feed.image() {
        writer
            .write_event(Event::Start(BytesStart::new("image")))
            .map_err(xml_error)?;
        text_element(&mut writer, "url", &image.url)?;
        if let Some(title) = image.title.as_deref().or(feed.title()) {
            text_element(&mut writer, "title", title)?;
        }
        if let Some(link) = image.link.as_deref().or(feed.link()) {
            text_element(&mut writer, "link", link)?;
        }
        if let Some(width) = image.width {
            text_element(&mut writer, "width", &width.to_string())?;
        }
        if let Some(height) = image.height {
            text_element(&mut writer, "height", &height.to_string())?;
        }
        if let Some(description) = &image.description {
            text_element(&mut writer, "description", description)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("image")))
            .map_err(xml_error)?;
    }
    for category in feed.categories() {
        render_category(&mut writer, category)?;
    }
    if let Some(feed_link) = feed.feed_link() {
        empty_element(
            &mut writer,
            "atom:link",
            &[
                ("rel", "self"),
                ("type", "application/rss+xml"),
                ("href", feed_link),
            ],
        )?;
    }
    for hub in feed.hubs() {
        empty_element(&mut writer, "atom:link", &[("rel", "hub"), ("href", hub)])?;
    }
    for extension in extensions {
        extension.render_feed(&mut writer, feed)?;
    }

    for item in feed.items() {
        match item {
            Item::Entry(entry) => render_entry(&mut writer, entry, policy, extensions)?,
            Item::Tombstone(deleted) => {
                tracing::warn!(
                    reference = deleted.reference().unwrap_or("<unset>"),
                    "Skipping tombstone: RSS has no deleted-entry element"
                );
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
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
        .write_event(Event::Start(BytesStart::new("item")))
        .map_err(xml_error)?;

    if entry.title().is_none() && entry.description().is_none() {
        missing(Dialect::Rss, "title or description", policy)?;
    }
    if let Some(title) = entry.title() {
        text_element(writer, "title", title)?;
    }
    if let Some(description) = entry.description() {
        text_element(writer, "description", description)?;
    }
    if let Some(content) = entry.content() {
        cdata_element(writer, "content:encoded", content)?;
    }
    if let Some(link) = entry.link() {
        text_element(writer, "link", link)?;
    }
    if let Some(id) = entry.id() {
        let permalink = entry.link() == Some(id);
        text_element_attrs(
            writer,
            "guid",
            &[("isPermaLink", if permalink { "true" } else { "false" })],
            id,
        )?;
    }
    if let Some(date) = entry.date_modified().or(entry.date_created()) {
        text_element(writer, "pubDate", &date.to_rfc2822())?;
    }
    for author in entry.authors() {
        text_element(writer, "author", &compose_author(author))?;
    }
    for category in entry.categories() {
        render_category(writer, category)?;
    }
    if let Some(enclosure) = entry.enclosure() {
        match (enclosure.length, enclosure.mime_type.as_deref()) {
            (Some(length), Some(mime_type)) => {
                empty_element(
                    writer,
                    "enclosure",
                    &[
                        ("url", enclosure.url.as_str()),
                        ("length", length.to_string().as_str()),
                        ("type", mime_type),
                    ],
                )?;
            }
            (None, _) => missing(Dialect::Rss, "enclosure length", policy)?,
            (_, None) => missing(Dialect::Rss, "enclosure type", policy)?,
        }
    }
    if let Some(comment_link) = entry.comment_link() {
        text_element(writer, "comments", comment_link)?;
    }
    if let Some(count) = entry.comment_count() {
        text_element(writer, "slash:comments", &count.to_string())?;
    }
    if let Some(comment_feed_link) = entry.comment_feed_link() {
        text_element(writer, "wfw:commentRss", comment_feed_link)?;
    }
    for extension in extensions {
        extension.render_entry(writer, entry)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("item")))
        .map_err(xml_error)?;
    Ok(())
}

fn render_category(writer: &mut XmlWriter, category: &crate::model::Category) -> Result<()> {
    match category.scheme.as_deref() {
        Some(scheme) => text_element_attrs(writer, "category", &[("domain", scheme)], &category.term),
        None => text_element(writer, "category", &category.term),
    }
}

/// RSS `generator` is one text element: `name[ version][ (uri)]`.
fn generator_text(generator: &Generator) -> String {
    let mut out = generator.name.clone();
    if let Some(version) = &generator.version {
        out.push(' ');
        out.push_str(version);
    }
    if let Some(uri) = &generator.uri {
        out.push_str(" (");
        out.push_str(uri);
        out.push(')');
    }
    out
}
