//! Dialect renderers and shared XML emission helpers.
//!
//! Both renderers drive a `quick_xml::Writer` over an in-memory buffer and
//! answer missing dialect-mandated elements through [`missing`], which is
//! where [`MissingFieldPolicy`] takes effect.

pub(crate) mod atom;
pub(crate) mod rss;

use std::io::Cursor;

use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};
use crate::model::Generator;
use crate::writer::{Dialect, MissingFieldPolicy, XmlWriter};

/// Two-space indented writer over a fresh buffer.
pub(crate) fn new_writer() -> XmlWriter {
    Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
}

/// Maps a serialization failure. Writing into an in-memory buffer does not
/// fail outside of formatting bugs, but the error still propagates cleanly.
pub(crate) fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::InvalidInput(format!("XML write error: {e}"))
}

/// Emits `<name>value</name>` with text escaping.
pub(crate) fn text_element(writer: &mut XmlWriter, name: &str, value: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)?;
    Ok(())
}

/// Emits `<name k="v" ...>value</name>`.
pub(crate) fn text_element_attrs(
    writer: &mut XmlWriter,
    name: &str,
    attrs: &[(&str, &str)],
    value: &str,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    for (key, val) in attrs {
        start.push_attribute((*key, *val));
    }
    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)?;
    Ok(())
}

/// Emits a self-closing `<name k="v" .../>`.
pub(crate) fn empty_element(
    writer: &mut XmlWriter,
    name: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    let mut element = BytesStart::new(name);
    for (key, val) in attrs {
        element.push_attribute((*key, *val));
    }
    writer.write_event(Event::Empty(element)).map_err(xml_error)?;
    Ok(())
}

/// Emits `<name><![CDATA[value]]></name>` for HTML payloads.
pub(crate) fn cdata_element(writer: &mut XmlWriter, name: &str, value: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::CData(BytesCData::new(value)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)?;
    Ok(())
}

/// Handles a dialect-mandated element with no value: error under the strict
/// policy, warn and continue under [`MissingFieldPolicy::Omit`].
pub(crate) fn missing(
    dialect: Dialect,
    field: &'static str,
    policy: MissingFieldPolicy,
) -> Result<()> {
    match policy {
        MissingFieldPolicy::Error => Err(Error::MissingRequiredField { dialect, field }),
        MissingFieldPolicy::Omit => {
            tracing::warn!(%dialect, field, "Omitting required element with no value");
            Ok(())
        }
    }
}

/// The generator advertised when the feed bag does not set one.
pub(crate) fn default_generator() -> Generator {
    Generator {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        uri: None,
    }
}

/// Drains the writer into the final document string.
pub(crate) fn finish(writer: XmlWriter) -> Result<String> {
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| Error::InvalidInput(format!("generated XML is not valid UTF-8: {e}")))
}
