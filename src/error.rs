//! Crate-wide error taxonomy.
//!
//! Every fallible operation in the crate returns [`Error`]. The variants keep
//! two distinctions callers rely on:
//!
//! - **Absent vs malformed**: a field that is simply missing resolves to
//!   `Ok(None)`; a field that is present but unparsable (a date in an
//!   unrecognised format) is a hard [`Error::FieldIntegrity`].
//! - **Document vs transport**: structural problems with the XML
//!   ([`Error::InvalidInput`], [`Error::UnsupportedDocument`]) are separate
//!   from HTTP-level failures ([`Error::Transport`], [`Error::HttpStatus`]).
//!
//! A missing *optional* extension is deliberately not an error; containers
//! log a warning and resolution continues without that fallback source.

use thiserror::Error;

use crate::writer::Dialect;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All failure modes surfaced by the reader and writer.
#[derive(Debug, Error)]
pub enum Error {
    /// Input that never reaches detection: malformed XML, an illegal
    /// DOCTYPE declaration, or empty input. Also covers serialization
    /// failures on the writer side and entry indices that do not exist.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The document parsed but matches no supported dialect, or its
    /// required structure (an `rss` root without a `channel`) is missing.
    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    /// Network-level failure before any HTTP status was received.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The remote host answered with a non-success status.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// A field value is present but unusable: a document date in an
    /// unrecognised format, or a writer setter handed a blank string, a
    /// relative link, or an invalid id.
    #[error("Invalid {field}: {message}")]
    FieldIntegrity {
        /// Logical field name ("pubDate", "dc:date", "atom:updated").
        field: &'static str,
        message: String,
    },

    /// A dialect-mandated element is absent from the writer bag at export.
    #[error("Missing required {dialect} element: {field}")]
    MissingRequiredField { dialect: Dialect, field: &'static str },

    /// A dynamic accessor matched no registered extension's vocabulary.
    #[error("No registered extension implements accessor '{0}'")]
    UnknownAccessor(String),

    /// File I/O error while importing from a path.
    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds the standard integrity error for a date that is present but
    /// does not parse, naming the format family the dialect expects.
    pub(crate) fn unrecognised_date(field: &'static str, expected: &str, raw: &str) -> Self {
        Error::FieldIntegrity {
            field,
            message: format!(
                "could not parse date due to unrecognised format (should follow {expected}): {raw}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_integrity_message_names_format_and_value() {
        let err = Error::unrecognised_date("pubDate", "RFC 822 or 2822", "next Tuesday");
        let msg = err.to_string();
        assert!(msg.contains("pubDate"));
        assert!(msg.contains("unrecognised format"));
        assert!(msg.contains("RFC 822 or 2822"));
        assert!(msg.contains("next Tuesday"));
    }

    #[test]
    fn missing_field_message_names_dialect() {
        let err = Error::MissingRequiredField {
            dialect: Dialect::Atom,
            field: "updated",
        };
        assert_eq!(err.to_string(), "Missing required atom element: updated");
    }
}
