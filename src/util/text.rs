//! Author-string composition and non-empty field checks.

use crate::error::{Error, Result};
use crate::model::Person;

/// Decomposes an RSS author string into a person.
///
/// RSS 2.0 specifies `email (Name)`, but plenty of feeds carry a bare name
/// or a bare address instead; a bare address doubles as the display name.
pub(crate) fn parse_author(raw: &str) -> Option<Person> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let (Some(open), Some(close)) = (raw.find('('), raw.rfind(')')) {
        if close > open {
            let email = raw[..open].trim();
            let name = raw[open + 1..close].trim();
            let email = (!email.is_empty()).then(|| email.to_string());
            if !name.is_empty() {
                return Some(Person {
                    name: name.to_string(),
                    email,
                    uri: None,
                });
            }
            return email.map(|e| Person {
                name: e.clone(),
                email: Some(e),
                uri: None,
            });
        }
    }

    if raw.contains('@') {
        Some(Person {
            name: raw.to_string(),
            email: Some(raw.to_string()),
            uri: None,
        })
    } else {
        Some(Person::named(raw.to_string()))
    }
}

/// Inverse of [`parse_author`]: `email (Name)` when both parts exist.
pub(crate) fn compose_author(person: &Person) -> String {
    match &person.email {
        Some(email) if email != &person.name => format!("{email} ({})", person.name),
        Some(email) => email.clone(),
        None => person.name.clone(),
    }
}

/// Trims a writer-side value and rejects blank input.
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::FieldIntegrity {
            field,
            message: "value must be a non-empty string".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
