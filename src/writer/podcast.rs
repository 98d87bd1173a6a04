//! iTunes podcast metadata: the writer-side bag and its renderer.
//!
//! The bag hangs off both [`Feed`](crate::writer::Feed) and
//! [`Entry`](crate::writer::Entry) via `podcast_mut()`; the renderer is the
//! stock `podcast/writer` extension and emits `itunes:*` elements after the
//! core fields of whichever container carries data.

use crate::error::{Error, Result};
use crate::extension::capability;
use crate::util::{text, uri};
use crate::writer::render::{text_element, xml_error};
use crate::writer::{Entry, Feed, WriterExtension, XmlWriter};
use crate::xml::ns;

use quick_xml::events::{BytesStart, Event};

/// iTunes metadata for a feed or an entry.
///
/// Feed-scoped fields (`keywords`, `podcast_type`) and entry-scoped fields
/// (`duration`, `episode`, `season`, `episode_type`) share one type; the
/// renderer picks the fields that apply to each scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Podcast {
    author: Option<String>,
    block: Option<bool>,
    explicit: Option<String>,
    image: Option<String>,
    summary: Option<String>,
    keywords: Vec<String>,
    podcast_type: Option<String>,
    duration: Option<String>,
    episode: Option<u32>,
    season: Option<u32>,
    episode_type: Option<String>,
}

impl Podcast {
    pub fn set_author(&mut self, value: &str) -> Result<&mut Podcast> {
        self.author = Some(text::require_non_empty("itunes:author", value)?);
        Ok(self)
    }

    /// Whether the feed or episode is blocked from the directory.
    pub fn set_block(&mut self, value: bool) -> &mut Podcast {
        self.block = Some(value);
        self
    }

    /// Sets the explicit rating: `yes`, `no`, or `clean`.
    pub fn set_explicit(&mut self, value: &str) -> Result<&mut Podcast> {
        match value {
            "yes" | "no" | "clean" => {
                self.explicit = Some(value.to_string());
                Ok(self)
            }
            other => Err(Error::FieldIntegrity {
                field: "itunes:explicit",
                message: format!("must be one of yes, no, clean; got {other}"),
            }),
        }
    }

    /// Sets the artwork URL. Must be absolute and end in `.jpg` or `.png`.
    pub fn set_image(&mut self, value: &str) -> Result<&mut Podcast> {
        uri::validate_absolute_uri("itunes:image", value)?;
        let lower = value.to_ascii_lowercase();
        if !lower.ends_with(".jpg") && !lower.ends_with(".png") {
            return Err(Error::FieldIntegrity {
                field: "itunes:image",
                message: format!("must be a jpg or png URL: {value}"),
            });
        }
        self.image = Some(value.to_string());
        Ok(self)
    }

    /// Sets the summary shown in podcast directories (4000 chars max).
    pub fn set_summary(&mut self, value: &str) -> Result<&mut Podcast> {
        let trimmed = text::require_non_empty("itunes:summary", value)?;
        if trimmed.chars().count() > 4000 {
            return Err(Error::FieldIntegrity {
                field: "itunes:summary",
                message: "must be 4000 characters or fewer".to_string(),
            });
        }
        self.summary = Some(trimmed);
        Ok(self)
    }

    /// Replaces the keyword list (feed scope; 12 terms max, none blank).
    pub fn set_keywords<I, S>(&mut self, keywords: I) -> Result<&mut Podcast>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut collected = Vec::new();
        for keyword in keywords {
            collected.push(text::require_non_empty("itunes:keywords", keyword.as_ref())?);
        }
        if collected.len() > 12 {
            return Err(Error::FieldIntegrity {
                field: "itunes:keywords",
                message: "must contain 12 terms or fewer".to_string(),
            });
        }
        self.keywords = collected;
        Ok(self)
    }

    /// Sets the show format: `episodic` or `serial` (feed scope).
    pub fn set_podcast_type(&mut self, value: &str) -> Result<&mut Podcast> {
        match value {
            "episodic" | "serial" => {
                self.podcast_type = Some(value.to_string());
                Ok(self)
            }
            other => Err(Error::FieldIntegrity {
                field: "itunes:type",
                message: format!("must be episodic or serial; got {other}"),
            }),
        }
    }

    /// Sets the episode duration: seconds, `MM:SS`, or `HH:MM:SS`.
    pub fn set_duration(&mut self, value: &str) -> Result<&mut Podcast> {
        if !is_valid_duration(value) {
            return Err(Error::FieldIntegrity {
                field: "itunes:duration",
                message: format!("must be seconds, MM:SS, or HH:MM:SS; got {value}"),
            });
        }
        self.duration = Some(value.to_string());
        Ok(self)
    }

    pub fn set_episode(&mut self, value: u32) -> &mut Podcast {
        self.episode = Some(value);
        self
    }

    pub fn set_season(&mut self, value: u32) -> &mut Podcast {
        self.season = Some(value);
        self
    }

    /// Sets the episode kind: `full`, `trailer`, or `bonus` (entry scope).
    pub fn set_episode_type(&mut self, value: &str) -> Result<&mut Podcast> {
        match value {
            "full" | "trailer" | "bonus" => {
                self.episode_type = Some(value.to_string());
                Ok(self)
            }
            other => Err(Error::FieldIntegrity {
                field: "itunes:episodeType",
                message: format!("must be full, trailer, or bonus; got {other}"),
            }),
        }
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn block(&self) -> Option<bool> {
        self.block
    }

    pub fn explicit(&self) -> Option<&str> {
        self.explicit.as_deref()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn podcast_type(&self) -> Option<&str> {
        self.podcast_type.as_deref()
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    pub fn episode(&self) -> Option<u32> {
        self.episode
    }

    pub fn season(&self) -> Option<u32> {
        self.season
    }

    pub fn episode_type(&self) -> Option<&str> {
        self.episode_type.as_deref()
    }

    /// True when no field is set, which suppresses the `itunes` namespace
    /// declaration in output.
    pub fn is_empty(&self) -> bool {
        *self == Podcast::default()
    }
}

/// Digits, `M:SS`, or `H:MM:SS` with sub-hour parts below 60.
fn is_valid_duration(value: &str) -> bool {
    let mut parts = value.split(':');
    let Some(first) = parts.next() else {
        return false;
    };
    if first.is_empty() || !first.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let rest: Vec<&str> = parts.collect();
    rest.len() <= 2
        && rest.iter().all(|p| {
            p.len() == 2 && p.bytes().all(|b| b.is_ascii_digit()) && p.as_bytes()[0] <= b'5'
        })
}

/// Constructor registered as the stock `podcast/writer` capability.
pub(crate) fn writer_extension() -> Box<dyn WriterExtension> {
    Box::new(ItunesWriter)
}

struct ItunesWriter;

impl ItunesWriter {
    fn render_bag(&self, writer: &mut XmlWriter, bag: &Podcast, feed_scope: bool) -> Result<()> {
        if let Some(author) = bag.author() {
            text_element(writer, "itunes:author", author)?;
        }
        if let Some(block) = bag.block() {
            text_element(writer, "itunes:block", if block { "yes" } else { "no" })?;
        }
        if let Some(explicit) = bag.explicit() {
            text_element(writer, "itunes:explicit", explicit)?;
        }
        if let Some(image) = bag.image() {
            let mut element = BytesStart::new("itunes:image");
            element.push_attribute(("href", image));
            writer.write_event(Event::Empty(element)).map_err(xml_error)?;
        }
        if let Some(summary) = bag.summary() {
            text_element(writer, "itunes:summary", summary)?;
        }
        if feed_scope {
            if !bag.keywords().is_empty() {
                text_element(writer, "itunes:keywords", &bag.keywords().join(","))?;
            }
            if let Some(podcast_type) = bag.podcast_type() {
                text_element(writer, "itunes:type", podcast_type)?;
            }
        } else {
            if let Some(duration) = bag.duration() {
                text_element(writer, "itunes:duration", duration)?;
            }
            if let Some(episode) = bag.episode() {
                text_element(writer, "itunes:episode", &episode.to_string())?;
            }
            if let Some(season) = bag.season() {
                text_element(writer, "itunes:season", &season.to_string())?;
            }
            if let Some(episode_type) = bag.episode_type() {
                text_element(writer, "itunes:episodeType", episode_type)?;
            }
        }
        Ok(())
    }
}

impl WriterExtension for ItunesWriter {
    fn name(&self) -> &'static str {
        capability::PODCAST_WRITER
    }

    fn namespaces(&self, feed: &Feed) -> Vec<(&'static str, &'static str)> {
        let used = !feed.podcast().is_empty()
            || feed.entries().any(|(_, entry)| !entry.podcast().is_empty());
        if used {
            vec![("xmlns:itunes", ns::ITUNES)]
        } else {
            Vec::new()
        }
    }

    fn render_feed(&self, writer: &mut XmlWriter, feed: &Feed) -> Result<()> {
        self.render_bag(writer, feed.podcast(), true)
    }

    fn render_entry(&self, writer: &mut XmlWriter, entry: &Entry) -> Result<()> {
        self.render_bag(writer, entry.podcast(), false)
    }
}
