//! Integration tests for feed writing: set-time validation, the two
//! render dialects, missing-field policies, ordering, tombstones, and
//! reimport round-trips through the reader.

use chrono::{DateTime, FixedOffset};
use kiosk::writer::{Dialect, MissingFieldPolicy};
use kiosk::{reader, writer, Category, Enclosure, Error, Generator, Image, Person, Reader};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn instant(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

fn reimport(xml: &str) -> reader::Feed {
    Reader::new().import_from_string(xml).unwrap()
}

/// A feed that satisfies both dialects' required fields.
fn base_feed() -> writer::Feed {
    let mut feed = writer::Feed::new();
    feed.set_title("Release Radar").unwrap();
    feed.set_description("What shipped this week").unwrap();
    feed.set_link("https://releases.example.com/").unwrap();
    feed.set_date_modified(instant("2024-03-02T12:00:00+00:00"));
    feed
}

// ============================================================================
// Set-Time Validation Tests
// ============================================================================

#[test]
fn test_blank_and_relative_values_are_rejected_when_set() {
    let mut feed = writer::Feed::new();

    let err = feed.set_title("   ").unwrap_err();
    assert!(matches!(err, Error::FieldIntegrity { field: "title", .. }));

    let err = feed.set_link("notes/7").unwrap_err();
    assert!(matches!(err, Error::FieldIntegrity { field: "link", .. }));

    let err = feed.add_author(Person::named("")).unwrap_err();
    assert!(matches!(err, Error::FieldIntegrity { field: "author", .. }));

    let err = feed
        .add_category(Category {
            term: String::new(),
            scheme: None,
            label: None,
        })
        .unwrap_err();
    assert!(matches!(err, Error::FieldIntegrity { field: "category term", .. }));

    // Nothing was stored by the failed calls.
    assert_eq!(feed.title(), None);
    assert_eq!(feed.link(), None);
}

#[test]
fn test_rejected_image_and_generator_leave_the_bag_unchanged() {
    let mut feed = base_feed();

    let err = feed
        .set_image(Image {
            url: "https://releases.example.com/logo.png".to_string(),
            width: Some(145),
            ..Image::default()
        })
        .unwrap_err();
    assert!(matches!(err, Error::FieldIntegrity { field: "image", .. }));
    assert!(feed.image().is_none());

    let err = feed
        .set_generator(Generator {
            name: "Gen".to_string(),
            version: None,
            uri: Some("not a uri".to_string()),
        })
        .unwrap_err();
    assert!(matches!(err, Error::FieldIntegrity { .. }));
    assert!(feed.generator().is_none());
}

// ============================================================================
// Missing-Field Policy Tests
// ============================================================================

#[test]
fn test_title_only_feed_fails_strict_atom_and_renders_under_omit() {
    let mut feed = writer::Feed::new();
    feed.set_title("Headlines").unwrap();

    let err = feed.export(Dialect::Atom, MissingFieldPolicy::Error).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingRequiredField {
            dialect: Dialect::Atom,
            field: "updated",
        }
    ));
    assert_eq!(err.to_string(), "Missing required atom element: updated");

    let xml = feed.export(Dialect::Atom, MissingFieldPolicy::Omit).unwrap();
    assert!(xml.contains("<title type=\"text\">Headlines</title>"));
    assert!(!xml.contains("<updated>"));

    // The lenient output is still a well-formed Atom document.
    let reread = reimport(&xml);
    assert_eq!(reread.title(), Some("Headlines"));
    assert_eq!(reread.date_modified().unwrap(), None);
}

#[test]
fn test_rss_requires_a_description_under_the_strict_policy() {
    let mut feed = writer::Feed::new();
    feed.set_title("Headlines").unwrap();

    let err = feed.export(Dialect::Rss, MissingFieldPolicy::Error).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingRequiredField {
            dialect: Dialect::Rss,
            field: "description",
        }
    ));

    let xml = feed.export(Dialect::Rss, MissingFieldPolicy::Omit).unwrap();
    assert!(xml.contains("<title>Headlines</title>"));
    assert!(!xml.contains("<description>"));
}

// ============================================================================
// RSS Round-Trip Tests
// ============================================================================

#[test]
fn test_rss_export_reimports_with_the_same_values() {
    let mut feed = base_feed();
    feed.set_feed_link("https://releases.example.com/feed.xml").unwrap();
    feed.add_hub("https://hub.example.com/").unwrap();
    feed.set_language("en-US").unwrap();
    feed.set_copyright("Copyright 2024 Example").unwrap();
    feed.set_generator(Generator {
        name: "ReleaseBot".to_string(),
        version: Some("1.2".to_string()),
        uri: None,
    })
    .unwrap();
    feed.set_image(Image {
        url: "https://releases.example.com/logo.png".to_string(),
        title: Some("Release Radar".to_string()),
        link: Some("https://releases.example.com/".to_string()),
        width: Some(88),
        height: Some(31),
        ..Image::default()
    })
    .unwrap();
    feed.add_category(Category {
        term: "releases".to_string(),
        scheme: Some("https://releases.example.com/tags".to_string()),
        label: None,
    })
    .unwrap();

    let mut entry = writer::Entry::new();
    entry.set_title("v2.4 is out").unwrap();
    entry.set_description("Bug fixes and a new importer").unwrap();
    entry.set_content("<p>Highlights include <em>faster</em> imports.</p>").unwrap();
    entry.set_link("https://releases.example.com/v2.4").unwrap();
    entry.set_id("https://releases.example.com/v2.4").unwrap();
    entry
        .add_author(Person {
            name: "Dana".to_string(),
            email: Some("dana@example.com".to_string()),
            uri: None,
        })
        .unwrap();
    entry
        .add_category(Category {
            term: "release".to_string(),
            scheme: None,
            label: None,
        })
        .unwrap();
    entry
        .set_enclosure(Enclosure {
            url: "https://releases.example.com/v2.4.mp3".to_string(),
            length: Some(4096),
            mime_type: Some("audio/mpeg".to_string()),
        })
        .unwrap();
    entry.set_comment_link("https://releases.example.com/v2.4#comments").unwrap();
    entry
        .set_comment_feed_link("https://releases.example.com/v2.4/comments.rss")
        .unwrap();
    entry.set_comment_count(7);
    entry.set_date_modified(instant("2024-03-01T09:00:00+00:00"));
    feed.add_entry(entry);

    let xml = feed.export(Dialect::Rss, MissingFieldPolicy::Error).unwrap();

    // The id matches the link, so the guid is marked as a permalink.
    assert!(xml.contains(r#"<guid isPermaLink="true">https://releases.example.com/v2.4</guid>"#));
    assert!(xml.contains(r#"xmlns:content="http://purl.org/rss/1.0/modules/content/""#));

    let reread = reimport(&xml);
    assert_eq!(reread.title(), Some("Release Radar"));
    assert_eq!(reread.description(), Some("What shipped this week"));
    assert_eq!(reread.link(), Some("https://releases.example.com/"));
    assert_eq!(reread.feed_link(), Some("https://releases.example.com/feed.xml"));
    assert_eq!(reread.hubs(), Some(&["https://hub.example.com/".to_string()][..]));
    assert_eq!(reread.language(), Some("en-US"));
    assert_eq!(reread.copyright(), Some("Copyright 2024 Example"));
    assert_eq!(reread.generator().unwrap().name, "ReleaseBot 1.2");
    assert_eq!(reread.image().unwrap().url, "https://releases.example.com/logo.png");
    assert_eq!(reread.image().unwrap().width, Some(88));
    assert_eq!(reread.categories().unwrap()[0].term, "releases");
    assert_eq!(
        reread.categories().unwrap()[0].scheme.as_deref(),
        Some("https://releases.example.com/tags")
    );
    assert_eq!(
        reread.date_modified().unwrap(),
        Some(instant("2024-03-02T12:00:00+00:00"))
    );

    let entry = reread.entry(0).unwrap();
    assert_eq!(entry.title(), Some("v2.4 is out"));
    assert_eq!(entry.description(), Some("Bug fixes and a new importer"));
    assert_eq!(
        entry.content(),
        Some("<p>Highlights include <em>faster</em> imports.</p>")
    );
    assert_eq!(entry.link(), Some("https://releases.example.com/v2.4"));
    assert_eq!(entry.id(), Some("https://releases.example.com/v2.4"));
    assert_eq!(entry.authors().unwrap()[0].name, "Dana");
    assert_eq!(entry.authors().unwrap()[0].email.as_deref(), Some("dana@example.com"));
    assert_eq!(entry.categories().unwrap()[0].term, "release");
    assert_eq!(
        entry.enclosure(),
        Some(&Enclosure {
            url: "https://releases.example.com/v2.4.mp3".to_string(),
            length: Some(4096),
            mime_type: Some("audio/mpeg".to_string()),
        })
    );
    assert_eq!(entry.comment_link(), Some("https://releases.example.com/v2.4#comments"));
    assert_eq!(
        entry.comment_feed_link(),
        Some("https://releases.example.com/v2.4/comments.rss")
    );
    assert_eq!(entry.comment_count(), Some(7));
    assert_eq!(
        entry.date_modified().unwrap(),
        Some(instant("2024-03-01T09:00:00+00:00"))
    );
}

// ============================================================================
// Atom Round-Trip Tests
// ============================================================================

#[test]
fn test_atom_export_reimports_with_the_same_values() {
    let mut feed = base_feed();
    feed.set_id("tag:example.com,2024:radar").unwrap();
    feed.set_feed_link("https://releases.example.com/feed.atom").unwrap();
    feed.add_hub("https://hub.example.com/").unwrap();
    feed.set_language("en").unwrap();
    feed.set_copyright("Copyright 2024 Example").unwrap();
    feed.add_author(Person {
        name: "Dana".to_string(),
        email: Some("dana@example.com".to_string()),
        uri: Some("https://example.com/dana".to_string()),
    })
    .unwrap();
    feed.set_generator(Generator {
        name: "ReleaseBot".to_string(),
        version: Some("1.2".to_string()),
        uri: Some("https://bot.example.com/".to_string()),
    })
    .unwrap();
    feed.set_image(Image {
        url: "https://releases.example.com/logo.svg".to_string(),
        ..Image::default()
    })
    .unwrap();
    feed.add_category(Category {
        term: "releases".to_string(),
        scheme: Some("https://releases.example.com/tags".to_string()),
        label: Some("Releases".to_string()),
    })
    .unwrap();

    let mut entry = writer::Entry::new();
    entry.set_title("v2.4 is out").unwrap();
    entry.set_description("Bug fixes and a new importer").unwrap();
    entry.set_content("<p>Highlights include 2 &amp; 3.</p>").unwrap();
    entry.set_link("https://releases.example.com/v2.4").unwrap();
    entry.set_id("tag:example.com,2024:radar/v2.4").unwrap();
    entry
        .add_author(Person {
            name: "Ros".to_string(),
            email: None,
            uri: Some("https://example.com/ros".to_string()),
        })
        .unwrap();
    entry
        .set_enclosure(Enclosure {
            url: "https://releases.example.com/v2.4.mp3".to_string(),
            length: Some(4096),
            mime_type: Some("audio/mpeg".to_string()),
        })
        .unwrap();
    entry.set_comment_link("https://releases.example.com/v2.4#replies").unwrap();
    entry
        .set_comment_feed_link("https://releases.example.com/v2.4/replies.atom")
        .unwrap();
    entry.set_comment_count(7);
    entry.set_date_created(instant("2024-02-28T08:00:00+00:00"));
    entry.set_date_modified(instant("2024-03-01T09:00:00+00:00"));
    feed.add_entry(entry);

    let xml = feed.export(Dialect::Atom, MissingFieldPolicy::Error).unwrap();

    // Dates carry an explicit numeric offset rather than the Z suffix.
    assert!(xml.contains("<updated>2024-03-02T12:00:00+00:00</updated>"));
    assert!(xml.contains(r#"xmlns:thr="http://purl.org/syndication/thread/1.0""#));

    let reread = reimport(&xml);
    assert_eq!(reread.title(), Some("Release Radar"));
    assert_eq!(reread.description(), Some("What shipped this week"));
    assert_eq!(reread.id(), Some("tag:example.com,2024:radar"));
    assert_eq!(reread.link(), Some("https://releases.example.com/"));
    assert_eq!(reread.feed_link(), Some("https://releases.example.com/feed.atom"));
    assert_eq!(reread.hubs(), Some(&["https://hub.example.com/".to_string()][..]));
    assert_eq!(reread.language(), Some("en"));
    assert_eq!(reread.copyright(), Some("Copyright 2024 Example"));
    assert_eq!(
        reread.authors().unwrap(),
        &[Person {
            name: "Dana".to_string(),
            email: Some("dana@example.com".to_string()),
            uri: Some("https://example.com/dana".to_string()),
        }]
    );
    assert_eq!(
        reread.generator(),
        Some(&Generator {
            name: "ReleaseBot".to_string(),
            version: Some("1.2".to_string()),
            uri: Some("https://bot.example.com/".to_string()),
        })
    );
    assert_eq!(reread.image().unwrap().url, "https://releases.example.com/logo.svg");
    assert_eq!(
        reread.categories().unwrap()[0],
        Category {
            term: "releases".to_string(),
            scheme: Some("https://releases.example.com/tags".to_string()),
            label: Some("Releases".to_string()),
        }
    );
    assert_eq!(
        reread.date_modified().unwrap(),
        Some(instant("2024-03-02T12:00:00+00:00"))
    );

    let entry = reread.entry(0).unwrap();
    assert_eq!(entry.title(), Some("v2.4 is out"));
    assert_eq!(entry.description(), Some("Bug fixes and a new importer"));
    assert_eq!(entry.content(), Some("<p>Highlights include 2 &amp; 3.</p>"));
    assert_eq!(entry.link(), Some("https://releases.example.com/v2.4"));
    assert_eq!(entry.id(), Some("tag:example.com,2024:radar/v2.4"));
    assert_eq!(entry.authors().unwrap()[0].uri.as_deref(), Some("https://example.com/ros"));
    assert_eq!(
        entry.enclosure(),
        Some(&Enclosure {
            url: "https://releases.example.com/v2.4.mp3".to_string(),
            length: Some(4096),
            mime_type: Some("audio/mpeg".to_string()),
        })
    );
    assert_eq!(entry.comment_link(), Some("https://releases.example.com/v2.4#replies"));
    assert_eq!(
        entry.comment_feed_link(),
        Some("https://releases.example.com/v2.4/replies.atom")
    );
    assert_eq!(entry.comment_count(), Some(7));
    assert_eq!(
        entry.date_created().unwrap(),
        Some(instant("2024-02-28T08:00:00+00:00"))
    );
    assert_eq!(
        entry.date_modified().unwrap(),
        Some(instant("2024-03-01T09:00:00+00:00"))
    );
}

#[test]
fn test_default_generator_round_trips_as_this_crate() {
    let xml = base_feed().export(Dialect::Atom, MissingFieldPolicy::Omit).unwrap();
    let reread = reimport(&xml);

    let generator = reread.generator().unwrap();
    assert_eq!(generator.name, env!("CARGO_PKG_NAME"));
    assert_eq!(generator.version.as_deref(), Some(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Ordering Tests
// ============================================================================

#[test]
fn test_order_by_date_controls_document_order() {
    let mut feed = base_feed();

    let mut oldest = writer::Entry::new();
    oldest.set_title("oldest").unwrap();
    oldest.set_date_modified(instant("2024-01-01T00:00:00+00:00"));
    feed.add_entry(oldest);

    let mut undated = writer::Entry::new();
    undated.set_title("undated").unwrap();
    feed.add_entry(undated);

    let mut newest = writer::Entry::new();
    newest.set_title("newest").unwrap();
    newest.set_date_modified(instant("2024-03-01T00:00:00+00:00"));
    feed.add_entry(newest);

    feed.order_by_date();
    let xml = feed.export(Dialect::Atom, MissingFieldPolicy::Omit).unwrap();

    let reread = reimport(&xml);
    let titles: Vec<_> = reread.entries().map(|e| e.title().unwrap()).collect();
    assert_eq!(titles, ["newest", "oldest", "undated"]);
}

// ============================================================================
// Tombstone Tests
// ============================================================================

#[test]
fn test_tombstones_render_in_atom_and_vanish_in_rss() {
    let mut feed = base_feed();

    let mut entry = writer::Entry::new();
    entry.set_title("still here").unwrap();
    entry.set_link("https://releases.example.com/v2.4").unwrap();
    entry.set_date_modified(instant("2024-03-01T00:00:00+00:00"));
    feed.add_entry(entry);

    let mut gone = writer::Deleted::new();
    gone.set_reference("tag:example.com,2024:radar/v2.3").unwrap();
    gone.set_when(instant("2024-03-02T00:00:00+00:00"));
    gone.set_by(Person::named("Moderator")).unwrap();
    gone.set_comment("withdrawn release").unwrap();
    feed.add_tombstone(gone);

    let atom = feed.export(Dialect::Atom, MissingFieldPolicy::Error).unwrap();
    assert!(atom.contains(r#"xmlns:at="http://purl.org/atompub/tombstones/1.0""#));
    assert!(atom.contains(r#"ref="tag:example.com,2024:radar/v2.3""#));
    assert!(atom.contains("<at:by>"));
    assert!(atom.contains("withdrawn release"));

    // Deleted entries are not entries; reimport sees only the live one.
    let reread = reimport(&atom);
    assert_eq!(reread.len(), 1);
    assert_eq!(reread.entry(0).unwrap().title(), Some("still here"));

    let rss = feed.export(Dialect::Rss, MissingFieldPolicy::Error).unwrap();
    assert!(!rss.contains("deleted-entry"));
    assert_eq!(reimport(&rss).len(), 1);
}

// ============================================================================
// Podcast Metadata Round-Trip Tests
// ============================================================================

#[test]
fn test_itunes_metadata_survives_an_rss_round_trip() {
    let mut feed = base_feed();
    feed.podcast_mut().set_author("Example Audio").unwrap();
    feed.podcast_mut().set_explicit("clean").unwrap();
    feed.podcast_mut()
        .set_keywords(["ops", "infrastructure"])
        .unwrap();

    let mut entry = writer::Entry::new();
    entry.set_title("Episode 12").unwrap();
    entry.set_description("Capacity planning").unwrap();
    entry.podcast_mut().set_duration("42:10").unwrap();
    entry.podcast_mut().set_episode(12);
    feed.add_entry(entry);

    let xml = feed.export(Dialect::Rss, MissingFieldPolicy::Error).unwrap();
    assert!(xml.contains(r#"xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd""#));

    let reread = reimport(&xml);
    assert_eq!(
        reread.get("author").unwrap().unwrap().into_text().as_deref(),
        Some("Example Audio")
    );
    assert_eq!(
        reread.get("explicit").unwrap().unwrap().into_text().as_deref(),
        Some("clean")
    );
    assert_eq!(
        reread.get("keywords").unwrap(),
        Some(kiosk::ExtensionValue::TextList(vec![
            "ops".to_string(),
            "infrastructure".to_string(),
        ]))
    );

    let entry = reread.entry(0).unwrap();
    assert_eq!(
        entry.get("duration").unwrap().unwrap().into_text().as_deref(),
        Some("42:10")
    );
    assert_eq!(
        entry.get("episode").unwrap(),
        Some(kiosk::ExtensionValue::Integer(12))
    );
}

// ============================================================================
// Ordering and Validation Properties
// ============================================================================

fn epoch(seconds: i64) -> DateTime<FixedOffset> {
    DateTime::from_timestamp(seconds, 0).unwrap().fixed_offset()
}

proptest! {
    #[test]
    fn test_order_by_date_sorts_descending_with_undated_last(
        stamps in prop::collection::vec(proptest::option::of(0i64..2_000_000_000i64), 0..24),
    ) {
        let mut feed = writer::Feed::new();
        feed.set_title("p").unwrap();
        for stamp in &stamps {
            let mut entry = writer::Entry::new();
            entry.set_title("e").unwrap();
            if let Some(seconds) = stamp {
                entry.set_date_modified(epoch(*seconds));
            }
            feed.add_entry(entry);
        }

        feed.order_by_date();

        let dates: Vec<Option<DateTime<FixedOffset>>> =
            feed.entries().map(|(_, e)| e.date_modified()).collect();
        prop_assert_eq!(dates.len(), stamps.len());

        // Indices come back dense after reordering.
        let indices: Vec<usize> = feed.entries().map(|(i, _)| i).collect();
        prop_assert_eq!(indices, (0..stamps.len()).collect::<Vec<_>>());

        let first_undated = dates.iter().position(Option::is_none).unwrap_or(dates.len());
        for date in &dates[first_undated..] {
            prop_assert!(date.is_none());
        }
        for pair in dates[..first_undated].windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_titles_are_stored_trimmed_or_rejected(raw in "[ \\t]{0,3}[a-zA-Z0-9 ]{0,12}[ \\t]{0,3}") {
        let mut entry = writer::Entry::new();
        match entry.set_title(&raw) {
            Ok(_) => prop_assert_eq!(entry.title(), Some(raw.trim())),
            Err(_) => prop_assert!(raw.trim().is_empty()),
        }
    }
}
