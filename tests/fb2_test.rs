//! Reading the sample FictionBook fixture end to end.

use fb2epub::{Book, Diagnostic, Error, Token, flatten_sections, parse_fb2, to_plain_text};

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.fb2");

fn sample() -> Book {
    Book::open(SAMPLE).expect("Failed to read sample FB2")
}

#[test]
fn test_description() {
    let book = sample();
    let desc = &book.description;

    assert_eq!(desc.title, "The Sample Voyage");
    assert_eq!(desc.genres, vec!["sf", "adventure"]);
    let authors: Vec<_> = desc.authors.iter().filter_map(|a| a.display_name()).collect();
    assert_eq!(authors, vec!["Jane Doe", "anon"]);
    assert_eq!(desc.date.as_deref(), Some("2001-05-17T10:00:00"));
    assert_eq!(desc.language.as_deref(), Some("en"));
    assert_eq!(desc.cover.as_deref(), Some("cover.png"));
    assert_eq!(desc.series, vec!["Voyages"]);

    let annotation = desc.annotation.as_deref().expect("annotation");
    assert_eq!(
        to_plain_text(annotation, false).unwrap(),
        "A short book used for testing . "
    );
}

#[test]
fn test_section_tree() {
    let book = sample();

    // Only the first body is read; the notes body is ignored.
    assert_eq!(book.sections.len(), 2);
    let part = &book.sections[0];
    assert!(!part.is_leaf());
    assert!(part.contents.is_empty());
    assert_eq!(part.subsections.len(), 2);
    assert_eq!(part.subsections[1].header.image.as_deref(), Some("map.png"));

    let depths: Vec<usize> = flatten_sections(&book.sections)
        .iter()
        .map(|f| f.depth)
        .collect();
    assert_eq!(depths, vec![0, 1, 1, 0]);
}

#[test]
fn test_section_contents() {
    let book = sample();
    let departure = &book.sections[0].subsections[0];

    assert_eq!(departure.contents[0], Token::Epigraph);
    assert!(departure.contents.contains(&Token::EmptyLine));
    assert!(departure.contents.contains(&Token::link("#note1")));
    assert!(departure.contents.contains(&Token::word(" & map.")));

    assert_eq!(
        to_plain_text(&departure.contents, true).unwrap(),
        "All journeys begin. \nThe ship left at dawn . \nSee note  & map. \n"
    );
    assert!(book.diagnostics.is_empty());
}

#[test]
fn test_binaries() {
    let book = sample();

    // The undecodable binary is skipped.
    assert_eq!(book.binaries.len(), 2);
    let ids: Vec<_> = book.images().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["cover.png", "map.png"]);
    let cover = book.image("cover.png").unwrap();
    assert!(cover.data.starts_with(b"\x89PNG"));
    assert_eq!(cover.data, book.binaries["map.png"].data);
}

#[test]
fn test_identifier_is_content_hash() {
    let bytes = std::fs::read(SAMPLE).unwrap();
    let a = parse_fb2(&bytes).unwrap();
    let b = sample();
    assert_eq!(a.identifier, b.identifier);
    assert_eq!(a.identifier.len(), 40);
}

#[test]
fn test_unknown_tags_are_reported() {
    let xml = br#"<FictionBook><description><title-info><book-title>T</book-title></title-info></description>
<body><section><p>Some <sup>raised</sup> text</p></section></body></FictionBook>"#;
    let book = parse_fb2(xml).unwrap();

    assert_eq!(
        book.diagnostics,
        vec![Diagnostic::UnknownTag { tag: "sup".into() }]
    );
    // Content of the unknown element is kept.
    assert_eq!(
        to_plain_text(&book.sections[0].contents, false).unwrap(),
        "Some raised text "
    );
}

#[test]
fn test_link_without_href_fails() {
    let xml = br#"<FictionBook><description><title-info/></description>
<body><section><p><a>dangling</a></p></section></body></FictionBook>"#;
    let result = parse_fb2(xml);
    assert!(matches!(result, Err(Error::InvalidAttribute { .. })));
}

#[test]
fn test_missing_file() {
    let result = Book::open("/nonexistent/book.fb2");
    assert!(matches!(result, Err(Error::Io(_))));
}
