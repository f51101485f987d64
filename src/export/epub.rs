//! EPUB exporter.
//!
//! Creates EPUB 2 files: one XHTML chapter per section in flat order, an NCX
//! table of contents nested like the section tree, and the book's images.

use std::io::{Seek, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::Exporter;
use crate::error::Result;
use crate::fb2::Binary;
use crate::model::{Book, FlatSection, NavNode, NavValue, build_nav_tree};
use crate::render::{HtmlConfig, title_to_plain_text, to_html_with, to_plain_text};
use crate::util::{escape_xml, truncate_to_date};

const DEFAULT_STYLESHEET: &str = include_str!("stylesheet.css");

/// Configuration for EPUB export.
#[derive(Debug, Clone, Default)]
pub struct EpubConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
    /// Overrides the language from `<title-info>`.
    pub language: Option<String>,
    /// Replaces the built-in stylesheet.
    pub stylesheet: Option<String>,
}

/// EPUB format exporter.
///
/// # Example
///
/// ```no_run
/// use fb2epub::Book;
/// use fb2epub::export::{EpubExporter, Exporter};
/// use std::fs::File;
///
/// let book = Book::open("input.fb2")?;
/// let mut file = File::create("output.epub")?;
/// EpubExporter::new().export(&book, &mut file)?;
/// # Ok::<(), fb2epub::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EpubExporter {
    config: EpubConfig,
}

impl EpubExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }

    fn language<'a>(&'a self, book: &'a Book) -> &'a str {
        self.config
            .language
            .as_deref()
            .or(book.description.language.as_deref())
            .unwrap_or("en")
    }
}

/// A chapter file as referenced from the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ChapterRef {
    pub title: String,
    pub href: String,
}

struct Chapter {
    id: String,
    link: ChapterRef,
    document: String,
}

struct ImageItem<'a> {
    id: String,
    href: String,
    binary: &'a Binary,
}

impl Exporter for EpubExporter {
    fn export<W: Write + Seek>(&self, book: &Book, writer: &mut W) -> Result<()> {
        let flat = book.flat_sections();
        let images = image_items(book);
        let chapters = flat
            .iter()
            .enumerate()
            .map(|(i, flat_section)| self.render_chapter(book, &images, i, flat_section))
            .collect::<Result<Vec<_>>>()?;

        let toc = build_nav_tree(
            &flat,
            chapters.iter().map(|c| c.link.clone()),
            book.description.title.clone(),
        )?;

        let mut zip = ZipWriter::new(writer);

        let compression_level = self.config.compression_level.unwrap_or(6);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level as i64));

        // 1. Write mimetype (must be first, uncompressed)
        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        // 2. Write container.xml
        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML)?;

        // 3. Write content.opf
        let opf = self.generate_opf(book, &chapters, &images)?;
        zip.start_file("OEBPS/content.opf", deflated)?;
        zip.write_all(opf.as_bytes())?;

        // 4. Write toc.ncx
        let ncx = generate_ncx(book, &toc);
        zip.start_file("OEBPS/toc.ncx", deflated)?;
        zip.write_all(ncx.as_bytes())?;

        // 5. Write stylesheet
        let css = self.config.stylesheet.as_deref().unwrap_or(DEFAULT_STYLESHEET);
        zip.start_file("OEBPS/stylesheet.css", deflated)?;
        zip.write_all(css.as_bytes())?;

        // 6. Write chapters
        for chapter in &chapters {
            zip.start_file(format!("OEBPS/{}", chapter.link.href), deflated)?;
            zip.write_all(chapter.document.as_bytes())?;
        }

        // 7. Write images
        for image in &images {
            zip.start_file(format!("OEBPS/{}", image.href), deflated)?;
            zip.write_all(&image.binary.data)?;
        }

        zip.finish()?;
        log::debug!(
            "Wrote EPUB: {} chapters, {} images",
            chapters.len(),
            images.len()
        );
        Ok(())
    }
}

/// The table of contents the exporter writes, with chapter file references.
pub fn build_toc(book: &Book) -> Result<NavNode<ChapterRef>> {
    let flat = book.flat_sections();
    let links = flat
        .iter()
        .enumerate()
        .map(|(i, f)| {
            Ok(ChapterRef {
                title: title_to_plain_text(&f.section.header.title)?,
                href: chapter_href(i),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    build_nav_tree(&flat, links, book.description.title.clone())
}

fn chapter_href(index: usize) -> String {
    format!("chapter_{index}.xhtml")
}

// ============================================================================
// Chapters
// ============================================================================

impl EpubExporter {
    fn render_chapter(
        &self,
        book: &Book,
        images: &[ImageItem<'_>],
        index: usize,
        flat: &FlatSection<'_>,
    ) -> Result<Chapter> {
        let section = flat.section;
        let html_config = HtmlConfig { escape_text: true };

        let title = title_to_plain_text(&section.header.title)?;
        let title_html = to_html_with(&section.header.title, html_config.clone())?;
        let contents_html = to_html_with(&section.contents, html_config)?;

        let image_html = section
            .header
            .image
            .as_deref()
            .and_then(|id| images.iter().find(|img| img.binary.id == id))
            .map(|img| {
                format!(
                    "<div class=\"image\"><img src=\"{}\" alt=\"\"/></div>\n",
                    escape_xml(&img.href)
                )
            })
            .unwrap_or_default();

        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}">
<head>
  <title>{title}</title>
  <link href="stylesheet.css" rel="stylesheet" type="text/css"/>
</head>
<body>
{image_html}{title_html}{contents_html}
</body>
</html>
"#,
            lang = escape_xml(self.language(book)),
            title = escape_xml(&title),
        );

        Ok(Chapter {
            id: format!("chapter_{index}"),
            link: ChapterRef {
                title,
                href: chapter_href(index),
            },
            document,
        })
    }
}

fn image_items(book: &Book) -> Vec<ImageItem<'_>> {
    book.images()
        .into_iter()
        .enumerate()
        .map(|(i, binary)| {
            let is_cover = book.description.cover.as_deref() == Some(binary.id.as_str());
            ImageItem {
                id: if is_cover {
                    "cover-image".to_string()
                } else {
                    format!("image_{i}")
                },
                href: image_href(binary),
                binary,
            }
        })
        .collect()
}

/// Archive path of an image, keeping the binary id readable.
fn image_href(binary: &Binary) -> String {
    let mut name: String = binary
        .id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !name.contains('.') {
        name.push('.');
        name.push_str(binary.format().extension());
    }
    format!("images/{name}")
}

// ============================================================================
// Package documents
// ============================================================================

/// Container.xml template.
const CONTAINER_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

fn book_identifier(book: &Book) -> String {
    format!("urn:sha1:{}", book.identifier)
}

impl EpubExporter {
    /// Generate content.opf from the book description and manifest.
    fn generate_opf(
        &self,
        book: &Book,
        chapters: &[Chapter],
        images: &[ImageItem<'_>],
    ) -> Result<String> {
        let desc = &book.description;
        let mut opf = String::new();

        opf.push_str(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
        );

        opf.push_str(&format!(
            "    <dc:title>{}</dc:title>\n",
            escape_xml(&desc.title)
        ));
        opf.push_str(&format!(
            "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
            escape_xml(&book_identifier(book))
        ));
        opf.push_str(&format!(
            "    <dc:language>{}</dc:language>\n",
            escape_xml(self.language(book))
        ));

        for author in desc.authors.iter().filter_map(|a| a.display_name()) {
            opf.push_str(&format!(
                "    <dc:creator opf:role=\"aut\">{}</dc:creator>\n",
                escape_xml(&author)
            ));
        }

        for genre in &desc.genres {
            opf.push_str(&format!(
                "    <dc:subject>{}</dc:subject>\n",
                escape_xml(genre)
            ));
        }

        if let Some(ref date) = desc.date {
            opf.push_str(&format!(
                "    <dc:date>{}</dc:date>\n",
                escape_xml(truncate_to_date(date))
            ));
        }

        if let Some(ref annotation) = desc.annotation {
            let text = to_plain_text(annotation, true)?;
            let text = text.trim();
            if !text.is_empty() {
                opf.push_str(&format!(
                    "    <dc:description>{}</dc:description>\n",
                    escape_xml(text)
                ));
            }
        }

        if let Some(series) = desc.series.first() {
            opf.push_str(&format!(
                "    <meta name=\"calibre:series\" content=\"{}\"/>\n",
                escape_xml(series)
            ));
        }

        if images.iter().any(|img| img.id == "cover-image") {
            opf.push_str("    <meta name=\"cover\" content=\"cover-image\"/>\n");
        }

        opf.push_str("  </metadata>\n  <manifest>\n");
        opf.push_str(
            "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
        );
        opf.push_str(
            "    <item id=\"css\" href=\"stylesheet.css\" media-type=\"text/css\"/>\n",
        );
        for chapter in chapters {
            opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
                chapter.id,
                escape_xml(&chapter.link.href)
            ));
        }
        for image in images {
            opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
                image.id,
                escape_xml(&image.href),
                image.binary.format().mime_type()
            ));
        }

        opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");
        for chapter in chapters {
            opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", chapter.id));
        }
        opf.push_str("  </spine>\n</package>\n");

        Ok(opf)
    }
}

/// Generate toc.ncx from the navigation tree. The synthetic root is not emitted.
fn generate_ncx(book: &Book, toc: &NavNode<ChapterRef>) -> String {
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
"#,
    );
    ncx.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"{}\"/>\n",
        escape_xml(&book_identifier(book))
    ));
    ncx.push_str(&format!(
        "    <meta name=\"dtb:depth\" content=\"{}\"/>\n",
        toc.height().max(1)
    ));
    ncx.push_str(
        r#"    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
"#,
    );
    ncx.push_str(&format!(
        "    <text>{}</text>\n",
        escape_xml(&book.description.title)
    ));
    ncx.push_str("  </docTitle>\n  <navMap>\n");

    let mut play_order = 1;
    write_nav_points(&mut ncx, &toc.children, &mut play_order, 2);

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

/// Recursively write navPoint elements. A group points at its first leaf.
fn write_nav_points(
    ncx: &mut String,
    nodes: &[NavNode<ChapterRef>],
    play_order: &mut usize,
    indent: usize,
) {
    let indent_str = "  ".repeat(indent);

    for node in nodes {
        let (label, src) = match &node.value {
            NavValue::Leaf(chapter) => (chapter.title.as_str(), chapter.href.as_str()),
            NavValue::Group(label) => (
                label.as_str(),
                node.first_leaf().map(|c| c.href.as_str()).unwrap_or_default(),
            ),
        };

        ncx.push_str(&format!(
            "{}<navPoint id=\"navPoint-{}\" playOrder=\"{}\">\n",
            indent_str, play_order, play_order
        ));
        ncx.push_str(&format!(
            "{}  <navLabel><text>{}</text></navLabel>\n",
            indent_str,
            escape_xml(label)
        ));
        ncx.push_str(&format!(
            "{}  <content src=\"{}\"/>\n",
            indent_str,
            escape_xml(src)
        ));

        *play_order += 1;

        write_nav_points(ncx, &node.children, play_order, indent + 1);

        ncx.push_str(&format!("{}</navPoint>\n", indent_str));
    }
}
