//! Small text and byte helpers shared by the reader and the exporters.

use std::borrow::Cow;

use memchr::memmem;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<?xml encoding="..."?>`)
/// 3. Falls back to Windows-1252
///
/// FB2 files produced by older tools are frequently Windows-1251, which is
/// why the declared encoding is consulted before the fallback.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract encoding from XML declaration.
///
/// Parses `<?xml ... encoding="..." ?>` within the first 100 bytes.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = memmem::find(prefix, b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let (&quote, rest) = after_enc.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = memchr::memchr(quote, rest)?;
    std::str::from_utf8(&rest[..value_end]).ok()
}

pub fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// SHA-1 hex digest of `data`, used as a stable book identifier.
pub fn content_hash(data: &[u8]) -> String {
    sha1_smol::Sha1::from(data).hexdigest()
}

/// Truncate an ISO date/timestamp to just the date portion (YYYY-MM-DD).
pub fn truncate_to_date(s: &str) -> &str {
    match s.find('T') {
        Some(t_pos) => &s[..t_pos],
        None => s,
    }
}

// ============================================================================
// Image Format Detection
// ============================================================================

/// Image formats an FB2 `<binary>` may carry that end up in the EPUB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Jpeg,
    Png,
    /// Anything else; not written to the output.
    Binary,
}

impl MediaFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Png => "image/png",
            MediaFormat::Binary => "application/octet-stream",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "jpg",
            MediaFormat::Png => "png",
            MediaFormat::Binary => "bin",
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self, MediaFormat::Jpeg | MediaFormat::Png)
    }
}

/// Classify a resource by its declared content type alone.
///
/// The payload is never sniffed: a PNG declared as
/// `application/octet-stream` stays [`MediaFormat::Binary`].
pub fn detect_media_format(content_type: &str) -> MediaFormat {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" => MediaFormat::Jpeg,
        "image/png" => MediaFormat::Png,
        _ => MediaFormat::Binary,
    }
}

// ============================================================================
// Tests
// ============================================================================
