//! # Archive Unpacking
//!
//! The VRM cockpit is captured as a single-file web archive (MHTML): the rendered page and its resources bundled as
//! MIME parts. This module splits such a document, undoes the transfer encoding and charset of every part and picks the
//! rendered page out of the bundle.
//!
//! The raw input is handled as bytes and mapped one-to-one onto chars while the multipart structure is parsed, so bodies
//! declared as Latin-1 reach the charset decoder byte-exact.

mod repair;

use base64::{
    alphabet,
    engine::{
        general_purpose::GeneralPurposeConfig,
        DecodePaddingMode,
        GeneralPurpose,
    },
    Engine as _,
};
use lazy_static::lazy_static;
use regex::Regex;
pub use repair::repair_mojibake;

lazy_static! {
    static ref DECLARED_BOUNDARY: Regex = Regex::new(
        r#"(?i)content-type:\s*multipart/[\w-]+\s*;(?:\s*[\w-]+\s*=\s*(?:"[^"]*"|[^\s;"]+)\s*;)*\s*boundary\s*=\s*"?([^"\r\n;]+)"?"#
    )
    .expect("declared boundary pattern");
    static ref BOUNDARY_LINE: Regex = Regex::new(r"(?m)^--([-\w.=]+)\r?$").expect("boundary line pattern");
    static ref TRANSFER_ENCODING: Regex =
        Regex::new(r"(?i)content-transfer-encoding:\s*([^\r\n]+)").expect("transfer encoding pattern");
    static ref CHARSET: Regex = Regex::new(r#"(?i)charset="?([^";\r\n]+)"?"#).expect("charset pattern");
    static ref HTML_TYPE: Regex = Regex::new(r"(?i)content-type:\s*text/html").expect("html type pattern");
    static ref ESCAPED_BACKSLASH: Regex = Regex::new(r"(?i)&#92;|%5C").expect("escaped backslash pattern");
    static ref LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new()
            .with_decode_padding_mode(DecodePaddingMode::Indifferent)
            .with_decode_allow_trailing_bits(true),
    );
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("The document declares no multipart boundary and none could be found")]
    NoBoundary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferEncoding {
    /// `7bit`, `8bit`, `binary` and anything unknown.
    #[default]
    Identity,
    Base64,
    QuotedPrintable,
}

impl TransferEncoding {
    fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::Identity,
        }
    }

    fn decode(self, body: &[u8]) -> Vec<u8> {
        match self {
            Self::Identity => body.to_vec(),
            Self::Base64 => {
                let compact: Vec<u8> = body.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
                match LENIENT_BASE64.decode(&compact) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        warn!(%err, "Dropping archive part with undecodable base64 body");
                        Vec::new()
                    }
                }
            }
            Self::QuotedPrintable => decode_quoted_printable(body),
        }
    }
}

/// Only these two are told apart, every other label decodes as UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
}

impl Charset {
    fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if label.contains("utf-8") || label.contains("utf8") {
            Self::Utf8
        } else if label.contains("iso-8859-1") || label.contains("latin1") || label.contains("latin-1") {
            Self::Latin1
        } else {
            Self::Utf8
        }
    }

    fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => latin1(bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePart {
    pub headers: String,
    pub encoding: TransferEncoding,
    pub charset: Charset,
    /// Decoded body text.
    pub body: String,
}

impl ArchivePart {
    pub fn is_html(&self) -> bool {
        HTML_TYPE.is_match(&self.headers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub boundary: String,
    pub parts: Vec<ArchivePart>,
}

impl Archive {
    /// The longest HTML part, taken to be the rendered page. The first one wins when several are equally long.
    ///
    /// Size is the only criterion: an inlined HTML resource larger than the actual main frame is picked instead of it.
    pub fn main_html(&self) -> Option<&str> {
        let mut best: Option<&ArchivePart> = None;
        for part in self.parts.iter().filter(|p| p.is_html()) {
            if best.map_or(true, |b| part.body.len() > b.body.len()) {
                best = Some(part);
            }
        }
        best.map(|p| p.body.as_str())
    }

    /// [`Self::main_html`] with escaped backslashes restored, mojibake repaired and non-breaking spaces flattened.
    /// Empty when the archive has no HTML part.
    pub fn rendered_html(&self) -> String {
        let html = self.main_html().unwrap_or_default();
        let html = ESCAPED_BACKSLASH.replace_all(html, "\\");
        repair_mojibake(&html).replace('\u{a0}', " ")
    }
}

/// Splits a multipart web archive into its decoded parts.
///
/// # Errors
/// [`ArchiveError::NoBoundary`] when neither a declared boundary nor a `--token` line exists.
pub fn unpack(raw: &[u8]) -> Result<Archive, ArchiveError> {
    let text = latin1(raw);
    let boundary = find_boundary(&text).ok_or(ArchiveError::NoBoundary)?;

    let separator = format!("--{boundary}");
    let terminal = format!("--{boundary}--");
    let content = match text.find(&terminal) {
        Some(end) => &text[..end],
        None => &text,
    };

    let parts: Vec<ArchivePart> = content.split(separator.as_str()).skip(1).filter_map(parse_part).collect();
    debug!(%boundary, parts = parts.len(), "Unpacked archive");

    Ok(Archive { boundary, parts })
}

fn find_boundary(text: &str) -> Option<String> {
    let declared = DECLARED_BOUNDARY
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|b| !b.is_empty());
    declared.or_else(|| BOUNDARY_LINE.captures(text).map(|c| c[1].to_string()))
}

fn parse_part(chunk: &str) -> Option<ArchivePart> {
    let split = header_end(chunk)?;
    let headers = chunk[..split].trim().to_string();
    let raw_body = chunk[split..].trim_start_matches(|c: char| c.is_ascii_whitespace());

    let encoding = TRANSFER_ENCODING
        .captures(&headers)
        .map(|c| TransferEncoding::from_header(&c[1]))
        .unwrap_or_default();
    let charset = CHARSET
        .captures(&headers)
        .map(|c| Charset::from_label(&c[1]))
        .unwrap_or_default();

    let bytes: Vec<u8> = raw_body.chars().map(|c| c as u8).collect();
    let body = charset.decode(&encoding.decode(&bytes));

    Some(ArchivePart {
        headers,
        encoding,
        charset,
        body,
    })
}

/// Offset right behind the blank line that ends the header block.
fn header_end(chunk: &str) -> Option<usize> {
    chunk
        .find("\r\n\r\n")
        .map(|i| i + 4)
        .or_else(|| chunk.find("\n\n").map(|i| i + 2))
}

fn decode_quoted_printable(body: &[u8]) -> Vec<u8> {
    let mut joined = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        if body[i] == b'=' {
            if body[i + 1..].starts_with(b"\r\n") {
                i += 3;
                continue;
            }
            if body[i + 1..].starts_with(b"\n") {
                i += 2;
                continue;
            }
        }
        joined.push(body[i]);
        i += 1;
    }

    let mut out = Vec::with_capacity(joined.len());
    let mut i = 0;
    while i < joined.len() {
        if joined[i] == b'=' && i + 2 < joined.len() {
            if let (Some(high), Some(low)) = (hex_value(joined[i + 1]), hex_value(joined[i + 2])) {
                out.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        out.push(joined[i]);
        i += 1;
    }
    out
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const QP_ARCHIVE: &str = "From: <Saved by Blink>\r\n\
Subject: VRM\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/related;\r\n\
\ttype=\"text/html\";\r\n\
\tboundary=\"----MultipartBoundary--abc----\"\r\n\
\r\n\
------MultipartBoundary--abc----\r\n\
Content-Type: text/html\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
<html><body><p class=3D\"x\">Canales fuera de l=C3=ADnea</p>=\r\n\
<p>tail</p></body></html>\r\n\
------MultipartBoundary--abc----\r\n\
Content-Type: text/css\r\n\
\r\n\
p { color: red }\r\n\
------MultipartBoundary--abc------\r\n\
trailing garbage\r\n";

    #[test]
    fn declared_boundary_with_folded_parameters() {
        let archive = unpack(QP_ARCHIVE.as_bytes()).unwrap();
        assert_eq!(archive.boundary, "----MultipartBoundary--abc----");
        assert_eq!(archive.parts.len(), 2);
        assert_eq!(archive.parts[0].encoding, TransferEncoding::QuotedPrintable);
        assert!(archive.parts[0].is_html());
        assert!(!archive.parts[1].is_html());
    }

    #[test]
    fn quoted_printable_soft_breaks_and_escapes() {
        let archive = unpack(QP_ARCHIVE.as_bytes()).unwrap();
        let html = archive.main_html().unwrap();
        assert!(html.contains(r#"<p class="x">Canales fuera de línea</p><p>tail</p>"#));
        assert!(!html.contains("trailing garbage"));
    }

    #[test]
    fn guessed_boundary_and_base64_part() {
        let raw = "\n--XYZ\nContent-Type: text/html; charset=utf-8\nContent-Transfer-Encoding: base64\n\n\
                   PGgxPlNlw7FhbDwvaDE+\n--XYZ--\n";
        let archive = unpack(raw.as_bytes()).unwrap();
        assert_eq!(archive.boundary, "XYZ");
        assert_eq!(archive.main_html(), Some("<h1>Señal</h1>"));
    }

    #[test]
    fn latin1_bodies_are_decoded_byte_exact() {
        let mut raw = b"--B\r\nContent-Type: text/html; charset=\"ISO-8859-1\"\r\n\r\n<p>Se".to_vec();
        raw.push(0xF1);
        raw.extend_from_slice(b"al</p>\r\n--B--\r\n");
        let archive = unpack(&raw).unwrap();
        assert_eq!(archive.parts[0].charset, Charset::Latin1);
        assert_eq!(archive.main_html(), Some("<p>Señal</p>\r\n"));
    }

    #[test]
    fn unknown_or_missing_charset_decodes_as_utf8() {
        let raw = "--B\r\nContent-Type: text/html; charset=windows-1252\r\n\r\n<p>Señal</p>\r\n\
                   --B\r\nContent-Type: text/html\r\n\r\n<p>Câmera</p>\r\n--B--\r\n";
        let archive = unpack(raw.as_bytes()).unwrap();
        assert_eq!(archive.parts[0].charset, Charset::Utf8);
        assert_eq!(archive.parts[0].body, "<p>Señal</p>\r\n");
        assert_eq!(archive.parts[1].charset, Charset::Utf8);
        assert_eq!(archive.parts[1].body, "<p>Câmera</p>\r\n");
    }

    #[test]
    fn soft_break_inside_a_multibyte_sequence() {
        let raw = "--B\r\nContent-Type: text/html; charset=utf-8\r\n\
                   Content-Transfer-Encoding: quoted-printable\r\n\r\n\
                   <p>l=C3=\r\n=ADnea</p>\r\n--B--\r\n";
        let archive = unpack(raw.as_bytes()).unwrap();
        assert_eq!(archive.main_html(), Some("<p>línea</p>\r\n"));
    }

    #[test]
    fn largest_html_part_wins() {
        let raw = "--B\nContent-Type: text/html\n\n<p>small</p>\n\
                   --B\nContent-Type: text/html\n\n<p>the rendered page</p>\n\
                   --B\nContent-Type: text/html\n\n<p>equally longer!!!</p>\n--B--";
        let archive = unpack(raw.as_bytes()).unwrap();
        assert_eq!(archive.main_html(), Some("<p>the rendered page</p>\n"));
    }

    #[test]
    fn rendered_html_is_normalized() {
        let raw = "--B\nContent-Type: text/html\n\n<td>172.25.0.15&#92;1</td><td>10%5c2</td><td>Se\u{c3}\u{b1}al\u{a0}1</td>\n--B--";
        let archive = unpack(raw.as_bytes()).unwrap();
        // The input is read as bytes: the UTF-8 encoded `Ã±` arrives as four Latin-1 chars and decodes back to `Ã±`.
        assert_eq!(
            archive.rendered_html(),
            "<td>172.25.0.15\\1</td><td>10\\2</td><td>Señal 1</td>\n"
        );
    }

    #[test]
    fn missing_boundary_is_reported() {
        assert_eq!(unpack(b"<html>no archive</html>"), Err(ArchiveError::NoBoundary));
    }

    #[test]
    fn archive_without_html_renders_empty() {
        let archive = unpack(b"--B\nContent-Type: text/css\n\nbody{}\n--B--").unwrap();
        assert_eq!(archive.main_html(), None);
        assert_eq!(archive.rendered_html(), "");
    }
}
