//! Content type detection from file signatures.
//!
//! Detection looks only at the leading bytes of a file and never at the
//! client-declared content type or filename.

use std::fmt;

use serde::de::IgnoredAny;

/// Number of leading bytes inspected by [`detect`].
pub const SNIFF_LEN: usize = 3072;

/// A detected media type and the file extension that goes with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mime {
    mime: &'static str,
    extension: &'static str,
}

impl Mime {
    /// Arbitrary binary data.
    pub const OCTET_STREAM: Self = Self::new("application/octet-stream", "");
    /// UTF-8 text.
    pub const TEXT_PLAIN: Self = Self::new("text/plain; charset=utf-8", ".txt");

    const fn new(mime: &'static str, extension: &'static str) -> Self {
        Self { mime, extension }
    }

    /// Returns the full media type including parameters, e.g.
    /// `text/plain; charset=utf-8`.
    #[must_use]
    pub const fn mime(&self) -> &'static str {
        self.mime
    }

    /// Returns the media type without parameters, e.g. `text/plain`.
    #[must_use]
    pub fn essence(&self) -> &'static str {
        self.mime
            .split_once(';')
            .map_or(self.mime, |(essence, _)| essence.trim_end())
    }

    /// Returns the canonical extension including the leading dot, or an
    /// empty string when the type has none.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.extension
    }
}

impl fmt::Display for Mime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime)
    }
}

/// A fixed byte sequence expected at a fixed offset.
struct Signature {
    offset: usize,
    magic: &'static [u8],
    mime: Mime,
}

const fn sig(
    offset: usize,
    magic: &'static [u8],
    mime: &'static str,
    ext: &'static str,
) -> Signature {
    Signature {
        offset,
        magic,
        mime: Mime::new(mime, ext),
    }
}

const SIGNATURES: &[Signature] = &[
    // Images
    sig(0, b"\x89PNG\r\n\x1a\n", "image/png", ".png"),
    sig(0, b"\xff\xd8\xff", "image/jpeg", ".jpg"),
    sig(0, b"GIF87a", "image/gif", ".gif"),
    sig(0, b"GIF89a", "image/gif", ".gif"),
    sig(0, b"\x00\x00\x01\x00", "image/x-icon", ".ico"),
    sig(0, b"II*\x00", "image/tiff", ".tiff"),
    sig(0, b"MM\x00*", "image/tiff", ".tiff"),
    sig(0, b"8BPS", "image/vnd.adobe.photoshop", ".psd"),
    // Documents
    sig(0, b"%PDF-", "application/pdf", ".pdf"),
    sig(0, b"{\\rtf", "text/rtf", ".rtf"),
    sig(0, b"%!PS", "application/postscript", ".ps"),
    // Archives
    sig(0, b"PK\x03\x04", "application/zip", ".zip"),
    sig(0, b"PK\x05\x06", "application/zip", ".zip"),
    sig(0, b"\x1f\x8b", "application/gzip", ".gz"),
    sig(0, b"BZh", "application/x-bzip2", ".bz2"),
    sig(0, b"\xfd7zXZ\x00", "application/x-xz", ".xz"),
    sig(0, b"\x28\xb5\x2f\xfd", "application/zstd", ".zst"),
    sig(0, b"7z\xbc\xaf\x27\x1c", "application/x-7z-compressed", ".7z"),
    sig(0, b"Rar!\x1a\x07", "application/x-rar-compressed", ".rar"),
    sig(257, b"ustar", "application/x-tar", ".tar"),
    // Audio
    sig(0, b"ID3", "audio/mpeg", ".mp3"),
    sig(0, b"\xff\xfb", "audio/mpeg", ".mp3"),
    sig(0, b"\xff\xf3", "audio/mpeg", ".mp3"),
    sig(0, b"\xff\xf2", "audio/mpeg", ".mp3"),
    sig(0, b"OggS", "audio/ogg", ".ogg"),
    sig(0, b"fLaC", "audio/flac", ".flac"),
    sig(0, b"MThd", "audio/midi", ".midi"),
    // Fonts
    sig(0, b"wOFF", "font/woff", ".woff"),
    sig(0, b"wOF2", "font/woff2", ".woff2"),
    // Binaries and databases
    sig(0, b"\x00asm", "application/wasm", ".wasm"),
    sig(0, b"SQLite format 3\x00", "application/vnd.sqlite3", ".sqlite"),
];

/// Detects the media type of a file from its first bytes.
///
/// Only the first [`SNIFF_LEN`] bytes of `data` are examined. Empty input
/// and UTF-8 text without binary control bytes are reported as text; any
/// other unrecognized input as [`Mime::OCTET_STREAM`].
#[must_use]
pub fn detect(data: &[u8]) -> Mime {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if let Some(signature) = SIGNATURES
        .iter()
        .find(|s| data.get(s.offset..s.offset + s.magic.len()) == Some(s.magic))
    {
        return signature.mime;
    }

    detect_bmp(data)
        .or_else(|| detect_riff(data))
        .or_else(|| detect_ftyp(data))
        .or_else(|| detect_matroska(data))
        .or_else(|| detect_text(data))
        .unwrap_or(Mime::OCTET_STREAM)
}

/// `BM` alone is too weak; the four reserved header bytes must be zero.
fn detect_bmp(data: &[u8]) -> Option<Mime> {
    if data.get(..2)? == b"BM" && data.get(6..10)? == [0u8; 4] {
        Some(Mime::new("image/bmp", ".bmp"))
    } else {
        None
    }
}

/// RIFF containers carry their form type at offset 8.
fn detect_riff(data: &[u8]) -> Option<Mime> {
    if data.get(..4)? != b"RIFF" {
        return None;
    }

    match data.get(8..12)? {
        b"WEBP" => Some(Mime::new("image/webp", ".webp")),
        b"WAVE" => Some(Mime::new("audio/wav", ".wav")),
        b"AVI " => Some(Mime::new("video/x-msvideo", ".avi")),
        _ => None,
    }
}

/// ISO base media files start with a `ftyp` box naming the major brand.
fn detect_ftyp(data: &[u8]) -> Option<Mime> {
    if data.get(4..8)? != b"ftyp" {
        return None;
    }

    let mime = match data.get(8..12)? {
        b"avif" | b"avis" => Mime::new("image/avif", ".avif"),
        b"heic" | b"heix" | b"heim" | b"heis" => Mime::new("image/heic", ".heic"),
        b"M4A " => Mime::new("audio/x-m4a", ".m4a"),
        b"qt  " => Mime::new("video/quicktime", ".mov"),
        b"3gp4" | b"3gp5" | b"3gp6" | b"3gpr" => Mime::new("video/3gpp", ".3gp"),
        _ => Mime::new("video/mp4", ".mp4"),
    };
    Some(mime)
}

/// EBML header shared by WebM and Matroska; the doctype tells them apart.
fn detect_matroska(data: &[u8]) -> Option<Mime> {
    if data.get(..4)? != b"\x1a\x45\xdf\xa3" {
        return None;
    }

    if data.windows(4).any(|window| window == b"webm") {
        Some(Mime::new("video/webm", ".webm"))
    } else {
        Some(Mime::new("video/x-matroska", ".mkv"))
    }
}

/// Text formats: markup and JSON first, then plain UTF-8 text.
fn detect_text(data: &[u8]) -> Option<Mime> {
    let data = data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data);

    if data.iter().any(|&b| is_binary_byte(b)) || !is_utf8_prefix(data) {
        return None;
    }

    let trimmed = data.trim_ascii_start();

    if starts_with_ignore_case(trimmed, b"<?xml") {
        if contains_ignore_case(trimmed, b"<svg") {
            return Some(Mime::new("image/svg+xml", ".svg"));
        }
        return Some(Mime::new("text/xml; charset=utf-8", ".xml"));
    }

    if starts_with_ignore_case(trimmed, b"<svg") {
        return Some(Mime::new("image/svg+xml", ".svg"));
    }

    const HTML_PREFIXES: &[&[u8]] = &[b"<!doctype html", b"<html", b"<head", b"<body"];
    if HTML_PREFIXES
        .iter()
        .any(|prefix| starts_with_ignore_case(trimmed, prefix))
    {
        return Some(Mime::new("text/html; charset=utf-8", ".html"));
    }

    if matches!(trimmed.first(), Some(b'{' | b'['))
        && serde_json::from_slice::<IgnoredAny>(trimmed).is_ok()
    {
        return Some(Mime::new("application/json", ".json"));
    }

    Some(Mime::TEXT_PLAIN)
}

/// Control bytes that never appear in text files.
fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

/// Valid UTF-8, allowing a code point cut off by the end of the prefix.
fn is_utf8_prefix(data: &[u8]) -> bool {
    match std::str::from_utf8(data) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn contains_ignore_case(data: &[u8], needle: &[u8]) -> bool {
    data.windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
