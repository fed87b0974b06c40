// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! Carrier detection and format backends.
//!
//! Each backend knows how to place a `header ‖ ciphertext` blob inside one
//! carrier format without breaking it, and how to find the blob again:
//! PNG rewrites pixel LSBs, JPEG inserts an APP15 segment, WebP appends a
//! RIFF chunk, and everything else gets a trailer record.

pub mod jpeg;
pub mod png;
pub mod trailer;
pub mod webp;

/// The closed set of carrier formats the dispatcher routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    Png,
    Jpeg,
    WebP,
    /// Generic append-a-trailer backend, also used for PDF.
    Trailer,
}

/// Eight-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const PDF_MAGIC: &[u8] = b"%PDF-";

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

/// Detect the carrier format, preferring magic bytes over the file extension.
///
/// Precedence: PNG signature, JPEG SOI, RIFF/WEBP, `%PDF-`, then the
/// extension (`png`, `jpg`/`jpeg`, `webp`, `pdf`). Anything unrecognized
/// falls back to the generic trailer backend.
pub fn detect(data: &[u8], ext: Option<&str>) -> CarrierKind {
    if data.starts_with(&PNG_SIGNATURE) {
        return CarrierKind::Png;
    }
    if data.starts_with(&JPEG_SOI) {
        return CarrierKind::Jpeg;
    }
    if is_webp(data) {
        return CarrierKind::WebP;
    }
    if data.starts_with(PDF_MAGIC) {
        return CarrierKind::Trailer;
    }
    match ext
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => CarrierKind::Png,
        Some("jpg") | Some("jpeg") => CarrierKind::Jpeg,
        Some("webp") => CarrierKind::WebP,
        _ => CarrierKind::Trailer,
    }
}
