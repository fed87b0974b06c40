// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! JPEG APP15 segment backend.
//!
//! Walks the marker segments from SOI and inserts one APP15 (0xFFEF) segment
//! carrying the blob before the first SOS, EOI, or restart marker. Decoders
//! ignore unknown APPn segments, so the image renders byte-identically.
//! Extraction walks the same way and returns the first APP15 body with the
//! `ECAP` prefix. The entropy-coded scan data is never parsed or touched.
//!
//! Segment lengths are big-endian and include the two length bytes
//! themselves, per the JPEG convention, which caps a segment body at
//! 65,533 bytes.

use crate::stego::capacity::JPEG_MAX_SEGMENT_BODY;
use crate::stego::error::StegoError;
use crate::stego::header::MAGIC;

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP15: u8 = 0xEF;

fn is_rst(marker: u8) -> bool {
    (0xD0..=0xD7).contains(&marker)
}

/// Walk marker segments from offset 2, calling `visit` with each
/// length-carrying segment's marker code and body. Returns the byte offset
/// of the first SOS/EOI/restart marker, where new segments may be inserted.
fn walk_segments(
    data: &[u8],
    mut visit: impl FnMut(u8, &[u8]),
) -> Result<usize, StegoError> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != SOI {
        return Err(StegoError::CarrierMalformed("missing JPEG SOI marker"));
    }

    let mut pos = 2;
    loop {
        if pos + 2 > data.len() {
            return Err(StegoError::CarrierMalformed("truncated JPEG marker stream"));
        }
        if data[pos] != 0xFF {
            return Err(StegoError::CarrierMalformed("expected JPEG marker"));
        }

        // Skip 0xFF fill bytes before the marker code.
        let mut code_at = pos + 1;
        while code_at < data.len() && data[code_at] == 0xFF {
            code_at += 1;
        }
        if code_at >= data.len() {
            return Err(StegoError::CarrierMalformed("truncated JPEG marker stream"));
        }

        let marker = data[code_at];
        if marker == SOS || marker == EOI || is_rst(marker) {
            return Ok(pos);
        }

        if code_at + 3 > data.len() {
            return Err(StegoError::CarrierMalformed("truncated JPEG marker stream"));
        }
        let length = u16::from_be_bytes([data[code_at + 1], data[code_at + 2]]) as usize;
        if length < 2 || code_at + 1 + length > data.len() {
            return Err(StegoError::CarrierMalformed("invalid JPEG segment length"));
        }
        visit(marker, &data[code_at + 3..code_at + 1 + length]);
        pos = code_at + 1 + length;
    }
}

/// Insert an APP15 segment carrying `blob` before the first non-app segment.
///
/// # Errors
/// - [`StegoError::JpegSegmentOverflow`] if `blob` exceeds 65,533 bytes.
/// - [`StegoError::CarrierMalformed`] on a broken marker stream.
pub fn embed(carrier: &[u8], blob: &[u8]) -> Result<Vec<u8>, StegoError> {
    if blob.len() > JPEG_MAX_SEGMENT_BODY {
        return Err(StegoError::JpegSegmentOverflow);
    }
    let insert_at = walk_segments(carrier, |_, _| {})?;

    let mut out = Vec::with_capacity(carrier.len() + 4 + blob.len());
    out.extend_from_slice(&carrier[..insert_at]);
    out.push(0xFF);
    out.push(APP15);
    out.extend_from_slice(&((blob.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(blob);
    out.extend_from_slice(&carrier[insert_at..]);
    Ok(out)
}

/// Scan APP15 segments for an `ECAP`-prefixed body.
///
/// # Errors
/// - [`StegoError::CarrierMalformed`] on a broken marker stream.
/// - [`StegoError::NoPayload`] if no matching segment exists.
pub fn extract(carrier: &[u8]) -> Result<Vec<u8>, StegoError> {
    let mut found: Option<Vec<u8>> = None;
    walk_segments(carrier, |marker, body| {
        if found.is_none() && marker == APP15 && body.len() >= MAGIC.len() && body[..4] == MAGIC {
            found = Some(body.to_vec());
        }
    })?;
    found.ok_or(StegoError::NoPayload)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal structurally-valid JPEG: SOI, APP0/JFIF, SOS, scan bytes, EOI.
    fn minimal_jpeg() -> Vec<u8> {
        let mut out = vec![0xFF, 0xD8];
        out.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        out.extend_from_slice(b"JFIF\0");
        out.extend_from_slice(&[0x01, 0x02, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
        out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        out.extend_from_slice(&[0x12, 0x34, 0x56]);
        out.extend_from_slice(&[0xFF, 0xD9]);
        out
    }

    fn ecap_blob(ciphertext_len: usize) -> Vec<u8> {
        let mut blob = MAGIC.to_vec();
        blob.resize(60, 0x01);
        blob.extend((0..ciphertext_len).map(|i| i as u8));
        blob
    }

    #[test]
    fn embed_extract_roundtrip() {
        let carrier = minimal_jpeg();
        let blob = ecap_blob(100);
        let out = embed(&carrier, &blob).unwrap();
        assert_eq!(extract(&out).unwrap(), blob);
    }

    #[test]
    fn segment_inserted_before_sos() {
        let carrier = minimal_jpeg();
        let blob = ecap_blob(4);
        let out = embed(&carrier, &blob).unwrap();

        // Everything before the SOS marker is preserved, the APP15 segment
        // follows, then the original tail byte-identically.
        let sos_at = carrier.windows(2).position(|w| w == [0xFF, 0xDA]).unwrap();
        assert_eq!(&out[..sos_at], &carrier[..sos_at]);
        assert_eq!(out[sos_at], 0xFF);
        assert_eq!(out[sos_at + 1], 0xEF);
        let seg_len = u16::from_be_bytes([out[sos_at + 2], out[sos_at + 3]]) as usize;
        assert_eq!(seg_len, blob.len() + 2);
        assert_eq!(&out[sos_at + 4..sos_at + 4 + blob.len()], &blob[..]);
        assert_eq!(&out[sos_at + 4 + blob.len()..], &carrier[sos_at..]);
    }

    #[test]
    fn segment_ceiling_enforced() {
        let carrier = minimal_jpeg();
        assert!(embed(&carrier, &vec![0u8; JPEG_MAX_SEGMENT_BODY]).is_ok());
        assert_eq!(
            embed(&carrier, &vec![0u8; JPEG_MAX_SEGMENT_BODY + 1]),
            Err(StegoError::JpegSegmentOverflow)
        );
    }

    #[test]
    fn foreign_app15_is_skipped() {
        // An APP15 segment without the ECAP prefix must not be returned.
        let mut carrier = vec![0xFF, 0xD8];
        carrier.extend_from_slice(&[0xFF, 0xEF, 0x00, 0x06]);
        carrier.extend_from_slice(b"misc");
        carrier.extend_from_slice(&minimal_jpeg()[2..]);

        assert_eq!(extract(&carrier), Err(StegoError::NoPayload));

        let blob = ecap_blob(8);
        let out = embed(&carrier, &blob).unwrap();
        assert_eq!(extract(&out).unwrap(), blob);
    }

    #[test]
    fn missing_soi_is_malformed() {
        assert!(matches!(
            embed(b"PNG data, say", b"x"),
            Err(StegoError::CarrierMalformed(_))
        ));
    }

    #[test]
    fn truncated_segment_is_malformed() {
        // APP0 claims 0x0100 bytes but the stream ends early.
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x00, 0x41, 0x42];
        assert!(matches!(extract(&data), Err(StegoError::CarrierMalformed(_))));
    }

    #[test]
    fn clean_jpeg_has_no_payload() {
        assert_eq!(extract(&minimal_jpeg()), Err(StegoError::NoPayload));
    }

    #[test]
    fn fill_bytes_before_marker_tolerated() {
        // 0xFF fill before the SOS marker code.
        let mut carrier = vec![0xFF, 0xD8];
        carrier.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xDA, 0x00, 0x04, 0x00, 0x00]);
        carrier.extend_from_slice(&[0xFF, 0xD9]);
        let blob = ecap_blob(2);
        let out = embed(&carrier, &blob).unwrap();
        assert_eq!(extract(&out).unwrap(), blob);
    }
}
