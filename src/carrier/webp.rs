// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! WebP (RIFF) chunk backend.
//!
//! Appends an `ECAP` chunk to the RIFF body and patches the container size
//! field. Chunk sizes are little-endian and an odd-sized chunk body carries
//! one zero pad byte, per the RIFF container rules. WebP readers skip chunks
//! they do not recognize, so the image stays displayable.

use crate::stego::error::StegoError;

/// FourCC of the chunk carrying the embedded blob.
pub const CHUNK_FOURCC: &[u8; 4] = b"ECAP";

const RIFF_HEADER_LEN: usize = 12;

fn check_signature(data: &[u8]) -> Result<(), StegoError> {
    if data.len() < RIFF_HEADER_LEN || &data[..4] != b"RIFF" || &data[8..12] != b"WEBP" {
        return Err(StegoError::CarrierMalformed("missing RIFF/WEBP signature"));
    }
    Ok(())
}

/// Append an `ECAP` chunk carrying `blob` and rewrite the RIFF size.
pub fn embed(carrier: &[u8], blob: &[u8]) -> Result<Vec<u8>, StegoError> {
    check_signature(carrier)?;

    let mut out = Vec::with_capacity(carrier.len() + 8 + blob.len() + 1);
    out.extend_from_slice(carrier);
    out.extend_from_slice(CHUNK_FOURCC);
    out.extend_from_slice(&(blob.len() as u32).to_le_bytes());
    out.extend_from_slice(blob);
    if blob.len() % 2 == 1 {
        out.push(0);
    }

    // RIFF size counts everything after the size field itself.
    let riff_size = (out.len() - 8) as u32;
    out[4..8].copy_from_slice(&riff_size.to_le_bytes());
    Ok(out)
}

/// Walk the chunk list and return the body of the first `ECAP` chunk.
///
/// # Errors
/// - [`StegoError::CarrierMalformed`] if a chunk overruns the buffer.
/// - [`StegoError::NoPayload`] if no `ECAP` chunk exists.
pub fn extract(carrier: &[u8]) -> Result<Vec<u8>, StegoError> {
    check_signature(carrier)?;

    let mut pos = RIFF_HEADER_LEN;
    while pos + 8 <= carrier.len() {
        let fourcc = &carrier[pos..pos + 4];
        let size = u32::from_le_bytes([
            carrier[pos + 4],
            carrier[pos + 5],
            carrier[pos + 6],
            carrier[pos + 7],
        ]) as usize;
        let body_start = pos + 8;
        if body_start + size > carrier.len() {
            return Err(StegoError::CarrierMalformed("truncated RIFF chunk"));
        }
        if fourcc == CHUNK_FOURCC {
            return Ok(carrier[body_start..body_start + size].to_vec());
        }
        pos = body_start + size + (size & 1);
    }
    Err(StegoError::NoPayload)
}
