// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! Carrier capacity computation.
//!
//! PNG capacity depends on the pixel count and the number of LSB planes in
//! use; JPEG capacity is capped by the u16 segment length field. The WebP and
//! trailer backends append rather than overwrite and are bounded only by the
//! header's payload length field.

use crate::stego::header::HEADER_LEN;

/// RGB bytes reserved at the start of a PNG pixel buffer for the header
/// (60 bytes, one bit per byte LSB).
pub const PNG_HEADER_BITS: usize = HEADER_LEN * 8;

/// Largest JPEG marker segment body: the u16 length field minus its own
/// two bytes.
pub const JPEG_MAX_SEGMENT_BODY: usize = 65_533;

/// Maximum ciphertext bytes a PNG carrier of the given dimensions can hold.
pub fn png_capacity(width: u32, height: u32, bits_per_channel: u8) -> usize {
    let rgb_bytes = width as usize * height as usize * 3;
    if rgb_bytes < PNG_HEADER_BITS {
        return 0;
    }
    (rgb_bytes - PNG_HEADER_BITS) * bits_per_channel as usize / 8
}

/// Maximum ciphertext bytes a JPEG carrier can hold (segment ceiling minus
/// the header).
pub fn jpeg_capacity() -> usize {
    JPEG_MAX_SEGMENT_BODY - HEADER_LEN
}
