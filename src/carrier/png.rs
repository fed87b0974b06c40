// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! PNG randomized-LSB backend.
//!
//! The carrier is decoded to an RGBA pixel buffer (palette and grayscale
//! images are normalized to RGBA first). The 60-byte header goes into the
//! LSBs of the first 480 R/G/B bytes in raster order, deterministically, so
//! the decoder can read it before any key material exists. Payload bits go
//! into the remaining R/G/B bytes at positions shuffled by the keyed PRNG,
//! one or two LSB planes per byte. The alpha plane is never touched, and the
//! buffer is re-encoded as an RGBA PNG of the original dimensions.
//!
//! Encoder and decoder must build the identical position list and consume it
//! in the identical permuted order; any divergence makes the payload
//! unrecoverable.

use std::io::Cursor;

use image::ImageFormat;

use crate::stego::capacity::{png_capacity, PNG_HEADER_BITS};
use crate::stego::error::StegoError;
use crate::stego::header::{self, Header, HEADER_LEN};
use crate::stego::prng::{self, PermuteRng};

/// One payload bit position: an RGBA buffer byte offset and an LSB plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPos {
    pub byte_index: usize,
    pub plane: u8,
}

/// A decoded RGBA pixel buffer.
pub struct PixelBuffer {
    /// `width * height * 4` bytes, RGBA per pixel in raster order.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PixelBuffer {
    /// Number of R/G/B bytes (alpha excluded).
    pub fn rgb_byte_count(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Byte offset of the `i`-th R/G/B byte in raster order, skipping alpha.
fn rgb_offset(i: usize) -> usize {
    (i / 3) * 4 + i % 3
}

/// Decode a PNG carrier into an RGBA pixel buffer.
///
/// # Errors
/// - [`StegoError::CarrierMalformed`] if the bytes do not decode.
/// - [`StegoError::CarrierTooLarge`] if the pixel count exceeds `max_pixels`.
pub fn decode_rgba(data: &[u8], max_pixels: u64) -> Result<PixelBuffer, StegoError> {
    let img = image::load_from_memory(data)
        .map_err(|_| StegoError::CarrierMalformed("PNG decode failed"))?;
    let (width, height) = (img.width(), img.height());
    if width as u64 * height as u64 > max_pixels {
        return Err(StegoError::CarrierTooLarge);
    }
    let rgba = img.to_rgba8();
    Ok(PixelBuffer {
        pixels: rgba.into_raw(),
        width,
        height,
    })
}

/// Re-encode the pixel buffer as an RGBA PNG, preserving dimensions.
pub fn encode_rgba(buf: PixelBuffer) -> Result<Vec<u8>, StegoError> {
    let img = image::RgbaImage::from_raw(buf.width, buf.height, buf.pixels)
        .expect("pixel buffer matches dimensions");
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|_| StegoError::CarrierMalformed("PNG encode failed"))?;
    Ok(out.into_inner())
}

/// Write the header bits into the LSBs of the first 480 RGB bytes,
/// MSB-first (header byte 0 bit 7 lands in the first R byte).
fn write_header(pixels: &mut [u8], header_bytes: &[u8; HEADER_LEN]) {
    for (i, bit) in header::bytes_to_bits(header_bytes).into_iter().enumerate() {
        let off = rgb_offset(i);
        pixels[off] = (pixels[off] & !1) | bit;
    }
}

/// Read and parse the header from the deterministic LSB positions.
///
/// # Errors
/// - [`StegoError::NoPayload`] when the magic is absent: plain LSB noise is
///   not a malformed record, this backend simply holds nothing.
/// - Parse errors ([`StegoError::BadHeader`] etc.) when the magic is present
///   but the record does not validate.
pub fn read_header(buf: &PixelBuffer) -> Result<Header, StegoError> {
    if buf.rgb_byte_count() < PNG_HEADER_BITS {
        return Err(StegoError::CarrierTooSmall);
    }
    let mut bits = Vec::with_capacity(PNG_HEADER_BITS);
    for i in 0..PNG_HEADER_BITS {
        bits.push(buf.pixels[rgb_offset(i)] & 1);
    }
    let bytes = header::bits_to_bytes(&bits);
    if bytes[..4] != header::MAGIC {
        return Err(StegoError::NoPayload);
    }
    header::parse(&bytes)
}

/// Build the payload bit-position list: the RGB bytes after the header
/// region, plane 0 each, plus plane 1 when two bits per channel are in use.
fn payload_positions(buf: &PixelBuffer, bits_per_channel: u8) -> Vec<BitPos> {
    let total = buf.rgb_byte_count();
    let mut positions =
        Vec::with_capacity((total - PNG_HEADER_BITS) * bits_per_channel as usize);
    for i in PNG_HEADER_BITS..total {
        let byte_index = rgb_offset(i);
        positions.push(BitPos { byte_index, plane: 0 });
        if bits_per_channel == 2 {
            positions.push(BitPos { byte_index, plane: 1 });
        }
    }
    positions
}

fn permuted_positions(
    buf: &PixelBuffer,
    bits_per_channel: u8,
    permute_key: &[u8; 32],
) -> Vec<BitPos> {
    let mut positions = payload_positions(buf, bits_per_channel);
    let mut rng = PermuteRng::new(permute_key);
    prng::shuffle(&mut positions, &mut rng);
    positions
}

/// Write the ciphertext bit by bit, MSB-first, at the permuted positions.
fn write_payload(pixels: &mut [u8], positions: &[BitPos], ciphertext: &[u8]) {
    for (bit_idx, bit) in header::bytes_to_bits(ciphertext).into_iter().enumerate() {
        let BitPos { byte_index, plane } = positions[bit_idx];
        let mask = 1u8 << plane;
        pixels[byte_index] = (pixels[byte_index] & !mask) | (bit << plane);
    }
}

/// Read `len` ciphertext bytes back from the permuted positions.
fn read_payload(pixels: &[u8], positions: &[BitPos], len: usize) -> Vec<u8> {
    let mut bits = Vec::with_capacity(len * 8);
    for pos in positions.iter().take(len * 8) {
        bits.push((pixels[pos.byte_index] >> pos.plane) & 1);
    }
    header::bits_to_bytes(&bits)
}

/// Embed `header_bytes ‖ ciphertext` into the carrier and re-encode it.
///
/// # Errors
/// - [`StegoError::CarrierTooSmall`] if the header or ciphertext do not fit.
/// - [`StegoError::CarrierMalformed`] / [`StegoError::CarrierTooLarge`] from
///   decoding the carrier.
pub fn embed(
    carrier: &[u8],
    header_bytes: &[u8; HEADER_LEN],
    ciphertext: &[u8],
    permute_key: &[u8; 32],
    bits_per_channel: u8,
    max_pixels: u64,
) -> Result<Vec<u8>, StegoError> {
    let mut buf = decode_rgba(carrier, max_pixels)?;
    if buf.rgb_byte_count() < PNG_HEADER_BITS {
        return Err(StegoError::CarrierTooSmall);
    }
    if ciphertext.len() > png_capacity(buf.width, buf.height, bits_per_channel) {
        return Err(StegoError::CarrierTooSmall);
    }

    write_header(&mut buf.pixels, header_bytes);
    let positions = permuted_positions(&buf, bits_per_channel, permute_key);
    write_payload(&mut buf.pixels, &positions, ciphertext);
    encode_rgba(buf)
}

/// Read the ciphertext named by a parsed header out of the pixel buffer.
///
/// # Errors
/// [`StegoError::BadHeader`] if the declared payload length exceeds what the
/// buffer can hold; such a header cannot have been written by this backend.
pub fn extract_ciphertext(
    buf: &PixelBuffer,
    hdr: &Header,
    permute_key: &[u8; 32],
) -> Result<Vec<u8>, StegoError> {
    if hdr.payload_len as usize > png_capacity(buf.width, buf.height, hdr.bits_per_channel) {
        return Err(StegoError::BadHeader);
    }
    let positions = permuted_positions(buf, hdr.bits_per_channel, permute_key);
    Ok(read_payload(&buf.pixels, &positions, hdr.payload_len as usize))
}
