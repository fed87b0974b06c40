// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! On-disk header construction and parsing.
//!
//! The header is the 60-byte self-describing record that prefixes every
//! embedded payload. It is identical across all carrier backends:
//!
//! ```text
//! [4 bytes ] magic "ECAP"
//! [1 byte  ] format version (0x01)
//! [1 byte  ] flags (bit 0 = encrypted, bit 1 = randomized positions)
//! [1 byte  ] bits per channel (1 or 2; PNG only, 1 elsewhere)
//! [1 byte  ] channel mask (0b111 = RGB)
//! [4 bytes ] payload length (big-endian u32, equals ciphertext length)
//! [1 byte  ] KDF id (0x01 = scrypt)
//! [1 byte  ] scrypt log2(N) actually used
//! [1 byte  ] scrypt r
//! [1 byte  ] scrypt p
//! [16 bytes] KDF salt
//! [12 bytes] AES-GCM IV
//! [16 bytes] GCM authentication tag
//! ```
//!
//! All multi-byte integers are big-endian. Encoder and decoder must agree on
//! this layout bit for bit; the parser rejects anything it cannot honor
//! rather than attempting best-effort recovery.
//!
//! The parser does not validate `payload_len` against the available
//! ciphertext. That check belongs to the caller that holds the ciphertext
//! slice, because for the PNG backend the ciphertext is not contiguous with
//! the header.

use crate::stego::crypto::{IV_LEN, SALT_LEN, TAG_LEN};
use crate::stego::error::StegoError;

/// Header magic, first four bytes of every embedded record.
pub const MAGIC: [u8; 4] = *b"ECAP";

/// Format version written by this implementation; the only version it reads.
pub const VERSION: u8 = 0x01;

/// Serialized header length in bytes.
pub const HEADER_LEN: usize = 60;

/// Flag bit 0: the payload is encrypted. Always set.
pub const FLAG_ENCRYPTED: u8 = 0b0000_0001;

/// Flag bit 1: payload bits sit at keyed-permuted positions (PNG backend).
pub const FLAG_RANDOMIZED: u8 = 0b0000_0010;

/// Channel mask for the R, G, and B planes. The alpha plane is never used.
pub const CHANNELS_RGB: u8 = 0b0000_0111;

/// KDF id for scrypt, the only KDF this implementation knows.
pub const KDF_SCRYPT: u8 = 0x01;

/// Largest payload length the header may declare.
pub const MAX_PAYLOAD_LEN: u32 = i32::MAX as u32;

/// Lowest scrypt log2(N) the parser accepts.
const LOG_N_PARSE_MIN: u8 = 12;

/// Highest scrypt log2(N) the parser accepts.
const LOG_N_PARSE_MAX: u8 = 20;

/// Parsed (or to-be-serialized) header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// [`FLAG_ENCRYPTED`] and optionally [`FLAG_RANDOMIZED`].
    pub flags: u8,
    /// LSB planes used per RGB byte: 1 or 2.
    pub bits_per_channel: u8,
    /// Always [`CHANNELS_RGB`].
    pub channels_mask: u8,
    /// Plaintext byte length; equals ciphertext length under GCM.
    pub payload_len: u32,
    /// Always [`KDF_SCRYPT`].
    pub kdf: u8,
    /// scrypt log2(N) the encoder actually used.
    pub log_n: u8,
    /// scrypt block size parameter.
    pub r: u8,
    /// scrypt parallelism parameter.
    pub p: u8,
    /// Per-encode random KDF salt.
    pub salt: [u8; SALT_LEN],
    /// Per-encode random AES-GCM IV.
    pub iv: [u8; IV_LEN],
    /// GCM authentication tag over the ciphertext.
    pub tag: [u8; TAG_LEN],
}

/// Serialize a header into its fixed 60-byte layout.
///
/// Field lengths are enforced by the types; `bits_per_channel` outside
/// {1, 2} is a caller bug.
pub fn serialize(h: &Header) -> [u8; HEADER_LEN] {
    debug_assert!(h.bits_per_channel == 1 || h.bits_per_channel == 2, "bits_per_channel out of range");

    let mut out = [0u8; HEADER_LEN];
    out[0..4].copy_from_slice(&MAGIC);
    out[4] = VERSION;
    out[5] = h.flags;
    out[6] = h.bits_per_channel;
    out[7] = h.channels_mask;
    out[8..12].copy_from_slice(&h.payload_len.to_be_bytes());
    out[12] = h.kdf;
    out[13] = h.log_n;
    out[14] = h.r;
    out[15] = h.p;
    out[16..32].copy_from_slice(&h.salt);
    out[32..44].copy_from_slice(&h.iv);
    out[44..60].copy_from_slice(&h.tag);
    out
}

/// Parse and validate a header from the first 60 bytes of `data`.
///
/// # Errors
/// - [`StegoError::BadHeader`] on short input, magic mismatch, or any field
///   out of range.
/// - [`StegoError::UnsupportedVersion`] if the version byte differs from
///   [`VERSION`]. No best-effort parsing of newer versions.
/// - [`StegoError::KdfUnsupported`] if the KDF id is unknown.
pub fn parse(data: &[u8]) -> Result<Header, StegoError> {
    if data.len() < HEADER_LEN {
        return Err(StegoError::BadHeader);
    }
    if data[0..4] != MAGIC {
        return Err(StegoError::BadHeader);
    }
    if data[4] != VERSION {
        return Err(StegoError::UnsupportedVersion(data[4]));
    }
    if data[12] != KDF_SCRYPT {
        return Err(StegoError::KdfUnsupported);
    }

    let bits_per_channel = data[6];
    if bits_per_channel != 1 && bits_per_channel != 2 {
        return Err(StegoError::BadHeader);
    }
    if data[7] != CHANNELS_RGB {
        return Err(StegoError::BadHeader);
    }

    let payload_len = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
    if payload_len > MAX_PAYLOAD_LEN {
        return Err(StegoError::BadHeader);
    }

    let (log_n, r, p) = (data[13], data[14], data[15]);
    if !(LOG_N_PARSE_MIN..=LOG_N_PARSE_MAX).contains(&log_n) || r < 1 || p < 1 {
        return Err(StegoError::BadHeader);
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&data[16..32]);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&data[32..44]);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&data[44..60]);

    Ok(Header {
        flags: data[5],
        bits_per_channel,
        channels_mask: data[7],
        payload_len,
        kdf: data[12],
        log_n,
        r,
        p,
        salt,
        iv,
        tag,
    })
}

/// Convert bytes to a bit vector (MSB first within each byte).
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Convert a bit vector (MSB first) back to bytes.
/// Pads the last byte with zero bits if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}
