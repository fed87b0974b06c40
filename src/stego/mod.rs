// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! Steganographic encoding and decoding.
//!
//! [`encode`] runs KDF → AEAD → header build → backend embed; [`decode`]
//! runs backend extract → header parse → KDF with the stored parameters →
//! AEAD decrypt. Both are pure functions of their inputs: no process-wide
//! state, no locks, no I/O. Callers may run any number of them in parallel
//! on independent inputs.

pub mod cancel;
pub mod capacity;
pub mod crypto;
pub mod error;
pub mod header;
mod pipeline;
pub mod prng;

pub use cancel::CancelToken;
pub use error::StegoError;
pub use pipeline::{decode, decode_with, encode, encode_with, estimate_capacity};

/// Default ceiling on decoded pixel count (width × height) for PNG carriers.
/// Bounds the largest transient allocation apart from the scrypt buffer.
pub const MAX_PIXELS: u64 = 256_000_000;

/// Encode-side tunables.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// LSB planes per RGB byte for the PNG backend: 1 (default) or 2.
    /// Ignored by the other backends. Two planes double the capacity at the
    /// cost of more visible noise.
    pub bits_per_channel: u8,
    /// Decoded pixel-count ceiling for PNG carriers.
    pub max_pixels: u64,
    /// Optional cancellation token, checked around the expensive steps.
    pub cancel: Option<CancelToken>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            bits_per_channel: 1,
            max_pixels: MAX_PIXELS,
            cancel: None,
        }
    }
}

/// Decode-side tunables.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Decoded pixel-count ceiling for PNG carriers.
    pub max_pixels: u64,
    /// Optional cancellation token, checked around the expensive steps.
    pub cancel: Option<CancelToken>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_pixels: MAX_PIXELS,
            cancel: None,
        }
    }
}
