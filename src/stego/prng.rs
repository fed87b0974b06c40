// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! Keyed position permutation.
//!
//! A counter-mode HMAC-SHA-256 byte stream drives a Fisher-Yates shuffle so
//! that payload bits land at positions which cannot be predicted without the
//! key. Encoder and decoder derive the PRNG key the same way
//! (`HMAC(payload_key, "ECAP-PERMUTE")`) and therefore produce the identical
//! permutation.
//!
//! Stream construction: block `i` is `HMAC-SHA256(key, be32(i))`, consumed
//! byte by byte; `next_u32` concatenates four stream bytes big-endian.
//!
//! # Cross-platform portability
//!
//! The shuffle draws `u32` values, never `usize`, so the permutation is
//! identical on 32-bit and 64-bit targets.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::stego::crypto::KEY_LEN;

type HmacSha256 = Hmac<Sha256>;

const BLOCK_LEN: usize = 32;

/// Deterministic keyed byte stream for position permutation.
pub struct PermuteRng {
    key: Zeroizing<[u8; KEY_LEN]>,
    counter: u32,
    buffer: [u8; BLOCK_LEN],
    pos: usize,
}

impl PermuteRng {
    /// Create a stream with the counter at zero.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(*key),
            counter: 0,
            buffer: [0u8; BLOCK_LEN],
            pos: BLOCK_LEN, // force a refill on first read
        }
    }

    fn refill(&mut self) {
        let mut mac = HmacSha256::new_from_slice(&*self.key).expect("HMAC accepts any key length");
        mac.update(&self.counter.to_be_bytes());
        self.buffer.copy_from_slice(&mac.finalize().into_bytes());
        self.counter = self.counter.wrapping_add(1);
        self.pos = 0;
    }

    /// Next stream byte.
    pub fn next_byte(&mut self) -> u8 {
        if self.pos == BLOCK_LEN {
            self.refill();
        }
        let byte = self.buffer[self.pos];
        self.pos += 1;
        byte
    }

    /// Next four stream bytes, big-endian.
    pub fn next_u32(&mut self) -> u32 {
        u32::from_be_bytes([self.next_byte(), self.next_byte(), self.next_byte(), self.next_byte()])
    }
}

/// Fisher-Yates shuffle driven by the keyed stream.
///
/// For `i` from `len - 1` down to 1, swaps `items[i]` with
/// `items[next_u32() mod (i + 1)]`. Deterministic for a given key and length.
pub fn shuffle<T>(items: &mut [T], rng: &mut PermuteRng) {
    for i in (1..items.len()).rev() {
        let j = rng.next_u32() as usize % (i + 1);
        items.swap(i, j);
    }
}
