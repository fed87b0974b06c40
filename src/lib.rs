// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! # ecap-core
//!
//! Steganography engine for hiding short AES-256-GCM-encrypted messages in
//! ordinary carrier files. Four carrier backends:
//!
//! - **PNG**: randomized LSB embedding in the RGB planes. Bit positions are
//!   scattered by a keyed permutation, so they are not guessable from the
//!   ciphertext.
//! - **JPEG**: one APP15 application segment inserted between the existing
//!   marker segments; the compressed image data is untouched.
//! - **WebP**: an extra `ECAP` chunk appended to the RIFF container.
//! - **Anything else** (PDF, arbitrary binary): a signed trailer record.
//!
//! Every payload is prefixed by a self-describing 60-byte header binding the
//! format parameters, the scrypt KDF parameters, and the GCM authentication
//! tag, so [`decode`] needs nothing beyond the carrier bytes and the
//! password. Key derivation is adaptive scrypt (preferred cost logN = 15,
//! stepping down to 12 under memory pressure); the cost actually used is
//! recorded in the header.
//!
//! Lossy re-encoding destroys the payload: a recompressed JPEG or a
//! PNG→JPEG conversion is unrecoverable by design. This engine hides data;
//! it makes no attempt to resist statistical steganalysis.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use ecap_core::{encode, decode};
//!
//! let cover = std::fs::read("photo.png").unwrap();
//! let stego = encode(&cover, "png", b"secret message", b"passphrase").unwrap();
//! let decoded = decode(&stego, b"passphrase").unwrap();
//! assert_eq!(decoded, b"secret message");
//! ```

pub mod carrier;
pub mod stego;

pub use carrier::{detect, CarrierKind};
pub use stego::{decode, decode_with, encode, encode_with, estimate_capacity};
pub use stego::{CancelToken, DecodeOptions, EncodeOptions, StegoError, MAX_PIXELS};
