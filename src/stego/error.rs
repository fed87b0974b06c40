// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! Error types for the embedding pipeline.
//!
//! [`StegoError`] covers all failure modes from carrier detection through
//! key derivation, encryption, and extraction.

use core::fmt;

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// Carrier detection fell through and the chosen backend cannot proceed.
    CarrierUnrecognized,
    /// Format-specific structural parse failed (bad PNG, truncated JPEG
    /// markers, broken RIFF chunk list, ...).
    CarrierMalformed(&'static str),
    /// The carrier has insufficient capacity for the header and/or ciphertext.
    CarrierTooSmall,
    /// The decoded pixel count exceeds the configured ceiling.
    CarrierTooLarge,
    /// Header plus ciphertext exceed the 65,533-byte JPEG segment limit.
    JpegSegmentOverflow,
    /// No header-bearing blob was found in any backend during decode.
    NoPayload,
    /// Magic mismatch, inconsistent length fields, or a field out of range.
    BadHeader,
    /// The header declares a format version this implementation does not handle.
    UnsupportedVersion(u8),
    /// The header names an unknown KDF, or no acceptable scrypt parameter set
    /// fits the memory budget.
    KdfUnsupported,
    /// GCM tag mismatch: wrong password or tampered data (not distinguished).
    AuthFail,
    /// The operation was cancelled by the caller.
    Cancelled,
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CarrierUnrecognized => write!(f, "carrier format not recognized"),
            Self::CarrierMalformed(msg) => write!(f, "malformed carrier: {msg}"),
            Self::CarrierTooSmall => write!(f, "carrier too small for the message"),
            Self::CarrierTooLarge => write!(f, "carrier exceeds the decoded-pixel ceiling"),
            Self::JpegSegmentOverflow => {
                write!(f, "message does not fit in a JPEG segment (65,533 bytes); use a PNG carrier")
            }
            Self::NoPayload => write!(f, "no embedded payload found"),
            Self::BadHeader => write!(f, "embedded header is invalid"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported format version {v}"),
            Self::KdfUnsupported => write!(f, "unsupported key derivation parameters"),
            Self::AuthFail => write!(f, "decryption failed (wrong password or tampered data)"),
            Self::Cancelled => write!(f, "operation cancelled by caller"),
        }
    }
}

impl std::error::Error for StegoError {}
