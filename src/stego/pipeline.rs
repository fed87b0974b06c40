// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! Encode/decode pipelines and the carrier dispatcher.
//!
//! Encode routes to exactly one backend and fails there; it never falls back
//! (a PNG without capacity is an error, not a silent trailer append). Decode
//! routes by detection first, then tries the blob-bearing backends in
//! JPEG → WebP → Trailer order and returns the first success.
//!
//! When every backend has failed, the most meaningful error wins: a backend
//! that authenticated nothing ranks below one that found a real header but
//! could not decrypt it, so a wrong password surfaces as [`StegoError::AuthFail`]
//! rather than `NoPayload`.

use rand::RngCore;

use crate::carrier::{self, jpeg, png, trailer, webp, CarrierKind};
use crate::stego::cancel::CancelToken;
use crate::stego::capacity;
use crate::stego::crypto::{self, IV_LEN, SALT_LEN};
use crate::stego::error::StegoError;
use crate::stego::header::{self, Header, HEADER_LEN, MAX_PAYLOAD_LEN};
use crate::stego::{DecodeOptions, EncodeOptions};

fn check_cancel(cancel: &Option<CancelToken>) -> Result<(), StegoError> {
    match cancel {
        Some(token) => token.check(),
        None => Ok(()),
    }
}

/// Hide `plaintext` in `carrier`, returning the new carrier bytes.
///
/// The backend is chosen by magic bytes, falling back to `carrier_ext`
/// (see [`carrier::detect`]). Equivalent to [`encode_with`] with default
/// options: one LSB plane, default pixel ceiling, no cancellation.
pub fn encode(
    carrier: &[u8],
    carrier_ext: &str,
    plaintext: &[u8],
    password: &[u8],
) -> Result<Vec<u8>, StegoError> {
    encode_with(carrier, carrier_ext, plaintext, password, &EncodeOptions::default())
}

/// Hide `plaintext` in `carrier` with explicit options.
///
/// # Errors
/// - [`StegoError::CarrierUnrecognized`] for an empty carrier.
/// - [`StegoError::CarrierTooSmall`] / [`StegoError::JpegSegmentOverflow`]
///   when the message does not fit; encode never falls back to another
///   backend.
/// - [`StegoError::CarrierMalformed`] when the detected format fails to parse.
/// - [`StegoError::Cancelled`] if the token in `opts` was tripped.
pub fn encode_with(
    carrier: &[u8],
    carrier_ext: &str,
    plaintext: &[u8],
    password: &[u8],
    opts: &EncodeOptions,
) -> Result<Vec<u8>, StegoError> {
    if carrier.is_empty() {
        return Err(StegoError::CarrierUnrecognized);
    }
    if opts.bits_per_channel != 1 && opts.bits_per_channel != 2 {
        return Err(StegoError::BadHeader);
    }
    if plaintext.len() as u64 > MAX_PAYLOAD_LEN as u64 {
        return Err(StegoError::CarrierTooSmall);
    }

    let kind = carrier::detect(carrier, Some(carrier_ext));
    check_cancel(&opts.cancel)?;

    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut iv);

    let (key, log_n_used) = crypto::derive_key_adaptive(password, &salt)?;
    check_cancel(&opts.cancel)?;

    let (ciphertext, tag) = crypto::encrypt(&key, &iv, plaintext);

    let randomized = kind == CarrierKind::Png;
    let bits_per_channel = if randomized { opts.bits_per_channel } else { 1 };
    let hdr = Header {
        flags: header::FLAG_ENCRYPTED | if randomized { header::FLAG_RANDOMIZED } else { 0 },
        bits_per_channel,
        channels_mask: header::CHANNELS_RGB,
        payload_len: plaintext.len() as u32,
        kdf: header::KDF_SCRYPT,
        log_n: log_n_used,
        r: crypto::SCRYPT_R,
        p: crypto::SCRYPT_P,
        salt,
        iv,
        tag,
    };
    let header_bytes = header::serialize(&hdr);

    match kind {
        CarrierKind::Png => {
            let permute_key = crypto::derive_permute_key(&key);
            check_cancel(&opts.cancel)?;
            png::embed(
                carrier,
                &header_bytes,
                &ciphertext,
                &permute_key,
                bits_per_channel,
                opts.max_pixels,
            )
        }
        CarrierKind::Jpeg => jpeg::embed(carrier, &blob(&header_bytes, &ciphertext)),
        CarrierKind::WebP => webp::embed(carrier, &blob(&header_bytes, &ciphertext)),
        CarrierKind::Trailer => Ok(trailer::embed(carrier, &blob(&header_bytes, &ciphertext))),
    }
}

/// Recover the plaintext hidden in `carrier`.
///
/// Detection runs on magic bytes alone. A carrier that is both a valid PNG
/// and carries a trailer record yields the PNG payload: the PNG path is
/// tried first and wins.
pub fn decode(carrier: &[u8], password: &[u8]) -> Result<Vec<u8>, StegoError> {
    decode_with(carrier, password, &DecodeOptions::default())
}

/// Recover the plaintext hidden in `carrier` with explicit options.
///
/// # Errors
/// - [`StegoError::AuthFail`] if a header was found but the password is
///   wrong or the data was tampered with.
/// - [`StegoError::NoPayload`] if no backend found a header-bearing blob.
/// - [`StegoError::Cancelled`] if the token in `opts` was tripped.
pub fn decode_with(
    carrier: &[u8],
    password: &[u8],
    opts: &DecodeOptions,
) -> Result<Vec<u8>, StegoError> {
    if carrier.is_empty() {
        return Err(StegoError::CarrierUnrecognized);
    }

    let mut best: Option<StegoError> = None;

    if carrier::detect(carrier, None) == CarrierKind::Png {
        match decode_png(carrier, password, opts) {
            Ok(plaintext) => return Ok(plaintext),
            Err(StegoError::Cancelled) => return Err(StegoError::Cancelled),
            Err(e) => note(&mut best, e),
        }
    }

    // Blob-bearing backends, in fixed fallback order.
    let extractors: [fn(&[u8]) -> Result<Vec<u8>, StegoError>; 3] =
        [jpeg::extract, webp::extract, trailer::extract];
    for extract in extractors {
        match extract(carrier) {
            Ok(blob) => match open_blob(&blob, password, opts) {
                Ok(plaintext) => return Ok(plaintext),
                Err(StegoError::Cancelled) => return Err(StegoError::Cancelled),
                Err(e) => note(&mut best, e),
            },
            Err(e) => note(&mut best, e),
        }
    }

    Err(best.unwrap_or(StegoError::NoPayload))
}

/// Remember the most meaningful failure across backends.
///
/// Ranking: `AuthFail` (a header authenticated this far) over
/// `UnsupportedVersion`/`KdfUnsupported` (a header was found) over
/// `BadHeader` (bytes resembling a record) over everything else, which
/// collapses to `NoPayload`.
fn note(best: &mut Option<StegoError>, e: StegoError) {
    fn rank(e: &StegoError) -> u8 {
        match e {
            StegoError::AuthFail => 4,
            StegoError::UnsupportedVersion(_) => 3,
            StegoError::KdfUnsupported => 2,
            StegoError::BadHeader => 1,
            _ => 0,
        }
    }
    if rank(&e) > best.as_ref().map_or(0, rank) {
        *best = Some(e);
    }
}

/// Full PNG decode path: header from fixed LSB positions, key from the
/// stored parameters, ciphertext from the keyed permutation, then decrypt.
fn decode_png(
    carrier: &[u8],
    password: &[u8],
    opts: &DecodeOptions,
) -> Result<Vec<u8>, StegoError> {
    let buf = png::decode_rgba(carrier, opts.max_pixels)?;
    let hdr = png::read_header(&buf)?;
    check_cancel(&opts.cancel)?;
    let key = crypto::derive_key_fixed(password, &hdr.salt, hdr.log_n, hdr.r, hdr.p)?;
    check_cancel(&opts.cancel)?;
    let permute_key = crypto::derive_permute_key(&key);
    let ciphertext = png::extract_ciphertext(&buf, &hdr, &permute_key)?;
    crypto::decrypt(&key, &hdr.iv, &ciphertext, &hdr.tag)
}

/// Decrypt a contiguous `header ‖ ciphertext` blob from a non-PNG backend.
fn open_blob(
    blob: &[u8],
    password: &[u8],
    opts: &DecodeOptions,
) -> Result<Vec<u8>, StegoError> {
    let hdr = header::parse(blob)?;
    let end = HEADER_LEN + hdr.payload_len as usize;
    if blob.len() < end {
        return Err(StegoError::BadHeader);
    }
    check_cancel(&opts.cancel)?;
    let key = crypto::derive_key_fixed(password, &hdr.salt, hdr.log_n, hdr.r, hdr.p)?;
    check_cancel(&opts.cancel)?;
    crypto::decrypt(&key, &hdr.iv, &blob[HEADER_LEN..end], &hdr.tag)
}

fn blob(header_bytes: &[u8; HEADER_LEN], ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(header_bytes);
    out.extend_from_slice(ciphertext);
    out
}

/// Maximum plaintext bytes the carrier can hold, without encoding anything.
///
/// PNG capacity depends on the decoded dimensions and the requested LSB
/// plane count; JPEG is capped by the segment length field; the WebP and
/// trailer backends append and are bounded only by the header's length
/// field.
pub fn estimate_capacity(
    carrier: &[u8],
    carrier_ext: &str,
    opts: &EncodeOptions,
) -> Result<usize, StegoError> {
    match carrier::detect(carrier, Some(carrier_ext)) {
        CarrierKind::Png => {
            let buf = png::decode_rgba(carrier, opts.max_pixels)?;
            Ok(capacity::png_capacity(buf.width, buf.height, opts.bits_per_channel))
        }
        CarrierKind::Jpeg => Ok(capacity::jpeg_capacity()),
        CarrierKind::WebP | CarrierKind::Trailer => Ok(MAX_PAYLOAD_LEN as usize),
    }
}
