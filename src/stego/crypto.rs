// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! Cryptographic primitives: adaptive scrypt key derivation and AES-256-GCM.
//!
//! Key derivation is asymmetric between the two directions:
//!
//! - **Encode** runs an adaptive parameter search: it starts at the preferred
//!   cost (logN = 15) and steps logN down whenever the parameter set would
//!   exceed the 512 MiB working-memory budget or is rejected by the scrypt
//!   implementation, stopping at the logN = 12 floor. The cost actually used
//!   is recorded in the header.
//!
//! - **Decode** derives once with the parameters stored in the header, no
//!   search. Both sides therefore reach the identical 32-byte key.
//!
//! Encryption is AES-256-GCM with a 12-byte IV and a detached 16-byte tag;
//! the tag travels in the header, the ciphertext has exactly the plaintext
//! length. No associated data is bound: the header is validated structurally
//! before decryption, which keeps the on-disk format bit-compatible across
//! implementations.
//!
//! All derived key material lives in [`Zeroizing`] buffers so it is wiped on
//! every exit path, including errors and cancellation. The password itself is
//! only ever borrowed from the caller.

use aes_gcm::aead::KeyInit;
use aes_gcm::{AeadInPlace, Aes256Gcm, Nonce, Tag};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::stego::error::StegoError;

type HmacSha256 = Hmac<Sha256>;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;
/// scrypt salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-GCM IV length in bytes.
pub const IV_LEN: usize = 12;
/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Preferred scrypt cost at encode time.
pub const SCRYPT_LOG_N_PREFERRED: u8 = 15;
/// Lowest cost the adaptive search will fall back to.
pub const SCRYPT_LOG_N_FLOOR: u8 = 12;
/// scrypt block size parameter.
pub const SCRYPT_R: u8 = 8;
/// scrypt parallelism parameter.
pub const SCRYPT_P: u8 = 1;
/// scrypt working-memory budget per derivation.
pub const SCRYPT_MEM_LIMIT: u64 = 512 * 1024 * 1024;

/// HMAC label separating the permutation PRNG key from the payload key.
pub const PERMUTE_LABEL: &[u8] = b"ECAP-PERMUTE";

/// scrypt working memory in bytes for a given parameter set: `128 * r * N`.
fn scrypt_mem_bytes(log_n: u8, r: u8) -> u64 {
    128 * r as u64 * (1u64 << log_n)
}

fn derive_once(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    log_n: u8,
    r: u8,
    p: u8,
) -> Result<Zeroizing<[u8; KEY_LEN]>, StegoError> {
    let params = scrypt::Params::new(log_n, r as u32, p as u32, KEY_LEN)
        .map_err(|_| StegoError::KdfUnsupported)?;
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(password, salt, &params, &mut *key).map_err(|_| StegoError::KdfUnsupported)?;
    Ok(key)
}

/// Derive the payload key at encode time, stepping the cost down on failure.
///
/// Returns the 32-byte key and the logN actually used, which the caller must
/// record in the header so decode can reproduce the derivation.
///
/// # Errors
/// [`StegoError::KdfUnsupported`] if no cost in `12..=15` fits the memory
/// budget and is accepted by the scrypt backend.
pub fn derive_key_adaptive(
    password: &[u8],
    salt: &[u8; SALT_LEN],
) -> Result<(Zeroizing<[u8; KEY_LEN]>, u8), StegoError> {
    for log_n in (SCRYPT_LOG_N_FLOOR..=SCRYPT_LOG_N_PREFERRED).rev() {
        if scrypt_mem_bytes(log_n, SCRYPT_R) > SCRYPT_MEM_LIMIT {
            continue;
        }
        if let Ok(key) = derive_once(password, salt, log_n, SCRYPT_R, SCRYPT_P) {
            return Ok((key, log_n));
        }
    }
    Err(StegoError::KdfUnsupported)
}

/// Derive the payload key at decode time with the parameters stored in the
/// header. No retry loop: the stored logN is used verbatim.
pub fn derive_key_fixed(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    log_n: u8,
    r: u8,
    p: u8,
) -> Result<Zeroizing<[u8; KEY_LEN]>, StegoError> {
    if scrypt_mem_bytes(log_n, r) > SCRYPT_MEM_LIMIT {
        return Err(StegoError::KdfUnsupported);
    }
    derive_once(password, salt, log_n, r, p)
}

/// Derive the permutation PRNG key: `HMAC-SHA256(key, "ECAP-PERMUTE")`.
///
/// Domain-separated from the payload key so knowledge of the bit positions
/// never follows from the ciphertext alone.
pub fn derive_permute_key(key: &[u8; KEY_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(PERMUTE_LABEL);
    let digest = mac.finalize().into_bytes();
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    out.copy_from_slice(&digest);
    out
}

/// Encrypt a plaintext with AES-256-GCM.
///
/// Returns the ciphertext (exactly `plaintext.len()` bytes) and the detached
/// 16-byte authentication tag.
pub fn encrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> (Vec<u8>, [u8; TAG_LEN]) {
    let cipher = Aes256Gcm::new_from_slice(key).expect("valid key length");
    let mut buf = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(iv), b"", &mut buf)
        .expect("AES-GCM encrypt should not fail");
    let mut tag_out = [0u8; TAG_LEN];
    tag_out.copy_from_slice(&tag);
    (buf, tag_out)
}

/// Decrypt a ciphertext with AES-256-GCM, verifying the detached tag.
///
/// # Errors
/// [`StegoError::AuthFail`] on any tag mismatch. A wrong password and
/// tampered ciphertext are deliberately indistinguishable.
pub fn decrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
) -> Result<Vec<u8>, StegoError> {
    let cipher = Aes256Gcm::new_from_slice(key).expect("valid key length");
    let mut buf = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(Nonce::from_slice(iv), b"", &mut buf, Tag::from_slice(tag))
        .map_err(|_| StegoError::AuthFail)?;
    Ok(buf)
}
