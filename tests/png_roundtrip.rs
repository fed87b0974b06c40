// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/ecapcore

//! Round-trip integration tests for the PNG randomized-LSB backend.

use std::io::Cursor;

use ecap_core::{decode, encode, encode_with, estimate_capacity, EncodeOptions, StegoError};

/// Opaque RGBA gradient test carrier.
fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([x as u8, y as u8, (x ^ y) as u8, 0xFF])
    });
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Capacity of a 64x64 carrier at one bit per channel:
/// (64*64*3 - 480) / 8 bytes.
const CAP_64: usize = 1476;

#[test]
fn roundtrip_basic() {
    let cover = gradient_png(64, 64);
    let stego = encode(&cover, "png", b"hello", b"pw").unwrap();
    assert_eq!(decode(&stego, b"pw").unwrap(), b"hello");
}

#[test]
fn wrong_password_fails_auth() {
    let cover = gradient_png(64, 64);
    let stego = encode(&cover, "png", b"secret msg", b"correct-pass").unwrap();
    assert_eq!(decode(&stego, b"wrong-pass"), Err(StegoError::AuthFail));
}

#[test]
fn roundtrip_empty_message() {
    let cover = gradient_png(64, 64);
    let stego = encode(&cover, "png", b"", b"pass").unwrap();
    assert_eq!(decode(&stego, b"pass").unwrap(), b"");
}

#[test]
fn roundtrip_unicode() {
    let cover = gradient_png(64, 64);
    let message = "Héllo wörld! 日本語テスト 🔐".as_bytes();
    let stego = encode(&cover, "png", message, b"unicode-key").unwrap();
    assert_eq!(decode(&stego, b"unicode-key").unwrap(), message);
}

#[test]
fn capacity_estimate() {
    let cover = gradient_png(64, 64);
    let opts = EncodeOptions::default();
    assert_eq!(estimate_capacity(&cover, "png", &opts).unwrap(), CAP_64);
    let opts2 = EncodeOptions { bits_per_channel: 2, ..Default::default() };
    assert_eq!(estimate_capacity(&cover, "png", &opts2).unwrap(), 2 * CAP_64);
}

#[test]
fn capacity_boundary() {
    let cover = gradient_png(64, 64);
    let exact = vec![0x5Au8; CAP_64];
    let stego = encode(&cover, "png", &exact, b"pw").unwrap();
    assert_eq!(decode(&stego, b"pw").unwrap(), exact);

    let too_much = vec![0x5Au8; CAP_64 + 1];
    assert_eq!(encode(&cover, "png", &too_much, b"pw"), Err(StegoError::CarrierTooSmall));
}

#[test]
fn oversized_message_rejected() {
    let cover = gradient_png(64, 64);
    let message = vec![0xABu8; 10_000];
    assert_eq!(encode(&cover, "png", &message, b"pw"), Err(StegoError::CarrierTooSmall));
}

#[test]
fn two_planes_roundtrip_and_capacity() {
    let cover = gradient_png(64, 64);
    let opts = EncodeOptions { bits_per_channel: 2, ..Default::default() };

    // A message over the 1-plane capacity fits at 2 bits per channel.
    let message = vec![0xC3u8; CAP_64 + 100];
    let stego = encode_with(&cover, "png", &message, b"pw", &opts).unwrap();
    assert_eq!(decode(&stego, b"pw").unwrap(), message);

    let too_much = vec![0xC3u8; 2 * CAP_64 + 1];
    assert_eq!(
        encode_with(&cover, "png", &too_much, b"pw", &opts),
        Err(StegoError::CarrierTooSmall)
    );
}

#[test]
fn stego_output_is_valid_png_with_same_dimensions() {
    let cover = gradient_png(64, 64);
    let stego = encode(&cover, "png", b"test", b"pass").unwrap();
    let img = image::load_from_memory(&stego).unwrap();
    assert_eq!(img.width(), 64);
    assert_eq!(img.height(), 64);
}

#[test]
fn carrier_integrity_only_rgb_low_bits_change() {
    let cover = gradient_png(48, 48);
    let stego = encode(&cover, "png", b"integrity check", b"pass").unwrap();

    let before = image::load_from_memory(&cover).unwrap().to_rgba8();
    let after = image::load_from_memory(&stego).unwrap().to_rgba8();

    for (i, (&a, &b)) in before.as_raw().iter().zip(after.as_raw().iter()).enumerate() {
        if i % 4 == 3 {
            assert_eq!(a, b, "alpha byte {i} changed");
        } else {
            assert_eq!(a & !1, b & !1, "high bits of byte {i} changed");
        }
    }
}

#[test]
fn magic_bit_flip_reads_as_no_payload() {
    // The top-left red LSB carries the first magic bit. Without the magic the
    // PNG backend reports nothing embedded, and no other backend finds a
    // record either.
    let cover = gradient_png(64, 64);
    let stego = encode(&cover, "png", b"secret", b"a").unwrap();

    let mut img = image::load_from_memory(&stego).unwrap().to_rgba8();
    img.get_pixel_mut(0, 0).0[0] ^= 1;
    let mut tampered = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut tampered, image::ImageFormat::Png)
        .unwrap();

    assert_eq!(decode(&tampered.into_inner(), b"a"), Err(StegoError::NoPayload));
}

#[test]
fn header_field_bit_flip_detected() {
    // Header bit 64 is the payload-length MSB; it lives in the LSB of the
    // 85th RGBA byte (pixel 21, green). Flipping it makes the declared
    // length inconsistent, which surfaces as BadHeader rather than AuthFail.
    let cover = gradient_png(64, 64);
    let stego = encode(&cover, "png", b"secret", b"a").unwrap();

    let mut img = image::load_from_memory(&stego).unwrap().to_rgba8();
    img.get_pixel_mut(21, 0).0[1] ^= 1;
    let mut tampered = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut tampered, image::ImageFormat::Png)
        .unwrap();

    assert_eq!(decode(&tampered.into_inner(), b"a"), Err(StegoError::BadHeader));
}

#[test]
fn payload_bit_flip_detected() {
    // Fill the carrier to capacity so every payload position carries a
    // ciphertext bit, then flip one far from the header region.
    let cover = gradient_png(64, 64);
    let message = vec![0x99u8; CAP_64];
    let stego = encode(&cover, "png", &message, b"a").unwrap();

    let mut img = image::load_from_memory(&stego).unwrap().to_rgba8();
    img.get_pixel_mut(63, 63).0[2] ^= 1; // blue byte of the last pixel
    let mut tampered = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut tampered, image::ImageFormat::Png)
        .unwrap();

    assert_eq!(decode(&tampered.into_inner(), b"a"), Err(StegoError::AuthFail));
}

#[test]
fn clean_png_has_no_payload() {
    assert_eq!(decode(&gradient_png(64, 64), b"pw"), Err(StegoError::NoPayload));
}

#[test]
fn tiny_png_too_small_for_header() {
    // 12x13 pixels = 468 RGB bytes, less than the 480 the header needs.
    let cover = gradient_png(12, 13);
    assert_eq!(encode(&cover, "png", b"x", b"pw"), Err(StegoError::CarrierTooSmall));
}

#[test]
fn garbage_with_png_extension_is_malformed() {
    let result = encode(b"definitely not a png", "png", b"x", b"pw");
    assert!(matches!(result, Err(StegoError::CarrierMalformed(_))));
}
