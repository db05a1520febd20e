//! Shared test utilities for the slidefill test suite.
//!
//! Builds small synthetic PNGs with known colour layouts so pixel tests can
//! assert exactly which part of the source ended up where on the canvas.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let png = striped_png(20, 10, RED, GREEN);
//! let result = engine.stretch(&request(&png)).unwrap();
//! let img = decode_rgba(&result.data);
//! assert_eq!(count_pixels(&img, GREEN), 200);
//! ```

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

fn encode_png(img: RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Solid-colour PNG.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// PNG whose left half is `left` and right half is `right`.
pub fn striped_png(width: u32, height: u32, left: [u8; 4], right: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 { Rgba(left) } else { Rgba(right) }
    });
    encode_png(img)
}

/// PNG with a `border` frame of `(left, top, right, bottom)` pixels around an `inner` fill.
pub fn framed_png(
    width: u32,
    height: u32,
    (left, top, right, bottom): (u32, u32, u32, u32),
    border: [u8; 4],
    inner: [u8; 4],
) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let inside = x >= left && x < width - right && y >= top && y < height - bottom;
        if inside { Rgba(inner) } else { Rgba(border) }
    });
    encode_png(img)
}

// =========================================================================
// Assertions
// =========================================================================

/// Decode encoded bytes to RGBA, panicking with context on failure.
pub fn decode_rgba(data: &[u8]) -> RgbaImage {
    image::load_from_memory(data)
        .expect("transform output should decode")
        .to_rgba8()
}

/// Number of pixels exactly equal to `rgba`.
pub fn count_pixels(img: &RgbaImage, rgba: [u8; 4]) -> usize {
    img.pixels().filter(|p| p.0 == rgba).count()
}

pub fn assert_fully_transparent(img: &RgbaImage) {
    let opaque = img.pixels().filter(|p| p.0[3] != 0).count();
    assert_eq!(opaque, 0, "expected a fully transparent canvas");
}
