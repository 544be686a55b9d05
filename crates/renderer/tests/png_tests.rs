//! Tests for PNG encoding of map buffers.
//!
//! Output is decoded with the `image` crate to check that:
//! - Indexed and RGBA encodings round-trip the pixel data
//! - Raw 16-bit maps decode to the stored values
//! - Buffers in the tile layout produce images of the world's pixel size

use image::GenericImageView;
use map_common::{EmbarkPoint, WorldCoord, WorldDims};
use renderer::canvas::{DenseBuffer, RawBuffer};
use renderer::color::Rgb;
use renderer::png::{create_png, create_png_auto, create_png_gray16};

// ============================================================================
// Helper functions
// ============================================================================

/// Map-like pixel data with a limited palette, one color per 16x16 block
fn generate_map_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let block = ((x / 16) * 7 + (y / 16) * 13) % 40;
            pixels.extend_from_slice(&[(block * 6) as u8, 120, (255 - block * 5) as u8, 255]);
        }
    }
    pixels
}

fn decode_rgba(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .expect("decodable png")
        .to_rgba8()
}

// ============================================================================
// RGBA and indexed encoding
// ============================================================================

#[test]
fn test_indexed_round_trip() {
    let pixels = generate_map_pixels(64, 48);
    let png = create_png_auto(&pixels, 64, 48).unwrap();
    let decoded = decode_rgba(&png);
    assert_eq!(decoded.dimensions(), (64, 48));
    assert_eq!(decoded.as_raw(), &pixels);
}

#[test]
fn test_indexed_round_trip_with_transparency() {
    let mut pixels = generate_map_pixels(32, 32);
    pixels[0..4].copy_from_slice(&[0, 0, 0, 0]);
    let png = create_png_auto(&pixels, 32, 32).unwrap();
    assert_eq!(decode_rgba(&png).as_raw(), &pixels);
}

#[test]
fn test_rgba_fallback_round_trip() {
    let pixels: Vec<u8> = (0..400u32)
        .flat_map(|i| [(i % 256) as u8, (i / 2 % 256) as u8, (i / 3 % 256) as u8, 255])
        .collect();
    let png = create_png_auto(&pixels, 20, 20).unwrap();
    assert_eq!(decode_rgba(&png).as_raw(), &pixels);

    let explicit = create_png(&pixels, 20, 20).unwrap();
    assert_eq!(decode_rgba(&explicit).as_raw(), &pixels);
}

#[test]
fn test_indexed_is_smaller_for_map_data() {
    let pixels = generate_map_pixels(256, 256);
    let indexed = create_png_auto(&pixels, 256, 256).unwrap();
    let rgba = create_png(&pixels, 256, 256).unwrap();
    assert!(indexed.len() < rgba.len());
}

// ============================================================================
// 16-bit grayscale
// ============================================================================

#[test]
fn test_gray16_round_trip() {
    let values: [u16; 6] = [0, 1, 255, 256, 4242, u16::MAX];
    let le: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    let png = create_png_gray16(&le, 3, 2).unwrap();

    let decoded = image::load_from_memory_with_format(&png, image::ImageFormat::Png).unwrap();
    assert_eq!(decoded.dimensions(), (3, 2));
    let gray = decoded.to_luma16();
    assert_eq!(gray.as_raw(), &values.to_vec());
}

// ============================================================================
// Map buffers
// ============================================================================

#[test]
fn test_dense_buffer_encodes_at_world_pixel_size() {
    let world = WorldDims::new(3, 3).unwrap();
    let mut buffer = DenseBuffer::new(world).unwrap();
    buffer.fill_tile(WorldCoord::new(1, 2), std::iter::repeat(Rgb::new(10, 200, 30)).take(256));
    buffer.write_thick_line_point(EmbarkPoint::new(4, 4), Rgb::WHITE, Rgb::BLACK);

    let png = create_png_auto(buffer.as_bytes(), buffer.width() as usize, buffer.height() as usize)
        .unwrap();
    let decoded = decode_rgba(&png);
    assert_eq!(decoded.dimensions(), (48, 48));
    assert_eq!(decoded.get_pixel(16, 32).0, [10, 200, 30, 255]);
    assert_eq!(decoded.get_pixel(31, 47).0, [10, 200, 30, 255]);
    assert_eq!(decoded.get_pixel(4, 4).0, [255, 255, 255, 255]);
    assert_eq!(decoded.get_pixel(5, 5).0, [0, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(40, 0).0, [0, 0, 0, 0]);
}

#[test]
fn test_raw_buffer_encodes_values() {
    let world = WorldDims::new(2, 2).unwrap();
    let mut raw = RawBuffer::new(world).unwrap();
    raw.write_data(1, 0, 0, 0, 300);
    raw.write_data(0, 1, 15, 15, 7);

    let png = create_png_gray16(raw.as_bytes(), raw.width() as usize, raw.height() as usize).unwrap();
    let gray = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
        .unwrap()
        .to_luma16();
    assert_eq!(gray.dimensions(), (32, 32));
    assert_eq!(gray.get_pixel(16, 0).0, [300]);
    assert_eq!(gray.get_pixel(15, 31).0, [7]);
    assert_eq!(gray.get_pixel(0, 0).0, [0]);
}
