//! PNG encoding.
//!
//! Two encoding modes:
//! - **Indexed PNG (color type 3)**: frames and legends, written straight
//!   from their colour-table indices; also used for RGBA images with at
//!   most 256 unique colours.
//! - **RGBA PNG (color type 6)**: fallback for images with more colours.

use field_common::{FieldError, FieldResult};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Write;

/// Indexed PNG palettes hold at most 256 entries.
const MAX_PALETTE_SIZE: usize = 256;

/// Below this many pixels a single pass is faster than fanning out.
const PARALLEL_THRESHOLD: usize = 64 * 64;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

type Rgba = (u8, u8, u8, u8);

/// Encode RGBA pixels, choosing indexed output when the colours fit.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> FieldResult<Vec<u8>> {
    check_len(pixels.len(), width * height * 4)?;

    let quantised = if width * height >= PARALLEL_THRESHOLD {
        index_colours_parallel(pixels)
    } else {
        index_colours(pixels)
    };

    match quantised {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

/// One pixel as a hashable key.
#[inline(always)]
fn key(pixel: &[u8]) -> u32 {
    u32::from_le_bytes([pixel[0], pixel[1], pixel[2], pixel[3]])
}

#[inline(always)]
fn rgba(key: u32) -> Rgba {
    let [r, g, b, a] = key.to_le_bytes();
    (r, g, b, a)
}

/// Palette in first-seen order plus one index per pixel, or `None` past
/// 256 distinct colours.
fn index_colours(pixels: &[u8]) -> Option<(Vec<Rgba>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for pixel in pixels.chunks_exact(4) {
        let k = key(pixel);
        let index = match lookup.get(&k) {
            Some(&index) => index,
            None if palette.len() == MAX_PALETTE_SIZE => return None,
            None => {
                let index = palette.len() as u8;
                lookup.insert(k, index);
                palette.push(rgba(k));
                index
            }
        };
        indices.push(index);
    }
    Some((palette, indices))
}

/// [`index_colours`] for large images: distinct colours are collected per
/// slice, merged, then pixels are mapped in a second parallel pass.
fn index_colours_parallel(pixels: &[u8]) -> Option<(Vec<Rgba>, Vec<u8>)> {
    let slice_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let mut distinct: Vec<u32> = pixels
        .par_chunks(slice_pixels * 4)
        .flat_map_iter(|slice| {
            let mut seen = HashSet::with_capacity(MAX_PALETTE_SIZE);
            for pixel in slice.chunks_exact(4) {
                seen.insert(key(pixel));
                if seen.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            seen.into_iter()
        })
        .collect();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() > MAX_PALETTE_SIZE {
        return None;
    }

    let lookup: HashMap<u32, u8> = distinct.iter().enumerate().map(|(i, &k)| (k, i as u8)).collect();
    let indices = pixels
        .par_chunks_exact(4)
        .map(|pixel| lookup.get(&key(pixel)).copied().unwrap_or(0))
        .collect();
    Some((distinct.into_iter().map(rgba).collect(), indices))
}

/// Create an indexed PNG (color type 3) from a palette and indices.
///
/// A tRNS chunk is written only when some entry is not fully opaque.
pub fn create_png_indexed(width: usize, height: usize, palette: &[Rgba], indices: &[u8]) -> FieldResult<Vec<u8>> {
    check_len(indices.len(), width * height)?;
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(FieldError::Encode(format!(
            "PNG palette needs 1 to {} entries, got {}",
            MAX_PALETTE_SIZE,
            palette.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width, height, 1)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create an RGBA PNG (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> FieldResult<Vec<u8>> {
    check_len(pixels.len(), width * height * 4)?;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat = deflate_scanlines(pixels, width, height, 4)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn check_len(actual: usize, expected: usize) -> FieldResult<()> {
    if actual != expected {
        return Err(FieldError::Encode(format!(
            "Pixel buffer has {} bytes, expected {}",
            actual, expected
        )));
    }
    Ok(())
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    data
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], width: usize, height: usize, bytes_per_pixel: usize) -> FieldResult<Vec<u8>> {
    let stride = width * bytes_per_pixel;
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));
    for row in data.chunks_exact(stride.max(1)).take(height) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&uncompressed)
        .and_then(|_| encoder.finish())
        .map_err(|e| FieldError::Encode(format!("IDAT compression failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banded(width: usize, height: usize) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                let band = (((x + y) / 8) % 16) as u8;
                pixels.extend_from_slice(&[band * 16, 128, 255 - band * 16, 255]);
            }
        }
        pixels
    }

    #[test]
    fn test_index_colours_first_seen_order() {
        let pixels = [9, 9, 9, 255, 1, 2, 3, 0, 9, 9, 9, 255];
        let (palette, indices) = index_colours(&pixels).unwrap();
        assert_eq!(palette, vec![(9, 9, 9, 255), (1, 2, 3, 0)]);
        assert_eq!(indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_parallel_indices_point_at_pixel_colour() {
        let pixels = banded(128, 128);
        let (palette, indices) = index_colours_parallel(&pixels).unwrap();
        assert_eq!(palette.len(), 16);
        assert_eq!(indices.len(), 128 * 128);
        for (k, &index) in indices.iter().enumerate().step_by(97) {
            let (r, g, b, a) = palette[index as usize];
            assert_eq!(&pixels[k * 4..k * 4 + 4], &[r, g, b, a]);
        }
    }

    #[test]
    fn test_more_than_256_colours_writes_rgba() {
        let pixels: Vec<u8> = (0..300u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255])
            .collect();
        assert!(index_colours(&pixels).is_none());

        let png = create_png_auto(&pixels, 300, 1).unwrap();
        // IHDR colour type byte
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_indexed_header_and_trns() {
        let palette = [(255, 0, 0, 255), (0, 0, 0, 0)];
        let png = create_png_indexed(2, 1, &palette, &[0, 1]).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(png[25], 3);
        assert!(png.windows(4).any(|w| w == b"tRNS"));

        let opaque = create_png_indexed(2, 1, &[(1, 2, 3, 255)], &[0, 0]).unwrap();
        assert!(!opaque.windows(4).any(|w| w == b"tRNS"));
    }

    #[test]
    fn test_buffer_size_checked() {
        assert!(matches!(create_png(&[0; 7], 1, 2), Err(FieldError::Encode(_))));
        assert!(create_png_indexed(2, 2, &[(0, 0, 0, 255)], &[0; 3]).is_err());
        assert!(create_png_indexed(1, 1, &[], &[0]).is_err());
    }

    #[test]
    fn test_auto_picks_indexed_for_banded_image() {
        let pixels = banded(64, 64);
        let auto = create_png_auto(&pixels, 64, 64).unwrap();
        assert_eq!(auto[25], 3);
        assert!(auto.len() < create_png(&pixels, 64, 64).unwrap().len());
    }
}
