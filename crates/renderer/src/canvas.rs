//! Indexed raster images.
//!
//! Pixels hold colour-table indices. Image row 0 is the top (north) edge,
//! while sample arrays store their southernmost row first; every rasteriser
//! converts between the two with [`data_row_from_image_row`].

use field_common::{FieldError, FieldResult};

/// Data row holding the samples drawn on image row `row`.
#[inline]
pub fn data_row_from_image_row(row: usize, height: usize) -> usize {
    height - row - 1
}

/// A rendered frame: one colour-table index per pixel, row-major from the
/// top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Image with every pixel set to `index`.
    pub fn filled(width: usize, height: usize, index: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![index; width * height],
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> FieldResult<Self> {
        if pixels.len() != width * height {
            return Err(FieldError::format(format!(
                "{} pixels supplied for a {}x{} image",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Index at `(x, y)` with `y` counted from the top.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, index: u8) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = index;
        }
    }

    /// Fill a rectangle clipped to the image.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, index: u8) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for row in y.min(self.height)..y_end {
            let start = row * self.width;
            self.pixels[start + x.min(x_end)..start + x_end].fill(index);
        }
    }

    /// Write `index` wherever `mask` is at least half covered.
    ///
    /// The mask must have the same size as the image.
    pub fn stamp(&mut self, mask: &tiny_skia::Pixmap, index: u8) {
        if mask.width() as usize != self.width || mask.height() as usize != self.height {
            return;
        }
        for (dst, px) in self.pixels.iter_mut().zip(mask.pixels()) {
            if px.alpha() >= 128 {
                *dst = index;
            }
        }
    }

    /// Blank drawing surface matching this image, if it is not empty.
    pub fn mask(&self) -> Option<tiny_skia::Pixmap> {
        tiny_skia::Pixmap::new(self.width as u32, self.height as u32)
    }
}
