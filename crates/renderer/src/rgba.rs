//! Direct RGBA rendering with style functions.
//!
//! Used for styles that have no band structure (thresholds, interpolation,
//! category maps); segment styles can also go through the indexed path.

use crate::canvas::data_row_from_image_row;
use crate::png::create_png_auto;
use crate::style::StyleFunction;
use field_common::{Color, FieldError, FieldResult};
use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

/// Colour each sample, row 0 of `samples` being the southern edge.
///
/// A sample with no value and no fallback is transparent. The opacity
/// function, when present, scales the colour's alpha by its result
/// (clamped to `[0, 1]`).
pub fn render_style_rgba(
    colour: &StyleFunction<Color>,
    opacity: Option<&StyleFunction<f32>>,
    samples: &[Option<f64>],
    width: usize,
    height: usize,
) -> FieldResult<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(FieldError::domain(format!(
            "Image size must be non-zero, got {}x{}",
            width, height
        )));
    }
    if samples.len() != width * height {
        return Err(FieldError::format(format!(
            "Got {} samples for a {}x{} image",
            samples.len(),
            width,
            height
        )));
    }

    let mut pixels = vec![0u8; width * height * 4];
    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(row, out)| {
            let start = data_row_from_image_row(row, height) * width;
            for (pixel, &sample) in out.chunks_exact_mut(4).zip(&samples[start..start + width]) {
                let c = shade(colour, opacity, sample);
                pixel.copy_from_slice(&[c.r, c.g, c.b, c.a]);
            }
        });

    debug!(
        width = width,
        height = height,
        style = colour.kind(),
        "Rendered RGBA image"
    );

    RgbaImage::from_raw(width as u32, height as u32, pixels)
        .ok_or_else(|| FieldError::format("RGBA buffer does not match image size"))
}

#[inline]
fn shade(colour: &StyleFunction<Color>, opacity: Option<&StyleFunction<f32>>, sample: Option<f64>) -> Color {
    let c = match colour.evaluate(sample) {
        Some(c) => c,
        None => return Color::TRANSPARENT,
    };
    match opacity.and_then(|f| f.evaluate(sample)) {
        Some(o) => {
            let o = o.clamp(0.0, 1.0) as f64;
            c.with_alpha((c.a as f64 * o).round() as u8)
        }
        None => c,
    }
}

/// Encode an RGBA image, indexed when it has at most 256 colours.
pub fn encode_rgba_png(image: &RgbaImage) -> FieldResult<Vec<u8>> {
    create_png_auto(image.as_raw(), image.width() as usize, image.height() as usize)
}
