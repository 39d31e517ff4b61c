//! Direction arrows for vector layers.
//!
//! Angles are in degrees, counter-clockwise from east (mathematical
//! convention). Screen y grows downward, so the drawn segment uses `-sin`.

use crate::canvas::{data_row_from_image_row, RasterImage};
use crate::text::mask_paint;
use tiny_skia::{LineCap, PathBuilder, Stroke, Transform};

/// Radius of the dot marking each arrow's origin.
const DOT_RADIUS: f32 = 1.5;

/// Sampling stride in pixels for a given arrow length.
pub fn vector_stride(arrow_length: f32) -> usize {
    ((arrow_length * 1.2).ceil() as usize).max(1)
}

/// Draw one arrow per stride cell in `ink` onto `canvas`.
///
/// `angles` is laid out like raster samples: `width * height`, southern
/// row first. Returns the number of arrows drawn.
pub fn draw_vectors(canvas: &mut RasterImage, angles: &[Option<f64>], arrow_length: f32, ink: u8) -> usize {
    let (width, height) = (canvas.width(), canvas.height());
    let mut mask = match canvas.mask() {
        Some(m) => m,
        None => return 0,
    };
    let paint = mask_paint();

    let mut stroke = Stroke::default();
    stroke.width = 1.0;
    stroke.line_cap = LineCap::Round;

    let stride = vector_stride(arrow_length);
    let mut drawn = 0;

    for row in (stride / 2..height).step_by(stride) {
        let data_row = data_row_from_image_row(row, height);
        for col in (stride / 2..width).step_by(stride) {
            let angle = match angles[data_row * width + col] {
                Some(a) if a.is_finite() => a.to_radians() as f32,
                _ => continue,
            };

            let (cx, cy) = (col as f32 + 0.5, row as f32 + 0.5);
            if let Some(dot) = PathBuilder::from_circle(cx, cy, DOT_RADIUS) {
                mask.fill_path(&dot, &paint, tiny_skia::FillRule::Winding, Transform::identity(), None);
            }

            let mut pb = PathBuilder::new();
            pb.move_to(cx, cy);
            pb.line_to(cx + arrow_length * angle.cos(), cy - arrow_length * angle.sin());
            if let Some(path) = pb.finish() {
                mask.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
            drawn += 1;
        }
    }

    canvas.stamp(&mask, ink);
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride() {
        assert_eq!(vector_stride(10.0), 12);
        assert_eq!(vector_stride(0.0), 1);
    }

    #[test]
    fn test_east_arrow_points_right() {
        let (w, h) = (24, 24);
        let mut canvas = RasterImage::filled(w, h, 0);
        let angles = vec![Some(0.0); w * h];
        let drawn = draw_vectors(&mut canvas, &angles, 8.0, 9);
        // stride 10: origins at 5 and 15 on each axis
        assert_eq!(drawn, 4);
        assert_eq!(canvas.get(10, 5), Some(9));
        assert_eq!(canvas.get(2, 5), Some(0));
    }

    #[test]
    fn test_north_arrow_points_up() {
        let (w, h) = (12, 24);
        let mut canvas = RasterImage::filled(w, h, 0);
        let angles = vec![Some(90.0); w * h];
        draw_vectors(&mut canvas, &angles, 8.0, 9);
        // Origin (5, 15) in image coordinates, tip near (5, 7)
        assert_eq!(canvas.get(5, 10), Some(9));
        assert_eq!(canvas.get(5, 20), Some(0));
    }

    #[test]
    fn test_missing_angles_skipped() {
        let mut canvas = RasterImage::filled(16, 16, 0);
        let angles = vec![None; 256];
        assert_eq!(draw_vectors(&mut canvas, &angles, 4.0, 9), 0);
        assert!(canvas.pixels().iter().all(|&p| p == 0));
    }
}
