//! Point glyphs: recolourable icons stamped at geographic positions.

use crate::canvas::RasterImage;
use field_common::BoundingBox;
use serde::{Deserialize, Serialize};

/// A located value drawn as a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphPoint {
    pub x: f64,
    pub y: f64,
    pub value: Option<f64>,
}

impl GlyphPoint {
    pub fn new(x: f64, y: f64, value: Option<f64>) -> Self {
        Self { x, y, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IconCell {
    Empty,
    Fill,
    Outline,
}

/// A square icon whose fill and outline indices are chosen per stamp.
#[derive(Debug, Clone)]
pub struct GlyphIcon {
    size: usize,
    cells: Vec<IconCell>,
}

impl GlyphIcon {
    /// Filled disc with a one-pixel outline.
    pub fn circle(radius: usize) -> Self {
        let size = radius * 2 + 1;
        let r = radius as f64 + 0.5;
        let c = radius as f64;
        let cells = (0..size * size)
            .map(|k| {
                let (x, y) = ((k % size) as f64, (k / size) as f64);
                let d = ((x - c).powi(2) + (y - c).powi(2)).sqrt();
                if d > r {
                    IconCell::Empty
                } else if d > r - 1.0 {
                    IconCell::Outline
                } else {
                    IconCell::Fill
                }
            })
            .collect();
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Stamp centred on pixel `(cx, cy)`, clipping at the canvas edges.
    pub fn stamp(&self, canvas: &mut RasterImage, cx: i64, cy: i64, fill: u8, outline: u8) {
        let half = (self.size / 2) as i64;
        for (k, cell) in self.cells.iter().enumerate() {
            let index = match cell {
                IconCell::Empty => continue,
                IconCell::Fill => fill,
                IconCell::Outline => outline,
            };
            let x = cx - half + (k % self.size) as i64;
            let y = cy - half + (k / self.size) as i64;
            if x >= 0 && y >= 0 {
                canvas.set(x as usize, y as usize, index);
            }
        }
    }
}

impl Default for GlyphIcon {
    fn default() -> Self {
        GlyphIcon::circle(4)
    }
}

/// Pixel holding a coordinate, with image y counted from the top.
///
/// Returns `None` for positions outside `bbox`.
pub fn pixel_of(bbox: &BoundingBox, x: f64, y: f64, width: usize, height: usize) -> Option<(i64, i64)> {
    if !bbox.contains_point(x, y) {
        return None;
    }
    let (fx, fy) = bbox.fraction_of(x, y);
    let px = ((fx * width as f64).floor() as i64).min(width as i64 - 1);
    let py = (((1.0 - fy) * height as f64).floor() as i64).min(height as i64 - 1);
    Some((px, py))
}

/// Stamp one icon per point, filled with the index chosen by `index_of`.
pub fn draw_glyphs(
    canvas: &mut RasterImage,
    bbox: &BoundingBox,
    points: &[GlyphPoint],
    icon: &GlyphIcon,
    outline: u8,
    index_of: impl Fn(Option<f64>) -> u8,
) -> usize {
    let (width, height) = (canvas.width(), canvas.height());
    let mut drawn = 0;
    for point in points {
        if let Some((px, py)) = pixel_of(bbox, point.x, point.y, width, height) {
            icon.stamp(canvas, px, py, index_of(point.value), outline);
            drawn += 1;
        }
    }
    drawn
}
