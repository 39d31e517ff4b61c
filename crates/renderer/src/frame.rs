//! Frame compositing.
//!
//! A frame stacks layers over a canvas that starts as background:
//! - **Raster**: one colour index per pixel from the colour scale
//! - **Vector**: direction arrows in the ink colour
//! - **Glyph**: icons at positions, filled by value
//!
//! Layers are drawn in insertion order and the optional label banner is
//! drawn last, along the bottom edge.

use crate::canvas::{data_row_from_image_row, RasterImage};
use crate::glyphs::{draw_glyphs, GlyphIcon, GlyphPoint};
use crate::palette::IndexedColourTable;
use crate::scale::ColourScale;
use crate::text::{draw_text, mask_paint, text_width};
use crate::vectors::draw_vectors;
use field_common::{BoundingBox, FieldError, FieldResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Height of the label banner in pixels.
pub const BANNER_HEIGHT: usize = 16;

/// Height of banner text in pixels.
const BANNER_TEXT_HEIGHT: f32 = 9.0;

/// Range used when a frame has no usable samples.
pub const DEFAULT_RANGE: (f64, f64) = (0.0, 1.0);

/// Default range for logarithmic scales, which need a positive lower bound.
pub const DEFAULT_LOG_RANGE: (f64, f64) = (1.0, 10.0);

/// How a sample layer is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotKind {
    Raster,
    Vector { arrow_length: f32 },
    /// Positions are required; see [`Frame::add_glyph_layer`]
    Glyph,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Raster { samples: Vec<Option<f64>> },
    Vector { angles: Vec<Option<f64>>, arrow_length: f32 },
    Glyph { points: Vec<GlyphPoint> },
}

impl Layer {
    /// Values that contribute to auto-ranging; vector angles never do.
    fn range_values(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            Layer::Raster { samples } => Box::new(samples.iter().filter_map(|s| *s)),
            Layer::Glyph { points } => Box::new(points.iter().filter_map(|p| p.value)),
            Layer::Vector { .. } => Box::new(std::iter::empty()),
        }
    }
}

/// One instant's worth of layers on a fixed-size canvas.
#[derive(Debug, Clone)]
pub struct Frame {
    width: usize,
    height: usize,
    bbox: BoundingBox,
    layers: Vec<Layer>,
    label: Option<String>,
    icon: GlyphIcon,
}

impl Frame {
    pub fn new(width: usize, height: usize, bbox: BoundingBox) -> FieldResult<Self> {
        if width == 0 || height == 0 {
            return Err(FieldError::domain(format!(
                "Frame size must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            bbox,
            layers: Vec::new(),
            label: None,
            icon: GlyphIcon::default(),
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn set_icon(&mut self, icon: GlyphIcon) {
        self.icon = icon;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Add a sample layer of `width * height` values, southern row first.
    pub fn add_layer(&mut self, samples: Vec<Option<f64>>, kind: PlotKind) -> FieldResult<()> {
        let expected = self.width * self.height;
        if samples.len() != expected {
            return Err(FieldError::format(format!(
                "Layer has {} samples but the {}x{} canvas needs {}",
                samples.len(),
                self.width,
                self.height,
                expected
            )));
        }

        let layer = match kind {
            PlotKind::Raster => Layer::Raster { samples },
            PlotKind::Vector { arrow_length } => {
                if !arrow_length.is_finite() || arrow_length <= 0.0 {
                    return Err(FieldError::domain(format!(
                        "Arrow length must be positive, got {}",
                        arrow_length
                    )));
                }
                Layer::Vector {
                    angles: samples,
                    arrow_length,
                }
            }
            PlotKind::Glyph => {
                return Err(FieldError::Unsupported(
                    "glyph layers are positioned; use add_glyph_layer".to_string(),
                ))
            }
        };
        self.layers.push(layer);
        Ok(())
    }

    /// Add a layer of glyphs at coordinates within the frame's bounding box.
    pub fn add_glyph_layer(&mut self, points: Vec<GlyphPoint>) {
        self.layers.push(Layer::Glyph { points });
    }

    /// Finite extent of all non-vector values, if there are any.
    pub fn data_range(&self) -> Option<(f64, f64)> {
        self.layers
            .iter()
            .flat_map(|l| l.range_values())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// [`Frame::data_range`], or `[0, 1]` when the frame has no values.
    pub fn auto_range(&self) -> (f64, f64) {
        self.data_range().unwrap_or_else(|| {
            warn!("No finite samples in frame; using default range");
            DEFAULT_RANGE
        })
    }

    /// Composite every layer with a fixed scale.
    ///
    /// The scale and the colour table must agree on the band count.
    pub fn render(&self, scale: &ColourScale, table: &IndexedColourTable) -> FieldResult<RasterImage> {
        if scale.num_bands() as usize != table.num_bands() {
            return Err(FieldError::domain(format!(
                "Scale has {} bands but colour table has {}",
                scale.num_bands(),
                table.num_bands()
            )));
        }

        let background = table.background_index();
        let mut canvas = RasterImage::filled(self.width, self.height, background);

        for layer in &self.layers {
            match layer {
                Layer::Raster { samples } => self.fill_raster(&mut canvas, samples, scale),
                Layer::Vector {
                    angles,
                    arrow_length,
                } => {
                    draw_vectors(&mut canvas, angles, *arrow_length, table.ink_index());
                }
                Layer::Glyph { points } => {
                    draw_glyphs(&mut canvas, &self.bbox, points, &self.icon, table.ink_index(), |v| {
                        scale.colour_index(v)
                    });
                }
            }
        }

        if let Some(label) = &self.label {
            self.draw_banner(&mut canvas, label, table);
        }

        debug!(
            width = self.width,
            height = self.height,
            layers = self.layers.len(),
            low = scale.low(),
            high = scale.high(),
            "Rendered frame"
        );

        Ok(canvas)
    }

    fn fill_raster(&self, canvas: &mut RasterImage, samples: &[Option<f64>], scale: &ColourScale) {
        let (width, height) = (self.width, self.height);
        let background = scale.background_index();

        canvas
            .pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, out)| {
                let start = data_row_from_image_row(row, height) * width;
                for (pixel, sample) in out.iter_mut().zip(&samples[start..start + width]) {
                    let index = scale.colour_index(*sample);
                    if index != background {
                        *pixel = index;
                    }
                }
            });
    }

    fn draw_banner(&self, canvas: &mut RasterImage, label: &str, table: &IndexedColourTable) {
        let banner_h = BANNER_HEIGHT.min(self.height);
        let top = self.height - banner_h;
        canvas.fill_rect(0, top, self.width, banner_h, table.banner_index());

        let text_h = BANNER_TEXT_HEIGHT.min(banner_h as f32);
        if text_width(label, text_h) > self.width as f32 {
            debug!(label = label, "Label wider than frame; clipping");
        }
        if let Some(mut mask) = canvas.mask() {
            let y = top as f32 + (banner_h as f32 - text_h) / 2.0;
            draw_text(&mut mask, 4.0, y, label, text_h, &mask_paint());
            canvas.stamp(&mask, table.ink_index());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{ColourTableOptions, Palette};
    use field_common::Color;

    fn setup(bands: u32) -> (ColourScale, IndexedColourTable) {
        let scale = ColourScale::new(0.0, 100.0, false, bands).unwrap();
        let palette = Palette::from_seed(&[Color::BLACK, Color::WHITE], bands as usize).unwrap();
        let table = palette.colour_table(&ColourTableOptions::default()).unwrap();
        (scale, table)
    }

    fn bbox() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 1.0, 1.0)
    }

    #[test]
    fn test_add_layer_size_mismatch() {
        let mut frame = Frame::new(4, 3, bbox()).unwrap();
        assert!(matches!(
            frame.add_layer(vec![Some(1.0); 11], PlotKind::Raster),
            Err(FieldError::Format(_))
        ));
        assert!(matches!(
            frame.add_layer(vec![Some(1.0); 12], PlotKind::Glyph),
            Err(FieldError::Unsupported(_))
        ));
        assert!(frame.add_layer(vec![Some(1.0); 12], PlotKind::Raster).is_ok());
    }

    #[test]
    fn test_raster_flip() {
        let (scale, table) = setup(10);
        let mut frame = Frame::new(2, 2, bbox()).unwrap();
        // Southern row 5s, northern row 95s
        frame
            .add_layer(vec![Some(5.0), Some(5.0), Some(95.0), Some(95.0)], PlotKind::Raster)
            .unwrap();
        let img = frame.render(&scale, &table).unwrap();
        assert_eq!(img.pixels(), &[9, 9, 0, 0]);
    }

    #[test]
    fn test_missing_keeps_lower_layer() {
        let (scale, table) = setup(10);
        let mut frame = Frame::new(2, 1, bbox()).unwrap();
        frame.add_layer(vec![Some(10.0), Some(10.0)], PlotKind::Raster).unwrap();
        frame.add_layer(vec![None, Some(90.0)], PlotKind::Raster).unwrap();
        let img = frame.render(&scale, &table).unwrap();
        assert_eq!(img.pixels(), &[1, 9]);
    }

    #[test]
    fn test_auto_range() {
        let mut frame = Frame::new(2, 1, bbox()).unwrap();
        assert_eq!(frame.data_range(), None);
        assert_eq!(frame.auto_range(), (0.0, 1.0));

        frame
            .add_layer(vec![Some(500.0), Some(-500.0)], PlotKind::Vector { arrow_length: 4.0 })
            .unwrap();
        assert_eq!(frame.data_range(), None);

        frame.add_layer(vec![Some(3.0), None], PlotKind::Raster).unwrap();
        frame.add_glyph_layer(vec![GlyphPoint::new(0.5, 0.5, Some(7.0))]);
        assert_eq!(frame.data_range(), Some((3.0, 7.0)));
    }

    #[test]
    fn test_banner_drawn_last() {
        let (scale, table) = setup(10);
        let mut frame = Frame::new(64, 32, bbox()).unwrap().with_label("T+06");
        frame.add_layer(vec![Some(50.0); 64 * 32], PlotKind::Raster).unwrap();
        let img = frame.render(&scale, &table).unwrap();

        assert_eq!(img.get(10, 0), Some(5));
        assert_eq!(img.get(63, 31), Some(table.banner_index()));
        let ink = img.pixels().iter().filter(|&&p| p == table.ink_index()).count();
        assert!(ink > 0);
        assert!(img.pixels()[..(32 - BANNER_HEIGHT) * 64].iter().all(|&p| p == 5));
    }

    #[test]
    fn test_band_mismatch_rejected() {
        let (scale, _) = setup(10);
        let (_, table) = setup(5);
        let frame = Frame::new(1, 1, bbox()).unwrap();
        assert!(frame.render(&scale, &table).is_err());
    }
}
