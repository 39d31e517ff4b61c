//! Colour-bar legends drawn with a frame's colour table.

use crate::canvas::RasterImage;
use crate::palette::IndexedColourTable;
use crate::scale::ColourScale;
use crate::text::{draw_text, mask_paint};
use field_common::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};
use tiny_skia::{PathBuilder, Stroke, Transform};

const MARGIN: usize = 8;
const BAR_WIDTH: usize = 20;
const TICK_LENGTH: f32 = 4.0;
const TEXT_HEIGHT: f32 = 8.0;

/// Legend layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendOptions {
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            title: None,
            width: 110,
            height: 264,
        }
    }
}

/// Tick label text: fixed-point for moderate magnitudes, scientific
/// otherwise.
pub fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if value != 0.0 && !(0.01..10_000.0).contains(&magnitude) {
        return format!("{:.2e}", value);
    }
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Draw a vertical colour bar, high values at the top, with ticks at the
/// low, middle and high ends of the scale.
///
/// On a logarithmic scale the middle tick is the geometric midpoint.
pub fn render_legend(
    scale: &ColourScale,
    table: &IndexedColourTable,
    options: &LegendOptions,
) -> FieldResult<RasterImage> {
    if scale.num_bands() as usize != table.num_bands() {
        return Err(FieldError::domain(format!(
            "Scale has {} bands but colour table has {}",
            scale.num_bands(),
            table.num_bands()
        )));
    }

    let (width, height) = (options.width as usize, options.height as usize);
    let top = if options.title.is_some() { MARGIN * 3 } else { MARGIN };
    if width < MARGIN + BAR_WIDTH || height < top + MARGIN + 2 {
        return Err(FieldError::domain(format!(
            "Legend of {}x{} is too small",
            width, height
        )));
    }

    let mut canvas = RasterImage::filled(width, height, table.banner_index());
    let bar_h = height - top - MARGIN;
    let n = scale.num_bands() as usize;

    for r in 0..bar_h {
        let fraction = 1.0 - (r as f64 + 0.5) / bar_h as f64;
        let band = ((fraction * n as f64).floor() as usize).min(n - 1);
        canvas.fill_rect(MARGIN, top + r, BAR_WIDTH, 1, band as u8);
    }

    let mut mask = match canvas.mask() {
        Some(m) => m,
        None => return Ok(canvas),
    };
    let paint = mask_paint();
    let mut stroke = Stroke::default();
    stroke.width = 1.0;

    let bar_right = (MARGIN + BAR_WIDTH) as f32;
    for fraction in [0.0, 0.5, 1.0] {
        let y = top as f32 + ((1.0 - fraction) * bar_h as f64) as f32;
        let y = y.min((top + bar_h) as f32 - 0.5);

        let mut pb = PathBuilder::new();
        pb.move_to(bar_right, y + 0.5);
        pb.line_to(bar_right + TICK_LENGTH, y + 0.5);
        if let Some(path) = pb.finish() {
            mask.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        let text = format_tick(scale.value_at(fraction));
        let text_y = (y - TEXT_HEIGHT / 2.0).max(0.0);
        draw_text(&mut mask, bar_right + TICK_LENGTH + 3.0, text_y, &text, TEXT_HEIGHT, &paint);
    }

    if let Some(title) = &options.title {
        draw_text(&mut mask, MARGIN as f32, MARGIN as f32, title, TEXT_HEIGHT, &paint);
    }

    canvas.stamp(&mask, table.ink_index());
    Ok(canvas)
}
