//! Stroke font for labels and legend ticks.
//!
//! Each glyph is a set of polylines on a 4x6 design grid (y down), stroked
//! with tiny-skia. Lowercase letters render as uppercase; characters without
//! a glyph advance without drawing.

use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

const GRID_WIDTH: f32 = 4.0;
const GRID_HEIGHT: f32 = 6.0;
/// Advance between characters in grid units
const ADVANCE: f32 = 6.0;

type Polyline = &'static [(f32, f32)];

fn glyph(ch: char) -> &'static [Polyline] {
    match ch.to_ascii_uppercase() {
        '0' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 0.0)], &[(4.0, 0.0), (0.0, 6.0)]],
        '1' => &[&[(1.0, 1.0), (2.0, 0.0), (2.0, 6.0)], &[(1.0, 6.0), (3.0, 6.0)]],
        '2' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0), (0.0, 6.0), (4.0, 6.0)]],
        '3' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0)], &[(1.0, 3.0), (4.0, 3.0)]],
        '4' => &[&[(0.0, 0.0), (0.0, 3.0), (4.0, 3.0)], &[(4.0, 0.0), (4.0, 6.0)]],
        '5' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 3.0), (4.0, 3.0), (4.0, 6.0), (0.0, 6.0)]],
        '6' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0), (4.0, 3.0), (0.0, 3.0)]],
        '7' => &[&[(0.0, 0.0), (4.0, 0.0), (2.0, 6.0)]],
        '8' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 0.0)], &[(0.0, 3.0), (4.0, 3.0)]],
        '9' => &[&[(4.0, 3.0), (0.0, 3.0), (0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0)]],
        'A' => &[&[(0.0, 6.0), (0.0, 2.0), (2.0, 0.0), (4.0, 2.0), (4.0, 6.0)], &[(0.0, 3.0), (4.0, 3.0)]],
        'B' => &[
            &[(0.0, 0.0), (3.0, 0.0), (4.0, 1.0), (4.0, 2.0), (3.0, 3.0), (0.0, 3.0)],
            &[(3.0, 3.0), (4.0, 4.0), (4.0, 5.0), (3.0, 6.0), (0.0, 6.0), (0.0, 0.0)],
        ],
        'C' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0)]],
        'D' => &[&[(0.0, 0.0), (3.0, 0.0), (4.0, 1.0), (4.0, 5.0), (3.0, 6.0), (0.0, 6.0), (0.0, 0.0)]],
        'E' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0)], &[(0.0, 3.0), (3.0, 3.0)]],
        'F' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0)], &[(0.0, 3.0), (3.0, 3.0)]],
        'G' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0), (4.0, 3.0), (2.0, 3.0)]],
        'H' => &[&[(0.0, 0.0), (0.0, 6.0)], &[(4.0, 0.0), (4.0, 6.0)], &[(0.0, 3.0), (4.0, 3.0)]],
        'I' => &[&[(1.0, 0.0), (3.0, 0.0)], &[(2.0, 0.0), (2.0, 6.0)], &[(1.0, 6.0), (3.0, 6.0)]],
        'J' => &[&[(4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 4.0)]],
        'K' => &[&[(0.0, 0.0), (0.0, 6.0)], &[(4.0, 0.0), (0.0, 3.0), (4.0, 6.0)]],
        'L' => &[&[(0.0, 0.0), (0.0, 6.0), (4.0, 6.0)]],
        'M' => &[&[(0.0, 6.0), (0.0, 0.0), (2.0, 3.0), (4.0, 0.0), (4.0, 6.0)]],
        'N' => &[&[(0.0, 6.0), (0.0, 0.0), (4.0, 6.0), (4.0, 0.0)]],
        'O' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 0.0)]],
        'P' => &[&[(0.0, 6.0), (0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)]],
        'Q' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 0.0)], &[(2.0, 4.0), (4.0, 6.0)]],
        'R' => &[&[(0.0, 6.0), (0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0), (4.0, 6.0)]],
        'S' => &[&[
            (4.0, 1.0), (3.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 2.0), (1.0, 3.0),
            (3.0, 3.0), (4.0, 4.0), (4.0, 5.0), (3.0, 6.0), (1.0, 6.0), (0.0, 5.0),
        ]],
        'T' => &[&[(0.0, 0.0), (4.0, 0.0)], &[(2.0, 0.0), (2.0, 6.0)]],
        'U' => &[&[(0.0, 0.0), (0.0, 6.0), (4.0, 6.0), (4.0, 0.0)]],
        'V' => &[&[(0.0, 0.0), (2.0, 6.0), (4.0, 0.0)]],
        'W' => &[&[(0.0, 0.0), (1.0, 6.0), (2.0, 3.0), (3.0, 6.0), (4.0, 0.0)]],
        'X' => &[&[(0.0, 0.0), (4.0, 6.0)], &[(4.0, 0.0), (0.0, 6.0)]],
        'Y' => &[&[(0.0, 0.0), (2.0, 3.0), (4.0, 0.0)], &[(2.0, 3.0), (2.0, 6.0)]],
        'Z' => &[&[(0.0, 0.0), (4.0, 0.0), (0.0, 6.0), (4.0, 6.0)]],
        '-' => &[&[(0.0, 3.0), (4.0, 3.0)]],
        '+' => &[&[(0.0, 3.0), (4.0, 3.0)], &[(2.0, 1.0), (2.0, 5.0)]],
        '=' => &[&[(0.0, 2.0), (4.0, 2.0)], &[(0.0, 4.0), (4.0, 4.0)]],
        '.' => &[&[(2.0, 5.5), (2.0, 6.0)]],
        ',' => &[&[(2.0, 5.0), (1.0, 7.0)]],
        ':' => &[&[(2.0, 1.5), (2.0, 2.0)], &[(2.0, 4.5), (2.0, 5.0)]],
        '/' => &[&[(0.0, 6.0), (4.0, 0.0)]],
        '_' => &[&[(0.0, 6.0), (4.0, 6.0)]],
        '(' => &[&[(3.0, 0.0), (1.0, 2.0), (1.0, 4.0), (3.0, 6.0)]],
        ')' => &[&[(1.0, 0.0), (3.0, 2.0), (3.0, 4.0), (1.0, 6.0)]],
        '%' => &[
            &[(0.0, 6.0), (4.0, 0.0)],
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)],
            &[(3.0, 5.0), (4.0, 5.0), (4.0, 6.0), (3.0, 6.0), (3.0, 5.0)],
        ],
        '°' => &[&[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 0.0)]],
        _ => &[],
    }
}

/// Width in pixels of `text` drawn `height` pixels tall.
pub fn text_width(text: &str, height: f32) -> f32 {
    let scale = height / GRID_HEIGHT;
    let n = text.chars().count() as f32;
    if n == 0.0 {
        return 0.0;
    }
    (n * ADVANCE - (ADVANCE - GRID_WIDTH)) * scale
}

/// Draw `text` with its top-left corner at `(x, y)`.
pub fn draw_text(pixmap: &mut Pixmap, x: f32, y: f32, text: &str, height: f32, paint: &Paint) {
    let scale = height / GRID_HEIGHT;

    let mut stroke = Stroke::default();
    stroke.width = (scale * 0.9).max(1.0);
    stroke.line_cap = LineCap::Round;
    stroke.line_join = LineJoin::Round;

    for (i, ch) in text.chars().enumerate() {
        let origin_x = x + i as f32 * ADVANCE * scale;
        for line in glyph(ch) {
            let mut pb = PathBuilder::new();
            for (k, (gx, gy)) in line.iter().enumerate() {
                let (px, py) = (origin_x + gx * scale, y + gy * scale);
                if k == 0 {
                    pb.move_to(px, py);
                } else {
                    pb.line_to(px, py);
                }
            }
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
            }
        }
    }
}

/// Opaque white paint without anti-aliasing, for drawing into masks.
pub fn mask_paint() -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, 255);
    paint.anti_alias = false;
    paint
}
