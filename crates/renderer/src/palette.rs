//! Colour palettes and indexed colour tables.
//!
//! A palette is an ordered list of at most 250 colours, generated from a
//! small seed list by subsampling or piecewise-linear interpolation. The
//! first and last seed colours are always preserved.
//!
//! An [`IndexedColourTable`] appends the reserved entries a rendered frame
//! needs after the palette bands:
//!
//! | index            | meaning                 |
//! |------------------|-------------------------|
//! | `0..n`           | palette bands           |
//! | `n`              | background / no data    |
//! | `n + 1`          | out of range            |
//! | `n + 2`          | ink (vectors, outlines) |
//! | `n + 3`          | label banner            |

use crate::style::StyleValue;
use field_common::{Color, FieldError, FieldResult};
use serde::{Deserialize, Serialize};

/// Largest number of colours in a palette.
pub const MAX_PALETTE_SIZE: usize = 250;

/// Number of table entries that follow the palette bands.
pub const RESERVED_ENTRIES: usize = 4;

/// Resample `seed` to exactly `num_bands` values.
///
/// - Same length: the seed is returned unchanged.
/// - Shrinking: each slot takes the seed value nearest its proportional
///   position.
/// - Growing: each seed value is pinned to its nearest proportional slot and
///   the slots between consecutive pinned values are interpolated.
///
/// A single requested band yields the first seed value.
pub fn generate<T: StyleValue>(seed: &[T], num_bands: usize) -> FieldResult<Vec<T>> {
    if seed.is_empty() {
        return Err(FieldError::domain("Palette seed must not be empty"));
    }
    if num_bands == 0 || num_bands > MAX_PALETTE_SIZE {
        return Err(FieldError::domain(format!(
            "Palette size {} outside 1..={}",
            num_bands, MAX_PALETTE_SIZE
        )));
    }

    let s = seed.len();
    if num_bands == s {
        return Ok(seed.to_vec());
    }
    if num_bands == 1 {
        return Ok(vec![seed[0].clone()]);
    }
    if s == 1 {
        return Ok(vec![seed[0].clone(); num_bands]);
    }

    let n = num_bands;
    if n < s {
        let out = (0..n)
            .map(|k| {
                let src = (k as f64 * (s - 1) as f64 / (n - 1) as f64).round() as usize;
                seed[src.min(s - 1)].clone()
            })
            .collect();
        return Ok(out);
    }

    // Pinned slot for each seed value; strictly increasing since n > s
    let slots: Vec<usize> = (0..s)
        .map(|k| (k as f64 * (n - 1) as f64 / (s - 1) as f64).round() as usize)
        .collect();

    let mut out = Vec::with_capacity(n);
    for w in 0..s - 1 {
        let (from, to) = (slots[w], slots[w + 1]);
        let span = (to - from) as f64;
        for p in from..to {
            let t = (p - from) as f64 / span;
            out.push(seed[w].lerp(&seed[w + 1], t));
        }
    }
    out.push(seed[s - 1].clone());
    Ok(out)
}

/// Seed colours for a named preset, looked up case-insensitively.
pub fn preset_seed(name: &str) -> FieldResult<Vec<Color>> {
    let hex: &[u32] = match name.to_ascii_lowercase().as_str() {
        "default" | "rainbow" => &[
            0x000080, 0x0000FF, 0x0080FF, 0x00FFFF, 0x80FF80, 0xFFFF00, 0xFF8000, 0xFF0000,
            0x800000,
        ],
        "greyscale" | "grayscale" => &[0x000000, 0xFFFFFF],
        "redblue" => &[0x0000FF, 0xFFFFFF, 0xFF0000],
        "blueheat" => &[0x000000, 0x0000FF, 0x00FFFF, 0xFFFFFF],
        "occam" => &[
            0x2E0059, 0x3F33A6, 0x4C7CBF, 0x66BFBF, 0x99D98C, 0xE6E666, 0xF2A640, 0xD9462E,
            0x8C1A1A,
        ],
        "viridis" => &[
            0x440154, 0x482878, 0x3E4A89, 0x31688E, 0x26828E, 0x1F9E89, 0x35B779, 0x6DCD59,
            0xB4DE2C, 0xFDE725,
        ],
        _ => {
            return Err(FieldError::domain(format!(
                "Unknown palette '{}'; expected one of {}",
                name,
                PRESET_NAMES.join(", ")
            )))
        }
    };
    Ok(hex.iter().map(|&h| hex_color(h)).collect())
}

/// Names accepted by [`preset_seed`].
pub const PRESET_NAMES: &[&str] = &["default", "greyscale", "redblue", "blueheat", "occam", "viridis"];

fn hex_color(h: u32) -> Color {
    Color::rgb((h >> 16) as u8, (h >> 8) as u8, h as u8)
}

/// An ordered list of band colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    colours: Vec<Color>,
}

impl Palette {
    /// Wrap an explicit list of 1 to 250 colours.
    pub fn new(colours: Vec<Color>) -> FieldResult<Self> {
        if colours.is_empty() || colours.len() > MAX_PALETTE_SIZE {
            return Err(FieldError::domain(format!(
                "Palette size {} outside 1..={}",
                colours.len(),
                MAX_PALETTE_SIZE
            )));
        }
        Ok(Self { colours })
    }

    /// Generate `num_bands` colours from a seed list.
    pub fn from_seed(seed: &[Color], num_bands: usize) -> FieldResult<Self> {
        Ok(Self {
            colours: generate(seed, num_bands)?,
        })
    }

    /// A named preset resampled to `num_bands` colours.
    pub fn named(name: &str, num_bands: usize) -> FieldResult<Self> {
        Self::from_seed(&preset_seed(name)?, num_bands)
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    pub fn colours(&self) -> &[Color] {
        &self.colours
    }

    /// This palette resampled to `num_bands` colours.
    pub fn resample(&self, num_bands: usize) -> FieldResult<Self> {
        Self::from_seed(&self.colours, num_bands)
    }

    pub fn reversed(&self) -> Self {
        Self {
            colours: self.colours.iter().rev().copied().collect(),
        }
    }

    /// Scale every alpha channel by `percent` (0 to 100).
    pub fn with_opacity(&self, percent: u8) -> FieldResult<Self> {
        if percent > 100 {
            return Err(FieldError::domain(format!("Opacity {}% exceeds 100%", percent)));
        }
        Ok(Self {
            colours: self
                .colours
                .iter()
                .map(|c| c.with_alpha(scale_alpha(c.a, percent)))
                .collect(),
        })
    }

    /// Colour at a position in `[0, 1]` along the palette.
    pub fn get_colour(&self, value: f32) -> FieldResult<Color> {
        if !(0.0..=1.0).contains(&value) {
            return Err(FieldError::domain(format!(
                "Palette position {} outside [0, 1]",
                value
            )));
        }
        let n = self.colours.len();
        let index = ((value as f64 * n as f64).floor() as usize).min(n - 1);
        Ok(self.colours[index])
    }

    /// Build the indexed table used by frame renderers.
    pub fn colour_table(&self, options: &ColourTableOptions) -> FieldResult<IndexedColourTable> {
        IndexedColourTable::new(self, options)
    }
}

fn scale_alpha(alpha: u8, percent: u8) -> u8 {
    ((alpha as u32 * percent as u32 + 50) / 100) as u8
}

/// Options for the reserved entries of an indexed colour table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColourTableOptions {
    /// Colour of missing-data pixels when the background is not transparent
    pub background: Color,
    pub transparent_background: bool,
    /// Colour of out-of-range pixels; `None` uses the background colour
    pub out_of_range: Option<Color>,
    pub transparent_out_of_range: bool,
    /// Applied to every band colour, 0 to 100
    pub opacity: u8,
    pub ink: Color,
    pub banner: Color,
}

impl Default for ColourTableOptions {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            transparent_background: true,
            out_of_range: Some(Color::BLACK),
            transparent_out_of_range: false,
            opacity: 100,
            ink: Color::BLACK,
            banner: Color::WHITE,
        }
    }
}

/// Palette bands followed by the reserved entries, fixed at construction
/// and shared read-only by every frame rendered with it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedColourTable {
    entries: Vec<Color>,
    num_bands: usize,
}

impl IndexedColourTable {
    pub fn new(palette: &Palette, options: &ColourTableOptions) -> FieldResult<Self> {
        if options.opacity > 100 {
            return Err(FieldError::domain(format!(
                "Opacity {}% exceeds 100%",
                options.opacity
            )));
        }

        let num_bands = palette.len();
        let mut entries = Vec::with_capacity(num_bands + RESERVED_ENTRIES);
        entries.extend(
            palette
                .colours()
                .iter()
                .map(|c| c.with_alpha(scale_alpha(c.a, options.opacity))),
        );

        let background = if options.transparent_background {
            Color::TRANSPARENT
        } else {
            options.background
        };
        let out_of_range = if options.transparent_out_of_range {
            Color::TRANSPARENT
        } else {
            options.out_of_range.unwrap_or(background)
        };

        entries.push(background);
        entries.push(out_of_range);
        entries.push(options.ink);
        entries.push(options.banner);

        Ok(Self { entries, num_bands })
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn entries(&self) -> &[Color] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn background_index(&self) -> u8 {
        self.num_bands as u8
    }

    pub fn out_of_range_index(&self) -> u8 {
        (self.num_bands + 1) as u8
    }

    pub fn ink_index(&self) -> u8 {
        (self.num_bands + 2) as u8
    }

    pub fn banner_index(&self) -> u8 {
        (self.num_bands + 3) as u8
    }

    /// Colour for an index; unknown indices map to the background entry.
    pub fn colour(&self, index: u8) -> Color {
        self.entries
            .get(index as usize)
            .copied()
            .unwrap_or(self.entries[self.num_bands])
    }

    /// Entries as RGBA tuples for the PNG encoder.
    pub fn rgba_tuples(&self) -> Vec<(u8, u8, u8, u8)> {
        self.entries.iter().map(|c| c.to_rgba()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    #[test]
    fn test_generate_identity_and_endpoints() {
        let seed = vec![RED, Color::rgb(0, 255, 0), BLUE];
        assert_eq!(generate(&seed, 3).unwrap(), seed);
        for n in 2..=MAX_PALETTE_SIZE {
            let out = generate(&seed, n).unwrap();
            assert_eq!(out.len(), n);
            assert_eq!(out[0], RED);
            assert_eq!(out[n - 1], BLUE);
        }
    }

    #[test]
    fn test_generate_growing_interpolates() {
        let out = generate(&[Color::BLACK, Color::WHITE], 5).unwrap();
        assert_eq!(out[1], Color::rgb(64, 64, 64));
        assert_eq!(out[2], Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_generate_shrinking_subsamples() {
        let seed: Vec<Color> = (0..9).map(|i| Color::rgb(i * 10, 0, 0)).collect();
        let out = generate(&seed, 3).unwrap();
        assert_eq!(out, vec![seed[0], seed[4], seed[8]]);
    }

    #[test]
    fn test_generate_errors() {
        assert!(generate::<Color>(&[], 4).is_err());
        assert!(generate(&[RED, BLUE], 0).is_err());
        assert!(generate(&[RED, BLUE], 251).is_err());
        assert_eq!(generate(&[RED, BLUE], 1).unwrap(), vec![RED]);
    }

    #[test]
    fn test_get_colour() {
        let palette = Palette::new(vec![RED, Color::WHITE, BLUE]).unwrap();
        assert_eq!(palette.get_colour(0.0).unwrap(), RED);
        assert_eq!(palette.get_colour(0.5).unwrap(), Color::WHITE);
        assert_eq!(palette.get_colour(1.0).unwrap(), BLUE);
        assert!(palette.get_colour(1.01).is_err());
        assert!(palette.get_colour(-0.1).is_err());
    }

    #[test]
    fn test_presets() {
        for name in PRESET_NAMES {
            let palette = Palette::named(name, 20).unwrap();
            assert_eq!(palette.len(), 20);
        }
        assert!(Palette::named("Viridis", 5).is_ok());
        assert!(matches!(Palette::named("nope", 5), Err(FieldError::Domain(_))));
    }

    #[test]
    fn test_reversed_and_opacity() {
        let palette = Palette::new(vec![RED, BLUE]).unwrap();
        assert_eq!(palette.reversed().colours(), &[BLUE, RED]);
        assert_eq!(palette.with_opacity(50).unwrap().colours()[0].a, 128);
        assert!(palette.with_opacity(101).is_err());
    }

    #[test]
    fn test_colour_table_reserved_entries() {
        let palette = Palette::new(vec![RED, BLUE]).unwrap();
        let options = ColourTableOptions {
            out_of_range: Some(Color::rgb(1, 2, 3)),
            ..Default::default()
        };
        let table = palette.colour_table(&options).unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(table.colour(table.background_index()), Color::TRANSPARENT);
        assert_eq!(table.colour(table.out_of_range_index()), Color::rgb(1, 2, 3));
        assert_eq!(table.colour(table.ink_index()), Color::BLACK);
        assert_eq!(table.colour(table.banner_index()), Color::WHITE);
        assert_eq!(table.colour(200), Color::TRANSPARENT);

        let opaque_bg = ColourTableOptions {
            transparent_background: false,
            background: Color::rgb(9, 9, 9),
            out_of_range: None,
            ..Default::default()
        };
        let table = palette.colour_table(&opaque_bg).unwrap();
        assert_eq!(table.colour(2), Color::rgb(9, 9, 9));
        assert_eq!(table.colour(3), Color::rgb(9, 9, 9));
    }
}
