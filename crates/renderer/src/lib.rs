//! Rendering of gridded field data into indexed images.
//!
//! Pipeline:
//! - Style functions and colour scales map samples to colours or
//!   colour-table indices
//! - Frames composite raster, vector and glyph layers with a label banner
//! - Animations share one auto-ranged scale across ordered frames
//! - Writers emit PNG stills and animated GIFs
//!
//! Styles without band structure can be rendered straight to RGBA with
//! [`rgba::render_style_rgba`].

pub mod animation;
pub mod canvas;
pub mod config;
pub mod frame;
pub mod glyphs;
pub mod legend;
pub mod palette;
pub mod png;
pub mod rgba;
pub mod sampling;
pub mod scale;
pub mod style;
pub mod text;
pub mod vectors;
pub mod writer;

pub use animation::{Animation, FrameTiming, RenderedAnimation, ScaleMode};
pub use canvas::RasterImage;
pub use config::{CompiledStyle, StyleDocument, StyleEntry, StyleError};
pub use frame::{Frame, PlotKind};
pub use glyphs::{GlyphIcon, GlyphPoint};
pub use legend::{render_legend, LegendOptions};
pub use palette::{ColourTableOptions, IndexedColourTable, Palette};
pub use scale::ColourScale;
pub use style::{StyleFunction, StyleValue};
pub use writer::{writer_for_path, GifWriter, ImageWriter, PngWriter};
