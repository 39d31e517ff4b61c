//! Render job files.
//!
//! A job describes the canvas, the colour scale and one entry per frame
//! instant. Jobs are YAML or JSON:
//!
//! ```yaml
//! width: 360
//! height: 180
//! bbox: [-180, -90, 180, 90]
//! palette: viridis
//! scale: { mode: auto, num_bands: 50 }
//! timing: { delay_ms: 250 }
//! frames:
//!   - time: "2024-01-15T12:00:00Z"
//!     layers:
//!       - { kind: raster, grid: t2m_00.json }
//!       - { kind: vector, samples: wind_dir_00.json, arrow_length: 8 }
//! ```
//!
//! Relative file paths resolve against the job file's directory.

use anyhow::{bail, Context, Result};
use field_common::{BoundingBox, ValidTime};
use field_grid::{Axis, GridArray, RectilinearGrid};
use renderer::animation::{FrameTiming, ScaleMode};
use renderer::glyphs::GlyphPoint;
use renderer::palette::ColourTableOptions;
use renderer::sampling::sample_grid;
use renderer::scale::{ColourScale, MAX_BANDS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Job file
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJob {
    pub width: usize,
    pub height: usize,
    /// `[min_x, min_y, max_x, max_y]`
    pub bbox: [f64; 4],
    /// Style name in the style document passed with `--style`
    #[serde(default)]
    pub style: Option<String>,
    /// Preset palette when no style is given
    #[serde(default = "default_palette")]
    pub palette: String,
    #[serde(default)]
    pub scale: ScaleConfig,
    #[serde(default)]
    pub colour_table: ColourTableOptions,
    /// Label frames with their instant when they have no label of their own
    #[serde(default = "default_true")]
    pub label_times: bool,
    #[serde(default)]
    pub timing: FrameTiming,
    pub frames: Vec<FrameSpec>,
}

fn default_palette() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bands() -> u32 {
    MAX_BANDS
}

/// Scale selection for the indexed path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScaleConfig {
    Fixed {
        low: f64,
        high: f64,
        #[serde(default)]
        logarithmic: bool,
        #[serde(default = "default_bands")]
        num_bands: u32,
    },
    Auto {
        #[serde(default)]
        logarithmic: bool,
        #[serde(default = "default_bands")]
        num_bands: u32,
    },
}

impl Default for ScaleConfig {
    fn default() -> Self {
        ScaleConfig::Auto {
            logarithmic: false,
            num_bands: MAX_BANDS,
        }
    }
}

impl ScaleConfig {
    pub fn num_bands(&self) -> u32 {
        match self {
            ScaleConfig::Fixed { num_bands, .. } | ScaleConfig::Auto { num_bands, .. } => *num_bands,
        }
    }

    pub fn to_mode(&self) -> Result<ScaleMode> {
        Ok(match *self {
            ScaleConfig::Fixed {
                low,
                high,
                logarithmic,
                num_bands,
            } => ScaleMode::Fixed(ColourScale::new(low, high, logarithmic, num_bands)?),
            ScaleConfig::Auto {
                logarithmic,
                num_bands,
            } => ScaleMode::Auto {
                logarithmic,
                num_bands,
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSpec {
    /// ISO 8601 instant
    pub time: String,
    #[serde(default)]
    pub label: Option<String>,
    pub layers: Vec<LayerSpec>,
}

/// One frame layer. Raster and vector layers read either pre-sampled
/// values (`samples`) or a grid file (`grid`) sampled onto the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSpec {
    Raster {
        #[serde(default)]
        samples: Option<PathBuf>,
        #[serde(default)]
        grid: Option<PathBuf>,
    },
    Vector {
        #[serde(default)]
        samples: Option<PathBuf>,
        #[serde(default)]
        grid: Option<PathBuf>,
        arrow_length: f32,
    },
    Points {
        file: PathBuf,
    },
}

/// Rectilinear grid file: axis values plus values laid out `i * y.len() + j`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridFile {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub longitude: bool,
    pub values: Vec<Option<f32>>,
}

impl RenderJob {
    /// Load a job, choosing the parser from the file extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read job {}", path.display()))?;
        let job: RenderJob = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse job {}", path.display()))?,
            _ => serde_yaml::from_str(&content).with_context(|| format!("Failed to parse job {}", path.display()))?,
        };
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("Canvas size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.frames.is_empty() {
            bail!("Job has no frames");
        }
        self.bbox()?;
        let bands = self.scale.num_bands();
        if bands == 0 || bands > MAX_BANDS {
            bail!("Band count {} outside 1..={}", bands, MAX_BANDS);
        }
        for frame in &self.frames {
            frame.instant()?;
            for layer in &frame.layers {
                layer.validate()?;
            }
        }
        Ok(())
    }

    pub fn bbox(&self) -> Result<BoundingBox> {
        let [min_x, min_y, max_x, max_y] = self.bbox;
        Ok(BoundingBox::try_new(min_x, min_y, max_x, max_y)?)
    }
}

impl FrameSpec {
    pub fn instant(&self) -> Result<ValidTime> {
        ValidTime::parse(&self.time).with_context(|| format!("Invalid frame time '{}'", self.time))
    }
}

impl LayerSpec {
    fn validate(&self) -> Result<()> {
        match self {
            LayerSpec::Raster { samples, grid } | LayerSpec::Vector { samples, grid, .. } => {
                if samples.is_some() == grid.is_some() {
                    bail!("A layer needs exactly one of 'samples' or 'grid'");
                }
            }
            LayerSpec::Points { .. } => {}
        }
        Ok(())
    }
}

// ============================================================================
// Data files
// ============================================================================

/// Resolve `path` against `base` unless it is absolute.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Canvas samples for a raster or vector layer.
pub fn load_layer_samples(
    base: &Path,
    samples: Option<&Path>,
    grid: Option<&Path>,
    bbox: &BoundingBox,
    width: usize,
    height: usize,
) -> Result<Vec<Option<f64>>> {
    match (samples, grid) {
        (Some(path), None) => read_json(&resolve(base, path)),
        (None, Some(path)) => {
            let file: GridFile = read_json(&resolve(base, path))?;
            sample_grid_file(&file, bbox, width, height)
        }
        _ => bail!("A layer needs exactly one of 'samples' or 'grid'"),
    }
}

/// Sample a grid file onto the canvas; `null` values are missing.
pub fn sample_grid_file(file: &GridFile, bbox: &BoundingBox, width: usize, height: usize) -> Result<Vec<Option<f64>>> {
    let x = Axis::from_values("x", file.x.clone(), file.longitude)?;
    let y = Axis::from_values("y", file.y.clone(), false)?;
    let (nx, ny) = (x.size(), y.size());
    let grid = RectilinearGrid::new(x, y);

    let values = file.values.iter().map(|v| v.unwrap_or(f32::NAN)).collect();
    let values = GridArray::from_vec(nx, ny, values)?;
    Ok(sample_grid(&grid, &values, bbox, width, height)?)
}

pub fn load_points(base: &Path, file: &Path) -> Result<Vec<GlyphPoint>> {
    read_json(&resolve(base, file))
}
