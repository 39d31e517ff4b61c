//! Job execution.
//!
//! Segment styles and palette jobs go through the indexed path (frames,
//! shared scale, PNG or GIF). Other styles have no bands, so they render a
//! single frame straight to RGBA PNG. So does a single-frame PNG segment
//! style whose below and above colours differ, since the colour table has
//! one out-of-range entry.

use crate::job::{load_layer_samples, load_points, FrameSpec, LayerSpec, RenderJob};
use anyhow::{bail, Context, Result};
use field_common::{BoundingBox, ValidTime};
use renderer::animation::{Animation, ScaleMode};
use renderer::config::{CompiledStyle, StyleDocument};
use renderer::frame::{Frame, PlotKind};
use renderer::legend::{render_legend, LegendOptions};
use renderer::palette::{ColourTableOptions, IndexedColourTable, Palette};
use renderer::rgba::{encode_rgba_png, render_style_rgba};
use renderer::scale::ColourScale;
use renderer::style::StyleFunction;
use renderer::writer::{writer_for_path, ImageWriter, PngWriter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where to write results.
#[derive(Debug, Clone)]
pub struct RenderTargets {
    pub output: PathBuf,
    pub legend: Option<PathBuf>,
}

/// What a finished job produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub frames: usize,
    pub bytes: usize,
    /// Shared scale of the indexed path
    pub scale: Option<ColourScale>,
}

/// Run a job whose relative paths resolve against `base`.
pub fn run_job(
    job: &RenderJob,
    base: &Path,
    styles: Option<&StyleDocument>,
    targets: &RenderTargets,
) -> Result<RenderSummary> {
    let style = match (&job.style, styles) {
        (Some(name), Some(doc)) => Some(doc.compile(name)?),
        (Some(name), None) => bail!("Job uses style '{}' but no style document was given", name),
        (None, _) => None,
    };

    match style {
        Some(style) => match &style.colour {
            StyleFunction::Segment(segment) => {
                let palette = segment.palette()?;
                let options = segment.colour_table_options(&job.colour_table);
                if !segment.fits_colour_table() {
                    if job.frames.len() == 1 && is_png(&targets.output) {
                        let legend = Some((*segment.scale(), palette.colour_table(&options)?));
                        return render_rgba(job, base, &style, legend, targets);
                    }
                    warn!(
                        style = %style.name,
                        "Below and above colours differ; out-of-range samples use the above colour"
                    );
                }
                let mode = ScaleMode::Fixed(*segment.scale());
                let legend = style.legend.clone();
                render_indexed(job, base, palette, &options, mode, legend, targets)
            }
            _ => render_rgba(job, base, &style, None, targets),
        },
        None => {
            let palette = Palette::named(&job.palette, job.scale.num_bands() as usize)?;
            render_indexed(job, base, palette, &job.colour_table, job.scale.to_mode()?, None, targets)
        }
    }
}

fn render_indexed(
    job: &RenderJob,
    base: &Path,
    palette: Palette,
    options: &ColourTableOptions,
    mode: ScaleMode,
    legend: Option<LegendOptions>,
    targets: &RenderTargets,
) -> Result<RenderSummary> {
    let bbox = job.bbox()?;
    let table = palette.colour_table(options)?;

    let mut animation = Animation::new(job.width, job.height, mode).with_timing(job.timing);
    for spec in &job.frames {
        let instant = spec.instant()?;
        let frame = build_frame(job, base, spec, &instant, &bbox)?;
        animation.insert(instant, frame)?;
    }

    let rendered = animation.render(&table)?;
    info!(
        frames = rendered.images.len(),
        low = rendered.scale.low(),
        high = rendered.scale.high(),
        "Rendered frames"
    );

    let writer = writer_for_path(&targets.output)?;
    let bytes = writer.write(&rendered.images, &table, &rendered.timing)?;
    write_output(&targets.output, &bytes)?;

    if let Some(path) = &targets.legend {
        let options = legend.unwrap_or_default();
        let image = render_legend(&rendered.scale, &table, &options)?;
        PngWriter.write_to_path(path, std::slice::from_ref(&image), &table, &rendered.timing)?;
        info!(path = %path.display(), "Wrote legend");
    }

    Ok(RenderSummary {
        frames: rendered.images.len(),
        bytes: bytes.len(),
        scale: Some(rendered.scale),
    })
}

fn build_frame(job: &RenderJob, base: &Path, spec: &FrameSpec, instant: &ValidTime, bbox: &BoundingBox) -> Result<Frame> {
    let mut frame = Frame::new(job.width, job.height, *bbox)?;
    let label = spec
        .label
        .clone()
        .or_else(|| job.label_times.then(|| instant.label()));
    frame.set_label(label);

    for layer in &spec.layers {
        match layer {
            LayerSpec::Raster { samples, grid } => {
                let values = load_layer_samples(base, samples.as_deref(), grid.as_deref(), bbox, job.width, job.height)?;
                frame.add_layer(values, PlotKind::Raster)?;
            }
            LayerSpec::Vector {
                samples,
                grid,
                arrow_length,
            } => {
                let values = load_layer_samples(base, samples.as_deref(), grid.as_deref(), bbox, job.width, job.height)?;
                frame.add_layer(
                    values,
                    PlotKind::Vector {
                        arrow_length: *arrow_length,
                    },
                )?;
            }
            LayerSpec::Points { file } => {
                frame.add_glyph_layer(load_points(base, file)?);
            }
        }
    }

    debug!(time = %instant, layers = frame.layers().len(), "Built frame");
    Ok(frame)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Render one frame pixel by pixel. `bands` carries the scale and table of
/// a segment style, for the legend and the summary.
fn render_rgba(
    job: &RenderJob,
    base: &Path,
    style: &CompiledStyle,
    bands: Option<(ColourScale, IndexedColourTable)>,
    targets: &RenderTargets,
) -> Result<RenderSummary> {
    if job.frames.len() != 1 {
        bail!(
            "Style '{}' renders directly and can only draw a single frame, got {}",
            style.name,
            job.frames.len()
        );
    }
    if !is_png(&targets.output) {
        bail!("Style '{}' renders to PNG only", style.name);
    }

    let bbox = job.bbox()?;
    let spec = &job.frames[0];
    let (samples, grid) = spec
        .layers
        .iter()
        .find_map(|layer| match layer {
            LayerSpec::Raster { samples, grid } => Some((samples, grid)),
            _ => None,
        })
        .with_context(|| format!("Frame {} has no raster layer", spec.time))?;
    if spec.layers.len() > 1 {
        warn!(style = %style.name, "Only the first raster layer is drawn with a non-banded style");
    }

    let values = load_layer_samples(base, samples.as_deref(), grid.as_deref(), &bbox, job.width, job.height)?;
    let image = render_style_rgba(&style.colour, style.opacity.as_ref(), &values, job.width, job.height)?;
    let bytes = encode_rgba_png(&image)?;
    write_output(&targets.output, &bytes)?;

    match (&bands, &targets.legend) {
        (Some((scale, table)), Some(path)) => {
            let options = style.legend.clone().unwrap_or_default();
            let legend = render_legend(scale, table, &options)?;
            PngWriter.write_to_path(path, std::slice::from_ref(&legend), table, &job.timing)?;
            info!(path = %path.display(), "Wrote legend");
        }
        (None, Some(_)) => warn!(style = %style.name, "Legends need a banded style; skipping"),
        _ => {}
    }

    Ok(RenderSummary {
        frames: 1,
        bytes: bytes.len(),
        scale: bands.map(|(scale, _)| scale),
    })
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "Wrote output");
    Ok(())
}
