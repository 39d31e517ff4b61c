//! End-to-end tests: job files on disk rendered to images.

use render_cli::job::{FrameSpec, LayerSpec, RenderJob, ScaleConfig};
use render_cli::{run_job, RenderTargets};
use renderer::animation::FrameTiming;
use renderer::config::StyleDocument;
use std::path::PathBuf;
use tempfile::TempDir;
use test_utils::styles::STYLE_DOCUMENT;
use test_utils::{create_precipitation_samples, create_wind_speed_samples, temp_test_dir, write_test_file};

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

// ============================================================================
// Helper functions
// ============================================================================

fn write_samples(dir: &TempDir, name: &str, samples: &[Option<f64>]) -> PathBuf {
    write_test_file(dir, name, &serde_json::to_string(samples).unwrap())
}

fn raster(path: PathBuf) -> LayerSpec {
    LayerSpec::Raster {
        samples: Some(path),
        grid: None,
    }
}

fn job(frames: Vec<FrameSpec>) -> RenderJob {
    RenderJob {
        width: 16,
        height: 8,
        bbox: [0.0, 0.0, 16.0, 8.0],
        style: None,
        palette: "viridis".to_string(),
        scale: ScaleConfig::Auto {
            logarithmic: false,
            num_bands: 20,
        },
        colour_table: Default::default(),
        label_times: true,
        timing: FrameTiming {
            delay_ms: 300,
            loop_forever: true,
        },
        frames,
    }
}

fn frame(hour: u32, layers: Vec<LayerSpec>) -> FrameSpec {
    FrameSpec {
        time: format!("2024-01-15T{:02}:00:00Z", hour),
        label: None,
        layers,
    }
}

fn targets(dir: &TempDir, output: &str) -> RenderTargets {
    RenderTargets {
        output: dir.path().join(output),
        legend: None,
    }
}

// ============================================================================
// Indexed path
// ============================================================================

#[test]
fn test_gif_animation_with_legend() {
    let dir = temp_test_dir();
    let frames = (0..3)
        .map(|k| {
            let samples: Vec<_> = create_wind_speed_samples(16, 8)
                .into_iter()
                .map(|s| s.map(|v| v + 10.0 * k as f64))
                .collect();
            let path = write_samples(&dir, &format!("speed_{}.json", k), &samples);
            frame(k * 3, vec![raster(path)])
        })
        .collect();

    let mut t = targets(&dir, "wind.gif");
    t.legend = Some(dir.path().join("legend.png"));
    let summary = run_job(&job(frames), dir.path(), None, &t).unwrap();

    assert_eq!(summary.frames, 3);
    let scale = summary.scale.unwrap();
    assert_eq!(scale.num_bands(), 20);
    assert!(scale.low() < scale.high());

    let gif = std::fs::read(&t.output).unwrap();
    assert_eq!(&gif[0..6], b"GIF89a");
    assert_eq!(gif.len(), summary.bytes);
    let legend = std::fs::read(t.legend.unwrap()).unwrap();
    assert_eq!(&legend[0..8], &PNG_SIGNATURE);
}

#[test]
fn test_png_output_needs_single_frame() {
    let dir = temp_test_dir();
    let path = write_samples(&dir, "a.json", &create_wind_speed_samples(16, 8));
    let frames = vec![frame(0, vec![raster(path.clone())]), frame(6, vec![raster(path)])];

    assert!(run_job(&job(frames), dir.path(), None, &targets(&dir, "out.png")).is_err());
}

#[test]
fn test_unknown_output_extension() {
    let dir = temp_test_dir();
    let path = write_samples(&dir, "a.json", &create_wind_speed_samples(16, 8));
    let frames = vec![frame(0, vec![raster(path)])];

    assert!(run_job(&job(frames), dir.path(), None, &targets(&dir, "out.tiff")).is_err());
}

#[test]
fn test_yaml_job_with_grid_and_points() {
    let dir = temp_test_dir();
    write_test_file(
        &dir,
        "grid.json",
        r#"{"x": [0.5, 1.5, 2.5, 3.5], "y": [0.5, 1.5], "values": [1, 2, 3, 4, 5, 6, null, 8]}"#,
    );
    write_test_file(
        &dir,
        "stations.json",
        r#"[{"x": 1.0, "y": 1.0, "value": 12.5}, {"x": 3.0, "y": 0.5}]"#,
    );
    let job_path = write_test_file(
        &dir,
        "job.yaml",
        r#"
width: 8
height: 4
bbox: [0, 0, 4, 2]
palette: occam
scale: { mode: fixed, low: 0, high: 10, num_bands: 10 }
frames:
  - time: "2024-01-15T12:00:00Z"
    label: "Station obs"
    layers:
      - { kind: raster, grid: grid.json }
      - { kind: points, file: stations.json }
"#,
    );

    let job = RenderJob::from_file(&job_path).unwrap();
    let t = targets(&dir, "obs.png");
    let summary = run_job(&job, dir.path(), None, &t).unwrap();
    assert_eq!(summary.frames, 1);
    let scale = summary.scale.unwrap();
    assert_eq!((scale.low(), scale.high()), (0.0, 10.0));
    assert_eq!(&std::fs::read(&t.output).unwrap()[0..8], &PNG_SIGNATURE);
}

// ============================================================================
// Style documents
// ============================================================================

#[test]
fn test_segment_style_uses_its_scale() {
    let dir = temp_test_dir();
    let styles = StyleDocument::from_json(STYLE_DOCUMENT).unwrap();
    let path = write_samples(&dir, "speed.json", &create_wind_speed_samples(16, 8));

    let mut j = job(vec![frame(0, vec![raster(path)])]);
    j.style = Some("wind_speed".to_string());
    let mut t = targets(&dir, "speed.png");
    t.legend = Some(dir.path().join("speed_legend.png"));

    let summary = run_job(&j, dir.path(), Some(&styles), &t).unwrap();
    let scale = summary.scale.unwrap();
    assert_eq!((scale.low(), scale.high(), scale.num_bands()), (0.0, 50.0, 10));
    assert!(t.legend.unwrap().exists());
}

/// Two bands over [0, 10] with explicit edge colours.
fn edge_styles(below: &str, above: &str) -> StyleDocument {
    let json = format!(
        r##"{{
            "version": "1.0",
            "styles": {{
                "edges": {{
                    "name": "Edges",
                    "colour": {{
                        "type": "segment",
                        "range": [0, 10],
                        "num_segments": 2,
                        "palette": ["#0000FF", "#00FF00"],
                        "below_min": "{}",
                        "above_max": "{}"
                    }}
                }}
            }}
        }}"##,
        below, above
    );
    StyleDocument::from_json(&json).unwrap()
}

fn edge_job(dir: &TempDir, frames: &[u32]) -> RenderJob {
    let path = write_samples(dir, "edges.json", &[Some(-5.0), Some(2.0), Some(15.0)]);
    let mut j = job(frames.iter().map(|&h| frame(h, vec![raster(path.clone())])).collect());
    j.width = 3;
    j.height = 1;
    j.bbox = [0.0, 0.0, 3.0, 1.0];
    j.style = Some("edges".to_string());
    j.label_times = false;
    j
}

#[test]
fn test_segment_below_min_colour_in_png() {
    let dir = temp_test_dir();
    let styles = edge_styles("#FF0000", "#000000");
    let mut t = targets(&dir, "edges.png");
    t.legend = Some(dir.path().join("edges_legend.png"));

    let summary = run_job(&edge_job(&dir, &[0]), dir.path(), Some(&styles), &t).unwrap();
    assert_eq!(summary.scale.unwrap().num_bands(), 2);
    assert!(t.legend.unwrap().exists());

    let img = image::open(&t.output).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(2, 0).0, [0, 0, 0, 255]);
}

#[test]
fn test_segment_shared_edge_colour_in_gif() {
    let dir = temp_test_dir();
    let styles = edge_styles("#FF0000", "#FF0000");
    let t = targets(&dir, "edges.gif");

    let summary = run_job(&edge_job(&dir, &[0, 3]), dir.path(), Some(&styles), &t).unwrap();
    assert_eq!(summary.frames, 2);

    let img = image::open(&t.output).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(2, 0).0, [255, 0, 0, 255]);
}

#[test]
fn test_threshold_style_renders_rgba_png() {
    let dir = temp_test_dir();
    let styles = StyleDocument::from_json(STYLE_DOCUMENT).unwrap();
    let path = write_samples(&dir, "rain.json", &create_precipitation_samples(16, 8, 7));

    let mut j = job(vec![frame(0, vec![raster(path.clone())])]);
    j.style = Some("precipitation".to_string());

    let t = targets(&dir, "rain.png");
    let summary = run_job(&j, dir.path(), Some(&styles), &t).unwrap();
    assert_eq!(summary.scale, None);
    assert_eq!(&std::fs::read(&t.output).unwrap()[0..8], &PNG_SIGNATURE);

    // No bands, so no animation and no GIF
    assert!(run_job(&j, dir.path(), Some(&styles), &targets(&dir, "rain.gif")).is_err());
    j.frames.push(frame(3, vec![raster(path)]));
    assert!(run_job(&j, dir.path(), Some(&styles), &t).is_err());
}

#[test]
fn test_unknown_style_name() {
    let dir = temp_test_dir();
    let styles = StyleDocument::from_json(STYLE_DOCUMENT).unwrap();
    let path = write_samples(&dir, "a.json", &create_wind_speed_samples(16, 8));
    let mut j = job(vec![frame(0, vec![raster(path)])]);
    j.style = Some("sea_ice".to_string());

    assert!(run_job(&j, dir.path(), Some(&styles), &targets(&dir, "a.png")).is_err());
}
