//! Benchmarks for the renderer crate - raster fill, grid sampling and encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use field_common::{BoundingBox, Color};
use field_grid::{GridArray, RectilinearGrid, RegularAxis};
use rand::Rng;
use renderer::frame::{Frame, PlotKind};
use renderer::palette::{ColourTableOptions, IndexedColourTable, Palette};
use renderer::png::{create_png, create_png_auto};
use renderer::rgba::render_style_rgba;
use renderer::sampling::sample_grid;
use renderer::scale::ColourScale;
use renderer::style::{Interpolate, StyleFunction};
use renderer::writer::{GifWriter, ImageWriter};
use renderer::FrameTiming;

/// Temperature-like samples in Kelvin with noise, southern row first.
fn generate_temperature_samples(width: usize, height: usize) -> Vec<Option<f64>> {
    let mut rng = rand::thread_rng();
    let mut data = Vec::with_capacity(width * height);

    for y in 0..height {
        for x in 0..width {
            let lat_factor = (y as f64 / height as f64 - 0.5) * 60.0;
            let lon_factor = ((x as f64 / width as f64) * std::f64::consts::PI * 4.0).sin() * 5.0;
            let noise = rng.gen_range(-3.0..3.0);
            // One sample in fifty is missing
            if rng.gen_ratio(1, 50) {
                data.push(None);
            } else {
                data.push(Some(273.15 + lat_factor + lon_factor + noise));
            }
        }
    }
    data
}

/// Random RGBA pixel data for PNG encoding benchmarks.
fn generate_rgba_data(width: usize, height: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut data = vec![0u8; width * height * 4];
    for chunk in data.chunks_mut(4) {
        chunk[0] = rng.gen();
        chunk[1] = rng.gen();
        chunk[2] = rng.gen();
        chunk[3] = 255;
    }
    data
}

fn colour_table(bands: usize) -> IndexedColourTable {
    Palette::named("occam", bands)
        .expect("preset exists")
        .colour_table(&ColourTableOptions::default())
        .expect("valid table")
}

fn temperature_style() -> StyleFunction<Color> {
    Interpolate::new(
        vec![
            (233.15, Color::rgb(0x1E, 0x00, 0x82)),
            (253.15, Color::rgb(0x00, 0x96, 0xFF)),
            (273.15, Color::rgb(0x96, 0xFF, 0xC8)),
            (293.15, Color::rgb(0xFF, 0x96, 0x00)),
            (313.15, Color::rgb(0x96, 0x00, 0x00)),
        ],
        None,
    )
    .expect("sorted points")
    .into()
}

// =============================================================================
// RASTER FILL BENCHMARKS
// =============================================================================

fn bench_raster_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("raster_fill");
    let table = colour_table(250);
    let scale = ColourScale::new(233.15, 313.15, false, 250).expect("valid scale");

    for size in [256usize, 512, 1024] {
        let mut frame = Frame::new(size, size, BoundingBox::new(0.0, 0.0, 1.0, 1.0)).expect("non-zero size");
        frame
            .add_layer(generate_temperature_samples(size, size), PlotKind::Raster)
            .expect("matching size");

        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("indexed", size), &frame, |b, frame| {
            b.iter(|| frame.render(black_box(&scale), &table));
        });
    }
    group.finish();
}

fn bench_rgba_style(c: &mut Criterion) {
    let mut group = c.benchmark_group("rgba_style");
    let style = temperature_style();

    for size in [256usize, 512] {
        let samples = generate_temperature_samples(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("interpolate", size), &samples, |b, samples| {
            b.iter(|| render_style_rgba(&style, None, black_box(samples), size, size));
        });
    }
    group.finish();
}

// =============================================================================
// GRID SAMPLING BENCHMARKS
// =============================================================================

fn bench_sample_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_grid");

    // GFS-like 0.25 degree global grid
    let grid = RectilinearGrid::new(
        RegularAxis::new("longitude", 0.0, 0.25, 1440, true).expect("valid axis"),
        RegularAxis::new("latitude", -90.0, 0.25, 721, false).expect("valid axis"),
    );
    let values = GridArray::from_fn(1440, 721, |i, j| (i + j) as f32);

    let bboxes = [
        (BoundingBox::new(-130.0, 20.0, -60.0, 55.0), "conus"),
        (BoundingBox::new(-180.0, -90.0, 180.0, 90.0), "global"),
    ];
    for (bbox, name) in bboxes {
        group.throughput(Throughput::Elements(512 * 256));
        group.bench_with_input(BenchmarkId::new(name, "512x256"), &bbox, |b, bbox| {
            b.iter(|| sample_grid(&grid, &values, black_box(bbox), 512, 256));
        });
    }
    group.finish();
}

// =============================================================================
// ENCODING BENCHMARKS
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");
    let table = colour_table(64);
    let scale = ColourScale::new(233.15, 313.15, false, 64).expect("valid scale");

    for size in [256usize, 512] {
        let mut frame = Frame::new(size, size, BoundingBox::new(0.0, 0.0, 1.0, 1.0)).expect("non-zero size");
        frame
            .add_layer(generate_temperature_samples(size, size), PlotKind::Raster)
            .expect("matching size");
        let image = frame.render(&scale, &table).expect("renders");
        let palette = table.rgba_tuples();

        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("indexed_frame", size), &image, |b, image| {
            b.iter(|| renderer::png::create_png_indexed(size, size, &palette, black_box(image.pixels())));
        });

        let rgba = generate_rgba_data(size, size);
        group.bench_with_input(BenchmarkId::new("rgba_noise", size), &rgba, |b, rgba| {
            b.iter(|| create_png(black_box(rgba), size, size));
        });
        group.bench_with_input(BenchmarkId::new("auto_noise", size), &rgba, |b, rgba| {
            b.iter(|| create_png_auto(black_box(rgba), size, size));
        });
    }
    group.finish();
}

fn bench_gif_animation(c: &mut Criterion) {
    let table = colour_table(64);
    let scale = ColourScale::new(233.15, 313.15, false, 64).expect("valid scale");
    let frames: Vec<_> = (0..12)
        .map(|_| {
            let mut frame = Frame::new(256, 256, BoundingBox::new(0.0, 0.0, 1.0, 1.0)).expect("non-zero size");
            frame
                .add_layer(generate_temperature_samples(256, 256), PlotKind::Raster)
                .expect("matching size");
            frame.render(&scale, &table).expect("renders")
        })
        .collect();

    c.bench_function("gif_12_frames_256", |b| {
        b.iter(|| GifWriter.write(black_box(&frames), &table, &FrameTiming::default()));
    });
}

criterion_group!(
    benches,
    bench_raster_fill,
    bench_rgba_style,
    bench_sample_grid,
    bench_png_encoding,
    bench_gif_animation,
);
criterion_main!(benches);
