//! Output writers for indexed images.
//!
//! Writers take frames that share one [`IndexedColourTable`], in the order
//! they should appear. PNG holds a single still; GIF holds an animation
//! with the table as its global palette.

use crate::animation::{FrameTiming, RenderedAnimation};
use crate::canvas::RasterImage;
use crate::palette::IndexedColourTable;
use crate::png::create_png_indexed;
use field_common::{FieldError, FieldResult};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, warn};

/// Encodes indexed frames into an image format.
pub trait ImageWriter: Send + Sync {
    fn mime_type(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    fn supports_multiple_frames(&self) -> bool;

    fn write(&self, frames: &[RasterImage], table: &IndexedColourTable, timing: &FrameTiming) -> FieldResult<Vec<u8>>;

    /// Encode a rendered animation in instant order.
    fn write_animation<K>(&self, animation: &RenderedAnimation<K>, table: &IndexedColourTable) -> FieldResult<Vec<u8>>
    where
        Self: Sized,
    {
        self.write(&animation.images, table, &animation.timing)
    }

    /// Encode and write to `path`.
    fn write_to_path(
        &self,
        path: &Path,
        frames: &[RasterImage],
        table: &IndexedColourTable,
        timing: &FrameTiming,
    ) -> FieldResult<()> {
        let bytes = self.write(frames, table, timing)?;
        std::fs::write(path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote image");
        Ok(())
    }
}

/// Pick a writer from a file extension (`png` or `gif`).
pub fn writer_for_path(path: &Path) -> FieldResult<Box<dyn ImageWriter>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok(Box::new(PngWriter)),
        "gif" => Ok(Box::new(GifWriter)),
        other => Err(FieldError::Unsupported(format!(
            "No image writer for extension '{}'",
            other
        ))),
    }
}

fn check_frames(frames: &[RasterImage], table: &IndexedColourTable) -> FieldResult<(usize, usize)> {
    let first = frames
        .first()
        .ok_or_else(|| FieldError::format("No frames to write"))?;
    let (width, height) = (first.width(), first.height());

    for frame in frames {
        if frame.width() != width || frame.height() != height {
            return Err(FieldError::format(format!(
                "Frame is {}x{} but the first frame is {}x{}",
                frame.width(),
                frame.height(),
                width,
                height
            )));
        }
        if let Some(&bad) = frame.pixels().iter().find(|&&p| p as usize >= table.len()) {
            return Err(FieldError::Encode(format!(
                "Pixel index {} outside colour table of {} entries",
                bad,
                table.len()
            )));
        }
    }
    Ok((width, height))
}

/// Single-frame indexed PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngWriter;

impl ImageWriter for PngWriter {
    fn mime_type(&self) -> &'static str {
        "image/png"
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn supports_multiple_frames(&self) -> bool {
        false
    }

    fn write(&self, frames: &[RasterImage], table: &IndexedColourTable, _timing: &FrameTiming) -> FieldResult<Vec<u8>> {
        if frames.len() != 1 {
            return Err(FieldError::format(format!(
                "PNG holds exactly one frame, got {}",
                frames.len()
            )));
        }
        let (width, height) = check_frames(frames, table)?;
        create_png_indexed(width, height, &table.rgba_tuples(), frames[0].pixels())
    }
}

/// Animated GIF with one global palette.
///
/// GIF has a single fully transparent index and no partial alpha. A
/// transparent background or out-of-range entry becomes that index (the
/// background wins when both are transparent); other entries are written
/// opaque.
#[derive(Debug, Clone, Copy, Default)]
pub struct GifWriter;

impl GifWriter {
    /// Global palette padded to 256 RGB entries.
    fn global_palette(table: &IndexedColourTable) -> Vec<u8> {
        let mut rgb: Vec<u8> = table.entries().iter().flat_map(|c| [c.r, c.g, c.b]).collect();
        rgb.resize(256 * 3, 0);
        rgb
    }

    /// The GIF transparent index, plus an index remap when background and
    /// out-of-range both ask for transparency and have to share the slot.
    fn transparency(table: &IndexedColourTable) -> (Option<u8>, Option<(u8, u8)>) {
        let background = table.background_index();
        let out_of_range = table.out_of_range_index();
        let bg_clear = table.colour(background).is_transparent();
        let oor_clear = table.colour(out_of_range).is_transparent();
        match (bg_clear, oor_clear) {
            (true, true) => {
                warn!("GIF has one transparent index; out-of-range pixels merged into background");
                (Some(background), Some((out_of_range, background)))
            }
            (true, false) => (Some(background), None),
            (false, true) => (Some(out_of_range), None),
            (false, false) => (None, None),
        }
    }
}

impl ImageWriter for GifWriter {
    fn mime_type(&self) -> &'static str {
        "image/gif"
    }

    fn extension(&self) -> &'static str {
        "gif"
    }

    fn supports_multiple_frames(&self) -> bool {
        true
    }

    fn write(&self, frames: &[RasterImage], table: &IndexedColourTable, timing: &FrameTiming) -> FieldResult<Vec<u8>> {
        let (width, height) = check_frames(frames, table)?;
        if width > u16::MAX as usize || height > u16::MAX as usize {
            return Err(FieldError::Encode(format!(
                "{}x{} exceeds the GIF size limit",
                width, height
            )));
        }

        let palette = Self::global_palette(table);
        let (transparent, merge) = Self::transparency(table);
        // GIF delays are in hundredths of a second
        let delay = (timing.delay_ms / 10).min(u16::MAX as u32) as u16;

        let encode_err = |e: gif::EncodingError| FieldError::Encode(format!("GIF encoding failed: {}", e));

        let mut buffer = Vec::new();
        {
            let mut encoder =
                gif::Encoder::new(&mut buffer, width as u16, height as u16, &palette).map_err(encode_err)?;
            if timing.loop_forever {
                encoder.set_repeat(gif::Repeat::Infinite).map_err(encode_err)?;
            }

            for image in frames {
                let pixels: Cow<[u8]> = match merge {
                    Some((from, to)) => Cow::Owned(
                        image
                            .pixels()
                            .iter()
                            .map(|&p| if p == from { to } else { p })
                            .collect(),
                    ),
                    None => Cow::Borrowed(image.pixels()),
                };

                let mut frame = gif::Frame::default();
                frame.width = width as u16;
                frame.height = height as u16;
                frame.delay = delay;
                frame.transparent = transparent;
                frame.dispose = gif::DisposalMethod::Background;
                frame.buffer = pixels;
                encoder.write_frame(&frame).map_err(encode_err)?;
            }
        }

        debug!(
            frames = frames.len(),
            width = width,
            height = height,
            bytes = buffer.len(),
            "Encoded GIF"
        );
        Ok(buffer)
    }
}
