//! Ordered frame sequences sharing one colour scale.
//!
//! An [`Animation`] collects frames keyed by an orderable instant and is
//! consumed by [`Animation::render`]. In auto mode the shared scale is
//! resolved from every frame's data range before any frame is drawn, so
//! equal values get equal colours throughout the sequence.

use crate::canvas::RasterImage;
use crate::frame::{Frame, DEFAULT_LOG_RANGE, DEFAULT_RANGE};
use crate::palette::IndexedColourTable;
use crate::scale::ColourScale;
use field_common::{FieldError, FieldResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How the shared colour scale is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    Fixed(ColourScale),
    Auto { logarithmic: bool, num_bands: u32 },
}

/// Playback settings carried with rendered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTiming {
    pub delay_ms: u32,
    pub loop_forever: bool,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            delay_ms: 200,
            loop_forever: true,
        }
    }
}

pub struct Animation<K: Ord> {
    width: usize,
    height: usize,
    frames: BTreeMap<K, Frame>,
    scale_mode: ScaleMode,
    timing: FrameTiming,
}

/// Frames in ascending instant order with the scale they were drawn with.
#[derive(Debug, Clone)]
pub struct RenderedAnimation<K> {
    pub instants: Vec<K>,
    pub images: Vec<RasterImage>,
    pub scale: ColourScale,
    pub timing: FrameTiming,
}

impl<K: Ord + Clone + Send + Sync> Animation<K> {
    pub fn new(width: usize, height: usize, scale_mode: ScaleMode) -> Self {
        Self {
            width,
            height,
            frames: BTreeMap::new(),
            scale_mode,
            timing: FrameTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: FrameTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Add or replace the frame at `instant`; its size must match.
    pub fn insert(&mut self, instant: K, frame: Frame) -> FieldResult<()> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(FieldError::format(format!(
                "Frame is {}x{} but the animation is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        self.frames.insert(instant, frame);
        Ok(())
    }

    pub fn frame_mut(&mut self, instant: &K) -> Option<&mut Frame> {
        self.frames.get_mut(instant)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn instants(&self) -> impl Iterator<Item = &K> {
        self.frames.keys()
    }

    /// The scale every frame will share.
    pub fn resolve_scale(&self) -> FieldResult<ColourScale> {
        match self.scale_mode {
            ScaleMode::Fixed(scale) => Ok(scale),
            ScaleMode::Auto {
                logarithmic,
                num_bands,
            } => {
                let frames: Vec<&Frame> = self.frames.values().collect();
                let range = frames
                    .par_iter()
                    .filter_map(|f| f.data_range())
                    .reduce_with(|a, b| (a.0.min(b.0), a.1.max(b.1)))
                    .unwrap_or_else(|| {
                        let range = if logarithmic { DEFAULT_LOG_RANGE } else { DEFAULT_RANGE };
                        warn!(
                            frames = frames.len(),
                            low = range.0,
                            high = range.1,
                            "No finite samples in any frame; using default range"
                        );
                        range
                    });
                ColourScale::from_range(range, logarithmic, num_bands)
            }
        }
    }

    /// Resolve the shared scale, then render every frame.
    pub fn render(self, table: &IndexedColourTable) -> FieldResult<RenderedAnimation<K>> {
        if self.frames.is_empty() {
            return Err(FieldError::format("Animation has no frames"));
        }

        let scale = self.resolve_scale()?;
        debug!(
            frames = self.frames.len(),
            low = scale.low(),
            high = scale.high(),
            logarithmic = scale.is_logarithmic(),
            "Resolved animation scale"
        );

        let entries: Vec<(&K, &Frame)> = self.frames.iter().collect();
        let images = entries
            .par_iter()
            .map(|(_, frame)| frame.render(&scale, table))
            .collect::<FieldResult<Vec<_>>>()?;

        Ok(RenderedAnimation {
            instants: entries.iter().map(|(k, _)| (*k).clone()).collect(),
            images,
            scale,
            timing: self.timing,
        })
    }
}
