//! Render gridded field animations from job files.
//!
//! A job lists frames by valid time with the layers to draw in each; the
//! CLI renders them with one shared colour scale and writes a PNG still or
//! a GIF animation, plus an optional legend.

pub mod job;
pub mod render;

pub use job::RenderJob;
pub use render::{run_job, RenderSummary, RenderTargets};
