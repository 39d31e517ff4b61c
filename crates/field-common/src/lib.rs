//! Common types shared by the grid model and the renderer.

pub mod bbox;
pub mod color;
pub mod error;
pub mod time;

pub use bbox::BoundingBox;
pub use color::Color;
pub use error::{FieldError, FieldResult};
pub use time::ValidTime;
