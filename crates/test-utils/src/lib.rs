//! Shared test utilities for the field-render workspace.
//!
//! Synthetic canvas samples and grids, style document fixtures and
//! temporary-file helpers. Add as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;
