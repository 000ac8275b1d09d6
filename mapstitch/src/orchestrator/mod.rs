//! Build orchestration
//!
//! Coordinates anchor resolution, grid planning, parallel tile fetching and
//! compositing into one stitched image.

mod build;
mod types;

pub use build::StitchOrchestrator;
pub use types::{BuildError, BuildProgress, InputError};
