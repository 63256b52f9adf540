//! Image processing module
//!
//! - Dimension math and filter selection (resize)
//! - The optimizer boundary and its raster implementation (optimizer)

pub mod optimizer;
pub mod resize;

pub use optimizer::{ImageOptimizer, RasterOptimizer};
pub use resize::{fit_within, Bounds, ImageResize};
