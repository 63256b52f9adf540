//! Stormlead Processing Library
//!
//! Image optimization behind the narrow [`ImageOptimizer`] boundary: decode, fit inside a
//! bounding box without upscaling, and re-encode to WebP, JPEG or PNG.

pub mod compression;
pub mod error;
pub mod image;

pub use compression::OutputFormat;
pub use error::{ProcessingError, ProcessingResult};
pub use crate::image::{fit_within, Bounds, ImageOptimizer, ImageResize, RasterOptimizer};
