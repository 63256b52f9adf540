//! Image optimizer boundary
//!
//! Callers hand over raw file bytes and get encoded bytes back; codec details stay here.

use async_trait::async_trait;
use bytes::Bytes;
use image::GenericImageView;
use std::io::Cursor;

use crate::compression::{ImageCompressor, OutputFormat};
use crate::error::{ProcessingError, ProcessingResult};
use crate::image::resize::{Bounds, ImageResize};

/// Turns an encoded image into a bounded, re-encoded one.
#[async_trait]
pub trait ImageOptimizer: Send + Sync {
    async fn optimize(
        &self,
        data: Bytes,
        bounds: Bounds,
        quality: u8,
        format: OutputFormat,
    ) -> ProcessingResult<Bytes>;
}

/// [`ImageOptimizer`] backed by the `image` and `webp` crates.
///
/// Decoding and encoding are CPU bound and run on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterOptimizer;

impl RasterOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous pipeline: decode, fit inside `bounds`, encode.
    pub fn optimize_blocking(
        data: &[u8],
        bounds: Bounds,
        quality: u8,
        format: OutputFormat,
    ) -> ProcessingResult<Bytes> {
        let img = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let (orig_width, orig_height) = img.dimensions();
        let resized = ImageResize::resize_to_fit(img, bounds)?;
        let (width, height) = resized.dimensions();

        let encoded = ImageCompressor::compress(&resized, format, quality)?;

        tracing::debug!(
            orig_width,
            orig_height,
            width,
            height,
            format = format.extension(),
            input_bytes = data.len(),
            output_bytes = encoded.len(),
            "Image optimized"
        );

        Ok(encoded)
    }
}

#[async_trait]
impl ImageOptimizer for RasterOptimizer {
    async fn optimize(
        &self,
        data: Bytes,
        bounds: Bounds,
        quality: u8,
        format: OutputFormat,
    ) -> ProcessingResult<Bytes> {
        tokio::task::spawn_blocking(move || Self::optimize_blocking(&data, bounds, quality, format))
            .await
            .map_err(|e| ProcessingError::Encode(format!("Image task failed: {}", e)))?
    }
}
