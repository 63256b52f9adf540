use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use crate::error::{ProcessingError, ProcessingResult};

/// Output format for optimized images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    WebP,
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn parse(s: &str) -> ProcessingResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "webp" => Ok(OutputFormat::WebP),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(ProcessingError::UnsupportedFormat(s.to_string())),
        }
    }

    /// File extension written for this format, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::WebP => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

/// Encoders for each output format
pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode `img` as `format`. `quality` (1-100) applies to the lossy formats only.
    pub fn compress(img: &DynamicImage, format: OutputFormat, quality: u8) -> ProcessingResult<Bytes> {
        let quality = quality.clamp(1, 100);
        match format {
            OutputFormat::WebP => Self::compress_webp(img, quality),
            OutputFormat::Jpeg => Self::compress_jpeg(img, quality),
            OutputFormat::Png => Self::compress_png(img),
        }
    }

    /// Compress to JPEG
    fn compress_jpeg(img: &DynamicImage, quality: u8) -> ProcessingResult<Bytes> {
        let mut buffer = Vec::new();
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))
            .map_err(|e| ProcessingError::Encode(format!("JPEG: {}", e)))?;

        Ok(Bytes::from(buffer))
    }

    /// Compress to PNG
    fn compress_png(img: &DynamicImage) -> ProcessingResult<Bytes> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ProcessingError::Encode(format!("PNG: {}", e)))?;

        Ok(Bytes::from(buffer))
    }

    /// Compress to WebP (lossy)
    fn compress_webp(img: &DynamicImage, quality: u8) -> ProcessingResult<Bytes> {
        let (width, height) = img.dimensions();

        // Convert to RGBA for WebP encoding
        let rgba_img = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder.encode(quality as f32);

        if webp_data.is_empty() {
            return Err(ProcessingError::Encode("WebP encoder produced no data".to_string()));
        }

        Ok(Bytes::copy_from_slice(&webp_data))
    }
}
