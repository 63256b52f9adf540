use image::{DynamicImage, GenericImageView};

use crate::error::{ProcessingError, ProcessingResult};

/// Bounding box an optimized image must fit inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Bounds {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

/// Largest size with the original aspect ratio that fits inside `bounds`.
///
/// Images already inside the box keep their size; nothing is ever enlarged.
pub fn fit_within(width: u32, height: u32, bounds: Bounds) -> ProcessingResult<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(ProcessingError::InvalidDimensions(format!(
            "source image is {}x{}",
            width, height
        )));
    }
    if bounds.max_width == 0 || bounds.max_height == 0 {
        return Err(ProcessingError::InvalidDimensions(format!(
            "bounds are {}x{}",
            bounds.max_width, bounds.max_height
        )));
    }

    if width <= bounds.max_width && height <= bounds.max_height {
        return Ok((width, height));
    }

    let scale = (bounds.max_width as f64 / width as f64).min(bounds.max_height as f64 / height as f64);
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, bounds.max_width);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, bounds.max_height);

    Ok((new_width, new_height))
}

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }

    /// Shrink `img` to fit inside `bounds`, returning it unchanged when it already fits.
    pub fn resize_to_fit(img: DynamicImage, bounds: Bounds) -> ProcessingResult<DynamicImage> {
        let (orig_width, orig_height) = img.dimensions();
        let (width, height) = fit_within(orig_width, orig_height, bounds)?;

        if (width, height) == (orig_width, orig_height) {
            return Ok(img);
        }

        let filter = Self::select_filter(orig_width, orig_height, width, height);
        Ok(img.resize_exact(width, height, filter))
    }
}
