//! Per-image normalization: channel correction, scale + center crop,
//! histogram equalization and grayscale reduction.
//!
//! Every function here is pure; the batch helper parallelizes across images
//! without shared state.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, RgbImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::decoder::{ChannelOrder, DecodedImage, ImageDecoder};
use super::equalize::equalize_rgb;
use crate::core::dataset::{Catalog, SampleRecord};
use crate::error::{DatasetError, DatasetResult};

/// Side length of the square output used unless configured otherwise
pub const STANDARD_SIZE: u32 = 256;

/// Single-channel floating point image with samples in `[0.0, 1.0]`
pub type GrayTensor = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Which optional steps the pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub target_size: u32,
    pub equalize: bool,
    pub grayscale: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            target_size: STANDARD_SIZE,
            equalize: true,
            grayscale: true,
        }
    }
}

/// Output of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedImage {
    Rgb(RgbImage),
    Gray(GrayTensor),
}

impl NormalizedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            NormalizedImage::Rgb(img) => img.dimensions(),
            NormalizedImage::Gray(img) => img.dimensions(),
        }
    }
}

/// Reorder channels to RGB. `Rgb` input is returned as is.
pub fn to_canonical_rgb(decoded: DecodedImage) -> RgbImage {
    match decoded.order {
        ChannelOrder::Rgb => decoded.pixels,
        ChannelOrder::Bgr => {
            let mut pixels = decoded.pixels;
            for pixel in pixels.pixels_mut() {
                pixel.0.swap(0, 2);
            }
            pixels
        }
    }
}

/// Crop bounds `[start, end)` of a `size`-wide window centered in `extent`.
///
/// Bounds are truncated toward zero. Both ends sit on the same half-sample
/// grid, so the window is exactly `size` wide whenever `extent >= size`.
pub fn center_window(extent: u32, size: u32) -> (u32, u32) {
    let center = extent as f64 / 2.0;
    let half = size as f64 / 2.0;
    let start = (center - half).trunc().max(0.0) as u32;
    let end = ((center + half).trunc() as u32).min(extent);
    (start.min(end), end)
}

/// Scale the short side to `size` and take the centered `size x size` window.
///
/// Scaled dimensions are `round(dim * size / min(h, w))`; resampling uses a
/// triangle filter whose support widens when downscaling.
pub fn resize_and_crop(img: &RgbImage, size: u32) -> DatasetResult<RgbImage> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(DatasetError::InvalidImage(format!(
            "cannot rescale a {}x{} image",
            width, height
        )));
    }
    if size == 0 {
        return Err(DatasetError::InvalidImage("target size must be positive".to_string()));
    }

    let scale = size as f64 / width.min(height) as f64;
    let scaled_width = ((width as f64 * scale).round() as u32).max(1);
    let scaled_height = ((height as f64 * scale).round() as u32).max(1);
    let scaled = imageops::resize(img, scaled_width, scaled_height, FilterType::Triangle);

    let (x0, x1) = center_window(scaled_width, size);
    let (y0, y1) = center_window(scaled_height, size);
    debug!(
        "Rescaled {}x{} -> {}x{}, crop x[{}, {}) y[{}, {})",
        width, height, scaled_width, scaled_height, x0, x1, y0, y1
    );

    Ok(imageops::crop_imm(&scaled, x0, y0, x1 - x0, y1 - y0).to_image())
}

/// Luminance of an RGB pixel, `0.299 R + 0.587 G + 0.114 B` rounded to `u8`
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    // 14-bit fixed point weights, summing to 1 << 14
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    ((r as u32 * R + g as u32 * G + b as u32 * B + (1 << 13)) >> 14) as u8
}

/// Reduce RGB to luminance and rescale `0..=255` to `[0.0, 1.0]`
pub fn to_grayscale(img: &RgbImage) -> GrayTensor {
    let (width, height) = img.dimensions();
    GrayTensor::from_fn(width, height, |x, y| {
        let [r, g, b] = img.get_pixel(x, y).0;
        Luma([luminance(r, g, b) as f32 / 255.0])
    })
}

/// Run the full pipeline on one decoded image
pub fn normalize(decoded: DecodedImage, options: &NormalizeOptions) -> DatasetResult<NormalizedImage> {
    let rgb = to_canonical_rgb(decoded);
    let mut img = resize_and_crop(&rgb, options.target_size)?;
    if options.equalize {
        img = equalize_rgb(&img);
    }

    if options.grayscale {
        Ok(NormalizedImage::Gray(to_grayscale(&img)))
    } else {
        Ok(NormalizedImage::Rgb(img))
    }
}

/// Decode the record's image and normalize it
pub fn fetch_normalized(
    decoder: &dyn ImageDecoder,
    record: &SampleRecord,
    options: &NormalizeOptions,
) -> DatasetResult<NormalizedImage> {
    let decoded = decoder.decode(&record.full_path)?;
    normalize(decoded, options)
}

/// Normalize every row of a catalog in parallel.
///
/// Results are in catalog row order. A failure affects only its own row.
pub fn normalize_catalog(
    decoder: &dyn ImageDecoder,
    catalog: &Catalog,
    options: &NormalizeOptions,
) -> Vec<DatasetResult<NormalizedImage>> {
    let results: Vec<DatasetResult<NormalizedImage>> = catalog
        .records()
        .par_iter()
        .map(|record| fetch_normalized(decoder, record, options))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!("{} of {} images failed to normalize", failed, results.len());
    }
    results
}
