use image::RgbImage;
use std::path::Path;
use tracing::debug;

use crate::error::DecodeError;

/// Channel order of the three samples in each decoded pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// Raw decoder output: a three-channel `u8` buffer tagged with its channel
/// order. The buffer type says nothing about the order; callers must go
/// through `to_canonical_rgb` before equalizing or displaying.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: RgbImage,
    pub order: ChannelOrder,
}

/// Collaborator that turns a path into pixels.
///
/// Implementations must fail with `DecodeError` rather than return a blank
/// image.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;
}

/// Decoder backed by the `image` crate; yields RGB order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        let img = image::open(path).map_err(|e| DecodeError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("Decoded {:?} ({}x{})", path, img.width(), img.height());

        Ok(DecodedImage {
            pixels: img.to_rgb8(),
            order: ChannelOrder::Rgb,
        })
    }
}
