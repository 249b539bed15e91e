mod decoder;
mod equalize;
mod normalize;

pub use decoder::{ChannelOrder, DecodedImage, FileDecoder, ImageDecoder};
pub use equalize::{equalize_channel, equalize_rgb, merge_channels, split_channels};
pub use normalize::{
    center_window, fetch_normalized, normalize, normalize_catalog, resize_and_crop,
    to_canonical_rgb, to_grayscale, GrayTensor, NormalizeOptions, NormalizedImage, STANDARD_SIZE,
};
