use image::{GrayImage, RgbImage};

/// Equalize the intensity histogram of a single 8-bit channel.
///
/// Lookup table is `round((cdf(v) - cdf_min) * 255 / (N - cdf_min))` where
/// `cdf_min` is the count of the darkest occupied bin. A channel holding a
/// single value is returned unchanged.
pub fn equalize_channel(channel: &GrayImage) -> GrayImage {
    let samples = channel.as_raw();
    let total = samples.len();

    let mut hist = [0usize; 256];
    for &v in samples {
        hist[v as usize] += 1;
    }

    let first = match hist.iter().position(|&count| count > 0) {
        Some(bin) => bin,
        None => return channel.clone(),
    };
    if hist[first] == total {
        return channel.clone();
    }

    let scale = 255.0 / (total - hist[first]) as f32;
    let mut lut = [0u8; 256];
    let mut sum = 0usize;
    for bin in (first + 1)..256 {
        sum += hist[bin];
        lut[bin] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }

    let mapped = samples.iter().map(|&v| lut[v as usize]).collect();
    GrayImage::from_raw(channel.width(), channel.height(), mapped)
        .unwrap_or_else(|| channel.clone())
}

/// Split a three-channel image into its planes, in buffer order
pub fn split_channels(img: &RgbImage) -> [GrayImage; 3] {
    let (width, height) = img.dimensions();
    [0usize, 1, 2].map(|c| {
        GrayImage::from_fn(width, height, |x, y| image::Luma([img.get_pixel(x, y)[c]]))
    })
}

/// Inverse of `split_channels`; planes must share dimensions
pub fn merge_channels(planes: &[GrayImage; 3]) -> RgbImage {
    let (width, height) = planes[0].dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            planes[0].get_pixel(x, y)[0],
            planes[1].get_pixel(x, y)[0],
            planes[2].get_pixel(x, y)[0],
        ])
    })
}

/// Equalize each color channel independently, keeping channel order
pub fn equalize_rgb(img: &RgbImage) -> RgbImage {
    let planes = split_channels(img).map(|plane| equalize_channel(&plane));
    merge_channels(&planes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_constant_channel_is_unchanged() {
        let plane = GrayImage::from_pixel(4, 4, Luma([77]));
        assert_eq!(equalize_channel(&plane), plane);
    }

    #[test]
    fn test_two_level_channel_spans_full_range() {
        let mut plane = GrayImage::from_pixel(2, 2, Luma([100]));
        plane.put_pixel(0, 0, Luma([50]));

        let eq = equalize_channel(&plane);
        assert_eq!(eq.get_pixel(0, 0)[0], 0);
        assert_eq!(eq.get_pixel(1, 1)[0], 255);
    }

    #[test]
    fn test_ramp_is_monotonic_and_stretched() {
        let plane = GrayImage::from_fn(16, 1, |x, _| Luma([100 + x as u8]));
        let eq = equalize_channel(&plane);
        let values: Vec<u8> = eq.pixels().map(|p| p[0]).collect();

        assert_eq!(values[0], 0);
        assert_eq!(values[15], 255);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_constant_color_channels_keep_order() {
        let img = RgbImage::from_pixel(5, 5, Rgb([10, 200, 90]));
        let eq = equalize_rgb(&img);
        assert_eq!(eq.get_pixel(2, 2), &Rgb([10, 200, 90]));
    }

    #[test]
    fn test_channels_match_isolated_equalization() {
        let img = RgbImage::from_fn(8, 8, |x, y| {
            Rgb([(x * 10) as u8, (y * 3 + 40) as u8, ((x + y) * 7) as u8])
        });
        let eq = equalize_rgb(&img);
        let eq_planes = split_channels(&eq);

        for (c, plane) in split_channels(&img).iter().enumerate() {
            assert_eq!(eq_planes[c], equalize_channel(plane), "channel {}", c);
        }
    }

    #[test]
    fn test_split_merge_identity() {
        let img = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, (x + y) as u8]));
        assert_eq!(merge_channels(&split_channels(&img)), img);
    }
}
