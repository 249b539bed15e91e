use crate::error::{DatasetError, DatasetResult};

/// Tokens of an `{image_number}_{class_number}_{latitude}_{longitude}.ext` name
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFileName {
    pub image_number: String,
    /// Class token as written in the file name (1-based)
    pub class_token: usize,
    pub latitude: f64,
    pub longitude: f64,
}

impl EncodedFileName {
    /// Zero-based class number used throughout the catalog.
    ///
    /// The file names count classes from 1; catalogs count from 0 so that the
    /// number lines up with a softmax output index.
    pub fn class_number(&self) -> usize {
        self.class_token - 1
    }
}

/// Remove a trailing extension, if any.
///
/// An extension is alphanumeric with at least one letter, so a bare
/// `..._-73.25` keeps its fractional longitude.
fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext))
            if ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic()) =>
        {
            stem
        }
        _ => file_name,
    }
}

/// Parse an encoded file name.
///
/// # Returns
/// * `Ok(EncodedFileName)` if the name has exactly four tokens and the class,
///   latitude and longitude tokens are numeric
/// * `Err(DatasetError::Integrity)` naming the file otherwise
pub fn parse_encoded_file_name(file_name: &str) -> DatasetResult<EncodedFileName> {
    let malformed = |detail: &str| {
        DatasetError::Integrity(format!("malformed file name '{}': {}", file_name, detail))
    };

    let tokens: Vec<&str> = strip_extension(file_name).split('_').collect();
    if tokens.len() != 4 {
        return Err(malformed(&format!("expected 4 tokens, found {}", tokens.len())));
    }

    let class_token = tokens[1]
        .parse::<usize>()
        .map_err(|_| malformed("class token is not an unsigned integer"))?;
    if class_token == 0 {
        return Err(malformed("class tokens start at 1"));
    }
    let latitude = tokens[2]
        .parse::<f64>()
        .map_err(|_| malformed("latitude is not a number"))?;
    let longitude = tokens[3]
        .parse::<f64>()
        .map_err(|_| malformed("longitude is not a number"))?;

    Ok(EncodedFileName {
        image_number: tokens[0].to_string(),
        class_token,
        latitude,
        longitude,
    })
}
