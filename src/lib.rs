//! Labeled image-dataset preparation: catalog a raw photo tree, drop
//! denylisted samples, balance classes and normalize images into fixed-size
//! tensors.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use error::{DatasetError, DatasetResult, DecodeError};
pub use pipeline::{prepare_dataset, PreparedDataset};
