//! Logging setup for the dataset preparation pipeline
//!
//! This module provides:
//! - Bracketed event formatting, with or without source locations
//! - Dual logging (timestamped file + stdout)

mod formatter;
mod setup;

pub use formatter::BracketedFormatter;
pub use setup::{default_filter, setup_logging};
