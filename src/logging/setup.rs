use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;
use crate::error::{DatasetError, DatasetResult};

/// `RUST_LOG` if set, else `info` with this crate at `debug`
pub fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let filter = EnvFilter::new("info");
        match "geo_image_dataset=debug".parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    })
}

/// Install a stdout + file subscriber; returns the log file path.
///
/// The file is `log_dir/dataset_prep_<timestamp>.log`.
pub fn setup_logging(log_dir: &Path) -> DatasetResult<PathBuf> {
    fs::create_dir_all(log_dir).map_err(|e| DatasetError::io(log_dir, e))?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("dataset_prep_{}.log", timestamp));

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)
        .map_err(|e| DatasetError::io(&log_path, e))?;

    let file_layer = fmt::layer()
        .event_format(BracketedFormatter { show_location: true })
        .with_writer(Mutex::new(file))
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .event_format(BracketedFormatter { show_location: false })
        .with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(default_filter())
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| DatasetError::Config(format!("logging already initialized: {}", e)))?;

    info!("Log file created at: {:?}", log_path);
    Ok(log_path)
}
