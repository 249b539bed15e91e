use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::analysis::DEFAULT_SEED;
use crate::core::dataset::LayoutMode;
use crate::core::imaging::NormalizeOptions;
use crate::error::{DatasetError, DatasetResult};

/// Pipeline configuration persisted as JSON.
///
/// Every field has a default so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root of the raw image tree
    pub dataset_root: PathBuf,
    /// On-disk layout, including the label tables for the flat layout
    pub layout: LayoutMode,
    /// JSON denylist asset; no filtering when absent
    pub denylist_path: Option<PathBuf>,
    /// Seed for class balancing
    pub seed: u64,
    pub normalize: NormalizeOptions,
    /// Where to write the catalog CSV; skipped when absent
    pub catalog_output: Option<PathBuf>,
    pub log_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from("images"),
            layout: LayoutMode::SplitTree,
            denylist_path: None,
            seed: DEFAULT_SEED,
            normalize: NormalizeOptions::default(),
            catalog_output: Some(PathBuf::from("images.csv")),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl PipelineConfig {
    /// Platform config location, e.g. `~/.config/geo-image-dataset/pipeline.json`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "geo-image-dataset")
            .map(|dirs| dirs.config_dir().join("pipeline.json"))
    }

    /// Load from `path`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file is
    /// an error, since running with silently substituted settings would build
    /// the wrong dataset.
    pub fn load_from(path: &Path) -> DatasetResult<Self> {
        info!("Loading pipeline config from: {:?}", path);
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = serde_json::from_str::<PipelineConfig>(&contents)?;
                info!("Successfully loaded pipeline config");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file found. Using defaults.");
                Ok(Self::default())
            }
            Err(e) => Err(DatasetError::io(path, e)),
        }
    }

    /// Load from the platform config location, or defaults
    pub fn load() -> DatasetResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                info!("Could not determine config directory. Using defaults.");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> DatasetResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DatasetError::io(parent, e))?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| DatasetError::io(path, e))?;
        info!("Pipeline config saved to: {:?}", path);
        Ok(())
    }
}
