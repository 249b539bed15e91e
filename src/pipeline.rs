//! Catalog stages wired together: build, exclude, balance.

use tracing::{info, info_span};

use crate::config::PipelineConfig;
use crate::core::analysis::{balance_classes, ClassCounts};
use crate::core::dataset::{Catalog, CatalogBuilder};
use crate::core::filter::{apply_denylist, Denylist, ExclusionReport};
use crate::core::operations::export_catalog_csv;
use crate::error::DatasetResult;

/// Everything a training loop needs from one pipeline run
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// Catalog as found on disk
    pub raw: Catalog,
    pub exclusion: ExclusionReport,
    /// Catalog after exclusion and balancing
    pub balanced: Catalog,
}

impl PreparedDataset {
    pub fn raw_counts(&self) -> ClassCounts {
        ClassCounts::from_catalog(&self.raw)
    }

    pub fn balanced_counts(&self) -> ClassCounts {
        ClassCounts::from_catalog(&self.balanced)
    }
}

/// Run the catalog stages described by `config`.
///
/// The raw catalog is written to `config.catalog_output` when set.
pub fn prepare_dataset(config: &PipelineConfig) -> DatasetResult<PreparedDataset> {
    let _span = info_span!("prepare_dataset").entered();

    let raw = CatalogBuilder::new(&config.dataset_root, config.layout.clone()).build()?;
    ClassCounts::from_catalog(&raw).log("raw");

    if let Some(dest) = &config.catalog_output {
        export_catalog_csv(&raw, dest)?;
    }

    let denylist = match &config.denylist_path {
        Some(path) => Denylist::load(path)?,
        None => {
            info!("No denylist configured, skipping exclusion");
            Denylist::new()
        }
    };
    let (filtered, exclusion) = apply_denylist(&raw, &denylist);
    info!(
        "Excluded {} samples, {} denylist entries unmatched",
        exclusion.total_removed(),
        exclusion.unmatched_count()
    );

    let balanced = balance_classes(&filtered, config.seed)?;
    ClassCounts::from_catalog(&balanced).log("balanced");

    Ok(PreparedDataset {
        raw,
        exclusion,
        balanced,
    })
}
