//! Class balancing by downsampling every class to the minority count.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::core::dataset::{Catalog, SampleRecord};
use crate::error::{DatasetError, DatasetResult};

/// Default seed used when the configuration does not name one
pub const DEFAULT_SEED: u64 = 42;

/// Smallest per-class count over the catalog's class set.
///
/// # Returns
/// * `Ok(None)` for a catalog without classes
/// * `Err(DatasetError::EmptyClass)` naming the first class with no rows
pub fn minority_count(catalog: &Catalog) -> DatasetResult<Option<usize>> {
    let counts = catalog.class_counts();
    if let Some((label, _)) = counts.iter().find(|(_, &count)| count == 0) {
        return Err(DatasetError::EmptyClass(label.clone()));
    }
    Ok(counts.values().copied().min())
}

/// Draw `min_count` records from every class, uniformly and without
/// replacement.
///
/// Each class's rows are ordered by path before sampling, so the subset
/// depends only on the catalog contents and `seed`, never on row order.
/// Classes already at the minimum are taken in full. Output rows are grouped
/// by class label.
pub fn balance_classes(catalog: &Catalog, seed: u64) -> DatasetResult<Catalog> {
    let min_count = match minority_count(catalog)? {
        Some(count) => count,
        None => return Ok(catalog.derive(Vec::new())),
    };

    let mut by_class: BTreeMap<&str, Vec<&SampleRecord>> = BTreeMap::new();
    for record in catalog.records() {
        by_class.entry(record.class_label.as_str()).or_default().push(record);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut balanced = Vec::with_capacity(min_count * by_class.len());

    for (label, mut records) in by_class {
        records.sort_by(|a, b| a.full_path.cmp(&b.full_path));

        if records.len() == min_count {
            debug!("Class '{}' is at the minority count, keeping all {}", label, min_count);
            balanced.extend(records.into_iter().cloned());
            continue;
        }

        let mut picked = index::sample(&mut rng, records.len(), min_count).into_vec();
        picked.sort_unstable();
        debug!(
            "Class '{}': sampled {} of {} records",
            label,
            picked.len(),
            records.len()
        );
        balanced.extend(picked.into_iter().map(|i| records[i].clone()));
    }

    info!(
        "Balanced catalog: {} classes x {} samples = {} rows (seed {})",
        catalog.classes().len(),
        min_count,
        balanced.len(),
        seed
    );
    Ok(catalog.derive(balanced))
}
