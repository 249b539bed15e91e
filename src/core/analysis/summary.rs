use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::info;

use crate::core::dataset::{Catalog, DatasetSplit};

/// Per-class row counts of a catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassCounts {
    pub total: usize,
    /// Class label -> (val rows, train rows, rows without split)
    pub per_class: BTreeMap<String, SplitCounts>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    pub val: usize,
    pub train: usize,
    pub unsplit: usize,
}

impl SplitCounts {
    pub fn total(&self) -> usize {
        self.val + self.train + self.unsplit
    }
}

impl ClassCounts {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut per_class: BTreeMap<String, SplitCounts> = catalog
            .classes()
            .labels()
            .map(|label| (label.to_string(), SplitCounts::default()))
            .collect();

        for record in catalog.records() {
            let counts = per_class.entry(record.class_label.clone()).or_default();
            match record.split {
                Some(DatasetSplit::Val) => counts.val += 1,
                Some(DatasetSplit::Train) => counts.train += 1,
                None => counts.unsplit += 1,
            }
        }

        Self {
            total: catalog.len(),
            per_class,
        }
    }

    /// Get count for a specific class, 0 when unknown
    pub fn get_count(&self, label: &str) -> usize {
        self.per_class.get(label).map(SplitCounts::total).unwrap_or(0)
    }

    /// Get percentage of all rows held by a class
    pub fn get_percentage(&self, label: &str) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.get_count(label) as f32 / self.total as f32) * 100.0
    }

    /// Fixed-width text table, one line per class plus a total line
    pub fn render_table(&self) -> String {
        let width = self
            .per_class
            .keys()
            .map(String::len)
            .chain(std::iter::once("class".len()))
            .max()
            .unwrap_or(5);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<width$}  {:>7}  {:>7}  {:>7}  {:>6}",
            "class", "val", "train", "total", "%",
            width = width
        );
        for (label, counts) in &self.per_class {
            let _ = writeln!(
                out,
                "{:<width$}  {:>7}  {:>7}  {:>7}  {:>6.1}",
                label,
                counts.val,
                counts.train,
                counts.total(),
                self.get_percentage(label),
                width = width
            );
        }
        let _ = writeln!(
            out,
            "{:<width$}  {:>7}  {:>7}  {:>7}",
            "all",
            "",
            "",
            self.total,
            width = width
        );
        out
    }

    pub fn log(&self, stage: &str) {
        info!("{}: {} samples in {} classes", stage, self.total, self.per_class.len());
        for (label, counts) in &self.per_class {
            info!(
                "{}: class '{}' -> {} (val {}, train {})",
                stage,
                label,
                counts.total(),
                counts.val,
                counts.train
            );
        }
    }
}
