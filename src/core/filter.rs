use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::core::dataset::Catalog;
use crate::error::{DatasetError, DatasetResult};

/// Curated per-class list of file names to exclude as mislabeled.
///
/// Serialized as a JSON object mapping class label to an array of file names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Denylist {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl Denylist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a denylist asset from a JSON file
    pub fn load(path: &Path) -> DatasetResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
        let denylist: Denylist = serde_json::from_str(&contents)?;
        info!(
            "Loaded denylist from {:?}: {} entries across {} classes",
            path,
            denylist.len(),
            denylist.entries.len()
        );
        Ok(denylist)
    }

    pub fn insert(&mut self, class_label: &str, file_name: &str) {
        self.entries
            .entry(class_label.to_string())
            .or_default()
            .insert(file_name.to_string());
    }

    pub fn contains(&self, class_label: &str, file_name: &str) -> bool {
        self.entries
            .get(class_label)
            .map(|names| names.contains(file_name))
            .unwrap_or(false)
    }

    /// Total number of `(class, file)` entries
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(label, names)| names.iter().map(move |name| (label.as_str(), name.as_str())))
    }
}

/// Per-class outcome of an exclusion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassExclusion {
    pub before: usize,
    pub after: usize,
    pub removed: usize,
}

/// Audit trail of an exclusion pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionReport {
    /// Counts for every class of the catalog, in label order
    pub per_class: BTreeMap<String, ClassExclusion>,
    /// Denylist entries that matched no catalog row
    pub unmatched: Vec<(String, String)>,
}

impl ExclusionReport {
    pub fn total_removed(&self) -> usize {
        self.per_class.values().map(|c| c.removed).sum()
    }

    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }

    /// Emit the report as log events
    pub fn log(&self) {
        for (label, counts) in &self.per_class {
            info!(
                "Exclusion for class '{}': before={}, after={}, removed={}",
                label, counts.before, counts.after, counts.removed
            );
        }
        if !self.unmatched.is_empty() {
            warn!(
                "{} denylist entries matched no catalog row",
                self.unmatched.len()
            );
        }
    }
}

/// Remove every record whose `(class_label, file_name)` is on the denylist.
///
/// Matching is exact and scoped to the record's class. Entries that match
/// nothing are collected in the report, not treated as errors.
///
/// # Returns
/// * The filtered catalog, rows in their original relative order
/// * The per-class report
pub fn apply_denylist(catalog: &Catalog, denylist: &Denylist) -> (Catalog, ExclusionReport) {
    let mut report = ExclusionReport::default();
    for (label, count) in catalog.class_counts() {
        report.per_class.insert(
            label,
            ClassExclusion {
                before: count,
                after: count,
                removed: 0,
            },
        );
    }

    let mut matched: BTreeSet<(&str, &str)> = BTreeSet::new();
    let kept = catalog
        .records()
        .iter()
        .filter(|record| {
            if denylist.contains(&record.class_label, &record.file_name) {
                matched.insert((record.class_label.as_str(), record.file_name.as_str()));
                if let Some(counts) = report.per_class.get_mut(&record.class_label) {
                    counts.after -= 1;
                    counts.removed += 1;
                }
                false
            } else {
                true
            }
        })
        .cloned()
        .collect();

    report.unmatched = denylist
        .iter()
        .filter(|entry| !matched.contains(entry))
        .map(|(label, name)| (label.to_string(), name.to_string()))
        .collect();

    report.log();
    (catalog.derive(kept), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::{ClassIndex, LayoutKind, SampleRecord};
    use std::path::PathBuf;

    fn catalog(rows: &[(&str, usize, &str)]) -> Catalog {
        let mut classes = ClassIndex::new();
        let records = rows
            .iter()
            .map(|(label, number, name)| {
                classes.bind(label, *number).unwrap();
                SampleRecord {
                    file_name: name.to_string(),
                    class_label: label.to_string(),
                    class_number: *number,
                    split: None,
                    geo: None,
                    full_path: PathBuf::from(format!("/data/{}/{}", label, name)),
                }
            })
            .collect();
        Catalog::new(LayoutKind::FlatTree, "/data", classes, records).unwrap()
    }

    #[test]
    fn test_removes_only_within_class() {
        let catalog = catalog(&[
            ("forest", 0, "a.jpg"),
            ("forest", 0, "b.jpg"),
            ("urban", 1, "a.jpg"),
        ]);
        let mut denylist = Denylist::new();
        denylist.insert("forest", "a.jpg");

        let (filtered, report) = apply_denylist(&catalog, &denylist);

        assert_eq!(filtered.len(), 2);
        assert!(filtered
            .records()
            .iter()
            .any(|r| r.class_label == "urban" && r.file_name == "a.jpg"));
        assert_eq!(
            report.per_class["forest"],
            ClassExclusion { before: 2, after: 1, removed: 1 }
        );
        assert_eq!(
            report.per_class["urban"],
            ClassExclusion { before: 1, after: 1, removed: 0 }
        );
    }

    #[test]
    fn test_missing_entries_are_counted_not_errors() {
        let catalog = catalog(&[("forest", 0, "a.jpg")]);
        let mut denylist = Denylist::new();
        denylist.insert("forest", "gone.jpg");
        denylist.insert("tundra", "x.jpg");

        let (filtered, report) = apply_denylist(&catalog, &denylist);

        assert_eq!(filtered.len(), 1);
        assert_eq!(report.total_removed(), 0);
        assert_eq!(report.unmatched_count(), 2);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let catalog = catalog(&[
            ("forest", 0, "a.jpg"),
            ("forest", 0, "b.jpg"),
            ("urban", 1, "c.jpg"),
        ]);
        let mut denylist = Denylist::new();
        denylist.insert("forest", "b.jpg");
        denylist.insert("urban", "c.jpg");

        let (once, _) = apply_denylist(&catalog, &denylist);
        let (twice, report) = apply_denylist(&once, &denylist);

        assert_eq!(once.records(), twice.records());
        assert_eq!(report.total_removed(), 0);
        for counts in report.per_class.values() {
            assert_eq!(counts.before, counts.after);
        }
    }

    #[test]
    fn test_denylist_json_shape() {
        let denylist: Denylist =
            serde_json::from_str(r#"{"forest": ["a.jpg", "b.jpg"], "urban": []}"#).unwrap();
        assert_eq!(denylist.len(), 2);
        assert!(denylist.contains("forest", "b.jpg"));
        assert!(!denylist.contains("urban", "b.jpg"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("denylist.json");
        fs::write(&path, r#"{"forest": ["a.jpg"]}"#).unwrap();

        let denylist = Denylist::load(&path).unwrap();
        assert!(denylist.contains("forest", "a.jpg"));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(Denylist::load(&path), Err(DatasetError::Config(_))));
    }
}
