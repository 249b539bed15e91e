use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{DatasetError, DatasetResult};

/// Split directory a sample was found under (layout A only).
///
/// Variant order is the emission order of the catalog builder: `val` rows come
/// before `train` rows within each class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSplit {
    Val,
    Train,
}

impl DatasetSplit {
    pub fn as_str(&self) -> &str {
        match self {
            DatasetSplit::Val => "val",
            DatasetSplit::Train => "train",
        }
    }

    pub fn all() -> [DatasetSplit; 2] {
        [DatasetSplit::Val, DatasetSplit::Train]
    }
}

/// Which on-disk layout a catalog was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// `root/split/class/{index}_{class}_{lat}_{lon}.ext`
    SplitTree,
    /// `root/class/*` with translated class names
    FlatTree,
}

/// Fields decoded from the `{index}_{class}_{lat}_{lon}` file name convention
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFields {
    pub image_number: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One row of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub file_name: String,
    pub class_label: String,
    pub class_number: usize,
    pub split: Option<DatasetSplit>,
    pub geo: Option<GeoFields>,
    pub full_path: PathBuf,
}

/// Bijective mapping between class labels and zero-based class numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassIndex {
    by_label: BTreeMap<String, usize>,
    by_number: BTreeMap<usize, String>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `label` is class `number`.
    ///
    /// Re-binding the same pair is a no-op. Binding a label to a second number,
    /// or a number to a second label, is an integrity error.
    pub fn bind(&mut self, label: &str, number: usize) -> DatasetResult<()> {
        if let Some(&existing) = self.by_label.get(label) {
            if existing != number {
                return Err(DatasetError::Integrity(format!(
                    "class '{}' maps to both class number {} and {}",
                    label, existing, number
                )));
            }
            return Ok(());
        }
        if let Some(existing) = self.by_number.get(&number) {
            return Err(DatasetError::Integrity(format!(
                "class number {} is claimed by both '{}' and '{}'",
                number, existing, label
            )));
        }
        self.by_label.insert(label.to_string(), number);
        self.by_number.insert(number, label.to_string());
        Ok(())
    }

    pub fn number_of(&self, label: &str) -> Option<usize> {
        self.by_label.get(label).copied()
    }

    pub fn label_of(&self, number: usize) -> Option<&str> {
        self.by_number.get(&number).map(String::as_str)
    }

    /// Labels in lexical order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.by_label.keys().map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

/// An immutable, ordered table of samples plus the closed class set it was
/// built against. Filtering and balancing derive new catalogs.
#[derive(Debug, Clone)]
pub struct Catalog {
    layout: LayoutKind,
    root: PathBuf,
    classes: ClassIndex,
    records: Vec<SampleRecord>,
}

impl Catalog {
    /// Assemble a catalog, rejecting duplicate paths and records whose class
    /// is outside `classes` or disagrees with it.
    pub fn new(
        layout: LayoutKind,
        root: impl Into<PathBuf>,
        classes: ClassIndex,
        records: Vec<SampleRecord>,
    ) -> DatasetResult<Self> {
        let mut seen: HashSet<&Path> = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.full_path.as_path()) {
                return Err(DatasetError::Integrity(format!(
                    "duplicate catalog path {:?}",
                    record.full_path
                )));
            }
            match classes.number_of(&record.class_label) {
                Some(number) if number == record.class_number => {}
                Some(number) => {
                    return Err(DatasetError::Integrity(format!(
                        "{:?} has class number {} but '{}' is class {}",
                        record.full_path, record.class_number, record.class_label, number
                    )));
                }
                None => return Err(DatasetError::UnknownClass(record.class_label.clone())),
            }
        }

        Ok(Self {
            layout,
            root: root.into(),
            classes,
            records,
        })
    }

    /// Derive a catalog with the same layout and class set but other rows.
    ///
    /// Callers only pass subsets of `self.records`, so the checks in `new`
    /// already hold.
    pub(crate) fn derive(&self, records: Vec<SampleRecord>) -> Self {
        Self {
            layout: self.layout,
            root: self.root.clone(),
            classes: self.classes.clone(),
            records,
        }
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn classes(&self) -> &ClassIndex {
        &self.classes
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows per class label, including classes with no rows
    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> =
            self.classes.labels().map(|label| (label.to_string(), 0)).collect();
        for record in &self.records {
            *counts.entry(record.class_label.clone()).or_insert(0) += 1;
        }
        counts
    }
}
