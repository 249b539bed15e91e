use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::catalog::{Catalog, ClassIndex, DatasetSplit, GeoFields, LayoutKind, SampleRecord};
use super::file_name::parse_encoded_file_name;
use super::labels::LabelTables;
use crate::core::operations::{list_visible_entries, EntryKind};
use crate::error::{DatasetError, DatasetResult};

/// How the raw image tree is laid out on disk
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LayoutMode {
    /// `root/{val,train}/class/{index}_{class}_{lat}_{lon}.ext`
    #[default]
    SplitTree,
    /// `root/raw_class_dir/*`, class names translated through `tables`
    FlatTree { tables: LabelTables },
}

impl LayoutMode {
    pub fn kind(&self) -> LayoutKind {
        match self {
            LayoutMode::SplitTree => LayoutKind::SplitTree,
            LayoutMode::FlatTree { .. } => LayoutKind::FlatTree,
        }
    }
}

/// Walks a raw image tree and produces a `Catalog`
pub struct CatalogBuilder {
    root: PathBuf,
    mode: LayoutMode,
}

impl CatalogBuilder {
    pub fn new(root: impl Into<PathBuf>, mode: LayoutMode) -> Self {
        Self {
            root: root.into(),
            mode,
        }
    }

    /// Build the catalog from the current state of the file tree.
    ///
    /// Rows are ordered by class label, then split (`val` first), then file
    /// name.
    pub fn build(&self) -> DatasetResult<Catalog> {
        info!("Building catalog from {:?} ({:?})", self.root, self.mode.kind());

        let (classes, mut records) = match &self.mode {
            LayoutMode::SplitTree => self.scan_split_tree()?,
            LayoutMode::FlatTree { tables } => self.scan_flat_tree(tables)?,
        };

        records.sort_by(|a, b| {
            (&a.class_label, a.split, &a.file_name).cmp(&(&b.class_label, b.split, &b.file_name))
        });

        let catalog = Catalog::new(self.mode.kind(), self.root.clone(), classes, records)?;
        info!(
            "Catalog built: {} samples across {} classes",
            catalog.len(),
            catalog.classes().len()
        );
        Ok(catalog)
    }

    fn scan_split_tree(&self) -> DatasetResult<(ClassIndex, Vec<SampleRecord>)> {
        let mut class_names = std::collections::BTreeSet::new();
        for split in DatasetSplit::all() {
            let split_dir = self.root.join(split.as_str());
            for (name, _) in list_visible_entries(&split_dir, EntryKind::Directory)? {
                class_names.insert(name);
            }
        }

        let mut classes = ClassIndex::new();
        let mut records = Vec::new();

        for class_name in &class_names {
            // A numeric directory name is the 1-based class token itself
            let directory_token = class_name.parse::<usize>().ok();
            if let Some(token) = directory_token {
                if token == 0 {
                    return Err(DatasetError::Integrity(format!(
                        "class directory '{}' is not a valid 1-based class number",
                        class_name
                    )));
                }
                classes.bind(class_name, token - 1)?;
            }

            for split in DatasetSplit::all() {
                let class_dir = self.root.join(split.as_str()).join(class_name);
                if !class_dir.is_dir() {
                    warn!("Class '{}' has no {} directory", class_name, split.as_str());
                    continue;
                }

                let files = list_visible_entries(&class_dir, EntryKind::File)?;
                debug!("Found {} images in {:?}", files.len(), class_dir);

                for (file_name, full_path) in files {
                    let parsed = parse_encoded_file_name(&file_name)?;

                    if let Some(token) = directory_token {
                        if token != parsed.class_token {
                            return Err(DatasetError::Integrity(format!(
                                "{:?} encodes class {} but lives under class directory '{}'",
                                full_path, parsed.class_token, class_name
                            )));
                        }
                    }
                    classes.bind(class_name, parsed.class_number())?;

                    ensure_exists(&full_path)?;
                    records.push(SampleRecord {
                        class_number: parsed.class_number(),
                        geo: Some(GeoFields {
                            image_number: parsed.image_number,
                            latitude: parsed.latitude,
                            longitude: parsed.longitude,
                        }),
                        file_name,
                        class_label: class_name.clone(),
                        split: Some(split),
                        full_path,
                    });
                }
            }

            // Without a numeric name or a file to read it from, the class
            // cannot be numbered, and dropping it would hide an empty class
            if !classes.contains(class_name) {
                return Err(DatasetError::EmptyClass(class_name.clone()));
            }
        }

        Ok((classes, records))
    }

    fn scan_flat_tree(&self, tables: &LabelTables) -> DatasetResult<(ClassIndex, Vec<SampleRecord>)> {
        let mut classes = ClassIndex::new();
        let mut records = Vec::new();

        for (directory, class_dir) in list_visible_entries(&self.root, EntryKind::Directory)? {
            let (label, number) = tables.translate(&directory)?;
            classes.bind(&label, number)?;

            let files = list_visible_entries(&class_dir, EntryKind::File)?;
            debug!(
                "Found {} images in {:?} (label '{}', class {})",
                files.len(),
                class_dir,
                label,
                number
            );

            for (file_name, full_path) in files {
                ensure_exists(&full_path)?;
                records.push(SampleRecord {
                    file_name,
                    class_label: label.clone(),
                    class_number: number,
                    split: None,
                    geo: None,
                    full_path,
                });
            }
        }

        Ok((classes, records))
    }
}

fn ensure_exists(path: &std::path::Path) -> DatasetResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(DatasetError::Integrity(format!(
            "catalog path {:?} does not exist",
            path
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"img").unwrap();
    }

    #[test]
    fn test_split_tree_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("val/1/0001_1_10.0_20.0.png"));
        touch(&root.join("train/1/0002_1_11.0_21.0.png"));
        touch(&root.join("train/2/0003_2_12.5_-22.25.png"));
        touch(&root.join("train/2/.DS_Store"));
        touch(&root.join("val/.DS_Store"));

        let catalog = CatalogBuilder::new(root, LayoutMode::SplitTree).build().unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.layout(), LayoutKind::SplitTree);
        let first = &catalog.records()[0];
        assert_eq!(first.class_label, "1");
        assert_eq!(first.class_number, 0);
        assert_eq!(first.split, Some(DatasetSplit::Val));
        assert_eq!(first.full_path, root.join("val/1/0001_1_10.0_20.0.png"));

        let last = &catalog.records()[2];
        assert_eq!(last.class_number, 1);
        let geo = last.geo.as_ref().unwrap();
        assert_eq!(geo.image_number, "0003");
        assert_eq!(geo.latitude, 12.5);
        assert_eq!(geo.longitude, -22.25);
    }

    #[test]
    fn test_split_tree_named_classes_take_number_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("val/alpine/1_1_0.0_0.0.png"));
        touch(&root.join("train/coastal/2_2_0.0_0.0.png"));
        fs::create_dir_all(root.join("train/alpine")).unwrap();
        fs::create_dir_all(root.join("val/coastal")).unwrap();

        let catalog = CatalogBuilder::new(root, LayoutMode::SplitTree).build().unwrap();
        assert_eq!(catalog.classes().number_of("alpine"), Some(0));
        assert_eq!(catalog.classes().number_of("coastal"), Some(1));
    }

    #[test]
    fn test_split_tree_empty_named_class_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("val/alpine/1_1_0.0_0.0.png"));
        touch(&root.join("train/alpine/2_1_0.0_0.0.png"));
        touch(&root.join("train/coastal/3_2_0.0_0.0.png"));
        fs::create_dir_all(root.join("val/desert")).unwrap();
        fs::create_dir_all(root.join("train/desert")).unwrap();

        let result = CatalogBuilder::new(root, LayoutMode::SplitTree).build();
        assert!(matches!(result, Err(DatasetError::EmptyClass(name)) if name == "desert"));
    }

    #[test]
    fn test_split_tree_class_mismatch_is_integrity_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("val/1/0001_1_0.0_0.0.png"));
        touch(&root.join("train/1/0002_3_0.0_0.0.png"));

        let result = CatalogBuilder::new(root, LayoutMode::SplitTree).build();
        assert!(matches!(result, Err(DatasetError::Integrity(_))));
    }

    #[test]
    fn test_split_tree_mixed_numbers_in_named_class() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("val/alpine/1_1_0.0_0.0.png"));
        touch(&root.join("train/alpine/2_2_0.0_0.0.png"));

        let result = CatalogBuilder::new(root, LayoutMode::SplitTree).build();
        assert!(matches!(result, Err(DatasetError::Integrity(_))));
    }

    #[test]
    fn test_split_tree_missing_split_dir() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("train/1/1_1_0.0_0.0.png"));

        let result = CatalogBuilder::new(dir.path(), LayoutMode::SplitTree).build();
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }

    fn flat_mode() -> LayoutMode {
        LayoutMode::FlatTree {
            tables: LabelTables {
                directory_labels: BTreeMap::from([
                    ("Forest Photos".to_string(), "forest".to_string()),
                    ("City".to_string(), "urban".to_string()),
                ]),
                label_numbers: BTreeMap::from([
                    ("forest".to_string(), 0),
                    ("urban".to_string(), 1),
                ]),
            },
        }
    }

    #[test]
    fn test_flat_tree_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Forest Photos/a.jpg"));
        touch(&root.join("Forest Photos/b.jpg"));
        touch(&root.join("City/a.jpg"));
        touch(&root.join(".DS_Store"));

        let catalog = CatalogBuilder::new(root, flat_mode()).build().unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.layout(), LayoutKind::FlatTree);
        assert_eq!(catalog.records()[0].class_label, "forest");
        assert_eq!(catalog.records()[2].class_label, "urban");
        assert_eq!(catalog.records()[2].class_number, 1);
        assert!(catalog.records().iter().all(|r| r.split.is_none() && r.geo.is_none()));
    }

    #[test]
    fn test_flat_tree_unknown_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Desert/a.jpg"));

        let result = CatalogBuilder::new(dir.path(), flat_mode()).build();
        assert!(matches!(result, Err(DatasetError::UnknownClass(name)) if name == "Desert"));
    }
}
