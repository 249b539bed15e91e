use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{DatasetError, DatasetResult};

/// Two-stage class name translation used by the flat layout:
/// raw directory name -> canonical label -> class number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelTables {
    /// Raw directory name to canonical label
    pub directory_labels: BTreeMap<String, String>,
    /// Canonical label to zero-based class number
    pub label_numbers: BTreeMap<String, usize>,
}

impl LabelTables {
    /// Translate a raw directory name into `(canonical label, class number)`
    pub fn translate(&self, directory: &str) -> DatasetResult<(String, usize)> {
        let label = self
            .directory_labels
            .get(directory)
            .ok_or_else(|| DatasetError::UnknownClass(directory.to_string()))?;
        let number = self
            .label_numbers
            .get(label)
            .ok_or_else(|| DatasetError::UnknownClass(label.clone()))?;
        Ok((label.clone(), *number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> LabelTables {
        LabelTables {
            directory_labels: BTreeMap::from([
                ("n01_forest".to_string(), "forest".to_string()),
                ("n02_city".to_string(), "urban".to_string()),
                ("n03_orphan".to_string(), "desert".to_string()),
            ]),
            label_numbers: BTreeMap::from([
                ("forest".to_string(), 0),
                ("urban".to_string(), 1),
            ]),
        }
    }

    #[test]
    fn test_translate_known_directory() {
        assert_eq!(tables().translate("n02_city").unwrap(), ("urban".to_string(), 1));
    }

    #[test]
    fn test_unknown_directory() {
        match tables().translate("n09_ocean") {
            Err(DatasetError::UnknownClass(name)) => assert_eq!(name, "n09_ocean"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_label_missing_from_number_table() {
        match tables().translate("n03_orphan") {
            Err(DatasetError::UnknownClass(name)) => assert_eq!(name, "desert"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
