use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DatasetError, DatasetResult};

/// Hidden entries (`.DS_Store`, `.git`, editor droppings) are filesystem
/// artifacts, never classes or samples.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// What kind of entries `list_visible_entries` should keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// List the non-hidden entries of `dir` of the given kind, sorted by name.
///
/// # Returns
/// * `Ok(Vec<(name, path)>)` in lexical name order
/// * `Err(DatasetError::Io)` if the directory cannot be read
pub fn list_visible_entries(dir: &Path, kind: EntryKind) -> DatasetResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| DatasetError::io(dir, e))?;

    let mut listed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DatasetError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if is_hidden(&name) {
            debug!("Skipping hidden entry {:?}", entry.path());
            continue;
        }

        let path = entry.path();
        let keep = match kind {
            EntryKind::Directory => path.is_dir(),
            EntryKind::File => path.is_file(),
        };
        if keep {
            listed.push((name, path));
        }
    }

    listed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(listed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(".DS_Store"));
        assert!(is_hidden(".git"));
        assert!(!is_hidden("forest"));
        assert!(!is_hidden("1_1_0.0_0.0.png"));
    }

    #[test]
    fn test_list_visible_entries_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.png"), b"").unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        fs::write(dir.path().join(".DS_Store"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let files = list_visible_entries(dir.path(), EntryKind::File).unwrap();
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);

        let dirs = list_visible_entries(dir.path(), EntryKind::Directory).unwrap();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].0, "nested");
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = list_visible_entries(&dir.path().join("absent"), EntryKind::File);
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
