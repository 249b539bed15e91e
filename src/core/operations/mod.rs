mod export;
mod file_ops;

pub use export::{export_catalog_csv, write_catalog};
pub use file_ops::{is_hidden, list_visible_entries, EntryKind};
