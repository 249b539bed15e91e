mod builder;
mod catalog;
mod file_name;
mod labels;

pub use builder::{CatalogBuilder, LayoutMode};
pub use catalog::{Catalog, ClassIndex, DatasetSplit, GeoFields, LayoutKind, SampleRecord};
pub use file_name::{parse_encoded_file_name, EncodedFileName};
pub use labels::LabelTables;
