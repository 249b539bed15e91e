use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::core::dataset::{Catalog, LayoutKind, SampleRecord};
use crate::error::{DatasetError, DatasetResult};

const SPLIT_TREE_COLUMNS: [&str; 8] = [
    "file_name",
    "class",
    "split",
    "image_number",
    "class_number",
    "latitude",
    "longitude",
    "full_path",
];

const FLAT_TREE_COLUMNS: [&str; 4] = ["file_name", "label_name", "img_path", "label"];

/// Quote a CSV field when it contains a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Float column text: shortest round-trip form, always with a fractional part
fn coordinate(value: f64) -> String {
    format!("{:?}", value)
}

fn record_fields(layout: LayoutKind, record: &SampleRecord) -> Vec<String> {
    let path = record.full_path.to_string_lossy().to_string();
    match layout {
        LayoutKind::SplitTree => {
            let (image_number, latitude, longitude) = match &record.geo {
                Some(geo) => (
                    geo.image_number.clone(),
                    coordinate(geo.latitude),
                    coordinate(geo.longitude),
                ),
                None => (String::new(), String::new(), String::new()),
            };
            vec![
                record.file_name.clone(),
                record.class_label.clone(),
                record.split.map(|s| s.as_str().to_string()).unwrap_or_default(),
                image_number,
                record.class_number.to_string(),
                latitude,
                longitude,
                path,
            ]
        }
        LayoutKind::FlatTree => vec![
            record.file_name.clone(),
            record.class_label.clone(),
            path,
            record.class_number.to_string(),
        ],
    }
}

/// Serialize a catalog as CSV into any writer.
///
/// The first column is the row index with an empty header.
pub fn write_catalog<W: Write>(catalog: &Catalog, mut writer: W) -> std::io::Result<()> {
    let columns: &[&str] = match catalog.layout() {
        LayoutKind::SplitTree => &SPLIT_TREE_COLUMNS,
        LayoutKind::FlatTree => &FLAT_TREE_COLUMNS,
    };
    writeln!(writer, ",{}", columns.join(","))?;

    for (row, record) in catalog.records().iter().enumerate() {
        let fields: Vec<String> = record_fields(catalog.layout(), record)
            .iter()
            .map(|f| escape_field(f))
            .collect();
        writeln!(writer, "{},{}", row, fields.join(","))?;
    }
    writer.flush()
}

/// Persist the catalog as a flat CSV file, creating parent directories.
pub fn export_catalog_csv(catalog: &Catalog, dest: &Path) -> DatasetResult<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| DatasetError::io(parent, e))?;
        }
    }

    let file = File::create(dest).map_err(|e| DatasetError::io(dest, e))?;
    write_catalog(catalog, BufWriter::new(file)).map_err(|e| DatasetError::io(dest, e))?;

    info!("Catalog with {} rows written to {:?}", catalog.len(), dest);
    Ok(())
}
