//! CSV export with coordinate reprojection and per-role formatting.
//!
//! The on-disk dialect is comma-delimited with `|` as the quote character,
//! applied only to cells holding a delimiter, quote or line break; a
//! backslash escapes a quote inside a quoted cell.  The importer reads the
//! same dialect, so exported files re-import to equivalent records.

use log::{debug, info};

use crate::dataset::Dataset;
use crate::dms::{self, Axis, DmsStyle};
use crate::error::{Result, SpotterError};

/// Seconds precision used when exporting DMS coordinates.
const DMS_SECONDS_PRECISION: usize = 2;

/// Parameters for one export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub target_crs: crate::crs::Crs,
    /// Fields to emit, in order.
    pub fields: Vec<String>,
    pub header: bool,
    /// Emit X/Y as DMS text (only honored for geographic targets).
    pub dms: bool,
    pub dms_style: DmsStyle,
}

/// Formats the dataset as text rows.
///
/// Per field: the identifier is emitted raw, never numerically formatted;
/// X/Y come from the reprojected geometry, as DMS when requested on a
/// geographic target, else fixed-decimal (8 digits geographic, 3 projected);
/// any other field is fixed to 3 decimals when numeric and passed through
/// otherwise.  A record whose geometry fails to transform is exported with
/// empty coordinate fields rather than aborting the batch: export is
/// retryable per row, unlike import.
pub fn export_rows(dataset: &Dataset, options: &ExportOptions) -> Result<Vec<String>> {
    let indices: Vec<usize> = options
        .fields
        .iter()
        .map(|name| {
            dataset
                .field_index(name)
                .ok_or_else(|| SpotterError::MissingField { name: name.clone() })
        })
        .collect::<Result<_>>()?;

    let target_geographic = options.target_crs.is_geographic();
    // A projected export should not claim to contain longitude/latitude.
    let relabel = options.target_crs.epsg() != Some(4326);
    let coord_decimals = if target_geographic { 8 } else { 3 };

    let mut rows = Vec::with_capacity(dataset.records.len() + 1);
    if options.header {
        let names: Vec<String> = options
            .fields
            .iter()
            .map(|f| {
                if relabel && *f == dataset.roles.x {
                    "east".to_string()
                } else if relabel && *f == dataset.roles.y {
                    "north".to_string()
                } else {
                    f.clone()
                }
            })
            .collect();
        rows.push(join_row(&names)?);
    }

    for record in &dataset.records {
        let transformed = dataset
            .crs
            .transform_point(&options.target_crs, record.position.x, record.position.y);
        if transformed.is_none() {
            debug!(
                "export: transform failed for record at ({}, {}), emitting empty coordinates",
                record.position.x, record.position.y
            );
        }
        let mut cells = Vec::with_capacity(indices.len());
        for (name, &idx) in options.fields.iter().zip(&indices) {
            let raw = record.values.get(idx).map(String::as_str).unwrap_or("");
            let cell = if *name == dataset.roles.identifier {
                raw.to_string()
            } else if *name == dataset.roles.x || *name == dataset.roles.y {
                match transformed {
                    None => String::new(),
                    Some((x, y)) => {
                        let (value, axis) = if *name == dataset.roles.x {
                            (x, Axis::Longitude)
                        } else {
                            (y, Axis::Latitude)
                        };
                        if options.dms && target_geographic {
                            dms::encode(value, axis, options.dms_style, DMS_SECONDS_PRECISION)
                        } else {
                            format!("{value:.coord_decimals$}")
                        }
                    }
                }
            } else {
                match raw.trim().parse::<f64>() {
                    Ok(v) => format!("{v:.3}"),
                    Err(_) => raw.to_string(),
                }
            };
            cells.push(cell);
        }
        rows.push(join_row(&cells)?);
    }

    info!(
        "exported {} record(s) from {:?} to {}",
        dataset.records.len(),
        dataset.name,
        options.target_crs.definition()
    );
    Ok(rows)
}

/// Writes the export to a file, one row per line.
pub fn export_csv_file(path: &str, dataset: &Dataset, options: &ExportOptions) -> Result<()> {
    let rows = export_rows(dataset, options)?;
    let mut contents = rows.join("\n");
    contents.push('\n');
    crate::io::write_string(path, &contents)?;
    Ok(())
}

// One row through the shared dialect: pipe quotes where needed, backslash
// escaping quotes.  Must stay in sync with the importer's reader config.
fn join_row(cells: &[String]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote(b'|')
        .double_quote(false)
        .escape(b'\\')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(cells)?;
    let mut bytes = writer
        .into_inner()
        .map_err(|e| SpotterError::Io(e.into_error()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
