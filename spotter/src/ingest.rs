//! CSV ingestion: resolving tabular rows into a point dataset under a
//! coherent storage CRS.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::crs::Crs;
use crate::dataset::{format_coordinate, Dataset, PointRecord, RoleBindings};
use crate::dms;
use crate::error::{Result, SpotterError};
use crate::geometry::Point;

/// Encodings probed, in order, before giving up and decoding lossily.
const ENCODINGS: [&encoding_rs::Encoding; 3] = [
    encoding_rs::UTF_8,
    encoding_rs::WINDOWS_1252,
    encoding_rs::ISO_8859_15,
];

/// Parameters for one import.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Name of the dataset to create.
    pub layer_name: String,
    /// Whether the first row holds field names.  Without a header, fields
    /// are synthesized as `field_1..field_n`.
    pub has_header: bool,
    /// CRS the source coordinates are authored in.
    pub source_crs: Crs,
    /// Projected CRS geographic sources are stored in; sources that are
    /// already projected keep their own CRS.
    pub storage_crs: Crs,
    pub roles: RoleBindings,
    /// Decode X/Y through the DMS codec (only honored for geographic
    /// sources).
    pub parse_dms: bool,
    /// Subset of source fields to keep, in order.  `None` keeps all.
    pub fields: Option<Vec<String>>,
}

impl ImportOptions {
    pub fn new(layer_name: impl Into<String>, source_crs: Crs, roles: RoleBindings) -> Self {
        Self {
            layer_name: layer_name.into(),
            has_header: true,
            source_crs,
            storage_crs: Crs::web_mercator(),
            roles,
            parse_dms: false,
            fields: None,
        }
    }
}

/// Probes the encoding list and decodes the source.  Failure to find a clean
/// encoding degrades to lossy UTF-8 instead of aborting.
fn decode_source(bytes: &[u8]) -> String {
    for encoding in ENCODINGS {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            debug!("source decoded as {}", encoding.name());
            return text.into_owned();
        }
    }
    warn!("encoding undetermined, decoding lossily as UTF-8");
    String::from_utf8_lossy(bytes).into_owned()
}

// Reader half of the export dialect: pipe quotes, backslash-escaped quotes,
// no double-quote handling.
fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote(b'|')
        .double_quote(false)
        .escape(Some(b'\\'))
        .from_reader(text.as_bytes())
}

/// Imports a CSV file into a new dataset.  See [`import_csv_bytes`].
pub fn import_csv_file(
    path: &str,
    options: &ImportOptions,
    cancel: Option<&AtomicBool>,
) -> Result<Dataset> {
    let bytes = crate::io::read_bytes(path)?;
    import_csv_bytes(&bytes, options, cancel)
}

/// Imports CSV bytes into a new dataset.
///
/// Every row must yield a valid point: a row whose coordinates fail to
/// parse, fall outside the geographic range, or cannot be transformed is
/// counted invalid, and a nonzero invalid count rejects the whole batch with
/// [`SpotterError::ImportRejected`].  Point sets are small and hand-edited;
/// silently dropping rows would leave a dataset whose numbering and extent
/// lie to the user.
///
/// The cancellation flag is polled once per row; a cancelled import creates
/// nothing.
pub fn import_csv_bytes(
    bytes: &[u8],
    options: &ImportOptions,
    cancel: Option<&AtomicBool>,
) -> Result<Dataset> {
    let text = decode_source(bytes);
    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for record in csv_reader(&text).records() {
        rows.push(record?);
    }
    if rows.is_empty() {
        return Err(SpotterError::EmptySource);
    }

    let field_names: Vec<String> = if options.has_header {
        rows[0].iter().map(str::to_string).collect()
    } else {
        (1..=rows[0].len()).map(|i| format!("field_{i}")).collect()
    };
    let data = if options.has_header { &rows[1..] } else { &rows[..] };
    if data.is_empty() {
        return Err(SpotterError::EmptySource);
    }

    let schema: Vec<String> = match &options.fields {
        Some(list) => list.clone(),
        None => field_names.clone(),
    };
    // Each schema field must exist in the source.
    let columns: Vec<usize> = schema
        .iter()
        .map(|name| {
            field_names
                .iter()
                .position(|f| f == name)
                .ok_or_else(|| SpotterError::MissingField { name: name.clone() })
        })
        .collect::<Result<_>>()?;

    let geographic = options.source_crs.is_geographic();
    let storage_crs = if geographic {
        options.storage_crs.clone()
    } else {
        options.source_crs.clone()
    };
    let mut dataset = Dataset::new(
        options.layer_name.clone(),
        storage_crs,
        options.source_crs.clone(),
        options.roles.clone(),
        schema,
    )?;
    let x_column = field_names
        .iter()
        .position(|f| *f == options.roles.x)
        .ok_or_else(|| SpotterError::MissingField {
            name: options.roles.x.clone(),
        })?;
    let y_column = field_names
        .iter()
        .position(|f| *f == options.roles.y)
        .ok_or_else(|| SpotterError::MissingField {
            name: options.roles.y.clone(),
        })?;
    let x_field = dataset.field_index(&dataset.roles.x);
    let y_field = dataset.field_index(&dataset.roles.y);

    let mut invalid = 0usize;
    for (row_number, row) in data.iter().enumerate() {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(SpotterError::Cancelled);
            }
        }

        let x_text = row.get(x_column).unwrap_or("").trim();
        let y_text = row.get(y_column).unwrap_or("").trim();
        let parsed = if options.parse_dms && geographic {
            dms::decode(x_text).and_then(|x| dms::decode(y_text).map(|y| (x, y)))
        } else {
            x_text
                .parse::<f64>()
                .and_then(|x| y_text.parse::<f64>().map(|y| (x, y)))
                .map_err(|_| SpotterError::InvalidCoordinateFormat {
                    text: format!("{x_text}, {y_text}"),
                })
        };
        let (x, y) = match parsed {
            Ok(pair) => pair,
            Err(_) => {
                debug!("row {}: unparsable coordinates", row_number + 1);
                invalid += 1;
                continue;
            }
        };

        let position = if geographic {
            if !(-90.0..=90.0).contains(&y) || !(-180.0..=180.0).contains(&x) {
                debug!("row {}: coordinates out of range", row_number + 1);
                invalid += 1;
                continue;
            }
            match options.source_crs.transform_point(&dataset.crs, x, y) {
                Some((px, py)) => Point::new(px, py),
                None => {
                    debug!("row {}: transform failed", row_number + 1);
                    invalid += 1;
                    continue;
                }
            }
        } else {
            Point::new(x, y)
        };

        let mut values: Vec<String> = columns
            .iter()
            .map(|&c| row.get(c).unwrap_or("").to_string())
            .collect();
        // Keep the attribute copies of the coordinates synchronized with the
        // geometry: source-CRS value rounded to eight decimals.
        if let Some(i) = x_field {
            values[i] = format_coordinate(x);
        }
        if let Some(i) = y_field {
            values[i] = format_coordinate(y);
        }
        dataset.records.push(PointRecord { position, values });
    }

    if invalid > 0 {
        warn!(
            "import of {:?} rejected: {} invalid row(s) out of {}",
            options.layer_name,
            invalid,
            data.len()
        );
        return Err(SpotterError::ImportRejected {
            invalid,
            total: data.len(),
        });
    }

    info!(
        "imported {} row(s) into {:?} ({} -> {})",
        dataset.records.len(),
        dataset.name,
        dataset.source_crs.definition(),
        dataset.crs.definition()
    );
    Ok(dataset)
}
