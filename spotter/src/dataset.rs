//! Point datasets, role bindings and the spatial dedup key.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::crs::Crs;
use crate::error::{Result, SpotterError};
use crate::geometry::Point;

/// Decimal digits kept by [`SpatialKey`] and by coordinate attribute copies.
pub const COORD_DECIMALS: i32 = 8;

const KEY_SCALE: f64 = 1e8;

/// A coordinate pair rounded to eight decimal digits, used as a set key for
/// spatial deduplication.
///
/// Two points are "the same location" iff their keys are equal.  This is an
/// explicit, lossy equivalence rather than true geometric equality: two
/// points straddling a rounding boundary may compare unequal even when they
/// are closer than the rounding step (false negatives are accepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpatialKey {
    x: i64,
    y: i64,
}

impl SpatialKey {
    pub fn of(p: Point) -> Self {
        Self {
            x: (p.x * KEY_SCALE).round() as i64,
            y: (p.y * KEY_SCALE).round() as i64,
        }
    }
}

/// Maps a dataset's attribute names to their semantic roles.
///
/// Attached at dataset creation and immutable afterwards; export and rebase
/// read these instead of re-inferring field meanings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBindings {
    pub identifier: String,
    pub x: String,
    pub y: String,
    pub elevation: Option<String>,
}

/// One geographic entity: a position in the dataset's storage CRS plus the
/// attribute values aligned with the dataset schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub position: Point,
    pub values: Vec<String>,
}

/// An ordered collection of point records sharing one schema and one CRS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    /// CRS the positions are stored in.
    pub crs: Crs,
    /// CRS the source data was authored in; may differ from `crs` because
    /// geographic sources are reprojected on ingestion.
    pub source_crs: Crs,
    pub roles: RoleBindings,
    pub schema: Vec<String>,
    pub records: Vec<PointRecord>,
}

impl Dataset {
    /// Creates an empty dataset, validating that every role binding points at
    /// a schema field.
    pub fn new(
        name: impl Into<String>,
        crs: Crs,
        source_crs: Crs,
        roles: RoleBindings,
        schema: Vec<String>,
    ) -> Result<Self> {
        let dataset = Self {
            name: name.into(),
            crs,
            source_crs,
            roles,
            schema,
            records: Vec::new(),
        };
        for field in [&dataset.roles.identifier, &dataset.roles.x, &dataset.roles.y] {
            if dataset.field_index(field).is_none() {
                return Err(SpotterError::MissingField {
                    name: field.clone(),
                });
            }
        }
        if let Some(elev) = &dataset.roles.elevation {
            if dataset.field_index(elev).is_none() {
                return Err(SpotterError::MissingField { name: elev.clone() });
            }
        }
        Ok(dataset)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.schema.iter().position(|f| f == name)
    }

    /// The user-facing name of a record.  Uniqueness is a business rule, not
    /// a storage invariant.
    pub fn identifier_of<'a>(&self, record: &'a PointRecord) -> &'a str {
        self.field_index(&self.roles.identifier)
            .and_then(|i| record.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has_elevation_field(&self) -> bool {
        self.roles.elevation.is_some()
    }

    /// Parses the record's elevation attribute, if the dataset declares one
    /// and the value holds a number.
    pub fn elevation_of(&self, record: &PointRecord) -> Option<f64> {
        let field = self.roles.elevation.as_deref()?;
        let idx = self.field_index(field)?;
        record.values.get(idx)?.trim().parse::<f64>().ok()
    }

    /// Writes an elevation value back into the record's attribute column,
    /// rounded to three decimals.
    pub fn set_elevation(&mut self, record_index: usize, value: f64) {
        let Some(idx) = self
            .roles
            .elevation
            .as_deref()
            .and_then(|f| self.field_index(f))
        else {
            return;
        };
        if let Some(record) = self.records.get_mut(record_index) {
            if let Some(slot) = record.values.get_mut(idx) {
                *slot = format!("{:.3}", value);
            }
        }
    }

    /// Set of spatial keys over all current records.
    pub fn spatial_keys(&self) -> HashSet<SpatialKey> {
        self.records
            .iter()
            .map(|r| SpatialKey::of(r.position))
            .collect()
    }

    /// Builds a record for a freshly inserted point: identifier set, X/Y
    /// attribute copies written as the source-CRS coordinate rounded to eight
    /// decimals, every other attribute left at its empty default.
    ///
    /// The attribute copies must stay synchronized with the geometry, so a
    /// position that cannot be expressed in the source CRS is an error.
    pub fn record_for(&self, position: Point, identifier: &str) -> Result<PointRecord> {
        let mut values = vec![String::new(); self.schema.len()];
        if let Some(i) = self.field_index(&self.roles.identifier) {
            values[i] = identifier.to_string();
        }
        let (sx, sy) = self
            .crs
            .try_transform_point(&self.source_crs, position.x, position.y)?;
        if let Some(i) = self.field_index(&self.roles.x) {
            values[i] = format_coordinate(sx);
        }
        if let Some(i) = self.field_index(&self.roles.y) {
            values[i] = format_coordinate(sy);
        }
        Ok(PointRecord { position, values })
    }
}

/// Formats a coordinate attribute copy with the dedup precision.
pub fn format_coordinate(value: f64) -> String {
    format!("{:.prec$}", value, prec = COORD_DECIMALS as usize)
}
