//! Crate-wide error type and result alias.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpotterError>;

/// Errors produced by the reconciliation core.
///
/// Row-level problems (bad coordinate text, failed single-row transforms) are
/// never surfaced individually; they are counted by the operation and, for
/// import, escalated to [`SpotterError::ImportRejected`] when the count is
/// nonzero.
#[derive(Debug, Error)]
pub enum SpotterError {
    /// A coordinate string matched none of the supported notations.
    #[error("unrecognized coordinate text: {text:?}")]
    InvalidCoordinateFormat { text: String },

    /// A coordinate transform between two CRS could not be performed.
    #[error("coordinate transform from {from} to {to} failed")]
    CrsTransformFailure { from: String, to: String },

    /// The tabular source contains no data rows.
    #[error("source contains no data rows")]
    EmptySource,

    /// One or more rows were invalid, so the whole import was rejected.
    #[error("import rejected: {invalid} invalid row(s) out of {total}")]
    ImportRejected { invalid: usize, total: usize },

    /// A dataset with the requested name is already registered.
    #[error("a dataset named {name:?} already exists")]
    DatasetExists { name: String },

    /// No dataset with the requested name is registered.
    #[error("no dataset named {name:?}")]
    UnknownDataset { name: String },

    /// A role binding or export field references a field the schema lacks.
    #[error("field {name:?} not found in the dataset schema")]
    MissingField { name: String },

    /// A record index is past the end of the dataset.
    #[error("record index {index} out of range for dataset {name:?}")]
    RecordOutOfRange { name: String, index: usize },

    /// The rebase anchor carries no elevation value.
    #[error("anchor point has no elevation value")]
    MissingElevation,

    /// The dataset declares no elevation field at all.
    #[error("dataset {name:?} declares no elevation field")]
    NoElevationField { name: String },

    /// A drawing batch contains geometry kinds other than lines and polygons.
    #[error("{unsupported} of {total} drawing feature(s) are neither lines nor polygons")]
    UnsupportedGeometry { unsupported: usize, total: usize },

    /// The caller's cancellation flag was set between records.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
