//! Core library for the spotter point reconciliation tools.
//!
//! Ingests tabular point data (CSV) and drawing vertices (lines/polygons),
//! reconciles them into coherent point datasets under a chosen CRS, and
//! re-exports subsets in various coordinate notations.

pub mod crs;
pub mod dataset;
pub mod dedup;
pub mod dms;
pub mod elevation;
pub mod error;
pub mod export;
pub mod geometry;
pub mod ingest;
pub mod io;
pub mod naming;
pub mod snap;
pub mod store;

pub use error::{Result, SpotterError};
