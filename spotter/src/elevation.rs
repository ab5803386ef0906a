//! Elevation rebasing: shifting every elevation in a dataset by the delta
//! derived from one anchor point's before/after value.

use log::info;

use crate::error::{Result, SpotterError};
use crate::store::LayerStore;

/// Rebases every elevation in `dataset_name` so that the record at
/// `anchor_index` ends up at `new_elevation`.
///
/// The delta is `new_elevation - anchor elevation`; records without an
/// elevation value are left untouched, all others are shifted and rounded to
/// three decimals.  The whole update runs inside one edit transaction.
/// Returns the number of records updated.
pub fn rebase(
    store: &mut LayerStore,
    dataset_name: &str,
    anchor_index: usize,
    new_elevation: f64,
) -> Result<usize> {
    let dataset = store.dataset(dataset_name)?;
    if !dataset.has_elevation_field() {
        return Err(SpotterError::NoElevationField {
            name: dataset_name.to_string(),
        });
    }
    let anchor = dataset
        .records
        .get(anchor_index)
        .ok_or_else(|| SpotterError::RecordOutOfRange {
            name: dataset_name.to_string(),
            index: anchor_index,
        })?;
    let anchor_elevation = dataset
        .elevation_of(anchor)
        .ok_or(SpotterError::MissingElevation)?;
    let delta = new_elevation - anchor_elevation;

    store.begin_edit(dataset_name)?;
    let dataset = store.dataset_mut(dataset_name)?;
    let updates: Vec<(usize, f64)> = dataset
        .records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| dataset.elevation_of(r).map(|e| (i, e + delta)))
        .collect();
    let updated = updates.len();
    for (index, value) in updates {
        dataset.set_elevation(index, value);
    }
    store.commit(dataset_name);

    info!(
        "rebased {} elevation(s) in {:?} by {:+.3}",
        updated, dataset_name, delta
    );
    Ok(updated)
}
