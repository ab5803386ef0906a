//! Named dataset registry with edit transactions and JSON persistence.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, PointRecord};
use crate::error::{Result, SpotterError};

/// In-memory registry of datasets keyed by name.
///
/// `begin_edit`/`commit`/`rollback` give mutating operations all-or-nothing
/// semantics over a dataset's records; the transaction is also the sole
/// mutual-exclusion discipline, as a dataset is mutated by at most one
/// logical operation at a time.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LayerStore {
    datasets: BTreeMap<String, Dataset>,
    #[serde(skip)]
    snapshots: HashMap<String, Vec<PointRecord>>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    /// Registers a dataset under its own name.
    pub fn create(&mut self, dataset: Dataset) -> Result<()> {
        if self.contains(&dataset.name) {
            return Err(SpotterError::DatasetExists {
                name: dataset.name.clone(),
            });
        }
        self.datasets.insert(dataset.name.clone(), dataset);
        Ok(())
    }

    pub fn dataset(&self, name: &str) -> Result<&Dataset> {
        self.datasets
            .get(name)
            .ok_or_else(|| SpotterError::UnknownDataset {
                name: name.to_string(),
            })
    }

    pub fn dataset_mut(&mut self, name: &str) -> Result<&mut Dataset> {
        self.datasets
            .get_mut(name)
            .ok_or_else(|| SpotterError::UnknownDataset {
                name: name.to_string(),
            })
    }

    /// Removes a dataset and any pending snapshot for it.
    pub fn remove(&mut self, name: &str) -> Option<Dataset> {
        self.snapshots.remove(name);
        self.datasets.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.values()
    }

    /// Snapshots the dataset's records.  A second `begin_edit` before commit
    /// keeps the original snapshot.
    pub fn begin_edit(&mut self, name: &str) -> Result<()> {
        let dataset = self.dataset(name)?;
        let records = dataset.records.clone();
        self.snapshots.entry(name.to_string()).or_insert(records);
        Ok(())
    }

    /// Drops the snapshot, making the edits permanent.
    pub fn commit(&mut self, name: &str) {
        self.snapshots.remove(name);
    }

    /// Restores the records captured by `begin_edit`, if any.
    pub fn rollback(&mut self, name: &str) -> Result<()> {
        let snapshot = self.snapshots.remove(name);
        let dataset = self.dataset_mut(name)?;
        if let Some(records) = snapshot {
            dataset.records = records;
        }
        Ok(())
    }
}

/// Reads a store previously written with [`write_store_json`].
pub fn read_store_json(path: &str) -> Result<LayerStore> {
    let contents = crate::io::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Persists the store, including per-dataset role bindings and source CRS,
/// as pretty-printed JSON.
pub fn write_store_json(path: &str, store: &LayerStore) -> Result<()> {
    let json = serde_json::to_string_pretty(store)?;
    crate::io::write_string(path, &json)?;
    Ok(())
}
