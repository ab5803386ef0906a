//! Nearest-vertex search across datasets for interactive point selection.

use log::warn;

use crate::crs::Crs;
use crate::dataset::Dataset;
use crate::geometry::{distance, Point};
use crate::store::LayerStore;

/// Search radius per CRS kind.  Geographic datasets measure distance in
/// degrees, projected ones in linear units, so one number cannot serve both.
#[derive(Debug, Clone, Copy)]
pub struct SnapRadius {
    pub projected: f64,
    pub geographic: f64,
}

impl Default for SnapRadius {
    fn default() -> Self {
        Self {
            projected: 10.0,
            geographic: 1e-4,
        }
    }
}

/// One record within snapping distance of the click.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapCandidate {
    pub dataset: String,
    pub record_index: usize,
    pub position: Point,
    pub distance: f64,
}

/// Result of a snap query.
///
/// Several candidates are not an error: the caller picks one.  Zero
/// candidates report the single closest point anyway so the user can be told
/// "nothing close enough, closest is X away" instead of a bare failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapOutcome {
    Candidates(Vec<SnapCandidate>),
    NothingInRadius { closest: Option<SnapCandidate> },
}

/// Returns every record within radius of `click` across the datasets
/// accepted by `predicate`, sorted by ascending distance.
///
/// The click is transformed into each dataset's own CRS before measuring; a
/// dataset the click cannot be transformed into is skipped.
///
/// Distances are in each dataset's own units (degrees for geographic
/// datasets, linear units for projected ones).  A predicate admitting both
/// kinds puts incommensurable distances into one ordering; restrict the
/// predicate to one CRS kind when the cross-dataset order matters.
pub fn nearest(
    store: &LayerStore,
    click: Point,
    click_crs: &Crs,
    radius: SnapRadius,
    predicate: impl Fn(&Dataset) -> bool,
) -> SnapOutcome {
    let mut candidates: Vec<SnapCandidate> = Vec::new();
    let mut closest: Option<SnapCandidate> = None;

    for dataset in store.iter() {
        if !predicate(dataset) {
            continue;
        }
        let local_click = match click_crs.transform_point(&dataset.crs, click.x, click.y) {
            Some((x, y)) => Point::new(x, y),
            None => {
                warn!(
                    "snap: cannot transform click into {:?} ({})",
                    dataset.name,
                    dataset.crs.definition()
                );
                continue;
            }
        };
        let limit = if dataset.crs.is_geographic() {
            radius.geographic
        } else {
            radius.projected
        };
        for (index, record) in dataset.records.iter().enumerate() {
            let d = distance(local_click, record.position);
            let candidate = SnapCandidate {
                dataset: dataset.name.clone(),
                record_index: index,
                position: record.position,
                distance: d,
            };
            if d <= limit {
                candidates.push(candidate);
            } else if closest.as_ref().map_or(true, |c| d < c.distance) {
                closest = Some(candidate);
            }
        }
    }

    if candidates.is_empty() {
        SnapOutcome::NothingInRadius { closest }
    } else {
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        SnapOutcome::Candidates(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RoleBindings;

    fn dataset_with_points(name: &str, elevation: bool, points: &[(f64, f64)]) -> Dataset {
        let mut schema = vec!["id".into(), "x".into(), "y".into()];
        if elevation {
            schema.push("elev".into());
        }
        let mut ds = Dataset::new(
            name,
            Crs::web_mercator(),
            Crs::web_mercator(),
            RoleBindings {
                identifier: "id".into(),
                x: "x".into(),
                y: "y".into(),
                elevation: elevation.then(|| "elev".to_string()),
            },
            schema,
        )
        .unwrap();
        for (i, &(x, y)) in points.iter().enumerate() {
            let rec = ds.record_for(Point::new(x, y), &(i + 1).to_string()).unwrap();
            ds.records.push(rec);
        }
        ds
    }

    #[test]
    fn candidates_sorted_by_distance() {
        let mut store = LayerStore::new();
        store
            .create(dataset_with_points("a", true, &[(0.0, 0.0), (3.0, 0.0), (50.0, 0.0)]))
            .unwrap();
        let outcome = nearest(
            &store,
            Point::new(1.0, 0.0),
            &Crs::web_mercator(),
            SnapRadius {
                projected: 5.0,
                geographic: 1e-4,
            },
            |_| true,
        );
        let SnapOutcome::Candidates(c) = outcome else {
            panic!("expected candidates");
        };
        assert_eq!(c.len(), 2);
        assert!(c[0].distance <= c[1].distance);
        assert_eq!(c[0].record_index, 0);
    }

    #[test]
    fn miss_reports_closest_distance() {
        let mut store = LayerStore::new();
        store
            .create(dataset_with_points("a", true, &[(100.0, 0.0)]))
            .unwrap();
        let outcome = nearest(
            &store,
            Point::new(0.0, 0.0),
            &Crs::web_mercator(),
            SnapRadius {
                projected: 5.0,
                geographic: 1e-4,
            },
            |_| true,
        );
        let SnapOutcome::NothingInRadius { closest } = outcome else {
            panic!("expected a miss");
        };
        let closest = closest.unwrap();
        assert!((closest.distance - 100.0).abs() < 1e-9);
    }

    #[test]
    fn predicate_filters_datasets() {
        let mut store = LayerStore::new();
        store
            .create(dataset_with_points("flat", false, &[(0.0, 0.0)]))
            .unwrap();
        let outcome = nearest(
            &store,
            Point::new(0.0, 0.0),
            &Crs::web_mercator(),
            SnapRadius::default(),
            |ds| ds.has_elevation_field(),
        );
        assert!(matches!(
            outcome,
            SnapOutcome::NothingInRadius { closest: None }
        ));
    }
}
