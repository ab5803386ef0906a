use spotter::crs::Crs;
use spotter::dataset::RoleBindings;
use spotter::dedup::{extract_and_merge, CollisionDecision, FixedDecision, MergeOptions};
use spotter::elevation::rebase;
use spotter::geometry::{DrawingFeature, DrawingGeometry, Point};
use spotter::ingest::{import_csv_bytes, ImportOptions};
use spotter::snap::{nearest, SnapOutcome, SnapRadius};
use spotter::store::LayerStore;

fn imported_store() -> LayerStore {
    let options = ImportOptions::new(
        "pts",
        Crs::wgs84(),
        RoleBindings {
            identifier: "id".into(),
            x: "lon".into(),
            y: "lat".into(),
            elevation: Some("elev".into()),
        },
    );
    let csv = "id,lat,lon,elev\n1,0.0,0.0,10.0\n2,0.001,0.0,12.5\n3,0.002,0.0,9.0\n";
    let dataset = import_csv_bytes(csv.as_bytes(), &options, None).unwrap();
    let mut store = LayerStore::new();
    store.create(dataset).unwrap();
    store
}

#[test]
fn extract_snap_and_rebase() {
    let mut store = imported_store();

    // A closed polygon in the source CRS sharing one vertex with the
    // imported points: its closing vertex is dropped, the shared corner is
    // deduplicated, and the two new vertices continue the numbering.
    let polygon = DrawingFeature {
        crs: Crs::wgs84(),
        geometry: DrawingGeometry::Polygon {
            vertices: vec![
                Point::new(0.0, 0.0),
                Point::new(0.01, 0.0),
                Point::new(0.01, 0.01),
                Point::new(0.0, 0.0),
            ],
        },
    };
    store.begin_edit("pts").unwrap();
    let report = extract_and_merge(
        store.dataset_mut("pts").unwrap(),
        &[polygon],
        MergeOptions::default(),
        &mut FixedDecision(CollisionDecision::SkipThis),
        None,
    )
    .unwrap();
    store.commit("pts");
    assert_eq!(report.vertices, 3);
    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 1);
    {
        let ds = store.dataset("pts").unwrap();
        assert_eq!(ds.records.len(), 5);
        assert_eq!(ds.identifier_of(&ds.records[3]), "4");
        assert_eq!(ds.identifier_of(&ds.records[4]), "5");
    }

    // Snap near the second imported point (latitude 0.001 is roughly 110 m
    // north of the equator in Web Mercator).
    let outcome = nearest(
        &store,
        Point::new(0.0, 110.0),
        &Crs::web_mercator(),
        SnapRadius {
            projected: 5.0,
            geographic: 1e-4,
        },
        |ds| ds.has_elevation_field(),
    );
    let SnapOutcome::Candidates(candidates) = outcome else {
        panic!("expected a snap candidate");
    };
    assert_eq!(candidates[0].record_index, 1);

    // Rebase the layer so that the snapped point reads 15.0.
    let updated = rebase(&mut store, "pts", candidates[0].record_index, 15.0).unwrap();
    assert_eq!(updated, 3); // extracted vertices carry no elevation

    let ds = store.dataset("pts").unwrap();
    let elevations: Vec<Option<f64>> = ds.records.iter().map(|r| ds.elevation_of(r)).collect();
    assert_eq!(
        elevations,
        vec![Some(12.5), Some(15.0), Some(11.5), None, None]
    );
}

#[test]
fn snap_miss_reports_the_closest_point() {
    let store = imported_store();
    let outcome = nearest(
        &store,
        Point::new(10_000.0, 0.0),
        &Crs::web_mercator(),
        SnapRadius {
            projected: 5.0,
            geographic: 1e-4,
        },
        |ds| ds.has_elevation_field(),
    );
    let SnapOutcome::NothingInRadius { closest } = outcome else {
        panic!("expected a miss");
    };
    let closest = closest.unwrap();
    assert!(closest.distance > 5.0);
    assert_eq!(closest.record_index, 0);
}
