//! Spatial deduplication of drawing vertices against a point dataset.
//!
//! Drawings frequently share vertices between adjacent polygons (parcel
//! boundaries being the classic case); without positional dedup a dataset
//! accumulates coincident points under different names, which corrupts both
//! the numbering scheme and any distance-based lookup.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::dataset::{Dataset, SpatialKey};
use crate::error::{Result, SpotterError};
use crate::geometry::{DrawingFeature, Point};
use crate::naming;

/// Caller's answer to an identifier collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionDecision {
    /// Insert this vertex despite the name being taken.
    InsertThis,
    /// Skip this vertex only.
    SkipThis,
    /// Insert this and every later colliding vertex without asking again.
    InsertAll,
    /// Skip this and every later colliding vertex without asking again.
    SkipAll,
}

/// Resolves identifier collisions during a merge.  Invoked once per
/// colliding vertex until a session-wide answer short-circuits prompting.
pub trait CollisionPrompt {
    fn resolve(&mut self, identifier: &str, position: Point) -> CollisionDecision;
}

/// Non-interactive prompt giving the same answer every time.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub CollisionDecision);

impl CollisionPrompt for FixedDecision {
    fn resolve(&mut self, _identifier: &str, _position: Point) -> CollisionDecision {
        self.0
    }
}

/// Tuning knobs for one merge call.  UI session state such as a "last used"
/// number is passed in here instead of living on the core.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// First number to assign; defaults to continuing the dataset's own
    /// numbering via [`naming::next_identifier`].
    pub start_number: Option<u32>,
}

/// Counts reported by [`extract_and_merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub features: usize,
    pub vertices: usize,
    pub added: usize,
    pub skipped: usize,
}

/// Extracts the vertices of `sources` into `target`, skipping any vertex
/// that coincides with an existing point or with a vertex already merged in
/// this call (equality under [`SpatialKey`]).
///
/// A polygon's duplicated closing vertex is dropped before dedup.  Vertices
/// whose CRS differs from the target's are transformed first; a vertex whose
/// transform fails is skipped, unlike import where a failed row rejects the
/// batch (extraction is append-only, so skipping cannot corrupt what is
/// already there).
///
/// The cancellation flag is polled once per vertex.  A cancelled merge
/// returns [`SpotterError::Cancelled`]; callers run the merge inside a store
/// edit transaction and roll back, so no partial batch survives.
pub fn extract_and_merge(
    target: &mut Dataset,
    sources: &[DrawingFeature],
    options: MergeOptions,
    prompt: &mut dyn CollisionPrompt,
    cancel: Option<&AtomicBool>,
) -> Result<MergeReport> {
    let mut occupied = target.spatial_keys();
    let mut next = options
        .start_number
        .unwrap_or_else(|| naming::next_identifier(target));
    let mut session: Option<bool> = None;
    let mut report = MergeReport::default();

    for feature in sources {
        report.features += 1;
        let mut vertices: Vec<Point> = feature.vertices().to_vec();
        if feature.geometry.is_polygon() && vertices.len() >= 2 {
            let first = SpatialKey::of(vertices[0]);
            let last = SpatialKey::of(vertices[vertices.len() - 1]);
            if first == last {
                vertices.pop();
            }
        }

        for vertex in vertices {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(SpotterError::Cancelled);
                }
            }
            report.vertices += 1;

            let point = if feature.crs == target.crs {
                vertex
            } else {
                match feature.crs.transform_point(&target.crs, vertex.x, vertex.y) {
                    Some((x, y)) => Point::new(x, y),
                    None => {
                        warn!(
                            "skipping vertex ({}, {}): transform {} -> {} failed",
                            vertex.x,
                            vertex.y,
                            feature.crs.definition(),
                            target.crs.definition()
                        );
                        report.skipped += 1;
                        continue;
                    }
                }
            };

            let key = SpatialKey::of(point);
            if occupied.contains(&key) {
                debug!("skipping coincident vertex ({}, {})", point.x, point.y);
                report.skipped += 1;
                continue;
            }

            let identifier = next.to_string();
            if target
                .records
                .iter()
                .any(|r| target.identifier_of(r) == identifier)
            {
                let insert = match session {
                    Some(answer) => answer,
                    None => match prompt.resolve(&identifier, point) {
                        CollisionDecision::InsertThis => true,
                        CollisionDecision::SkipThis => false,
                        CollisionDecision::InsertAll => {
                            session = Some(true);
                            true
                        }
                        CollisionDecision::SkipAll => {
                            session = Some(false);
                            false
                        }
                    },
                };
                if !insert {
                    report.skipped += 1;
                    continue;
                }
            }

            let record = target.record_for(point, &identifier)?;
            target.records.push(record);
            occupied.insert(key);
            next += 1;
            report.added += 1;
        }
    }

    info!(
        "merged {} of {} vertex(es) from {} feature(s) into {:?} ({} skipped)",
        report.added, report.vertices, report.features, target.name, report.skipped
    );
    Ok(report)
}
