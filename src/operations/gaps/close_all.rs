use tracing::info;

use crate::error::{OperationError, Result};
use crate::scene::{CurveId, EdgeId, Scene};
use crate::topology::find_end_vertices;

use super::close::CloseGap;
use super::find::FindGapCandidates;

/// Closes every open end in the scene that has a fix within tolerance,
/// optionally erasing unfixable dangling edges shorter than the tolerance.
///
/// Runs to a fixed point: every successful action strictly reduces the
/// open-end or edge count, so the loop terminates. One operation boundary
/// wraps the whole batch; any rejected mutation aborts it entirely.
pub struct CloseAllGaps {
    epsilon: f64,
    remove_small_edges: bool,
}

impl CloseAllGaps {
    /// Creates a new batch closure with the given tolerance.
    #[must_use]
    pub fn new(epsilon: f64, remove_small_edges: bool) -> Self {
        Self {
            epsilon,
            remove_small_edges,
        }
    }

    /// Executes the batch, returning the number of open ends fixed
    /// (closed or removed).
    ///
    /// # Errors
    ///
    /// Returns an error if the scene has no edges, or a mutation is
    /// rejected mid-batch (the boundary is aborted first).
    pub fn execute(&self, scene: &mut Scene) -> Result<usize> {
        if scene.edge_count() == 0 {
            return Err(OperationError::EmptySelection.into());
        }

        scene.begin_operation("Close All Edge Gaps")?;
        let (fixed, removed) = match self.run(scene) {
            Ok(counts) => counts,
            Err(err) => {
                scene.abort_operation()?;
                return Err(err);
            }
        };
        let regrouped = match repair_curve_memberships(scene) {
            Ok(regrouped) => regrouped,
            Err(err) => {
                scene.abort_operation()?;
                return Err(err);
            }
        };
        scene.commit_operation()?;

        info!(
            ends_fixed = fixed,
            edges_removed = removed,
            edges_regrouped = regrouped,
            "batch gap closure finished"
        );
        Ok(fixed)
    }

    fn run(&self, scene: &mut Scene) -> Result<(usize, usize)> {
        let mut fixed = 0;
        let mut removed = 0;
        loop {
            let mut changed = false;
            let open = find_end_vertices(scene, &scene.edge_ids());

            for source in open {
                // Earlier fixes this pass may have consumed this end.
                if !scene.is_open_vertex(source) {
                    continue;
                }
                let edges = scene.edge_ids();
                let open_now = find_end_vertices(scene, &edges);
                let candidates =
                    FindGapCandidates::new(source).execute(scene, &open_now, &edges)?;

                if let Some(kind) = CloseGap::new(source, self.epsilon).execute(scene, &candidates)? {
                    fixed += kind.ends_fixed();
                    changed = true;
                } else if self.remove_small_edges {
                    let edge = scene.vertex(source)?.edges.first().copied();
                    if let Some(edge) = edge {
                        if scene.edge_length(edge)? < self.epsilon {
                            fixed += open_end_count(scene, edge)?;
                            scene.erase_edge(edge)?;
                            removed += 1;
                            changed = true;
                        }
                    }
                }
            }

            if !changed {
                return Ok((fixed, removed));
            }
        }
    }
}

/// Open ends an edge would give up if erased.
fn open_end_count(scene: &Scene, edge: EdgeId) -> Result<usize> {
    let data = scene.edge(edge)?;
    Ok([data.start, data.end]
        .into_iter()
        .filter(|&v| scene.is_open_vertex(v))
        .count())
}

/// Re-associates edges created inside the current operation boundary with
/// the grouping of their surroundings.
///
/// A new edge bridging two parts of one grouped curve must end the batch
/// inside that grouping; an edge whose two sides disagree (or where one
/// side is ungrouped) stays out. Runs to a fixed point: each adoption can
/// qualify a chained new edge next to it.
///
/// # Errors
///
/// Returns an error if a scene lookup fails mid-repair.
pub fn repair_curve_memberships(scene: &mut Scene) -> Result<usize> {
    let mut regrouped = 0;
    loop {
        let mut changed = false;
        for edge in scene.created_edges() {
            if scene.edge(edge)?.curve.is_some() {
                continue;
            }
            if let Some(curve) = bridged_curve(scene, edge)? {
                scene.attach_to_curve(edge, curve)?;
                regrouped += 1;
                changed = true;
            }
        }
        if !changed {
            return Ok(regrouped);
        }
    }
}

/// The curve an edge bridges, if every grouped neighbor on both of its
/// endpoints belongs to that one curve and neither side lacks one.
fn bridged_curve(scene: &Scene, edge: EdgeId) -> Result<Option<CurveId>> {
    let data = scene.edge(edge)?;
    let mut curve = None;
    for vertex in [data.start, data.end] {
        let mut side = None;
        for &neighbor in &scene.vertex(vertex)?.edges {
            if neighbor == edge {
                continue;
            }
            let Some(group) = scene.edge(neighbor)?.curve else {
                continue;
            };
            if side.is_some_and(|s| s != group) {
                return Ok(None);
            }
            side = Some(group);
        }
        let Some(side) = side else {
            return Ok(None);
        };
        if curve.is_some_and(|c| c != side) {
            return Ok(None);
        }
        curve = Some(side);
    }
    Ok(curve)
}
