use tracing::info;

use crate::error::{OperationError, Result};
use crate::math::simplify::simplify_polyline;
use crate::math::Point3;
use crate::scene::{EdgeId, Scene};
use crate::topology::{find_curves, find_end_vertices, sort_vertices};

struct RebuildPlan {
    points: Vec<Point3>,
    removed: usize,
    material: Option<String>,
    layer: Option<String>,
}

/// Reduces each selected curve to fewer segments within a deviation
/// tolerance, rebuilding it as one curve (or a single plain edge).
///
/// An epsilon of zero keeps every point; the chain is still rebuilt.
/// First and last points always survive, and closed chains stay closed.
pub struct SimplifyCurves {
    epsilon: f64,
}

impl SimplifyCurves {
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Executes the simplification, returning the number of points
    /// removed across all curves.
    ///
    /// All replacements are planned from the original geometry before any
    /// edge is erased, then applied inside one operation boundary. The
    /// first original edge's material and layer are copied onto every
    /// rebuilt edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is empty, no live curve remains
    /// in it, or a rebuild is rejected (the boundary is aborted first).
    pub fn execute(&self, scene: &mut Scene, selection: &[EdgeId]) -> Result<usize> {
        if selection.is_empty() {
            return Err(OperationError::EmptySelection.into());
        }

        let mut plans = Vec::new();
        for chain in find_curves(scene, selection) {
            if let Some(plan) = self.plan(scene, &chain)? {
                plans.push(plan);
            }
        }
        if plans.is_empty() {
            return Err(OperationError::NoCurvesFound.into());
        }

        scene.begin_operation("Simplify Curves")?;
        match self.rebuild(scene, selection, &plans) {
            Ok(()) => {}
            Err(err) => {
                scene.abort_operation()?;
                return Err(err);
            }
        }
        scene.commit_operation()?;

        let removed = plans.iter().map(|plan| plan.removed).sum();
        info!(curves = plans.len(), points_removed = removed, "curves simplified");
        Ok(removed)
    }

    fn plan(&self, scene: &Scene, chain: &[EdgeId]) -> Result<Option<RebuildPlan>> {
        let order = sort_vertices(scene, chain);
        if order.len() < 2 {
            return Ok(None);
        }
        let mut points = order
            .iter()
            .map(|&v| scene.point(v))
            .collect::<Result<Vec<_>>>()?;
        // Close the ring so a loop's rebuild welds back onto its start.
        if find_end_vertices(scene, chain).is_empty() {
            if let Some(&first) = points.first() {
                points.push(first);
            }
        }

        let reduced = if self.epsilon > 0.0 {
            simplify_polyline(&points, self.epsilon)
        } else {
            points.clone()
        };
        let removed = points.len() - reduced.len();

        let first_edge = chain
            .first()
            .copied()
            .ok_or(OperationError::NoCurvesFound)?;
        let data = scene.edge(first_edge)?;
        Ok(Some(RebuildPlan {
            points: reduced,
            removed,
            material: data.material.clone(),
            layer: data.layer.clone(),
        }))
    }

    fn rebuild(&self, scene: &mut Scene, selection: &[EdgeId], plans: &[RebuildPlan]) -> Result<()> {
        scene.erase_edges(selection);
        for plan in plans {
            let rebuilt = if plan.points.len() > 2 {
                scene.add_curve(&plan.points)?.1
            } else if let Some((first, last)) = plan.points.first().zip(plan.points.last()) {
                vec![scene.add_edge_between(first, last)?]
            } else {
                Vec::new()
            };
            for edge in rebuilt {
                let data = scene.edge_mut(edge)?;
                data.material.clone_from(&plan.material);
                data.layer.clone_from(&plan.layer);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn near_straight_chain_collapses_to_one_edge() {
        let mut scene = Scene::new();
        let (_, edges) = scene
            .add_curve(&[p(0.0, 0.0), p(3.0, 0.1), p(6.0, -0.1), p(10.0, 0.0)])
            .unwrap();

        let removed = SimplifyCurves::new(0.5).execute(&mut scene, &edges).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(scene.edge_count(), 1);
        assert_eq!(scene.curve_count(), 0);
        assert!(scene.vertex_at(&p(0.0, 0.0)).is_some());
        assert!(scene.vertex_at(&p(10.0, 0.0)).is_some());
    }

    #[test]
    fn significant_detour_survives_as_a_curve() {
        let mut scene = Scene::new();
        // (2.5, 2) sits on the chord to the apex and drops out; the apex
        // itself deviates far too much and stays.
        let (_, edges) = scene
            .add_curve(&[p(0.0, 0.0), p(2.5, 2.0), p(5.0, 4.0), p(10.0, 0.0)])
            .unwrap();

        let removed = SimplifyCurves::new(0.5).execute(&mut scene, &edges).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(scene.curve_count(), 1);
        assert_eq!(scene.edge_count(), 2);
        assert!(scene.vertex_at(&p(5.0, 4.0)).is_some());
    }

    #[test]
    fn zero_epsilon_rebuilds_without_removing() {
        let mut scene = Scene::new();
        let (old_curve, edges) = scene
            .add_curve(&[p(0.0, 0.0), p(3.0, 2.0), p(6.0, 0.0)])
            .unwrap();

        let removed = SimplifyCurves::new(0.0).execute(&mut scene, &edges).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(scene.edge_count(), 2);
        assert!(scene.curve(old_curve).is_err());
        assert_eq!(scene.curve_count(), 1);
    }

    #[test]
    fn metadata_copied_to_every_rebuilt_edge() {
        let mut scene = Scene::new();
        let (_, edges) = scene
            .add_curve(&[p(0.0, 0.0), p(3.0, 0.1), p(5.0, 4.0), p(10.0, 0.0)])
            .unwrap();
        scene.edge_mut(edges[0]).unwrap().material = Some("steel".into());
        scene.edge_mut(edges[0]).unwrap().layer = Some("frame".into());

        SimplifyCurves::new(0.5).execute(&mut scene, &edges).unwrap();
        for edge in scene.edge_ids() {
            let data = scene.edge(edge).unwrap();
            assert_eq!(data.material.as_deref(), Some("steel"));
            assert_eq!(data.layer.as_deref(), Some("frame"));
        }
    }

    #[test]
    fn closed_chain_stays_closed() {
        let mut scene = Scene::new();
        let (_, edges) = scene
            .add_curve(&[
                p(0.0, 0.0),
                p(5.0, 0.05),
                p(10.0, 0.0),
                p(10.0, 10.0),
                p(0.0, 10.0),
                p(0.0, 0.0),
            ])
            .unwrap();

        // Pass-through rebuild: the ring must weld back onto its start
        // instead of coming out as an open chain.
        let removed = SimplifyCurves::new(0.0).execute(&mut scene, &edges).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(scene.edge_count(), 5);
        assert_eq!(scene.curve_count(), 1);
        assert!(find_end_vertices(&scene, &scene.edge_ids()).is_empty());
    }

    #[test]
    fn empty_selection_is_an_error() {
        let mut scene = Scene::new();
        assert!(SimplifyCurves::new(0.5).execute(&mut scene, &[]).is_err());
    }

    #[test]
    fn stale_selection_reports_no_curves() {
        let mut scene = Scene::new();
        let (_, edges) = scene
            .add_curve(&[p(0.0, 0.0), p(3.0, 2.0), p(6.0, 0.0)])
            .unwrap();
        scene.erase_edges(&edges);
        scene.add_edge_between(&p(50.0, 0.0), &p(60.0, 0.0)).unwrap();

        let result = SimplifyCurves::new(0.5).execute(&mut scene, &edges);
        assert!(result.is_err());
    }
}
