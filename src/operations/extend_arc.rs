use tracing::info;

use crate::error::{OperationError, Result};
use crate::math::arc_3d::{full_angle_between, ArcFrame};
use crate::math::{Point3, TOLERANCE};
use crate::scene::{CurveId, EdgeId, Scene};

/// Which end of the arc sweeps out to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcEnd {
    Start,
    End,
}

/// Extends (or retracts) one end of an arc-backed curve to a target point.
///
/// The target is projected onto the arc's plane; the chosen end sweeps to
/// the projected direction while the other end stays fixed. The edge chain
/// is rebuilt with the segment count rescaled to keep the original chord
/// density.
pub struct ExtendArc {
    curve: CurveId,
    end: ArcEnd,
    target: Point3,
}

impl ExtendArc {
    #[must_use]
    pub fn new(curve: CurveId, end: ArcEnd, target: Point3) -> Self {
        Self { curve, end, target }
    }

    /// Executes the extension, returning the rebuilt curve and its edges.
    ///
    /// The original curve handle dies with its edges; material and layer
    /// of its first edge carry over to every rebuilt edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve is missing or carries no arc, the
    /// target lands on the arc's center or collapses the sweep, or a
    /// mutation is rejected (the boundary is aborted first).
    pub fn execute(&self, scene: &mut Scene) -> Result<(CurveId, Vec<EdgeId>)> {
        let data = scene.curve(self.curve)?;
        let arc = data
            .arc
            .clone()
            .ok_or_else(|| OperationError::InvalidInput("curve carries no arc".into()))?;
        let old_edges = data.edges.clone();
        let first_edge = *old_edges
            .first()
            .ok_or_else(|| OperationError::InvalidInput("curve has no edges".into()))?;
        let metadata = scene.edge(first_edge)?;
        let (material, layer) = (metadata.material.clone(), metadata.layer.clone());

        let old_sweep = arc.end_angle - arc.start_angle;
        if old_sweep < TOLERANCE {
            return Err(OperationError::InvalidInput("arc sweep is degenerate".into()).into());
        }

        let projected = arc.project_to_plane(&self.target);
        let direction = projected - arc.center;
        if direction.norm() < TOLERANCE {
            return Err(
                OperationError::InvalidInput("target lies on the arc's axis".into()).into(),
            );
        }

        // The fixed end's direction is the angular reference; the moving
        // end sweeps around the normal to the target's direction.
        let frame = match self.end {
            ArcEnd::End => {
                let start_dir = arc.evaluate(arc.start_angle) - arc.center;
                let sweep = full_angle_between(&start_dir, &direction, &arc.normal);
                new_frame(&arc, arc.start_angle, arc.start_angle + sweep)?
            }
            ArcEnd::Start => {
                let end_dir = arc.evaluate(arc.end_angle) - arc.center;
                let sweep = full_angle_between(&direction, &end_dir, &arc.normal);
                new_frame(&arc, arc.end_angle - sweep, arc.end_angle)?
            }
        };
        let new_sweep = frame.end_angle - frame.start_angle;
        if new_sweep < TOLERANCE {
            return Err(OperationError::InvalidInput("target collapses the arc".into()).into());
        }

        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let segments = ((old_edges.len() as f64) * new_sweep / old_sweep).ceil() as usize;
        let segments = segments.max(1);

        scene.begin_operation("Extend Arc")?;
        let rebuilt = match self.rebuild(scene, &old_edges, &frame, segments, &material, &layer) {
            Ok(rebuilt) => rebuilt,
            Err(err) => {
                scene.abort_operation()?;
                return Err(err);
            }
        };
        scene.commit_operation()?;

        info!(segments, sweep = new_sweep, "arc extended");
        Ok(rebuilt)
    }

    fn rebuild(
        &self,
        scene: &mut Scene,
        old_edges: &[EdgeId],
        frame: &ArcFrame,
        segments: usize,
        material: &Option<String>,
        layer: &Option<String>,
    ) -> Result<(CurveId, Vec<EdgeId>)> {
        scene.erase_edges(old_edges);
        let points = frame.sample(segments);
        let (curve, edges) = scene.add_curve(&points)?;
        for &edge in &edges {
            let data = scene.edge_mut(edge)?;
            data.material.clone_from(material);
            data.layer.clone_from(layer);
        }
        scene.set_curve_arc(curve, frame.clone())?;
        Ok((curve, edges))
    }
}

fn new_frame(arc: &ArcFrame, start_angle: f64, end_angle: f64) -> Result<ArcFrame> {
    ArcFrame::new(
        arc.center,
        arc.x_axis,
        arc.normal,
        arc.radius,
        start_angle,
        end_angle,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::math::Vector3;

    fn quarter_arc(scene: &mut Scene, segments: usize) -> CurveId {
        let frame = ArcFrame::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            10.0,
            0.0,
            FRAC_PI_2,
        )
        .unwrap();
        let (curve, _) = scene.add_curve(&frame.sample(segments)).unwrap();
        scene.set_curve_arc(curve, frame).unwrap();
        curve
    }

    #[test]
    fn extending_the_end_reaches_the_target_direction() {
        let mut scene = Scene::new();
        let curve = quarter_arc(&mut scene, 4);

        let (rebuilt, edges) = ExtendArc::new(curve, ArcEnd::End, Point3::new(-10.0, 0.0, 0.0))
            .execute(&mut scene)
            .unwrap();

        // Quarter became a half: chord count doubles.
        assert_eq!(edges.len(), 8);
        assert!(scene.vertex_at(&Point3::new(10.0, 0.0, 0.0)).is_some());
        assert!(scene.vertex_at(&Point3::new(-10.0, 0.0, 0.0)).is_some());
        let arc = scene.curve(rebuilt).unwrap().arc.clone().unwrap();
        assert!((arc.end_angle - arc.start_angle - PI).abs() < TOLERANCE);
    }

    #[test]
    fn extending_the_start_sweeps_backwards() {
        let mut scene = Scene::new();
        let frame = ArcFrame::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            10.0,
            FRAC_PI_2,
            PI,
        )
        .unwrap();
        let (curve, _) = scene.add_curve(&frame.sample(4)).unwrap();
        scene.set_curve_arc(curve, frame).unwrap();

        let (rebuilt, _) = ExtendArc::new(curve, ArcEnd::Start, Point3::new(10.0, 0.0, 0.0))
            .execute(&mut scene)
            .unwrap();

        let arc = scene.curve(rebuilt).unwrap().arc.clone().unwrap();
        assert!((arc.end_angle - PI).abs() < TOLERANCE);
        assert!(arc.start_angle.abs() < TOLERANCE);
        assert!(scene.vertex_at(&Point3::new(10.0, 0.0, 0.0)).is_some());
    }

    #[test]
    fn rebuilt_points_stay_on_the_radius() {
        let mut scene = Scene::new();
        let curve = quarter_arc(&mut scene, 6);

        ExtendArc::new(curve, ArcEnd::End, Point3::new(-10.0, -1.0, 3.0))
            .execute(&mut scene)
            .unwrap();

        for edge in scene.edge_ids() {
            let (a, b) = scene.edge_points(edge).unwrap();
            assert!((a.coords.norm() - 10.0).abs() < TOLERANCE);
            assert!((b.coords.norm() - 10.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn metadata_carries_over() {
        let mut scene = Scene::new();
        let curve = quarter_arc(&mut scene, 4);
        let first = scene.curve(curve).unwrap().edges[0];
        scene.edge_mut(first).unwrap().material = Some("steel".into());

        let (_, edges) = ExtendArc::new(curve, ArcEnd::End, Point3::new(-10.0, 0.0, 0.0))
            .execute(&mut scene)
            .unwrap();
        for edge in edges {
            assert_eq!(scene.edge(edge).unwrap().material.as_deref(), Some("steel"));
        }
    }

    #[test]
    fn plain_curve_is_rejected() {
        let mut scene = Scene::new();
        let (curve, _) = scene
            .add_curve(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(10.0, 3.0, 0.0),
            ])
            .unwrap();

        let result =
            ExtendArc::new(curve, ArcEnd::End, Point3::new(20.0, 0.0, 0.0)).execute(&mut scene);
        assert!(result.is_err());
        assert_eq!(scene.edge_count(), 2);
    }

    #[test]
    fn target_on_the_axis_is_rejected() {
        let mut scene = Scene::new();
        let curve = quarter_arc(&mut scene, 4);
        let result =
            ExtendArc::new(curve, ArcEnd::End, Point3::new(0.0, 0.0, 7.0)).execute(&mut scene);
        assert!(result.is_err());
    }
}
