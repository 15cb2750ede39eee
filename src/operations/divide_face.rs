use tracing::info;

use crate::error::{OperationError, Result};
use crate::math::intersect_3d::{intersect_line_segment, parallel};
use crate::math::project::point_to_segment_dist;
use crate::math::{Point3, Vector3, MERGE_TOLERANCE, TOLERANCE};
use crate::scene::{EdgeId, FaceId, Scene, VertexId};

/// How the offset vector spaces the dividing lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivideMode {
    /// Each copy steps the full offset: lines at 1x, 2x, ... the distance.
    Multiply,
    /// The offset is split into `copies` equal steps.
    Divide,
}

/// Draws parallel copies of one boundary edge across a face, trimmed to
/// the face's boundary.
///
/// Each copy's line is intersected with every non-parallel boundary edge;
/// the hits are sorted along the line and connected pairwise. Boundary
/// edges are split where a hit lands on their interior, so the new edges
/// join the boundary topology.
pub struct DivideFace {
    face: FaceId,
    edge: EdgeId,
    offset: Vector3,
    copies: usize,
    mode: DivideMode,
}

impl DivideFace {
    #[must_use]
    pub fn new(face: FaceId, edge: EdgeId, offset: Vector3, copies: usize, mode: DivideMode) -> Self {
        Self {
            face,
            edge,
            offset,
            copies,
            mode,
        }
    }

    /// Executes the division, returning the created edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are inconsistent (zero copies, the
    /// edge not on the face, an offset with no in-plane component), no
    /// copy produced a single intersection pair, or a mutation is rejected
    /// (the boundary is aborted first).
    pub fn execute(&self, scene: &mut Scene) -> Result<Vec<EdgeId>> {
        if self.copies == 0 {
            return Err(OperationError::InvalidInput("at least one copy required".into()).into());
        }
        if !scene.face(self.face)?.edges.contains(&self.edge) {
            return Err(
                OperationError::InvalidInput("edge is not on the face's boundary".into()).into(),
            );
        }
        let (_, normal) = scene.face_plane(self.face)?;
        let in_plane = self.offset - normal * self.offset.dot(&normal);
        if in_plane.norm() < TOLERANCE {
            return Err(
                OperationError::InvalidInput("offset has no in-plane component".into()).into(),
            );
        }
        #[allow(clippy::cast_precision_loss)]
        let step = match self.mode {
            DivideMode::Multiply => in_plane,
            DivideMode::Divide => in_plane / self.copies as f64,
        };
        let (anchor, far) = scene.edge_points(self.edge)?;
        let dir = far - anchor;

        scene.begin_operation("Divide Face")?;
        let created = match self.run(scene, &anchor, &dir, &step) {
            Ok(created) => created,
            Err(err) => {
                scene.abort_operation()?;
                return Err(err);
            }
        };
        if created.is_empty() {
            scene.abort_operation()?;
            return Err(OperationError::Failed("no copy intersects the face".into()).into());
        }
        scene.commit_operation()?;

        info!(edges = created.len(), copies = self.copies, "face divided");
        Ok(created)
    }

    fn run(
        &self,
        scene: &mut Scene,
        anchor: &Point3,
        dir: &Vector3,
        step: &Vector3,
    ) -> Result<Vec<EdgeId>> {
        let mut created = Vec::new();
        for copy in 1..=self.copies {
            #[allow(clippy::cast_precision_loss)]
            let origin = anchor + step * copy as f64;

            let mut hits: Vec<(f64, Point3)> = Vec::new();
            for bedge in scene.face(self.face)?.edges.clone() {
                let (a, b) = scene.edge_points(bedge)?;
                if parallel(dir, &(b - a)) {
                    continue;
                }
                let Some(hit) = intersect_line_segment(&origin, dir, &a, &b) else {
                    continue;
                };
                if hits.iter().all(|(_, h)| (h - hit).norm() > MERGE_TOLERANCE) {
                    hits.push(((hit - origin).dot(dir), hit));
                }
            }
            hits.sort_by(|(s, _), (t, _)| s.total_cmp(t));
            if hits.len() % 2 == 1 {
                hits.pop();
            }

            for pair in hits.chunks_exact(2) {
                let va = self.boundary_vertex(scene, &pair[0].1)?;
                let vb = self.boundary_vertex(scene, &pair[1].1)?;
                if va != vb {
                    created.push(scene.add_edge(va, vb)?);
                }
            }
        }
        Ok(created)
    }

    /// The vertex at `point` on the face boundary, splitting the edge it
    /// lands on when no vertex is there yet.
    fn boundary_vertex(&self, scene: &mut Scene, point: &Point3) -> Result<VertexId> {
        let boundary = scene.face(self.face)?.edges.clone();
        for bedge in boundary {
            let (a, b) = scene.edge_points(bedge)?;
            if point_to_segment_dist(point, &a, &b) > MERGE_TOLERANCE {
                continue;
            }
            let data = scene.edge(bedge)?;
            if (point - a).norm() < MERGE_TOLERANCE {
                return Ok(data.start);
            }
            if (point - b).norm() < MERGE_TOLERANCE {
                return Ok(data.end);
            }
            let split = scene.split_edge(bedge, point)?;
            let face = scene.face_mut(self.face)?;
            if let Some(pos) = face.edges.iter().position(|&e| e == bedge) {
                face.edges.splice(pos..=pos, split.edges);
            }
            return Ok(split.vertex);
        }
        Err(OperationError::Failed("intersection left the face boundary".into()).into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn rectangle(scene: &mut Scene) -> (FaceId, EdgeId) {
        let bottom = scene.add_edge_between(&p(0.0, 0.0), &p(10.0, 0.0)).unwrap();
        let right = scene.add_edge_between(&p(10.0, 0.0), &p(10.0, 6.0)).unwrap();
        let top = scene.add_edge_between(&p(10.0, 6.0), &p(0.0, 6.0)).unwrap();
        let left = scene.add_edge_between(&p(0.0, 6.0), &p(0.0, 0.0)).unwrap();
        let face = scene.add_face(vec![bottom, right, top, left]).unwrap();
        (face, bottom)
    }

    #[test]
    fn multiply_creates_one_edge_per_copy() {
        let mut scene = Scene::new();
        let (face, bottom) = rectangle(&mut scene);

        let created = DivideFace::new(face, bottom, Vector3::new(0.0, 2.0, 0.0), 2, DivideMode::Multiply)
            .execute(&mut scene)
            .unwrap();

        assert_eq!(created.len(), 2);
        for y in [2.0, 4.0] {
            let a = scene.vertex_at(&p(0.0, y)).unwrap();
            let b = scene.vertex_at(&p(10.0, y)).unwrap();
            assert!(scene.find_edge_between(a, b).is_some());
            // Connected to the boundary, not floating inside the face.
            assert_eq!(scene.vertex(a).unwrap().edges.len(), 3);
            assert_eq!(scene.vertex(b).unwrap().edges.len(), 3);
        }
        // Four boundary splits plus two dividers.
        assert_eq!(scene.edge_count(), 10);
    }

    #[test]
    fn divide_splits_the_offset_into_equal_steps() {
        let mut scene = Scene::new();
        let (face, bottom) = rectangle(&mut scene);

        let created = DivideFace::new(face, bottom, Vector3::new(0.0, 4.5, 0.0), 3, DivideMode::Divide)
            .execute(&mut scene)
            .unwrap();

        assert_eq!(created.len(), 3);
        for y in [1.5, 3.0, 4.5] {
            assert!(scene.vertex_at(&p(0.0, y)).is_some());
            assert!(scene.vertex_at(&p(10.0, y)).is_some());
        }
    }

    #[test]
    fn triangle_gets_a_trimmed_divider() {
        let mut scene = Scene::new();
        let bottom = scene.add_edge_between(&p(0.0, 0.0), &p(10.0, 0.0)).unwrap();
        let rising = scene.add_edge_between(&p(10.0, 0.0), &p(5.0, 8.0)).unwrap();
        let falling = scene.add_edge_between(&p(5.0, 8.0), &p(0.0, 0.0)).unwrap();
        let face = scene.add_face(vec![bottom, rising, falling]).unwrap();

        let created = DivideFace::new(face, bottom, Vector3::new(0.0, 4.0, 0.0), 1, DivideMode::Multiply)
            .execute(&mut scene)
            .unwrap();

        assert_eq!(created.len(), 1);
        let (a, b) = scene.edge_points(created[0]).unwrap();
        // The divider spans the slanted sides at half height: x = 2.5..7.5.
        assert!((a.y - 4.0).abs() < TOLERANCE && (b.y - 4.0).abs() < TOLERANCE);
        assert!(((b.x - a.x).abs() - 5.0).abs() < MERGE_TOLERANCE);
    }

    #[test]
    fn line_through_the_apex_aborts_cleanly() {
        let mut scene = Scene::new();
        let bottom = scene.add_edge_between(&p(0.0, 0.0), &p(10.0, 0.0)).unwrap();
        let rising = scene.add_edge_between(&p(10.0, 0.0), &p(5.0, 8.0)).unwrap();
        let falling = scene.add_edge_between(&p(5.0, 8.0), &p(0.0, 0.0)).unwrap();
        let face = scene.add_face(vec![bottom, rising, falling]).unwrap();

        // Both slanted edges report the apex; deduplication leaves one
        // hit, the odd-count trim drops it, and nothing gets created.
        let result = DivideFace::new(face, bottom, Vector3::new(0.0, 8.0, 0.0), 1, DivideMode::Multiply)
            .execute(&mut scene);
        assert!(result.is_err());
        assert_eq!(scene.edge_count(), 3);
        assert!(scene.undo().is_err());
    }

    #[test]
    fn out_of_plane_offset_is_rejected() {
        let mut scene = Scene::new();
        let (face, bottom) = rectangle(&mut scene);
        let result = DivideFace::new(face, bottom, Vector3::new(0.0, 0.0, 5.0), 1, DivideMode::Multiply)
            .execute(&mut scene);
        assert!(result.is_err());
    }

    #[test]
    fn foreign_edge_is_rejected() {
        let mut scene = Scene::new();
        let (face, _) = rectangle(&mut scene);
        let stray = scene.add_edge_between(&p(50.0, 0.0), &p(60.0, 0.0)).unwrap();
        let result = DivideFace::new(face, stray, Vector3::new(0.0, 2.0, 0.0), 1, DivideMode::Multiply)
            .execute(&mut scene);
        assert!(result.is_err());
    }
}
