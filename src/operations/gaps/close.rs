use crate::error::Result;
use crate::math::MERGE_TOLERANCE;
use crate::scene::{Scene, VertexId};

use super::find::GapCandidates;
use super::GapKind;

/// Applies the best candidate fix within tolerance to one open vertex.
///
/// Candidates are tried in fixed priority order (projected > edge >
/// vertex). The caller owns the operation boundary: a `Err` from any
/// mutation means the whole boundary must be aborted, while `Ok(None)`
/// ("nothing within tolerance") is recoverable and leaves the scene
/// untouched.
pub struct CloseGap {
    source: VertexId,
    epsilon: f64,
}

impl CloseGap {
    /// Creates a new resolution attempt for the given open vertex.
    #[must_use]
    pub fn new(source: VertexId, epsilon: f64) -> Self {
        Self { source, epsilon }
    }

    /// Executes the resolution, returning the kind of fix applied, or
    /// `None` when no candidate is within tolerance.
    ///
    /// Candidates must be fresh: handles inside them are re-validated, and
    /// stale ones simply drop out of consideration.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene rejects a mutation; the caller must
    /// then abort the enclosing operation boundary.
    pub fn execute(&self, scene: &mut Scene, candidates: &GapCandidates) -> Result<Option<GapKind>> {
        let source_point = scene.point(self.source)?;

        if let Some(vp) = &candidates.vertex_projected {
            if vp.total() < self.epsilon && scene.contains_vertex(vp.target) {
                // Extend the dangling edge to the projection point, then
                // jump to the target's open end. When the projection
                // collapses onto either endpoint the first leg vanishes and
                // the fix degenerates to a direct connection.
                let target_point = scene.point(vp.target)?;
                let via = if (vp.point - source_point).norm() < MERGE_TOLERANCE
                    || (vp.point - target_point).norm() < MERGE_TOLERANCE
                {
                    self.source
                } else {
                    let edge = scene.add_edge_between(&source_point, &vp.point)?;
                    scene
                        .edge(edge)?
                        .other_vertex(self.source)
                        .unwrap_or(self.source)
                };
                if via != vp.target {
                    let via_point = scene.point(via)?;
                    if (target_point - via_point).norm() < MERGE_TOLERANCE {
                        scene.merge_vertices(via, vp.target)?;
                    } else {
                        scene.add_edge(via, vp.target)?;
                    }
                }
                return Ok(Some(GapKind::VertexProjected));
            }
        }

        if let Some(ec) = &candidates.edge {
            if ec.distance < self.epsilon && scene.contains_edge(ec.edge) {
                let (a, b) = scene.edge_points(ec.edge)?;
                let edge_data = scene.edge(ec.edge)?;
                let (start, end) = (edge_data.start, edge_data.end);

                // A drop landing on an edge end needs no split.
                let anchor = if (ec.point - a).norm() < MERGE_TOLERANCE {
                    start
                } else if (ec.point - b).norm() < MERGE_TOLERANCE {
                    end
                } else {
                    scene.split_edge(ec.edge, &ec.point)?.vertex
                };

                if ec.distance < MERGE_TOLERANCE {
                    scene.merge_vertices(anchor, self.source)?;
                } else {
                    scene.add_edge(self.source, anchor)?;
                }
                return Ok(Some(GapKind::Edge));
            }
        }

        if let Some(vc) = &candidates.vertex {
            if vc.distance < self.epsilon && scene.contains_vertex(vc.target) {
                if vc.distance < MERGE_TOLERANCE {
                    scene.merge_vertices(vc.target, self.source)?;
                } else {
                    scene.add_edge(self.source, vc.target)?;
                }
                return Ok(Some(GapKind::Vertex));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::gaps::FindGapCandidates;
    use crate::topology::find_end_vertices;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn close(scene: &mut Scene, source: VertexId, epsilon: f64) -> Option<GapKind> {
        let edges = scene.edge_ids();
        let open = find_end_vertices(scene, &edges);
        let candidates = FindGapCandidates::new(source)
            .execute(scene, &open, &edges)
            .unwrap();
        CloseGap::new(source, epsilon)
            .execute(scene, &candidates)
            .unwrap()
    }

    #[test]
    fn perpendicular_gap_closes_via_projection_at_source() {
        let mut scene = Scene::new();
        let e1 = scene.add_edge_between(&p(0.0, 0.0), &p(10.0, 0.0)).unwrap();
        scene.add_edge_between(&p(10.0, 5.0), &p(20.0, 5.0)).unwrap();
        let source = scene.edge(e1).unwrap().end;

        // The target projects onto the source line at the source itself
        // (legs 0 + 5), so the projected fix degenerates to one new edge.
        let kind = close(&mut scene, source, 6.0);
        assert_eq!(kind, Some(GapKind::VertexProjected));
        assert_eq!(scene.edge_count(), 3);
        assert!(!scene.is_open_vertex(source));
    }

    #[test]
    fn vertex_fix_applied_when_it_is_the_only_candidate() {
        let mut scene = Scene::new();
        let e1 = scene.add_edge_between(&p(0.0, 0.0), &p(10.0, 0.0)).unwrap();
        let e2 = scene.add_edge_between(&p(12.0, 3.0), &p(20.0, 3.0)).unwrap();
        let source = scene.edge(e1).unwrap().end;
        let target = scene.edge(e2).unwrap().start;

        // The lower-priority kinds only act once the ranked ones are out
        // of range, so hand the resolver a vertex-only candidate set.
        let candidates = GapCandidates {
            vertex_projected: None,
            edge: None,
            vertex: Some(crate::operations::gaps::find::VertexCandidate {
                distance: 13.0_f64.sqrt(),
                target,
            }),
        };
        let kind = CloseGap::new(source, 4.0)
            .execute(&mut scene, &candidates)
            .unwrap();
        assert_eq!(kind, Some(GapKind::Vertex));
        assert!(scene.find_edge_between(source, target).is_some());
    }

    #[test]
    fn projected_fix_extends_then_connects() {
        let mut scene = Scene::new();
        let e1 = scene.add_edge_between(&p(0.0, 0.0), &p(10.0, 0.0)).unwrap();
        scene.add_edge_between(&p(13.0, 1.0), &p(20.0, 5.0)).unwrap();
        let source = scene.edge(e1).unwrap().end;

        let kind = close(&mut scene, source, 5.0);
        assert_eq!(kind, Some(GapKind::VertexProjected));
        // Two legs added: source → (13, 0) → (13, 1).
        assert_eq!(scene.edge_count(), 4);
        let via = scene.vertex_at(&p(13.0, 0.0)).unwrap();
        assert_eq!(scene.vertex(via).unwrap().edges.len(), 2);
    }

    #[test]
    fn edge_fix_splits_the_target() {
        let mut scene = Scene::new();
        // Vertical dangler dropping onto a long horizontal edge.
        let e1 = scene.add_edge_between(&p(5.0, 10.0), &p(5.0, 3.0)).unwrap();
        let long = scene.add_edge_between(&p(0.0, 0.0), &p(10.0, 0.0)).unwrap();
        let source = scene.edge(e1).unwrap().end;

        let kind = close(&mut scene, source, 4.0);
        assert_eq!(kind, Some(GapKind::Edge));
        assert!(!scene.contains_edge(long));
        // Two split halves plus the connecting edge plus the dangler.
        assert_eq!(scene.edge_count(), 4);
        let split_vertex = scene.vertex_at(&p(5.0, 0.0)).unwrap();
        assert_eq!(scene.vertex(split_vertex).unwrap().edges.len(), 3);
    }

    #[test]
    fn coincident_vertices_merge() {
        let mut scene = Scene::new();
        let e1 = scene.add_edge_between(&p(0.0, 0.0), &p(10.0, 0.0)).unwrap();
        let e2 = scene.add_edge_between(&p(15.0, 0.0), &p(20.0, 0.0)).unwrap();
        let source = scene.edge(e1).unwrap().end;
        let target = scene.edge(e2).unwrap().start;

        // Drag the second chain's end to within the host merge threshold
        // of the source; edge creation would have welded, a move does not.
        scene
            .transform_by_vectors(&[(target, crate::math::Vector3::new(-4.9995, 0.0, 0.0))])
            .unwrap();

        let kind = close(&mut scene, source, 1.0);
        assert!(kind.is_some());
        // No new edge: the two chains now share a vertex.
        assert_eq!(scene.edge_count(), 2);
        assert_eq!(scene.vertex_count(), 3);
        assert!(!scene.contains_vertex(target) || !scene.contains_vertex(source));
    }

    #[test]
    fn nothing_within_tolerance_is_recoverable() {
        let mut scene = Scene::new();
        let e1 = scene.add_edge_between(&p(0.0, 0.0), &p(10.0, 0.0)).unwrap();
        scene.add_edge_between(&p(30.0, 30.0), &p(40.0, 30.0)).unwrap();
        let source = scene.edge(e1).unwrap().end;

        let kind = close(&mut scene, source, 1.0);
        assert_eq!(kind, None);
        assert_eq!(scene.edge_count(), 2);
        assert_eq!(scene.vertex_count(), 4);
    }
}
