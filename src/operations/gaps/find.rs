use crate::error::{OperationError, Result};
use crate::math::project::{project_to_line, project_to_segment};
use crate::math::Point3;
use crate::scene::{EdgeId, Scene, VertexId};

use super::GapKind;

/// The best "extend then connect" fix: project another open vertex onto
/// the source edge's infinite line, jump there, then over to the vertex.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedCandidate {
    /// `(source → projection, projection → target)` distances; ranked by
    /// their sum.
    pub distances: (f64, f64),
    /// The projection point on the source edge's line.
    pub point: Point3,
    /// The open vertex reached from the projection point.
    pub target: VertexId,
}

impl ProjectedCandidate {
    /// The summed two-leg distance.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.distances.0 + self.distances.1
    }
}

/// The closest perpendicular drop onto a nearby edge segment.
#[derive(Debug, Clone, Copy)]
pub struct EdgeCandidate {
    pub distance: f64,
    /// Closest point on the segment (clamped, not the infinite line).
    pub point: Point3,
    pub edge: EdgeId,
}

/// The closest other open vertex by straight-line distance.
#[derive(Debug, Clone, Copy)]
pub struct VertexCandidate {
    pub distance: f64,
    pub target: VertexId,
}

/// All three candidate fixes for one open vertex.
///
/// Every search runs even when an earlier one finds an exact hit, so the
/// interactive tool can always rank and draw all three.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapCandidates {
    pub vertex_projected: Option<ProjectedCandidate>,
    pub edge: Option<EdgeCandidate>,
    pub vertex: Option<VertexCandidate>,
}

impl GapCandidates {
    /// Total distance of the candidate of the given kind, if present.
    #[must_use]
    pub fn distance(&self, kind: GapKind) -> Option<f64> {
        match kind {
            GapKind::VertexProjected => self.vertex_projected.as_ref().map(ProjectedCandidate::total),
            GapKind::Edge => self.edge.as_ref().map(|c| c.distance),
            GapKind::Vertex => self.vertex.as_ref().map(|c| c.distance),
        }
    }

    /// The highest-priority kind whose distance is under `epsilon`.
    ///
    /// This is the single place the projected > edge > vertex ranking
    /// lives.
    #[must_use]
    pub fn best_within(&self, epsilon: f64) -> Option<GapKind> {
        GapKind::RANKED
            .into_iter()
            .find(|&kind| self.distance(kind).is_some_and(|d| d < epsilon))
    }
}

/// Searches the open-vertex and edge population for the three candidate
/// fixes for one open source vertex.
///
/// Pure read; all three searches are linear scans (the working sets of an
/// interactive session are tens to low hundreds of elements) and
/// deterministic: ties keep the first minimum in input order.
pub struct FindGapCandidates {
    source: VertexId,
}

impl FindGapCandidates {
    /// Creates a new candidate search for the given open vertex.
    #[must_use]
    pub fn new(source: VertexId) -> Self {
        Self { source }
    }

    /// Executes the search.
    ///
    /// # Errors
    ///
    /// Returns an error if the source vertex is missing or has no
    /// incident edge to define a projection line.
    pub fn execute(
        &self,
        scene: &Scene,
        open_vertices: &[VertexId],
        edge_pool: &[EdgeId],
    ) -> Result<GapCandidates> {
        let source_point = scene.point(self.source)?;
        let source_edge = *scene
            .vertex(self.source)?
            .edges
            .first()
            .ok_or_else(|| OperationError::InvalidInput("source vertex has no edge".into()))?;
        let other_end = scene
            .edge(source_edge)?
            .other_vertex(self.source)
            .ok_or_else(|| OperationError::InvalidInput("source edge is inconsistent".into()))?;
        // Line of the source's dangling edge, oriented outward.
        let line_dir = source_point - scene.point(other_end)?;

        let mut result = GapCandidates::default();

        for &target in open_vertices {
            if target == self.source || !scene.contains_vertex(target) {
                continue;
            }
            // A vertex we are already connected to is not a gap.
            if scene.find_edge_between(self.source, target).is_some() {
                continue;
            }
            let target_point = scene.point(target)?;

            let projection = project_to_line(&target_point, &source_point, &line_dir);
            let leg_a = (projection - source_point).norm();
            let leg_b = (target_point - projection).norm();
            let better = result
                .vertex_projected
                .as_ref()
                .is_none_or(|best| leg_a + leg_b < best.total());
            if better {
                result.vertex_projected = Some(ProjectedCandidate {
                    distances: (leg_a, leg_b),
                    point: projection,
                    target,
                });
            }

            let direct = (target_point - source_point).norm();
            if result
                .vertex
                .as_ref()
                .is_none_or(|best| direct < best.distance)
            {
                result.vertex = Some(VertexCandidate {
                    distance: direct,
                    target,
                });
            }
        }

        for &edge in edge_pool {
            if !scene.contains_edge(edge) || scene.edge(edge)?.has_vertex(self.source) {
                continue;
            }
            let (a, b) = scene.edge_points(edge)?;
            let point = project_to_segment(&source_point, &a, &b);
            let distance = (point - source_point).norm();
            if result
                .edge
                .as_ref()
                .is_none_or(|best| distance < best.distance)
            {
                result.edge = Some(EdgeCandidate {
                    distance,
                    point,
                    edge,
                });
            }
        }

        Ok(result)
    }
}
