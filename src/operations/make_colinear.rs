use tracing::info;

use crate::error::{OperationError, Result};
use crate::math::project::{closest_points_between_lines, project_to_line};
use crate::math::{Vector3, TOLERANCE};
use crate::scene::{EdgeId, Scene};
use crate::topology::{find_curves, find_end_vertices, sort_vertices};

/// Straightens each selected curve by moving its interior vertices onto
/// the guide line through the curve's first and last vertex.
///
/// With a restrict vector set, an interior vertex instead lands on the
/// guide-line point nearest the line through its current position
/// parallel to that vector; when the two lines are parallel the vertex
/// stays put.
pub struct MakeColinear {
    restrict: Option<Vector3>,
}

impl MakeColinear {
    #[must_use]
    pub fn new(restrict: Option<Vector3>) -> Self {
        Self { restrict }
    }

    /// Executes the fit, returning the number of vertices moved.
    ///
    /// Grouping is detached from every selected edge first; it would
    /// otherwise block repositioning. All moves within one curve are
    /// computed from original positions, then applied as one batched
    /// transform. Closed loops and two-vertex chains are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is empty or a mutation is
    /// rejected (the boundary is aborted first).
    pub fn execute(&self, scene: &mut Scene, selection: &[EdgeId]) -> Result<usize> {
        if selection.is_empty() {
            return Err(OperationError::EmptySelection.into());
        }

        scene.begin_operation("Make Colinear")?;
        let moved = match self.run(scene, selection) {
            Ok(moved) => moved,
            Err(err) => {
                scene.abort_operation()?;
                return Err(err);
            }
        };
        scene.commit_operation()?;

        info!(vertices_moved = moved, "colinear fit finished");
        Ok(moved)
    }

    fn run(&self, scene: &mut Scene, selection: &[EdgeId]) -> Result<usize> {
        let mut moved = 0;
        for chain in find_curves(scene, selection) {
            for &edge in &chain {
                scene.detach_from_curve(edge)?;
            }

            let order = sort_vertices(scene, &chain);
            let Some((&first, &last)) = order.first().zip(order.last()) else {
                continue;
            };
            if first == last || order.len() < 3 {
                continue;
            }
            // A loop has no ends to define a guide line.
            if find_end_vertices(scene, &chain).is_empty() {
                continue;
            }
            let origin = scene.point(first)?;
            let guide = scene.point(last)? - origin;
            if guide.norm() < TOLERANCE {
                continue;
            }

            let mut displacements = Vec::new();
            for &vertex in &order[1..order.len() - 1] {
                let position = scene.point(vertex)?;
                let fitted = match self.restrict {
                    None => project_to_line(&position, &origin, &guide),
                    Some(restrict) => {
                        match closest_points_between_lines(&origin, &guide, &position, &restrict)
                        {
                            Some((on_guide, _)) => on_guide,
                            None => continue,
                        }
                    }
                };
                let displacement = fitted - position;
                if displacement.norm() > TOLERANCE {
                    displacements.push((vertex, displacement));
                }
            }
            if !displacements.is_empty() {
                scene.transform_by_vectors(&displacements)?;
                moved += displacements.len();
            }
        }
        Ok(moved)
    }
}
