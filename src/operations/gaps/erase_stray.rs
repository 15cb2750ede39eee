use tracing::info;

use crate::error::{OperationError, Result};
use crate::scene::Scene;
use crate::topology::{find_curves, sort_vertices};

/// Erases every curve that dangles: a chain whose sorted vertex walk
/// starts or ends at an open vertex. Closed loops are never stray.
pub struct EraseStrayCurves;

impl EraseStrayCurves {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the sweep, returning `(curves erased, edges erased)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene has no edges, or an erase is
    /// rejected mid-sweep (the boundary is aborted first).
    pub fn execute(&self, scene: &mut Scene) -> Result<(usize, usize)> {
        let edges = scene.edge_ids();
        if edges.is_empty() {
            return Err(OperationError::EmptySelection.into());
        }

        let stray: Vec<Vec<_>> = find_curves(scene, &edges)
            .into_iter()
            .filter(|chain| {
                let order = sort_vertices(scene, chain);
                let ends = [order.first(), order.last()];
                let has_open_end = ends
                    .into_iter()
                    .flatten()
                    .any(|&v| scene.is_open_vertex(v));
                has_open_end
            })
            .collect();
        if stray.is_empty() {
            return Ok((0, 0));
        }

        scene.begin_operation("Erase Stray Curves")?;
        let before = scene.edge_count();
        for chain in &stray {
            scene.erase_edges(chain);
        }
        let edges_erased = before - scene.edge_count();
        scene.commit_operation()?;

        info!(
            curves = stray.len(),
            edges = edges_erased,
            "stray curves erased"
        );
        Ok((stray.len(), edges_erased))
    }
}

impl Default for EraseStrayCurves {
    fn default() -> Self {
        Self::new()
    }
}
