use crate::math::Point3;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the scene.
    pub struct VertexId;
}

/// Data associated with a scene vertex.
///
/// The incident-edge list is maintained by the scene's mutation
/// primitives; a valid vertex always has at least one incident edge.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub point: Point3,
    /// Edges incident to this vertex.
    pub edges: Vec<EdgeId>,
}

impl VertexData {
    /// Creates a new vertex at the given point with no incident edges yet.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self {
            point,
            edges: Vec::new(),
        }
    }

    /// An open end: exactly one incident edge.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.edges.len() == 1
    }
}
