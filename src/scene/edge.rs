use super::curve::CurveId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the scene.
    pub struct EdgeId;
}

/// Data associated with a scene edge.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
    /// The curve grouping this edge belongs to, if any.
    pub curve: Option<CurveId>,
    /// Material name, if assigned.
    pub material: Option<String>,
    /// Layer name, if assigned.
    pub layer: Option<String>,
}

impl EdgeData {
    /// Creates a new ungrouped edge with no metadata.
    #[must_use]
    pub fn new(start: VertexId, end: VertexId) -> Self {
        Self {
            start,
            end,
            curve: None,
            material: None,
            layer: None,
        }
    }

    /// Whether the edge is incident to the given vertex.
    #[must_use]
    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.start == vertex || self.end == vertex
    }

    /// The endpoint opposite `vertex`, or `None` if `vertex` is not an
    /// endpoint of this edge.
    #[must_use]
    pub fn other_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        if self.start == vertex {
            Some(self.end)
        } else if self.end == vertex {
            Some(self.start)
        } else {
            None
        }
    }
}
