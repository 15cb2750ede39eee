use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the scene.
    pub struct FaceId;
}

/// Data associated with a planar face.
///
/// Only what the face divider needs: the boundary edge loop. The support
/// plane is derived from the boundary geometry on demand.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// Boundary edges of the face.
    pub edges: Vec<EdgeId>,
}

impl FaceData {
    /// Creates a new face from its boundary edges.
    #[must_use]
    pub fn new(edges: Vec<EdgeId>) -> Self {
        Self { edges }
    }
}
