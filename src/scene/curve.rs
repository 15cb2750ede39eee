use crate::math::arc_3d::ArcFrame;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a curve grouping in the scene.
    pub struct CurveId;
}

/// A curve grouping: an ordered run of connected edges.
///
/// The host treats grouped edges as one pickable entity; grouping also
/// blocks per-vertex repositioning, which is why the colinear fitter
/// explodes curves before moving anything.
#[derive(Debug, Clone)]
pub struct CurveData {
    /// Member edges, in path order.
    pub edges: Vec<EdgeId>,
    /// Arc metadata, present when the curve was built as a circular arc.
    pub arc: Option<ArcFrame>,
}

impl CurveData {
    /// Creates a new plain (non-arc) curve grouping.
    #[must_use]
    pub fn new(edges: Vec<EdgeId>) -> Self {
        Self { edges, arc: None }
    }
}
