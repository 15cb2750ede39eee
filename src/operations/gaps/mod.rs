//! Open-end resolution: finding candidate fixes for dangling edge ends,
//! applying one, and batch-closing everything within tolerance.

pub mod close;
pub mod close_all;
pub mod erase_stray;
pub mod find;

pub use close::CloseGap;
pub use close_all::{repair_curve_memberships, CloseAllGaps};
pub use erase_stray::EraseStrayCurves;
pub use find::{EdgeCandidate, FindGapCandidates, GapCandidates, ProjectedCandidate, VertexCandidate};

/// The three kinds of candidate gap fix, in fixed resolution priority.
///
/// The priority (projected > edge > vertex) is a heuristic, encoded once
/// in [`GapCandidates::best_within`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// Extend the source's edge line to its closest approach with another
    /// open vertex, then connect to that vertex.
    VertexProjected,
    /// Project the source vertex onto the nearest edge segment and split
    /// the edge there.
    Edge,
    /// Connect straight to the nearest other open vertex.
    Vertex,
}

impl GapKind {
    /// All kinds, in resolution priority order.
    pub const RANKED: [GapKind; 3] = [GapKind::VertexProjected, GapKind::Edge, GapKind::Vertex];

    /// How many open ends a successful fix of this kind consumes.
    ///
    /// Vertex-targeting fixes close both ends of the gap; an edge
    /// projection only closes the source end.
    #[must_use]
    pub fn ends_fixed(self) -> usize {
        match self {
            GapKind::VertexProjected | GapKind::Vertex => 2,
            GapKind::Edge => 1,
        }
    }
}
