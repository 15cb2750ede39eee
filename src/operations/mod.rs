pub mod divide_face;
pub mod extend_arc;
pub mod gaps;
pub mod make_colinear;
pub mod simplify_curves;

pub use divide_face::{DivideFace, DivideMode};
pub use extend_arc::{ArcEnd, ExtendArc};
pub use gaps::{CloseAllGaps, CloseGap, EraseStrayCurves, FindGapCandidates, GapCandidates, GapKind};
pub use make_colinear::MakeColinear;
pub use simplify_curves::SimplifyCurves;
