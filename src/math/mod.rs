pub mod arc_3d;
pub mod intersect_3d;
pub mod project;
pub mod simplify;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// The host's vertex-welding threshold: two points closer than this are
/// the same vertex as far as the scene is concerned.
pub const MERGE_TOLERANCE: f64 = 1e-3;
