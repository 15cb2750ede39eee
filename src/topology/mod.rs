pub mod scanner;

pub use scanner::{find_curves, find_end_vertices, sort_vertices};
