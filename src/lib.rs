pub mod config;
pub mod error;
pub mod math;
pub mod operations;
pub mod scene;
pub mod session;
pub mod topology;

pub use config::Settings;
pub use error::{EdgekitError, Result};
