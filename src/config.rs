/// Default gap tolerance, in model units (millimeters).
pub const DEFAULT_GAP_EPSILON: f64 = 10.0;

/// User-facing settings, passed explicitly into top-level operations.
///
/// The host persists these across sessions; this crate only reads and
/// updates the in-memory copy it is handed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Maximum distance within which a candidate gap fix is accepted.
    pub gap_epsilon: f64,
    /// Whether batch closing erases dangling edges shorter than the
    /// tolerance when no fix is found for them.
    pub remove_small_edges: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gap_epsilon: DEFAULT_GAP_EPSILON,
            remove_small_edges: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!((settings.gap_epsilon - 10.0).abs() < f64::EPSILON);
        assert!(settings.remove_small_edges);
    }
}
