use thiserror::Error;

/// Top-level error type for the edgekit toolset.
#[derive(Debug, Error)]
pub enum EdgekitError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to scene topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to editing operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("selection contains no edges")]
    EmptySelection,

    #[error("no connected curves found in the selection")]
    NoCurvesFound,

    #[error("scene rejected the mutation: {0}")]
    MutationRejected(String),

    #[error("an operation boundary is already open")]
    BoundaryAlreadyOpen,

    #[error("no operation boundary is open")]
    NoOpenBoundary,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`EdgekitError`].
pub type Result<T> = std::result::Result<T, EdgekitError>;
