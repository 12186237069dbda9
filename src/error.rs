use thiserror::Error;

/// Top-level error type for the sewkit pattern kernel.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("pattern serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("ruffle ratio must be positive, got {0}")]
    InvalidRuffle(f64),
}

/// Errors related to the connectivity of edges, sequences and panels.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("edges are not continuous: ({x0}, {y0}) does not meet ({x1}, {y1})")]
    Discontinuous { x0: f64, y0: f64, x1: f64, y1: f64 },

    #[error("edge not found in sequence")]
    EdgeNotFound,

    #[error("edge index {index} is out of bounds for a sequence of {len} edges")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("sequence is empty")]
    EmptySequence,

    #[error("edge loop of panel '{0}' is not closed")]
    LoopNotClosed(String),

    #[error("edge loop of panel '{0}' intersects itself")]
    SelfIntersecting(String),

    #[error("panel not found in store")]
    PanelNotFound,

    #[error("interface '{0}' not found")]
    InterfaceNotFound(String),
}

/// Errors raised while resolving stitching rules into stitch records.
#[derive(Debug, Error)]
pub enum StitchError {
    #[error("cannot pair {left_count} edge(s) of '{left}' with {right_count} edge(s) of '{right}'")]
    CountMismatch {
        left: String,
        right: String,
        left_count: usize,
        right_count: usize,
    },

    #[error(
        "ruffle-adjusted lengths of '{left}' ({left_length}) and '{right}' ({right_length}) do not match"
    )]
    LengthMismatch {
        left: String,
        right: String,
        left_length: f64,
        right_length: f64,
    },

    #[error("interface edge is not part of the edge loop of panel '{0}'")]
    EdgeNotInPanel(String),

    #[error("stitching rule has an empty interface")]
    EmptyInterface,

    #[error("stitch references panel '{0}' which is not part of the assembled pattern")]
    PanelNotInPattern(String),
}

/// Errors related to merging assembled sub-patterns.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("duplicate panel name '{0}' in assembled pattern")]
    DuplicatePanelName(String),
}

/// Errors related to design / body parameter lookup.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("missing parameter '{0}'")]
    Missing(String),

    #[error("parameter '{key}' is not a {expected}")]
    WrongType { key: String, expected: &'static str },
}

/// Convenience type alias for results using [`PatternError`].
pub type Result<T> = std::result::Result<T, PatternError>;
