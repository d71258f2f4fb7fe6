use thiserror::Error;

/// Top-level error type for the boxcut kernel.
#[derive(Debug, Error)]
pub enum BoxcutError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
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

    #[error("polygon needs at least {required} points, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    #[error("corner {index} is not eligible for a fillet")]
    IneligibleCorner { index: usize },
}

/// Errors related to the node tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("assembly not found")]
    AssemblyNotFound,

    #[error("void not found")]
    VoidNotFound,

    #[error("panel not found: {0}")]
    PanelNotFound(String),

    #[error("void is not a leaf")]
    NotALeaf,

    #[error("void is not subdivided")]
    NotSubdivided,

    #[error("no assembly has been created")]
    Empty,

    #[error("invalid tree: {0}")]
    Invalid(String),
}

/// Errors raised while validating an action payload.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("no preview is active")]
    NoPreview,

    #[error("edge {0} cannot be modified")]
    EdgeNotEditable(String),

    #[error("duplicate cutout id {0}")]
    DuplicateCutout(String),

    #[error("cutout {0} not found")]
    CutoutNotFound(String),
}

/// Convenience type alias for results using [`BoxcutError`].
pub type Result<T> = std::result::Result<T, BoxcutError>;

/// Shorthand for rejecting a malformed payload.
pub(crate) fn invalid(msg: impl Into<String>) -> BoxcutError {
    ActionError::InvalidPayload(msg.into()).into()
}
