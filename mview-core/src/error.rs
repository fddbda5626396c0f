/// Error types for asset loading, parameter input and rendering
use crate::params::Parameter;

/// Errors produced while decoding STL data
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StlError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooShort(usize),

    #[error("unexpected end of file: header declares {declared} triangles, data holds {available}")]
    Truncated { declared: usize, available: usize },

    #[error("malformed ASCII STL: {0}")]
    Ascii(String),
}

/// Failure signal delivered to asset load completions
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to fetch {asset}: {reason}")]
    Fetch { asset: String, reason: String },

    #[error("failed to read {asset}: {error}")]
    Io {
        asset: String,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to decode STL mesh: {0}")]
    Stl(#[from] StlError),

    #[error("failed to decode HDR environment map: {0}")]
    Hdr(String),
}

/// Rejected UI input; the bound field is left untouched
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("{param}: {raw:?} is not a number")]
    NotANumber { param: Parameter, raw: String },

    #[error("{param}: {raw:?} is not a finite value")]
    NotFinite { param: Parameter, raw: String },

    #[error("{param}: {raw:?} is not a color, expected #rrggbb or #rgb")]
    InvalidColor { param: Parameter, raw: String },

    #[error("{param}: {raw:?} is not a boolean")]
    InvalidFlag { param: Parameter, raw: String },

    #[error("{param} does not accept this kind of value")]
    WrongKind { param: Parameter },

    #[error("unknown parameter {0:?}")]
    UnknownParameter(String),
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("environment map is {width}x{height} but holds {len} pixels")]
    InvalidTexture { width: u32, height: u32, len: usize },

    #[error("failed to present frame: {0}")]
    Present(String),
}

/// Top-level error for viewer operations
#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Param(#[from] ParamError),
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
