use thiserror::Error;

/// Failures that leave nothing sensible to render.
///
/// Every other problem (bad timestamp, missing git, unknown width) is
/// absorbed by dropping the affected segment, so it never reaches this type.
#[derive(Error, Debug)]
pub enum StatuslineError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error("malformed input: top-level value is not an object")]
    NotAnObject,

    #[error("no snapshot on stdin")]
    EmptyInput,

    #[error("missing capability: {0}")]
    MissingCapability(String),
}
