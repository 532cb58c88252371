use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Batch must contain at least one essay")]
    EmptyBatch,

    #[error("Essay index {index} out of range for dataset of {len} essays")]
    EssayOutOfRange { index: usize, len: usize },

    #[error("Unknown {feature} label {token:?} in a frozen vocabulary")]
    UnknownLabel { feature: &'static str, token: String },

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
