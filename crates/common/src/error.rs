use thiserror::Error;

use crate::lead::Violation;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Share out of range: {0} (expected {min}..={max})", min = crate::capacity::MIN_SHARE, max = crate::capacity::MAX_SHARE)]
    ShareOutOfRange(f64),

    #[error("Invalid submission: {}", .0.first().map(ToString::to_string).unwrap_or_default())]
    InvalidSubmission(Vec<Violation>),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
