//! Error type for backend operations

use thiserror::Error;

/// Error type for HTTP API operations
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure, no usable response
    #[error("network unavailable: {0}")]
    NetworkUnavailable(#[from] reqwest::Error),

    /// Non-2xx status, or a 2xx envelope with success=false
    #[error("server rejected request (status {status}): {message}")]
    ServerRejected { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
