//! Response envelope shared by both backends

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// Wrapper carried by every backend response: a success flag plus an
/// optional payload and message. A false flag is a domain-level failure
/// even when the HTTP status is 200.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload of a successful envelope
    pub fn into_data(self, status: u16) -> ApiResult<T> {
        if !self.success {
            return Err(ApiError::ServerRejected {
                status,
                message: self
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            });
        }
        self.data
            .ok_or_else(|| ApiError::InvalidResponse("missing data in successful envelope".into()))
    }

    /// Like [`into_data`](Self::into_data) for endpoints that acknowledge
    /// without a payload.
    pub fn into_ack(self, status: u16) -> ApiResult<()> {
        if !self.success {
            return Err(ApiError::ServerRejected {
                status,
                message: self
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            });
        }
        Ok(())
    }
}
