//! Errors reported by the content-query collaborator.

use thiserror::Error;

/// Failure modes of a content store fetch.
///
/// Every variant except [`FetchError::MalformedPayload`] is an upstream
/// failure as far as the listing page is concerned.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be built or sent, or the body could not be read
    #[error("content store request failed: {0}")]
    Transport(String),

    /// The content store answered with a non-success HTTP status
    #[error("content store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The content store answered with a body that is not a query envelope
    #[error("content store sent an unreadable response: {0}")]
    InvalidResponse(String),

    /// The content store reported a query error in its response envelope
    #[error("content store query error: {message}")]
    Upstream { message: String },

    /// The response decoded, but `result` is not a list of startups
    #[error("unexpected payload shape: {0}")]
    MalformedPayload(String),
}

impl FetchError {
    /// Whether the failure came from the upstream side rather than the payload shape.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, FetchError::MalformedPayload(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}
