//! The seam between the dashboard core and whatever performs HTTP requests.

use std::future::Future;
use thiserror::Error;

/// Error type for a single data request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("Bad response status: {0}")]
    Status(u16),

    /// Request could not be sent or completed
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Fetches the body of a URL as text.
///
/// A single attempt is made per call; callers decide what a failure means.
pub trait Transport {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}
