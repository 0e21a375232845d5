//! Error types for voyager-client.

use thiserror::Error;

/// Errors that can occur when talking to the Voyager API.
#[derive(Debug, Error)]
pub enum VoyagerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The session cookie is no longer accepted; the platform redirected
    /// toward a login or checkpoint page.
    #[error("session expired: redirected to {redirect}")]
    SessionExpired { redirect: String },

    /// The handle does not correspond to any reachable profile.
    #[error("profile not found: {handle}")]
    ProfileNotFound { handle: String },

    /// Every resolution strategy was exhausted without an identifier.
    #[error("could not resolve an identifier for {handle}")]
    ResolutionFailed { handle: String },

    /// A read endpoint answered with a status the client cannot use.
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// A request exceeded the configured timeout.
    #[error("request timed out: {url}")]
    Timeout { url: String },
}
