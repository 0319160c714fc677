pub mod client;
pub mod stores;

pub use client::RemoteClient;

use thiserror::Error;

/// Failure of a remote call, split the way the UI reacts to it: transport
/// problems, rejections we can name, and everything else.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("account already registered")]
    DuplicateAccount,
    #[error("permission denied")]
    PermissionDenied,
    #[error("remote rejected request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Classify a rejection by matching substrings of the remote error
    /// message. Unmatched messages fall through to the generic variant.
    pub fn classify(status: u16, message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("invalid login credentials") {
            RemoteError::InvalidCredentials
        } else if lower.contains("already registered") || lower.contains("user already exists") {
            RemoteError::DuplicateAccount
        } else if lower.contains("permission denied") || lower.contains("row-level security") {
            RemoteError::PermissionDenied
        } else {
            RemoteError::Api { status, message }
        }
    }
}
