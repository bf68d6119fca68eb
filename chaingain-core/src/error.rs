use thiserror::Error;

use crate::session::SessionError;
use crate::storage::StorageError;

/// Error outputs from `ChainGain`
#[derive(Debug, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum ChainGainError {
    /// The presented input is not valid for the requested operation
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// The attribute that was rejected.
        attribute: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Unexpected error serializing or parsing information
    #[error("serialization_error: {error}")]
    SerializationError {
        /// Details of the failure.
        error: String,
    },
    /// Network connection error with details
    #[error("network_error: {url} (status {status:?}): {error}")]
    NetworkError {
        /// The requested URL.
        url: String,
        /// The HTTP status, if a response was received.
        status: Option<u16>,
        /// Details of the failure.
        error: String,
    },
    /// The backend refused or failed to create an account
    #[error("account creation failed: {reason}")]
    ProvisioningFailed {
        /// Details of the failure.
        reason: String,
    },
    /// An operation needs a provisioned account but none is persisted yet
    #[error("account_not_ready")]
    AccountNotReady,
    /// The persistent store failed
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The session rejected the interaction
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<reqwest::Error> for ChainGainError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError {
            url: error
                .url()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string),
            status: error.status().map(|status| status.as_u16()),
            error: error.to_string(),
        }
    }
}
