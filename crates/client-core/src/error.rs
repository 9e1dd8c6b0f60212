//! Error types for client call orchestration
//!
//! All fallible operations in this crate return [`ClientResult`]. The error
//! taxonomy mirrors the propagation policy of the SDK: session negotiation
//! and signaling failures surface to the host through the failure event
//! path, while hardware and teardown failures are recovered locally and
//! only logged.

use thiserror::Error;

/// Errors produced by the webphone client core
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The SDK was used before it was configured, or an operation was
    /// invoked from a state that cannot accept it (e.g. `make_call` while
    /// an attempt is already in flight).
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// What was misused and how
        message: String,
    },

    /// Session negotiation with the REST backend failed: transport error,
    /// non-200 response, or a malformed/incomplete session payload.
    #[error("Session negotiation failed: {reason}")]
    SessionError {
        /// Why the session could not be negotiated
        reason: String,
    },

    /// The signaling engine rejected or failed the account registration.
    #[error("Registration failed: {reason}")]
    RegistrationError {
        /// Engine-provided diagnostic message
        reason: String,
    },

    /// The outgoing call setup was rejected by the local engine or denied
    /// by the platform.
    #[error("Invite failed: {reason}")]
    InviteError {
        /// Engine-provided diagnostic message
        reason: String,
    },

    /// A requested audio device or routing operation was unavailable.
    /// Logged and recovered locally, never fatal to the call.
    #[error("Hardware audio error: {reason}")]
    HardwareError {
        /// Which device/operation was unavailable
        reason: String,
    },

    /// A failure during hang-up teardown. Logged and swallowed; the
    /// host-visible contract is that hang-up always succeeds.
    #[error("Teardown error: {reason}")]
    TeardownError {
        /// Which teardown step failed
        reason: String,
    },
}

impl ClientError {
    /// Coarse category name used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            ClientError::ConfigurationError { .. } => "configuration",
            ClientError::SessionError { .. } => "session",
            ClientError::RegistrationError { .. } => "registration",
            ClientError::InviteError { .. } => "invite",
            ClientError::HardwareError { .. } => "hardware",
            ClientError::TeardownError { .. } => "teardown",
        }
    }

    /// Whether the error is recovered locally (logged) rather than
    /// surfaced to the host through the failure event path.
    pub fn is_recovered_locally(&self) -> bool {
        matches!(
            self,
            ClientError::HardwareError { .. } | ClientError::TeardownError { .. }
        )
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;
