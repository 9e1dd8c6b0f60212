//! Signaling engine abstraction
//!
//! This module defines the seam between the orchestrator and the external
//! SIP signaling engine (message exchange, media negotiation, encryption).
//! The engine is a collaborator, not part of this crate: the orchestrator
//! drives it through [`SignalingEngine`] and consumes its callbacks as
//! [`EngineEvent`] values on an ordinary channel, so every engine
//! implementation (and every test double) delivers events the same way.

use tokio::sync::mpsc;

use crate::call::DtmfDigit;
use crate::error::ClientResult;

/// Per-call signaling states reported by the engine
///
/// These are the raw states of an individual call as the SIP stack sees
/// them; the mapper module collapses them onto the unified
/// [`CallState`](crate::call::CallState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineCallState {
    /// No call activity
    Idle,
    /// Outgoing call object created
    OutgoingInit,
    /// Outgoing call is being routed
    OutgoingProgress,
    /// Remote party is being alerted
    OutgoingRinging,
    /// An incoming invite was received
    IncomingReceived,
    /// The call was answered
    Connected,
    /// Media streams are flowing
    StreamsRunning,
    /// A pause (hold) request is in flight
    Pausing,
    /// The call is paused locally
    Paused,
    /// The remote party paused the call
    PausedByRemote,
    /// A resume request is in flight
    Resuming,
    /// Call parameters are being renegotiated
    Updating,
    /// The call has ended
    End,
    /// Call resources have been released
    Released,
    /// The call failed
    Error,
}

/// Account registration states reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineRegistrationState {
    /// No registration has been attempted
    None,
    /// A REGISTER request is in flight
    Progress,
    /// An existing registration is being refreshed
    Refreshing,
    /// The account is registered with the proxy
    Ok,
    /// The registration was removed
    Cleared,
    /// The registration was rejected or timed out
    Failed,
}

/// Event delivered by the signaling engine
///
/// Each event carries the engine's human-readable message so failures can
/// be reported to the host verbatim.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// An individual call changed state
    CallState {
        /// The new raw call state
        state: EngineCallState,
        /// Engine-provided diagnostic message
        message: String,
    },
    /// The account registration changed state
    Registration {
        /// The new raw registration state
        state: EngineRegistrationState,
        /// Engine-provided diagnostic message
        message: String,
    },
}

/// Sender half of the engine event channel
pub type EngineEventSender = mpsc::UnboundedSender<EngineEvent>;
/// Receiver half of the engine event channel, handed to the client at build time
pub type EngineEventReceiver = mpsc::UnboundedReceiver<EngineEvent>;

/// Create the channel pair an engine uses to deliver its events
pub fn engine_event_channel() -> (EngineEventSender, EngineEventReceiver) {
    mpsc::unbounded_channel()
}

/// Parameters for registering the ephemeral session account with the proxy
///
/// Built from negotiated [`SessionCredentials`](crate::session::SessionCredentials);
/// the identity rides the session id so the proxy can correlate the
/// registration with the negotiated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Identity URI, e.g. `sip:{session_id}@{server}`
    pub identity_uri: String,
    /// Proxy address, e.g. `sips:{server}`
    pub server_uri: String,
    /// Proxy port
    pub server_port: u16,
    /// Digest auth username
    pub username: String,
    /// Digest auth password
    pub password: String,
}

/// Parameters for the outgoing invite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRequest {
    /// Remote address, e.g. `sip:{destination}@{server}`
    pub destination_uri: String,
    /// Custom headers attached to the INVITE, name/value pairs
    pub headers: Vec<(String, String)>,
}

/// Interface the orchestrator uses to drive the external SIP engine
///
/// Implementations wrap a concrete SIP stack. All methods are expected to
/// be non-blocking with respect to network round-trips: they enqueue work
/// and report progress through the event channel.
#[async_trait::async_trait]
pub trait SignalingEngine: Send + Sync + std::fmt::Debug {
    /// Configure the ephemeral account and start registration.
    ///
    /// Registration progress and outcome arrive as
    /// [`EngineEvent::Registration`] events.
    async fn register(&self, request: RegistrationRequest) -> ClientResult<()>;

    /// Send the outgoing invite on the already-registered account.
    async fn invite(&self, request: InviteRequest) -> ClientResult<()>;

    /// Send the pause (hold) re-INVITE for the active call.
    async fn pause(&self) -> ClientResult<()>;

    /// Send the resume re-INVITE for the active call.
    async fn resume(&self) -> ClientResult<()>;

    /// Whether the engine currently tracks an active call.
    async fn has_active_call(&self) -> bool;

    /// Terminate the active call.
    async fn terminate(&self) -> ClientResult<()>;

    /// Terminate every call the engine knows about.
    async fn terminate_all(&self) -> ClientResult<()>;

    /// Drop the configured account and all cached auth data.
    async fn clear_credentials(&self) -> ClientResult<()>;

    /// Send a DTMF tone on the active call.
    async fn send_dtmf(&self, digit: DtmfDigit) -> ClientResult<()>;

    /// Mute or unmute the engine's capture path for the active call.
    async fn set_microphone_muted(&self, muted: bool) -> ClientResult<()>;

    /// Tell the engine whether the network is usable.
    async fn set_network_reachable(&self, reachable: bool);

    /// Toggle verbose engine logging.
    async fn set_debug_mode(&self, enabled: bool);
}
