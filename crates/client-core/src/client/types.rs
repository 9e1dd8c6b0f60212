//! Type definitions for the client orchestration layer
//!
//! Internal phase tracking, attempt tagging, and the parameter bundle for
//! placing a call.

use serde_json::{Map, Value};

/// Internal progress of the orchestrator through one call attempt
///
/// This is the orchestrator's own sequencing state; the host only ever
/// sees the unified [`CallState`](crate::call::CallState). `Idle` is both
/// the initial state and the state after every completed or failed
/// attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// No attempt in progress
    Idle,
    /// Session negotiation with the REST backend is outstanding
    CreatingSession,
    /// Credentials delegated to the engine, registration in flight
    Registering,
    /// Registration succeeded, invite sent
    Inviting,
    /// The remote party is being alerted
    Ringing,
    /// The call is established
    Connected,
    /// The call is held
    Held,
    /// Teardown in progress
    Terminating,
}

/// Monotonically increasing tag for one `make_call` attempt
///
/// Every suspension point compares the stored attempt against its own tag
/// before acting on a result, so callbacks of a superseded attempt are
/// ignored instead of racing the teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(pub u64);

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attempt-{}", self.0)
    }
}

/// Parameters for placing an outgoing call
///
/// All fields are optional; routing metadata ends up in the session
/// negotiation payload under the reserved `webphone-*` keys.
///
/// # Examples
///
/// ```rust
/// use webphone_client_core::client::types::MakeCallParams;
///
/// let params = MakeCallParams::new()
///     .with_destination_queue("sales")
///     .with_caller_phone_number("+3225551234")
///     .with_caller_full_name("Ada Lovelace");
///
/// assert_eq!(params.destination_queue.as_deref(), Some("sales"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MakeCallParams {
    /// Custom metadata associated with the session (`client-data`)
    pub client_data: Option<Map<String, Value>>,
    /// The queue name to route the call to
    pub destination_queue: Option<String>,
    /// The display number for the caller (ANI)
    pub caller_phone_number: Option<String>,
    /// The display name for the caller
    pub caller_full_name: Option<String>,
    /// Additional routing parameters for the proxy
    pub other_routing_data: Option<Map<String, Value>>,
    /// Whether to surface the call in the native dialer as well
    pub use_native_dialer: bool,
}

impl MakeCallParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach custom session metadata
    pub fn with_client_data(mut self, client_data: Map<String, Value>) -> Self {
        self.client_data = Some(client_data);
        self
    }

    /// Route the call to a specific queue
    pub fn with_destination_queue(mut self, queue: impl Into<String>) -> Self {
        self.destination_queue = Some(queue.into());
        self
    }

    /// Set the caller's display number
    pub fn with_caller_phone_number(mut self, number: impl Into<String>) -> Self {
        self.caller_phone_number = Some(number.into());
        self
    }

    /// Set the caller's display name
    pub fn with_caller_full_name(mut self, name: impl Into<String>) -> Self {
        self.caller_full_name = Some(name.into());
        self
    }

    /// Attach additional routing parameters
    pub fn with_other_routing_data(mut self, data: Map<String, Value>) -> Self {
        self.other_routing_data = Some(data);
        self
    }

    /// Also place the call through the native dialer
    pub fn with_native_dialer(mut self, use_native_dialer: bool) -> Self {
        self.use_native_dialer = use_native_dialer;
        self
    }
}
