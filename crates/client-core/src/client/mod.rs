//! Client orchestration layer
//!
//! This module contains [`WebphoneClient`], the top-level call
//! orchestrator: it sequences session negotiation, signaling engine
//! registration and invite, hardware audio routing, and native telephony
//! interruptions into the single unified call lifecycle the host
//! application consumes.
//!
//! A client is an explicitly constructed, caller-owned instance built via
//! [`WebphoneClientBuilder`]; there is no process-wide singleton. Host
//! applications receive lifecycle updates as [`ClientEvent`] values on a
//! single-consumer queue obtained from [`WebphoneClient::take_events`].
//!
//! # Concurrency
//!
//! Every public operation and every engine/telephony callback may be
//! invoked concurrently. All of them serialize on one internal lock
//! around the unified state, and engine events are applied strictly in
//! arrival order by a dedicated event-loop task.

pub mod builder;
pub mod calls;
pub mod config;
pub mod events;
pub mod types;


pub use builder::WebphoneClientBuilder;
pub use config::ClientConfig;
pub use events::{ClientEvent, FailureInfo, StateChangeInfo};
pub use types::MakeCallParams;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::audio::routing::{AudioRoutingCoordinator, HardwareAudioIntent};
use crate::call::CallState;
use crate::engine::SignalingEngine;
use crate::error::ClientError;
use crate::interruption::{InterruptionMonitor, InterruptionState, TelephonySource};
use crate::network::{NativeDialer, NetworkLock};
use crate::session::{SessionCredentials, SessionNegotiator};

use self::types::{AttemptId, CallPhase};

/// Custom header carrying the negotiated session id on the outgoing invite
pub const SESSION_HEADER: &str = "X-Webphone-Session";

/// How far teardown involves the signaling engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineTeardown {
    /// Terminate calls, then clear credentials
    TerminateCalls,
    /// Clear credentials only; the call is already known to be over
    ClearOnly,
    /// Engine untouched: signaling never started for this attempt
    Skip,
}

pub(crate) struct OrchestratorState {
    pub(crate) phase: CallPhase,
    pub(crate) call_state: CallState,
    pub(crate) credentials: Option<SessionCredentials>,
    pub(crate) attempt: Option<AttemptId>,
}

impl OrchestratorState {
    fn new() -> Self {
        Self {
            phase: CallPhase::Idle,
            call_state: CallState::LoggedOut,
            credentials: None,
            attempt: None,
        }
    }
}

/// The call-session orchestrator
///
/// See the [module documentation](self) for the overall design. Construct
/// with [`WebphoneClientBuilder`]; all lifecycle operations live in
/// [`calls`](self::calls).
pub struct WebphoneClient {
    pub(crate) instance_id: Uuid,
    pub(crate) config: ClientConfig,
    pub(crate) negotiator: SessionNegotiator,
    pub(crate) engine: Arc<dyn SignalingEngine>,
    pub(crate) audio: AudioRoutingCoordinator,
    pub(crate) network_lock: Arc<dyn NetworkLock>,
    pub(crate) native_dialer: Option<Arc<dyn NativeDialer>>,
    pub(crate) monitor: InterruptionMonitor,
    pub(crate) state: Mutex<OrchestratorState>,
    pub(crate) event_tx: mpsc::UnboundedSender<ClientEvent>,
    pub(crate) event_rx: std::sync::Mutex<Option<mpsc::UnboundedReceiver<ClientEvent>>>,
    pub(crate) attempt_counter: AtomicU64,
}

impl std::fmt::Debug for WebphoneClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebphoneClient")
            .field("instance_id", &self.instance_id)
            .field("domain", &self.config.domain)
            .field("flow_id", &self.config.flow_id)
            .finish()
    }
}

impl WebphoneClient {
    /// Current unified call state
    pub async fn call_state(&self) -> CallState {
        self.state.lock().await.call_state
    }

    /// Snapshot of the logical hardware audio intent
    pub async fn audio_intent(&self) -> HardwareAudioIntent {
        self.audio.intent().await
    }

    /// Snapshot of the interruption monitor state
    pub async fn interruption_state(&self) -> InterruptionState {
        self.monitor.state().await
    }

    /// Take the single-consumer event queue.
    ///
    /// Returns `None` after the first call; there is exactly one consumer
    /// so event ordering is preserved end to end.
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<ClientEvent>> {
        self.event_rx.lock().expect("event receiver lock poisoned").take()
    }

    /// Start watching the native telephony stack through `source`.
    ///
    /// The source is obtained from the hosting foreground service;
    /// registration is deferred by the configured grace period.
    pub async fn start_interruption_monitoring(&self, source: Arc<dyn TelephonySource>) {
        self.monitor.start_monitoring(source).await;
    }

    /// Stop watching the native telephony stack.
    pub async fn stop_interruption_monitoring(&self) {
        self.monitor.stop_monitoring().await;
    }

    /// Toggle verbose signaling logging.
    pub async fn set_debug_mode(&self, enabled: bool) {
        self.engine.set_debug_mode(enabled).await;
    }

    // --- internal helpers ---

    pub(crate) fn next_attempt(&self) -> AttemptId {
        AttemptId(self.attempt_counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub(crate) fn emit(&self, event: ClientEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Event queue consumer dropped; event discarded");
        }
    }

    /// Apply a unified-state transition, emitting an event only when the
    /// state actually changes.
    pub(crate) fn transition(&self, state: &mut OrchestratorState, new_state: CallState) {
        if state.call_state == new_state {
            return;
        }
        let previous = state.call_state;
        state.call_state = new_state;
        info!(client = %self.instance_id, "State {} -> {}", previous, new_state);
        self.emit(ClientEvent::state_changed(Some(previous), new_state));
    }

    /// Report `LoggedOut` regardless of the current state. Hang-up always
    /// succeeds from the host's perspective, so the report is
    /// unconditional.
    pub(crate) fn report_logged_out(&self, state: &mut OrchestratorState) {
        let previous = state.call_state;
        state.call_state = CallState::LoggedOut;
        info!(client = %self.instance_id, "State {} -> {}", previous, CallState::LoggedOut);
        self.emit(ClientEvent::state_changed(Some(previous), CallState::LoggedOut));
    }

    /// Release every per-call resource, swallowing (and logging) each
    /// failure. `engine_teardown` selects how far the engine is involved:
    /// an attempt that failed before any signaling keeps the engine
    /// untouched.
    pub(crate) async fn teardown_quietly(
        &self,
        state: &mut OrchestratorState,
        engine_teardown: EngineTeardown,
    ) {
        if let Err(e) = self.network_lock.release().await {
            warn!("Teardown: releasing network lock failed: {}", e);
        }

        if engine_teardown != EngineTeardown::Skip {
            if engine_teardown == EngineTeardown::TerminateCalls {
                let result = if self.engine.has_active_call().await {
                    self.engine.terminate().await
                } else {
                    self.engine.terminate_all().await
                };
                if let Err(e) = result {
                    warn!("Teardown: terminating calls failed: {}", e);
                }
            }

            if let Err(e) = self.engine.clear_credentials().await {
                warn!("Teardown: clearing engine credentials failed: {}", e);
            }
        }

        self.audio.teardown().await;

        state.credentials = None;
    }

    /// Fail the current attempt: exactly one failure event with the
    /// diagnostic message, a transition to `Failed`, local teardown, and
    /// the automatic reset to `LoggedOut`/idle. No retry is attempted.
    pub(crate) async fn fail_attempt(&self, state: &mut OrchestratorState, cause: &ClientError) {
        error!(client = %self.instance_id, "Call attempt failed ({}): {}", cause.category(), cause);

        self.emit(ClientEvent::failed(cause.to_string()));
        self.transition(state, CallState::Failed);

        // Negotiation failures happen before any signaling: the engine
        // must stay untouched for those attempts.
        let engine_teardown = if state.phase == CallPhase::CreatingSession {
            EngineTeardown::Skip
        } else {
            EngineTeardown::TerminateCalls
        };
        self.teardown_quietly(state, engine_teardown).await;

        state.phase = CallPhase::Idle;
        state.attempt = None;
        self.transition(state, CallState::LoggedOut);
    }
}
