//! Event types and the engine event loop
//!
//! This module contains the tagged-variant event channel delivered to the
//! host and the bridge that applies signaling-engine and interruption
//! events to the orchestrator, strictly in arrival order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::call::CallState;
use crate::engine::{
    EngineCallState, EngineEvent, EngineEventReceiver, EngineRegistrationState, InviteRequest,
};
use crate::error::ClientError;
use crate::interruption::InterruptionSignal;
use crate::mapper;

use super::types::CallPhase;
use super::{WebphoneClient, SESSION_HEADER};

/// Details of a unified-state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChangeInfo {
    /// State before the transition, if known
    pub previous_state: Option<CallState>,
    /// State after the transition
    pub new_state: CallState,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Details of a surfaced failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInfo {
    /// Human-readable diagnostic, suitable for display and logs
    pub message: String,
    /// When the failure was reported
    pub timestamp: DateTime<Utc>,
}

/// Event delivered to the host application
///
/// Events arrive on the single-consumer queue returned by
/// [`WebphoneClient::take_events`], in the order the orchestrator applied
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The unified call state changed
    StateChanged {
        /// Transition details
        info: StateChangeInfo,
    },
    /// A call attempt failed; a transition to `Failed` follows
    Failed {
        /// Failure details
        info: FailureInfo,
    },
}

impl ClientEvent {
    pub(crate) fn state_changed(previous: Option<CallState>, new_state: CallState) -> Self {
        ClientEvent::StateChanged {
            info: StateChangeInfo {
                previous_state: previous,
                new_state,
                timestamp: Utc::now(),
            },
        }
    }

    pub(crate) fn failed(message: String) -> Self {
        ClientEvent::Failed {
            info: FailureInfo {
                message,
                timestamp: Utc::now(),
            },
        }
    }
}

/// Drive engine and interruption events into the orchestrator.
///
/// Runs until the engine event channel closes. Events are applied one at
/// a time, preserving arrival order across both sources.
pub(crate) fn spawn_event_loop(
    client: Arc<WebphoneClient>,
    mut engine_rx: EngineEventReceiver,
    mut signal_rx: mpsc::UnboundedReceiver<InterruptionSignal>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut signals_open = true;
        loop {
            tokio::select! {
                event = engine_rx.recv() => match event {
                    Some(event) => client.handle_engine_event(event).await,
                    None => break,
                },
                signal = signal_rx.recv(), if signals_open => match signal {
                    Some(signal) => client.handle_interruption(signal).await,
                    None => signals_open = false,
                },
            }
        }
        debug!("Engine event channel closed; event loop stopped");
    })
}

impl WebphoneClient {
    /// Apply one signaling engine event.
    pub(crate) async fn handle_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Registration { state, message } => {
                self.on_registration_event(state, message).await
            }
            EngineEvent::CallState { state, message } => {
                self.on_call_event(state, message).await
            }
        }
    }

    async fn on_registration_event(&self, state: EngineRegistrationState, message: String) {
        let mut guard = self.state.lock().await;

        match state {
            EngineRegistrationState::Ok => {
                // Owner withdrawal check: a registration success that
                // arrives after a hang-up (or for a superseded attempt)
                // must not produce an invite.
                if guard.phase != CallPhase::Registering {
                    debug!("Ignoring registration success in phase {:?}", guard.phase);
                    return;
                }
                let credentials = match guard.credentials.clone() {
                    Some(credentials) => credentials,
                    None => {
                        let err = ClientError::InviteError {
                            reason: "registration succeeded without session credentials".into(),
                        };
                        self.fail_attempt(&mut guard, &err).await;
                        return;
                    }
                };

                self.transition(&mut guard, CallState::LoggedIn);
                guard.phase = CallPhase::Inviting;
                info!(
                    "Registered; inviting {} for session {}",
                    credentials.destination, credentials.session_id
                );

                let invite = InviteRequest {
                    destination_uri: format!(
                        "sip:{}@{}",
                        credentials.destination, credentials.server_domain
                    ),
                    headers: vec![(SESSION_HEADER.to_string(), credentials.session_id.clone())],
                };
                if let Err(e) = self.engine.invite(invite).await {
                    let err = ClientError::InviteError { reason: e.to_string() };
                    self.fail_attempt(&mut guard, &err).await;
                }
            }
            EngineRegistrationState::Failed => {
                if guard.phase == CallPhase::Idle {
                    debug!("Ignoring stale registration failure");
                    return;
                }
                let err = ClientError::RegistrationError { reason: message };
                self.fail_attempt(&mut guard, &err).await;
            }
            other => {
                if guard.phase == CallPhase::Idle {
                    return;
                }
                if let Some(new_state) = mapper::map_registration_state(other) {
                    self.transition(&mut guard, new_state);
                }
            }
        }
    }

    async fn on_call_event(&self, state: EngineCallState, message: String) {
        let mut guard = self.state.lock().await;

        if guard.phase == CallPhase::Idle {
            debug!("Ignoring call event {:?} with no attempt in progress", state);
            return;
        }

        // Explicit engine errors carry their diagnostic through the
        // failure path, in addition to the terminal state.
        if state == EngineCallState::Error {
            let err = ClientError::InviteError { reason: message };
            self.fail_attempt(&mut guard, &err).await;
            return;
        }

        let Some(new_state) = mapper::map_call_state(state) else {
            return;
        };

        match new_state {
            CallState::Disconnected => {
                self.transition(&mut guard, CallState::Disconnected);
                self.teardown_quietly(&mut guard, super::EngineTeardown::ClearOnly)
                    .await;
                guard.phase = CallPhase::Idle;
                guard.attempt = None;
                self.transition(&mut guard, CallState::LoggedOut);
            }
            other => {
                if let Some(phase) = phase_for(other) {
                    guard.phase = phase;
                }
                self.transition(&mut guard, other);
            }
        }
    }

    /// React to a native telephony interruption.
    pub(crate) async fn handle_interruption(&self, signal: InterruptionSignal) {
        match signal {
            InterruptionSignal::NativeOffHook => {
                warn!("Native call interruption; hanging up the VoIP session");
                if let Err(e) = self.hang_up().await {
                    warn!("Interruption hang-up failed: {}", e);
                }
            }
        }
    }
}

/// Orchestrator phase corresponding to a unified in-call state
fn phase_for(state: CallState) -> Option<CallPhase> {
    match state {
        CallState::Dialing => Some(CallPhase::Inviting),
        CallState::Ringing => Some(CallPhase::Ringing),
        CallState::Connected => Some(CallPhase::Connected),
        CallState::Held => Some(CallPhase::Held),
        _ => None,
    }
}
