//! Engine-state to unified-state mapping
//!
//! Pure functions that collapse the signaling engine's per-call and
//! registration states onto the unified [`CallState`]. A return of `None`
//! means "no change": transitional engine states leave the current
//! unified state untouched instead of collapsing to `Disconnected`.
//!
//! Explicit engine errors (`EngineCallState::Error`, registration
//! `Failed`) do map to [`CallState::Failed`] here, but the orchestrator
//! additionally routes them through the failure event path so the host
//! receives the raw diagnostic message alongside the terminal state.

use crate::call::CallState;
use crate::engine::{EngineCallState, EngineRegistrationState};

/// Map a raw engine call state onto the unified state
pub fn map_call_state(state: EngineCallState) -> Option<CallState> {
    match state {
        EngineCallState::OutgoingInit | EngineCallState::OutgoingProgress => {
            Some(CallState::Dialing)
        }
        EngineCallState::OutgoingRinging | EngineCallState::IncomingReceived => {
            Some(CallState::Ringing)
        }
        EngineCallState::Connected | EngineCallState::StreamsRunning => {
            Some(CallState::Connected)
        }
        EngineCallState::Pausing
        | EngineCallState::Paused
        | EngineCallState::PausedByRemote => Some(CallState::Held),
        EngineCallState::End | EngineCallState::Released => Some(CallState::Disconnected),
        EngineCallState::Error => Some(CallState::Failed),
        // Transitional internal states: leave the unified state as-is.
        EngineCallState::Idle | EngineCallState::Resuming | EngineCallState::Updating => None,
    }
}

/// Map a raw engine registration state onto the unified state
pub fn map_registration_state(state: EngineRegistrationState) -> Option<CallState> {
    match state {
        EngineRegistrationState::Ok => Some(CallState::LoggedIn),
        EngineRegistrationState::Progress | EngineRegistrationState::Refreshing => {
            Some(CallState::LoginInProgress)
        }
        EngineRegistrationState::Cleared | EngineRegistrationState::None => {
            Some(CallState::LoggedOut)
        }
        EngineRegistrationState::Failed => Some(CallState::Failed),
    }
}
