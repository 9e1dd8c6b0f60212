//! Unified call state and dialpad types
//!
//! This module contains the host-facing call lifecycle types. The SDK
//! collapses the signaling engine's registration states and per-call
//! states into the single [`CallState`] enumeration so the host never
//! has to reason about two parallel state machines.
//!
//! # State Lifecycle
//!
//! Registration states (`LoginInProgress`, `LoggedIn`, `LoggedOut`) and
//! call states (`Dialing` through `Failed`) share one enumeration because
//! the host sees exactly one status at a time. `Disconnected` and `Failed`
//! are terminal for a call attempt; after reporting either, the
//! orchestrator resets to `LoggedOut` and accepts a new call.
//!
//! # Examples
//!
//! ```rust
//! use webphone_client_core::call::CallState;
//!
//! let state = CallState::Connected;
//! assert!(state.is_in_call());
//! assert!(!state.is_terminal());
//! println!("Current state: {}", state);
//! ```

use serde::{Deserialize, Serialize};

/// Unified high-level state of the SIP session and the active call
///
/// Drives host UI transitions between login, dialing, active, and idle
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallState {
    /// The SDK is authenticating with the SIP proxy
    LoginInProgress,
    /// The SDK has successfully authenticated with the SIP proxy
    LoggedIn,
    /// The SDK is not connected to the server or has been logged out
    LoggedOut,
    /// The outgoing call is being prepared or is waiting for the network
    Dialing,
    /// The remote party is being alerted
    Ringing,
    /// The call is active and media streams are established
    Connected,
    /// The call is on hold, locally or by the remote party
    Held,
    /// The call has ended and resources are being released
    Disconnected,
    /// The call failed due to a network error, server rejection, or timeout
    Failed,
}

impl CallState {
    /// Whether this state ends a call attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Disconnected | CallState::Failed)
    }

    /// Whether a call is currently established (including on hold)
    pub fn is_in_call(&self) -> bool {
        matches!(self, CallState::Connected | CallState::Held)
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallState::LoginInProgress => write!(f, "loginInProgress"),
            CallState::LoggedIn => write!(f, "loggedIn"),
            CallState::LoggedOut => write!(f, "loggedOut"),
            CallState::Dialing => write!(f, "dialing"),
            CallState::Ringing => write!(f, "ringing"),
            CallState::Connected => write!(f, "connected"),
            CallState::Held => write!(f, "held"),
            CallState::Disconnected => write!(f, "disconnected"),
            CallState::Failed => write!(f, "failed"),
        }
    }
}

/// A DTMF dialpad key
///
/// The twelve-key set a webphone keypad can send during an active call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DtmfDigit {
    /// Digit 0
    Zero,
    /// Digit 1
    One,
    /// Digit 2
    Two,
    /// Digit 3
    Three,
    /// Digit 4
    Four,
    /// Digit 5
    Five,
    /// Digit 6
    Six,
    /// Digit 7
    Seven,
    /// Digit 8
    Eight,
    /// Digit 9
    Nine,
    /// The star key
    Star,
    /// The pound key
    Pound,
}

impl DtmfDigit {
    /// The character sent on the wire for this key
    pub fn as_char(&self) -> char {
        match self {
            DtmfDigit::Zero => '0',
            DtmfDigit::One => '1',
            DtmfDigit::Two => '2',
            DtmfDigit::Three => '3',
            DtmfDigit::Four => '4',
            DtmfDigit::Five => '5',
            DtmfDigit::Six => '6',
            DtmfDigit::Seven => '7',
            DtmfDigit::Eight => '8',
            DtmfDigit::Nine => '9',
            DtmfDigit::Star => '*',
            DtmfDigit::Pound => '#',
        }
    }

    /// Parse a keypad character into a digit
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(DtmfDigit::Zero),
            '1' => Some(DtmfDigit::One),
            '2' => Some(DtmfDigit::Two),
            '3' => Some(DtmfDigit::Three),
            '4' => Some(DtmfDigit::Four),
            '5' => Some(DtmfDigit::Five),
            '6' => Some(DtmfDigit::Six),
            '7' => Some(DtmfDigit::Seven),
            '8' => Some(DtmfDigit::Eight),
            '9' => Some(DtmfDigit::Nine),
            '*' => Some(DtmfDigit::Star),
            '#' => Some(DtmfDigit::Pound),
            _ => None,
        }
    }
}

impl std::fmt::Display for DtmfDigit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
