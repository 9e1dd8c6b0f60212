//! Audio Hardware Abstraction
//!
//! This module defines the core trait and types for hardware audio
//! control. It provides a platform-agnostic interface over the device's
//! audio stack: mode switching, output device enumeration and selection,
//! and microphone capture control. Platform crates (or test doubles)
//! implement [`AudioHardware`]; the routing coordinator is its only
//! caller within the SDK.

use crate::error::ClientResult;

/// System audio processing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    /// Regular media playback mode
    Normal,
    /// Voice-call optimized mode (echo cancellation, routing priority)
    Communication,
}

/// Classification of an output audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputDeviceKind {
    /// The handset earpiece
    Earpiece,
    /// The built-in loudspeaker
    Speaker,
    /// A bluetooth audio device
    Bluetooth,
    /// A wired headset
    Headset,
    /// Anything else the platform reports
    Other,
}

/// Opaque platform identifier for an output device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputDeviceId(pub String);

impl std::fmt::Display for OutputDeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Information about an enumerable output device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDeviceInfo {
    /// Platform identifier
    pub id: OutputDeviceId,
    /// Human-readable device name
    pub name: String,
    /// Device classification
    pub kind: OutputDeviceKind,
}

impl OutputDeviceInfo {
    /// Create a new output device description
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: OutputDeviceKind) -> Self {
        Self {
            id: OutputDeviceId(id.into()),
            name: name.into(),
            kind,
        }
    }
}

/// Hardware audio control trait
///
/// The interface the routing coordinator uses to drive the physical audio
/// stack. Implementations must be cheap and local: none of these
/// operations may block on network I/O.
#[async_trait::async_trait]
pub trait AudioHardware: Send + Sync + std::fmt::Debug {
    /// Switch the system audio processing mode.
    async fn set_mode(&self, mode: AudioMode);

    /// Enumerate the currently available output devices.
    async fn list_output_devices(&self) -> Vec<OutputDeviceInfo>;

    /// Force routing to the given output device, or clear the forced
    /// selection entirely when `device` is `None` (no active output path).
    async fn set_output_device(&self, device: Option<&OutputDeviceId>) -> ClientResult<()>;

    /// Enable or disable the microphone capture path.
    async fn set_microphone_muted(&self, muted: bool) -> ClientResult<()>;
}
