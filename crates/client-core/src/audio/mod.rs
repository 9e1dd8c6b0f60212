//! Hardware audio abstraction and routing
//!
//! This module owns the bridge between logical audio intents (speaker
//! on/off, muted, held) and the physical device selection. It is split
//! into the platform-agnostic hardware trait ([`device`]) and the routing
//! coordinator that sequences hardware operations for the call lifecycle
//! ([`routing`]).

pub mod device;
pub mod routing;

pub use device::{AudioHardware, AudioMode, OutputDeviceId, OutputDeviceInfo, OutputDeviceKind};
pub use routing::{AudioRoutingCoordinator, HardwareAudioIntent};

/// Default hardware stabilization delay applied after switching the
/// audio mode, before the initial routing is forced. Forcing device
/// selection immediately after a mode change is unreliable on some
/// hardware.
pub const DEFAULT_STABILIZATION_DELAY_MS: u64 = 300;
