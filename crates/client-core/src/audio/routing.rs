//! Audio routing coordination
//!
//! The [`AudioRoutingCoordinator`] is the sole writer of physical output
//! device selection. It sequences hardware operations for the call
//! lifecycle: arming the audio path for a call, speaker toggling,
//! microphone mute, the hard-hold detach/reattach pair, and the
//! end-of-call teardown. The orchestrator never touches the hardware
//! trait directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::audio::device::{
    AudioHardware, AudioMode, OutputDeviceId, OutputDeviceKind,
};
use crate::error::{ClientError, ClientResult};

/// The logical desired audio state for the current call
///
/// Written only by the orchestrator (through the coordinator's
/// operations); consumers may read a snapshot at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HardwareAudioIntent {
    /// Whether the loudspeaker is the requested output
    pub speaker_enabled: bool,
    /// Whether the microphone capture path is disabled
    pub microphone_muted: bool,
    /// Whether the call is held (output detached, capture disabled)
    pub on_hold: bool,
}

#[derive(Debug, Default)]
struct RoutingState {
    intent: HardwareAudioIntent,
    /// Kind of the currently routed output device, if any is forced
    active_kind: Option<OutputDeviceKind>,
    /// Output kind that was active when hold was entered
    pre_hold_kind: Option<OutputDeviceKind>,
    /// Bumped on teardown so a pending stabilization task from a previous
    /// call configuration never re-routes a torn-down path
    generation: u64,
}

/// Coordinates hardware audio routing for the call lifecycle
#[derive(Debug, Clone)]
pub struct AudioRoutingCoordinator {
    hardware: Arc<dyn AudioHardware>,
    stabilization_delay: Duration,
    state: Arc<Mutex<RoutingState>>,
}

impl AudioRoutingCoordinator {
    /// Create a coordinator over the given hardware with the default
    /// stabilization delay.
    pub fn new(hardware: Arc<dyn AudioHardware>) -> Self {
        Self::with_stabilization_delay(
            hardware,
            Duration::from_millis(crate::audio::DEFAULT_STABILIZATION_DELAY_MS),
        )
    }

    /// Create a coordinator with an explicit stabilization delay.
    pub fn with_stabilization_delay(
        hardware: Arc<dyn AudioHardware>,
        stabilization_delay: Duration,
    ) -> Self {
        Self {
            hardware,
            stabilization_delay,
            state: Arc::new(Mutex::new(RoutingState::default())),
        }
    }

    /// Snapshot of the current logical audio intent.
    pub async fn intent(&self) -> HardwareAudioIntent {
        self.state.lock().await.intent
    }

    /// Prepare the system for a VoIP call.
    ///
    /// Switches to communication mode immediately, then routes to the
    /// non-speaker device after the stabilization delay. The delayed
    /// routing runs concurrently with the rest of call setup; forcing the
    /// device immediately after the mode change is unreliable on some
    /// hardware.
    pub async fn configure_for_call(&self) {
        self.hardware.set_mode(AudioMode::Communication).await;

        let generation = {
            let mut state = self.state.lock().await;
            state.intent = HardwareAudioIntent::default();
            state.generation
        };

        let hardware = Arc::clone(&self.hardware);
        let shared = Arc::clone(&self.state);
        let delay = self.stabilization_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut state = shared.lock().await;
            if state.generation != generation || state.intent.on_hold {
                debug!("Skipping initial audio routing: configuration superseded");
                return;
            }
            match select_kind(hardware.as_ref(), OutputDeviceKind::Earpiece).await {
                Ok(()) => state.active_kind = Some(OutputDeviceKind::Earpiece),
                Err(e) => warn!("Initial audio routing failed: {}", e),
            }
        });
    }

    /// Route output to the built-in loudspeaker, or back to the earpiece.
    ///
    /// Fails soft when the requested device cannot be found: the previous
    /// routing is left untouched and a [`ClientError::HardwareError`] is
    /// returned for the caller to log.
    pub async fn set_speaker(&self, enabled: bool) -> ClientResult<()> {
        let wanted = if enabled {
            OutputDeviceKind::Speaker
        } else {
            OutputDeviceKind::Earpiece
        };

        select_kind(self.hardware.as_ref(), wanted).await?;

        let mut state = self.state.lock().await;
        state.intent.speaker_enabled = enabled;
        state.active_kind = Some(wanted);
        info!("Audio routing switched to {:?}", wanted);
        Ok(())
    }

    /// Mute or unmute the microphone capture path.
    pub async fn set_microphone_muted(&self, muted: bool) -> ClientResult<()> {
        self.hardware.set_microphone_muted(muted).await?;
        self.state.lock().await.intent.microphone_muted = muted;
        debug!("Microphone {}", if muted { "muted" } else { "unmuted" });
        Ok(())
    }

    /// Hardware half of entering hold: disable capture, then detach the
    /// active output device.
    ///
    /// The signaling pause must already have been sent; capture and
    /// output are torn down together so no live audio can leak while the
    /// session is paused. The active device kind is remembered for
    /// [`leave_hold`](Self::leave_hold).
    pub async fn enter_hold(&self) -> ClientResult<()> {
        {
            let mut state = self.state.lock().await;
            state.pre_hold_kind = state.active_kind;
            state.intent.on_hold = true;
        }

        self.hardware.set_microphone_muted(true).await?;
        self.hardware.set_output_device(None).await?;

        let mut state = self.state.lock().await;
        state.intent.microphone_muted = true;
        state.active_kind = None;
        info!("Hard hold applied: capture disabled, output detached");
        Ok(())
    }

    /// Hardware half of leaving hold: reattach the previously active
    /// output device, then re-enable capture.
    ///
    /// Must run before the signaling resume is sent.
    pub async fn leave_hold(&self) -> ClientResult<()> {
        let restore = {
            let state = self.state.lock().await;
            state.pre_hold_kind.unwrap_or(OutputDeviceKind::Earpiece)
        };

        select_kind(self.hardware.as_ref(), restore).await?;
        self.hardware.set_microphone_muted(false).await?;

        let mut state = self.state.lock().await;
        state.intent.on_hold = false;
        state.intent.microphone_muted = false;
        state.intent.speaker_enabled = restore == OutputDeviceKind::Speaker;
        state.active_kind = Some(restore);
        state.pre_hold_kind = None;
        info!("Hold released: output restored to {:?}", restore);
        Ok(())
    }

    /// Reset the audio system to its neutral state.
    ///
    /// Idempotent and safe to call when nothing is active. Failures are
    /// logged and swallowed; teardown never propagates errors.
    pub async fn teardown(&self) {
        info!("Audio routing teardown");
        self.hardware.set_mode(AudioMode::Normal).await;

        if let Err(e) = self.hardware.set_output_device(None).await {
            warn!("Teardown: clearing output device failed: {}", e);
        }
        if let Err(e) = self.hardware.set_microphone_muted(false).await {
            warn!("Teardown: unmuting microphone failed: {}", e);
        }

        let mut state = self.state.lock().await;
        state.intent = HardwareAudioIntent::default();
        state.active_kind = None;
        state.pre_hold_kind = None;
        state.generation = state.generation.wrapping_add(1);
    }
}

/// Find and select an output device of the wanted kind.
///
/// Leaves the current routing untouched when no such device exists.
async fn select_kind(hardware: &dyn AudioHardware, wanted: OutputDeviceKind) -> ClientResult<()> {
    let devices = hardware.list_output_devices().await;
    let target: Option<OutputDeviceId> = devices
        .iter()
        .find(|d| d.kind == wanted)
        .map(|d| d.id.clone());

    match target {
        Some(id) => hardware.set_output_device(Some(&id)).await,
        None => Err(ClientError::HardwareError {
            reason: format!("no output device of kind {:?} available", wanted),
        }),
    }
}
