//! Native telephony interruption monitoring
//!
//! A competing call on the device's own cellular/voice stack must not
//! fight the VoIP session for the audio hardware. The
//! [`InterruptionMonitor`] observes native call-state notifications from
//! a [`TelephonySource`] and raises a forced-hangup signal when the
//! system goes off-hook; ringing and idle notifications are informational
//! only.
//!
//! Registration with the native notification source is deliberately
//! delayed by a grace period after the hosting service reaches foreground
//! state: the platform silently drops registrations performed too early
//! relative to foreground-service promotion. This is a startup-ordering
//! guard, not an arbitrary sleep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default delay between the hosting service reaching foreground state
/// and registration with the native telephony source.
pub const DEFAULT_MONITOR_GRACE_PERIOD_MS: u64 = 2500;

/// Call state of the device's native telephony stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCallState {
    /// No native call activity
    Idle,
    /// A native call is ringing; the VoIP session is preserved
    Ringing,
    /// A native call was picked up; the VoIP session must yield
    OffHook,
}

/// Source of native telephony call-state notifications
///
/// Obtained from the hosting (foreground) service; subscribing counts as
/// registering with the platform's notification stack.
pub trait TelephonySource: Send + Sync + std::fmt::Debug {
    /// Register for native call-state notifications.
    fn subscribe(&self) -> broadcast::Receiver<NativeCallState>;
}

/// Signal raised towards the orchestrator when an interruption demands a
/// forced hang-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionSignal {
    /// The native stack went off-hook while the VoIP session was live
    NativeOffHook,
}

/// Observable snapshot of the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptionState {
    /// Whether the monitor is registered and consuming notifications
    pub is_monitoring: bool,
    /// Last native call state observed, if any
    pub last_native_call_state: Option<NativeCallState>,
}

#[derive(Debug, Default)]
struct MonitorInner {
    is_monitoring: bool,
    last_state: Option<NativeCallState>,
    task: Option<JoinHandle<()>>,
}

/// Watches the native telephony stack and raises forced-hangup signals
#[derive(Debug)]
pub struct InterruptionMonitor {
    grace_period: Duration,
    signal_tx: mpsc::UnboundedSender<InterruptionSignal>,
    inner: Arc<Mutex<MonitorInner>>,
}

impl InterruptionMonitor {
    /// Create a monitor that reports interruptions on `signal_tx`, using
    /// the default grace period.
    pub fn new(signal_tx: mpsc::UnboundedSender<InterruptionSignal>) -> Self {
        Self::with_grace_period(
            signal_tx,
            Duration::from_millis(DEFAULT_MONITOR_GRACE_PERIOD_MS),
        )
    }

    /// Create a monitor with an explicit grace period.
    pub fn with_grace_period(
        signal_tx: mpsc::UnboundedSender<InterruptionSignal>,
        grace_period: Duration,
    ) -> Self {
        Self {
            grace_period,
            signal_tx,
            inner: Arc::new(Mutex::new(MonitorInner::default())),
        }
    }

    /// Begin monitoring the given source.
    ///
    /// Registration happens after the grace period. Calling this while a
    /// previous registration is active (or still pending) replaces it:
    /// service lifecycle races restart the monitor rather than stacking
    /// listeners.
    pub async fn start_monitoring(&self, source: Arc<dyn TelephonySource>) {
        let mut inner = self.inner.lock().await;
        if let Some(task) = inner.task.take() {
            debug!("Restarting interruption monitor: replacing previous registration");
            task.abort();
            inner.is_monitoring = false;
        }

        let grace = self.grace_period;
        let shared = Arc::clone(&self.inner);
        let signal_tx = self.signal_tx.clone();

        inner.task = Some(tokio::spawn(async move {
            // Required startup-ordering guard relative to foreground promotion.
            tokio::time::sleep(grace).await;

            let mut rx = source.subscribe();
            {
                let mut inner = shared.lock().await;
                inner.is_monitoring = true;
            }
            info!("Interruption monitor bound to native telephony source");

            loop {
                match rx.recv().await {
                    Ok(state) => {
                        shared.lock().await.last_state = Some(state);
                        match state {
                            NativeCallState::OffHook => {
                                warn!("Native call picked up; forcing VoIP hang-up");
                                let _ = signal_tx.send(InterruptionSignal::NativeOffHook);
                            }
                            NativeCallState::Ringing => {
                                info!("Native call ringing; VoIP session preserved");
                            }
                            NativeCallState::Idle => {
                                debug!("Native telephony idle");
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Interruption monitor lagged, {} notifications dropped", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            shared.lock().await.is_monitoring = false;
        }));
    }

    /// Unregister from the native notification source.
    pub async fn stop_monitoring(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        inner.is_monitoring = false;
    }

    /// Snapshot of the monitor state.
    pub async fn state(&self) -> InterruptionState {
        let inner = self.inner.lock().await;
        InterruptionState {
            is_monitoring: inner.is_monitoring,
            last_native_call_state: inner.last_state,
        }
    }
}

impl Drop for InterruptionMonitor {
    fn drop(&mut self) {
        // Best effort: the task holds only weak interest in the monitor,
        // but an orphaned registration would keep the source subscription
        // alive.
        if let Ok(mut inner) = self.inner.try_lock() {
            if let Some(task) = inner.task.take() {
                task.abort();
            }
        }
    }
}
