//! Network-quality lock and native dialer seams
//!
//! Two small collaborator traits the orchestrator drives but does not
//! implement: the network-quality lock held for the duration of a call
//! (e.g. a low-latency wifi lock on mobile platforms), and the optional
//! native dialer bridge.
//!
//! The lock is a single-writer resource: only the orchestrator acquires
//! and releases it, once per call attempt.

use crate::error::ClientResult;

/// A platform lock that keeps the network path call-worthy while held
#[async_trait::async_trait]
pub trait NetworkLock: Send + Sync + std::fmt::Debug {
    /// Acquire the lock. Acquiring an already-held lock is a no-op.
    async fn acquire(&self) -> ClientResult<()>;

    /// Release the lock. Releasing an idle lock is a no-op.
    async fn release(&self) -> ClientResult<()>;

    /// Whether the lock is currently held.
    async fn is_held(&self) -> bool;
}

/// Bridge to the device's native dialer stack
///
/// Optional collaborator: when a call is placed with the native-dialer
/// flag, the orchestrator asks this bridge to surface the call in the
/// system dialer UI before signaling starts. Failures are logged, never
/// fatal to the VoIP call.
#[async_trait::async_trait]
pub trait NativeDialer: Send + Sync + std::fmt::Debug {
    /// Surface an outgoing call to `destination` in the native dialer.
    async fn place_call(&self, destination: &str) -> ClientResult<()>;
}
