//! Tests for the native telephony interruption monitor

mod common;

use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;
use tokio::sync::mpsc;
use tokio::time::timeout;

use webphone_client_core::interruption::{
    InterruptionMonitor, InterruptionSignal, NativeCallState,
};

use common::MockTelephonySource;

fn monitor_with_grace(grace_ms: u64) -> (InterruptionMonitor, mpsc::UnboundedReceiver<InterruptionSignal>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let monitor = InterruptionMonitor::with_grace_period(tx, Duration::from_millis(grace_ms));
    (monitor, rx)
}

#[tokio::test]
#[serial]
async fn registration_waits_for_the_grace_period() {
    let (monitor, _rx) = monitor_with_grace(150);
    let source = Arc::new(MockTelephonySource::new());

    monitor.start_monitoring(source.clone()).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.subscription_count(), 0);
    assert!(!monitor.state().await.is_monitoring);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(source.subscription_count(), 1);
    assert!(monitor.state().await.is_monitoring);
}

#[tokio::test]
#[serial]
async fn offhook_raises_the_forced_hangup_signal() {
    let (monitor, mut rx) = monitor_with_grace(0);
    let source = Arc::new(MockTelephonySource::new());

    monitor.start_monitoring(source.clone()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    source.send(NativeCallState::OffHook);
    let signal = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("signal within a second")
        .expect("channel open");
    assert_eq!(signal, InterruptionSignal::NativeOffHook);
}

#[tokio::test]
#[serial]
async fn ringing_and_idle_are_informational() {
    let (monitor, mut rx) = monitor_with_grace(0);
    let source = Arc::new(MockTelephonySource::new());

    monitor.start_monitoring(source.clone()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    source.send(NativeCallState::Ringing);
    source.send(NativeCallState::Idle);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(rx.try_recv().is_err());
    assert_eq!(
        monitor.state().await.last_native_call_state,
        Some(NativeCallState::Idle)
    );
}

#[tokio::test]
#[serial]
async fn restart_replaces_the_previous_registration() {
    let (monitor, mut rx) = monitor_with_grace(30);
    let source = Arc::new(MockTelephonySource::new());

    // A lifecycle race: the service restarts while the first registration
    // is still pending.
    monitor.start_monitoring(source.clone()).await;
    monitor.start_monitoring(source.clone()).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(source.subscription_count(), 1);
    assert!(monitor.state().await.is_monitoring);

    // Exactly one listener: one off-hook, one signal.
    source.send(NativeCallState::OffHook);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(matches!(rx.try_recv(), Ok(InterruptionSignal::NativeOffHook)));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
#[serial]
async fn stop_monitoring_unregisters() {
    let (monitor, mut rx) = monitor_with_grace(0);
    let source = Arc::new(MockTelephonySource::new());

    monitor.start_monitoring(source.clone()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(monitor.state().await.is_monitoring);

    monitor.stop_monitoring().await;
    assert!(!monitor.state().await.is_monitoring);

    source.send(NativeCallState::OffHook);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}
