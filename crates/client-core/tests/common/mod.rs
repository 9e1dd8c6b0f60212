//! Shared mock collaborators and harness for the integration tests
//!
//! The mocks record every operation into a shared ordered log so tests
//! can assert cross-collaborator sequencing (e.g. pause signaling before
//! the hardware detach).

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webphone_client_core::audio::device::{
    AudioHardware, AudioMode, OutputDeviceId, OutputDeviceInfo, OutputDeviceKind,
};
use webphone_client_core::call::{CallState, DtmfDigit};
use webphone_client_core::client::{
    ClientConfig, ClientEvent, MakeCallParams, WebphoneClient, WebphoneClientBuilder,
};
use webphone_client_core::engine::{
    engine_event_channel, EngineCallState, EngineEvent, EngineEventSender,
    EngineRegistrationState, InviteRequest, RegistrationRequest, SignalingEngine,
};
use webphone_client_core::error::ClientResult;
use webphone_client_core::interruption::{NativeCallState, TelephonySource};
use webphone_client_core::network::NetworkLock;

/// Capture test logs when RUST_LOG is set; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ordered log of operations across all mocks
pub type OpsLog = Arc<StdMutex<Vec<String>>>;

pub fn new_ops_log() -> OpsLog {
    Arc::new(StdMutex::new(Vec::new()))
}

fn log(ops: &OpsLog, entry: impl Into<String>) {
    ops.lock().unwrap().push(entry.into());
}

// ===== SIGNALING ENGINE MOCK =====

/// A recorded engine operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOp {
    Register(RegistrationRequest),
    Invite(InviteRequest),
    Pause,
    Resume,
    Terminate,
    TerminateAll,
    ClearCredentials,
    Dtmf(char),
    MicMuted(bool),
    NetworkReachable(bool),
    DebugMode(bool),
}

#[derive(Debug)]
pub struct MockEngine {
    calls: StdMutex<Vec<EngineOp>>,
    ops: OpsLog,
    active_call: AtomicBool,
}

impl MockEngine {
    pub fn new(ops: OpsLog) -> Self {
        Self {
            calls: StdMutex::new(Vec::new()),
            ops,
            active_call: AtomicBool::new(false),
        }
    }

    pub fn set_active_call(&self, active: bool) {
        self.active_call.store(active, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<EngineOp> {
        self.calls.lock().unwrap().clone()
    }

    pub fn registrations(&self) -> Vec<RegistrationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|op| match op {
                EngineOp::Register(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn invites(&self) -> Vec<InviteRequest> {
        self.calls()
            .into_iter()
            .filter_map(|op| match op {
                EngineOp::Invite(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: EngineOp, entry: &str) {
        log(&self.ops, format!("engine:{}", entry));
        self.calls.lock().unwrap().push(op);
    }
}

#[async_trait::async_trait]
impl SignalingEngine for MockEngine {
    async fn register(&self, request: RegistrationRequest) -> ClientResult<()> {
        self.record(EngineOp::Register(request), "register");
        Ok(())
    }
    async fn invite(&self, request: InviteRequest) -> ClientResult<()> {
        self.active_call.store(true, Ordering::SeqCst);
        self.record(EngineOp::Invite(request), "invite");
        Ok(())
    }
    async fn pause(&self) -> ClientResult<()> {
        self.record(EngineOp::Pause, "pause");
        Ok(())
    }
    async fn resume(&self) -> ClientResult<()> {
        self.record(EngineOp::Resume, "resume");
        Ok(())
    }
    async fn has_active_call(&self) -> bool {
        self.active_call.load(Ordering::SeqCst)
    }
    async fn terminate(&self) -> ClientResult<()> {
        self.active_call.store(false, Ordering::SeqCst);
        self.record(EngineOp::Terminate, "terminate");
        Ok(())
    }
    async fn terminate_all(&self) -> ClientResult<()> {
        self.active_call.store(false, Ordering::SeqCst);
        self.record(EngineOp::TerminateAll, "terminate_all");
        Ok(())
    }
    async fn clear_credentials(&self) -> ClientResult<()> {
        self.record(EngineOp::ClearCredentials, "clear_credentials");
        Ok(())
    }
    async fn send_dtmf(&self, digit: DtmfDigit) -> ClientResult<()> {
        self.record(EngineOp::Dtmf(digit.as_char()), "dtmf");
        Ok(())
    }
    async fn set_microphone_muted(&self, muted: bool) -> ClientResult<()> {
        self.record(EngineOp::MicMuted(muted), "mic_muted");
        Ok(())
    }
    async fn set_network_reachable(&self, reachable: bool) {
        self.record(EngineOp::NetworkReachable(reachable), "network_reachable");
    }
    async fn set_debug_mode(&self, enabled: bool) {
        self.record(EngineOp::DebugMode(enabled), "debug_mode");
    }
}

// ===== AUDIO HARDWARE MOCK =====

#[derive(Debug)]
pub struct MockAudioHardware {
    devices: Vec<OutputDeviceInfo>,
    mode: StdMutex<AudioMode>,
    current_device: StdMutex<Option<OutputDeviceId>>,
    mic_muted: AtomicBool,
    ops: OpsLog,
}

impl MockAudioHardware {
    /// A phone-shaped device set: earpiece plus built-in speaker.
    pub fn new(ops: OpsLog) -> Self {
        Self::with_devices(
            vec![
                OutputDeviceInfo::new("earpiece-0", "Earpiece", OutputDeviceKind::Earpiece),
                OutputDeviceInfo::new("speaker-0", "Built-in Speaker", OutputDeviceKind::Speaker),
            ],
            ops,
        )
    }

    /// A device set without a loudspeaker, for fail-soft tests.
    pub fn without_speaker(ops: OpsLog) -> Self {
        Self::with_devices(
            vec![OutputDeviceInfo::new(
                "earpiece-0",
                "Earpiece",
                OutputDeviceKind::Earpiece,
            )],
            ops,
        )
    }

    pub fn with_devices(devices: Vec<OutputDeviceInfo>, ops: OpsLog) -> Self {
        Self {
            devices,
            mode: StdMutex::new(AudioMode::Normal),
            current_device: StdMutex::new(None),
            mic_muted: AtomicBool::new(false),
            ops,
        }
    }

    pub fn mode(&self) -> AudioMode {
        *self.mode.lock().unwrap()
    }

    pub fn current_device(&self) -> Option<OutputDeviceId> {
        self.current_device.lock().unwrap().clone()
    }

    pub fn mic_muted(&self) -> bool {
        self.mic_muted.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AudioHardware for MockAudioHardware {
    async fn set_mode(&self, mode: AudioMode) {
        log(&self.ops, format!("hw:mode:{:?}", mode));
        *self.mode.lock().unwrap() = mode;
    }
    async fn list_output_devices(&self) -> Vec<OutputDeviceInfo> {
        self.devices.clone()
    }
    async fn set_output_device(&self, device: Option<&OutputDeviceId>) -> ClientResult<()> {
        match device {
            Some(id) => log(&self.ops, format!("hw:device:{}", id)),
            None => log(&self.ops, "hw:device:none"),
        }
        *self.current_device.lock().unwrap() = device.cloned();
        Ok(())
    }
    async fn set_microphone_muted(&self, muted: bool) -> ClientResult<()> {
        log(&self.ops, format!("hw:mic:{}", muted));
        self.mic_muted.store(muted, Ordering::SeqCst);
        Ok(())
    }
}

// ===== TELEPHONY SOURCE MOCK =====

#[derive(Debug)]
pub struct MockTelephonySource {
    tx: broadcast::Sender<NativeCallState>,
    subscriptions: AtomicUsize,
}

impl MockTelephonySource {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self {
            tx,
            subscriptions: AtomicUsize::new(0),
        }
    }

    pub fn send(&self, state: NativeCallState) {
        let _ = self.tx.send(state);
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

impl TelephonySource for MockTelephonySource {
    fn subscribe(&self) -> broadcast::Receiver<NativeCallState> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.tx.subscribe()
    }
}

// ===== NETWORK LOCK MOCK =====

#[derive(Debug)]
pub struct MockNetworkLock {
    held: AtomicBool,
    acquires: AtomicUsize,
    releases: AtomicUsize,
    ops: OpsLog,
}

impl MockNetworkLock {
    pub fn new(ops: OpsLog) -> Self {
        Self {
            held: AtomicBool::new(false),
            acquires: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            ops,
        }
    }

    pub fn is_held_now(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    pub fn acquire_count(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NetworkLock for MockNetworkLock {
    async fn acquire(&self) -> ClientResult<()> {
        log(&self.ops, "lock:acquire");
        self.acquires.fetch_add(1, Ordering::SeqCst);
        self.held.store(true, Ordering::SeqCst);
        Ok(())
    }
    async fn release(&self) -> ClientResult<()> {
        log(&self.ops, "lock:release");
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.held.store(false, Ordering::SeqCst);
        Ok(())
    }
    async fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

// ===== HARNESS =====

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_FLOW: &str = "flow-1";
pub const SESSION_CREATE_PATH: &str = "/webphone-api/api/session/create/flow-1/sips";
pub const DESTINATIONS_PATH: &str = "/webphone-api/api/option/read/flow-1/option.SA.queues";

pub struct Harness {
    pub client: Arc<WebphoneClient>,
    pub events: mpsc::UnboundedReceiver<ClientEvent>,
    pub engine: Arc<MockEngine>,
    pub engine_tx: EngineEventSender,
    pub hardware: Arc<MockAudioHardware>,
    pub lock: Arc<MockNetworkLock>,
    pub ops: OpsLog,
}

/// Build a client wired to fresh mocks, pointing at `api_base`.
pub fn harness(api_base: &str) -> Harness {
    harness_with(api_base, true)
}

/// Same as [`harness`], optionally without a loudspeaker device.
pub fn harness_with(api_base: &str, with_speaker: bool) -> Harness {
    init_tracing();
    let ops = new_ops_log();
    let engine = Arc::new(MockEngine::new(ops.clone()));
    let hardware = Arc::new(if with_speaker {
        MockAudioHardware::new(ops.clone())
    } else {
        MockAudioHardware::without_speaker(ops.clone())
    });
    let lock = Arc::new(MockNetworkLock::new(ops.clone()));
    let (engine_tx, engine_rx) = engine_event_channel();

    let config = ClientConfig::new(TEST_TOKEN, TEST_FLOW, "voice.example.com")
        .with_api_base(Url::parse(&format!("{}/webphone-api/api", api_base)).unwrap())
        .with_stabilization_delay(Duration::ZERO)
        .with_monitor_grace_period(Duration::ZERO);

    let client = WebphoneClientBuilder::new(config)
        .with_engine(engine.clone(), engine_rx)
        .with_audio_hardware(hardware.clone())
        .with_network_lock(lock.clone())
        .build()
        .expect("harness client builds");

    let events = client.take_events().expect("first event consumer");

    Harness {
        client,
        events,
        engine,
        engine_tx,
        hardware,
        lock,
        ops,
    }
}

impl Harness {
    /// Push an engine registration event.
    pub fn registration_event(&self, state: EngineRegistrationState, message: &str) {
        self.engine_tx
            .send(EngineEvent::Registration {
                state,
                message: message.to_string(),
            })
            .expect("event loop alive");
    }

    /// Push an engine call-state event.
    pub fn call_event(&self, state: EngineCallState, message: &str) {
        self.engine_tx
            .send(EngineEvent::CallState {
                state,
                message: message.to_string(),
            })
            .expect("event loop alive");
    }

    /// Drain every event currently queued.
    pub fn drain_events(&mut self) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Let spawned tasks and the event loop catch up.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(80)).await;
}

/// Extract the state sequence from a batch of events.
pub fn state_sequence(events: &[ClientEvent]) -> Vec<CallState> {
    events
        .iter()
        .filter_map(|e| match e {
            ClientEvent::StateChanged { info } => Some(info.new_state),
            ClientEvent::Failed { .. } => None,
        })
        .collect()
}

/// Extract the failure messages from a batch of events.
pub fn failure_messages(events: &[ClientEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ClientEvent::Failed { info } => Some(info.message.clone()),
            ClientEvent::StateChanged { .. } => None,
        })
        .collect()
}

/// A complete, valid session payload with the port encoded as given.
pub fn session_body(port: Value) -> Value {
    json!({
        "sessionId": "abc",
        "connection": {
            "connection": {
                "sip": {
                    "server": "sip.example.com",
                    "port": port,
                    "username": "u1",
                    "password": "p1",
                    "destination": "sales"
                }
            }
        }
    })
}

/// Mount a 200 session-create response on the mock backend.
pub async fn mount_session(server: &MockServer, port: Value) {
    Mock::given(method("POST"))
        .and(path(SESSION_CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body(port)))
        .mount(server)
        .await;
}

/// Negotiate, register, and connect a call against a prepared backend.
pub async fn establish_call(h: &mut Harness) {
    h.client
        .make_call(MakeCallParams::new().with_destination_queue("sales"))
        .await
        .expect("make_call succeeds");

    h.registration_event(EngineRegistrationState::Ok, "registered");
    settle().await;
    h.call_event(EngineCallState::Connected, "answered");
    settle().await;

    assert_eq!(h.client.call_state().await, CallState::Connected);
}
