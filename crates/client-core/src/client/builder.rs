//! Builder for [`WebphoneClient`]
//!
//! Clients are explicitly constructed and caller-owned: the builder wires
//! the configuration and the external collaborators (signaling engine,
//! audio hardware, network lock, optional native dialer) into an
//! `Arc<WebphoneClient>` and starts its event loop.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use webphone_client_core::client::{ClientConfig, WebphoneClientBuilder};
//! # use webphone_client_core::engine::{engine_event_channel, SignalingEngine};
//! # use webphone_client_core::audio::AudioHardware;
//! # use webphone_client_core::network::NetworkLock;
//! # async fn example(
//! #     engine: Arc<dyn SignalingEngine>,
//! #     hardware: Arc<dyn AudioHardware>,
//! #     lock: Arc<dyn NetworkLock>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let (engine_tx, engine_rx) = engine_event_channel();
//! // engine_tx is handed to the engine implementation
//!
//! let client = WebphoneClientBuilder::new(
//!     ClientConfig::new("token", "flow-1", "voice.example.com"),
//! )
//! .with_engine(engine, engine_rx)
//! .with_audio_hardware(hardware)
//! .with_network_lock(lock)
//! .build()?;
//!
//! let mut events = client.take_events().expect("first consumer");
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::audio::device::AudioHardware;
use crate::audio::routing::AudioRoutingCoordinator;
use crate::engine::{EngineEventReceiver, SignalingEngine};
use crate::error::{ClientError, ClientResult};
use crate::interruption::InterruptionMonitor;
use crate::network::{NativeDialer, NetworkLock};
use crate::session::SessionNegotiator;

use super::config::ClientConfig;
use super::events::spawn_event_loop;
use super::{OrchestratorState, WebphoneClient};

/// Assembles a [`WebphoneClient`] from its configuration and collaborators
pub struct WebphoneClientBuilder {
    config: ClientConfig,
    engine: Option<(Arc<dyn SignalingEngine>, EngineEventReceiver)>,
    audio_hardware: Option<Arc<dyn AudioHardware>>,
    network_lock: Option<Arc<dyn NetworkLock>>,
    native_dialer: Option<Arc<dyn NativeDialer>>,
}

impl WebphoneClientBuilder {
    /// Start a builder with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            engine: None,
            audio_hardware: None,
            network_lock: None,
            native_dialer: None,
        }
    }

    /// Provide the signaling engine and its event channel
    pub fn with_engine(
        mut self,
        engine: Arc<dyn SignalingEngine>,
        events: EngineEventReceiver,
    ) -> Self {
        self.engine = Some((engine, events));
        self
    }

    /// Provide the hardware audio stack
    pub fn with_audio_hardware(mut self, hardware: Arc<dyn AudioHardware>) -> Self {
        self.audio_hardware = Some(hardware);
        self
    }

    /// Provide the network-quality lock
    pub fn with_network_lock(mut self, lock: Arc<dyn NetworkLock>) -> Self {
        self.network_lock = Some(lock);
        self
    }

    /// Provide the optional native dialer bridge
    pub fn with_native_dialer(mut self, dialer: Arc<dyn NativeDialer>) -> Self {
        self.native_dialer = Some(dialer);
        self
    }

    /// Build the client and start its event loop.
    ///
    /// # Errors
    ///
    /// [`ClientError::ConfigurationError`] when the configuration is
    /// incomplete (empty token, flow id, or domain) or a collaborator is
    /// missing.
    pub fn build(self) -> ClientResult<Arc<WebphoneClient>> {
        if self.config.token.is_empty()
            || self.config.flow_id.is_empty()
            || self.config.domain.is_empty()
        {
            return Err(ClientError::ConfigurationError {
                message: "token, flow_id and domain must be configured before use".into(),
            });
        }

        let (engine, engine_rx) = self.engine.ok_or_else(|| missing("signaling engine"))?;
        let audio_hardware = self.audio_hardware.ok_or_else(|| missing("audio hardware"))?;
        let network_lock = self.network_lock.ok_or_else(|| missing("network lock"))?;

        let negotiator = SessionNegotiator::new(
            self.config.api_base_url()?,
            self.config.flow_id.clone(),
            self.config.token.clone(),
            self.config.http_timeout,
        )?;

        let audio = AudioRoutingCoordinator::with_stabilization_delay(
            audio_hardware,
            self.config.stabilization_delay,
        );

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let monitor =
            InterruptionMonitor::with_grace_period(signal_tx, self.config.monitor_grace_period);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let client = Arc::new(WebphoneClient {
            instance_id: Uuid::new_v4(),
            config: self.config,
            negotiator,
            engine,
            audio,
            network_lock,
            native_dialer: self.native_dialer,
            monitor,
            state: Mutex::new(OrchestratorState::new()),
            event_tx,
            event_rx: std::sync::Mutex::new(Some(event_rx)),
            attempt_counter: AtomicU64::new(0),
        });

        let _ = spawn_event_loop(Arc::clone(&client), engine_rx, signal_rx);

        Ok(client)
    }
}

fn missing(what: &str) -> ClientError {
    ClientError::ConfigurationError {
        message: format!("{} must be provided before build()", what),
    }
}
