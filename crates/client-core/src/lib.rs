//! # Webphone Client Core
//!
//! Call-session orchestration for encrypted SIP webphone clients. This
//! crate lets a host application place a call through a provider's
//! middleware without understanding SIP signaling: it negotiates a
//! short-lived session from the REST backend, drives an external
//! signaling engine through registration and the outgoing invite,
//! reconciles engine call/registration events into one unified
//! [`CallState`], coordinates hold/resume with hardware audio routing,
//! and yields to competing native telephony calls.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │     Host Application     │
//! └────────────┬─────────────┘
//!              │ make_call / hang_up / hold / events
//! ┌────────────▼─────────────┐
//! │      WebphoneClient      │ ◄── this crate
//! │  ┌────────────────────┐  │
//! │  │ SessionNegotiator  │──┼──► REST backend
//! │  │ CallState mapper   │  │
//! │  │ AudioRouting       │──┼──► AudioHardware (trait)
//! │  │ InterruptionMonitor│──┼──► TelephonySource (trait)
//! │  └────────────────────┘  │
//! └────────────┬─────────────┘
//!              │ register / invite / pause / events
//! ┌────────────▼─────────────┐
//! │  SignalingEngine (trait) │  external SIP stack
//! └──────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! use webphone_client_core::{
//!     ClientConfig, ClientEvent, MakeCallParams, WebphoneClientBuilder,
//! };
//! # use webphone_client_core::engine::SignalingEngine;
//! # use webphone_client_core::audio::AudioHardware;
//! # use webphone_client_core::network::NetworkLock;
//!
//! # async fn example(
//! #     engine: Arc<dyn SignalingEngine>,
//! #     hardware: Arc<dyn AudioHardware>,
//! #     lock: Arc<dyn NetworkLock>,
//! #     engine_rx: webphone_client_core::engine::EngineEventReceiver,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let client = WebphoneClientBuilder::new(
//!     ClientConfig::new("token", "flow-1", "voice.example.com"),
//! )
//! .with_engine(engine, engine_rx)
//! .with_audio_hardware(hardware)
//! .with_network_lock(lock)
//! .build()?;
//!
//! let mut events = client.take_events().expect("single consumer");
//!
//! client
//!     .make_call(MakeCallParams::new().with_destination_queue("support"))
//!     .await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ClientEvent::StateChanged { info } => println!("state: {}", info.new_state),
//!         ClientEvent::Failed { info } => eprintln!("failed: {}", info.message),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod call;
pub mod client;
pub mod engine;
pub mod error;
pub mod interruption;
pub mod mapper;
pub mod network;
pub mod session;

pub use call::{CallState, DtmfDigit};
pub use client::{
    ClientConfig, ClientEvent, FailureInfo, MakeCallParams, StateChangeInfo, WebphoneClient,
    WebphoneClientBuilder,
};
pub use error::{ClientError, ClientResult};
pub use session::SessionCredentials;

/// The version of this SDK
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
