//! Call lifecycle operations
//!
//! The public operations of the orchestrator: placing a call, hanging
//! up, hold/resume, mute, speaker routing, and DTMF. See the
//! [module documentation](super) for the concurrency rules; every
//! operation here serializes on the orchestrator's state lock.
//!
//! # Call Flow
//!
//! ```text
//! make_call()
//!   ├─ guard: only from Idle
//!   ├─ acquire network-quality lock
//!   ├─ negotiate session (REST)          ← hang_up() cancels here
//!   ├─ arm hardware audio path
//!   └─ engine.register(credentials)
//!         └─ registration Ok event ──► engine.invite(...)   (event loop)
//! ```
//!
//! The invite is sent by the registration-success event, never by the
//! caller: credentials only exist after negotiation, and the invite must
//! ride the already-registered account.

use tracing::{debug, info, warn};

use crate::call::{CallState, DtmfDigit};
use crate::engine::RegistrationRequest;
use crate::error::{ClientError, ClientResult};

use super::types::{CallPhase, MakeCallParams};
use super::WebphoneClient;

impl WebphoneClient {
    /// Fetch the list of available call destinations (queues).
    ///
    /// Suspends on the REST round-trip; does not touch the call state.
    pub async fn get_call_destinations(&self) -> ClientResult<Vec<String>> {
        self.negotiator.get_call_destinations().await
    }

    /// Place an outgoing call.
    ///
    /// Only accepted while idle; a second call attempt is rejected
    /// without side effects. On success the attempt continues in the
    /// background: registration and invite progress arrive as
    /// [`ClientEvent`](super::ClientEvent)s.
    ///
    /// # Errors
    ///
    /// * [`ClientError::ConfigurationError`] - an attempt is already in flight
    /// * [`ClientError::SessionError`] - session negotiation failed; the
    ///   signaling engine has not been touched
    /// * [`ClientError::RegistrationError`] - the engine rejected the
    ///   registration request
    pub async fn make_call(&self, params: MakeCallParams) -> ClientResult<()> {
        let attempt = {
            let mut guard = self.state.lock().await;
            if guard.phase != CallPhase::Idle {
                return Err(ClientError::ConfigurationError {
                    message: format!(
                        "make_call rejected: an attempt is already in progress (phase {:?})",
                        guard.phase
                    ),
                });
            }
            let attempt = self.next_attempt();
            guard.phase = CallPhase::CreatingSession;
            guard.attempt = Some(attempt);
            attempt
        };

        info!(client = %self.instance_id, "{}: starting call attempt", attempt);

        if let Err(e) = self.network_lock.acquire().await {
            warn!("Acquiring network lock failed: {}", e);
        }

        // Negotiation suspends without the state lock so hang_up() can
        // cancel the attempt while the request is outstanding.
        let negotiated = self.negotiator.create_session(&params).await;

        let mut guard = self.state.lock().await;
        if guard.attempt != Some(attempt) || guard.phase != CallPhase::CreatingSession {
            debug!("{}: superseded during negotiation; discarding result", attempt);
            return Ok(());
        }

        let mut credentials = match negotiated {
            Ok(credentials) => credentials,
            Err(e) => {
                self.fail_attempt(&mut guard, &e).await;
                return Err(e);
            }
        };

        credentials.caller_display_name = params.caller_full_name.clone();
        info!(
            "{}: session {} negotiated for {}:{}",
            attempt, credentials.session_id, credentials.server_domain, credentials.server_port
        );

        self.engine.set_network_reachable(true).await;
        self.audio.configure_for_call().await;

        if params.use_native_dialer {
            match &self.native_dialer {
                Some(dialer) => {
                    if let Err(e) = dialer.place_call(&credentials.destination).await {
                        warn!("Native dialer bridging failed: {}", e);
                    }
                }
                None => warn!("Native dialer requested but no bridge is configured"),
            }
        }

        let registration = RegistrationRequest {
            identity_uri: format!(
                "sip:{}@{}",
                credentials.session_id, credentials.server_domain
            ),
            server_uri: format!("sips:{}", credentials.server_domain),
            server_port: credentials.server_port,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        };

        guard.credentials = Some(credentials);
        guard.phase = CallPhase::Registering;

        if let Err(e) = self.engine.register(registration).await {
            let err = ClientError::RegistrationError { reason: e.to_string() };
            self.fail_attempt(&mut guard, &err).await;
            return Err(err);
        }

        Ok(())
    }

    /// Terminate the current call attempt and release all resources.
    ///
    /// Accepted from any non-idle state; also acts as the cancellation
    /// signal for an in-flight `make_call`. Teardown failures are logged,
    /// never propagated: hang-up always succeeds, and `LoggedOut` is
    /// reported unconditionally.
    pub async fn hang_up(&self) -> ClientResult<()> {
        let mut guard = self.state.lock().await;
        if guard.phase == CallPhase::Idle {
            debug!("hang_up with no attempt in progress");
            return Ok(());
        }

        info!(client = %self.instance_id, "Hanging up (phase {:?})", guard.phase);
        let engine_teardown = if guard.phase == CallPhase::CreatingSession {
            // Signaling never started for this attempt.
            super::EngineTeardown::Skip
        } else {
            super::EngineTeardown::TerminateCalls
        };
        guard.phase = CallPhase::Terminating;
        guard.attempt = None;

        // A live call surfaces Disconnected before the logout report;
        // an attempt that never got that far goes straight to LoggedOut.
        if matches!(
            guard.call_state,
            CallState::Dialing | CallState::Ringing | CallState::Connected | CallState::Held
        ) {
            self.transition(&mut guard, CallState::Disconnected);
        }

        self.teardown_quietly(&mut guard, engine_teardown).await;

        guard.phase = CallPhase::Idle;
        self.report_logged_out(&mut guard);
        Ok(())
    }

    /// Put the active call on hold, or resume it.
    ///
    /// Only meaningful while a call is established. Entering hold sends
    /// the pause signaling first, then disables capture and detaches the
    /// output device; a device left attached after pause can leak live
    /// audio on some hardware. Leaving hold restores the previously
    /// active output device and capture before the resume signaling.
    pub async fn set_hold(&self, on_hold: bool) -> ClientResult<()> {
        let mut guard = self.state.lock().await;
        if !guard.call_state.is_in_call() {
            return Err(ClientError::ConfigurationError {
                message: format!(
                    "set_hold({}) requires an established call (state {})",
                    on_hold, guard.call_state
                ),
            });
        }

        if on_hold {
            if guard.call_state == CallState::Held {
                return Ok(());
            }
            self.engine.pause().await?;
            if let Err(e) = self.audio.enter_hold().await {
                warn!("Hold hardware teardown failed: {}", e);
            }
            guard.phase = CallPhase::Held;
            self.transition(&mut guard, CallState::Held);
        } else {
            if guard.call_state == CallState::Connected {
                return Ok(());
            }
            if let Err(e) = self.audio.leave_hold().await {
                warn!("Hold hardware restore failed: {}", e);
            }
            self.engine.resume().await?;
            guard.phase = CallPhase::Connected;
            self.transition(&mut guard, CallState::Connected);
        }
        Ok(())
    }

    /// Mute or unmute the microphone.
    ///
    /// Applies the hardware mute and the engine-level capture mute
    /// together. Hardware failures are recovered locally.
    pub async fn set_microphone_muted(&self, muted: bool) -> ClientResult<()> {
        if let Err(e) = self.audio.set_microphone_muted(muted).await {
            warn!("Hardware microphone mute failed: {}", e);
        }
        if let Err(e) = self.engine.set_microphone_muted(muted).await {
            warn!("Engine microphone mute failed: {}", e);
        }
        Ok(())
    }

    /// Route audio output to the loudspeaker or back to the earpiece.
    ///
    /// Fails soft: when the requested device is not available the
    /// previous routing stays in effect and the error is only logged.
    pub async fn set_speaker_on(&self, enabled: bool) -> ClientResult<()> {
        if let Err(e) = self.audio.set_speaker(enabled).await {
            warn!("Speaker routing failed: {}", e);
        }
        Ok(())
    }

    /// Send a DTMF tone on the active call.
    pub async fn send_dtmf(&self, digit: DtmfDigit) -> ClientResult<()> {
        let guard = self.state.lock().await;
        if !guard.call_state.is_in_call() {
            return Err(ClientError::ConfigurationError {
                message: format!("send_dtmf('{}') requires an established call", digit),
            });
        }
        drop(guard);

        debug!("Sending DTMF '{}'", digit);
        self.engine.send_dtmf(digit).await
    }
}
