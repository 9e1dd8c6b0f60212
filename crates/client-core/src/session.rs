//! Session negotiation with the REST backend
//!
//! This module exchanges business routing data for ephemeral SIP
//! credentials (a "session"). Negotiation happens once per call attempt:
//! the resulting [`SessionCredentials`] are exclusively owned by the
//! orchestrator for the duration of that attempt, discarded on hang-up or
//! failure, and never reused.
//!
//! # Request Contract
//!
//! `POST {api_base}/session/create/{flow_id}/sips?token=...` with body
//! `{"routing-data": {...}, "client-data": {...}}`. The routing payload
//! carries the reserved `webphone-*` keys (requested queue, caller ANI,
//! caller name) plus any caller-supplied extras; reserved keys are never
//! silently overwritten by caller extras.
//!
//! A valid response is `200` with JSON containing `sessionId` and the
//! nested `connection.connection.sip.{server,port,username,password,destination}`
//! object. Anything else fails the attempt before the signaling engine is
//! ever touched.

use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::client::types::MakeCallParams;
use crate::error::{ClientError, ClientResult};

/// Reserved routing key for the requested destination queue
pub const ROUTING_KEY_REQUESTED: &str = "webphone-requested";
/// Reserved routing key for the caller's ANI (display number)
pub const ROUTING_KEY_ANI: &str = "webphone-ani";
/// Reserved routing key for the caller's display name
pub const ROUTING_KEY_NAME: &str = "webphone-name";

/// Ephemeral SIP credentials negotiated for one call attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    /// Backend session identifier, also used as the SIP identity user part
    pub session_id: String,
    /// SIP proxy host
    pub server_domain: String,
    /// SIP proxy port
    pub server_port: u16,
    /// Digest auth username
    pub username: String,
    /// Digest auth password
    pub password: String,
    /// Destination queue/address the invite is sent to
    pub destination: String,
    /// Caller display name, settable after negotiation
    pub caller_display_name: Option<String>,
}

/// Negotiates call sessions against the provider's REST backend
#[derive(Debug, Clone)]
pub struct SessionNegotiator {
    http: reqwest::Client,
    api_base: Url,
    flow_id: String,
    token: String,
}

impl SessionNegotiator {
    /// Create a negotiator for the given API base, flow, and token
    pub fn new(api_base: Url, flow_id: String, token: String, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::ConfigurationError {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { http, api_base, flow_id, token })
    }

    /// Exchange routing metadata for ephemeral SIP credentials.
    ///
    /// Fails with [`ClientError::SessionError`] on transport errors,
    /// non-200 responses, and malformed or incomplete session payloads.
    /// No signaling interaction has happened by the time this returns.
    pub async fn create_session(&self, params: &MakeCallParams) -> ClientResult<SessionCredentials> {
        let url = self.endpoint(&["session", "create", &self.flow_id, "sips"])?;

        let routing = build_routing_payload(params);
        let mut body = Map::new();
        body.insert("routing-data".to_string(), Value::Object(routing));
        if let Some(client_data) = &params.client_data {
            body.insert("client-data".to_string(), Value::Object(client_data.clone()));
        }

        debug!("Creating session for flow {}", self.flow_id);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&Value::Object(body))
            .send()
            .await
            .map_err(|e| ClientError::SessionError {
                reason: format!("session request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::SessionError {
                reason: format!("session request returned HTTP {}", status.as_u16()),
            });
        }

        let payload: Value = response.json().await.map_err(|e| ClientError::SessionError {
            reason: format!("session response is not valid JSON: {}", e),
        })?;

        extract_session(&payload)
    }

    /// Fetch the list of available call destinations (queues) for the flow.
    pub async fn get_call_destinations(&self) -> ClientResult<Vec<String>> {
        let url = self.endpoint(&["option", "read", &self.flow_id, "option.SA.queues"])?;

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ClientError::SessionError {
                reason: format!("destinations request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::SessionError {
                reason: format!("destinations request returned HTTP {}", status.as_u16()),
            });
        }

        response.json::<Vec<String>>().await.map_err(|e| ClientError::SessionError {
            reason: format!("destinations response is not a JSON string array: {}", e),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::ConfigurationError {
                message: format!("API base URL cannot carry a path: {}", self.api_base),
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }
}

/// Assemble the routing payload, protecting the reserved `webphone-*` keys.
///
/// Caller-supplied extra keys that collide with an already-populated
/// reserved key are skipped with a warning rather than silently
/// overwriting it.
fn build_routing_payload(params: &MakeCallParams) -> Map<String, Value> {
    let mut routing = Map::new();
    if let Some(queue) = &params.destination_queue {
        routing.insert(ROUTING_KEY_REQUESTED.to_string(), json!(queue));
    }
    if let Some(ani) = &params.caller_phone_number {
        routing.insert(ROUTING_KEY_ANI.to_string(), json!(ani));
    }
    if let Some(name) = &params.caller_full_name {
        routing.insert(ROUTING_KEY_NAME.to_string(), json!(name));
    }

    if let Some(extra) = &params.other_routing_data {
        for (key, value) in extra {
            if routing.contains_key(key) {
                warn!("Ignoring routing key '{}': reserved keys cannot be overridden", key);
                continue;
            }
            routing.insert(key.clone(), value.clone());
        }
    }

    routing
}

/// Parse the session payload into SIP-ready credentials.
fn extract_session(payload: &Value) -> ClientResult<SessionCredentials> {
    let session_id = required_str(payload, "sessionId")?;

    let sip = payload
        .pointer("/connection/connection/sip")
        .ok_or_else(|| missing("connection.connection.sip"))?;

    Ok(SessionCredentials {
        session_id,
        server_domain: required_str(sip, "server")?,
        server_port: parse_port(sip.get("port").ok_or_else(|| missing("port"))?)?,
        username: required_str(sip, "username")?,
        password: required_str(sip, "password")?,
        destination: required_str(sip, "destination")?,
        caller_display_name: None,
    })
}

/// Accept the port as a JSON number or a numeric string.
///
/// Both encodings must parse to the same integer; anything else is a
/// validation failure, never a default.
fn parse_port(value: &Value) -> ClientResult<u16> {
    let port = match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| ClientError::SessionError {
            reason: format!("session port is not a valid integer: {}", n),
        })?,
        Value::String(s) => s.parse::<u64>().map_err(|_| ClientError::SessionError {
            reason: format!("session port is not numeric: '{}'", s),
        })?,
        other => {
            return Err(ClientError::SessionError {
                reason: format!("session port has unexpected type: {}", other),
            })
        }
    };

    u16::try_from(port).map_err(|_| ClientError::SessionError {
        reason: format!("session port out of range: {}", port),
    })
}

fn required_str(value: &Value, field: &str) -> ClientResult<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(field))
}

fn missing(field: &str) -> ClientError {
    ClientError::SessionError {
        reason: format!("session response is missing '{}'", field),
    }
}
