//! Client configuration
//!
//! Connection parameters for the provider backend plus the tunable
//! timings the orchestrator depends on. Defaults match production
//! behavior; tests shrink the delays.
//!
//! # Examples
//!
//! ```rust
//! use webphone_client_core::client::config::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("secret-token", "flow-7", "voice.example.com")
//!     .with_http_timeout(Duration::from_secs(5));
//!
//! assert_eq!(config.flow_id, "flow-7");
//! ```

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, ClientResult};

/// Configuration for a webphone client instance
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Authentication token for the provider API
    pub token: String,
    /// Flow identifier used for routing
    pub flow_id: String,
    /// Server domain hosting the API and the SIP proxy
    pub domain: String,
    /// Explicit API base URL; when unset it is derived from `domain`
    pub api_base: Option<Url>,
    /// Timeout for REST requests
    pub http_timeout: Duration,
    /// Hardware stabilization delay applied by the audio coordinator
    pub stabilization_delay: Duration,
    /// Grace period before the interruption monitor registers
    pub monitor_grace_period: Duration,
}

impl ClientConfig {
    /// Create a configuration with default timings
    pub fn new(
        token: impl Into<String>,
        flow_id: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            flow_id: flow_id.into(),
            domain: domain.into(),
            api_base: None,
            http_timeout: Duration::from_secs(10),
            stabilization_delay: Duration::from_millis(
                crate::audio::DEFAULT_STABILIZATION_DELAY_MS,
            ),
            monitor_grace_period: Duration::from_millis(
                crate::interruption::DEFAULT_MONITOR_GRACE_PERIOD_MS,
            ),
        }
    }

    /// Override the API base URL (useful against staging backends and in
    /// tests).
    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = Some(api_base);
        self
    }

    /// Override the REST request timeout
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Override the audio stabilization delay
    pub fn with_stabilization_delay(mut self, delay: Duration) -> Self {
        self.stabilization_delay = delay;
        self
    }

    /// Override the interruption monitor grace period
    pub fn with_monitor_grace_period(mut self, grace: Duration) -> Self {
        self.monitor_grace_period = grace;
        self
    }

    /// Resolve the API base URL for this configuration
    pub fn api_base_url(&self) -> ClientResult<Url> {
        match &self.api_base {
            Some(base) => Ok(base.clone()),
            None => {
                let raw = format!("https://{}/webphone-api/api", self.domain);
                Url::parse(&raw).map_err(|e| ClientError::ConfigurationError {
                    message: format!("invalid domain '{}': {}", self.domain, e),
                })
            }
        }
    }
}
