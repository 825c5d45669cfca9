//! Dispatch context providing access to host APIs and settings.
//!
//! The dispatch context is passed to all strategies and metadata lookups and
//! provides the shared HTTP client together with endpoint and timeout
//! settings.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::host::http::HttpClient;
use crate::strategy::StrategyKind;

/// Default remote "send likes" endpoint.
pub const DEFAULT_ENDPOINT_URL: &str = "https://kryptorweb.com.br/api/likes";

/// Default public pass-through relay.
pub const DEFAULT_RELAY_URL: &str = "https://api.allorigins.win/raw";

// ============================================================================
// Relay Envelope
// ============================================================================

/// How the relay returns the forwarded body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum RelayEnvelope {
    /// The relay answers with the endpoint's raw body.
    #[default]
    Raw,
    /// The relay wraps the body as a string inside a JSON object field.
    Wrapped {
        /// Field holding the forwarded body (e.g., "contents").
        field: String,
    },
}

// ============================================================================
// Simulation Range
// ============================================================================

/// Bounds for locally synthesized results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRange {
    /// Lowest simulated "before" like count.
    pub likes_before_min: u64,
    /// Highest simulated "before" like count.
    pub likes_before_max: u64,
    /// Lowest simulated experience.
    pub exp_min: u64,
    /// Highest simulated experience.
    pub exp_max: u64,
    /// Lowest simulated level.
    pub level_min: u32,
    /// Highest simulated level.
    pub level_max: u32,
}

impl Default for SimulationRange {
    fn default() -> Self {
        Self {
            likes_before_min: 1_000,
            likes_before_max: 50_000,
            exp_min: 10_000,
            exp_max: 2_000_000,
            level_min: 10,
            level_max: 75,
        }
    }
}

// ============================================================================
// Dispatch Settings
// ============================================================================

/// Settings for dispatch operations.
#[derive(Clone)]
pub struct DispatchSettings {
    /// Remote "send likes" endpoint.
    pub endpoint_url: String,
    /// Pass-through relay base URL; the target goes in its `url` parameter.
    pub relay_url: String,
    /// Shape of the relay's answer.
    pub relay_envelope: RelayEnvelope,
    /// Fixed shared credential sent as the `key` parameter.
    pub credential: String,
    /// Side query for player nickname/region, if any.
    pub metadata_url: Option<String>,
    /// Bound for the proxied transport.
    pub proxied_timeout: Duration,
    /// Bound for the callback-channel transport.
    pub callback_timeout: Duration,
    /// Bound for the direct transport (per call mode).
    pub direct_timeout: Duration,
    /// Bound for the whole metadata lookup.
    pub metadata_timeout: Duration,
    /// How long to wait for a still-running metadata lookup once delivery is done.
    pub metadata_grace: Duration,
    /// Region reported by simulated results.
    pub default_region: String,
    /// Bounds for simulated results.
    pub simulation: SimulationRange,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
            relay_envelope: RelayEnvelope::Raw,
            credential: String::new(),
            metadata_url: None,
            proxied_timeout: Duration::from_secs(10),
            callback_timeout: Duration::from_secs(15),
            direct_timeout: Duration::from_secs(10),
            metadata_timeout: Duration::from_secs(8),
            metadata_grace: Duration::from_secs(1),
            default_region: "BR".to_string(),
            simulation: SimulationRange::default(),
        }
    }
}

impl std::fmt::Debug for DispatchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchSettings")
            .field("endpoint_url", &self.endpoint_url)
            .field("relay_url", &self.relay_url)
            .field("relay_envelope", &self.relay_envelope)
            .field("credential", &"***")
            .field("metadata_url", &self.metadata_url)
            .field("proxied_timeout", &self.proxied_timeout)
            .field("callback_timeout", &self.callback_timeout)
            .field("direct_timeout", &self.direct_timeout)
            .field("metadata_timeout", &self.metadata_timeout)
            .field("metadata_grace", &self.metadata_grace)
            .finish_non_exhaustive()
    }
}

impl DispatchSettings {
    /// Returns the attempt bound for a strategy kind.
    ///
    /// `None` for kinds that never touch the network.
    pub fn timeout_for(&self, kind: StrategyKind) -> Option<Duration> {
        match kind {
            StrategyKind::Proxied => Some(self.proxied_timeout),
            StrategyKind::CallbackChannel => Some(self.callback_timeout),
            // Both call modes share this one budget.
            StrategyKind::Direct => Some(self.direct_timeout),
            StrategyKind::Simulated => None,
        }
    }

    /// Sets the remote endpoint.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = url.into();
        self
    }

    /// Sets the relay base URL and envelope shape.
    pub fn with_relay(mut self, url: impl Into<String>, envelope: RelayEnvelope) -> Self {
        self.relay_url = url.into();
        self.relay_envelope = envelope;
        self
    }

    /// Sets the shared credential.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = credential.into();
        self
    }

    /// Sets the metadata side-query URL.
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = Some(url.into());
        self
    }

    /// Sets every transport timeout to the same value.
    pub fn with_transport_timeout(mut self, timeout: Duration) -> Self {
        self.proxied_timeout = timeout;
        self.callback_timeout = timeout;
        self.direct_timeout = timeout;
        self
    }

    /// Sets the metadata lookup bound and post-delivery grace.
    pub fn with_metadata_timing(mut self, timeout: Duration, grace: Duration) -> Self {
        self.metadata_timeout = timeout;
        self.metadata_grace = grace;
        self
    }
}

// ============================================================================
// Dispatch Context
// ============================================================================

/// Context provided to strategies and lookups.
pub struct DispatchContext {
    /// HTTP client with tracing.
    pub http: Arc<HttpClient>,
    /// Dispatch settings.
    pub settings: DispatchSettings,
}

impl DispatchContext {
    /// Creates a new context with default settings.
    pub fn new() -> Self {
        Self::with_settings(DispatchSettings::default())
    }

    /// Creates a context with custom settings.
    pub fn with_settings(settings: DispatchSettings) -> Self {
        Self {
            http: Arc::new(HttpClient::new()),
            settings,
        }
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> DispatchContextBuilder {
        DispatchContextBuilder::new()
    }
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("endpoint_url", &self.settings.endpoint_url)
            .field("relay_url", &self.settings.relay_url)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Dispatch Context Builder
// ============================================================================

/// Builder for constructing a `DispatchContext`.
pub struct DispatchContextBuilder {
    http: Option<Arc<HttpClient>>,
    settings: DispatchSettings,
}

impl DispatchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            http: None,
            settings: DispatchSettings::default(),
        }
    }

    /// Sets the HTTP client.
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the dispatch settings.
    pub fn settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the remote endpoint.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.settings.endpoint_url = url.into();
        self
    }

    /// Sets the shared credential.
    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.settings.credential = credential.into();
        self
    }

    /// Builds the dispatch context.
    pub fn build(self) -> DispatchContext {
        DispatchContext {
            http: self.http.unwrap_or_else(|| Arc::new(HttpClient::new())),
            settings: self.settings,
        }
    }
}

impl Default for DispatchContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
