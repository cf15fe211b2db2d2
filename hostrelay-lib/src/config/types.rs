use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{LoggingConfig, TelemetryConfig, TimeoutConfig};

/// One upstream server belonging to a backend.
///
/// Immutable once placed into a pool; `address` is any form accepted by
/// [`crate::addr::normalize_address`] (`host`, `host:port`, or a `http(s)://` URL).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Server {
    pub address: String,
}

/// A named group of equivalent upstream servers, as configured.
///
/// All servers in one backend serve the same virtual host. An empty
/// `servers` list is valid: it means "host is known, no upstreams available"
/// and is never treated as "unknown host".
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct Backend {
    #[serde(default)]
    pub servers: Vec<Server>,
}

/// Top-level configuration, produced by the YAML loader or the CLI collaborator.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Port to listen on. `0` means "pick an ephemeral port" (recorded after bind).
    pub port: u16,
    /// Backend name (exact host match key, no port, lowercase) to its server group.
    #[serde(default)]
    pub backends: HashMap<String, Backend>,
    /// HTTP Basic auth users. Empty map disables authentication entirely.
    #[serde(default)]
    pub users: HashMap<String, String>,
    /// Verbose logging toggle, surfaced to the tracing filter at startup.
    #[serde(default)]
    pub debug: bool,
    /// Structured logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Upstream timeout / keep-alive configuration.
    #[serde(default)]
    pub timeout: TimeoutConfig,
    /// Metrics / observability configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
