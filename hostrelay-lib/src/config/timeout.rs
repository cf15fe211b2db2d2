use serde::Deserialize;

/// Timeout configuration for upstream connections and graceful shutdown
#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    /// Dial timeout for establishing a TCP connection to an upstream, in milliseconds.
    /// Default: 5000 (5 seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,
    /// Per-call timeout for a full upstream request/response round trip, in seconds.
    /// Default: 30 seconds
    #[serde(default = "default_request_timeout")]
    pub request_secs: u64,
    /// Graceful shutdown timeout in seconds: how long `Stop` waits for in-flight
    /// connections before the process exits.
    /// Default: 30
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_secs: u64,
    /// HTTP/1.1 keep-alive configuration for upstream connections.
    #[serde(default)]
    pub keep_alive: KeepAliveConfig,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            request_secs: default_request_timeout(),
            shutdown_secs: default_shutdown_timeout(),
            keep_alive: KeepAliveConfig::default(),
        }
    }
}

/// Keep-alive configuration for pooled upstream connections.
#[derive(Debug, Deserialize, Clone)]
pub struct KeepAliveConfig {
    /// Enable keep-alive (persistent connections) to upstreams.
    /// Default: true
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Keep-alive timeout in seconds.
    /// Default: 60 seconds
    #[serde(default = "default_keep_alive_timeout")]
    pub timeout_secs: u64,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self { enabled: true, timeout_secs: default_keep_alive_timeout() }
    }
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_keep_alive_timeout() -> u64 {
    60
}
