use std::env;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket endpoint of the wager backend.
    pub ws_url: String,
    /// Asset code sent with start commands.
    pub asset: String,
    /// Bound on how long a connect attempt may take (ms).
    pub connect_timeout_ms: u64,
    /// Maximum number of retained chart samples.
    pub series_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            ws_url: env::var("STAKELINE_WS_URL")
                .unwrap_or_else(|_| "ws://localhost:8080/ws/".to_string()),
            asset: env::var("STAKELINE_ASSET").unwrap_or_else(|_| "sol".to_string()),
            connect_timeout_ms: env::var("CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            series_capacity: env::var("SERIES_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(101),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
