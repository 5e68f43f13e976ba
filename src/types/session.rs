use serde::{Deserialize, Serialize};

/// A single charted point: local receipt time paired with the USD value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since epoch, assigned when the tick arrives.
    pub timestamp: i64,
    /// USD value of the wager at this tick.
    pub value: f64,
}

/// Read-only balance view for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub wallet_balance: f64,
    pub wagered_amount: f64,
}

/// Controller phase over the wager session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotConnected,
    Connected,
    SessionActive,
}

/// Lifecycle states of the underlying connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Coarse error classification surfaced as read-only status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connection,
    Decode,
    NotConnected,
}

/// Connection and session status for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerStatus {
    pub link: LinkState,
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorKind>,
    /// Most recent backend-reported command failure, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_server_error: Option<String>,
    pub discarded_frames: u64,
}

/// Typed inbound event produced by the decode step.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// New price tick.
    PriceUpdate { value: f64 },
    /// Session settled by the backend.
    Cashout { balance: f64, wagered_amount: f64 },
    /// Backend-reported command failure (invalid amount, no active bet).
    ServerError { message: String },
    /// Recognized but intentionally dropped frame.
    Ignored,
}
