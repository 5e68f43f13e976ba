use serde::{Deserialize, Serialize};

/// Outgoing WebSocket frame to the wager backend.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Begin a session with the given stake. The amount travels
    /// verbatim as the user entered it.
    Start { amount: String, crypto: String },
    /// End the current session.
    Stop,
}

/// Incoming WebSocket frame from the wager backend.
///
/// The backend sends more fields than the client consumes (`price`,
/// `multiplier`, `crypto_amount`); serde skips them. Unknown frame
/// types collapse into `Unknown` instead of failing the decode.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    PriceUpdate {
        #[serde(default)]
        usd_value: Option<f64>,
    },
    CashoutResult {
        balance: Decimal,
        usd_amount: f64,
    },
    Error {
        message: String,
    },
    #[serde(other)]
    Unknown,
}

/// A decimal the backend encodes either as a JSON number or a
/// formatted string (cashout balances arrive as `"120.25"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Decimal {
    Num(f64),
    Text(String),
}

impl Decimal {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Decimal::Num(n) => Some(*n),
            Decimal::Text(s) => s.trim().parse().ok(),
        }
    }
}
