use crate::error::{ClientError, Result};
use crate::types::{ClientFrame, InboundEvent, ServerFrame};

/// Decode one inbound frame into a typed event.
///
/// Unknown frame types map to `InboundEvent::Ignored`; malformed JSON
/// or a recognized frame with an unusable payload is an error the
/// caller discards without touching session state.
pub fn decode_frame(text: &str) -> Result<InboundEvent> {
    let frame: ServerFrame =
        serde_json::from_str(text).map_err(|e| ClientError::Decode(e.to_string()))?;

    let event = match frame {
        ServerFrame::PriceUpdate { usd_value } => match usd_value {
            // A tick without a usable usd_value carries nothing to chart.
            Some(value) if value.is_finite() && value != 0.0 => {
                InboundEvent::PriceUpdate { value }
            }
            _ => InboundEvent::Ignored,
        },
        ServerFrame::CashoutResult { balance, usd_amount } => {
            let balance = balance
                .as_f64()
                .ok_or_else(|| ClientError::Decode("unparseable cashout balance".to_string()))?;
            InboundEvent::Cashout {
                balance,
                wagered_amount: usd_amount,
            }
        }
        ServerFrame::Error { message } => InboundEvent::ServerError { message },
        ServerFrame::Unknown => InboundEvent::Ignored,
    };

    Ok(event)
}

/// Encode a start command. The amount travels verbatim as entered.
pub fn encode_start(amount: &str, asset: &str) -> Result<String> {
    let frame = ClientFrame::Start {
        amount: amount.to_string(),
        crypto: asset.to_string(),
    };
    Ok(serde_json::to_string(&frame)?)
}

/// Encode a stop command.
pub fn encode_stop() -> Result<String> {
    Ok(serde_json::to_string(&ClientFrame::Stop)?)
}
