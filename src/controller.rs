use crate::config::Config;
use crate::error::Result;
use crate::link::SessionLink;
use crate::protocol::{decode_frame, encode_start, encode_stop};
use crate::services::{PriceSeries, WalletState};
use crate::types::{
    BalanceSnapshot, ControllerStatus, ErrorKind, InboundEvent, Sample, SessionPhase,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Orchestrates the link, the rolling price series and the wallet.
///
/// Single-writer discipline: only the controller mutates the series
/// and wallet, and each inbound frame is fully decoded and dispatched
/// before the next one is handled.
pub struct SessionController {
    config: Config,
    link: SessionLink,
    series: PriceSeries,
    wallet: WalletState,
    phase: SessionPhase,
    last_error: Option<ErrorKind>,
    last_server_error: Option<String>,
    discarded_frames: u64,
}

impl SessionController {
    /// Create a controller with an unopened link.
    pub fn new(config: Config) -> Self {
        let series = PriceSeries::new(config.series_capacity);
        Self {
            config,
            link: SessionLink::new(),
            series,
            wallet: WalletState::new(),
            phase: SessionPhase::NotConnected,
            last_error: None,
            last_server_error: None,
            discarded_frames: 0,
        }
    }

    /// Open the connection. May be retried after a failure.
    pub async fn connect(&mut self) -> Result<()> {
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        match self.link.open(&self.config.ws_url, timeout).await {
            Ok(()) => {
                info!("connected to {}", self.config.ws_url);
                self.phase = SessionPhase::Connected;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("connect failed: {}", e);
                self.phase = SessionPhase::NotConnected;
                self.last_error = Some(e.kind());
                Err(e)
            }
        }
    }

    /// Send a start command with the user-entered stake.
    ///
    /// An empty amount is a no-op (`Ok(false)`), mirroring the input
    /// guard in the UI. Returns `NotConnected` instead of silently
    /// dropping the command when the link is down.
    pub fn issue_start(&mut self, amount: &str) -> Result<bool> {
        if amount.trim().is_empty() {
            debug!("start ignored: empty amount");
            return Ok(false);
        }
        let frame = encode_start(amount, &self.config.asset)?;
        self.send_command(frame)?;
        self.phase = SessionPhase::SessionActive;
        info!("session started with stake {}", amount);
        Ok(true)
    }

    /// Send a stop command, settling the session server-side.
    pub fn issue_stop(&mut self) -> Result<()> {
        let frame = encode_stop()?;
        self.send_command(frame)?;
        if self.phase == SessionPhase::SessionActive {
            self.phase = SessionPhase::Connected;
        }
        info!("session stop issued");
        Ok(())
    }

    fn send_command(&mut self, frame: String) -> Result<()> {
        match self.link.send(frame) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.phase = SessionPhase::NotConnected;
                self.last_error = Some(e.kind());
                Err(e)
            }
        }
    }

    /// Decode and dispatch one raw frame.
    ///
    /// Malformed frames are discarded without touching session state;
    /// a single bad frame never terminates the session.
    pub fn apply_frame(&mut self, text: &str) -> Option<InboundEvent> {
        match decode_frame(text) {
            Ok(InboundEvent::Ignored) => {
                debug!("ignored frame: {}", text);
                None
            }
            Ok(event) => {
                self.dispatch(&event);
                Some(event)
            }
            Err(e) => {
                warn!("discarded undecodable frame: {}", e);
                self.discarded_frames += 1;
                self.last_error = Some(ErrorKind::Decode);
                None
            }
        }
    }

    fn dispatch(&mut self, event: &InboundEvent) {
        match event {
            InboundEvent::PriceUpdate { value } => {
                // Chart time is client receipt time; the backend does
                // not supply a tick timestamp.
                let timestamp = chrono::Utc::now().timestamp_millis();
                self.series.push(Sample {
                    timestamp,
                    value: *value,
                });
                debug!("tick: {}", value);
            }
            InboundEvent::Cashout {
                balance,
                wagered_amount,
            } => {
                self.wallet.apply_cashout(*balance, *wagered_amount);
                // A cashout implicitly ends the active session.
                if self.phase == SessionPhase::SessionActive {
                    self.phase = SessionPhase::Connected;
                }
                info!("cashout settled: balance {}, wagered {}", balance, wagered_amount);
            }
            InboundEvent::ServerError { message } => {
                warn!("server error: {}", message);
                self.last_server_error = Some(message.clone());
            }
            InboundEvent::Ignored => {}
        }
    }

    /// Await and dispatch frames until the next state-changing event.
    ///
    /// Returns `None` when the connection has ended; the controller
    /// drops back to `NotConnected` and `connect` may be retried.
    pub async fn process_next(&mut self) -> Option<InboundEvent> {
        loop {
            match self.link.recv().await {
                Some(text) => {
                    if let Some(event) = self.apply_frame(&text) {
                        return Some(event);
                    }
                }
                None => {
                    if self.phase != SessionPhase::NotConnected {
                        warn!("connection ended");
                        self.phase = SessionPhase::NotConnected;
                        self.last_error = Some(ErrorKind::Connection);
                    }
                    return None;
                }
            }
        }
    }

    /// Run the dispatch loop until the connection ends.
    pub async fn run(&mut self) {
        while self.process_next().await.is_some() {}
    }

    /// Ordered chart samples, oldest first.
    pub fn current_series(&self) -> Vec<Sample> {
        self.series.snapshot()
    }

    /// Current settled balances.
    pub fn current_balances(&self) -> BalanceSnapshot {
        self.wallet.snapshot()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Read-only status for the presentation layer.
    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            link: self.link.state(),
            phase: self.phase,
            last_error: self.last_error,
            last_server_error: self.last_server_error.clone(),
            discarded_frames: self.discarded_frames,
        }
    }

    /// Close the connection. Idempotent.
    pub fn close(&mut self) {
        self.link.close();
        self.phase = SessionPhase::NotConnected;
    }
}
