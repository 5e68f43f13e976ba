use crate::error::{ClientError, Result};
use crate::types::LinkState;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

/// One logical bidirectional connection to the wager backend.
///
/// The link owns the socket lifecycle only; reconnect policy belongs to
/// the caller. After `open` succeeds, two background tasks bridge the
/// socket halves onto mpsc channels so the controller consumes frames
/// from a single queue in arrival order.
pub struct SessionLink {
    state: LinkState,
    outbound: Option<mpsc::UnboundedSender<Message>>,
    inbound: Option<mpsc::UnboundedReceiver<String>>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl SessionLink {
    pub fn new() -> Self {
        Self {
            state: LinkState::Idle,
            outbound: None,
            inbound: None,
            reader: None,
            writer: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Connect to `url`, bounded by `connect_timeout`.
    ///
    /// Valid from `Idle` or `Closed`, so a failed attempt can be
    /// retried. `open` holds the link exclusively for the whole
    /// attempt, so a `close` can only run before or after it; a
    /// half-open socket can never leak past a completed `close`.
    pub async fn open(&mut self, url: &str, connect_timeout: Duration) -> Result<()> {
        match self.state {
            LinkState::Idle | LinkState::Closed => {}
            LinkState::Connecting => {
                return Err(ClientError::Connection("open already in flight".to_string()));
            }
            LinkState::Open | LinkState::Closing => {
                return Err(ClientError::Connection("link already open".to_string()));
            }
        }
        self.state = LinkState::Connecting;

        let attempt = tokio::time::timeout(connect_timeout, connect_async(url)).await;

        let (ws, _) = match attempt {
            Err(_) => {
                self.state = LinkState::Closed;
                return Err(ClientError::ConnectTimeout(connect_timeout.as_millis() as u64));
            }
            Ok(Err(e)) => {
                self.state = LinkState::Closed;
                return Err(ClientError::Connection(e.to_string()));
            }
            Ok(Ok(pair)) => pair,
        };

        let (mut write, mut read) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

        // Writer: drains queued frames, closes the socket once the
        // sender side is dropped.
        self.writer = Some(tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if let Err(e) = write.send(msg).await {
                    warn!("websocket send failed: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
        }));

        // Reader: forwards text frames in arrival order, answers pings.
        let pong_tx = out_tx.clone();
        self.reader = Some(tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if in_tx.send(text).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Ping(data)) => {
                        let _ = pong_tx.send(Message::Pong(data));
                    }
                    Ok(Message::Close(_)) => {
                        debug!("websocket closed by peer");
                        break;
                    }
                    Err(e) => {
                        warn!("websocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }));

        self.outbound = Some(out_tx);
        self.inbound = Some(in_rx);
        self.state = LinkState::Open;
        Ok(())
    }

    /// Queue one outbound text frame. Only valid while `Open`.
    pub fn send(&mut self, text: String) -> Result<()> {
        if self.state != LinkState::Open {
            return Err(ClientError::NotConnected);
        }
        let delivered = self
            .outbound
            .as_ref()
            .map(|tx| tx.send(Message::Text(text)).is_ok())
            .unwrap_or(false);
        if delivered {
            Ok(())
        } else {
            // Writer task is gone, the socket is effectively dead.
            self.state = LinkState::Closed;
            self.outbound = None;
            Err(ClientError::NotConnected)
        }
    }

    /// Next inbound text frame, `None` once the connection has ended.
    pub async fn recv(&mut self) -> Option<String> {
        let rx = self.inbound.as_mut()?;
        let frame = rx.recv().await;
        if frame.is_none() {
            self.inbound = None;
            self.outbound = None;
            self.state = LinkState::Closed;
        }
        frame
    }

    /// Tear the connection down. Idempotent; safe mid-connect.
    pub fn close(&mut self) {
        if self.state == LinkState::Closed {
            return;
        }
        self.state = LinkState::Closing;
        // Dropping the sender lets the writer flush and close the socket.
        self.outbound = None;
        self.inbound = None;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.writer = None;
        self.state = LinkState::Closed;
    }
}

impl Default for SessionLink {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionLink {
    fn drop(&mut self) {
        self.close();
    }
}
