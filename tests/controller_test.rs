//! Integration tests for the session controller against a loopback
//! WebSocket server

use futures_util::{SinkExt, StreamExt};
use stakeline::types::{ErrorKind, InboundEvent, LinkState, SessionPhase};
use stakeline::{ClientError, Config, SessionController};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

fn test_config(ws_url: String) -> Config {
    Config {
        ws_url,
        asset: "sol".to_string(),
        connect_timeout_ms: 2_000,
        series_capacity: 101,
    }
}

/// Spawn a single-connection echo-style server. Returns the ws URL, a
/// receiver of frames the client sent, and a sender that pushes frames
/// to the client.
async fn spawn_server() -> (
    String,
    mpsc::UnboundedReceiver<String>,
    mpsc::UnboundedSender<String>,
) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (mut write, mut read) = ws.split();
        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        let _ = in_tx.send(text);
                    }
                    Some(Ok(_)) => {}
                    _ => break,
                },
                frame = out_rx.recv() => match frame {
                    Some(text) => {
                        if write.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    });

    (format!("ws://{}", addr), in_rx, out_tx)
}

async fn recv_frame(rx: &mut mpsc::UnboundedReceiver<String>) -> serde_json::Value {
    let text = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for client frame")
        .expect("server connection dropped");
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn test_connect_reaches_connected_phase() {
    let (url, _in_rx, _out_tx) = spawn_server().await;
    let mut controller = SessionController::new(test_config(url));

    controller.connect().await.unwrap();

    assert_eq!(controller.phase(), SessionPhase::Connected);
    let status = controller.status();
    assert_eq!(status.link, LinkState::Open);
    assert_eq!(status.last_error, None);
}

#[tokio::test]
async fn test_empty_start_is_noop() {
    let (url, mut in_rx, _out_tx) = spawn_server().await;
    let mut controller = SessionController::new(test_config(url));
    controller.connect().await.unwrap();

    // Empty stake: nothing sent, phase unchanged.
    assert!(!controller.issue_start("").unwrap());
    assert!(!controller.issue_start("   ").unwrap());
    assert_eq!(controller.phase(), SessionPhase::Connected);

    // A real start follows; the first frame the server sees must be
    // that start command, proving the empty ones sent nothing.
    assert!(controller.issue_start("50").unwrap());
    assert_eq!(controller.phase(), SessionPhase::SessionActive);

    let frame = recv_frame(&mut in_rx).await;
    assert_eq!(frame["type"], "start");
    assert_eq!(frame["amount"], "50");
    assert_eq!(frame["crypto"], "sol");

    controller.issue_stop().unwrap();
    assert_eq!(controller.phase(), SessionPhase::Connected);

    let frame = recv_frame(&mut in_rx).await;
    assert_eq!(frame["type"], "stop");
}

#[tokio::test]
async fn test_price_and_cashout_scenario() {
    let (url, mut in_rx, out_tx) = spawn_server().await;
    let mut controller = SessionController::new(test_config(url));
    controller.connect().await.unwrap();

    controller.issue_start("50").unwrap();
    let frame = recv_frame(&mut in_rx).await;
    assert_eq!(frame["type"], "start");

    out_tx
        .send(r#"{"type":"price_update","usd_value":100.5}"#.to_string())
        .unwrap();
    let event = controller.process_next().await.unwrap();
    assert_eq!(event, InboundEvent::PriceUpdate { value: 100.5 });

    let series = controller.current_series();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].value, 100.5);

    out_tx
        .send(r#"{"type":"cashout_result","balance":"120.25","usd_amount":50}"#.to_string())
        .unwrap();
    let event = controller.process_next().await.unwrap();
    assert!(matches!(event, InboundEvent::Cashout { .. }));

    let balances = controller.current_balances();
    assert_eq!(balances.wallet_balance, 120.25);
    assert_eq!(balances.wagered_amount, 50.0);

    // Cashout implicitly ends the active session.
    assert_eq!(controller.phase(), SessionPhase::Connected);
}

#[tokio::test]
async fn test_unknown_frames_are_skipped_in_stream() {
    let (url, _in_rx, out_tx) = spawn_server().await;
    let mut controller = SessionController::new(test_config(url));
    controller.connect().await.unwrap();

    out_tx
        .send(r#"{"type":"heartbeat","seq":1}"#.to_string())
        .unwrap();
    out_tx
        .send(r#"{"type":"price_update","usd_value":42.0}"#.to_string())
        .unwrap();

    // process_next skips the unknown frame and yields the tick.
    let event = controller.process_next().await.unwrap();
    assert_eq!(event, InboundEvent::PriceUpdate { value: 42.0 });
}

#[tokio::test]
async fn test_commands_while_disconnected_are_rejected() {
    let mut controller = SessionController::new(test_config("ws://127.0.0.1:1/".to_string()));

    assert!(matches!(
        controller.issue_start("50"),
        Err(ClientError::NotConnected)
    ));
    assert!(matches!(
        controller.issue_stop(),
        Err(ClientError::NotConnected)
    ));
    assert_eq!(controller.phase(), SessionPhase::NotConnected);
    assert_eq!(controller.status().last_error, Some(ErrorKind::NotConnected));
}

#[tokio::test]
async fn test_malformed_frames_leave_state_unchanged() {
    let mut controller = SessionController::new(test_config("ws://unused/".to_string()));

    assert!(controller.apply_frame("not json at all").is_none());
    assert!(controller
        .apply_frame(r#"{"type":"cashout_result","balance":"oops","usd_amount":1}"#)
        .is_none());

    assert!(controller.current_series().is_empty());
    assert_eq!(controller.current_balances().wallet_balance, 0.0);
    assert_eq!(controller.current_balances().wagered_amount, 0.0);
    assert_eq!(controller.status().discarded_frames, 2);
    assert_eq!(controller.status().last_error, Some(ErrorKind::Decode));

    // The controller stays usable after bad frames.
    let event = controller.apply_frame(r#"{"type":"price_update","usd_value":9.5}"#);
    assert_eq!(event, Some(InboundEvent::PriceUpdate { value: 9.5 }));
    assert_eq!(controller.current_series().len(), 1);
}

#[tokio::test]
async fn test_server_error_frame_only_touches_status() {
    let mut controller = SessionController::new(test_config("ws://unused/".to_string()));

    let event = controller.apply_frame(r#"{"type":"error","message":"No active bet"}"#);
    assert!(matches!(event, Some(InboundEvent::ServerError { .. })));

    // Series, balances and counters stay untouched; only the status
    // record carries the backend's reply.
    assert!(controller.current_series().is_empty());
    assert_eq!(controller.current_balances().wallet_balance, 0.0);
    let status = controller.status();
    assert_eq!(status.discarded_frames, 0);
    assert_eq!(status.last_error, None);
    assert_eq!(status.last_server_error.as_deref(), Some("No active bet"));

    // A later failure overwrites the record.
    controller.apply_frame(r#"{"type":"error","message":"Invalid amount"}"#);
    assert_eq!(
        controller.status().last_server_error.as_deref(),
        Some("Invalid amount")
    );
}

#[tokio::test]
async fn test_close_twice_is_safe() {
    let (url, _in_rx, _out_tx) = spawn_server().await;
    let mut controller = SessionController::new(test_config(url));
    controller.connect().await.unwrap();

    controller.close();
    assert_eq!(controller.status().link, LinkState::Closed);
    assert_eq!(controller.phase(), SessionPhase::NotConnected);

    controller.close();
    assert_eq!(controller.status().link, LinkState::Closed);
}

#[tokio::test]
async fn test_connect_timeout_against_silent_endpoint() {
    // Accept queue exists but nobody completes the handshake.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = test_config(format!("ws://{}", addr));
    config.connect_timeout_ms = 300;
    let mut controller = SessionController::new(config);

    let err = controller.connect().await.unwrap_err();
    assert!(matches!(err, ClientError::ConnectTimeout(300)));
    assert_eq!(controller.phase(), SessionPhase::NotConnected);
    assert_eq!(controller.status().last_error, Some(ErrorKind::Connection));

    drop(listener);
}

#[tokio::test]
async fn test_connect_retries_after_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        // First attempt: accept and immediately drop, failing the
        // client handshake. Second attempt: serve normally.
        let (first, _) = listener.accept().await.unwrap();
        drop(first);

        let (second, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(second).await.unwrap();
        let (_write, mut read) = ws.split();
        while let Some(Ok(_)) = read.next().await {}
    });

    let mut controller = SessionController::new(test_config(format!("ws://{}", addr)));

    assert!(controller.connect().await.is_err());
    assert_eq!(controller.phase(), SessionPhase::NotConnected);

    controller.connect().await.unwrap();
    assert_eq!(controller.phase(), SessionPhase::Connected);
    assert_eq!(controller.status().link, LinkState::Open);
}

#[tokio::test]
async fn test_disconnect_drops_to_not_connected() {
    let (url, _in_rx, out_tx) = spawn_server().await;
    let mut controller = SessionController::new(test_config(url));
    controller.connect().await.unwrap();
    controller.issue_start("25").unwrap();

    // Closing the server side ends the stream; process_next reports it.
    drop(out_tx);
    drop(_in_rx);

    let ended = tokio::time::timeout(Duration::from_secs(5), controller.process_next())
        .await
        .unwrap();
    assert!(ended.is_none());
    assert_eq!(controller.phase(), SessionPhase::NotConnected);
    assert_eq!(controller.status().link, LinkState::Closed);
    assert_eq!(controller.status().last_error, Some(ErrorKind::Connection));
}
