use stakeline::{Config, SessionController};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stakeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let stake = std::env::args().nth(1);
    info!("Starting stakeline client against {}", config.ws_url);

    let mut controller = SessionController::new(config);

    loop {
        if let Err(e) = controller.connect().await {
            warn!("connect failed: {}, retrying...", e);
            tokio::time::sleep(Duration::from_secs(5)).await;
            continue;
        }

        match stake {
            Some(ref amount) => {
                if !controller.issue_start(amount)? {
                    info!("empty stake given, listening only");
                }
            }
            None => info!("no stake given, listening only"),
        }

        let mut shutdown = false;
        tokio::select! {
            _ = controller.run() => {}
            _ = tokio::signal::ctrl_c() => {
                shutdown = true;
            }
        }

        if shutdown {
            info!("shutting down");
            let _ = controller.issue_stop();
            controller.close();
            break;
        }

        warn!("disconnected, reconnecting...");
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    let balances = controller.current_balances();
    info!(
        "final balance: {:.2} (wagered {:.2})",
        balances.wallet_balance, balances.wagered_amount
    );

    Ok(())
}
