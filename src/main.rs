use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use relay_pong::config::NodeConfig;
use relay_pong::game::constants::paddle::NUDGE;
use relay_pong::game::inbox::{Inbox, InboxSender, NodeCommand};
use relay_pong::game::render::TracingRenderer;
use relay_pong::game::state::NodeRole;
use relay_pong::metrics::Metrics;
use relay_pong::net::game_session::{run_game_loop, NodeSession};
use relay_pong::net::link::Link;
use relay_pong::net::tcp::TcpLink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Relay Pong v{}", env!("CARGO_PKG_VERSION"));

    let config = NodeConfig::load_or_default();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    info!(
        "Configuration loaded: role={}, tick={}ms, settle={}ms",
        config.role, config.tick_ms, config.settle_ms
    );

    let inbox = Inbox::default();
    let link: Arc<dyn Link> = match config.role {
        NodeRole::Host => Arc::new(TcpLink::listen(config.bind_socket(), inbox.sender()).await?),
        NodeRole::Guest => Arc::new(TcpLink::connect(config.peer_address, inbox.sender()).await?),
    };

    let metrics = Arc::new(Metrics::new());
    let session = NodeSession::new(
        config.game_loop_config(),
        link,
        inbox,
        Box::new(TracingRenderer),
        metrics.clone(),
    );

    tokio::spawn(read_paddle_input(session.inbox_sender()));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    let tick = config.game_loop_config().tick;
    tokio::select! {
        result = run_game_loop(session, tick) => {
            if let Err(e) = result {
                error!("Node halted: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown => {
            info!("Shutting down...");
        }
    }

    info!("Node stopped: {}", metrics.summary());
    Ok(())
}

/// Paddle control from stdin: `u`/`d` nudge, a number sets the row
async fn read_paddle_input(inbox: InboxSender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Input error: {}", e);
                break;
            }
        };

        let command = match line.trim() {
            "u" => NodeCommand::NudgePaddle(-NUDGE),
            "d" => NodeCommand::NudgePaddle(NUDGE),
            other => match other.parse::<i32>() {
                Ok(y) => NodeCommand::MovePaddle(y),
                Err(_) => {
                    debug!("Ignoring input '{}'", other);
                    continue;
                }
            },
        };

        if let Err(e) = inbox.try_send(command) {
            warn!("Dropped paddle input: {}", e);
        }
    }

    debug!("Input closed");
}
