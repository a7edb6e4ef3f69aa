mod constants;
mod error;
mod network;
mod routes;
mod state;

use std::{net::SocketAddr, time::Duration};

use clap::Parser;
use constants::{DEFAULT_LISTEN, DEFAULT_MAX_IN_FLIGHT, DEFAULT_PEER_TIMEOUT_MS};
use network::PeerClient;
use routes::NewNodeBody;
use state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "supplychain-node")]
#[command(about = "Supply-chain ledger node with proof-of-work and longest-chain consensus")]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:3001
    #[arg(long, default_value = DEFAULT_LISTEN)]
    listen: String,

    /// URL peers use to reach this node; defaults to http://<listen>
    #[arg(long)]
    public_url: Option<String>,

    /// Peer to register at startup and announce ourselves to (repeatable)
    #[arg(long = "peer")]
    peers: Vec<String>,

    /// Deadline for each request sent to a peer, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PEER_TIMEOUT_MS)]
    peer_timeout_ms: u64,

    /// Maximum concurrent requests per peer fan-out
    #[arg(long, default_value_t = DEFAULT_MAX_IN_FLIGHT)]
    max_in_flight: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let args = Args::parse();
    let addr: SocketAddr = args.listen.parse()?;
    let public_url = args
        .public_url
        .clone()
        .unwrap_or_else(|| format!("http://{addr}"));

    let peers = PeerClient::new(
        Duration::from_millis(args.peer_timeout_ms),
        args.max_in_flight,
    )?;
    let state = AppState::new(&public_url, peers);
    let added = state
        .registry_mut()
        .register_all(args.peers.iter().map(String::as_str));
    if added > 0 {
        info!(added, "registered bootstrap peers");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("supplychain-node listening on http://{addr} as {public_url}");

    if !args.peers.is_empty() {
        let announcer = state.clone();
        let bootstrap = args.peers.clone();
        tokio::spawn(async move {
            let report = announcer
                .peers
                .post_all(
                    bootstrap,
                    "/register-and-broadcast-node",
                    NewNodeBody {
                        new_node_url: public_url,
                    },
                )
                .await;
            if report.delivered == 0 {
                warn!(failed = ?report.failed, "no bootstrap peer accepted our announcement");
            }
        });
    }

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
