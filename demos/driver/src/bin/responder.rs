//! Loss-simulating RDP responder for exercising the sender.

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use rdp_sender::server::{Responder, ResponderBuilder};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Arguments {
    #[arg(long, default_value = "0.0.0.0:22345")]
    bind: SocketAddr,
    /// Seed for loss simulation; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Fixed receive window to advertise instead of the sender's buffer size.
    #[arg(long)]
    window: Option<u32>,
    /// Exit after this many sessions have closed; serve forever when omitted.
    #[arg(long)]
    sessions: Option<u64>,
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Arguments::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let mut builder = ResponderBuilder::new().bind_addr(args.bind);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if let Some(window) = args.window {
        builder = builder.recv_window(window);
    }

    let mut responder = match Responder::bind(builder.build()).await {
        Ok(responder) => responder,
        Err(e) => {
            error!(error = %e, "failed to start responder");
            return ExitCode::FAILURE;
        }
    };
    if let Ok(addr) = responder.local_addr() {
        info!(%addr, "listening");
    }

    let result = match args.sessions {
        Some(count) => responder.serve_sessions(count).await.map(|stats| {
            info!(?stats, "done");
        }),
        None => responder.serve().await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "responder failed");
            ExitCode::FAILURE
        }
    }
}
