//! Oracle Arena - unified CLI
//!
//! Serves the HTTP API, runs a console game, or classifies a single board.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use axum::body::Body;
use axum::http::Request;
use clap::Parser;
use cli::{Cli, Command};
use oracle_arena::{ArenaConfig, DEFAULT_SESSION_ID, Session, SessionStore, router, run_console};
use oracle_board::{Board, classify};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_server(config, host, port).await,
        Command::Play { config, seed } => run_play(config, seed),
        Command::Classify { board } => run_classify(&board),
    }
}

/// Run the HTTP API until the process is stopped
#[instrument(skip_all)]
async fn run_server(
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ArenaConfig::load(config.as_deref())?.with_server(host, port);
    let oracles = Arc::new(config.build_registry()?);
    let store = SessionStore::new(oracles, *config.session());

    let app = router(store).layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
        info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
        req
    }));

    let addr = (config.server().host().as_str(), *config.server().port());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %listener.local_addr()?,
        "Server ready, default session is {:?}",
        DEFAULT_SESSION_ID
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Run a console game on stdin/stdout
fn run_play(config: Option<PathBuf>, seed: Option<u64>) -> Result<()> {
    // Logs go to stderr so they never interleave with the board.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ArenaConfig::load(config.as_deref())?.with_seed(seed);
    let oracles = Arc::new(config.build_registry()?);
    let mut session = Session::new(DEFAULT_SESSION_ID.to_string(), oracles, *config.session());

    let stdin = std::io::stdin();
    run_console(&mut session, stdin.lock(), std::io::stdout())?;
    Ok(())
}

/// Print the label of one board
fn run_classify(board: &str) -> Result<()> {
    let board: Board = board.parse()?;
    let progress = classify(&board);
    println!("{}", board);
    println!("{}", progress.label());
    if let Some(outcome) = progress.outcome() {
        println!("outcome: {}", outcome);
    }
    Ok(())
}
