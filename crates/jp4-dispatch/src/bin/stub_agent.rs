//! Minimal JP4Agent stand-in: serves the CLI service and echoes commands.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use jp4_dispatch::stub::{serve, StubAgent};
use tokio::net::TcpListener;

/// Echo agent for exercising the JP4Agent CLI without a dataplane
#[derive(Parser, Debug)]
#[command(name = "jp4-stub-agent", version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:53421")]
    listen: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    println!("CLI Server listening on {}", listener.local_addr()?);

    serve(listener, Arc::new(StubAgent::new()))
        .await
        .context("CLI server stopped")?;
    Ok(())
}
