//! # Meme Canvas CLI
//!
//! Replays a drawing script and writes the exported meme.

use canvas_cli::CliArgs;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,canvas_cli=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,canvas_cli=debug,canvas_renderer=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

// The canvas is single-threaded, so the runtime is too.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    tracing::info!("Starting meme-canvas {}", canvas_renderer::VERSION);

    let outcome = canvas_cli::run(&args).await?;

    for message in &outcome.errors {
        eprintln!("{message}");
    }
    tracing::info!(
        "{} export(s), sizes reported: {:?}",
        outcome.exports,
        outcome.sizes
    );
    Ok(())
}
