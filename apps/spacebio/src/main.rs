//! # SpaceBio - Space Biology Publication Search
//!
//! The main binary for the SpaceBio search dashboard.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for searching the catalog
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     apps/spacebio (THE BINARY)                  │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │  Action Runner   │    │
//! │  │  (clap)     │    │   (axum)    │    │  (tokio timers)  │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │ spacebio-core │                           │
//! │                    │  (THE LOGIC)  │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! spacebio server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! spacebio search radiation --mission mars
//! spacebio show 1 --tab knowledge-graph
//! spacebio cite 1 --style bibtex
//! ```

use clap::Parser;
use spacebio::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // SPACEBIO_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SPACEBIO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "spacebio=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the SpaceBio startup banner.
fn print_banner() {
    println!(
        r#"
   ____                       ____  _
  / ___| _ __   __ _  ___ ___| __ )(_) ___
  \___ \| '_ \ / _` |/ __/ _ \  _ \| |/ _ \
   ___) | |_) | (_| | (_|  __/ |_) | | (_) |
  |____/| .__/ \__,_|\___\___|____/|_|\___/
        |_|

  Space Biology Publication Search v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
