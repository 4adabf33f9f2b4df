//! # SpaceBio CLI Module
//!
//! This module implements the CLI interface for SpaceBio.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `search` - Filter the catalog
//! - `show` - Show one publication on a detail tab
//! - `filters` - List facets with declared and live counts
//! - `cite` - Print a citation
//! - `graph` - Print a publication's knowledge graph

mod commands;

use crate::config::{AppConfig, load_catalog};
use clap::{Parser, Subcommand};
use spacebio_core::SpaceBioError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// SpaceBio - space biology publication search
///
/// Search NASA space biology papers, OSDR datasets and Task Book grants by
/// text, content type, mission and publication date.
#[derive(Parser, Debug)]
#[command(name = "spacebio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (default: ./spacebio.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to a JSON catalog replacing the builtin dataset
    #[arg(short = 'C', long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Filter the catalog
    Search {
        /// Free-text query over title, abstract, authors and tags
        query: Option<String>,

        /// Content type facet id (repeatable): research-papers, osdr-data, task-book-grants
        #[arg(short = 't', long = "category")]
        categories: Vec<String>,

        /// Mission facet id (repeatable): mars, moon, iss, deep-space
        #[arg(short, long = "mission")]
        missions: Vec<String>,

        /// Earliest publication date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Latest publication date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show a publication on one detail tab
    Show {
        /// Publication id
        id: u64,

        /// Tab: summary, overview, knowledge-graph, data
        #[arg(short, long, default_value = "summary")]
        tab: String,
    },

    /// List facets with declared and live counts
    Filters,

    /// Print a citation for a publication
    Cite {
        /// Publication id
        id: u64,

        /// Citation style: plain, bibtex
        #[arg(short, long, default_value = "plain")]
        style: String,
    },

    /// Print a publication's knowledge graph
    Graph {
        /// Publication id
        id: u64,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SpaceBioError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let catalog_path = cli.catalog.clone().or_else(|| config.catalog.path.clone());
    let catalog = load_catalog(catalog_path.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(catalog, config, host, port).await,
        Some(Commands::Search {
            query,
            categories,
            missions,
            from,
            to,
        }) => {
            let args = SearchArgs {
                query: query.unwrap_or_default(),
                categories,
                missions,
                from: from.unwrap_or_default(),
                to: to.unwrap_or_default(),
            };
            cmd_search(&catalog, &args, json_mode, cli.verbose)
        }
        Some(Commands::Show { id, tab }) => cmd_show(&catalog, id, &tab, json_mode),
        Some(Commands::Filters) => cmd_filters(&catalog, json_mode),
        Some(Commands::Cite { id, style }) => cmd_cite(&catalog, id, &style, json_mode),
        Some(Commands::Graph { id }) => cmd_graph(&catalog, id, json_mode),
        None => {
            // No subcommand - list everything
            cmd_search(&catalog, &SearchArgs::default(), json_mode, cli.verbose)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_flags_repeat() {
        let cli = Cli::try_parse_from([
            "spacebio",
            "--json-mode",
            "search",
            "radiation",
            "--mission",
            "mars",
            "-m",
            "deep-space",
            "--category",
            "osdr-data",
        ])
        .expect("parse");

        assert!(cli.json_mode);
        let Some(Commands::Search {
            query,
            categories,
            missions,
            ..
        }) = cli.command
        else {
            unreachable!("expected the search command");
        };
        assert_eq!(query.as_deref(), Some("radiation"));
        assert_eq!(missions, vec!["mars", "deep-space"]);
        assert_eq!(categories, vec!["osdr-data"]);
    }
}
