//! Knitgraph CLI entry point

use clap::{Parser, Subcommand};
use knitgraph_core::DEFAULT_EXPORT_FILE;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "knitgraph")]
#[command(about = "Component dependency graph analysis and class exploration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./knitgraph.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Start from an exported graph instead of analyzing the project
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Class metadata provider to use (http or static)
    #[arg(long, global = true)]
    provider: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the visualization server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
    /// Build the project graph from the provider's base classes
    Analyze {
        /// Also write the graph to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recursively explore a class and its relationships
    Explore {
        /// Dotted class name, e.g. com.acme.UserService
        class: String,

        /// Also write the graph to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print graph statistics
    Stats,
    /// List detected issues
    Issues,
    /// Print nodes grouped by dependency level
    Levels,
    /// Show a node's one-hop neighbourhood
    Focus {
        /// Node id
        id: String,
    },
    /// Find nodes whose id contains a term
    Search {
        term: String,
    },
    /// Write the graph as JSON
    Export {
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("knitgraph={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Knitgraph v{}", env!("CARGO_PKG_VERSION"));

    if let Commands::Version = cli.command {
        println!("Knitgraph v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let ctx = commands::Context::load(cli.config, cli.input, cli.provider)?;

    match cli.command {
        Commands::Serve { port, host } => commands::serve(&ctx, host, port).await,
        Commands::Analyze { output } => commands::analyze(&ctx, output).await,
        Commands::Explore { class, output } => commands::explore(&ctx, &class, output).await,
        Commands::Stats => commands::stats(&ctx).await,
        Commands::Issues => commands::issues(&ctx).await,
        Commands::Levels => commands::levels(&ctx).await,
        Commands::Focus { id } => commands::focus(&ctx, &id).await,
        Commands::Search { term } => commands::search(&ctx, &term).await,
        Commands::Export { output } => commands::export(&ctx, &output).await,
        Commands::Version => Ok(()),
    }
}
