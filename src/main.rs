//! exportmap CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "exportmap")]
#[command(about = "Find where a component library defines its exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML config file (source_dir, cache_ttl_secs, workers)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a package and print its export index
    Scan {
        /// Package root (the directory holding package.json)
        package: PathBuf,
    },
    /// Print the record defining an export
    Find {
        package: PathBuf,
        name: String,
    },
    /// Print an export's record and the text of its defining file
    Source {
        package: PathBuf,
        name: String,
    },
    /// List exports, optionally of one kind
    List {
        package: PathBuf,

        /// variable, function, class, interface, type, enum or reexport
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Locate an installed package from a project directory
    Locate {
        project: PathBuf,
        name: String,
    },
    /// List CSS classes defined under a directory
    Css {
        dir: PathBuf,

        /// Only keep classes starting with this prefix
        #[arg(short, long, default_value = "")]
        prefix: String,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "exportmap={log_level},exportmap_core={log_level},exportmap_indexer={log_level}"
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    tracing::debug!("Using {:?}", config);

    match cli.command {
        Commands::Scan { package } => commands::scan(&config, package).await,
        Commands::Find { package, name } => commands::find(&config, package, &name).await,
        Commands::Source { package, name } => commands::source(&config, package, &name).await,
        Commands::List { package, kind } => commands::list(&config, package, kind.as_deref()).await,
        Commands::Locate { project, name } => commands::locate(project, &name),
        Commands::Css { dir, prefix } => commands::css(dir, &prefix),
        Commands::Version => {
            println!("exportmap v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
