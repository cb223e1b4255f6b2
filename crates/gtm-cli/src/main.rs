mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gtm",
    about = "GTM mission control: run the orchestration agent and inspect its state",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .gtm/ or .git/)
    #[arg(long, global = true, env = "GTM_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config and seed the state store
    Init {
        /// Overwrite an existing .gtm/config.yaml
        #[arg(long)]
        force: bool,
    },

    /// Print the persisted mission state without starting the server
    Status,

    /// Activate the orchestration agent and serve the dashboard API
    Serve(cmd::serve::ServeArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { force } => cmd::init::run(&root, force),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Serve(args) => cmd::serve::run(&root, args),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
