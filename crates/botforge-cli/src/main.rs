mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{generate::GenerateSubcommand, project::ProjectSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "botforge",
    about = "Generate command-based robot code from a botforge project model",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from botforge.yaml or the project file)
    #[arg(long, global = true, env = "BOTFORGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a botforge workspace in the current directory
    Init,

    /// Emit Java fragments from the project model
    Generate {
        #[command(subcommand)]
        subcommand: GenerateSubcommand,
    },

    /// Check the config and project model for problems
    Validate,

    /// Inspect the project model
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Generate { subcommand } => cmd::generate::run(&root, subcommand, cli.json),
        Commands::Validate => cmd::validate::run(&root, cli.json),
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
