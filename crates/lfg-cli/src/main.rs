use clap::{Parser, Subcommand};

mod commands;
mod report;

use commands::run::SimArgs;

#[derive(Parser)]
#[command(
    name = "lfg",
    about = "LFG — dungeon queue simulator with a bounded instance pool",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Form parties from the role queues and run them through the dungeon pool.
    ///
    /// Values come from --config (an lfg.toml) when given, otherwise from the
    /// built-in scaffold; any flag overrides the corresponding value.
    Run {
        #[command(flatten)]
        sim: SimArgs,
        /// Output format for the final report: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Print the dungeon status after every change
        #[arg(long)]
        live: bool,
        /// Clear the terminal before each live status print
        #[arg(long, requires = "live")]
        clear: bool,
    },
    /// Write a starter lfg.toml
    Init {
        /// Directory to write into (default: current directory)
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Overwrite an existing lfg.toml
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lfg=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            sim,
            format,
            live,
            clear,
        } => commands::run::run(&sim, &format, live, clear).await,
        Commands::Init { path, force } => commands::init::init(&path, force),
    }
}
