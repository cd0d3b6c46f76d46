use clap::Parser;
use ilsplice_cli::commands::{Cmd, Command};

/// ilsplice CLI
///
/// ilsplice splices factor-scaling blocks into IL method bodies right after a known call,
/// locating the scaled locals by their fixed position relative to that call.
#[derive(Parser)]
#[command(name = "ilsplice")]
#[command(about = "ilsplice: call-site anchored IL patcher")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the ilsplice CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.command.execute().await
}
