use crate::discover::{run_discover, DiscoverArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_scout::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Job Scout",
    about = "Discover relevant job postings across sources from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one discovery over CSV exports and print the ranked results
    Discover(DiscoverArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Discover(args) => run_discover(args).await,
    }
}
