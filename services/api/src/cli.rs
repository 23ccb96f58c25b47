use crate::report::{
    run_calendar, run_leaderboard, run_zip_health, CalendarArgs, LeaderboardArgs, ZipHealthArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sales_dashboard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Agency Sales Dashboard",
    about = "Serve and query producer leaderboards, zip-code health, and the agency calendar",
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
    /// Print the producer leaderboard for a date range
    Leaderboard(LeaderboardArgs),
    /// Print zip-code health for a date range
    ZipHealth(ZipHealthArgs),
    /// Show today's entry date and submission cutoff in agency time
    Calendar(CalendarArgs),
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
        Command::Leaderboard(args) => run_leaderboard(args),
        Command::ZipHealth(args) => run_zip_health(args),
        Command::Calendar(args) => run_calendar(args),
    }
}
