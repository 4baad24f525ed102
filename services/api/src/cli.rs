use crate::demo::{run_demo, run_recommend, run_stats, DemoArgs, RecommendArgs, StatsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hostel::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Hostel Room Allocation",
    about = "Run and explore the hostel room allocation service from the command line",
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
    /// Inspect a freshly seeded room inventory
    Rooms {
        #[command(subcommand)]
        command: RoomsCommand,
    },
    /// Walk through assignment, maintenance, and release against an in-memory inventory
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RoomsCommand {
    /// Print occupancy statistics by wing and floor
    Stats(StatsArgs),
    /// Rank rooms against stated preferences
    Recommend(RecommendArgs),
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
        Command::Rooms {
            command: RoomsCommand::Stats(args),
        } => run_stats(args),
        Command::Rooms {
            command: RoomsCommand::Recommend(args),
        } => run_recommend(args),
        Command::Demo(args) => run_demo(args),
    }
}
