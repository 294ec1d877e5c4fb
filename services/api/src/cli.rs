use crate::commands::{run_demo, run_export, run_list, DemoArgs, ExportArgs, ListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_board::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Job Board Dashboard",
    about = "Serve and inspect the job-seeker application dashboard",
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
    /// Inspect a job seeker's dashboard from the command line
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommand,
    },
    /// Walk through listing, filtering, and withdrawing against seeded data
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum DashboardCommand {
    /// Print the filtered, paginated application list
    List(ListArgs),
    /// Write the filtered application list as CSV
    Export(ExportArgs),
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
        Command::Dashboard {
            command: DashboardCommand::List(args),
        } => run_list(args).await,
        Command::Dashboard {
            command: DashboardCommand::Export(args),
        } => run_export(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
