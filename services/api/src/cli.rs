use crate::demo::{print_directories, run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kinder_admin::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "KinderAdminPro Admissions",
    about = "Run and demonstrate the KinderAdminPro admissions service from the command line",
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
    /// Walk through intake, acceptance, rejection and a guardian broadcast in-process
    Demo(DemoArgs),
    /// Print the grade, guardian type and blood type catalogs
    Directories,
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
        Command::Demo(args) => run_demo(args),
        Command::Directories => {
            print_directories();
            Ok(())
        }
    }
}
