use crate::console::{
    run_config, run_copy, run_lines, run_theme, ConfigArgs, CopyArgs, LinesArgs, ThemeCommand,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scoring_admin::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Scoring Admin Console",
    about = "Serve and administer per-line credit scoring configuration from the command line",
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
    /// List the credit lines a running server exposes
    Lines(LinesArgs),
    /// Show one line's scoring configuration, optionally exporting it to CSV
    Config(ConfigArgs),
    /// Copy the scoring configuration from one line onto another
    Copy(CopyArgs),
    /// Inspect or flip the stored theme preference
    Theme {
        #[command(subcommand)]
        command: ThemeCommand,
    },
    /// Run an end-to-end CLI demo covering the admin panel workflows
    Demo(DemoArgs),
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
        Command::Lines(args) => run_lines(args).await,
        Command::Config(args) => run_config(args).await,
        Command::Copy(args) => run_copy(args).await,
        Command::Theme { command } => run_theme(command),
        Command::Demo(args) => run_demo(args).await,
    }
}
