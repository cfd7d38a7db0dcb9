mod cli;
mod console;
mod demo;
mod infra;
mod routes;
mod server;

use scoring_admin::error::AppError;

/// Parses the command line and dispatches to the selected command.
pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
