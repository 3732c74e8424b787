mod cli;
mod infra;
mod routes;
mod server;
mod worklist;

use ar_priority::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
