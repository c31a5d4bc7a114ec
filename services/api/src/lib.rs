mod cli;
mod infra;
mod routes;
mod server;

use cardio_risk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
