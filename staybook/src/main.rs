use std::process::ExitCode;

use staybook::{config::Config, server::start_server};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let result = match Config::load() {
        Ok(config) => start_server(config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server failed: {e}");
            ExitCode::FAILURE
        }
    }
}
