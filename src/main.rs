use std::error::Error;

use api::AppConfig;
use completion_service::telemetry;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file if present.
    // Variables already set in the environment take precedence.
    let dotenv = dotenvy::dotenv();

    telemetry::init("info,tower_http=info");

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "ignoring unreadable .env"),
    }

    let config = AppConfig::from_env().inspect_err(|err| {
        error!(error = %err, "invalid configuration");
    })?;

    api::start(config).await.inspect_err(|err| {
        error!(error = %err, "server terminated with an error");
    })?;

    Ok(())
}
