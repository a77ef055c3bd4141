use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitals_core::config::{
    data_dir_from_env_value, interpretation_mode_from_env_value,
    interpretation_timeout_from_env_value, patients_from_env_value,
};
use vitals_core::constants::{
    DEFAULT_REST_ADDR, ENV_DATA_DIR, ENV_INTERPRETATION, ENV_INTERPRETATION_TIMEOUT_MS,
    ENV_PATIENTS, ENV_REST_ADDR,
};
use vitals_core::{CoreConfig, EvaluationService};

/// Main entry point for the vitals service
///
/// Resolves configuration from the environment once, builds the evaluation service and serves
/// the REST API with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `VITALS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `VITALS_DATA_DIR`: directory for the file-backed vitals store (unset: in-memory store)
/// - `VITALS_INTERPRETATION`: `rules` (default) or `off`
/// - `VITALS_INTERPRETATION_TIMEOUT_MS`: bound on the interpretation step (default: 2000)
/// - `VITALS_PATIENTS`: comma-separated patient ids registered at startup
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any configuration value is invalid,
/// - the vitals store cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vitals_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var(ENV_REST_ADDR)
        .unwrap_or_else(|_| DEFAULT_REST_ADDR.into())
        .parse()?;

    let cfg = CoreConfig::new(
        data_dir_from_env_value(std::env::var(ENV_DATA_DIR).ok()),
        interpretation_mode_from_env_value(std::env::var(ENV_INTERPRETATION).ok())?,
        interpretation_timeout_from_env_value(std::env::var(ENV_INTERPRETATION_TIMEOUT_MS).ok())?,
        patients_from_env_value(std::env::var(ENV_PATIENTS).ok())?,
    )?;

    match cfg.data_dir() {
        Some(dir) => tracing::info!("++ Using file vitals store at {}", dir.display()),
        None => tracing::warn!("++ {ENV_DATA_DIR} not set, vitals will not survive a restart"),
    }

    let service = EvaluationService::from_config(&cfg)?;
    let app = api_rest::router(service);

    tracing::info!("++ Starting vitals REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
