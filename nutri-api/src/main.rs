use anyhow::Context;
use nutri_api::{config::ApiConfig, startup::Application};
use nutri_config::load_config;
use nutri_telemetry::tracing::init_tracing;
use tracing::{error, info};

/// Entry point for the nutri API service.
///
/// Loads the configuration, starts the worker pool and serves the API until the process is
/// asked to stop, then drains the workers.
fn main() -> anyhow::Result<()> {
    // Initialize tracing from the binary name
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    // We start the runtime.
    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    let config = load_config::<ApiConfig>().context("loading API configuration")?;
    info!(
        host = %config.application.host,
        port = config.application.port,
        dataset = %config.dataset.path.display(),
        results = %config.results.directory.display(),
        num_workers = ?config.workers.num_workers,
        "api configuration loaded"
    );

    let application = Application::build(config).await.inspect_err(|err| {
        error!(error = %err, "failed to start the api");
    })?;
    application.run_until_stopped().await?;

    info!("api stopped");

    Ok(())
}
