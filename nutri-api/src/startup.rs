use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use nutri::dataset::Dataset;
use nutri::service::JobService;
use nutri::store::both::MemoryStore;
use nutri::store::results::FilesystemResultStore;
use nutri_telemetry::metrics::init_metrics_handle;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::config::ApiConfig;
use crate::routes::{
    health_check::health_check,
    index::index,
    jobs::{get_results, graceful_shutdown, list_jobs, num_jobs},
    metrics::metrics,
    queries::submit_query,
};

/// Job service served by the API: statuses live in memory, results on disk.
pub type ApiJobService = JobService<MemoryStore, FilesystemResultStore>;

/// API application server wrapper.
///
/// Owns the HTTP server and a handle to the job service it fronts, so that the caller can
/// drain the workers once the server stopped.
pub struct Application {
    port: u16,
    server: Server,
    service: ApiJobService,
}

impl Application {
    /// Loads the dataset, starts the worker pool and binds the HTTP server.
    pub async fn build(config: ApiConfig) -> anyhow::Result<Self> {
        config.validate()?;

        // The recorder must be installed before the service describes its metrics.
        init_metrics_handle()?;

        let dataset = Dataset::load_csv(&config.dataset.path)
            .with_context(|| format!("loading dataset `{}`", config.dataset.path.display()))?;

        let workers = config.workers.clone().with_env_override()?;
        let pool_size = workers.resolve_pool_size();

        let result_store = FilesystemResultStore::open(&config.results.directory).await?;
        let service = JobService::start(
            Arc::new(dataset),
            pool_size,
            MemoryStore::new(),
            result_store,
        )
        .await?;

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        info!(%address, port, pool_size, "api server listening");

        let server = run(listener, service.clone())?;

        Ok(Self {
            port,
            server,
            service,
        })
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the job service fronted by the server.
    pub fn service(&self) -> &ApiJobService {
        &self.service
    }

    /// Runs the server until it receives a shutdown signal, then waits for the workers.
    ///
    /// Jobs still queued when the server stops are completed before this returns.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        self.server.await?;

        info!("api server stopped, draining job workers");

        self.service.initiate_shutdown().await?;
        self.service.wait().await?;

        Ok(())
    }
}

/// Creates the HTTP server with all routes and middleware.
pub fn run(listener: TcpListener, service: ApiJobService) -> anyhow::Result<Server> {
    let prometheus_handle = web::ThinData(init_metrics_handle()?);
    let service = web::Data::new(service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(service.clone())
            .app_data(prometheus_handle.clone())
            .service(health_check)
            .service(metrics)
            .service(index)
            // Fixed routes are registered before the `/api/{kind}` catch-all.
            .service(get_results)
            .service(list_jobs)
            .service(num_jobs)
            .service(graceful_shutdown)
            .service(submit_query)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
