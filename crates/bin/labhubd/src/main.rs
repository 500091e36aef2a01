//! # labhubd: labhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Start the background task worker and hand its queue to the services
//! - Prepare the private upload directory
//! - Bootstrap the first admin account when a token is configured
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), then drain the task queue
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::net::SocketAddr;

use labhub_adapter_http_axum::router;
use labhub_adapter_http_axum::state::{AppState, Backend};
use labhub_adapter_storage_sqlite_sqlx::pool::Config as DatabaseConfig;
use labhub_adapter_storage_sqlite_sqlx::{
    SqliteAlertRepository, SqliteDataPointRepository, SqliteHubRepository, SqliteJobRepository,
    SqlitePrinterRepository, SqliteSensorRepository, SqliteUserRepository,
};
use labhub_adapter_uploads_fs::FsModelStore;
use labhub_app::services::{
    HubService, JobService, PrinterService, SensorService, TaskRunner, UserService,
};
use labhub_app::task_queue::{InProcessTaskQueue, TaskWorker};
use labhub_domain::user::ApiToken;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Production set of adapters.
struct SqliteBackend;

impl Backend for SqliteBackend {
    type Users = SqliteUserRepository;
    type Printers = SqlitePrinterRepository;
    type Jobs = SqliteJobRepository;
    type Alerts = SqliteAlertRepository;
    type Hubs = SqliteHubRepository;
    type Sensors = SqliteSensorRepository;
    type DataPoints = SqliteDataPointRepository;
    type Dispatcher = InProcessTaskQueue;
    type Models = FsModelStore;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let user_repo = SqliteUserRepository::new(pool.clone());
    let printer_repo = SqlitePrinterRepository::new(pool.clone());
    let job_repo = SqliteJobRepository::new(pool.clone());
    let alert_repo = SqliteAlertRepository::new(pool.clone());
    let hub_repo = SqliteHubRepository::new(pool.clone());
    let sensor_repo = SqliteSensorRepository::new(pool.clone());
    let data_point_repo = SqliteDataPointRepository::new(pool);

    // Task queue
    let (queue, receiver) = InProcessTaskQueue::new(config.queue.capacity);
    let worker = TaskWorker::start(
        TaskRunner::new(job_repo.clone(), alert_repo.clone()),
        receiver,
        config.retry_policy(),
    );

    // Uploads
    let models = FsModelStore::new(config.uploads.root.clone());
    models.prepare().await?;

    // Services
    let user_service = UserService::new(user_repo);
    if let Some(token) = &config.auth.admin_token {
        let token = ApiToken::from_plaintext(token.as_str());
        if let Some(admin) = user_service
            .bootstrap_admin(&config.auth.admin_email, &token)
            .await?
        {
            tracing::info!(user = %admin.id, email = %admin.email, "admin account ready");
        }
    }

    // HTTP
    let state = AppState::<SqliteBackend>::new(
        user_service,
        PrinterService::new(printer_repo.clone()),
        JobService::new(printer_repo, job_repo, alert_repo, queue.clone(), models),
        HubService::new(hub_repo.clone()),
        SensorService::new(hub_repo, sensor_repo, data_point_repo, queue.clone()),
    );
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "labhubd listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router held the remaining senders; once this one is gone the
    // worker drains what is queued and stops.
    drop(queue);
    worker.await?;
    tracing::info!("labhubd stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested, draining in-flight requests");
}
