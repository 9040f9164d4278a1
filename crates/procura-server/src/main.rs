//! Procura Server — Application entry point.

mod config;

use procura_db::repository::{SqlitePurchaseOrderRepository, SqliteUserRepository};
use procura_db::{DbError, DbManager};
use procura_workflow::{ChannelDispatcher, LogDispatcher, NotificationDispatcher, WorkflowService};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Debug, Error)]
enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("signal handler failed: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Procura server failed");
        eprintln!("procura-server: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!(database = %config.database.url, "Starting Procura server...");

    let db = DbManager::connect(&config.database)
        .await
        .map_err(DbError::from)?;
    procura_db::run_migrations(db.pool()).await?;

    let (dispatcher, mut events) = ChannelDispatcher::new(config.event_queue_capacity);
    let service = WorkflowService::new(
        SqlitePurchaseOrderRepository::new(db.pool().clone()),
        SqliteUserRepository::new(db.pool().clone()),
        dispatcher,
        config.workflow.clone(),
    );

    let delivery = tokio::spawn(async move {
        let transport = LogDispatcher;
        while let Some(event) = events.recv().await {
            if let Err(e) = transport.dispatch(&event).await {
                warn!(po_id = %event.po_id, error = %e, "Notification delivery failed");
            }
        }
    });

    info!(
        max_conflict_retries = config.workflow.max_conflict_retries,
        "Workflow engine ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    // Dropping the service closes the queue and lets delivery drain.
    drop(service);
    if let Err(e) = delivery.await {
        warn!(error = %e, "Notification task ended abnormally");
    }
    db.shutdown().await;

    info!("Procura server stopped.");
    Ok(())
}
