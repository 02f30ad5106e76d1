//! Connectivity check for both backing stores.
//!
//! Runs `SELECT 1` on SQL Server and lists the MongoDB collections using the
//! same environment configuration as the server. Exits non-zero if either
//! store is unreachable.

use dotenv::dotenv;
use std::process::ExitCode;
use tracing::{error, info};

use crud_gateway::core::documents::DocumentStore;
use crud_gateway::core::sql::{SqlExecutor, Statement};
use crud_gateway::db::{MongoManager, SqlServerManager};
use crud_gateway::Config;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut healthy = true;

    let sqlserver = SqlServerManager::new(&config.sqlserver);
    match sqlserver.query(&Statement::raw("SELECT 1 AS ok")).await {
        Ok(output) => info!("✅ SQL Server {} reachable: {:?}", sqlserver.server(), output.rows),
        Err(e) => {
            error!("❌ SQL Server {} check failed: {}", sqlserver.server(), e);
            healthy = false;
        }
    }
    if let Err(e) = sqlserver.close().await {
        error!("Failed to close SQL Server connection: {}", e);
    }

    let mongo = MongoManager::new(&config.mongo);
    match mongo.collection_names().await {
        Ok(names) => info!(
            "✅ MongoDB database '{}' reachable, collections: {:?}",
            mongo.database_name(),
            names
        ),
        Err(e) => {
            error!("❌ MongoDB check failed: {}", e);
            healthy = false;
        }
    }
    mongo.close().await;

    if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
