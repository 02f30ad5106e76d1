use std::sync::Arc;

use salvo::Depot;
use tracing::{error, info};

use crate::config::{Config, DEFAULT_MAX_BODY_SIZE};
use crate::core::documents::DocumentService;
use crate::core::sql::SqlService;
use crate::db::{MongoManager, SqlServerManager};
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub sql: SqlService,
    pub documents: DocumentService,
    /// Largest request body the handlers will parse, in bytes.
    pub max_body_size: usize,
    sqlserver: Option<Arc<SqlServerManager>>,
    mongo: Option<Arc<MongoManager>>,
}

impl AppState {
    /// Wire both stacks against the configured SQL Server and MongoDB.
    /// Connections are opened on first use, not here.
    pub fn new(config: &Config) -> Self {
        let sqlserver = Arc::new(SqlServerManager::new(&config.sqlserver));
        let mongo = Arc::new(MongoManager::new(&config.mongo));

        info!("📊 Backing stores:");
        info!("  - SQL Server: {} (database {})", sqlserver.server(), config.sqlserver.database);
        info!("  - MongoDB database: {}", mongo.database_name());
        if !config.table_allowlist.is_empty() {
            info!("  - Table allow-list: {}", config.table_allowlist.join(", "));
        }

        AppState {
            sql: SqlService::new(sqlserver.clone(), config.table_allowlist.clone()),
            documents: DocumentService::new(mongo.clone()),
            max_body_size: config.max_body_size,
            sqlserver: Some(sqlserver),
            mongo: Some(mongo),
        }
    }

    /// State over already-built services; nothing is closed on shutdown.
    pub fn from_services(sql: SqlService, documents: DocumentService) -> Self {
        AppState {
            sql,
            documents,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            sqlserver: None,
            mongo: None,
        }
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Release both store connections.
    pub async fn shutdown(&self) {
        if let Some(sqlserver) = &self.sqlserver {
            if let Err(e) = sqlserver.close().await {
                error!("Failed to close SQL Server connection: {}", e);
            }
        }
        if let Some(mongo) = &self.mongo {
            mongo.close().await;
        }
        info!("Backing store connections released");
    }
}

pub fn get_app_state(depot: &Depot) -> Result<&AppState, AppError> {
    depot
        .obtain::<AppState>()
        .map_err(|_| AppError::InternalServerError("application state not injected".to_string()))
}
