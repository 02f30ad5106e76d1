use mongodb::{Client, Database};
use tokio::sync::RwLock;
use tracing::info;

use super::mask_database_url;
use crate::config::MongoConfig;
use crate::error::AppError;

/// Owns the MongoDB client. The driver pools internally, so the client is
/// cloned out to callers instead of being locked.
pub struct MongoManager {
    uri: String,
    database: String,
    client: RwLock<Option<Client>>,
}

impl MongoManager {
    pub fn new(settings: &MongoConfig) -> Self {
        Self {
            uri: settings.uri.clone(),
            database: settings.database.clone(),
            client: RwLock::new(None),
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// Handle to the configured database, creating the client on first access.
    pub async fn database(&self) -> Result<Database, AppError> {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(client.database(&self.database));
        }

        let mut slot = self.client.write().await;
        let client = match slot.as_ref() {
            Some(client) => client.clone(),
            None => {
                info!("🔌 Creating MongoDB client for {}", mask_database_url(&self.uri));
                let client = Client::with_uri_str(&self.uri).await?;
                *slot = Some(client.clone());
                client
            }
        };
        Ok(client.database(&self.database))
    }

    pub async fn close(&self) {
        let taken = self.client.write().await.take();
        if let Some(client) = taken {
            client.shutdown().await;
            info!("MongoDB client closed");
        }
    }
}
