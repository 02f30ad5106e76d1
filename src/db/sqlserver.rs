use tiberius::{AuthMethod, Client, Config, EncryptionLevel, SqlBrowser};
use tokio::net::TcpStream;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{error, info, warn};

use crate::config::SqlServerConfig;
use crate::error::AppError;

pub type SqlClient = Client<Compat<TcpStream>>;

/// Owns the single SQL Server connection.
///
/// The connection is opened on first use and kept until [`close`] is called.
/// Callers hold the mutex for the duration of a statement, so statements run
/// one at a time.
///
/// [`close`]: SqlServerManager::close
pub struct SqlServerManager {
    config: Config,
    server: String,
    named_instance: bool,
    client: Mutex<Option<SqlClient>>,
}

impl SqlServerManager {
    pub fn new(settings: &SqlServerConfig) -> Self {
        let mut config = Config::new();
        config.host(&settings.host);
        config.port(settings.port);
        config.authentication(AuthMethod::sql_server(&settings.user, &settings.password));
        config.database(&settings.database);
        if let Some(instance) = &settings.instance {
            config.instance_name(instance);
        }
        if settings.trust_cert {
            config.trust_cert();
        }
        if !settings.encrypt {
            config.encryption(EncryptionLevel::Off);
        }

        let server = match &settings.instance {
            Some(instance) => format!("{}\\{}", settings.host, instance),
            None => format!("{}:{}", settings.host, settings.port),
        };

        Self {
            config,
            server,
            named_instance: settings.instance.is_some(),
            client: Mutex::new(None),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Lock the shared connection, opening it if this is the first access.
    pub async fn client(&self) -> Result<MappedMutexGuard<'_, SqlClient>, AppError> {
        let mut guard = self.client.lock().await;
        if guard.is_none() {
            *guard = Some(self.connect().await?);
        }
        MutexGuard::try_map(guard, |slot| slot.as_mut()).map_err(|_| {
            AppError::InternalServerError("SQL Server connection unavailable".to_string())
        })
    }

    /// Release the connection. A later `client()` call reconnects.
    pub async fn close(&self) -> Result<(), AppError> {
        let taken = self.client.lock().await.take();
        if let Some(client) = taken {
            client
                .close()
                .await
                .map_err(|e| AppError::sql("close connection", e))?;
            info!("SQL Server connection to {} closed", self.server);
        }
        Ok(())
    }

    async fn connect(&self) -> Result<SqlClient, AppError> {
        info!("🔌 Opening SQL Server connection to {}", self.server);

        let tcp = if self.named_instance {
            TcpStream::connect_named(&self.config).await
        } else {
            TcpStream::connect(self.config.get_addr())
                .await
                .map_err(tiberius::error::Error::from)
        };
        let tcp = tcp.map_err(|e| {
            log_connection_hint(&e.to_string());
            AppError::sql(format!("connect to {}", self.server), e)
        })?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(self.config.clone(), tcp.compat_write())
            .await
            .map_err(|e| {
                log_connection_hint(&e.to_string());
                AppError::sql(format!("connect to {}", self.server), e)
            })?;

        info!("✅ SQL Server connection established to {}", self.server);
        Ok(client)
    }
}

fn log_connection_hint(error_string: &str) {
    error!("❌ Failed to connect to SQL Server: {}", error_string);

    if error_string.contains("Login failed") {
        warn!("💡 Authentication failed - check SQLSERVER_USER and SQLSERVER_PASSWORD");
    } else if error_string.contains("Cannot open database") {
        warn!("💡 Database does not exist or the user lacks permission");
    } else if error_string.contains("Connection refused") || error_string.contains("No connection") {
        warn!("💡 Cannot reach SQL Server - check host, port and that TCP/IP is enabled");
    } else if error_string.contains("timeout") {
        warn!("💡 Connection timeout - server may be unreachable");
    } else if error_string.contains("certificate") || error_string.contains("TLS") {
        warn!("💡 TLS certificate issue - try SQLSERVER_TRUST_CERT=true");
    }
}
