use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

/// Request body cap for the JSON and form routes. Large enough for bulk
/// document inserts; MongoDB batches `insert_many` itself.
pub const DEFAULT_MAX_BODY_SIZE: usize = 32 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub sqlserver: SqlServerConfig,
    pub mongo: MongoConfig,
    /// Tables the relational routes may touch. Empty means unrestricted.
    pub table_allowlist: Vec<String>,
    /// Largest request body accepted, in bytes.
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct SqlServerConfig {
    pub host: String,
    pub port: u16,
    pub instance: Option<String>,
    pub user: String,
    pub password: String,
    pub database: String,
    pub trust_cert: bool,
    pub encrypt: bool,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_production = lookup("RUST_ENV")
            .unwrap_or_else(|| "development".to_string())
            .to_lowercase()
            == "production";

        let server_address = lookup("SERVER_ADDRESS").unwrap_or_else(|| {
            if is_production {
                "0.0.0.0:8000".to_string()
            } else {
                "127.0.0.1:8000".to_string()
            }
        });

        let sqlserver = SqlServerConfig {
            host: lookup("SQLSERVER_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&lookup, "SQLSERVER_PORT", 1433)?,
            instance: lookup("SQLSERVER_INSTANCE").filter(|s| !s.trim().is_empty()),
            user: lookup("SQLSERVER_USER").unwrap_or_else(|| "sa".to_string()),
            password: lookup("SQLSERVER_PASSWORD").unwrap_or_default(),
            database: lookup("SQLSERVER_DATABASE").unwrap_or_else(|| "master".to_string()),
            trust_cert: parse_bool_or(&lookup, "SQLSERVER_TRUST_CERT", false)?,
            encrypt: parse_bool_or(&lookup, "SQLSERVER_ENCRYPT", false)?,
        };

        let mongo_database = lookup("MONGO_DATABASE").unwrap_or_else(|| "mydb".to_string());
        let mongo_uri = match lookup("MONGO_URI") {
            Some(uri) => uri,
            None => build_mongo_uri(&lookup, &mongo_database)?,
        };

        let table_allowlist = lookup("SQL_TABLE_ALLOWLIST")
            .map(|raw| {
                raw.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let max_body_size = parse_or(&lookup, "MAX_BODY_SIZE", DEFAULT_MAX_BODY_SIZE)?;

        Ok(Config {
            server_address,
            sqlserver,
            mongo: MongoConfig {
                uri: mongo_uri,
                database: mongo_database,
            },
            table_allowlist,
            max_body_size,
        })
    }
}

fn build_mongo_uri<F>(lookup: &F, database: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("MONGO_HOST").unwrap_or_else(|| "localhost".to_string());
    let port: u16 = parse_or(lookup, "MONGO_PORT", 27017)?;

    let credentials = match (lookup("MONGO_USER"), lookup("MONGO_PASSWORD")) {
        (Some(user), Some(password)) => format!(
            "{}:{}@",
            urlencoding::encode(&user),
            urlencoding::encode(&password)
        ),
        (Some(user), None) => format!("{}@", urlencoding::encode(&user)),
        (None, Some(_)) => return Err(anyhow!("MONGO_PASSWORD is set but MONGO_USER is not")),
        (None, None) => return Ok(format!("mongodb://{}:{}/", host, port)),
    };

    let auth_source = lookup("MONGO_AUTH_SOURCE").unwrap_or_else(|| database.to_string());
    Ok(format!(
        "mongodb://{}{}:{}/?authSource={}",
        credentials,
        host,
        port,
        urlencoding::encode(&auth_source)
    ))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("{} must be a boolean, got '{}'", key, v)),
        },
    }
}
