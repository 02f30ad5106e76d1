use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tiberius::Query;
use tracing::{debug, error};

use super::rows::row_to_json;
use super::statement::Statement;
use crate::db::SqlServerManager;
use crate::error::AppError;

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

/// Runs statements against the relational store.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute a statement and return the number of rows affected.
    async fn execute(&self, statement: &Statement) -> Result<u64, AppError>;

    /// Execute a statement and return its first result set.
    async fn query(&self, statement: &Statement) -> Result<QueryOutput, AppError>;
}

fn build_query(statement: &Statement) -> Query<'_> {
    let mut query = Query::new(statement.sql.as_str());
    for param in &statement.params {
        match param {
            Value::Null => query.bind(Option::<String>::None),
            Value::Bool(b) => query.bind(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query.bind(i)
                } else if let Some(f) = n.as_f64() {
                    query.bind(f)
                } else {
                    query.bind(n.to_string())
                }
            }
            Value::String(s) => query.bind(s.as_str()),
            other => query.bind(other.to_string()),
        }
    }
    query
}

#[async_trait]
impl SqlExecutor for SqlServerManager {
    async fn execute(&self, statement: &Statement) -> Result<u64, AppError> {
        debug!(query = %statement.sql, params = statement.params.len(), "Executing statement");
        let mut client = self.client().await?;

        let result = build_query(statement)
            .execute(&mut *client)
            .await
            .map_err(|e| {
                error!("Statement failed: {} ({})", e, statement.sql);
                AppError::sql(&statement.sql, e)
            })?;

        Ok(result.total())
    }

    async fn query(&self, statement: &Statement) -> Result<QueryOutput, AppError> {
        debug!(query = %statement.sql, params = statement.params.len(), "Running query");
        let mut client = self.client().await?;

        let mut stream = build_query(statement)
            .query(&mut *client)
            .await
            .map_err(|e| {
                error!("Query failed: {} ({})", e, statement.sql);
                AppError::sql(&statement.sql, e)
            })?;

        let columns = stream
            .columns()
            .await
            .map_err(|e| AppError::sql(&statement.sql, e))?
            .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = stream
            .into_first_result()
            .await
            .map_err(|e| AppError::sql(&statement.sql, e))?
            .into_iter()
            .map(row_to_json)
            .collect();

        Ok(QueryOutput { columns, rows })
    }
}
