use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use super::executor::SqlExecutor;
use super::statement::{self, Assignments, Statement};
use crate::error::AppError;
use crate::utils::ValidationHelpers;

#[derive(Debug, Clone, Serialize)]
pub struct SqlOutcome {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl SqlOutcome {
    fn success(message: String) -> Self {
        Self {
            status: "success",
            message,
            rows_affected: None,
            server: None,
            database: None,
        }
    }

    fn with_rows(mut self, rows_affected: u64) -> Self {
        self.rows_affected = Some(rows_affected);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinOutcome {
    pub status: &'static str,
    pub columns: Vec<String>,
    pub data: Vec<Map<String, Value>>,
}

/// CRUD operations over the relational store.
#[derive(Clone)]
pub struct SqlService {
    executor: Arc<dyn SqlExecutor>,
    table_allowlist: Arc<Vec<String>>,
}

impl SqlService {
    pub fn new(executor: Arc<dyn SqlExecutor>, table_allowlist: Vec<String>) -> Self {
        Self {
            executor,
            table_allowlist: Arc::new(table_allowlist),
        }
    }

    fn check_table(&self, table_name: &str) -> Result<(), AppError> {
        ValidationHelpers::validate_table_allowed(table_name, &self.table_allowlist)
    }

    /// Run caller-supplied DDL and report which server and database it ran on.
    pub async fn create_table(&self, table_name: &str, ddl: &str) -> Result<SqlOutcome, AppError> {
        ValidationHelpers::validate_non_empty_string(table_name, "table_name")?;
        ValidationHelpers::validate_non_empty_string(ddl, "table_query")?;
        self.check_table(table_name)?;
        if !self.table_allowlist.is_empty() {
            // the DDL runs verbatim, so the table it creates must be listed too
            let target = statement::created_table_name(ddl).ok_or_else(|| {
                AppError::Validation(
                    "table_query must be a CREATE TABLE statement when a table allow-list is set"
                        .to_string(),
                )
            })?;
            self.check_table(&target)?;
        }

        let (server, database) = self.server_identity().await?;
        info!("Connected to SQL Server instance {} database {}", server, database);

        self.executor.execute(&Statement::raw(ddl)).await?;
        info!("Table creation query executed in database {} on server {}", database, server);

        let mut outcome = SqlOutcome::success(format!(
            "Table '{}' created successfully in database {} on server {}",
            table_name, database, server
        ));
        outcome.server = Some(server);
        outcome.database = Some(database);
        Ok(outcome)
    }

    pub async fn insert_row(
        &self,
        table_name: &str,
        columns: &[String],
        values: &[Value],
    ) -> Result<SqlOutcome, AppError> {
        self.check_table(table_name)?;
        let statement = statement::insert(table_name, columns, values)?;
        let affected = self.executor.execute(&statement).await?;

        Ok(SqlOutcome::success(format!(
            "Data inserted into table '{}' successfully.",
            table_name
        ))
        .with_rows(affected))
    }

    pub async fn delete_rows(
        &self,
        table_name: &str,
        condition: &str,
        multi: bool,
    ) -> Result<SqlOutcome, AppError> {
        self.check_table(table_name)?;
        let statement = statement::delete(table_name, condition, multi)?;
        let affected = self.executor.execute(&statement).await?;

        Ok(SqlOutcome::success(format!(
            "Data deleted from table '{}' successfully.",
            table_name
        ))
        .with_rows(affected))
    }

    pub async fn update_rows(
        &self,
        table_name: &str,
        condition: &str,
        assignments: &Assignments,
        multi: bool,
    ) -> Result<SqlOutcome, AppError> {
        self.check_table(table_name)?;
        let statement = statement::update(table_name, condition, assignments, multi)?;
        let affected = self.executor.execute(&statement).await?;

        Ok(SqlOutcome::success(format!(
            "Data in table '{}' updated successfully.",
            table_name
        ))
        .with_rows(affected))
    }

    pub async fn drop_table(&self, table_name: &str) -> Result<SqlOutcome, AppError> {
        self.check_table(table_name)?;
        let statement = statement::drop_table(table_name)?;
        self.executor.execute(&statement).await?;

        Ok(SqlOutcome::success(format!(
            "Table '{}' deleted successfully.",
            table_name
        )))
    }

    /// Run an arbitrary query, typically a JOIN, and return its rows.
    pub async fn run_join_query(&self, query: &str) -> Result<JoinOutcome, AppError> {
        ValidationHelpers::validate_non_empty_string(query, "query")?;
        let output = self.executor.query(&Statement::raw(query)).await?;

        Ok(JoinOutcome {
            status: "success",
            columns: output.columns,
            data: output.rows,
        })
    }

    async fn server_identity(&self) -> Result<(String, String), AppError> {
        let output = self.executor.query(&statement::server_identity()).await?;
        let row = output.rows.first();
        let field = |name: &str| {
            row.and_then(|r| r.get(name))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string()
        };
        Ok((field("server_name"), field("database_name")))
    }
}
