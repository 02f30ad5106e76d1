//! In-memory stand-ins for the two backing stores.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crud_gateway::config::DEFAULT_MAX_BODY_SIZE;
use crud_gateway::core::documents::{DocumentService, DocumentStore, UpdateCounts};
use crud_gateway::core::sql::{QueryOutput, SqlExecutor, SqlService, Statement};
use crud_gateway::{api, AppError, AppState};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use salvo::prelude::*;
use serde_json::{json, Map, Value};

fn driver_error(statement: &Statement, message: &str) -> AppError {
    AppError::sql(
        &statement.sql,
        tiberius::error::Error::Protocol(message.to_string().into()),
    )
}

/// Table name between the first pair of brackets, as the statement builders
/// emit it.
fn bracketed_table(sql: &str) -> String {
    let start = sql.find('[').map(|i| i + 1).unwrap_or(0);
    let end = sql[start..].find(']').map(|i| start + i).unwrap_or(sql.len());
    sql[start..end].to_lowercase()
}

fn ddl_table(sql: &str) -> String {
    let rest = sql.trim()["CREATE TABLE".len()..].trim_start();
    rest.chars()
        .take_while(|c| *c != '(' && !c.is_whitespace())
        .filter(|c| *c != '[' && *c != ']')
        .collect::<String>()
        .to_lowercase()
}

/// Tracks table row counts and rejects what SQL Server would reject for the
/// statements the gateway builds. Every row matches every WHERE clause.
#[derive(Default)]
pub struct FakeSql {
    pub executed: Mutex<Vec<Statement>>,
    tables: Mutex<HashMap<String, u64>>,
    pub join_rows: Mutex<Vec<Map<String, Value>>>,
}

impl FakeSql {
    pub fn with_table(name: &str, rows: u64) -> Self {
        let fake = FakeSql::default();
        fake.tables.lock().unwrap().insert(name.to_lowercase(), rows);
        fake
    }

    pub fn rows_in(&self, table: &str) -> Option<u64> {
        self.tables.lock().unwrap().get(&table.to_lowercase()).copied()
    }

    pub fn last_sql(&self) -> Option<String> {
        self.executed.lock().unwrap().last().map(|s| s.sql.clone())
    }
}

#[async_trait]
impl SqlExecutor for FakeSql {
    async fn execute(&self, statement: &Statement) -> Result<u64, AppError> {
        self.executed.lock().unwrap().push(statement.clone());
        let sql = statement.sql.as_str();
        let mut tables = self.tables.lock().unwrap();

        if sql.trim_start().to_uppercase().starts_with("CREATE TABLE") {
            let name = ddl_table(sql);
            if tables.contains_key(&name) {
                return Err(driver_error(
                    statement,
                    &format!("There is already an object named '{}' in the database.", name),
                ));
            }
            tables.insert(name, 0);
            return Ok(0);
        }

        let table = bracketed_table(sql);
        let rows = match tables.get_mut(&table) {
            Some(rows) => rows,
            None => {
                return Err(driver_error(
                    statement,
                    &format!("Invalid object name '{}'.", table),
                ))
            }
        };
        let top_one = sql.contains("TOP (1)");

        if sql.starts_with("INSERT INTO") {
            let columns = sql[sql.find('(').unwrap_or(0)..sql.find(')').unwrap_or(0)]
                .split(',')
                .count();
            if columns != statement.params.len() {
                return Err(driver_error(
                    statement,
                    "There are more columns in the INSERT statement than values specified in the VALUES clause.",
                ));
            }
            *rows += 1;
            Ok(1)
        } else if sql.starts_with("DELETE") {
            let affected = if top_one { (*rows).min(1) } else { *rows };
            *rows -= affected;
            Ok(affected)
        } else if sql.starts_with("UPDATE") {
            Ok(if top_one { (*rows).min(1) } else { *rows })
        } else if sql.starts_with("DROP TABLE") {
            tables.remove(&table);
            Ok(0)
        } else {
            Err(driver_error(statement, "Incorrect syntax."))
        }
    }

    async fn query(&self, statement: &Statement) -> Result<QueryOutput, AppError> {
        self.executed.lock().unwrap().push(statement.clone());
        if statement.sql.contains("@@SERVERNAME") {
            let mut row = Map::new();
            row.insert("server_name".into(), json!("FAKESQL"));
            row.insert("database_name".into(), json!("MyDatabase"));
            return Ok(QueryOutput {
                columns: vec!["server_name".into(), "database_name".into()],
                rows: vec![row],
            });
        }

        let rows = self.join_rows.lock().unwrap().clone();
        let columns = rows
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        Ok(QueryOutput { columns, rows })
    }
}

/// Document store with top-level equality filters and `$set` merges.
#[derive(Default)]
pub struct MemoryDocuments {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    pub indexes: Mutex<Vec<(String, String, bool)>>,
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

impl MemoryDocuments {
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocuments {
    async fn collection_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self.collections.lock().unwrap().keys().cloned().collect())
    }

    async fn create_collection(&self, name: &str) -> Result<(), AppError> {
        let mut collections = self.collections.lock().unwrap();
        if collections.contains_key(name) {
            return Err(AppError::CollectionExists(name.to_string()));
        }
        collections.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn create_ascending_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> Result<String, AppError> {
        self.indexes
            .lock()
            .unwrap()
            .push((collection.to_string(), field.to_string(), unique));
        Ok(format!("{}_1", field))
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, AppError> {
        let mut collections = self.collections.lock().unwrap();
        let stored = collections.entry(collection.to_string()).or_default();
        let mut ids = Vec::new();
        for mut doc in documents {
            if !doc.contains_key("_id") {
                doc.insert("_id", ObjectId::new());
            }
            ids.push(doc.get("_id").cloned().unwrap_or(Bson::Null));
            stored.push(doc);
        }
        Ok(ids)
    }

    async fn update(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
        multi: bool,
    ) -> Result<UpdateCounts, AppError> {
        let mut collections = self.collections.lock().unwrap();
        let mut counts = UpdateCounts::default();
        if let Some(docs) = collections.get_mut(collection) {
            for doc in docs.iter_mut().filter(|d| matches(d, &filter)) {
                counts.matched_count += 1;
                let mut changed = false;
                for (key, value) in set.iter() {
                    if doc.get(key) != Some(value) {
                        doc.insert(key.clone(), value.clone());
                        changed = true;
                    }
                }
                if changed {
                    counts.modified_count += 1;
                }
                if !multi {
                    break;
                }
            }
        }
        Ok(counts)
    }

    async fn delete(
        &self,
        collection: &str,
        filter: Document,
        multi: bool,
    ) -> Result<u64, AppError> {
        let mut collections = self.collections.lock().unwrap();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut deleted = 0u64;
        docs.retain(|doc| {
            if (multi || deleted == 0) && matches(doc, &filter) {
                deleted += 1;
                false
            } else {
                true
            }
        });
        Ok(deleted)
    }
}

pub struct TestApp {
    pub sql: Arc<FakeSql>,
    pub documents: Arc<MemoryDocuments>,
    pub service: Service,
}

pub fn test_app(sql: FakeSql, allowlist: Vec<String>) -> TestApp {
    test_app_with_body_limit(sql, allowlist, DEFAULT_MAX_BODY_SIZE)
}

pub fn test_app_with_body_limit(sql: FakeSql, allowlist: Vec<String>, limit: usize) -> TestApp {
    let sql = Arc::new(sql);
    let documents = Arc::new(MemoryDocuments::default());
    let state = AppState::from_services(
        SqlService::new(sql.clone(), allowlist),
        DocumentService::new(documents.clone()),
    )
    .with_max_body_size(limit);
    TestApp {
        sql,
        documents,
        service: Service::new(api::router(state)),
    }
}

pub fn url(path: &str) -> String {
    format!("http://127.0.0.1:5800{}", path)
}
