use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::documents::{DocumentInput, IndexSpec};
use crate::core::sql::Assignments;

fn default_true() -> bool {
    true
}

fn empty_object() -> Value {
    json!({})
}

// Relational routes

#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    pub table_name: String,
    pub table_query: String, // full CREATE TABLE statement
}

#[derive(Debug, Deserialize)]
pub struct InsertDataRequest {
    pub table_name: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteDataRequest {
    pub table_name: String,
    pub condition: String, // WHERE clause without the keyword
    #[serde(default = "default_true")]
    pub multi: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDataRequest {
    pub table_name: String,
    pub condition: String,
    pub updates: Assignments,
    #[serde(default = "default_true")]
    pub multi: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTableRequest {
    pub table_name: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinTablesRequest {
    pub query: String,
}

// Document routes

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub collection_name: String,
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

#[derive(Debug, Deserialize)]
pub struct InsertDocumentsRequest {
    pub collection_name: String,
    pub data: DocumentInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentsRequest {
    pub collection_name: String,
    #[serde(default = "empty_object")]
    pub filter_query: Value,
    pub update_values: Value,
    #[serde(default)]
    pub multi: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteDocumentsRequest {
    pub collection_name: String,
    #[serde(default = "empty_object")]
    pub filter_query: Value,
    #[serde(default)]
    pub multi: bool,
}
