use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::convert::{id_to_string, to_document, DocumentInput};
use super::store::DocumentStore;
use crate::error::AppError;
use crate::utils::ValidationHelpers;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexSpec {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionCreated {
    pub message: String,
    pub indexes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertOutcome {
    pub message: String,
    pub inserted_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub message: String,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub message: String,
    pub deleted_count: u64,
}

/// CRUD operations over the document store.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a collection and its ascending indexes. An existing collection
    /// is reported as an error and left untouched.
    pub async fn create_collection(
        &self,
        name: &str,
        indexes: &[IndexSpec],
    ) -> Result<CollectionCreated, AppError> {
        ValidationHelpers::validate_collection_name(name)?;

        let existing = self.store.collection_names().await?;
        if existing.iter().any(|c| c == name) {
            return Err(AppError::CollectionExists(name.to_string()));
        }

        self.store.create_collection(name).await?;

        let mut created = Vec::new();
        for index in indexes {
            let field = match index.field.as_deref().map(str::trim) {
                Some(field) if !field.is_empty() => field,
                _ => continue,
            };
            let index_name = self
                .store
                .create_ascending_index(name, field, index.unique)
                .await?;
            created.push(index_name);
        }

        info!("Collection '{}' created with {} index(es)", name, created.len());
        Ok(CollectionCreated {
            message: format!("Collection '{}' created successfully.", name),
            indexes: created,
        })
    }

    pub async fn insert_documents(
        &self,
        collection: &str,
        data: DocumentInput,
    ) -> Result<InsertOutcome, AppError> {
        ValidationHelpers::validate_collection_name(collection)?;

        let documents = data
            .into_vec()
            .iter()
            .map(|value| to_document(value, "data"))
            .collect::<Result<Vec<_>, _>>()?;
        if documents.is_empty() {
            return Err(AppError::NothingInserted);
        }

        let ids = self.store.insert_many(collection, documents).await?;
        if ids.is_empty() {
            return Err(AppError::NothingInserted);
        }

        Ok(InsertOutcome {
            message: "Data inserted successfully.".to_string(),
            inserted_ids: ids.iter().map(id_to_string).collect(),
        })
    }

    pub async fn update_documents(
        &self,
        collection: &str,
        filter: &Value,
        set_values: &Value,
        multi: bool,
    ) -> Result<UpdateOutcome, AppError> {
        ValidationHelpers::validate_collection_name(collection)?;
        let filter = to_document(filter, "filter_query")?;
        let set = to_document(set_values, "update_values")?;
        if set.is_empty() {
            return Err(AppError::Validation("update_values cannot be empty".to_string()));
        }

        let counts = self.store.update(collection, filter, set, multi).await?;
        Ok(UpdateOutcome {
            message: "Data updated successfully.".to_string(),
            matched_count: counts.matched_count,
            modified_count: counts.modified_count,
        })
    }

    pub async fn delete_documents(
        &self,
        collection: &str,
        filter: &Value,
        multi: bool,
    ) -> Result<DeleteOutcome, AppError> {
        ValidationHelpers::validate_collection_name(collection)?;
        let filter = to_document(filter, "filter_query")?;

        let deleted_count = self.store.delete(collection, filter, multi).await?;
        Ok(DeleteOutcome {
            message: "Data deleted successfully.".to_string(),
            deleted_count,
        })
    }
}
