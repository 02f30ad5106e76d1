use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use serde::Serialize;
use tracing::debug;

use crate::db::MongoManager;
use crate::error::AppError;

/// Server error code for creating a collection that already exists.
const NAMESPACE_EXISTS: i32 = 48;

/// A concurrent create can pass the service's existence check and still lose
/// on the server; report that as the same business error.
fn create_collection_error(name: &str, err: mongodb::error::Error) -> AppError {
    match err.kind.as_ref() {
        ErrorKind::Command(command) if command.code == NAMESPACE_EXISTS => {
            AppError::CollectionExists(name.to_string())
        }
        _ => AppError::Mongo(err),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateCounts {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Operations the document routes need from the backing store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn collection_names(&self) -> Result<Vec<String>, AppError>;

    async fn create_collection(&self, name: &str) -> Result<(), AppError>;

    /// Create an ascending single-field index and return its name.
    async fn create_ascending_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> Result<String, AppError>;

    /// Insert documents and return their `_id`s in input order.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, AppError>;

    /// Apply `$set` to the first match, or every match when `multi` is set.
    async fn update(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
        multi: bool,
    ) -> Result<UpdateCounts, AppError>;

    /// Delete the first match, or every match when `multi` is set.
    async fn delete(&self, collection: &str, filter: Document, multi: bool)
        -> Result<u64, AppError>;
}

#[async_trait]
impl DocumentStore for MongoManager {
    async fn collection_names(&self) -> Result<Vec<String>, AppError> {
        let db = self.database().await?;
        Ok(db.list_collection_names().await?)
    }

    async fn create_collection(&self, name: &str) -> Result<(), AppError> {
        let db = self.database().await?;
        db.create_collection(name)
            .await
            .map_err(|e| create_collection_error(name, e))?;
        Ok(())
    }

    async fn create_ascending_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> Result<String, AppError> {
        let coll = self.database().await?.collection::<Document>(collection);
        let mut keys = Document::new();
        keys.insert(field, 1);
        let model = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(unique).build())
            .build();
        let result = coll.create_index(model).await?;
        Ok(result.index_name)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, AppError> {
        let coll = self.database().await?.collection::<Document>(collection);
        let result = coll.insert_many(documents).await?;

        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        Ok(ids.into_iter().map(|(_, id)| id).collect())
    }

    async fn update(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
        multi: bool,
    ) -> Result<UpdateCounts, AppError> {
        let coll = self.database().await?.collection::<Document>(collection);
        let update = doc! { "$set": set };
        debug!(collection, multi, "Updating documents");

        let result = if multi {
            coll.update_many(filter, update).await?
        } else {
            coll.update_one(filter, update).await?
        };
        Ok(UpdateCounts {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete(
        &self,
        collection: &str,
        filter: Document,
        multi: bool,
    ) -> Result<u64, AppError> {
        let coll = self.database().await?.collection::<Document>(collection);
        debug!(collection, multi, "Deleting documents");

        let result = if multi {
            coll.delete_many(filter).await?
        } else {
            coll.delete_one(filter).await?
        };
        Ok(result.deleted_count)
    }
}
