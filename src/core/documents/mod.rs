pub mod convert;
pub mod service;
pub mod store;

pub use convert::DocumentInput;
pub use service::{
    CollectionCreated, DeleteOutcome, DocumentService, IndexSpec, InsertOutcome, UpdateOutcome,
};
pub use store::{DocumentStore, UpdateCounts};
