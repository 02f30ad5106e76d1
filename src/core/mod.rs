pub mod documents;
pub mod sql;
