pub mod executor;
pub mod rows;
pub mod service;
pub mod statement;

pub use executor::{QueryOutput, SqlExecutor};
pub use service::{JoinOutcome, SqlOutcome, SqlService};
pub use statement::{Assignments, Statement};
