// CRUD gateway library
// HTTP routes over SQL Server and MongoDB, exposed for the binaries and tests

pub mod api;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod middleware;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
