pub mod validation;

pub use validation::ValidationHelpers;
