pub mod analyze;
pub mod summary;
pub mod token;
