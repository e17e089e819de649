//! Core data structures for the goal planner

pub mod entities;
pub mod errors;

// Re-export all common types
pub use errors::{CoreError, PersistenceError};
pub use entities::*;
