//! goalboard/crates/domains/src/lib.rs
//!
//! Entities, rules and port definitions for goalboard. No I/O lives here.

pub mod error;
pub mod models;
pub mod permissions;
pub mod ports;
pub mod query;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use permissions::*;
pub use ports::*;
pub use query::*;
pub use validation::ValidationErrors;
