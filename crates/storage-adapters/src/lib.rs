//! # storage-adapters
//!
//! Implementations of the `domains` repository ports.
//!
//! - [`memory::MemoryStore`]: always compiled; in-process tables.
//! - [`postgres::PgStore`]: feature `db-postgres`; sqlx + embedded migrations.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
