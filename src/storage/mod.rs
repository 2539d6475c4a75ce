//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with one table:
//! - books(id, name, author, price, quantity, supplier_name, supplier_number)
//!
//! The schema version is kept in `PRAGMA user_version` and gates migration.

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, MigrationPolicy, StoreLocation};
