//! # Bookstore - inventory data layer
//!
//! URI-addressed CRUD over a single local `books` table.
//!
//! Bookstore provides:
//! - A contract of column names, content URIs and MIME types
//! - SQLite-backed storage with versioned schema migration
//! - A resource provider that validates writes and notifies observers
//! - A typed inventory client and an async facade for event-loop callers

pub mod uri;
pub mod contract;
pub mod values;
pub mod selection;
pub mod storage;
pub mod notify;
pub mod provider;
pub mod client;
pub mod service;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use uri::ResourceUri;
pub use values::{Book, BookChanges, ContentValues, FieldValue, NewBook};
pub use selection::Selection;
pub use storage::{MigrationPolicy, SqliteStore};
pub use notify::{ChangeNotifier, Subscription};
pub use provider::{BookProvider, Cursor, Resource};
pub use client::InventoryClient;
pub use service::BookService;

/// Result type alias for Bookstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Bookstore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown URI: {0}")]
    UnknownResource(String),

    #[error("{operation} is not supported for {uri}")]
    UnsupportedOperation { operation: &'static str, uri: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Quantity of book {id} kept changing; gave up after repeated conflicts")]
    Contention { id: i64 },

    #[error("Schema version {found} does not match expected version {expected}")]
    SchemaMismatch { found: i64, expected: i64 },

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
