//! Database schema definitions

/// Default database file name
pub const DATABASE_NAME: &str = "bookstore.db";

/// Schema version this code expects, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i64 = 1;

/// SQL to create the books table
pub const CREATE_BOOKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    author TEXT,
    price INTEGER NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0,
    supplier_name TEXT NOT NULL,
    supplier_number TEXT
)
"#;

/// SQL to drop the books table during a destructive migration
pub const DROP_BOOKS_TABLE: &str = "DROP TABLE IF EXISTS books";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_BOOKS_TABLE]
}
