//! SQLite storage implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use rusqlite::{Connection, ToSql, params_from_iter};
use serde::{Deserialize, Serialize};
use crate::{contract, Error, Result};
use crate::selection::Selection;
use crate::values::{ContentValues, FieldValue};
use super::schema;

/// What to do when the stored schema version is older than the code's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationPolicy {
    /// Drop the books table and recreate it. All stored rows are lost.
    #[default]
    DropAndRecreate,
    /// Leave the file untouched and fail to open.
    Refuse,
}

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// SQLite-backed storage for the books table.
///
/// The connection is opened on first use and kept for the life of the store.
/// All access goes through one mutex, so writers are serialized and readers
/// never observe a half-applied statement.
pub struct SqliteStore {
    location: StoreLocation,
    policy: MigrationPolicy,
    schema_version: i64,
    open_lock: Mutex<()>,
    conn: OnceLock<Mutex<Connection>>,
}

impl SqliteStore {
    /// Describe a store without touching the disk; the file is opened lazily
    pub fn new(location: StoreLocation, policy: MigrationPolicy) -> Self {
        Self {
            location,
            policy,
            schema_version: schema::SCHEMA_VERSION,
            open_lock: Mutex::new(()),
            conn: OnceLock::new(),
        }
    }

    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path, policy: MigrationPolicy) -> Result<Self> {
        let store = Self::new(StoreLocation::File(path.to_path_buf()), policy);
        store.ensure_open()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let store = Self::new(StoreLocation::Memory, MigrationPolicy::default());
        store.ensure_open()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn with_schema_version(mut self, version: i64) -> Self {
        self.schema_version = version;
        self
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Open and migrate now instead of on first use
    pub fn ensure_open(&self) -> Result<()> {
        self.connection().map(|_| ())
    }

    /// Handle for reads
    pub fn readable(&self) -> Result<MutexGuard<'_, Connection>> {
        Ok(self.connection()?.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Handle for writes. Shares the connection with [`Self::readable`].
    pub fn writable(&self) -> Result<MutexGuard<'_, Connection>> {
        self.readable()
    }

    fn connection(&self) -> Result<&Mutex<Connection>> {
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }

        let _guard = self.open_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }

        let conn = self.open_connection()?;
        Ok(self.conn.get_or_init(|| Mutex::new(conn)))
    }

    fn open_connection(&self) -> Result<Connection> {
        let mut conn = match &self.location {
            StoreLocation::File(path) => {
                tracing::info!("Opening database {}", path.display());
                Connection::open(path)?
            }
            StoreLocation::Memory => Connection::open_in_memory()?,
        };
        self.initialize_schema(&mut conn)?;
        Ok(conn)
    }

    /// Create or migrate the schema according to the stored version
    fn initialize_schema(&self, conn: &mut Connection) -> Result<()> {
        let found: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let expected = self.schema_version;

        if found == expected {
            return Ok(());
        }
        if found > expected {
            return Err(Error::SchemaMismatch { found, expected });
        }

        let tx = conn.transaction()?;
        if found == 0 {
            tracing::debug!("Creating schema at version {}", expected);
        } else {
            match self.policy {
                MigrationPolicy::Refuse => {
                    return Err(Error::SchemaMismatch { found, expected });
                }
                MigrationPolicy::DropAndRecreate => {
                    tracing::warn!(
                        "Upgrading schema {} -> {} by dropping the books table; stored rows are discarded",
                        found,
                        expected
                    );
                    tx.execute(schema::DROP_BOOKS_TABLE, [])?;
                }
            }
        }

        for stmt in schema::all_schema_statements() {
            tracing::debug!("{}", stmt.trim());
            tx.execute(stmt, [])?;
        }
        tx.pragma_update(None, "user_version", expected)?;
        tx.commit()?;
        Ok(())
    }

    /// Stored schema version
    pub fn schema_version(&self) -> Result<i64> {
        let conn = self.readable()?;
        let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    // ========== Book Operations ==========

    /// Select `columns` from rows matching `selection`
    pub fn query(
        &self,
        columns: &[String],
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> Result<Vec<Vec<FieldValue>>> {
        ensure_known_columns(columns.iter().map(String::as_str))?;

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), contract::TABLE_NAME);
        sql.push_str(&selection.where_sql());
        if let Some(order) = sort_order {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        tracing::debug!("{}", sql);

        let conn = self.readable()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(selection.args.iter()), |row| {
                (0..columns.len())
                    .map(|i| row.get::<_, FieldValue>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Insert a row and return its assigned id
    pub fn insert(&self, values: &ContentValues) -> Result<i64> {
        ensure_known_columns(values.keys())?;

        let sql = if values.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", contract::TABLE_NAME)
        } else {
            let columns: Vec<&str> = values.keys().collect();
            let placeholders = vec!["?"; columns.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                contract::TABLE_NAME,
                columns.join(", "),
                placeholders
            )
        };
        tracing::debug!("{}", sql);

        let params: Vec<&dyn ToSql> = values.iter().map(|(_, v)| v as &dyn ToSql).collect();
        let conn = self.writable()?;
        conn.execute(&sql, params.as_slice())?;
        Ok(conn.last_insert_rowid())
    }

    /// Update rows matching `selection`; returns the number of rows changed
    pub fn update(&self, values: &ContentValues, selection: &Selection) -> Result<usize> {
        if values.is_empty() {
            return Err(Error::InvalidArgument("empty values".to_string()));
        }
        ensure_known_columns(values.keys())?;

        let assignments: Vec<String> = values.keys().map(|column| format!("{} = ?", column)).collect();
        let sql = format!(
            "UPDATE {} SET {}{}",
            contract::TABLE_NAME,
            assignments.join(", "),
            selection.where_sql()
        );
        tracing::debug!("{}", sql);

        let mut params: Vec<&dyn ToSql> = values.iter().map(|(_, v)| v as &dyn ToSql).collect();
        params.extend(selection.args.iter().map(|a| a as &dyn ToSql));

        let conn = self.writable()?;
        let changed = conn.execute(&sql, params.as_slice())?;
        Ok(changed)
    }

    /// Delete rows matching `selection`; returns the number of rows removed
    pub fn delete(&self, selection: &Selection) -> Result<usize> {
        let sql = format!("DELETE FROM {}{}", contract::TABLE_NAME, selection.where_sql());
        tracing::debug!("{}", sql);

        let conn = self.writable()?;
        let deleted = conn.execute(&sql, params_from_iter(selection.args.iter()))?;
        Ok(deleted)
    }

    /// Count all books
    pub fn count(&self) -> Result<usize> {
        let conn = self.readable()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", contract::TABLE_NAME),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn ensure_known_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for column in columns {
        if !contract::is_known_column(column) {
            return Err(Error::InvalidArgument(format!("unknown column {}", column)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::NewBook;

    fn all_columns() -> Vec<String> {
        contract::ALL_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_fresh_store_has_current_version() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_lazy_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lazy.db");
        let store = SqliteStore::new(StoreLocation::File(path.clone()), MigrationPolicy::Refuse);
        assert!(!store.is_open());
        assert!(!path.exists());

        assert_eq!(store.count().unwrap(), 0);
        assert!(store.is_open());
        assert!(path.exists());
    }

    #[test]
    fn test_insert_query_defaults() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut values = NewBook::new("Fangirl", 40, "SuperNova").to_values();
        values.remove(contract::QUANTITY);

        let id = store.insert(&values).unwrap();
        assert_eq!(id, 1);

        let rows = store
            .query(&[contract::QUANTITY.to_string()], &Selection::by_id(id), None)
            .unwrap();
        assert_eq!(rows, vec![vec![FieldValue::Integer(0)]]);
    }

    #[test]
    fn test_not_null_constraint() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut values = ContentValues::new();
        values.put(contract::NAME, "No supplier").put(contract::PRICE, 10);
        assert!(matches!(store.insert(&values), Err(Error::Storage(_))));
        assert!(matches!(store.insert(&ContentValues::new()), Err(Error::Storage(_))));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let store = SqliteStore::open_in_memory().unwrap();
        let book = NewBook::new("A", 1, "S").to_values();
        let first = store.insert(&book).unwrap();
        let second = store.insert(&book).unwrap();
        store.delete(&Selection::by_id(second)).unwrap();
        let third = store.insert(&book).unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_concurrent_inserts() {
        let store = SqliteStore::open_in_memory().unwrap();
        std::thread::scope(|scope| {
            for t in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..25 {
                        let name = format!("T{}-{}", t, i);
                        store.insert(&NewBook::new(name, 1, "S").to_values()).unwrap();
                    }
                });
            }
        });

        assert_eq!(store.count().unwrap(), 100);
        let mut ids: Vec<i64> = store
            .query(&[contract::ID.to_string()], &Selection::all(), None)
            .unwrap()
            .into_iter()
            .filter_map(|row| row[0].as_integer())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_readers_never_see_half_an_update() {
        let store = SqliteStore::open_in_memory().unwrap();
        for name in ["A", "B", "C"] {
            store.insert(&NewBook::new(name, 0, "S").to_values()).unwrap();
        }
        let columns = [contract::PRICE.to_string(), contract::QUANTITY.to_string()];

        std::thread::scope(|scope| {
            let writer = &store;
            scope.spawn(move || {
                for n in 1..=200i64 {
                    let mut values = ContentValues::new();
                    values.put(contract::PRICE, n).put(contract::QUANTITY, n);
                    assert_eq!(writer.update(&values, &Selection::all()).unwrap(), 3);
                }
            });
            for _ in 0..3 {
                let reader = &store;
                let columns = &columns;
                scope.spawn(move || {
                    for _ in 0..200 {
                        let rows = reader.query(columns, &Selection::all(), None).unwrap();
                        let first = &rows[0][0];
                        assert!(rows.iter().all(|row| row[0] == *first && row[1] == *first));
                    }
                });
            }
        });
    }

    #[test]
    fn test_concurrent_first_use_opens_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(
            StoreLocation::File(dir.path().join("race.db")),
            MigrationPolicy::default(),
        );
        std::thread::scope(|scope| {
            for _ in 0..8 {
                let store = &store;
                scope.spawn(move || store.ensure_open().unwrap());
            }
        });
        assert!(store.is_open());
        assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_update_and_delete_counts() {
        let store = SqliteStore::open_in_memory().unwrap();
        for name in ["A", "B", "C"] {
            store.insert(&NewBook::new(name, 5, "S").to_values()).unwrap();
        }

        let mut values = ContentValues::new();
        values.put(contract::PRICE, 7);
        let selection = Selection::new("name <> ?", vec!["B".to_string()]);
        assert_eq!(store.update(&values, &selection).unwrap(), 2);

        let rows = store
            .query(&all_columns(), &Selection::all(), Some("price DESC, name"))
            .unwrap();
        assert_eq!(rows[0][1], FieldValue::Text("A".into()));
        assert_eq!(rows[2][1], FieldValue::Text("B".into()));

        assert_eq!(store.delete(&Selection::all()).unwrap(), 3);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_rejects_unknown_columns() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut values = ContentValues::new();
        values.put("isbn", "123");
        assert!(matches!(store.insert(&values), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            store.query(&["isbn".to_string()], &Selection::all(), None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_destructive_migration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        {
            let store = SqliteStore::open(&path, MigrationPolicy::DropAndRecreate).unwrap();
            store.insert(&NewBook::new("Old", 1, "S").to_values()).unwrap();
        }

        let store = SqliteStore::new(StoreLocation::File(path), MigrationPolicy::DropAndRecreate)
            .with_schema_version(schema::SCHEMA_VERSION + 1);
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION + 1);
    }

    #[test]
    fn test_refused_migration_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        {
            let store = SqliteStore::open(&path, MigrationPolicy::Refuse).unwrap();
            store.insert(&NewBook::new("Kept", 1, "S").to_values()).unwrap();
        }

        let store = SqliteStore::new(StoreLocation::File(path.clone()), MigrationPolicy::Refuse)
            .with_schema_version(schema::SCHEMA_VERSION + 1);
        assert!(matches!(store.count(), Err(Error::SchemaMismatch { found: 1, expected: 2 })));
        assert!(!store.is_open());

        let store = SqliteStore::open(&path, MigrationPolicy::Refuse).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        SqliteStore::new(StoreLocation::File(path.clone()), MigrationPolicy::DropAndRecreate)
            .with_schema_version(schema::SCHEMA_VERSION + 1)
            .count()
            .unwrap();

        let result = SqliteStore::open(&path, MigrationPolicy::DropAndRecreate);
        assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
    }
}
