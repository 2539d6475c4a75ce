//! Resource provider - URI-addressed CRUD over the books table
//!
//! Resolves a content URI to the whole collection or a single row, validates
//! incoming values, runs the statement through [`SqliteStore`] and publishes a
//! change notification for the URI after every mutation that touched a row.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use crate::{contract, Error, Result};
use crate::notify::{ChangeNotifier, Subscription};
use crate::selection::{self, Selection};
use crate::storage::SqliteStore;
use crate::uri::{parse_decimal_id, ResourceUri};
use crate::values::{Book, ContentValues, FieldValue};

/// What a content URI addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// `content://<authority>/books`
    Collection,
    /// `content://<authority>/books/<id>`
    Item(i64),
}

/// Match a URI against the two recognized shapes.
pub fn match_uri(uri: &ResourceUri) -> Option<Resource> {
    if uri.scheme != contract::SCHEME || uri.authority != contract::CONTENT_AUTHORITY {
        return None;
    }
    match uri.segments.as_slice() {
        [path] if path == contract::PATH_BOOKS => Some(Resource::Collection),
        [path, id] if path == contract::PATH_BOOKS => parse_decimal_id(id).map(Resource::Item),
        _ => None,
    }
}

/// Rows returned by a query, plus a subscription to changes of the queried URI.
#[derive(Debug)]
pub struct Cursor {
    columns: Vec<String>,
    rows: Vec<Vec<FieldValue>>,
    subscription: Subscription,
    stale: AtomicBool,
}

impl Cursor {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<FieldValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&FieldValue> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    pub fn get_string(&self, row: usize, column: &str) -> Option<String> {
        self.get(row, column).and_then(FieldValue::as_string)
    }

    pub fn get_integer(&self, row: usize, column: &str) -> Option<i64> {
        self.get(row, column).and_then(FieldValue::as_integer)
    }

    /// Subscription registered for the queried URI
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Whether the data behind this cursor changed since it was read.
    ///
    /// Once a change has been seen the cursor stays stale; re-query for fresh rows.
    pub fn is_stale(&self) -> bool {
        if self.stale.load(Ordering::Acquire) {
            return true;
        }
        if self.subscription.take_changed() {
            self.stale.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// Convert every row to a [`Book`]. Needs a full projection.
    pub fn to_books(&self) -> Result<Vec<Book>> {
        (0..self.len()).map(|row| self.book_at(row)).collect()
    }

    fn book_at(&self, row: usize) -> Result<Book> {
        let required_int = |column: &str| {
            self.get_integer(row, column)
                .ok_or_else(|| Error::InvalidArgument(format!("cursor has no integer {}", column)))
        };
        let required_text = |column: &str| {
            self.get_string(row, column)
                .ok_or_else(|| Error::InvalidArgument(format!("cursor has no text {}", column)))
        };

        Ok(Book {
            id: required_int(contract::ID)?,
            name: required_text(contract::NAME)?,
            author: self.get_string(row, contract::AUTHOR),
            price: required_int(contract::PRICE)?,
            quantity: required_int(contract::QUANTITY)?,
            supplier_name: required_text(contract::SUPPLIER_NAME)?,
            supplier_number: self.get_string(row, contract::SUPPLIER_NUMBER),
        })
    }
}

/// Mediator between URI-addressed callers and the books table.
pub struct BookProvider {
    store: SqliteStore,
    notifier: Arc<ChangeNotifier>,
}

impl BookProvider {
    /// Create a provider with its own notifier. The store may still be unopened.
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store,
            notifier: Arc::new(ChangeNotifier::new()),
        }
    }

    /// Provider over a fresh in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(SqliteStore::open_in_memory()?))
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    /// Resolve a URI or fail with [`Error::UnknownResource`]
    pub fn resolve(&self, uri: &ResourceUri) -> Result<Resource> {
        match_uri(uri).ok_or_else(|| Error::UnknownResource(uri.to_string()))
    }

    /// MIME type of the resource at `uri`
    pub fn get_type(&self, uri: &ResourceUri) -> Result<&'static str> {
        match self.resolve(uri)? {
            Resource::Collection => Ok(contract::CONTENT_LIST_TYPE),
            Resource::Item(_) => Ok(contract::CONTENT_ITEM_TYPE),
        }
    }

    /// Read rows. For an item URI the selection and sort order are replaced by an id match.
    pub fn query(
        &self,
        uri: &ResourceUri,
        projection: Option<&[&str]>,
        selection: Selection,
        sort_order: Option<&str>,
    ) -> Result<Cursor> {
        let (selection, sort_order) = match self.resolve(uri)? {
            Resource::Collection => {
                let order = sort_order.map(selection::validate_sort_order).transpose()?;
                (selection, order)
            }
            Resource::Item(id) => (Selection::by_id(id), None),
        };
        let columns = selection::resolve_projection(projection)?;

        let subscription = self.notifier.subscribe(uri, true);
        let rows = self.store.query(&columns, &selection, sort_order.as_deref())?;
        tracing::debug!("Query {} returned {} row(s)", uri, rows.len());

        Ok(Cursor {
            columns,
            rows,
            subscription,
            stale: AtomicBool::new(false),
        })
    }

    /// Insert a book into the collection.
    ///
    /// Validation failures are errors. A storage-level failure of the insert
    /// itself is logged and reported as `Ok(None)`.
    pub fn insert(&self, uri: &ResourceUri, values: &ContentValues) -> Result<Option<ResourceUri>> {
        match self.resolve(uri)? {
            Resource::Collection => {}
            Resource::Item(_) => {
                return Err(Error::UnsupportedOperation { operation: "insert", uri: uri.to_string() });
            }
        }
        validate(values, Validation::Insert)?;

        // Open failures are fatal and must not be mistaken for a failed insert.
        self.store.ensure_open()?;

        let id = match self.store.insert(values) {
            Ok(id) => id,
            Err(Error::Storage(e)) => {
                tracing::error!("Failed to insert row for {}: {}", uri, e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.notifier.publish(uri);
        Ok(Some(uri.with_appended_id(id)))
    }

    /// Update rows; only the columns present in `values` are touched.
    pub fn update(&self, uri: &ResourceUri, values: &ContentValues, selection: Selection) -> Result<usize> {
        let selection = match self.resolve(uri)? {
            Resource::Collection => selection,
            Resource::Item(id) => Selection::by_id(id),
        };
        validate(values, Validation::Update)?;

        if values.is_empty() {
            return Ok(0);
        }

        let updated = self.store.update(values, &selection)?;
        if updated > 0 {
            self.notifier.publish(uri);
        }
        Ok(updated)
    }

    /// Delete rows. An unfiltered collection delete removes every book.
    pub fn delete(&self, uri: &ResourceUri, selection: Selection) -> Result<usize> {
        let selection = match self.resolve(uri)? {
            Resource::Collection => selection,
            Resource::Item(id) => Selection::by_id(id),
        };

        let deleted = self.store.delete(&selection)?;
        if deleted > 0 {
            self.notifier.publish(uri);
        }
        Ok(deleted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validation {
    Insert,
    Update,
}

fn validate(values: &ContentValues, mode: Validation) -> Result<()> {
    for column in values.keys() {
        if column == contract::ID {
            return Err(Error::InvalidArgument("id is assigned by storage".to_string()));
        }
        if !contract::is_known_column(column) {
            return Err(Error::InvalidArgument(format!("unknown column {}", column)));
        }
    }

    // Inserts check every required field; updates only the ones supplied.
    let checked = |column: &str| mode == Validation::Insert || values.contains_key(column);

    if checked(contract::NAME) && !has_text(values, contract::NAME) {
        return Err(Error::InvalidArgument("missing title".to_string()));
    }
    if checked(contract::PRICE) && !has_non_negative(values, contract::PRICE) {
        return Err(Error::InvalidArgument("missing/invalid price".to_string()));
    }
    if checked(contract::SUPPLIER_NAME) && !has_text(values, contract::SUPPLIER_NAME) {
        return Err(Error::InvalidArgument("missing supplier".to_string()));
    }
    if values.contains_key(contract::QUANTITY) && !has_non_negative(values, contract::QUANTITY) {
        return Err(Error::InvalidArgument("invalid quantity".to_string()));
    }
    Ok(())
}

fn has_text(values: &ContentValues, column: &str) -> bool {
    values.get_as_string(column).is_some_and(|s| !s.is_empty())
}

fn has_non_negative(values: &ContentValues, column: &str) -> bool {
    values.get_as_integer(column).is_some_and(|n| n >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::NewBook;

    fn fangirl() -> ContentValues {
        NewBook::new("Fangirl", 40, "SuperNova")
            .quantity(15)
            .supplier_number("789654321")
            .to_values()
    }

    fn row_count(provider: &BookProvider) -> usize {
        provider.store().count().unwrap()
    }

    #[test]
    fn test_match_uri() {
        assert_eq!(match_uri(&contract::content_uri()), Some(Resource::Collection));
        assert_eq!(match_uri(&contract::item_uri(8)), Some(Resource::Item(8)));

        for bad in [
            "content://com.example.android.books",
            "content://com.example.android.books/authors",
            "content://com.example.android.books/books/abc",
            "content://com.example.android.books/books/-1",
            "content://com.example.android.books/books/1/2",
            "content://other.authority/books",
            "file://com.example.android.books/books",
        ] {
            assert_eq!(match_uri(&ResourceUri::parse(bad).unwrap()), None, "{}", bad);
        }
    }

    #[test]
    fn test_get_type() {
        let provider = BookProvider::open_in_memory().unwrap();
        assert_eq!(provider.get_type(&contract::content_uri()).unwrap(), contract::CONTENT_LIST_TYPE);
        assert_eq!(provider.get_type(&contract::item_uri(1)).unwrap(), contract::CONTENT_ITEM_TYPE);

        let unknown = ResourceUri::parse("content://com.example.android.books/shelves").unwrap();
        assert!(matches!(provider.get_type(&unknown), Err(Error::UnknownResource(_))));
    }

    #[test]
    fn test_insert_scenario() {
        let provider = BookProvider::open_in_memory().unwrap();
        let uri = provider.insert(&contract::content_uri(), &fangirl()).unwrap().unwrap();
        assert_eq!(uri, contract::item_uri(1));
        assert_eq!(uri.parse_id(), Some(1));

        let cursor = provider
            .query(&contract::content_uri(), None, Selection::all(), None)
            .unwrap();
        let books = cursor.to_books().unwrap();
        assert_eq!(books.len(), 1);
        let book = &books[0];
        assert_eq!(book.id, 1);
        assert_eq!(book.name, "Fangirl");
        assert_eq!(book.author, None);
        assert_eq!(book.price, 40);
        assert_eq!(book.quantity, 15);
        assert_eq!(book.supplier_name, "SuperNova");
        assert_eq!(book.supplier_number.as_deref(), Some("789654321"));
    }

    #[test]
    fn test_inserted_ids_are_distinct() {
        let provider = BookProvider::open_in_memory().unwrap();
        let mut ids = Vec::new();
        for _ in 0..5 {
            let uri = provider.insert(&contract::content_uri(), &fangirl()).unwrap().unwrap();
            let id = uri.parse_id().unwrap();
            assert!(!ids.contains(&id));
            ids.push(id);

            let cursor = provider.query(&uri, None, Selection::all(), None).unwrap();
            assert_eq!(cursor.len(), 1);
            assert_eq!(cursor.get_integer(0, contract::ID), Some(id));
        }
    }

    #[test]
    fn test_insert_validation() {
        let provider = BookProvider::open_in_memory().unwrap();
        let uri = contract::content_uri();

        let mut negative = fangirl();
        negative.put(contract::PRICE, -5);
        assert!(matches!(provider.insert(&uri, &negative), Err(Error::InvalidArgument(m)) if m == "missing/invalid price"));

        let mut no_price = fangirl();
        no_price.remove(contract::PRICE);
        assert!(matches!(provider.insert(&uri, &no_price), Err(Error::InvalidArgument(_))));

        let mut text_price = fangirl();
        text_price.put(contract::PRICE, "forty");
        assert!(matches!(provider.insert(&uri, &text_price), Err(Error::InvalidArgument(_))));

        let mut empty_name = fangirl();
        empty_name.put(contract::NAME, "");
        assert!(matches!(provider.insert(&uri, &empty_name), Err(Error::InvalidArgument(m)) if m == "missing title"));

        let mut no_supplier = fangirl();
        no_supplier.remove(contract::SUPPLIER_NAME);
        assert!(matches!(provider.insert(&uri, &no_supplier), Err(Error::InvalidArgument(m)) if m == "missing supplier"));

        let mut null_supplier = fangirl();
        null_supplier.put_null(contract::SUPPLIER_NAME);
        assert!(matches!(provider.insert(&uri, &null_supplier), Err(Error::InvalidArgument(_))));

        let mut negative_quantity = fangirl();
        negative_quantity.put(contract::QUANTITY, -1);
        assert!(matches!(provider.insert(&uri, &negative_quantity), Err(Error::InvalidArgument(_))));

        let mut with_id = fangirl();
        with_id.put(contract::ID, 99);
        assert!(matches!(provider.insert(&uri, &with_id), Err(Error::InvalidArgument(_))));

        assert_eq!(row_count(&provider), 0);
    }

    #[test]
    fn test_insert_on_item_uri_is_unsupported() {
        let provider = BookProvider::open_in_memory().unwrap();
        let result = provider.insert(&contract::item_uri(1), &fangirl());
        assert!(matches!(result, Err(Error::UnsupportedOperation { operation: "insert", .. })));
    }

    #[test]
    fn test_unknown_uri_fails_every_operation() {
        let provider = BookProvider::open_in_memory().unwrap();
        let unknown = ResourceUri::parse("content://com.example.android.books/books/1/extra").unwrap();

        assert!(matches!(provider.query(&unknown, None, Selection::all(), None), Err(Error::UnknownResource(_))));
        assert!(matches!(provider.insert(&unknown, &fangirl()), Err(Error::UnknownResource(_))));
        assert!(matches!(provider.update(&unknown, &fangirl(), Selection::all()), Err(Error::UnknownResource(_))));
        assert!(matches!(provider.delete(&unknown, Selection::all()), Err(Error::UnknownResource(_))));
    }

    #[test]
    fn test_partial_update_scenario() {
        let provider = BookProvider::open_in_memory().unwrap();
        let mut values = fangirl();
        values.put(contract::AUTHOR, "Rainbow Rowell");
        let uri = provider.insert(&contract::content_uri(), &values).unwrap().unwrap();

        let mut change = ContentValues::new();
        change.put(contract::QUANTITY, 14);
        assert_eq!(provider.update(&uri, &change, Selection::all()).unwrap(), 1);

        let book = provider
            .query(&uri, None, Selection::all(), None)
            .unwrap()
            .to_books()
            .unwrap()
            .remove(0);
        assert_eq!(book.quantity, 14);
        assert_eq!(book.name, "Fangirl");
        assert_eq!(book.author.as_deref(), Some("Rainbow Rowell"));
        assert_eq!(book.price, 40);
        assert_eq!(book.supplier_name, "SuperNova");
        assert_eq!(book.supplier_number.as_deref(), Some("789654321"));
    }

    #[test]
    fn test_item_update_ignores_caller_selection() {
        let provider = BookProvider::open_in_memory().unwrap();
        let first = provider.insert(&contract::content_uri(), &fangirl()).unwrap().unwrap();
        provider.insert(&contract::content_uri(), &fangirl()).unwrap().unwrap();

        let mut change = ContentValues::new();
        change.put(contract::PRICE, 55);
        let everything = Selection::new("1 = 1", vec![]);
        assert_eq!(provider.update(&first, &change, everything).unwrap(), 1);

        let cursor = provider
            .query(&contract::content_uri(), Some(&[contract::PRICE]), Selection::all(), Some("id"))
            .unwrap();
        assert_eq!(cursor.get_integer(0, contract::PRICE), Some(55));
        assert_eq!(cursor.get_integer(1, contract::PRICE), Some(40));
    }

    #[test]
    fn test_update_missing_row_returns_zero() {
        let provider = BookProvider::open_in_memory().unwrap();
        let sub = provider.notifier().subscribe(&contract::content_uri(), true);

        let mut change = ContentValues::new();
        change.put(contract::QUANTITY, 3);
        assert_eq!(provider.update(&contract::item_uri(42), &change, Selection::all()).unwrap(), 0);
        assert!(!sub.take_changed());
    }

    #[test]
    fn test_update_validation() {
        let provider = BookProvider::open_in_memory().unwrap();
        let uri = provider.insert(&contract::content_uri(), &fangirl()).unwrap().unwrap();

        for (column, value) in [
            (contract::NAME, FieldValue::Text(String::new())),
            (contract::PRICE, FieldValue::Integer(-5)),
            (contract::PRICE, FieldValue::Null),
            (contract::SUPPLIER_NAME, FieldValue::Null),
            (contract::QUANTITY, FieldValue::Integer(-1)),
            (contract::ID, FieldValue::Integer(7)),
        ] {
            let mut change = ContentValues::new();
            change.put(column, value);
            assert!(matches!(
                provider.update(&uri, &change, Selection::all()),
                Err(Error::InvalidArgument(_))
            ));
        }

        let book = provider.query(&uri, None, Selection::all(), None).unwrap().to_books().unwrap().remove(0);
        assert_eq!(book.price, 40);
        assert_eq!(book.quantity, 15);
        assert_eq!(book.id, 1);
    }

    #[test]
    fn test_empty_update_is_noop() {
        let provider = BookProvider::open_in_memory().unwrap();
        provider.insert(&contract::content_uri(), &fangirl()).unwrap();
        assert_eq!(provider.update(&contract::content_uri(), &ContentValues::new(), Selection::all()).unwrap(), 0);
    }

    #[test]
    fn test_delete_all_scenario() {
        let provider = BookProvider::open_in_memory().unwrap();
        provider.insert(&contract::content_uri(), &fangirl()).unwrap();
        provider.insert(&contract::content_uri(), &fangirl()).unwrap();

        assert_eq!(provider.delete(&contract::content_uri(), Selection::all()).unwrap(), 2);
        let cursor = provider.query(&contract::content_uri(), None, Selection::all(), None).unwrap();
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_item_delete_removes_one_row() {
        let provider = BookProvider::open_in_memory().unwrap();
        let first = provider.insert(&contract::content_uri(), &fangirl()).unwrap().unwrap();
        provider.insert(&contract::content_uri(), &fangirl()).unwrap();

        let everything = Selection::new("1 = 1", vec![]);
        assert_eq!(provider.delete(&first, everything).unwrap(), 1);
        assert_eq!(provider.delete(&first, Selection::all()).unwrap(), 0);
        assert_eq!(row_count(&provider), 1);
    }

    #[test]
    fn test_collection_delete_with_filter() {
        let provider = BookProvider::open_in_memory().unwrap();
        provider.insert(&contract::content_uri(), &NewBook::new("Cheap", 5, "S").to_values()).unwrap();
        provider.insert(&contract::content_uri(), &NewBook::new("Dear", 50, "S").to_values()).unwrap();

        let cheap = Selection::new("price < ?", vec!["10".to_string()]);
        assert_eq!(provider.delete(&contract::content_uri(), cheap).unwrap(), 1);

        let cursor = provider.query(&contract::content_uri(), Some(&[contract::NAME]), Selection::all(), None).unwrap();
        assert_eq!(cursor.get_string(0, contract::NAME).as_deref(), Some("Dear"));
    }

    #[test]
    fn test_query_projection_and_sort() {
        let provider = BookProvider::open_in_memory().unwrap();
        for (name, price) in [("B", 20), ("A", 30), ("C", 10)] {
            provider.insert(&contract::content_uri(), &NewBook::new(name, price, "S").to_values()).unwrap();
        }

        let cursor = provider
            .query(&contract::content_uri(), Some(&[contract::NAME, contract::PRICE]), Selection::all(), Some("price desc"))
            .unwrap();
        assert_eq!(cursor.columns(), &["name".to_string(), "price".to_string()]);
        let names: Vec<_> = (0..cursor.len()).map(|r| cursor.get_string(r, contract::NAME).unwrap()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(cursor.to_books().is_err());

        let unsorted = provider.query(&contract::content_uri(), Some(&[contract::NAME]), Selection::all(), None).unwrap();
        assert_eq!(unsorted.get_string(0, contract::NAME).as_deref(), Some("B"));

        assert!(matches!(
            provider.query(&contract::content_uri(), None, Selection::all(), Some("price; DROP TABLE books")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_item_query_ignores_filter_and_sort() {
        let provider = BookProvider::open_in_memory().unwrap();
        provider.insert(&contract::content_uri(), &fangirl()).unwrap();
        let second = provider.insert(&contract::content_uri(), &fangirl()).unwrap().unwrap();

        let cursor = provider
            .query(&second, None, Selection::new("id = ?", vec!["1".into()]), Some("bogus order"))
            .unwrap();
        assert_eq!(cursor.len(), 1);
        assert_eq!(cursor.get_integer(0, contract::ID), Some(2));
    }

    #[test]
    fn test_notifications_follow_mutations() {
        let provider = BookProvider::open_in_memory().unwrap();
        let cursor = provider.query(&contract::content_uri(), None, Selection::all(), None).unwrap();
        assert!(!cursor.is_stale());

        let item = provider.insert(&contract::content_uri(), &fangirl()).unwrap().unwrap();
        assert_eq!(cursor.subscription().drain(), vec![contract::content_uri()]);

        let item_cursor = provider.query(&item, None, Selection::all(), None).unwrap();
        let mut change = ContentValues::new();
        change.put(contract::QUANTITY, 1);
        provider.update(&item, &change, Selection::all()).unwrap();
        assert!(item_cursor.is_stale());
        assert_eq!(cursor.subscription().drain(), vec![item.clone()]);

        provider.delete(&item, Selection::all()).unwrap();
        assert!(cursor.is_stale());
        assert!(item_cursor.is_stale());

        provider.delete(&item, Selection::all()).unwrap();
        assert!(cursor.subscription().drain().is_empty());
    }

    #[test]
    fn test_cursor_stays_stale_once_changed() {
        let provider = BookProvider::open_in_memory().unwrap();
        let cursor = provider.query(&contract::content_uri(), None, Selection::all(), None).unwrap();
        assert!(!cursor.is_stale());
        assert!(!cursor.is_stale());

        provider.insert(&contract::content_uri(), &fangirl()).unwrap();
        assert!(cursor.is_stale());
        assert!(cursor.is_stale());
        assert!(cursor.is_empty());

        let fresh = provider.query(&contract::content_uri(), None, Selection::all(), None).unwrap();
        assert!(!fresh.is_stale());
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn test_failed_validation_sends_no_notification() {
        let provider = BookProvider::open_in_memory().unwrap();
        let sub = provider.notifier().subscribe(&contract::content_uri(), true);
        let mut negative = fangirl();
        negative.put(contract::PRICE, -5);
        assert!(provider.insert(&contract::content_uri(), &negative).is_err());
        assert!(!sub.take_changed());
    }

    #[test]
    fn test_storage_failure_on_insert_is_soft() {
        let provider = BookProvider::open_in_memory().unwrap();
        provider
            .store()
            .writable()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_books BEFORE INSERT ON books BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();
        let sub = provider.notifier().subscribe(&contract::content_uri(), true);

        let result = provider.insert(&contract::content_uri(), &fangirl()).unwrap();
        assert_eq!(result, None);
        assert!(!sub.take_changed());
    }
}
