//! Inventory client - typed book operations on top of the provider
//!
//! Everything here goes through [`BookProvider`] URIs, so validation and
//! change notification behave exactly as for any other caller.

use std::sync::Arc;
use serde::Serialize;
use crate::{contract, Error, Result};
use crate::notify::Subscription;
use crate::provider::BookProvider;
use crate::selection::Selection;
use crate::values::{Book, BookChanges, ContentValues, NewBook};

/// Attempts at a compare-and-set quantity change before giving up
const MAX_QUANTITY_RETRIES: usize = 64;

/// Result of a stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantityChange {
    pub before: i64,
    pub after: i64,
}

impl QuantityChange {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Clone)]
pub struct InventoryClient {
    provider: Arc<BookProvider>,
}

impl InventoryClient {
    pub fn new(provider: Arc<BookProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<BookProvider> {
        &self.provider
    }

    /// Insert a book; `None` means storage rejected the row
    pub fn add_book(&self, book: &NewBook) -> Result<Option<i64>> {
        let uri = self.provider.insert(&contract::content_uri(), &book.to_values())?;
        Ok(uri.and_then(|u| u.parse_id()))
    }

    /// Insert the sample record used to populate an empty shop
    pub fn insert_sample_book(&self) -> Result<Option<i64>> {
        let sample = NewBook::new("Fangirl", 40, "SuperNova")
            .author("Rainbow Rowell")
            .quantity(15)
            .supplier_number("789654321");
        self.add_book(&sample)
    }

    pub fn book(&self, id: i64) -> Result<Option<Book>> {
        let cursor = self.provider.query(&contract::item_uri(id), None, Selection::all(), None)?;
        Ok(cursor.to_books()?.into_iter().next())
    }

    /// All books in insertion order
    pub fn books(&self) -> Result<Vec<Book>> {
        self.books_sorted(contract::ID)
    }

    pub fn books_sorted(&self, sort_order: &str) -> Result<Vec<Book>> {
        let cursor = self.provider.query(&contract::content_uri(), None, Selection::all(), Some(sort_order))?;
        cursor.to_books()
    }

    /// Apply a partial update; returns rows changed (0 if the book is gone)
    pub fn edit(&self, id: i64, changes: &BookChanges) -> Result<usize> {
        self.provider.update(&contract::item_uri(id), &changes.to_values(), Selection::all())
    }

    /// Sell one copy. Returns `false` when the book is missing or out of stock.
    pub fn sell(&self, id: i64) -> Result<bool> {
        Ok(self.adjust_quantity(id, -1)?.is_some_and(|c| c.changed()))
    }

    pub fn restock(&self, id: i64, amount: i64) -> Result<Option<QuantityChange>> {
        self.adjust_quantity(id, amount)
    }

    /// Move stock by `delta`, never below zero. `None` if the book does not exist.
    ///
    /// The write only lands if the quantity is still the one that was read, so
    /// concurrent adjustments never overwrite each other.
    pub fn adjust_quantity(&self, id: i64, delta: i64) -> Result<Option<QuantityChange>> {
        for _ in 0..MAX_QUANTITY_RETRIES {
            let Some(book) = self.book(id)? else {
                return Ok(None);
            };

            let before = book.quantity;
            let after = before.saturating_add(delta).max(0);
            if after == before {
                return Ok(Some(QuantityChange { before, after }));
            }

            let mut values = ContentValues::new();
            values.put(contract::QUANTITY, after);
            let guard = Selection::new(
                format!("{} = ? AND {} = ?", contract::ID, contract::QUANTITY),
                vec![id.to_string(), before.to_string()],
            );
            if self.provider.update(&contract::content_uri(), &values, guard)? == 1 {
                return Ok(Some(QuantityChange { before, after }));
            }
            tracing::debug!("Quantity of book {} changed underneath us, retrying", id);
            std::thread::yield_now();
        }

        tracing::warn!("Giving up on quantity of book {} after {} conflicts", id, MAX_QUANTITY_RETRIES);
        Err(Error::Contention { id })
    }

    /// Returns `true` if the book existed
    pub fn delete_book(&self, id: i64) -> Result<bool> {
        Ok(self.provider.delete(&contract::item_uri(id), Selection::all())? > 0)
    }

    pub fn delete_all(&self) -> Result<usize> {
        self.provider.delete(&contract::content_uri(), Selection::all())
    }

    /// Subscribe to every change in the collection
    pub fn watch(&self) -> Subscription {
        self.provider.notifier().subscribe(&contract::content_uri(), true)
    }
}

/// Outcome of saving an edit form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new, untouched form; nothing was written
    Skipped,
    Inserted(i64),
    /// Storage refused the insert
    InsertFailed,
    Updated(usize),
}

/// Draft state of one add/edit form.
///
/// Holds the "has this record changed" flag per form instead of in shared state.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    target: Option<i64>,
    draft: BookChanges,
    changed: bool,
}

impl EditSession {
    /// Form for a book that does not exist yet
    pub fn new_book() -> Self {
        Self::default()
    }

    /// Form editing an existing book
    pub fn editing(id: i64) -> Self {
        Self { target: Some(id), ..Self::default() }
    }

    pub fn target(&self) -> Option<i64> {
        self.target
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    pub fn draft(&self) -> &BookChanges {
        &self.draft
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.draft.name = Some(name.into());
        self.touch()
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> &mut Self {
        self.draft.author = Some(author.into());
        self.touch()
    }

    pub fn set_price(&mut self, price: i64) -> &mut Self {
        self.draft.price = Some(price);
        self.touch()
    }

    pub fn set_quantity(&mut self, quantity: i64) -> &mut Self {
        self.draft.quantity = Some(quantity);
        self.touch()
    }

    pub fn set_supplier_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.draft.supplier_name = Some(name.into());
        self.touch()
    }

    pub fn set_supplier_number(&mut self, number: impl Into<String>) -> &mut Self {
        self.draft.supplier_number = Some(number.into());
        self.touch()
    }

    fn touch(&mut self) -> &mut Self {
        self.changed = true;
        self
    }

    fn is_blank(&self) -> bool {
        let blank = |field: &Option<String>| field.as_deref().is_none_or(str::is_empty);
        blank(&self.draft.name)
            && blank(&self.draft.author)
            && blank(&self.draft.supplier_name)
            && blank(&self.draft.supplier_number)
            && self.draft.price.is_none()
            && self.draft.quantity.is_none()
    }

    /// Insert or update depending on the form's target.
    pub fn save(&mut self, client: &InventoryClient) -> Result<SaveOutcome> {
        let outcome = match self.target {
            None if self.is_blank() => return Ok(SaveOutcome::Skipped),
            None => {
                let uri = client
                    .provider()
                    .insert(&contract::content_uri(), &self.draft.to_values())?;
                match uri.and_then(|u| u.parse_id()) {
                    Some(id) => {
                        self.target = Some(id);
                        SaveOutcome::Inserted(id)
                    }
                    None => SaveOutcome::InsertFailed,
                }
            }
            Some(id) => SaveOutcome::Updated(client.edit(id, &self.draft)?),
        };

        if outcome != SaveOutcome::InsertFailed {
            self.draft = BookChanges::default();
            self.changed = false;
        }
        Ok(outcome)
    }
}
