//! Async facade over the provider
//!
//! SQLite calls block on disk I/O. Each operation here runs on tokio's blocking
//! pool so callers on an async runtime never stall their event loop.

use std::sync::Arc;
use crate::Result;
use crate::client::{InventoryClient, QuantityChange};
use crate::notify::Subscription;
use crate::provider::{BookProvider, Cursor};
use crate::selection::Selection;
use crate::uri::ResourceUri;
use crate::values::{Book, BookChanges, ContentValues, NewBook};

#[derive(Clone)]
pub struct BookService {
    client: InventoryClient,
}

impl BookService {
    pub fn new(provider: Arc<BookProvider>) -> Self {
        Self { client: InventoryClient::new(provider) }
    }

    pub fn provider(&self) -> &Arc<BookProvider> {
        self.client.provider()
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&InventoryClient) -> Result<T> + Send + 'static,
    {
        let client = self.client.clone();
        tokio::task::spawn_blocking(move || op(&client)).await?
    }

    pub async fn query(
        &self,
        uri: ResourceUri,
        projection: Option<Vec<String>>,
        selection: Selection,
        sort_order: Option<String>,
    ) -> Result<Cursor> {
        self.run(move |c| {
            let columns: Option<Vec<&str>> = projection
                .as_ref()
                .map(|cols| cols.iter().map(String::as_str).collect());
            c.provider().query(&uri, columns.as_deref(), selection, sort_order.as_deref())
        })
        .await
    }

    pub async fn insert(&self, uri: ResourceUri, values: ContentValues) -> Result<Option<ResourceUri>> {
        self.run(move |c| c.provider().insert(&uri, &values)).await
    }

    pub async fn update(&self, uri: ResourceUri, values: ContentValues, selection: Selection) -> Result<usize> {
        self.run(move |c| c.provider().update(&uri, &values, selection)).await
    }

    pub async fn delete(&self, uri: ResourceUri, selection: Selection) -> Result<usize> {
        self.run(move |c| c.provider().delete(&uri, selection)).await
    }

    pub async fn get_type(&self, uri: ResourceUri) -> Result<&'static str> {
        self.run(move |c| c.provider().get_type(&uri)).await
    }

    // ========== Typed Operations ==========

    pub async fn add_book(&self, book: NewBook) -> Result<Option<i64>> {
        self.run(move |c| c.add_book(&book)).await
    }

    pub async fn book(&self, id: i64) -> Result<Option<Book>> {
        self.run(move |c| c.book(id)).await
    }

    pub async fn books(&self) -> Result<Vec<Book>> {
        self.run(|c| c.books()).await
    }

    pub async fn edit(&self, id: i64, changes: BookChanges) -> Result<usize> {
        self.run(move |c| c.edit(id, &changes)).await
    }

    pub async fn adjust_quantity(&self, id: i64, delta: i64) -> Result<Option<QuantityChange>> {
        self.run(move |c| c.adjust_quantity(id, delta)).await
    }

    /// Subscribing never touches storage, so it stays synchronous
    pub fn watch(&self) -> Subscription {
        self.client.watch()
    }
}
