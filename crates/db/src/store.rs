//! [`BookStore`] over a single PostgreSQL connection.
//!
//! The CSV importer runs a whole batch through one of these. Each insert is
//! its own statement (autocommit), so a failed row leaves earlier rows in
//! place and later duplicate checks see every row inserted so far.

use async_trait::async_trait;
use bookbase_core::book::{DuplicateBook, NewBook};
use bookbase_core::import::BookStore;
use bookbase_core::types::DbId;
use sqlx::PgConnection;

use crate::repositories::BookRepo;

/// Importer storage backed by a borrowed connection.
pub struct PgBookStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgBookStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl BookStore for PgBookStore<'_> {
    type Error = sqlx::Error;

    async fn find_duplicate(&mut self, isbn: &str) -> Result<Option<DuplicateBook>, sqlx::Error> {
        BookRepo::find_by_isbn(&mut *self.conn, isbn).await
    }

    async fn insert(&mut self, book: &NewBook) -> Result<DbId, sqlx::Error> {
        let created = BookRepo::create(&mut *self.conn, book).await?;
        tracing::debug!(book_id = created.id, title = %created.title, "Imported book");
        Ok(created.id)
    }
}
