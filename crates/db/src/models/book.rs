//! Book entity model.

use bookbase_core::csv::CsvBook;
use bookbase_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `books` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub rating: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Book> for CsvBook {
    fn from(book: &Book) -> Self {
        CsvBook {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            publisher: book.publisher.clone(),
            year: book.year,
            genre: book.genre.clone(),
            rating: book.rating,
        }
    }
}
