//! Shared response envelope types for API handlers.
//!
//! Every successful JSON response carries `"success": true` next to its
//! payload; errors are rendered by [`crate::error::AppError`] with
//! `"success": false`. Use these structs instead of ad-hoc `json!` bodies so
//! the shapes stay consistent across handlers.

use bookbase_core::import::ImportReport;
use bookbase_core::types::DbId;
use bookbase_db::models::book::Book;
use serde::Serialize;

/// `{ "success": true, "books": [...], "count": n }`
#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub success: bool,
    pub count: usize,
    pub books: Vec<Book>,
}

impl BookListResponse {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            success: true,
            count: books.len(),
            books,
        }
    }
}

/// `{ "success": true, "book": {...} }`
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub success: bool,
    pub book: Book,
}

/// `{ "success": true, "message": "..." }`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// `{ "success": true, "message": "...", "book_id": id }`
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub book_id: DbId,
}

/// The CSV batch report flattened next to `"success": true`.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: ImportReport,
}
