pub mod book;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /books                                           list (filters), create
/// /books/{id}                                      get, replace, delete
/// /books/import-csv                                bulk import (multipart POST)
/// /books/export-csv                                filtered CSV download
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/books", book::router())
}
