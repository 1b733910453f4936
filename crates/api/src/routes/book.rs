//! Route definitions for the `/books` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::book;
use crate::state::AppState;

/// Routes mounted at `/books`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// POST   /import-csv    -> import_csv
/// GET    /export-csv    -> export_csv
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(book::list).post(book::create))
        .route("/import-csv", post(book::import_csv))
        .route("/export-csv", get(book::export_csv))
        .route(
            "/{id}",
            get(book::get_by_id)
                .put(book::update)
                .delete(book::delete),
        )
}
