//! Handlers for the `/api/books` resource.
//!
//! Every handler acquires a single pooled connection and holds it for the
//! rest of the request. The guard returns the connection to the pool when it
//! drops, on success and on every error path.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bookbase_core::book::{BookFields, NewBook};
use bookbase_core::csv::{read_rows, write_books, CsvBook};
use bookbase_core::error::CoreError;
use bookbase_core::import::import_rows;
use bookbase_core::query::BookFilter;
use bookbase_core::types::DbId;
use bookbase_db::repositories::BookRepo;
use bookbase_db::store::PgBookStore;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::{
    BookListResponse, BookResponse, CreatedResponse, ImportResponse, MessageResponse,
};
use crate::state::AppState;

/// Multipart field that carries the uploaded CSV file.
const UPLOAD_FIELD: &str = "file";

/// File name offered to the browser for exports.
const EXPORT_FILE_NAME: &str = "bookbase_export.csv";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Book", id })
}

/// Upload failures are the client's fault; an oversized body keeps its 413.
fn upload_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Turn a JSON body into a validated record.
fn parse_book(payload: Result<Json<Value>, JsonRejection>) -> AppResult<NewBook> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let fields = BookFields::from_json(&body)?;
    NewBook::from_fields(&fields).map_err(|errors| CoreError::Validation(errors).into())
}

/// GET /api/books
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<BookFilter>,
) -> AppResult<Json<BookListResponse>> {
    let query = filter.build()?;
    let mut conn = state.pool.acquire().await?;
    let books = BookRepo::list(&mut conn, &query).await?;
    Ok(Json(BookListResponse::new(books)))
}

/// GET /api/books/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<BookResponse>> {
    let mut conn = state.pool.acquire().await?;
    let book = BookRepo::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(BookResponse {
        success: true,
        book,
    }))
}

/// POST /api/books
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<CreatedResponse>> {
    let input = parse_book(payload)?;
    let mut conn = state.pool.acquire().await?;

    if let Some(isbn) = &input.isbn {
        if let Some(existing) = BookRepo::find_by_isbn(&mut conn, isbn).await? {
            return Err(CoreError::Duplicate(existing.conflict_message()).into());
        }
    }

    let book = BookRepo::create(&mut conn, &input).await?;
    tracing::info!(book_id = book.id, title = %book.title, "Book created");

    Ok(Json(CreatedResponse {
        success: true,
        message: "Book added successfully",
        book_id: book.id,
    }))
}

/// PUT /api/books/{id}
///
/// Full replace: fields left out of the body are cleared.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let input = parse_book(payload)?;
    let mut conn = state.pool.acquire().await?;

    if let Some(isbn) = &input.isbn {
        if let Some(existing) = BookRepo::find_by_isbn_excluding(&mut conn, isbn, id).await? {
            return Err(CoreError::Duplicate(existing.conflict_message()).into());
        }
    }

    BookRepo::update(&mut conn, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(book_id = id, "Book updated");

    Ok(Json(MessageResponse::ok("Book updated successfully")))
}

/// DELETE /api/books/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let mut conn = state.pool.acquire().await?;
    if !BookRepo::delete(&mut conn, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(book_id = id, "Book deleted");
    Ok(Json(MessageResponse::ok("Book deleted successfully")))
}

/// POST /api/books/import-csv
///
/// Accept a multipart upload with a `file` field holding a `.csv` file, then
/// import its rows one by one. The response is the batch report; row-level
/// problems never fail the request.
pub async fn import_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ImportResponse>> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(upload_error)?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    if file_name.trim().is_empty() {
        return Err(AppError::BadRequest("No file selected".to_string()));
    }
    if !file_name.to_ascii_lowercase().ends_with(".csv") {
        return Err(AppError::BadRequest("File must be a CSV".to_string()));
    }

    let text = std::str::from_utf8(&data)
        .map_err(|_| AppError::BadRequest("File must be UTF-8 encoded".to_string()))?;
    let rows = read_rows(text)?;
    let row_count = rows.len();

    let mut conn = state.pool.acquire().await?;
    let mut store = PgBookStore::new(&mut conn);
    let report = import_rows(&mut store, rows).await;

    tracing::info!(
        file_name = %file_name,
        rows = row_count,
        imported = report.imported_count,
        errors = report.errors.len(),
        duplicates = report.duplicates.len(),
        "CSV import finished"
    );

    Ok(Json(ImportResponse {
        success: true,
        report,
    }))
}

/// GET /api/books/export-csv
///
/// Same filters as the listing endpoint; responds with a CSV attachment.
pub async fn export_csv(
    State(state): State<AppState>,
    Query(filter): Query<BookFilter>,
) -> AppResult<impl IntoResponse> {
    let query = filter.build()?;
    let mut conn = state.pool.acquire().await?;
    let books = BookRepo::list(&mut conn, &query).await?;

    let csv = write_books(books.iter().map(CsvBook::from))?;
    tracing::debug!(count = books.len(), "Exported books to CSV");

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        csv,
    ))
}
