//! Repository for the `books` table.

use bookbase_core::book::{DuplicateBook, NewBook};
use bookbase_core::query::{BookQuery, Predicate};
use bookbase_core::types::DbId;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::models::book::Book;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, author, isbn, publisher, year, genre, rating, created_at, updated_at";

/// Provides CRUD, filtered listing, and ISBN lookups for books.
pub struct BookRepo;

impl BookRepo {
    /// Insert a new book, returning the created row.
    pub async fn create(conn: &mut PgConnection, input: &NewBook) -> Result<Book, sqlx::Error> {
        let query = format!(
            "INSERT INTO books (title, author, isbn, publisher, year, genre, rating)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(&input.title)
            .bind(&input.author)
            .bind(&input.isbn)
            .bind(&input.publisher)
            .bind(input.year)
            .bind(&input.genre)
            .bind(input.rating)
            .fetch_one(conn)
            .await
    }

    /// Find a book by its ID.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List books matching a query descriptor, in its requested order.
    pub async fn list(conn: &mut PgConnection, query: &BookQuery) -> Result<Vec<Book>, sqlx::Error> {
        let mut builder = build_list_query(query);
        builder.build_query_as::<Book>().fetch_all(conn).await
    }

    /// Replace every user-supplied field of a book.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &NewBook,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "UPDATE books SET
                title = $2,
                author = $3,
                isbn = $4,
                publisher = $5,
                year = $6,
                genre = $7,
                rating = $8,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.author)
            .bind(&input.isbn)
            .bind(&input.publisher)
            .bind(input.year)
            .bind(&input.genre)
            .bind(input.rating)
            .fetch_optional(conn)
            .await
    }

    /// Permanently delete a book by ID. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find the book that owns a normalized ISBN.
    ///
    /// A blank ISBN never matches and does not touch the database.
    pub async fn find_by_isbn(
        conn: &mut PgConnection,
        isbn: &str,
    ) -> Result<Option<DuplicateBook>, sqlx::Error> {
        if isbn.trim().is_empty() {
            return Ok(None);
        }
        let row: Option<(DbId, String, String)> =
            sqlx::query_as("SELECT id, title, author FROM books WHERE isbn = $1")
                .bind(isbn)
                .fetch_optional(conn)
                .await?;
        Ok(row.map(into_duplicate))
    }

    /// Like [`BookRepo::find_by_isbn`], ignoring the book being updated.
    pub async fn find_by_isbn_excluding(
        conn: &mut PgConnection,
        isbn: &str,
        exclude_id: DbId,
    ) -> Result<Option<DuplicateBook>, sqlx::Error> {
        if isbn.trim().is_empty() {
            return Ok(None);
        }
        let row: Option<(DbId, String, String)> =
            sqlx::query_as("SELECT id, title, author FROM books WHERE isbn = $1 AND id <> $2")
                .bind(isbn)
                .bind(exclude_id)
                .fetch_optional(conn)
                .await?;
        Ok(row.map(into_duplicate))
    }
}

fn into_duplicate((id, title, author): (DbId, String, String)) -> DuplicateBook {
    DuplicateBook { id, title, author }
}

// ---------------------------------------------------------------------------
// Query rendering
// ---------------------------------------------------------------------------

/// Render a [`BookQuery`] into a `SELECT` with every value bound.
///
/// Column names and sort direction come from closed enums; user input only
/// ever reaches the statement through `push_bind`. `id` is always the final
/// sort key so equal rows come back in a stable order.
pub fn build_list_query(query: &BookQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {COLUMNS} FROM books WHERE "));
    push_predicate(&mut builder, &query.predicate);
    builder.push(format!(
        " ORDER BY {} {} NULLS LAST, id ASC",
        query.sort.column.as_str(),
        query.sort.direction.as_sql()
    ));
    builder
}

fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::All => {
            builder.push("TRUE");
        }
        Predicate::And(parts) => push_group(builder, parts, " AND ", "TRUE"),
        Predicate::Or(parts) => push_group(builder, parts, " OR ", "FALSE"),
        Predicate::Contains { column, value } => {
            builder
                .push(column.as_str())
                .push(" ILIKE ")
                .push_bind(format!("%{}%", escape_like(value)));
        }
        Predicate::Equals { column, value } => {
            builder
                .push(column.as_str())
                .push(" = ")
                .push_bind(value.clone());
        }
        Predicate::AtLeast { column, value } => {
            builder.push(column.as_str()).push(" >= ").push_bind(*value);
        }
        Predicate::AtMost { column, value } => {
            builder.push(column.as_str()).push(" <= ").push_bind(*value);
        }
    }
}

fn push_group(
    builder: &mut QueryBuilder<'static, Postgres>,
    parts: &[Predicate],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        builder.push(empty);
        return;
    }
    builder.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            builder.push(separator);
        }
        push_predicate(builder, part);
    }
    builder.push(")");
}

/// Escape `LIKE` wildcards so the value matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
