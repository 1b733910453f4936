//! Database row models.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching a table
//! row. Write-side input types live in `bookbase_core`, where they are
//! validated.

pub mod book;
