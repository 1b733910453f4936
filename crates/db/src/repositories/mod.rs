//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! a `&mut PgConnection` as the first argument, so a handler can hold one
//! pooled connection for the whole request.

pub mod book_repo;

pub use book_repo::BookRepo;
