//! Domain logic for the BookBase catalog.
//!
//! Everything here is free of database and HTTP concerns: field validation,
//! ISBN normalization, filter/sort query descriptors, CSV encoding, and the
//! batch import orchestration (which talks to storage only through the
//! [`import::BookStore`] trait).

pub mod book;
pub mod csv;
pub mod error;
pub mod import;
pub mod isbn;
pub mod query;
pub mod types;
pub mod validation;
