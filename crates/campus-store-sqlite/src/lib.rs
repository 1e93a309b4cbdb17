//! SQLite backend for the Campus directory store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. The UNIQUE constraints on
//! `email` and `external_subject_id` carry the concurrent first-sign-in
//! race-resolution guarantee.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
