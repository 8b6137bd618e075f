//! SQLite backend for the casefile document repository.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod cursor;
pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, StoreOptions};

#[cfg(test)]
mod tests;
