//! SQLite backend for the Happy Tails store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each store operation is a plain
//! synchronous function over a `rusqlite::Connection`; multi-statement
//! operations run inside a single transaction.

mod adoption;
mod admin;
mod encode;
mod listings;
mod messages;
mod meta;
mod pets;
mod schema;
mod store;
mod users;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
