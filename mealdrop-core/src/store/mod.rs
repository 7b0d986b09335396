//! Persistent record store for catalog, profile, order and delivery records.
//!
//! [`SqliteStore`] keeps every record in one SQLite database. Each store
//! owns a single connection, so concurrent callers open one store per thread
//! against the same file. Mutations of the meal option quantity counters run
//! inside `IMMEDIATE` transactions, which take the database write lock before
//! the counter is read; a competing writer waits up to
//! [`StoreOptions::busy_timeout`] for the lock and then sees the committed
//! value.

mod sqlite;

pub use sqlite::{DEFAULT_BUSY_TIMEOUT, SqliteStore, StoreError, StoreOptions};
