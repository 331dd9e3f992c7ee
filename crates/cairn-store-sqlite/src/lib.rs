//! SQLite backend for the Cairn student store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs off the async
//! runtime's worker threads. Documents are stored as schema-less JSON text:
//! the parent row carries the full inline snapshot, and `subrecords` rows
//! carry the authoritative per-record documents. Every read passes through
//! the normalizer in `cairn-core`, so malformed stored documents degrade
//! instead of failing.

mod schema;
mod store;

pub use store::SqliteStore;

#[cfg(test)]
mod tests;
