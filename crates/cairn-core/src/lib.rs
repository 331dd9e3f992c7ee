//! Core types and trait definitions for the Cairn student-advising store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod normalize;
pub mod reconcile;
pub mod record;
pub mod seed;
pub mod store;
pub mod student;

pub use error::{Error, Result};
