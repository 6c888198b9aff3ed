//! In-memory record store for testing.
//!
//! Enabled by the `test-utils` feature (on by default).

pub mod store;

pub use store::{FailureMode, InMemoryRecordStore};
