//! # Events Project Testing
//!
//! Testing utilities and helpers for the Events Project.
//!
//! This crate provides:
//! - Fluent builders for events, participants and logistics
//! - `proptest` strategies for domain types
//! - Tracing set-up for tests
//!
//! ## Example
//!
//! ```
//! use eventsproject_testing::fixtures::{date, EventBuilder, LogisticsBuilder};
//!
//! let event = EventBuilder::new("Event 1")
//!     .starting(date(2023, 6, 1))
//!     .with_logistics(LogisticsBuilder::new("Tables").reserved().price_cents(1000).quantity(5).build())
//!     .build();
//!
//! assert_eq!(event.logistics.len(), 1);
//! ```

pub mod fixtures;
pub mod properties;

pub use fixtures::{EventBuilder, LogisticsBuilder, ParticipantBuilder, date, organizer};

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber writing to the test output.
///
/// Honours `RUST_LOG`, defaulting to `debug`. Safe to call from every test;
/// only the first call installs the subscriber.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
