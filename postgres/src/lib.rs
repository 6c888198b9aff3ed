//! `PostgreSQL` record store for the Events Project.
//!
//! [`PostgresRecordStore`] implements the participant, event and logistics
//! repository traits from `eventsproject-core` on top of a sqlx connection
//! pool. The schema lives in `migrations/` and is applied with
//! [`PostgresRecordStore::migrate`].
//!
//! # Example
//!
//! ```no_run
//! use eventsproject_core::AggregationService;
//! use eventsproject_core::config::AggregationConfig;
//! use eventsproject_postgres::PostgresRecordStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresRecordStore::new("postgres://localhost/events").await?;
//!     store.migrate().await?;
//!     let aggregation = AggregationService::new(store.clone(), AggregationConfig::default());
//!     let costs = aggregation.compute_organizer_event_costs().await?;
//!     println!("{} events priced", costs.len());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod store;

pub use store::PostgresRecordStore;
