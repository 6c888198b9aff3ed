//! # Events Project Core
//!
//! Event association and cost aggregation.
//!
//! This crate links **participants** and **logistics** to **events** and
//! derives each event's cost from its reserved logistics. Persistence is
//! reached only through the record store traits in [`repository`].
//!
//! ## Components
//!
//! - [`types`]: `Event`, `Participant`, `Logistics`, `Role`, `Money`
//! - [`repository`]: record store traits, one per entity kind
//! - [`association`]: attaches participants and logistics to events
//! - [`aggregation`]: date-window logistics queries and cost roll-up
//! - [`scheduler`]: periodic cost recomputation
//! - [`mocks`]: in-memory record store (feature `test-utils`)
//!
//! ## Example
//!
//! ```no_run
//! use eventsproject_core::aggregation::AggregationService;
//! use eventsproject_core::association::AssociationService;
//! use eventsproject_core::config::AggregationConfig;
//! use eventsproject_core::environment::EventsEnvironment;
//! use eventsproject_core::mocks::InMemoryRecordStore;
//! use eventsproject_core::types::{Event, Logistics, Money, Participant, Role};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> eventsproject_core::Result<()> {
//! let store = InMemoryRecordStore::new();
//! let association = AssociationService::new(EventsEnvironment::shared(store.clone()));
//! let aggregation = AggregationService::new(store, AggregationConfig::default());
//!
//! let organizer = association
//!     .create_participant(Participant::new("Tounsi", "Ahmed", Role::Organizer))
//!     .await?;
//! let day = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap_or_default();
//! if let Some(id) = organizer.id {
//!     association.assign_participant(Event::new("Gala", day, day), id).await?;
//! }
//! association
//!     .assign_logistics(Logistics::new("Tables", true, Money::from_cents(1000), 5), "Gala")
//!     .await?;
//!
//! let costs = aggregation.compute_organizer_event_costs().await?;
//! assert_eq!(costs[0].cost, Money::from_cents(5000));
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod association;
pub mod config;
pub mod environment;
pub mod error;
pub mod repository;
pub mod scheduler;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use aggregation::{AggregationService, EventCost};
pub use association::{AssociationService, ParticipantAssignment};
pub use environment::EventsEnvironment;
pub use error::{EntityKind, RepositoryError, Result, ServiceError};
pub use types::{
    Event, EventId, Logistics, LogisticsId, Money, Participant, ParticipantId,
    ParticipantIdentity, Role,
};
