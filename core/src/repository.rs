//! Record store traits.
//!
//! The services reach persistence only through these traits, one per entity
//! kind. Lookups by key return [`RepositoryError::NotFound`] when nothing
//! matches; searches return an empty `Vec` instead.
//!
//! # Implementations
//!
//! - `PostgresRecordStore` (in `eventsproject-postgres` crate): Production implementation
//! - [`crate::mocks::InMemoryRecordStore`] (feature `test-utils`): Fast, deterministic testing
//!
//! # Example
//!
//! ```no_run
//! use eventsproject_core::repository::EventRepository;
//! use eventsproject_core::error::RepositoryError;
//!
//! async fn example<R: EventRepository>(events: &R) -> Result<(), RepositoryError> {
//!     let mut event = events.find_event_by_description("Spring gala").await?;
//!     event.description = "Spring gala (moved)".to_string();
//!     let saved = events.save_event(&event).await?;
//!     assert_eq!(saved.id, event.id);
//!     Ok(())
//! }
//! ```

use crate::error::RepositoryError;
use crate::types::{
    Event, EventId, Logistics, LogisticsId, Participant, ParticipantId, ParticipantIdentity,
};
use chrono::NaiveDate;
use std::future::Future;

/// Result type alias for record store operations.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Participant repository.
pub trait ParticipantRepository: Send + Sync {
    /// Get participant by ID.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Store operation fails
    /// - Participant not found → `RepositoryError::NotFound`
    fn get_participant(
        &self,
        id: ParticipantId,
    ) -> impl Future<Output = RepositoryResult<Participant>> + Send;

    /// Insert or update a participant.
    ///
    /// Returns the stored record with its id populated.
    ///
    /// # Errors
    ///
    /// Returns error if the store operation fails.
    fn save_participant(
        &self,
        participant: &Participant,
    ) -> impl Future<Output = RepositoryResult<Participant>> + Send;
}

/// Event repository.
///
/// Loaded events carry their participants and logistics.
pub trait EventRepository: Send + Sync {
    /// Get event by ID.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Store operation fails
    /// - Event not found → `RepositoryError::NotFound`
    fn get_event(&self, id: EventId) -> impl Future<Output = RepositoryResult<Event>> + Send;

    /// Get the event whose description equals `description` exactly.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Store operation fails
    /// - No event has this description → `RepositoryError::NotFound`
    fn find_event_by_description(
        &self,
        description: &str,
    ) -> impl Future<Output = RepositoryResult<Event>> + Send;

    /// Events whose start date lies in `[start, end]`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns error if the store operation fails.
    fn find_events_starting_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = RepositoryResult<Vec<Event>>> + Send;

    /// Events with at least one participant matching `identity`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns error if the store operation fails.
    fn find_events_by_participant(
        &self,
        identity: &ParticipantIdentity,
    ) -> impl Future<Output = RepositoryResult<Vec<Event>>> + Send;

    /// Insert or update an event together with its collection memberships.
    ///
    /// Returns the stored record with its id populated.
    ///
    /// # Errors
    ///
    /// Returns error if the store operation fails.
    fn save_event(&self, event: &Event) -> impl Future<Output = RepositoryResult<Event>> + Send;
}

/// Logistics repository.
pub trait LogisticsRepository: Send + Sync {
    /// Get logistics item by ID.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Store operation fails
    /// - Item not found → `RepositoryError::NotFound`
    fn get_logistics(
        &self,
        id: LogisticsId,
    ) -> impl Future<Output = RepositoryResult<Logistics>> + Send;

    /// Insert or update a logistics item.
    ///
    /// Returns the stored record with its id populated.
    ///
    /// # Errors
    ///
    /// Returns error if the store operation fails.
    fn save_logistics(
        &self,
        logistics: &Logistics,
    ) -> impl Future<Output = RepositoryResult<Logistics>> + Send;
}
