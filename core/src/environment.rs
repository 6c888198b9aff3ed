//! Service environment.
//!
//! Bundles the record store implementations the services depend on, so they
//! can be swapped for in-memory versions in tests.

use crate::repository::{EventRepository, LogisticsRepository, ParticipantRepository};

/// Record stores used by the event services.
///
/// # Type Parameters
///
/// - `P`: Participant repository
/// - `E`: Event repository
/// - `L`: Logistics repository
#[derive(Clone, Debug)]
pub struct EventsEnvironment<P, E, L>
where
    P: ParticipantRepository + Clone,
    E: EventRepository + Clone,
    L: LogisticsRepository + Clone,
{
    /// Participant repository.
    pub participants: P,

    /// Event repository.
    pub events: E,

    /// Logistics repository.
    pub logistics: L,
}

impl<P, E, L> EventsEnvironment<P, E, L>
where
    P: ParticipantRepository + Clone,
    E: EventRepository + Clone,
    L: LogisticsRepository + Clone,
{
    /// Create a new environment from one repository per entity kind.
    #[must_use]
    pub const fn new(participants: P, events: E, logistics: L) -> Self {
        Self {
            participants,
            events,
            logistics,
        }
    }
}

impl<S> EventsEnvironment<S, S, S>
where
    S: ParticipantRepository + EventRepository + LogisticsRepository + Clone,
{
    /// Create an environment backed by a single store implementing every
    /// repository trait.
    #[must_use]
    pub fn shared(store: S) -> Self {
        Self {
            participants: store.clone(),
            events: store.clone(),
            logistics: store,
        }
    }
}
