//! Association service.
//!
//! Attaches participants and logistics to events. Every change to an event's
//! collections is followed by an explicit `save_event`, so nothing relies on
//! the store cascading writes from child records.

use crate::environment::EventsEnvironment;
use crate::error::{Result, ServiceError};
use crate::repository::{EventRepository, LogisticsRepository, ParticipantRepository};
use crate::types::{Event, Logistics, Money, Participant, ParticipantId};

/// Outcome of replacing an event's participants from a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantAssignment {
    /// The saved event, holding only resolved participants.
    pub event: Event,
    /// Ids from the payload with no stored participant, in payload order.
    pub unresolved: Vec<ParticipantId>,
}

impl ParticipantAssignment {
    /// Returns `true` if every referenced participant was found
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Returns the event, or an error listing the unresolved ids.
    ///
    /// The event has already been saved either way.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::UnresolvedParticipants` if any id was unresolved.
    pub fn strict(self) -> Result<Event> {
        if self.unresolved.is_empty() {
            Ok(self.event)
        } else {
            Err(ServiceError::UnresolvedParticipants(self.unresolved))
        }
    }
}

/// Links participants and logistics to events.
#[derive(Clone, Debug)]
pub struct AssociationService<P, E, L>
where
    P: ParticipantRepository + Clone,
    E: EventRepository + Clone,
    L: LogisticsRepository + Clone,
{
    env: EventsEnvironment<P, E, L>,
}

impl<P, E, L> AssociationService<P, E, L>
where
    P: ParticipantRepository + Clone,
    E: EventRepository + Clone,
    L: LogisticsRepository + Clone,
{
    /// Create a new association service
    #[must_use]
    pub const fn new(env: EventsEnvironment<P, E, L>) -> Self {
        Self { env }
    }

    /// Persist a new participant and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StoreFailure` if the store rejects the write.
    #[tracing::instrument(skip(self, participant), fields(participant_last_name = %participant.last_name))]
    pub async fn create_participant(&self, participant: Participant) -> Result<Participant> {
        let saved = self.env.participants.save_participant(&participant).await?;

        tracing::info!(participant_id = ?saved.id, role = %saved.role, "Participant created");

        Ok(saved)
    }

    /// Event to apply a participant change to.
    ///
    /// A payload naming a stored event is replaced by the stored record, so
    /// its cost and logistics always come from the store. Any other payload
    /// starts with zero cost.
    async fn base_event(&self, payload: Event) -> Result<Event> {
        if let Some(id) = payload.id {
            match self.env.events.get_event(id).await {
                Ok(stored) => return Ok(stored),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(event_id = %id, "Payload names an unknown event, creating it");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut event = payload;
        event.cost = Money::ZERO;
        Ok(event)
    }

    /// Add the stored participant with `participant_id` to `event` and save
    /// the event.
    ///
    /// If `event` has an id, the change is applied to the stored event;
    /// the payload's cost and collections are ignored. Adding a participant
    /// already in the set leaves the set unchanged; the event is still saved.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No participant has this id → `ServiceError::NotFound` (the event is not saved)
    /// - The store fails → `ServiceError::StoreFailure`
    #[tracing::instrument(skip(self, event), fields(event_description = %event.description))]
    pub async fn assign_participant(
        &self,
        event: Event,
        participant_id: ParticipantId,
    ) -> Result<Event> {
        let participant = self.env.participants.get_participant(participant_id).await?;
        let mut event = self.base_event(event).await?;

        if event.add_participant(participant) {
            metrics::counter!("events_participants_assigned_total").increment(1);
        } else {
            tracing::debug!(%participant_id, "Participant already assigned");
        }

        let saved = self.env.events.save_event(&event).await?;

        tracing::info!(event_id = ?saved.id, %participant_id, "Participant assigned to event");

        Ok(saved)
    }

    /// Replace the event's participants with the stored records for the ids
    /// it references, then save the event.
    ///
    /// Ids with no stored participant are dropped from the set and reported
    /// in [`ParticipantAssignment::unresolved`]. Payload entries without an
    /// id cannot be resolved and are dropped as well. Only the participant
    /// set is taken from the payload; a stored event keeps its cost and
    /// logistics.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StoreFailure` if a lookup fails for any reason
    /// other than not-found, or if saving the event fails. Nothing is saved in
    /// the first case.
    #[tracing::instrument(skip(self, payload), fields(event_description = %payload.description))]
    pub async fn assign_participants(&self, mut payload: Event) -> Result<ParticipantAssignment> {
        let requested = std::mem::take(&mut payload.participants);
        let mut resolved = Vec::with_capacity(requested.len());
        let mut unresolved = Vec::new();

        for reference in requested {
            let Some(id) = reference.id else {
                tracing::warn!(
                    last_name = %reference.last_name,
                    "Dropping participant without id from payload"
                );
                continue;
            };

            match self.env.participants.get_participant(id).await {
                Ok(participant) => resolved.push(participant),
                Err(e) if e.is_not_found() => {
                    tracing::warn!(participant_id = %id, "Dropping unknown participant from payload");
                    if !unresolved.contains(&id) {
                        unresolved.push(id);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut event = self.base_event(payload).await?;
        event.participants.clear();
        for participant in resolved {
            event.add_participant(participant);
        }

        let saved = self.env.events.save_event(&event).await?;

        metrics::counter!("events_participants_assigned_total")
            .increment(saved.participants.len() as u64);
        metrics::counter!("events_participants_unresolved_total")
            .increment(unresolved.len() as u64);
        tracing::info!(
            event_id = ?saved.id,
            resolved = saved.participants.len(),
            unresolved = unresolved.len(),
            "Participants assigned to event"
        );

        Ok(ParticipantAssignment {
            event: saved,
            unresolved,
        })
    }

    /// Attach `logistics` to the event described exactly by
    /// `event_description`.
    ///
    /// The logistics item is saved first so it has an id, then appended to
    /// the event, then the event is saved. Returns the saved logistics item.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No event has this description → `ServiceError::NotFound` (nothing is created)
    /// - The store fails → `ServiceError::StoreFailure`
    #[tracing::instrument(skip(self, logistics), fields(logistics_description = %logistics.description))]
    pub async fn assign_logistics(
        &self,
        logistics: Logistics,
        event_description: &str,
    ) -> Result<Logistics> {
        let mut event = self
            .env
            .events
            .find_event_by_description(event_description)
            .await?;

        let saved = self.env.logistics.save_logistics(&logistics).await?;
        event.push_logistics(saved.clone());
        let event = self.env.events.save_event(&event).await?;

        metrics::counter!("events_logistics_assigned_total").increment(1);
        tracing::info!(
            event_id = ?event.id,
            logistics_id = ?saved.id,
            reserved = saved.reserved,
            "Logistics assigned to event"
        );

        Ok(saved)
    }
}

#[cfg(all(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::error::{EntityKind, RepositoryError};
    use crate::mocks::{FailureMode, InMemoryRecordStore};
    use crate::types::Role;
    use chrono::NaiveDate;

    type Service = AssociationService<InMemoryRecordStore, InMemoryRecordStore, InMemoryRecordStore>;

    fn service() -> (InMemoryRecordStore, Service) {
        let store = InMemoryRecordStore::new();
        let service = AssociationService::new(EventsEnvironment::shared(store.clone()));
        (store, service)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn test_event() -> Event {
        Event::new("Test Event", date(2023, 6, 1), date(2023, 6, 2))
    }

    #[tokio::test]
    async fn test_create_participant_assigns_id() {
        let (_store, service) = service();

        let saved = service
            .create_participant(Participant::new("John", "Doe", Role::Waiter))
            .await;

        assert_eq!(
            saved,
            Ok(Participant {
                id: Some(ParticipantId::new(1)),
                last_name: "John".to_string(),
                first_name: "Doe".to_string(),
                role: Role::Waiter,
            })
        );
    }

    #[tokio::test]
    async fn test_assign_participant_saves_event() {
        let (store, service) = service();
        let participant = service
            .create_participant(Participant::new("John", "Doe", Role::Organizer))
            .await;
        let Ok(Participant { id: Some(id), .. }) = participant else {
            unreachable!("participant was stored");
        };

        let event = service.assign_participant(test_event(), id).await;

        let Ok(event) = event else {
            unreachable!("assignment succeeds");
        };
        assert!(event.id.is_some());
        assert!(event.has_participant(id));
        assert_eq!(store.event_count(), Ok(1));
    }

    #[tokio::test]
    async fn test_assign_unknown_participant_does_not_touch_event() {
        let (store, service) = service();

        let result = service
            .assign_participant(test_event(), ParticipantId::new(42))
            .await;

        assert_eq!(
            result,
            Err(ServiceError::NotFound {
                entity: EntityKind::Participant,
                key: "42".to_string(),
            })
        );
        assert_eq!(store.event_count(), Ok(0));
    }

    #[tokio::test]
    async fn test_assign_participants_without_id_are_dropped() {
        let (_store, service) = service();
        let mut event = test_event();
        event
            .participants
            .push(Participant::new("Ghost", "Nobody", Role::Waiter));

        let assignment = service.assign_participants(event).await;

        let Ok(assignment) = assignment else {
            unreachable!("assignment succeeds");
        };
        assert!(assignment.event.participants.is_empty());
        assert!(assignment.is_complete());
    }

    #[tokio::test]
    async fn test_assign_participants_propagates_store_failure() {
        let (store, service) = service();
        let mut event = test_event();
        event
            .participants
            .push(Participant::reference(ParticipantId::new(1)));
        let error = RepositoryError::Unavailable("connection refused".to_string());
        assert!(store.set_failure(FailureMode::All(error.clone())).is_ok());

        let result = service.assign_participants(event).await;

        assert_eq!(result, Err(ServiceError::StoreFailure(error)));
    }

    #[tokio::test]
    async fn test_assign_logistics_to_unknown_event_creates_nothing() {
        let (store, service) = service();
        let logistics = Logistics::new("Test Logistics", true, Money::from_cents(1000), 5);

        let result = service.assign_logistics(logistics, "Missing Event").await;

        assert!(matches!(result, Err(e) if e.is_not_found()));
        assert_eq!(store.event_count(), Ok(0));
        assert_eq!(store.logistics_count(), Ok(0));
        assert_eq!(store.write_count(), Ok(0));
    }
}
