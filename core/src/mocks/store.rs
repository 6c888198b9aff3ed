//! In-memory record store.

use crate::error::{EntityKind, RepositoryError};
use crate::repository::{
    EventRepository, LogisticsRepository, ParticipantRepository, RepositoryResult,
};
use crate::types::{
    Event, EventId, Logistics, LogisticsId, Participant, ParticipantId, ParticipantIdentity,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

/// Which operations the store should fail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// All operations succeed
    #[default]
    None,
    /// Every `save_*` call fails with the given error
    Writes(RepositoryError),
    /// Every call fails with the given error
    All(RepositoryError),
}

#[derive(Debug, Default)]
struct StoreState {
    participants: BTreeMap<ParticipantId, Participant>,
    events: BTreeMap<EventId, Event>,
    logistics: BTreeMap<LogisticsId, Logistics>,
    last_participant_id: i64,
    last_event_id: i64,
    last_logistics_id: i64,
    writes: usize,
    failure: FailureMode,
}

impl StoreState {
    fn check_read(&self) -> RepositoryResult<()> {
        match &self.failure {
            FailureMode::All(err) => Err(err.clone()),
            FailureMode::None | FailureMode::Writes(_) => Ok(()),
        }
    }

    fn check_write(&mut self) -> RepositoryResult<()> {
        match &self.failure {
            FailureMode::All(err) | FailureMode::Writes(err) => Err(err.clone()),
            FailureMode::None => {
                self.writes += 1;
                Ok(())
            }
        }
    }

    /// Event as currently stored, with participants read from the
    /// participant records rather than the copies held in the event.
    fn load_event(&self, event: &Event) -> Event {
        let mut loaded = event.clone();
        for participant in &mut loaded.participants {
            if let Some(current) = participant.id.and_then(|id| self.participants.get(&id)) {
                participant.clone_from(current);
            }
        }
        loaded
    }

    fn store_logistics(&mut self, logistics: &Logistics) -> Logistics {
        let mut stored = logistics.clone();
        let id = stored.id.unwrap_or_else(|| {
            self.last_logistics_id += 1;
            LogisticsId::new(self.last_logistics_id)
        });
        stored.id = Some(id);
        self.logistics.insert(id, stored.clone());
        stored
    }
}

/// Record store backed by in-memory maps.
///
/// One shared state implements all three repository traits, so a single
/// instance can be handed to [`crate::environment::EventsEnvironment::shared`].
/// Ids are assigned sequentially per entity kind, starting at 1. Events are
/// read back with the current participant records, so a renamed participant
/// is matched under its new name only.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, StoreState>> {
        lock_state(&self.state)
    }

    /// Make subsequent calls fail according to `mode`.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn set_failure(&self, mode: FailureMode) -> RepositoryResult<()> {
        self.lock()?.failure = mode;
        Ok(())
    }

    /// Number of successful `save_*` calls so far.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn write_count(&self) -> RepositoryResult<usize> {
        Ok(self.lock()?.writes)
    }

    /// Number of stored events.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn event_count(&self) -> RepositoryResult<usize> {
        Ok(self.lock()?.events.len())
    }

    /// Number of stored logistics items.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn logistics_count(&self) -> RepositoryResult<usize> {
        Ok(self.lock()?.logistics.len())
    }
}

fn lock_state(state: &Arc<Mutex<StoreState>>) -> RepositoryResult<MutexGuard<'_, StoreState>> {
    state
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}

impl ParticipantRepository for InMemoryRecordStore {
    fn get_participant(
        &self,
        id: ParticipantId,
    ) -> impl Future<Output = RepositoryResult<Participant>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            let guard = lock_state(&state)?;
            guard.check_read()?;
            guard
                .participants
                .get(&id)
                .cloned()
                .ok_or_else(|| RepositoryError::not_found(EntityKind::Participant, id))
        }
    }

    fn save_participant(
        &self,
        participant: &Participant,
    ) -> impl Future<Output = RepositoryResult<Participant>> + Send {
        let state = Arc::clone(&self.state);
        let mut participant = participant.clone();

        async move {
            let mut guard = lock_state(&state)?;
            guard.check_write()?;
            let id = match participant.id {
                Some(id) => id,
                None => {
                    guard.last_participant_id += 1;
                    ParticipantId::new(guard.last_participant_id)
                }
            };
            participant.id = Some(id);
            guard.participants.insert(id, participant.clone());
            Ok(participant)
        }
    }
}

impl EventRepository for InMemoryRecordStore {
    fn get_event(&self, id: EventId) -> impl Future<Output = RepositoryResult<Event>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            let guard = lock_state(&state)?;
            guard.check_read()?;
            guard
                .events
                .get(&id)
                .map(|e| guard.load_event(e))
                .ok_or_else(|| RepositoryError::not_found(EntityKind::Event, id))
        }
    }

    fn find_event_by_description(
        &self,
        description: &str,
    ) -> impl Future<Output = RepositoryResult<Event>> + Send {
        let state = Arc::clone(&self.state);
        let description = description.to_string();

        async move {
            let guard = lock_state(&state)?;
            guard.check_read()?;
            guard
                .events
                .values()
                .find(|e| e.description == description)
                .map(|e| guard.load_event(e))
                .ok_or_else(|| RepositoryError::not_found(EntityKind::Event, &description))
        }
    }

    fn find_events_starting_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = RepositoryResult<Vec<Event>>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            let guard = lock_state(&state)?;
            guard.check_read()?;
            Ok(guard
                .events
                .values()
                .filter(|e| e.starts_between(start, end))
                .map(|e| guard.load_event(e))
                .collect())
        }
    }

    fn find_events_by_participant(
        &self,
        identity: &ParticipantIdentity,
    ) -> impl Future<Output = RepositoryResult<Vec<Event>>> + Send {
        let state = Arc::clone(&self.state);
        let identity = identity.clone();

        async move {
            let guard = lock_state(&state)?;
            guard.check_read()?;
            Ok(guard
                .events
                .values()
                .map(|e| guard.load_event(e))
                .filter(|e| e.has_participant_matching(&identity))
                .collect())
        }
    }

    fn save_event(&self, event: &Event) -> impl Future<Output = RepositoryResult<Event>> + Send {
        let state = Arc::clone(&self.state);
        let mut event = event.clone();

        async move {
            let mut guard = lock_state(&state)?;
            guard.check_write()?;
            let id = match event.id {
                Some(id) => id,
                None => {
                    guard.last_event_id += 1;
                    EventId::new(guard.last_event_id)
                }
            };
            event.id = Some(id);
            // Membership is stored with the event; unsaved items get their ids here.
            event.logistics = event
                .logistics
                .iter()
                .map(|l| guard.store_logistics(l))
                .collect();
            guard.events.insert(id, event.clone());
            Ok(event)
        }
    }
}

impl LogisticsRepository for InMemoryRecordStore {
    fn get_logistics(
        &self,
        id: LogisticsId,
    ) -> impl Future<Output = RepositoryResult<Logistics>> + Send {
        let state = Arc::clone(&self.state);

        async move {
            let guard = lock_state(&state)?;
            guard.check_read()?;
            guard
                .logistics
                .get(&id)
                .cloned()
                .ok_or_else(|| RepositoryError::not_found(EntityKind::Logistics, id))
        }
    }

    fn save_logistics(
        &self,
        logistics: &Logistics,
    ) -> impl Future<Output = RepositoryResult<Logistics>> + Send {
        let state = Arc::clone(&self.state);
        let logistics = logistics.clone();

        async move {
            let mut guard = lock_state(&state)?;
            guard.check_write()?;
            Ok(guard.store_logistics(&logistics))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Money, Role};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let store = InMemoryRecordStore::new();
        let a = store
            .save_participant(&Participant::new("A", "B", Role::Waiter))
            .await;
        let b = store
            .save_participant(&Participant::new("C", "D", Role::Waiter))
            .await;

        assert_eq!(a.map(|p| p.id), Ok(Some(ParticipantId::new(1))));
        assert_eq!(b.map(|p| p.id), Ok(Some(ParticipantId::new(2))));
    }

    #[tokio::test]
    async fn test_save_event_stores_unsaved_logistics() {
        let store = InMemoryRecordStore::new();
        let mut event = Event::new("Gala", date(2023, 1, 1), date(2023, 1, 2));
        event.push_logistics(Logistics::new("Tables", true, Money::from_cents(1000), 5));

        let saved = store.save_event(&event).await;
        let logistics_id = saved
            .as_ref()
            .ok()
            .and_then(|e| e.logistics.first())
            .and_then(|l| l.id);

        assert_eq!(logistics_id, Some(LogisticsId::new(1)));
        assert_eq!(store.logistics_count(), Ok(1));
    }

    #[tokio::test]
    async fn test_missing_description_is_not_found() {
        let store = InMemoryRecordStore::new();
        let result = store.find_event_by_description("Nope").await;
        assert!(matches!(result, Err(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_participant_lookup_follows_renamed_records() {
        let store = InMemoryRecordStore::new();
        let saved = store
            .save_participant(&Participant::new("Tounsi", "Ahmed", Role::Organizer))
            .await;
        let Ok(mut participant) = saved else {
            unreachable!("participant was stored");
        };
        let mut event = Event::new("Gala", date(2023, 1, 1), date(2023, 1, 2));
        event.add_participant(participant.clone());
        assert!(store.save_event(&event).await.is_ok());

        participant.last_name = "Ben Salah".to_string();
        assert!(store.save_participant(&participant).await.is_ok());

        let old = ParticipantIdentity::new("Tounsi", "Ahmed", Role::Organizer);
        let new = ParticipantIdentity::new("Ben Salah", "Ahmed", Role::Organizer);
        let by_old = store.find_events_by_participant(&old).await;
        let by_new = store.find_events_by_participant(&new).await;

        assert_eq!(by_old, Ok(Vec::new()));
        let loaded = by_new.ok().and_then(|events| events.into_iter().next());
        assert_eq!(loaded.map(|e| e.participants), Some(vec![participant]));
    }

    #[tokio::test]
    async fn test_failure_mode_writes_only() {
        let store = InMemoryRecordStore::new();
        let error = RepositoryError::Database("disk full".to_string());
        assert!(store.set_failure(FailureMode::Writes(error.clone())).is_ok());

        let saved = store
            .save_participant(&Participant::new("A", "B", Role::Waiter))
            .await;
        let read = store.find_events_starting_between(date(2023, 1, 1), date(2023, 12, 31)).await;

        assert_eq!(saved, Err(error));
        assert_eq!(read, Ok(Vec::new()));
        assert_eq!(store.write_count(), Ok(0));
    }
}
