//! Fluent builders for domain records.
//!
//! Builders produce unsaved records (`id: None`) unless an id is set
//! explicitly, so they can be fed straight into a record store.

use chrono::NaiveDate;
use eventsproject_core::{
    Event, EventId, Logistics, LogisticsId, Money, Participant, ParticipantId, Role,
};

/// Build a calendar date.
///
/// # Panics
///
/// Panics if the date does not exist, which is a bug in the test itself.
#[must_use]
#[allow(clippy::expect_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("test date should be valid")
}

/// The organizer the cost computation selects by default: Tounsi Ahmed.
#[must_use]
pub fn organizer() -> Participant {
    ParticipantBuilder::new("Tounsi", "Ahmed")
        .role(Role::Organizer)
        .build()
}

/// Builder for [`Participant`].
#[derive(Debug, Clone)]
pub struct ParticipantBuilder {
    participant: Participant,
}

impl ParticipantBuilder {
    /// Start a participant with the given names; role defaults to `Waiter`.
    #[must_use]
    pub fn new(last_name: &str, first_name: &str) -> Self {
        Self {
            participant: Participant::new(last_name, first_name, Role::Waiter),
        }
    }

    /// Set the role
    #[must_use]
    pub const fn role(mut self, role: Role) -> Self {
        self.participant.role = role;
        self
    }

    /// Set the store id
    #[must_use]
    pub const fn id(mut self, id: i64) -> Self {
        self.participant.id = Some(ParticipantId::new(id));
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> Participant {
        self.participant
    }
}

/// Builder for [`Logistics`].
#[derive(Debug, Clone)]
pub struct LogisticsBuilder {
    logistics: Logistics,
}

impl LogisticsBuilder {
    /// Start an unreserved item with zero price and quantity 1.
    #[must_use]
    pub fn new(description: &str) -> Self {
        Self {
            logistics: Logistics::new(description, false, Money::ZERO, 1),
        }
    }

    /// Mark the item as reserved
    #[must_use]
    pub const fn reserved(mut self) -> Self {
        self.logistics.reserved = true;
        self
    }

    /// Set the unit price in cents
    #[must_use]
    pub const fn price_cents(mut self, cents: u64) -> Self {
        self.logistics.unit_price = Money::from_cents(cents);
        self
    }

    /// Set the quantity
    #[must_use]
    pub const fn quantity(mut self, quantity: u32) -> Self {
        self.logistics.quantity = quantity;
        self
    }

    /// Set the store id
    #[must_use]
    pub const fn id(mut self, id: i64) -> Self {
        self.logistics.id = Some(LogisticsId::new(id));
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> Logistics {
        self.logistics
    }
}

/// Builder for [`Event`].
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    /// Start a one-day event on 2023-01-01.
    #[must_use]
    pub fn new(description: &str) -> Self {
        let day = date(2023, 1, 1);
        Self {
            event: Event::new(description, day, day),
        }
    }

    /// Set the start date; the end date moves along if it would precede it.
    #[must_use]
    pub fn starting(mut self, start: NaiveDate) -> Self {
        self.event.start_date = start;
        if self.event.end_date < start {
            self.event.end_date = start;
        }
        self
    }

    /// Set the end date
    #[must_use]
    pub const fn ending(mut self, end: NaiveDate) -> Self {
        self.event.end_date = end;
        self
    }

    /// Set the store id
    #[must_use]
    pub const fn id(mut self, id: i64) -> Self {
        self.event.id = Some(EventId::new(id));
        self
    }

    /// Add a participant (deduplicated by id)
    #[must_use]
    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.event.add_participant(participant);
        self
    }

    /// Reference a stored participant by id only, as an incoming payload does
    #[must_use]
    pub fn with_participant_ref(mut self, id: i64) -> Self {
        self.event
            .participants
            .push(Participant::reference(ParticipantId::new(id)));
        self
    }

    /// Append a logistics item
    #[must_use]
    pub fn with_logistics(mut self, logistics: Logistics) -> Self {
        self.event.push_logistics(logistics);
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> Event {
        self.event
    }
}
