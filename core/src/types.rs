//! Domain types for events, participants and logistics.
//!
//! These are plain data records. Behaviour lives in the association and
//! aggregation services; the helpers here only keep each record's own
//! invariants (unique participants per event, reserved-only cost).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a participant, assigned by the record store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub i64);

impl ParticipantId {
    /// Creates a `ParticipantId` from a raw store key
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw store key
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an event, assigned by the record store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub i64);

impl EventId {
    /// Creates an `EventId` from a raw store key
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw store key
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a logistics item, assigned by the record store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogisticsId(pub i64);

impl LogisticsId {
    /// Creates a `LogisticsId` from a raw store key
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw store key
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LogisticsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole units with overflow checking
    #[must_use]
    pub const fn checked_from_units(units: u64) -> Option<Self> {
        match units.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Role
// ============================================================================

/// Task a participant holds at an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Runs the event
    Organizer,
    /// Serves guests
    Waiter,
    /// Invited speaker
    GuestSpeaker,
}

impl Role {
    /// Stable string form, used as the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Organizer => "ORGANIZER",
            Self::Waiter => "WAITER",
            Self::GuestSpeaker => "GUEST_SPEAKER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ORGANIZER" => Ok(Self::Organizer),
            "WAITER" => Ok(Self::Waiter),
            "GUEST_SPEAKER" => Ok(Self::GuestSpeaker),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

// ============================================================================
// Participant
// ============================================================================

/// A person who can be assigned to one or more events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Store key, `None` until first saved
    pub id: Option<ParticipantId>,
    /// Family name
    pub last_name: String,
    /// Given name
    pub first_name: String,
    /// Task at the event
    pub role: Role,
}

impl Participant {
    /// Creates an unsaved participant
    #[must_use]
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            first_name: first_name.into(),
            role,
        }
    }

    /// Creates a reference to a stored participant carrying only its id.
    ///
    /// Used in event payloads where the participant set lists ids to resolve.
    /// The empty names and `Role::Waiter` are placeholders: association
    /// replaces the reference with the stored record, so they are never
    /// persisted.
    #[must_use]
    pub fn reference(id: ParticipantId) -> Self {
        Self {
            id: Some(id),
            last_name: String::new(),
            first_name: String::new(),
            role: Role::Waiter,
        }
    }

    /// Returns `true` if this participant has the given name pair and role
    #[must_use]
    pub fn matches(&self, identity: &ParticipantIdentity) -> bool {
        self.last_name == identity.last_name
            && self.first_name == identity.first_name
            && self.role == identity.role
    }
}

/// Name pair and role used to select events by one of their participants.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantIdentity {
    /// Family name
    pub last_name: String,
    /// Given name
    pub first_name: String,
    /// Role held at the event
    pub role: Role,
}

impl ParticipantIdentity {
    /// Creates a new identity filter
    #[must_use]
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>, role: Role) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            role,
        }
    }
}

impl fmt::Display for ParticipantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.first_name, self.last_name, self.role)
    }
}

// ============================================================================
// Logistics
// ============================================================================

/// An item booked (or considered) for an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logistics {
    /// Store key, `None` until first saved
    pub id: Option<LogisticsId>,
    /// What the item is
    pub description: String,
    /// Whether the item is confirmed
    pub reserved: bool,
    /// Price of one unit
    pub unit_price: Money,
    /// Number of units
    pub quantity: u32,
}

impl Logistics {
    /// Creates an unsaved logistics item
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        reserved: bool,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            id: None,
            description: description.into(),
            reserved,
            unit_price,
            quantity,
        }
    }

    /// Amount this item adds to its event's cost.
    ///
    /// Zero when the item is not reserved; `None` on overflow.
    #[must_use]
    pub const fn cost_contribution(&self) -> Option<Money> {
        if self.reserved {
            self.unit_price.checked_multiply(self.quantity)
        } else {
            Some(Money::ZERO)
        }
    }
}

// ============================================================================
// Event
// ============================================================================

/// An event with its participants and logistics.
///
/// The event owns both collections. `cost` is only written by cost
/// aggregation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store key, `None` until first saved
    pub id: Option<EventId>,
    /// Free text, also used as a lookup key
    pub description: String,
    /// First day of the event
    pub start_date: NaiveDate,
    /// Last day of the event
    pub end_date: NaiveDate,
    /// Derived cost of reserved logistics at the last aggregation run
    pub cost: Money,
    /// Participants, unique by id
    pub participants: Vec<Participant>,
    /// Logistics in insertion order
    pub logistics: Vec<Logistics>,
}

impl Event {
    /// Creates an unsaved event with no participants, logistics or cost
    #[must_use]
    pub fn new(description: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            description: description.into(),
            start_date,
            end_date,
            cost: Money::ZERO,
            participants: Vec::new(),
            logistics: Vec::new(),
        }
    }

    /// Adds a participant unless one with the same id is already present.
    ///
    /// Returns `true` if the set changed.
    pub fn add_participant(&mut self, participant: Participant) -> bool {
        let already_present = participant.id.is_some()
            && self.participants.iter().any(|p| p.id == participant.id);
        if already_present {
            return false;
        }
        self.participants.push(participant);
        true
    }

    /// Returns `true` if a participant with this id is in the set
    #[must_use]
    pub fn has_participant(&self, id: ParticipantId) -> bool {
        self.participants.iter().any(|p| p.id == Some(id))
    }

    /// Returns `true` if any participant matches the identity
    #[must_use]
    pub fn has_participant_matching(&self, identity: &ParticipantIdentity) -> bool {
        self.participants.iter().any(|p| p.matches(identity))
    }

    /// Appends a logistics item to the collection
    pub fn push_logistics(&mut self, logistics: Logistics) {
        self.logistics.push(logistics);
    }

    /// Reserved logistics, in collection order
    pub fn reserved_logistics(&self) -> impl Iterator<Item = &Logistics> {
        self.logistics.iter().filter(|l| l.reserved)
    }

    /// Sum of `unit_price × quantity` over reserved logistics.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn reserved_cost(&self) -> Option<Money> {
        self.reserved_logistics().try_fold(Money::ZERO, |total, logistics| {
            total.checked_add(logistics.cost_contribution()?)
        })
    }

    /// Returns `true` if `start_date` lies in the inclusive window
    #[must_use]
    pub fn starts_between(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.start_date && self.start_date <= end
    }
}
