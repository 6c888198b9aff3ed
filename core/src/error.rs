//! Error types for the record store and the event services.

use crate::types::ParticipantId;
use std::fmt;
use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Kind of record a lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A participant record
    Participant,
    /// An event record
    Event,
    /// A logistics record
    Logistics,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Participant => f.write_str("participant"),
            Self::Event => f.write_str("event"),
            Self::Logistics => f.write_str("logistics"),
        }
    }
}

/// Errors that can occur during record store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No record matched the lookup key.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record looked up
        entity: EntityKind,
        /// Id or description used for the lookup
        key: String,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Stored data could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Builds a `NotFound` error for the given entity and key
    pub fn not_found(entity: EntityKind, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Returns `true` if this is a `NotFound` error
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors returned by the association and aggregation services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A lookup by id or exact description yielded no record.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record looked up
        entity: EntityKind,
        /// Id or description used for the lookup
        key: String,
    },

    /// The record store failed; propagated unchanged.
    #[error("Store failure: {0}")]
    StoreFailure(RepositoryError),

    /// Some participant ids in an event payload did not resolve.
    ///
    /// Only returned by [`crate::association::ParticipantAssignment::strict`].
    #[error("Unresolved participants: {0:?}")]
    UnresolvedParticipants(Vec<ParticipantId>),

    /// Cost arithmetic overflowed.
    #[error("Cost overflow for event '{event}'")]
    CostOverflow {
        /// Description of the event whose cost overflowed
        event: String,
    },
}

impl ServiceError {
    /// Returns `true` if this error is a not-found condition
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound { entity, key } => Self::NotFound { entity, key },
            other => Self::StoreFailure(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err: ServiceError = RepositoryError::not_found(EntityKind::Event, "Gala").into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "event not found: Gala");
    }

    #[test]
    fn test_other_store_errors_map_to_store_failure() {
        let err: ServiceError = RepositoryError::Database("connection reset".into()).into();
        assert_eq!(
            err,
            ServiceError::StoreFailure(RepositoryError::Database("connection reset".into()))
        );
    }
}
