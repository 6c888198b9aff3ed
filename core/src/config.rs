//! Service configuration.
//!
//! Values have working defaults and can be overridden with builder methods or
//! loaded from environment variables with [`EventsConfig::from_env`].

use crate::types::{ParticipantIdentity, Role};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the organizer's last name.
pub const ENV_ORGANIZER_LAST_NAME: &str = "EVENTS_ORGANIZER_LAST_NAME";
/// Environment variable overriding the organizer's first name.
pub const ENV_ORGANIZER_FIRST_NAME: &str = "EVENTS_ORGANIZER_FIRST_NAME";
/// Environment variable overriding the organizer's role.
pub const ENV_ORGANIZER_ROLE: &str = "EVENTS_ORGANIZER_ROLE";
/// Environment variable overriding the cost recomputation interval, in seconds.
pub const ENV_COST_INTERVAL_SECS: &str = "EVENTS_COST_INTERVAL_SECS";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Failed to parse an environment value
    #[error("Failed to parse {var}: {reason}")]
    Parse {
        /// Variable name
        var: String,
        /// Why parsing failed
        reason: String,
    },
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Cost aggregation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Participant identity whose events get their cost recomputed by
    /// `compute_organizer_event_costs`.
    ///
    /// Default: Tounsi Ahmed, organizer
    pub organizer: ParticipantIdentity,
}

impl AggregationConfig {
    /// Create configuration for the given organizer.
    #[must_use]
    pub const fn new(organizer: ParticipantIdentity) -> Self {
        Self { organizer }
    }

    /// Set the organizer identity.
    #[must_use]
    pub fn with_organizer(mut self, organizer: ParticipantIdentity) -> Self {
        self.organizer = organizer;
        self
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if either organizer name is blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.organizer.last_name.trim().is_empty() || self.organizer.first_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "organizer name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            organizer: ParticipantIdentity::new("Tounsi", "Ahmed", Role::Organizer),
        }
    }
}

/// Cost scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Time between two cost recomputations.
    ///
    /// Default: 60 seconds
    pub interval: Duration,
}

impl SchedulerConfig {
    /// Set the recomputation interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if the interval is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::Validation(
                "scheduler interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Cost aggregation settings
    pub aggregation: AggregationConfig,
    /// Cost scheduler settings
    pub scheduler: SchedulerConfig,
}

impl EventsConfig {
    /// Load configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a variable cannot be parsed or the result is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns error if a variable cannot be parsed or the result is invalid
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(last_name) = lookup(ENV_ORGANIZER_LAST_NAME) {
            config.aggregation.organizer.last_name = last_name;
        }
        if let Some(first_name) = lookup(ENV_ORGANIZER_FIRST_NAME) {
            config.aggregation.organizer.first_name = first_name;
        }
        if let Some(role) = lookup(ENV_ORGANIZER_ROLE) {
            config.aggregation.organizer.role =
                role.parse::<Role>().map_err(|e| ConfigError::Parse {
                    var: ENV_ORGANIZER_ROLE.to_string(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(secs) = lookup(ENV_COST_INTERVAL_SECS) {
            let secs = secs.trim().parse::<u64>().map_err(|e| ConfigError::Parse {
                var: ENV_COST_INTERVAL_SECS.to_string(),
                reason: e.to_string(),
            })?;
            config.scheduler.interval = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate entire configuration
    ///
    /// # Errors
    ///
    /// Returns error if any configuration section is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aggregation.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_use_legacy_organizer() {
        let config = EventsConfig::default();
        assert_eq!(
            config.aggregation.organizer,
            ParticipantIdentity::new("Tounsi", "Ahmed", Role::Organizer)
        );
        assert_eq!(config.scheduler.interval, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let config = EventsConfig::from_lookup(lookup_from(&[
            (ENV_ORGANIZER_LAST_NAME, "Ben Salah"),
            (ENV_ORGANIZER_FIRST_NAME, "Amira"),
            (ENV_ORGANIZER_ROLE, "guest_speaker"),
            (ENV_COST_INTERVAL_SECS, "15"),
        ]));

        assert_eq!(
            config,
            Ok(EventsConfig {
                aggregation: AggregationConfig::new(ParticipantIdentity::new(
                    "Ben Salah",
                    "Amira",
                    Role::GuestSpeaker
                )),
                scheduler: SchedulerConfig::default().with_interval(Duration::from_secs(15)),
            })
        );
    }

    #[test]
    fn test_invalid_role_is_parse_error() {
        let result = EventsConfig::from_lookup(lookup_from(&[(ENV_ORGANIZER_ROLE, "CHEF")]));
        assert!(matches!(result, Err(ConfigError::Parse { var, .. }) if var == ENV_ORGANIZER_ROLE));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = EventsConfig::from_lookup(lookup_from(&[(ENV_COST_INTERVAL_SECS, "0")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_blank_organizer_is_rejected() {
        let result = EventsConfig::from_lookup(lookup_from(&[(ENV_ORGANIZER_FIRST_NAME, "  ")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
