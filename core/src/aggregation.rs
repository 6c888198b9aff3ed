//! Aggregation service.
//!
//! Date-window queries over reserved logistics and per-event cost roll-up.
//! Empty matches are a normal outcome and never an error.

use crate::config::AggregationConfig;
use crate::error::{Result, ServiceError};
use crate::repository::EventRepository;
use crate::types::{EventId, Logistics, Money, ParticipantIdentity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cost written to one event by a cost computation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCost {
    /// Id of the updated event
    pub event_id: Option<EventId>,
    /// Description of the updated event
    pub description: String,
    /// Newly computed cost
    pub cost: Money,
}

/// Answers cost and date-range queries over events.
#[derive(Clone, Debug)]
pub struct AggregationService<E>
where
    E: EventRepository + Clone,
{
    events: E,
    config: AggregationConfig,
}

impl<E> AggregationService<E>
where
    E: EventRepository + Clone,
{
    /// Create a new aggregation service
    #[must_use]
    pub const fn new(events: E, config: AggregationConfig) -> Self {
        Self { events, config }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Reserved logistics of every event starting in `[start, end]`.
    ///
    /// Events are visited in store order and each event's items keep their
    /// collection order. Unreserved items are never returned.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StoreFailure` if the event lookup fails.
    #[tracing::instrument(skip(self))]
    pub async fn reserved_logistics_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Logistics>> {
        let events = self.events.find_events_starting_between(start, end).await?;

        let logistics: Vec<Logistics> = events
            .iter()
            .flat_map(|event| event.reserved_logistics().cloned())
            .collect();

        tracing::debug!(
            events = events.len(),
            logistics = logistics.len(),
            "Collected reserved logistics"
        );

        Ok(logistics)
    }

    /// Recompute and save the cost of every event with a participant matching
    /// `identity`.
    ///
    /// Cost is the sum of `unit_price × quantity` over the event's reserved
    /// logistics; events without reserved logistics get zero. Only events
    /// returned by the identity lookup are touched.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The store fails → `ServiceError::StoreFailure` (events saved before the failure keep their new cost)
    /// - A cost overflows → `ServiceError::CostOverflow` (checked for every event before any save, so nothing is written)
    #[tracing::instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn compute_event_costs(
        &self,
        identity: &ParticipantIdentity,
    ) -> Result<Vec<EventCost>> {
        let events = self
            .events
            .find_events_by_participant(identity)
            .await?
            .into_iter()
            .map(|mut event| {
                event.cost = event.reserved_cost().ok_or_else(|| ServiceError::CostOverflow {
                    event: event.description.clone(),
                })?;
                Ok(event)
            })
            .collect::<Result<Vec<_>>>()?;
        let mut costs = Vec::with_capacity(events.len());

        for event in events {
            let saved = self.events.save_event(&event).await?;

            metrics::counter!("events_costs_computed_total").increment(1);
            tracing::info!(
                event_id = ?saved.id,
                description = %saved.description,
                cost = %saved.cost,
                "Event cost computed"
            );

            costs.push(EventCost {
                event_id: saved.id,
                description: saved.description,
                cost: saved.cost,
            });
        }

        Ok(costs)
    }

    /// Recompute costs for the events of the configured organizer.
    ///
    /// # Errors
    ///
    /// Same as [`Self::compute_event_costs`].
    pub async fn compute_organizer_event_costs(&self) -> Result<Vec<EventCost>> {
        self.compute_event_costs(&self.config.organizer).await
    }
}
