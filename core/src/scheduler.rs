//! Periodic cost recomputation.
//!
//! Runs [`AggregationService::compute_organizer_event_costs`] on a fixed
//! interval until a shutdown signal arrives. A failed run is logged and the
//! loop keeps going.
//!
//! # Example
//!
//! ```no_run
//! use eventsproject_core::aggregation::AggregationService;
//! use eventsproject_core::config::{AggregationConfig, SchedulerConfig};
//! use eventsproject_core::mocks::InMemoryRecordStore;
//! use eventsproject_core::scheduler::CostScheduler;
//! use tokio::sync::broadcast;
//!
//! # async fn example() {
//! let service = AggregationService::new(InMemoryRecordStore::new(), AggregationConfig::default());
//! let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//! let handle = CostScheduler::new(service, SchedulerConfig::default()).spawn(shutdown_rx);
//!
//! // ... later
//! let _ = shutdown_tx.send(());
//! let _ = handle.await;
//! # }
//! ```

use crate::aggregation::{AggregationService, EventCost};
use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::repository::EventRepository;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Recomputes organizer event costs on a fixed interval.
#[derive(Clone, Debug)]
pub struct CostScheduler<E>
where
    E: EventRepository + Clone,
{
    service: AggregationService<E>,
    config: SchedulerConfig,
}

impl<E> CostScheduler<E>
where
    E: EventRepository + Clone + 'static,
{
    /// Create a new scheduler
    #[must_use]
    pub const fn new(service: AggregationService<E>, config: SchedulerConfig) -> Self {
        Self { service, config }
    }

    /// Run a single recomputation.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying cost computation.
    pub async fn run_once(&self) -> Result<Vec<EventCost>> {
        self.service.compute_organizer_event_costs().await
    }

    /// Loop until `shutdown` fires or its sender is dropped.
    ///
    /// The first run happens immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        // `interval` rejects a zero period.
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval = ?self.config.interval, "Cost scheduler started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = interval.tick() => {
                    match self.run_once().await {
                        Ok(costs) => tracing::debug!(events = costs.len(), "Scheduled cost run finished"),
                        Err(e) => tracing::error!(error = %e, "Scheduled cost run failed"),
                    }
                }
            }
        }

        tracing::info!("Cost scheduler stopped");
    }

    /// Spawn [`Self::run`] on the current `tokio` runtime.
    #[must_use]
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
