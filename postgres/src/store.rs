//! `PostgreSQL` record store.
//!
//! Events are stored in `events`, their participant set in
//! `event_participants` and their logistics collection as `event_id` /
//! `position` columns on `logistics`. Saving an event rewrites both
//! memberships in one transaction.

use chrono::NaiveDate;
use eventsproject_core::error::{EntityKind, RepositoryError};
use eventsproject_core::repository::{
    EventRepository, LogisticsRepository, ParticipantRepository, RepositoryResult,
};
use eventsproject_core::{
    Event, EventId, Logistics, LogisticsId, Money, Participant, ParticipantId,
    ParticipantIdentity, Role,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};

/// `PostgreSQL`-backed implementation of every repository trait.
///
/// # Example
///
/// ```no_run
/// use eventsproject_postgres::PostgresRecordStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = PostgresRecordStore::new("postgres://localhost/events").await?;
/// store.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

fn database_error(context: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |e| RepositoryError::Database(format!("{context}: {e}"))
}

fn to_db_i64(value: u64, field: &str) -> RepositoryResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::Serialization(format!("{field} out of range: {value}")))
}

fn from_db_u64(value: i64, field: &str) -> RepositoryResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepositoryError::Serialization(format!("{field} out of range: {value}")))
}

fn position(index: usize) -> RepositoryResult<i32> {
    i32::try_from(index)
        .map_err(|_| RepositoryError::Serialization(format!("position out of range: {index}")))
}

impl PostgresRecordStore {
    /// Connect to the database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Unavailable`] if the connection fails.
    pub async fn new(database_url: &str) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    fn row_to_participant(row: &PgRow) -> RepositoryResult<Participant> {
        let role: String = row.try_get("role").map_err(database_error("participant row"))?;
        Ok(Participant {
            id: Some(ParticipantId::new(
                row.try_get("id").map_err(database_error("participant row"))?,
            )),
            last_name: row.try_get("last_name").map_err(database_error("participant row"))?,
            first_name: row
                .try_get("first_name")
                .map_err(database_error("participant row"))?,
            role: role
                .parse::<Role>()
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
        })
    }

    fn row_to_logistics(row: &PgRow) -> RepositoryResult<Logistics> {
        let price: i64 = row
            .try_get("unit_price_cents")
            .map_err(database_error("logistics row"))?;
        let quantity: i64 = row.try_get("quantity").map_err(database_error("logistics row"))?;
        Ok(Logistics {
            id: Some(LogisticsId::new(
                row.try_get("id").map_err(database_error("logistics row"))?,
            )),
            description: row
                .try_get("description")
                .map_err(database_error("logistics row"))?,
            reserved: row.try_get("reserved").map_err(database_error("logistics row"))?,
            unit_price: Money::from_cents(from_db_u64(price, "unit_price_cents")?),
            quantity: u32::try_from(quantity).map_err(|_| {
                RepositoryError::Serialization(format!("quantity out of range: {quantity}"))
            })?,
        })
    }

    async fn load_event(&self, id: EventId) -> RepositoryResult<Event> {
        let row = sqlx::query(
            r"
            SELECT id, description, start_date, end_date, cost_cents
            FROM events
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to get event"))?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Event, id))?;

        let participants = sqlx::query(
            r"
            SELECT p.id, p.last_name, p.first_name, p.role
            FROM event_participants ep
            JOIN participants p ON p.id = ep.participant_id
            WHERE ep.event_id = $1
            ORDER BY ep.position ASC
            ",
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to load event participants"))?
        .iter()
        .map(Self::row_to_participant)
        .collect::<RepositoryResult<Vec<_>>>()?;

        let logistics = sqlx::query(
            r"
            SELECT id, description, reserved, unit_price_cents, quantity
            FROM logistics
            WHERE event_id = $1
            ORDER BY position ASC
            ",
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to load event logistics"))?
        .iter()
        .map(Self::row_to_logistics)
        .collect::<RepositoryResult<Vec<_>>>()?;

        let cost: i64 = row.try_get("cost_cents").map_err(database_error("event row"))?;
        Ok(Event {
            id: Some(id),
            description: row.try_get("description").map_err(database_error("event row"))?,
            start_date: row.try_get("start_date").map_err(database_error("event row"))?,
            end_date: row.try_get("end_date").map_err(database_error("event row"))?,
            cost: Money::from_cents(from_db_u64(cost, "cost_cents")?),
            participants,
            logistics,
        })
    }

    async fn load_events(&self, ids: Vec<i64>) -> RepositoryResult<Vec<Event>> {
        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            events.push(self.load_event(EventId::new(id)).await?);
        }
        Ok(events)
    }

    /// Insert or update one logistics row, optionally placing it in an
    /// event's collection.
    async fn upsert_logistics(
        tx: &mut Transaction<'_, Postgres>,
        logistics: &Logistics,
        membership: Option<(EventId, i32)>,
    ) -> RepositoryResult<Logistics> {
        let price = to_db_i64(logistics.unit_price.cents(), "unit_price_cents")?;
        let event_id = membership.map(|(event, _)| event.as_i64());
        let position = membership.map(|(_, position)| position);

        let (id,): (i64,) = match logistics.id {
            Some(id) => sqlx::query_as(
                r"
                INSERT INTO logistics (id, event_id, position, description, reserved, unit_price_cents, quantity)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO UPDATE SET
                    event_id = COALESCE(EXCLUDED.event_id, logistics.event_id),
                    position = COALESCE(EXCLUDED.position, logistics.position),
                    description = EXCLUDED.description,
                    reserved = EXCLUDED.reserved,
                    unit_price_cents = EXCLUDED.unit_price_cents,
                    quantity = EXCLUDED.quantity
                RETURNING id
                ",
            )
            .bind(id.as_i64()),
            None => sqlx::query_as(
                r"
                INSERT INTO logistics (event_id, position, description, reserved, unit_price_cents, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                ",
            ),
        }
        .bind(event_id)
        .bind(position)
        .bind(&logistics.description)
        .bind(logistics.reserved)
        .bind(price)
        .bind(i64::from(logistics.quantity))
        .fetch_one(&mut **tx)
        .await
        .map_err(database_error("Failed to save logistics"))?;

        let mut saved = logistics.clone();
        saved.id = Some(LogisticsId::new(id));
        Ok(saved)
    }
}

impl ParticipantRepository for PostgresRecordStore {
    async fn get_participant(&self, id: ParticipantId) -> RepositoryResult<Participant> {
        let row = sqlx::query(
            r"
            SELECT id, last_name, first_name, role
            FROM participants
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to get participant"))?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Participant, id))?;

        Self::row_to_participant(&row)
    }

    async fn save_participant(&self, participant: &Participant) -> RepositoryResult<Participant> {
        let (id,): (i64,) = match participant.id {
            Some(id) => sqlx::query_as(
                r"
                INSERT INTO participants (id, last_name, first_name, role)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    last_name = EXCLUDED.last_name,
                    first_name = EXCLUDED.first_name,
                    role = EXCLUDED.role
                RETURNING id
                ",
            )
            .bind(id.as_i64()),
            None => sqlx::query_as(
                r"
                INSERT INTO participants (last_name, first_name, role)
                VALUES ($1, $2, $3)
                RETURNING id
                ",
            ),
        }
        .bind(&participant.last_name)
        .bind(&participant.first_name)
        .bind(participant.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("Failed to save participant"))?;

        let mut saved = participant.clone();
        saved.id = Some(ParticipantId::new(id));
        Ok(saved)
    }
}

impl EventRepository for PostgresRecordStore {
    async fn get_event(&self, id: EventId) -> RepositoryResult<Event> {
        self.load_event(id).await
    }

    async fn find_event_by_description(&self, description: &str) -> RepositoryResult<Event> {
        let id: Option<(i64,)> = sqlx::query_as(
            r"
            SELECT id FROM events
            WHERE description = $1
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to find event"))?;

        match id {
            Some((id,)) => self.load_event(EventId::new(id)).await,
            None => Err(RepositoryError::not_found(EntityKind::Event, description)),
        }
    }

    async fn find_events_starting_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Event>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r"
            SELECT id FROM events
            WHERE start_date BETWEEN $1 AND $2
            ORDER BY id ASC
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to find events by date"))?;

        self.load_events(ids).await
    }

    async fn find_events_by_participant(
        &self,
        identity: &ParticipantIdentity,
    ) -> RepositoryResult<Vec<Event>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r"
            SELECT DISTINCT ep.event_id
            FROM event_participants ep
            JOIN participants p ON p.id = ep.participant_id
            WHERE p.last_name = $1 AND p.first_name = $2 AND p.role = $3
            ORDER BY ep.event_id ASC
            ",
        )
        .bind(&identity.last_name)
        .bind(&identity.first_name)
        .bind(identity.role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to find events by participant"))?;

        self.load_events(ids).await
    }

    async fn save_event(&self, event: &Event) -> RepositoryResult<Event> {
        let cost = to_db_i64(event.cost.cents(), "cost_cents")?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("Failed to begin transaction"))?;

        let (id,): (i64,) = match event.id {
            Some(id) => sqlx::query_as(
                r"
                INSERT INTO events (id, description, start_date, end_date, cost_cents)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE SET
                    description = EXCLUDED.description,
                    start_date = EXCLUDED.start_date,
                    end_date = EXCLUDED.end_date,
                    cost_cents = EXCLUDED.cost_cents
                RETURNING id
                ",
            )
            .bind(id.as_i64()),
            None => sqlx::query_as(
                r"
                INSERT INTO events (description, start_date, end_date, cost_cents)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                ",
            ),
        }
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(cost)
        .fetch_one(&mut *tx)
        .await
        .map_err(database_error("Failed to save event"))?;
        let event_id = EventId::new(id);

        sqlx::query("DELETE FROM event_participants WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(database_error("Failed to clear event participants"))?;

        for (index, participant) in event.participants.iter().enumerate() {
            let Some(participant_id) = participant.id else {
                tracing::warn!(event_id = id, "Skipping unsaved participant in event");
                continue;
            };
            sqlx::query(
                r"
                INSERT INTO event_participants (event_id, participant_id, position)
                VALUES ($1, $2, $3)
                ON CONFLICT (event_id, participant_id) DO NOTHING
                ",
            )
            .bind(id)
            .bind(participant_id.as_i64())
            .bind(position(index)?)
            .execute(&mut *tx)
            .await
            .map_err(database_error("Failed to save event participant"))?;
        }

        let mut logistics = Vec::with_capacity(event.logistics.len());
        for (index, item) in event.logistics.iter().enumerate() {
            let membership = Some((event_id, position(index)?));
            logistics.push(Self::upsert_logistics(&mut tx, item, membership).await?);
        }

        let kept: Vec<i64> = logistics
            .iter()
            .filter_map(|l| l.id.map(|id| id.as_i64()))
            .collect();
        sqlx::query(
            r"
            UPDATE logistics SET event_id = NULL, position = NULL
            WHERE event_id = $1 AND NOT (id = ANY($2))
            ",
        )
        .bind(id)
        .bind(&kept)
        .execute(&mut *tx)
        .await
        .map_err(database_error("Failed to detach logistics"))?;

        tx.commit()
            .await
            .map_err(database_error("Failed to commit event"))?;

        metrics::counter!("events_store_events_saved_total").increment(1);

        let mut saved = event.clone();
        saved.id = Some(event_id);
        saved.logistics = logistics;
        Ok(saved)
    }
}

impl LogisticsRepository for PostgresRecordStore {
    async fn get_logistics(&self, id: LogisticsId) -> RepositoryResult<Logistics> {
        let row = sqlx::query(
            r"
            SELECT id, description, reserved, unit_price_cents, quantity
            FROM logistics
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to get logistics"))?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Logistics, id))?;

        Self::row_to_logistics(&row)
    }

    async fn save_logistics(&self, logistics: &Logistics) -> RepositoryResult<Logistics> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("Failed to begin transaction"))?;
        let saved = Self::upsert_logistics(&mut tx, logistics, None).await?;
        tx.commit()
            .await
            .map_err(database_error("Failed to commit logistics"))?;
        Ok(saved)
    }
}
