//! `SQLite` implementation of [`EventRepository`].

use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use gather_app::ports::EventRepository;
use gather_domain::error::GatherError;
use gather_domain::event::{Event, EventOptions, EventStatus};
use gather_domain::id::{ActorId, EventId};
use gather_domain::time::{Timestamp, parse_rfc3339};

use crate::error::StorageError;

fn decode_err(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

/// Fixed-width RFC 3339 so stored times sort lexically.
pub(crate) fn format_time(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

struct Wrapper(Event);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let description: String = row.try_get("description")?;
        let owner: uuid::Uuid = row.try_get("owner_id")?;
        let status: String = row.try_get("status")?;
        let start_time: String = row.try_get("start_time")?;
        let end_time: Option<String> = row.try_get("end_time")?;
        let location: Option<String> = row.try_get("location")?;
        let entrants: String = row.try_get("entrants")?;
        let options: String = row.try_get("options")?;

        let status: EventStatus = status.parse().map_err(decode_err)?;
        let start_time = parse_rfc3339(&start_time).map_err(decode_err)?;
        let end_time = end_time
            .map(|s| parse_rfc3339(&s).map_err(decode_err))
            .transpose()?;
        let location: Option<serde_json::Value> = location
            .map(|s| serde_json::from_str(&s).map_err(decode_err))
            .transpose()?;
        let entrants: Vec<ActorId> = serde_json::from_str(&entrants).map_err(decode_err)?;
        let options: EventOptions = serde_json::from_str(&options).map_err(decode_err)?;

        let mut builder = Event::builder()
            .id(EventId::from_uuid(id))
            .name(name)
            .description(description)
            .owner(ActorId::from_uuid(owner))
            .status(status)
            .start_time(start_time)
            .entrants(entrants)
            .options(options);
        if let Some(end_time) = end_time {
            builder = builder.end_time(end_time);
        }
        if let Some(location) = location {
            builder = builder.location(location);
        }
        builder.build().map(Self).map_err(decode_err)
    }
}

/// `SQLite`-backed event repository.
pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl EventRepository for SqliteEventRepository {
    async fn create(&self, event: Event) -> Result<Event, GatherError> {
        let location = event
            .location()
            .map(serde_json::to_string)
            .transpose()
            .map_err(StorageError::from)?;
        let entrants = serde_json::to_string(event.entrants()).map_err(StorageError::from)?;
        let options = serde_json::to_string(event.options()).map_err(StorageError::from)?;

        sqlx::query(
            "INSERT INTO events (id, name, description, owner_id, status, start_time, end_time, location, entrants, options) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id().as_uuid())
        .bind(event.name())
        .bind(event.description())
        .bind(event.owner().as_uuid())
        .bind(event.status().as_str())
        .bind(format_time(event.start_time()))
        .bind(event.end_time().map(format_time))
        .bind(location)
        .bind(entrants)
        .bind(options)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(event)
    }

    async fn get_by_id(&self, id: EventId) -> Result<Option<Event>, GatherError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM events WHERE id = ?")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn find_by_status(&self, status: EventStatus) -> Result<Vec<Event>, GatherError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM events WHERE status = ? ORDER BY start_time, name")
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update_status(&self, id: EventId, status: EventStatus) -> Result<(), GatherError> {
        sqlx::query("UPDATE events SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn update_entrants(&self, id: EventId, entrants: Vec<ActorId>) -> Result<(), GatherError> {
        let entrants = serde_json::to_string(&entrants).map_err(StorageError::from)?;
        sqlx::query("UPDATE events SET entrants = ? WHERE id = ?")
            .bind(entrants)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn update_options(&self, id: EventId, options: EventOptions) -> Result<(), GatherError> {
        let options = serde_json::to_string(&options).map_err(StorageError::from)?;
        sqlx::query("UPDATE events SET options = ? WHERE id = ?")
            .bind(options)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn delete(&self, id: EventId) -> Result<bool, GatherError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        sqlx::query("DELETE FROM event_automations WHERE event_id = ?")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        tx.commit().await.map_err(StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
