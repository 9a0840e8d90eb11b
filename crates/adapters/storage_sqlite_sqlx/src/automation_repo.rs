//! `SQLite` implementation of [`AutomationRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use gather_app::ports::{AutomationRepository, AutomationRow};
use gather_domain::automation::Slot;
use gather_domain::error::{GatherError, NotFoundError};
use gather_domain::id::EventId;

use crate::error::StorageError;

struct Wrapper(AutomationRow);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(AutomationRow {
            start: row.try_get("start_automation")?,
            end: row.try_get("end_automation")?,
        }))
    }
}

/// `SQLite`-backed store of per-slot automation documents.
pub struct SqliteAutomationRepository {
    pool: SqlitePool,
}

impl SqliteAutomationRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationRepository for SqliteAutomationRepository {
    async fn ensure(&self, event_id: EventId) -> Result<(), GatherError> {
        sqlx::query("INSERT OR IGNORE INTO event_automations (event_id) VALUES (?)")
            .bind(event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn get(&self, event_id: EventId) -> Result<Option<AutomationRow>, GatherError> {
        let row: Option<Wrapper> = sqlx::query_as(
            "SELECT start_automation, end_automation FROM event_automations WHERE event_id = ?",
        )
        .bind(event_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn put(
        &self,
        event_id: EventId,
        slot: Slot,
        document: Option<String>,
    ) -> Result<(), GatherError> {
        let statement = match slot {
            Slot::Start => "UPDATE event_automations SET start_automation = ? WHERE event_id = ?",
            Slot::End => "UPDATE event_automations SET end_automation = ? WHERE event_id = ?",
        };
        let result = sqlx::query(statement)
            .bind(document)
            .bind(event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Automation",
                id: event_id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteAutomationRepository {
        Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap()
        .automation_repository()
    }

    #[tokio::test]
    async fn should_return_none_when_row_missing() {
        let repo = setup().await;
        assert!(repo.get(EventId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_create_empty_row_once() {
        let repo = setup().await;
        let id = EventId::new();

        repo.ensure(id).await.unwrap();
        repo.put(id, Slot::End, Some("{\"actions\":[]}".to_string()))
            .await
            .unwrap();
        repo.ensure(id).await.unwrap();

        let row = repo.get(id).await.unwrap().unwrap();
        assert_eq!(row.slot(Slot::Start), None);
        assert_eq!(row.slot(Slot::End), Some("{\"actions\":[]}"));
    }

    #[tokio::test]
    async fn should_write_slots_independently() {
        let repo = setup().await;
        let id = EventId::new();
        repo.ensure(id).await.unwrap();

        repo.put(id, Slot::Start, Some("start".to_string()))
            .await
            .unwrap();
        repo.put(id, Slot::End, Some("end".to_string()))
            .await
            .unwrap();
        repo.put(id, Slot::Start, None).await.unwrap();

        let row = repo.get(id).await.unwrap().unwrap();
        assert_eq!(
            row,
            AutomationRow {
                start: None,
                end: Some("end".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn should_return_not_found_when_writing_missing_row() {
        let repo = setup().await;
        let result = repo.put(EventId::new(), Slot::Start, None).await;
        assert!(matches!(result, Err(GatherError::NotFound(_))));
    }
}
