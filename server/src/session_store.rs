use async_trait::async_trait;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tower_sessions::{
    session::{Id, Record},
    session_store, SessionStore,
};
use tracing::error;

/// SQLite-backed session store reusing the server's pool, so sessions
/// survive restarts. The `sessions` table is created by the regular
/// schema migrations.
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Delete all rows whose expiry is in the past.
    pub async fn delete_expired(&self) -> Result<(), sqlx::Error> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let payload = serde_json::to_string(&record.data)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;
        let expires_at = record.expiry_date.unix_timestamp();

        // Retry on ID collision (INSERT OR IGNORE + re-check).
        loop {
            let rows = sqlx::query(
                "INSERT OR IGNORE INTO sessions (id, payload, expires_at) VALUES (?, ?, ?)",
            )
            .bind(record.id.to_string())
            .bind(&payload)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?
            .rows_affected();

            if rows > 0 {
                return Ok(());
            }

            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let payload = serde_json::to_string(&record.data)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;

        sqlx::query(
            "INSERT INTO sessions (id, payload, expires_at) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload,
                                           expires_at = excluded.expires_at",
        )
        .bind(record.id.to_string())
        .bind(&payload)
        .bind(record.expiry_date.unix_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT payload, expires_at FROM sessions WHERE id = ? AND expires_at > ?",
        )
        .bind(session_id.to_string())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        match row {
            None => Ok(None),
            Some((payload, expires_at)) => {
                let data = serde_json::from_str(&payload)
                    .map_err(|e| session_store::Error::Decode(e.to_string()))?;
                let expiry_date = OffsetDateTime::from_unix_timestamp(expires_at)
                    .map_err(|e| session_store::Error::Decode(e.to_string()))?;
                Ok(Some(Record {
                    id: *session_id,
                    data,
                    expiry_date,
                }))
            }
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;
        Ok(())
    }
}

/// Background task: delete expired sessions every `period`.
pub async fn run_expired_session_cleanup(
    store: SqliteSessionStore,
    period: std::time::Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // first tick is immediate; skip it
    loop {
        interval.tick().await;
        if let Err(e) = store.delete_expired().await {
            error!("session cleanup failed: {e}");
        }
    }
}
