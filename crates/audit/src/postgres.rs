use async_trait::async_trait;
use common::{OrderId, TransactionId};
use saga::Event;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::Result;
use crate::store::AuditStore;

/// PostgreSQL-backed audit store.
///
/// The full event travels as a JSONB document; order, transaction, and
/// creation time are mirrored into indexed columns for the queries.
#[derive(Clone)]
pub struct PostgresAuditStore {
    pool: PgPool,
}

impl PostgresAuditStore {
    /// Creates a new PostgreSQL audit store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_event(row: PgRow) -> Result<Event> {
        let document: serde_json::Value = row.try_get("document")?;
        Ok(serde_json::from_value(document)?)
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn save(&self, event: &Event) -> Result<()> {
        let document = serde_json::to_value(event)?;

        sqlx::query(
            r#"
            INSERT INTO saga_events (id, order_id, transaction_id, created_at, document)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET created_at = EXCLUDED.created_at, document = EXCLUDED.document
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(event.order_id.as_uuid())
        .bind(event.transaction_id.as_uuid())
        .bind(event.created_at)
        .bind(document)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_latest_by_order_id(&self, order_id: OrderId) -> Result<Option<Event>> {
        let row = sqlx::query(
            r#"
            SELECT document FROM saga_events
            WHERE order_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn find_latest_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Event>> {
        let row = sqlx::query(
            r#"
            SELECT document FROM saga_events
            WHERE transaction_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(transaction_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query(
            r#"
            SELECT document FROM saga_events
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }
}
