//! MySQL implementation of the TokenStore trait.
//!
//! Refresh records live in the `refresh_records` table. Rotation runs in a
//! transaction whose first statement is a conditional `UPDATE` on the old
//! row; InnoDB's row lock serializes competing rotations so only one of
//! them matches `revoked = FALSE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use tracing::debug;

use wc_core::domain::RefreshRecord;
use wc_core::errors::StoreError;
use wc_core::repositories::TokenStore;

use crate::InfrastructureError;

const SELECT_RECORD: &str = "SELECT token_id, subject, issued_at, expires_at, revoked, replaced_by \
     FROM refresh_records";

/// MySQL-backed token store
pub struct MySqlTokenStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a RefreshRecord
    fn row_to_record(row: &MySqlRow) -> Result<RefreshRecord, StoreError> {
        let column_error = |e: sqlx::Error| StoreError::from(InfrastructureError::Database(e));

        Ok(RefreshRecord {
            token_id: row.try_get("token_id").map_err(column_error)?,
            subject: row.try_get("subject").map_err(column_error)?,
            issued_at: row.try_get::<DateTime<Utc>, _>("issued_at").map_err(column_error)?,
            expires_at: row.try_get::<DateTime<Utc>, _>("expires_at").map_err(column_error)?,
            revoked: row.try_get("revoked").map_err(column_error)?,
            replaced_by: row.try_get("replaced_by").map_err(column_error)?,
        })
    }
}

fn not_found(token_id: &str) -> StoreError {
    StoreError::NotFound {
        token_id: token_id.to_string(),
    }
}

/// Map an INSERT failure, turning a primary key clash into `DuplicateId`
fn insert_error(error: sqlx::Error, token_id: &str) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateId {
            token_id: token_id.to_string(),
        },
        _ => InfrastructureError::Database(error).into(),
    }
}

async fn insert_record<'e, E>(executor: E, record: &RefreshRecord) -> Result<(), StoreError>
where
    E: sqlx::Executor<'e, Database = sqlx::MySql>,
{
    sqlx::query(
        "INSERT INTO refresh_records \
         (token_id, subject, issued_at, expires_at, revoked, replaced_by) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.token_id)
    .bind(&record.subject)
    .bind(record.issued_at)
    .bind(record.expires_at)
    .bind(record.revoked)
    .bind(&record.replaced_by)
    .execute(executor)
    .await
    .map_err(|e| insert_error(e, &record.token_id))?;

    Ok(())
}

#[async_trait]
impl TokenStore for MySqlTokenStore {
    async fn record(&self, record: RefreshRecord) -> Result<(), StoreError> {
        insert_record(&self.pool, &record).await
    }

    async fn lookup(&self, token_id: &str) -> Result<RefreshRecord, StoreError> {
        let row = sqlx::query(&format!("{} WHERE token_id = ?", SELECT_RECORD))
            .bind(token_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        let record = match row {
            Some(row) => Self::row_to_record(&row)?,
            None => return Err(not_found(token_id)),
        };

        if record.is_expired_at(Utc::now()) {
            debug!(token_id, "Refresh record expired");
            return Err(not_found(token_id));
        }
        Ok(record)
    }

    async fn revoke(&self, token_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE refresh_records SET revoked = TRUE WHERE token_id = ? AND revoked = FALSE",
        )
        .bind(token_id)
        .execute(&self.pool)
        .await
        .map_err(InfrastructureError::Database)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Nothing changed: either already revoked or absent
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM refresh_records WHERE token_id = ?")
                .bind(token_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(InfrastructureError::Database)?;

        match exists {
            Some(_) => Ok(()),
            None => Err(not_found(token_id)),
        }
    }

    async fn rotate(
        &self,
        old_token_id: &str,
        new_record: RefreshRecord,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(InfrastructureError::Database)?;

        let claimed = sqlx::query(
            "UPDATE refresh_records SET revoked = TRUE, replaced_by = ? \
             WHERE token_id = ? AND revoked = FALSE AND expires_at > ?",
        )
        .bind(&new_record.token_id)
        .bind(old_token_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(InfrastructureError::Database)?
        .rows_affected();

        if claimed == 0 {
            let state: Option<(bool, DateTime<Utc>)> = sqlx::query_as(
                "SELECT revoked, expires_at FROM refresh_records WHERE token_id = ?",
            )
            .bind(old_token_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(InfrastructureError::Database)?;

            // Dropping `tx` rolls back
            return Err(match state {
                Some((_, expires_at)) if expires_at <= now => not_found(old_token_id),
                Some((true, _)) => StoreError::AlreadyRevoked {
                    token_id: old_token_id.to_string(),
                },
                Some((false, _)) => {
                    StoreError::unavailable("refresh record changed during rotation")
                }
                None => not_found(old_token_id),
            });
        }

        insert_record(&mut *tx, &new_record).await?;

        tx.commit().await.map_err(InfrastructureError::Database)?;
        Ok(())
    }

    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError> {
        let result = sqlx::query(
            "UPDATE refresh_records SET revoked = TRUE \
             WHERE subject = ? AND revoked = FALSE AND expires_at > ?",
        )
        .bind(subject)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(InfrastructureError::Database)?;

        Ok(result.rows_affected() as usize)
    }

    async fn active_for_subject(&self, subject: &str) -> Result<Vec<RefreshRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "{} WHERE subject = ? AND revoked = FALSE AND expires_at > ? ORDER BY issued_at",
            SELECT_RECORD
        ))
        .bind(subject)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await
        .map_err(InfrastructureError::Database)?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_records WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        Ok(result.rows_affected() as usize)
    }
}
