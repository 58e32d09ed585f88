//! Company share repository implementation
//!
//! Permission sets are stored as JSONB so new actions never require a
//! migration; the unique index on (company_id, recipient_id) backs the
//! one-share-per-pair rule.

use crate::repositories::is_unique_violation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cotiza_core::models::{CompanyShare, SharePermissions, ShareStatus};
use cotiza_core::traits::ShareRepository;
use cotiza_core::{AppError, AppResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct ShareRow {
    id: Uuid,
    company_id: Uuid,
    recipient_id: Uuid,
    grantor_id: Uuid,
    permissions: Json<SharePermissions>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShareRow> for CompanyShare {
    type Error = AppError;

    fn try_from(row: ShareRow) -> Result<Self, Self::Error> {
        let status = ShareStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Database(format!("Unknown share status: {}", row.status)))?;
        Ok(CompanyShare {
            id: row.id,
            company_id: row.company_id,
            recipient_id: row.recipient_id,
            grantor_id: row.grantor_id,
            permissions: row.permissions.0,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SHARE_COLUMNS: &str =
    "id, company_id, recipient_id, grantor_id, permissions, status, created_at, updated_at";

/// PostgreSQL implementation of the share repository
pub struct PgShareRepository {
    pool: PgPool,
}

impl PgShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareRepository for PgShareRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CompanyShare>> {
        debug!("Finding share by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ShareRow>(&format!(
            "SELECT {} FROM company_shares WHERE id = $1",
            SHARE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding share {}: {}", id, e);
            AppError::Database(format!("Failed to find share: {}", e))
        })?;

        result.map(CompanyShare::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_for(
        &self,
        company_id: Uuid,
        recipient_id: Uuid,
    ) -> AppResult<Option<CompanyShare>> {
        debug!("Finding share for recipient {} in company {}", recipient_id, company_id);

        let result = sqlx::query_as::<sqlx::Postgres, ShareRow>(&format!(
            "SELECT {} FROM company_shares WHERE company_id = $1 AND recipient_id = $2",
            SHARE_COLUMNS
        ))
        .bind(company_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding share: {}", e);
            AppError::Database(format!("Failed to find share: {}", e))
        })?;

        result.map(CompanyShare::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn count_for_company(&self, company_id: Uuid) -> AppResult<i64> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM company_shares WHERE company_id = $1")
                .bind(company_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting company shares: {}", e);
                    AppError::Database(format!("Failed to count shares: {}", e))
                })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn count_for_recipient(&self, recipient_id: Uuid) -> AppResult<i64> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM company_shares WHERE recipient_id = $1")
                .bind(recipient_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting recipient shares: {}", e);
                    AppError::Database(format!("Failed to count shares: {}", e))
                })?;

        Ok(result.0)
    }

    #[instrument(skip(self, share))]
    async fn insert(&self, share: &CompanyShare) -> AppResult<CompanyShare> {
        debug!("Creating share for recipient {}", share.recipient_id);

        let row = sqlx::query_as::<sqlx::Postgres, ShareRow>(&format!(
            r#"
            INSERT INTO company_shares (
                id, company_id, recipient_id, grantor_id, permissions,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SHARE_COLUMNS
        ))
        .bind(share.id)
        .bind(share.company_id)
        .bind(share.recipient_id)
        .bind(share.grantor_id)
        .bind(Json(&share.permissions))
        .bind(share.status.to_string())
        .bind(share.created_at)
        .bind(share.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(format!(
                    "share for recipient {} already exists",
                    share.recipient_id
                ));
            }
            error!("Database error creating share: {}", e);
            AppError::Database(format!("Failed to create share: {}", e))
        })?;

        row.try_into()
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: ShareStatus) -> AppResult<CompanyShare> {
        debug!("Updating share {} to {}", id, status);

        let row = sqlx::query_as::<sqlx::Postgres, ShareRow>(&format!(
            r#"
            UPDATE company_shares
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SHARE_COLUMNS
        ))
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating share {}: {}", id, e);
            AppError::Database(format!("Failed to update share: {}", e))
        })?
        .ok_or_else(|| AppError::ShareNotFound(id.to_string()))?;

        row.try_into()
    }
}
