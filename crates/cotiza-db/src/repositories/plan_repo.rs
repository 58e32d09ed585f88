//! Plan repository and in-force plan resolution
//!
//! Plan feature maps are stored as JSONB; unknown limits deserialize as
//! unlimited and new flags default to off, so plan rows never break on
//! feature-set changes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cotiza_core::models::{Plan, PlanFeatures, SubscriptionStatus};
use cotiza_core::traits::PlanResolver;
use cotiza_core::{AppError, AppResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    code: String,
    features: Json<PlanFeatures>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PlanRow> for Plan {
    fn from(row: PlanRow) -> Self {
        Plan {
            id: row.id,
            name: row.name,
            code: row.code,
            features: row.features.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of the plan repository
pub struct PgPlanRepository {
    pool: PgPool,
}

impl PgPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find plan by its code
    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Plan>> {
        debug!("Finding plan by code: {}", code);

        let result = sqlx::query_as::<sqlx::Postgres, PlanRow>(
            r#"
            SELECT id, name, code, features, created_at, updated_at
            FROM plans
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding plan by code {}: {}", code, e);
            AppError::Database(format!("Failed to find plan by code: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PlanResolver for PgPlanRepository {
    /// Plan of the user's most recently created in-force subscription.
    ///
    /// In-force means active, trialing or free. Users without one get
    /// `None`, which every limit check treats as exhausted.
    #[instrument(skip(self))]
    async fn resolve_in_force_plan(&self, user_id: Uuid) -> AppResult<Option<Plan>> {
        debug!("Resolving in-force plan for user {}", user_id);

        // The status list comes from the model, not a literal in the query
        let in_force: Vec<String> = SubscriptionStatus::in_force_statuses()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let result = sqlx::query_as::<sqlx::Postgres, PlanRow>(
            r#"
            SELECT p.id, p.name, p.code, p.features, p.created_at, p.updated_at
            FROM subscriptions s
            JOIN plans p ON p.id = s.plan_id
            WHERE s.user_id = $1
              AND s.status = ANY($2)
            ORDER BY s.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(&in_force)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error resolving plan for user {}: {}", user_id, e);
            AppError::Database(format!("Failed to resolve plan: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_resolve_plan_for_unknown_user() {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/cotiza_crm".to_string());
        let pool = crate::pool::create_pool(&database_url, Some(2)).await.unwrap();

        let repo = PgPlanRepository::new(pool);
        let plan = repo.resolve_in_force_plan(Uuid::new_v4()).await.unwrap();
        assert!(plan.is_none());
    }
}
