//! Company repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cotiza_core::models::{Company, CompanyStatus};
use cotiza_core::traits::CompanyRepository;
use cotiza_core::{AppError, AppResult};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct CompanyRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    status: String,
    currency: String,
    logo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = AppError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        // Status gates access decisions, so an unknown value is an error
        // rather than a default
        let status = CompanyStatus::from_str(&row.status).ok_or_else(|| {
            AppError::Database(format!("Unknown company status: {}", row.status))
        })?;
        Ok(Company {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            status,
            currency: row.currency,
            logo_url: row.logo_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL implementation of the company repository
pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>> {
        debug!("Finding company by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, CompanyRow>(
            r#"
            SELECT id, owner_id, name, status, currency, logo_url,
                   created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding company {}: {}", id, e);
            AppError::Database(format!("Failed to find company: {}", e))
        })?;

        result.map(Company::try_from).transpose()
    }
}
