//! Client repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cotiza_core::models::Client;
use cotiza_core::traits::ClientRepository;
use cotiza_core::{AppError, AppResult};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    company_id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of the client repository
pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    #[instrument(skip(self))]
    async fn find_in_company(
        &self,
        company_id: Uuid,
        client_id: Uuid,
    ) -> AppResult<Option<Client>> {
        debug!("Finding client {} in company {}", client_id, company_id);

        let result = sqlx::query_as::<sqlx::Postgres, ClientRow>(
            r#"
            SELECT id, company_id, name, email, phone, address,
                   created_at, updated_at
            FROM clients
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(client_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding client {}: {}", client_id, e);
            AppError::Database(format!("Failed to find client: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}
