//! Product repository implementation

use crate::repositories::is_unique_violation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cotiza_core::models::Product;
use cotiza_core::traits::ProductRepository;
use cotiza_core::{AppError, AppResult};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    company_id: Uuid,
    sku: String,
    description: String,
    unit_price: i64,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            company_id: row.company_id,
            sku: row.sku,
            description: row.description,
            unit_price: row.unit_price,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, company_id, sku, description, unit_price, active, created_at, updated_at";

/// PostgreSQL implementation of the product repository
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[instrument(skip(self))]
    async fn find_in_company(
        &self,
        company_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<Option<Product>> {
        debug!("Finding product {} in company {}", product_id, company_id);

        let result = sqlx::query_as::<sqlx::Postgres, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 AND company_id = $2",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding product {}: {}", product_id, e);
            AppError::Database(format!("Failed to find product: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_sku(&self, company_id: Uuid, sku: &str) -> AppResult<Option<Product>> {
        debug!("Finding product by SKU {} in company {}", sku, company_id);

        let result = sqlx::query_as::<sqlx::Postgres, ProductRow>(&format!(
            "SELECT {} FROM products WHERE company_id = $1 AND sku = $2",
            PRODUCT_COLUMNS
        ))
        .bind(company_id)
        .bind(sku)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding product by SKU {}: {}", sku, e);
            AppError::Database(format!("Failed to find product by SKU: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn count_for_company(&self, company_id: Uuid) -> AppResult<i64> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM products WHERE company_id = $1")
                .bind(company_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting products: {}", e);
                    AppError::Database(format!("Failed to count products: {}", e))
                })?;

        Ok(result.0)
    }

    #[instrument(skip(self, product))]
    async fn insert(&self, product: &Product) -> AppResult<Product> {
        debug!("Creating product {}", product.sku);

        let row = sqlx::query_as::<sqlx::Postgres, ProductRow>(&format!(
            r#"
            INSERT INTO products (
                id, company_id, sku, description, unit_price, active,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.id)
        .bind(product.company_id)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.unit_price)
        .bind(product.active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(format!("SKU {} already exists", product.sku));
            }
            error!("Database error creating product: {}", e);
            AppError::Database(format!("Failed to create product: {}", e))
        })?;

        Ok(row.into())
    }
}
