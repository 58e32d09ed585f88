//! Quote repository implementation
//!
//! Quote-plus-items writes run in a single transaction; a failure anywhere
//! rolls the whole write back. Item replacement is delete-then-insert inside
//! the same transaction.

use crate::repositories::is_unique_violation;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use cotiza_core::models::{DiscountType, Quote, QuoteItem, QuoteStatus};
use cotiza_core::traits::QuoteRepository;
use cotiza_core::{AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, error, instrument};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct QuoteRow {
    id: Uuid,
    company_id: Uuid,
    client_id: Uuid,
    quote_number: String,
    currency: String,
    subtotal: i64,
    discount: i64,
    tax: i64,
    total: i64,
    status: String,
    discount_type: String,
    discount_value: i64,
    tax_amount: i64,
    issue_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    accepted_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QuoteRow> for Quote {
    type Error = AppError;

    fn try_from(row: QuoteRow) -> Result<Self, Self::Error> {
        // Status drives the lifecycle state machine, so an unknown value is
        // an error rather than a default
        let status = QuoteStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Database(format!("Unknown quote status: {}", row.status)))?;
        let discount_type = DiscountType::from_str(&row.discount_type).ok_or_else(|| {
            AppError::Database(format!("Unknown discount type: {}", row.discount_type))
        })?;
        Ok(Quote {
            id: row.id,
            company_id: row.company_id,
            client_id: row.client_id,
            quote_number: row.quote_number,
            currency: row.currency,
            subtotal: row.subtotal,
            discount: row.discount,
            tax: row.tax,
            total: row.total,
            status,
            discount_type,
            discount_value: row.discount_value,
            tax_amount: row.tax_amount,
            issue_date: row.issue_date,
            expiry_date: row.expiry_date,
            accepted_at: row.accepted_at,
            rejected_at: row.rejected_at,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct QuoteItemRow {
    id: Uuid,
    quote_id: Uuid,
    product_id: Option<Uuid>,
    description: String,
    quantity: Decimal,
    unit_price: i64,
    total_price: i64,
    position: i32,
}

impl From<QuoteItemRow> for QuoteItem {
    fn from(row: QuoteItemRow) -> Self {
        QuoteItem {
            id: row.id,
            quote_id: row.quote_id,
            product_id: row.product_id,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
            position: row.position,
        }
    }
}

const QUOTE_COLUMNS: &str = "id, company_id, client_id, quote_number, currency, \
     subtotal, discount, tax, total, status, discount_type, discount_value, \
     tax_amount, issue_date, expiry_date, accepted_at, rejected_at, notes, \
     created_at, updated_at";

/// PostgreSQL implementation of the quote repository
pub struct PgQuoteRepository {
    pool: PgPool,
}

impl PgQuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })
    }

    async fn commit(tx: Transaction<'_, Postgres>) -> AppResult<()> {
        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })
    }

    async fn insert_items(
        tx: &mut Transaction<'_, Postgres>,
        items: &[QuoteItem],
    ) -> AppResult<()> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO quote_items (
                    id, quote_id, product_id, description, quantity,
                    unit_price, total_price, position
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item.id)
            .bind(item.quote_id)
            .bind(item.product_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .bind(item.position)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                error!("Database error inserting quote item: {}", e);
                AppError::Database(format!("Failed to insert quote item: {}", e))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl QuoteRepository for PgQuoteRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quote>> {
        debug!("Finding quote by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, QuoteRow>(&format!(
            "SELECT {} FROM quotes WHERE id = $1",
            QUOTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding quote {}: {}", id, e);
            AppError::Database(format!("Failed to find quote: {}", e))
        })?;

        result.map(Quote::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_number(
        &self,
        company_id: Uuid,
        quote_number: &str,
    ) -> AppResult<Option<Quote>> {
        debug!("Finding quote {} in company {}", quote_number, company_id);

        let result = sqlx::query_as::<sqlx::Postgres, QuoteRow>(&format!(
            "SELECT {} FROM quotes WHERE company_id = $1 AND quote_number = $2",
            QUOTE_COLUMNS
        ))
        .bind(company_id)
        .bind(quote_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding quote by number: {}", e);
            AppError::Database(format!("Failed to find quote by number: {}", e))
        })?;

        result.map(Quote::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_items(&self, quote_id: Uuid) -> AppResult<Vec<QuoteItem>> {
        let rows = sqlx::query_as::<sqlx::Postgres, QuoteItemRow>(
            r#"
            SELECT id, quote_id, product_id, description, quantity,
                   unit_price, total_price, position
            FROM quote_items
            WHERE quote_id = $1
            ORDER BY position
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error loading quote items: {}", e);
            AppError::Database(format!("Failed to load quote items: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count_created_since(
        &self,
        company_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM quotes WHERE company_id = $1 AND created_at >= $2",
        )
        .bind(company_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting quotes: {}", e);
            AppError::Database(format!("Failed to count quotes: {}", e))
        })?;

        Ok(result.0)
    }

    #[instrument(skip(self, quote, items))]
    async fn create_with_items(&self, quote: &Quote, items: &[QuoteItem]) -> AppResult<Quote> {
        debug!("Creating quote {} with {} items", quote.quote_number, items.len());

        let mut tx = self.begin().await?;

        let row = sqlx::query_as::<sqlx::Postgres, QuoteRow>(&format!(
            r#"
            INSERT INTO quotes (
                id, company_id, client_id, quote_number, currency,
                subtotal, discount, tax, total, status, discount_type,
                discount_value, tax_amount, issue_date, expiry_date,
                accepted_at, rejected_at, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING {}
            "#,
            QUOTE_COLUMNS
        ))
        .bind(quote.id)
        .bind(quote.company_id)
        .bind(quote.client_id)
        .bind(&quote.quote_number)
        .bind(&quote.currency)
        .bind(quote.subtotal)
        .bind(quote.discount)
        .bind(quote.tax)
        .bind(quote.total)
        .bind(quote.status.to_string())
        .bind(quote.discount_type.to_string())
        .bind(quote.discount_value)
        .bind(quote.tax_amount)
        .bind(quote.issue_date)
        .bind(quote.expiry_date)
        .bind(quote.accepted_at)
        .bind(quote.rejected_at)
        .bind(&quote.notes)
        .bind(quote.created_at)
        .bind(quote.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(format!(
                    "quote number {} already exists",
                    quote.quote_number
                ));
            }
            error!("Database error creating quote: {}", e);
            AppError::Database(format!("Failed to create quote: {}", e))
        })?;

        Self::insert_items(&mut tx, items).await?;
        Self::commit(tx).await?;

        row.try_into()
    }

    #[instrument(skip(self, quote, items))]
    async fn update_with_items(
        &self,
        quote: &Quote,
        items: Option<&[QuoteItem]>,
    ) -> AppResult<Quote> {
        debug!("Updating quote {}", quote.id);

        let mut tx = self.begin().await?;

        let row = sqlx::query_as::<sqlx::Postgres, QuoteRow>(&format!(
            r#"
            UPDATE quotes
            SET client_id = $2, quote_number = $3, subtotal = $4,
                discount = $5, tax = $6, total = $7, status = $8,
                discount_type = $9, discount_value = $10, tax_amount = $11,
                issue_date = $12, expiry_date = $13, accepted_at = $14,
                rejected_at = $15, notes = $16, updated_at = $17
            WHERE id = $1
            RETURNING {}
            "#,
            QUOTE_COLUMNS
        ))
        .bind(quote.id)
        .bind(quote.client_id)
        .bind(&quote.quote_number)
        .bind(quote.subtotal)
        .bind(quote.discount)
        .bind(quote.tax)
        .bind(quote.total)
        .bind(quote.status.to_string())
        .bind(quote.discount_type.to_string())
        .bind(quote.discount_value)
        .bind(quote.tax_amount)
        .bind(quote.issue_date)
        .bind(quote.expiry_date)
        .bind(quote.accepted_at)
        .bind(quote.rejected_at)
        .bind(&quote.notes)
        .bind(quote.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(format!(
                    "quote number {} already exists",
                    quote.quote_number
                ));
            }
            error!("Database error updating quote {}: {}", quote.id, e);
            AppError::Database(format!("Failed to update quote: {}", e))
        })?
        .ok_or_else(|| AppError::QuoteNotFound(quote.id.to_string()))?;

        if let Some(items) = items {
            sqlx::query("DELETE FROM quote_items WHERE quote_id = $1")
                .bind(quote.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Database error clearing quote items: {}", e);
                    AppError::Database(format!("Failed to clear quote items: {}", e))
                })?;
            Self::insert_items(&mut tx, items).await?;
        }

        Self::commit(tx).await?;

        row.try_into()
    }

    #[instrument(skip(self, quote))]
    async fn update(&self, quote: &Quote) -> AppResult<Quote> {
        self.update_with_items(quote, None).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting quote {}", id);

        let mut tx = self.begin().await?;

        sqlx::query("DELETE FROM quote_items WHERE quote_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error deleting quote items: {}", e);
                AppError::Database(format!("Failed to delete quote items: {}", e))
            })?;

        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error deleting quote {}: {}", id, e);
                AppError::Database(format!("Failed to delete quote: {}", e))
            })?;

        Self::commit(tx).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> PgPool {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/cotiza_crm".to_string());
        crate::pool::create_pool(&database_url, Some(2)).await.unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_find_missing_quote() {
        let repo = PgQuoteRepository::new(test_pool().await);
        let result = repo.find_by_id(Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_delete_missing_quote() {
        let repo = PgQuoteRepository::new(test_pool().await);
        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
    }
}
