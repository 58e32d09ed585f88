//! Quote orchestrator
//!
//! Composes access resolution, plan gating, the monetary calculator and the
//! lifecycle state machine over the repository boundary. Multi-entity writes
//! (quote plus items) go through the repository's atomic entry points and
//! are all-or-nothing.

use crate::access::{AccessClass, AccessResolver, Actor};
use crate::entitlements::ensure_within_limit;
use crate::lifecycle;
use crate::pricing::{self, LineItem};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use cotiza_core::models::{
    DiscountType, LimitKind, PlanFeatures, Quote, QuoteItem, QuoteStatus, ShareAction,
};
use cotiza_core::traits::{
    ClientRepository, CompanyRepository, PlanResolver, ProductRepository, QuoteRepository,
    ShareRepository,
};
use cotiza_core::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

/// One requested line item. Referencing a product snapshots its description
/// and unit price unless the payload overrides them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItemInput {
    pub product_id: Option<Uuid>,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Option<i64>,
}

/// Payload for creating a quote
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuoteInput {
    #[validate(length(min = 1, max = 50))]
    pub quote_number: String,
    pub client_id: Uuid,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: i64,
    #[serde(default)]
    pub tax_amount: i64,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<QuoteItemInput>,
}

/// Payload for updating a quote; `None` fields are left untouched. When
/// `items` is present the item set is fully replaced and amounts recomputed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuoteInput {
    #[validate(length(min = 1, max = 50))]
    pub quote_number: Option<String>,
    pub client_id: Option<Uuid>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub tax_amount: Option<i64>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Option<Vec<QuoteItemInput>>,
}

/// A quote hydrated with its items
#[derive(Debug, Clone)]
pub struct QuoteWithItems {
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
}

/// Item with product resolution already applied
struct ResolvedItem {
    product_id: Option<Uuid>,
    description: String,
    quantity: Decimal,
    unit_price: i64,
}

/// First instant of the month containing `now`, for monthly quote quotas
fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
    first.and_time(NaiveTime::MIN).and_utc()
}

/// Orchestrates quote operations for one request
pub struct QuoteOrchestrator<C, S, Cl, P, Q, R>
where
    C: CompanyRepository,
    S: ShareRepository,
    Cl: ClientRepository,
    P: ProductRepository,
    Q: QuoteRepository,
    R: PlanResolver,
{
    companies: Arc<C>,
    access: AccessResolver<S>,
    clients: Arc<Cl>,
    products: Arc<P>,
    quotes: Arc<Q>,
    plans: Arc<R>,
}

impl<C, S, Cl, P, Q, R> QuoteOrchestrator<C, S, Cl, P, Q, R>
where
    C: CompanyRepository,
    S: ShareRepository,
    Cl: ClientRepository,
    P: ProductRepository,
    Q: QuoteRepository,
    R: PlanResolver,
{
    /// Create a new quote orchestrator
    pub fn new(
        companies: Arc<C>,
        shares: Arc<S>,
        clients: Arc<Cl>,
        products: Arc<P>,
        quotes: Arc<Q>,
        plans: Arc<R>,
    ) -> Self {
        Self {
            companies,
            access: AccessResolver::new(shares),
            clients,
            products,
            quotes,
            plans,
        }
    }

    async fn load_company(&self, company_id: Uuid) -> AppResult<cotiza_core::models::Company> {
        self.companies
            .find_by_id(company_id)
            .await?
            .ok_or_else(|| AppError::CompanyNotFound(company_id.to_string()))
    }

    async fn load_quote_in_company(&self, company_id: Uuid, quote_id: Uuid) -> AppResult<Quote> {
        self.quotes
            .find_by_id(quote_id)
            .await?
            .filter(|q| q.company_id == company_id)
            .ok_or_else(|| AppError::QuoteNotFound(quote_id.to_string()))
    }

    /// Plan limits always apply against the company owner's plan, also when
    /// a shared user or the administrative actor performs the operation.
    async fn owner_features(&self, owner_id: Uuid) -> AppResult<Option<PlanFeatures>> {
        Ok(self
            .plans
            .resolve_in_force_plan(owner_id)
            .await?
            .map(|p| p.features))
    }

    /// Resolve requested items against the product catalog, snapshotting
    /// description and unit price at the time of addition.
    async fn resolve_items(
        &self,
        company_id: Uuid,
        inputs: &[QuoteItemInput],
    ) -> AppResult<Vec<ResolvedItem>> {
        let mut resolved = Vec::with_capacity(inputs.len());
        for input in inputs {
            let (description, unit_price) = match input.product_id {
                Some(product_id) => {
                    let product = self
                        .products
                        .find_in_company(company_id, product_id)
                        .await?
                        .ok_or_else(|| AppError::ProductNotFound(product_id.to_string()))?;
                    (
                        input
                            .description
                            .clone()
                            .unwrap_or(product.description),
                        input.unit_price.unwrap_or(product.unit_price),
                    )
                }
                None => (
                    input
                        .description
                        .clone()
                        .ok_or_else(|| AppError::MissingField("description".to_string()))?,
                    input
                        .unit_price
                        .ok_or_else(|| AppError::MissingField("unit_price".to_string()))?,
                ),
            };
            resolved.push(ResolvedItem {
                product_id: input.product_id,
                description,
                quantity: input.quantity,
                unit_price,
            });
        }
        Ok(resolved)
    }

    fn build_items(quote_id: Uuid, resolved: &[ResolvedItem], line_totals: &[i64]) -> Vec<QuoteItem> {
        resolved
            .iter()
            .zip(line_totals)
            .enumerate()
            .map(|(idx, (item, total))| QuoteItem {
                id: Uuid::new_v4(),
                quote_id,
                product_id: item.product_id,
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: *total,
                position: idx as i32,
            })
            .collect()
    }

    /// Create a quote with its items
    #[instrument(skip(self, input), fields(company = %company_id))]
    pub async fn create_quote(
        &self,
        actor: &Actor,
        company_id: Uuid,
        input: CreateQuoteInput,
    ) -> AppResult<QuoteWithItems> {
        input.validate()?;

        let company = self.load_company(company_id).await?;
        self.access
            .authorize(actor, &company, AccessClass::Write, Some(ShareAction::CreateQuotes))
            .await?;

        let features = self.owner_features(company.owner_id).await?;

        let now = Utc::now();
        let created_this_month = self
            .quotes
            .count_created_since(company.id, month_start(now))
            .await?;
        ensure_within_limit(
            features.as_ref(),
            LimitKind::QuotesPerMonth,
            created_this_month,
        )?;
        // A quote may carry exactly the limit; the check is whether the last
        // item pushes past it
        ensure_within_limit(
            features.as_ref(),
            LimitKind::ItemsPerQuote,
            input.items.len() as i64 - 1,
        )?;

        self.clients
            .find_in_company(company.id, input.client_id)
            .await?
            .ok_or_else(|| AppError::ClientNotFound(input.client_id.to_string()))?;

        if self
            .quotes
            .find_by_number(company.id, &input.quote_number)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "quote number {} already exists",
                input.quote_number
            )));
        }

        let resolved = self.resolve_items(company.id, &input.items).await?;
        let lines: Vec<LineItem> = resolved
            .iter()
            .map(|r| LineItem {
                quantity: r.quantity,
                unit_price: r.unit_price,
            })
            .collect();
        let outcome = pricing::price_items(
            &lines,
            input.discount_type,
            input.discount_value,
            input.tax_amount,
        )?;

        let quote_id = Uuid::new_v4();
        let quote = Quote {
            id: quote_id,
            company_id: company.id,
            client_id: input.client_id,
            quote_number: input.quote_number,
            currency: company.currency.clone(),
            subtotal: outcome.totals.subtotal,
            discount: outcome.totals.discount,
            tax: outcome.totals.tax,
            total: outcome.totals.total,
            status: QuoteStatus::Draft,
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            tax_amount: input.tax_amount,
            issue_date: input.issue_date,
            expiry_date: input.expiry_date,
            accepted_at: None,
            rejected_at: None,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        let items = Self::build_items(quote_id, &resolved, &outcome.line_totals);

        let quote = self.quotes.create_with_items(&quote, &items).await?;
        info!(quote = %quote.id, number = %quote.quote_number, "quote created");

        Ok(QuoteWithItems { quote, items })
    }

    /// Update a quote's fields and optionally replace its item set
    #[instrument(skip(self, input), fields(company = %company_id, quote = %quote_id))]
    pub async fn update_quote(
        &self,
        actor: &Actor,
        company_id: Uuid,
        quote_id: Uuid,
        input: UpdateQuoteInput,
    ) -> AppResult<QuoteWithItems> {
        input.validate()?;

        let company = self.load_company(company_id).await?;
        self.access
            .authorize(actor, &company, AccessClass::Write, Some(ShareAction::EditQuotes))
            .await?;

        let mut quote = self.load_quote_in_company(company.id, quote_id).await?;
        lifecycle::ensure_editable(&quote)?;

        if let Some(number) = &input.quote_number {
            if *number != quote.quote_number {
                if self
                    .quotes
                    .find_by_number(company.id, number)
                    .await?
                    .is_some()
                {
                    return Err(AppError::Conflict(format!(
                        "quote number {} already exists",
                        number
                    )));
                }
                quote.quote_number = number.clone();
            }
        }
        if let Some(client_id) = input.client_id {
            self.clients
                .find_in_company(company.id, client_id)
                .await?
                .ok_or_else(|| AppError::ClientNotFound(client_id.to_string()))?;
            quote.client_id = client_id;
        }
        if let Some(discount_type) = input.discount_type {
            quote.discount_type = discount_type;
        }
        if let Some(discount_value) = input.discount_value {
            quote.discount_value = discount_value;
        }
        if let Some(tax_amount) = input.tax_amount {
            quote.tax_amount = tax_amount;
        }
        if let Some(issue_date) = input.issue_date {
            quote.issue_date = Some(issue_date);
        }
        if let Some(expiry_date) = input.expiry_date {
            quote.expiry_date = Some(expiry_date);
        }
        if let Some(notes) = input.notes {
            quote.notes = Some(notes);
        }

        // Reprice from the replacement items, or from the stored snapshots
        // when only directives changed
        let (new_items, lines) = match &input.items {
            Some(inputs) => {
                let features = self.owner_features(company.owner_id).await?;
                ensure_within_limit(
                    features.as_ref(),
                    LimitKind::ItemsPerQuote,
                    inputs.len() as i64 - 1,
                )?;
                let resolved = self.resolve_items(company.id, inputs).await?;
                let lines: Vec<LineItem> = resolved
                    .iter()
                    .map(|r| LineItem {
                        quantity: r.quantity,
                        unit_price: r.unit_price,
                    })
                    .collect();
                (Some(resolved), lines)
            }
            None => {
                let stored = self.quotes.find_items(quote.id).await?;
                let lines = stored
                    .iter()
                    .map(|i| LineItem {
                        quantity: i.quantity,
                        unit_price: i.unit_price,
                    })
                    .collect();
                (None, lines)
            }
        };

        let outcome = pricing::price_items(
            &lines,
            quote.discount_type,
            quote.discount_value,
            quote.tax_amount,
        )?;
        quote.subtotal = outcome.totals.subtotal;
        quote.discount = outcome.totals.discount;
        quote.tax = outcome.totals.tax;
        quote.total = outcome.totals.total;
        quote.updated_at = Utc::now();

        let items = match new_items {
            Some(resolved) => {
                let items = Self::build_items(quote.id, &resolved, &outcome.line_totals);
                let quote = self.quotes.update_with_items(&quote, Some(&items)).await?;
                info!(quote = %quote.id, "quote updated with replaced items");
                return Ok(QuoteWithItems { quote, items });
            }
            None => self.quotes.find_items(quote.id).await?,
        };

        let quote = self.quotes.update_with_items(&quote, None).await?;
        info!(quote = %quote.id, "quote updated");
        Ok(QuoteWithItems { quote, items })
    }

    /// Apply a status transition
    #[instrument(skip(self), fields(company = %company_id, quote = %quote_id))]
    pub async fn update_quote_status(
        &self,
        actor: &Actor,
        company_id: Uuid,
        quote_id: Uuid,
        next: QuoteStatus,
    ) -> AppResult<Quote> {
        let company = self.load_company(company_id).await?;
        self.access
            .authorize(actor, &company, AccessClass::Write, Some(ShareAction::EditQuotes))
            .await?;

        let mut quote = self.load_quote_in_company(company.id, quote_id).await?;
        let changed = lifecycle::apply_transition(&mut quote, next, Utc::now())?;
        if changed {
            quote = self.quotes.update(&quote).await?;
            info!(quote = %quote.id, status = %quote.status, "quote status changed");
        } else {
            debug!(quote = %quote.id, status = %quote.status, "status unchanged");
        }
        Ok(quote)
    }

    /// Delete a quote and its items
    #[instrument(skip(self), fields(company = %company_id, quote = %quote_id))]
    pub async fn delete_quote(
        &self,
        actor: &Actor,
        company_id: Uuid,
        quote_id: Uuid,
    ) -> AppResult<()> {
        let company = self.load_company(company_id).await?;
        self.access
            .authorize(actor, &company, AccessClass::Write, Some(ShareAction::DeleteQuotes))
            .await?;

        let quote = self.load_quote_in_company(company.id, quote_id).await?;
        lifecycle::ensure_deletable(&quote)?;

        self.quotes.delete(quote.id).await?;
        info!(quote = %quote.id, number = %quote.quote_number, "quote deleted");
        Ok(())
    }

    /// Fetch a quote with its items
    #[instrument(skip(self), fields(company = %company_id, quote = %quote_id))]
    pub async fn get_quote(
        &self,
        actor: &Actor,
        company_id: Uuid,
        quote_id: Uuid,
    ) -> AppResult<QuoteWithItems> {
        let company = self.load_company(company_id).await?;
        self.access
            .authorize(actor, &company, AccessClass::Read, None)
            .await?;

        let quote = self.load_quote_in_company(company.id, quote_id).await?;
        let items = self.quotes.find_items(quote.id).await?;
        Ok(QuoteWithItems { quote, items })
    }
}
