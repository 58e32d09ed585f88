//! Common traits for repositories and collaborators
//!
//! Defines the boundary between the engine and its external collaborators:
//! per-aggregate repositories, the plan resolver, and the authentication
//! context handed in by the routing layer. Repository implementations own
//! transaction scoping; methods documented as atomic must be all-or-nothing.

use crate::error::AppError;
use crate::models::{
    Client, Company, CompanyShare, Plan, Product, Quote, QuoteItem, ShareStatus, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Authentication context supplied by the caller.
///
/// The engine never parses tokens; the routing layer authenticates the
/// request and hands over this record. The administrative override fields
/// come from an out-of-band secret plus an explicit target-company header,
/// never from the normal session.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user id
    pub actor_user_id: Uuid,

    /// Whether the break-glass administrative path was requested
    pub is_administrative_override: bool,

    /// Target company for the administrative override
    pub override_company_id: Option<Uuid>,

    /// Secret presented alongside the override request
    pub override_secret: Option<String>,
}

impl AuthContext {
    /// Context for a normal authenticated user
    pub fn user(actor_user_id: Uuid) -> Self {
        Self {
            actor_user_id,
            is_administrative_override: false,
            override_company_id: None,
            override_secret: None,
        }
    }
}

/// User repository
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

/// Company repository
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Find company by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError>;
}

/// Company share repository
#[async_trait]
pub trait ShareRepository: Send + Sync {
    /// Find share by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CompanyShare>, AppError>;

    /// Find the share for a (company, recipient) pair regardless of status
    async fn find_for(
        &self,
        company_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Option<CompanyShare>, AppError>;

    /// Count shares recorded for a company
    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, AppError>;

    /// Count shares held by a recipient across companies
    async fn count_for_recipient(&self, recipient_id: Uuid) -> Result<i64, AppError>;

    /// Insert a new share
    async fn insert(&self, share: &CompanyShare) -> Result<CompanyShare, AppError>;

    /// Update a share's status
    async fn update_status(&self, id: Uuid, status: ShareStatus)
        -> Result<CompanyShare, AppError>;
}

/// Client repository
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Find a client scoped to its company
    async fn find_in_company(
        &self,
        company_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError>;
}

/// Product repository
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a product scoped to its company
    async fn find_in_company(
        &self,
        company_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>;

    /// Find a product by SKU within a company
    async fn find_by_sku(&self, company_id: Uuid, sku: &str)
        -> Result<Option<Product>, AppError>;

    /// Count products recorded for a company
    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, AppError>;

    /// Insert a new product
    async fn insert(&self, product: &Product) -> Result<Product, AppError>;
}

/// Quote repository
///
/// Multi-entity writes (quote plus its items) are atomic: the
/// implementation wraps them in one transaction and rolls back entirely on
/// any failure.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Find quote by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>, AppError>;

    /// Find a quote by its human-assigned number within a company
    async fn find_by_number(
        &self,
        company_id: Uuid,
        quote_number: &str,
    ) -> Result<Option<Quote>, AppError>;

    /// Items of a quote, in display order
    async fn find_items(&self, quote_id: Uuid) -> Result<Vec<QuoteItem>, AppError>;

    /// Count quotes created for a company since the given instant
    async fn count_created_since(
        &self,
        company_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    /// Insert a quote together with its items, atomically
    async fn create_with_items(
        &self,
        quote: &Quote,
        items: &[QuoteItem],
    ) -> Result<Quote, AppError>;

    /// Update a quote; when `items` is `Some`, fully replace the item set in
    /// the same transaction
    async fn update_with_items(
        &self,
        quote: &Quote,
        items: Option<&[QuoteItem]>,
    ) -> Result<Quote, AppError>;

    /// Update a quote's scalar fields only (status transitions)
    async fn update(&self, quote: &Quote) -> Result<Quote, AppError>;

    /// Delete a quote and its items, atomically
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Plan resolver collaborator.
///
/// Selects the plan of the user's most recently created in-force
/// subscription (active, trialing or free); `None` when the user holds no
/// in-force subscription. The engine never reaches into subscription rows
/// directly.
#[async_trait]
pub trait PlanResolver: Send + Sync {
    async fn resolve_in_force_plan(&self, user_id: Uuid) -> Result<Option<Plan>, AppError>;
}
