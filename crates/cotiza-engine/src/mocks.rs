//! In-memory repository doubles and entity builders for engine tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cotiza_core::models::{
    Client, Company, CompanyShare, CompanyStatus, Plan, PlanFeatures, Product, Quote, QuoteItem,
    QuoteStatus, SharePermissions, ShareStatus, User,
};
use cotiza_core::traits::{
    ClientRepository, CompanyRepository, PlanResolver, ProductRepository, QuoteRepository,
    ShareRepository, UserRepository,
};
use cotiza_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

// ==================== builders ====================

pub(crate) fn company_with_status(status: CompanyStatus) -> Company {
    Company {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        name: "Acme SAC".to_string(),
        status,
        currency: "USD".to_string(),
        logo_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn share_for(
    company: &Company,
    recipient_id: Uuid,
    permissions: SharePermissions,
    status: ShareStatus,
) -> CompanyShare {
    CompanyShare {
        id: Uuid::new_v4(),
        company_id: company.id,
        recipient_id,
        grantor_id: company.owner_id,
        permissions,
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn quote_with_status(status: QuoteStatus) -> Quote {
    Quote {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        quote_number: "Q-0001".to_string(),
        currency: "USD".to_string(),
        subtotal: 10000,
        discount: 0,
        tax: 0,
        total: 10000,
        status,
        discount_type: cotiza_core::models::DiscountType::None,
        discount_value: 0,
        tax_amount: 0,
        issue_date: None,
        expiry_date: None,
        accepted_at: None,
        rejected_at: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn plan_with_features(features: PlanFeatures) -> Plan {
    Plan {
        id: Uuid::new_v4(),
        name: "Profesional".to_string(),
        code: "PRO-M".to_string(),
        features,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn user_named(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{}@cotiza.test", name),
        name: name.to_string(),
        created_at: Utc::now(),
    }
}

pub(crate) fn client_in(company_id: Uuid) -> Client {
    Client {
        id: Uuid::new_v4(),
        company_id,
        name: "Cliente Uno".to_string(),
        email: None,
        phone: None,
        address: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn product_in(company_id: Uuid, sku: &str, unit_price: i64) -> Product {
    Product {
        id: Uuid::new_v4(),
        company_id,
        sku: sku.to_string(),
        description: format!("Product {}", sku),
        unit_price,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ==================== repositories ====================

#[derive(Default)]
pub(crate) struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUsers {
    pub(crate) fn add(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryCompanies {
    companies: Mutex<HashMap<Uuid, Company>>,
}

impl InMemoryCompanies {
    pub(crate) fn add(&self, company: Company) {
        self.companies.lock().unwrap().insert(company.id, company);
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanies {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>> {
        Ok(self.companies.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryShares {
    shares: Mutex<Vec<CompanyShare>>,
}

impl InMemoryShares {
    pub(crate) fn add(&self, share: CompanyShare) {
        self.shares.lock().unwrap().push(share);
    }
}

#[async_trait]
impl ShareRepository for InMemoryShares {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CompanyShare>> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn find_for(
        &self,
        company_id: Uuid,
        recipient_id: Uuid,
    ) -> AppResult<Option<CompanyShare>> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.company_id == company_id && s.recipient_id == recipient_id)
            .cloned())
    }

    async fn count_for_company(&self, company_id: Uuid) -> AppResult<i64> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.company_id == company_id)
            .count() as i64)
    }

    async fn count_for_recipient(&self, recipient_id: Uuid) -> AppResult<i64> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.recipient_id == recipient_id)
            .count() as i64)
    }

    async fn insert(&self, share: &CompanyShare) -> AppResult<CompanyShare> {
        let mut shares = self.shares.lock().unwrap();
        // Mirrors the database unique index on (company_id, recipient_id)
        if shares
            .iter()
            .any(|s| s.company_id == share.company_id && s.recipient_id == share.recipient_id)
        {
            return Err(AppError::Conflict(format!(
                "share for recipient {} already exists",
                share.recipient_id
            )));
        }
        shares.push(share.clone());
        Ok(share.clone())
    }

    async fn update_status(&self, id: Uuid, status: ShareStatus) -> AppResult<CompanyShare> {
        let mut shares = self.shares.lock().unwrap();
        let share = shares
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::ShareNotFound(id.to_string()))?;
        share.status = status;
        share.updated_at = Utc::now();
        Ok(share.clone())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryClients {
    clients: Mutex<HashMap<Uuid, Client>>,
}

impl InMemoryClients {
    pub(crate) fn add(&self, client: Client) {
        self.clients.lock().unwrap().insert(client.id, client);
    }
}

#[async_trait]
impl ClientRepository for InMemoryClients {
    async fn find_in_company(
        &self,
        company_id: Uuid,
        client_id: Uuid,
    ) -> AppResult<Option<Client>> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .get(&client_id)
            .filter(|c| c.company_id == company_id)
            .cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryProducts {
    products: Mutex<HashMap<Uuid, Product>>,
}

impl InMemoryProducts {
    pub(crate) fn add(&self, product: Product) {
        self.products.lock().unwrap().insert(product.id, product);
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn find_in_company(
        &self,
        company_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<Option<Product>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .get(&product_id)
            .filter(|p| p.company_id == company_id)
            .cloned())
    }

    async fn find_by_sku(&self, company_id: Uuid, sku: &str) -> AppResult<Option<Product>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .values()
            .find(|p| p.company_id == company_id && p.sku == sku)
            .cloned())
    }

    async fn count_for_company(&self, company_id: Uuid) -> AppResult<i64> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.company_id == company_id)
            .count() as i64)
    }

    async fn insert(&self, product: &Product) -> AppResult<Product> {
        let mut products = self.products.lock().unwrap();
        if products
            .values()
            .any(|p| p.company_id == product.company_id && p.sku == product.sku)
        {
            return Err(AppError::Conflict(format!(
                "SKU {} already exists",
                product.sku
            )));
        }
        products.insert(product.id, product.clone());
        Ok(product.clone())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryQuotes {
    quotes: Mutex<HashMap<Uuid, Quote>>,
    items: Mutex<HashMap<Uuid, Vec<QuoteItem>>>,
}

impl InMemoryQuotes {
    pub(crate) fn add(&self, quote: Quote, items: Vec<QuoteItem>) {
        self.items.lock().unwrap().insert(quote.id, items);
        self.quotes.lock().unwrap().insert(quote.id, quote);
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuotes {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quote>> {
        Ok(self.quotes.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_number(
        &self,
        company_id: Uuid,
        quote_number: &str,
    ) -> AppResult<Option<Quote>> {
        Ok(self
            .quotes
            .lock()
            .unwrap()
            .values()
            .find(|q| q.company_id == company_id && q.quote_number == quote_number)
            .cloned())
    }

    async fn find_items(&self, quote_id: Uuid) -> AppResult<Vec<QuoteItem>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&quote_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_created_since(
        &self,
        company_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<i64> {
        Ok(self
            .quotes
            .lock()
            .unwrap()
            .values()
            .filter(|q| q.company_id == company_id && q.created_at >= since)
            .count() as i64)
    }

    async fn create_with_items(&self, quote: &Quote, items: &[QuoteItem]) -> AppResult<Quote> {
        let mut quotes = self.quotes.lock().unwrap();
        // Mirrors the database unique index on (company_id, quote_number)
        if quotes
            .values()
            .any(|q| q.company_id == quote.company_id && q.quote_number == quote.quote_number)
        {
            return Err(AppError::Conflict(format!(
                "quote number {} already exists",
                quote.quote_number
            )));
        }
        quotes.insert(quote.id, quote.clone());
        self.items.lock().unwrap().insert(quote.id, items.to_vec());
        Ok(quote.clone())
    }

    async fn update_with_items(
        &self,
        quote: &Quote,
        items: Option<&[QuoteItem]>,
    ) -> AppResult<Quote> {
        self.quotes
            .lock()
            .unwrap()
            .insert(quote.id, quote.clone());
        if let Some(items) = items {
            self.items.lock().unwrap().insert(quote.id, items.to_vec());
        }
        Ok(quote.clone())
    }

    async fn update(&self, quote: &Quote) -> AppResult<Quote> {
        self.quotes
            .lock()
            .unwrap()
            .insert(quote.id, quote.clone());
        Ok(quote.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.items.lock().unwrap().remove(&id);
        Ok(self.quotes.lock().unwrap().remove(&id).is_some())
    }
}

/// Plan resolver returning a fixed plan for every user
pub(crate) struct FixedPlanResolver {
    plan: Option<Plan>,
}

impl FixedPlanResolver {
    pub(crate) fn some(features: PlanFeatures) -> Self {
        Self {
            plan: Some(plan_with_features(features)),
        }
    }

    pub(crate) fn none() -> Self {
        Self { plan: None }
    }
}

#[async_trait]
impl PlanResolver for FixedPlanResolver {
    async fn resolve_in_force_plan(&self, _user_id: Uuid) -> AppResult<Option<Plan>> {
        Ok(self.plan.clone())
    }
}
