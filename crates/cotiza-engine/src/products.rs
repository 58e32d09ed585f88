//! Product catalog orchestrator
//!
//! Catalog management is a plan capability: the owner's plan must carry the
//! product catalog flag, and the company-wide product count is capped by the
//! plan's product limit.

use crate::access::{AccessClass, AccessResolver, Actor};
use crate::entitlements::{ensure_feature, ensure_within_limit};
use chrono::Utc;
use cotiza_core::models::{Feature, LimitKind, Product, ShareAction};
use cotiza_core::traits::{CompanyRepository, PlanResolver, ProductRepository, ShareRepository};
use cotiza_core::{AppError, AppResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    #[validate(range(min = 0))]
    pub unit_price: i64,
}

pub struct ProductOrchestrator<C, S, P, R>
where
    C: CompanyRepository,
    S: ShareRepository,
    P: ProductRepository,
    R: PlanResolver,
{
    companies: Arc<C>,
    access: AccessResolver<S>,
    products: Arc<P>,
    plans: Arc<R>,
}

impl<C, S, P, R> ProductOrchestrator<C, S, P, R>
where
    C: CompanyRepository,
    S: ShareRepository,
    P: ProductRepository,
    R: PlanResolver,
{
    pub fn new(companies: Arc<C>, shares: Arc<S>, products: Arc<P>, plans: Arc<R>) -> Self {
        Self {
            companies,
            access: AccessResolver::new(shares),
            products,
            plans,
        }
    }

    /// Add a product to the company catalog
    #[instrument(skip(self, input), fields(company = %company_id))]
    pub async fn create_product(
        &self,
        actor: &Actor,
        company_id: Uuid,
        input: CreateProductInput,
    ) -> AppResult<Product> {
        input.validate()?;

        let company = self
            .companies
            .find_by_id(company_id)
            .await?
            .ok_or_else(|| AppError::CompanyNotFound(company_id.to_string()))?;
        self.access
            .authorize(
                actor,
                &company,
                AccessClass::Write,
                Some(ShareAction::ManageProducts),
            )
            .await?;

        let features = self
            .plans
            .resolve_in_force_plan(company.owner_id)
            .await?
            .map(|p| p.features);
        ensure_feature(features.as_ref(), Feature::ProductCatalog)?;

        let current = self.products.count_for_company(company.id).await?;
        ensure_within_limit(features.as_ref(), LimitKind::ProductsPerCompany, current)?;

        if self
            .products
            .find_by_sku(company.id, &input.sku)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "SKU {} already exists",
                input.sku
            )));
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            company_id: company.id,
            sku: input.sku,
            description: input.description,
            unit_price: input.unit_price,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let product = self.products.insert(&product).await?;
        info!(product = %product.id, sku = %product.sku, "product created");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        company_with_status, product_in, share_for, FixedPlanResolver, InMemoryCompanies,
        InMemoryProducts, InMemoryShares,
    };
    use cotiza_core::models::{
        Company, CompanyStatus, Limit, PlanFeatures, SharePermissions, ShareStatus,
    };

    type TestOrchestrator =
        ProductOrchestrator<InMemoryCompanies, InMemoryShares, InMemoryProducts, FixedPlanResolver>;

    fn setup(features: Option<PlanFeatures>) -> (TestOrchestrator, Arc<InMemoryShares>, Arc<InMemoryProducts>, Company) {
        let companies = Arc::new(InMemoryCompanies::default());
        let shares = Arc::new(InMemoryShares::default());
        let products = Arc::new(InMemoryProducts::default());
        let plans = match features {
            Some(f) => FixedPlanResolver::some(f),
            None => FixedPlanResolver::none(),
        };

        let company = company_with_status(CompanyStatus::Active);
        companies.add(company.clone());

        let orchestrator = ProductOrchestrator::new(
            companies,
            shares.clone(),
            products.clone(),
            Arc::new(plans),
        );
        (orchestrator, shares, products, company)
    }

    fn catalog_features() -> PlanFeatures {
        PlanFeatures {
            product_catalog: true,
            ..Default::default()
        }
    }

    fn input(sku: &str) -> CreateProductInput {
        CreateProductInput {
            sku: sku.to_string(),
            description: "Licencia anual".to_string(),
            unit_price: 4900,
        }
    }

    #[tokio::test]
    async fn test_owner_creates_product() {
        let (orch, _, _, company) = setup(Some(catalog_features()));
        let product = orch
            .create_product(&Actor::User(company.owner_id), company.id, input("SKU-1"))
            .await
            .unwrap();
        assert_eq!(product.sku, "SKU-1");
        assert!(product.active);
    }

    #[tokio::test]
    async fn test_plan_without_catalog_flag() {
        let (orch, _, _, company) = setup(Some(PlanFeatures::default()));
        let err = orch
            .create_product(&Actor::User(company.owner_id), company.id, input("SKU-1"))
            .await
            .unwrap_err();
        match err {
            AppError::PlanFeatureNotAllowed(name) => assert_eq!(name, "product_catalog"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_plan_fails_closed() {
        let (orch, _, _, company) = setup(None);
        let err = orch
            .create_product(&Actor::User(company.owner_id), company.id, input("SKU-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PlanFeatureNotAllowed(_)));
    }

    #[tokio::test]
    async fn test_product_limit() {
        let features = PlanFeatures {
            product_catalog: true,
            max_products_per_company: Limit::Max(2),
            ..Default::default()
        };
        let (orch, _, products, company) = setup(Some(features));
        products.add(product_in(company.id, "A", 100));
        products.add(product_in(company.id, "B", 100));

        let err = orch
            .create_product(&Actor::User(company.owner_id), company.id, input("C"))
            .await
            .unwrap_err();
        match err {
            AppError::PlanLimitExceeded { limit, max } => {
                assert_eq!(limit, "max_products_per_company");
                assert_eq!(max, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_negative_unit_price_rejected() {
        let (orch, _, products, company) = setup(Some(catalog_features()));

        let err = orch
            .create_product(
                &Actor::User(company.owner_id),
                company.id,
                CreateProductInput {
                    unit_price: -500,
                    ..input("SKU-1")
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // Nothing reached the catalog
        assert_eq!(products.count_for_company(company.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_sku_conflicts() {
        let (orch, _, products, company) = setup(Some(catalog_features()));
        products.add(product_in(company.id, "SKU-1", 100));

        let err = orch
            .create_product(&Actor::User(company.owner_id), company.id, input("SKU-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_shared_user_needs_manage_products() {
        let (orch, shares, _, company) = setup(Some(catalog_features()));
        let recipient = Uuid::new_v4();
        shares.add(share_for(
            &company,
            recipient,
            SharePermissions::default(),
            ShareStatus::Active,
        ));

        let err = orch
            .create_product(&Actor::User(recipient), company.id, input("SKU-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_shared_user_with_manage_products() {
        let (orch, shares, _, company) = setup(Some(catalog_features()));
        let recipient = Uuid::new_v4();
        shares.add(share_for(
            &company,
            recipient,
            SharePermissions {
                can_manage_products: true,
                ..Default::default()
            },
            ShareStatus::Active,
        ));

        orch.create_product(&Actor::User(recipient), company.id, input("SKU-1"))
            .await
            .unwrap();
    }
}
