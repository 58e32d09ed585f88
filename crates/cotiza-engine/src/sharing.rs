//! Company sharing orchestrator
//!
//! Grants another user scoped access to a company. Issuing and revoking
//! grants is reserved to the owner (or the administrative actor); a grant
//! only becomes effective once the recipient accepts it.

use crate::access::{AccessClass, AccessResolver, Actor};
use crate::entitlements::{ensure_feature, ensure_within_limit};
use chrono::Utc;
use cotiza_core::models::{CompanyShare, Feature, LimitKind, SharePermissions, ShareStatus};
use cotiza_core::traits::{CompanyRepository, PlanResolver, ShareRepository, UserRepository};
use cotiza_core::{AppError, AppResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateShareInput {
    #[validate(email)]
    pub recipient_email: String,
    #[serde(default)]
    pub permissions: SharePermissions,
}

pub struct ShareOrchestrator<C, S, U, R>
where
    C: CompanyRepository,
    S: ShareRepository,
    U: UserRepository,
    R: PlanResolver,
{
    companies: Arc<C>,
    access: AccessResolver<S>,
    shares: Arc<S>,
    users: Arc<U>,
    plans: Arc<R>,
}

impl<C, S, U, R> ShareOrchestrator<C, S, U, R>
where
    C: CompanyRepository,
    S: ShareRepository,
    U: UserRepository,
    R: PlanResolver,
{
    pub fn new(companies: Arc<C>, shares: Arc<S>, users: Arc<U>, plans: Arc<R>) -> Self {
        Self {
            companies,
            access: AccessResolver::new(shares.clone()),
            shares,
            users,
            plans,
        }
    }

    async fn load_company(&self, company_id: Uuid) -> AppResult<cotiza_core::models::Company> {
        self.companies
            .find_by_id(company_id)
            .await?
            .ok_or_else(|| AppError::CompanyNotFound(company_id.to_string()))
    }

    /// Invite a user into the company.
    ///
    /// The grant starts pending; the recipient has no access until they
    /// accept it. Passing `None` as the share action keeps issuing grants an
    /// owner-only operation.
    #[instrument(skip(self, input), fields(company = %company_id))]
    pub async fn create_share(
        &self,
        actor: &Actor,
        company_id: Uuid,
        input: CreateShareInput,
    ) -> AppResult<CompanyShare> {
        input.validate()?;

        let company = self.load_company(company_id).await?;
        self.access
            .authorize(actor, &company, AccessClass::Write, None)
            .await?;

        let recipient = self
            .users
            .find_by_email(&input.recipient_email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(input.recipient_email.clone()))?;
        if recipient.id == company.owner_id {
            return Err(AppError::InvalidInput(
                "cannot share a company with its owner".to_string(),
            ));
        }

        let features = self
            .plans
            .resolve_in_force_plan(company.owner_id)
            .await?
            .map(|p| p.features);
        ensure_feature(features.as_ref(), Feature::CompanySharing)?;

        let for_company = self.shares.count_for_company(company.id).await?;
        ensure_within_limit(features.as_ref(), LimitKind::SharesPerCompany, for_company)?;
        let for_recipient = self.shares.count_for_recipient(recipient.id).await?;
        ensure_within_limit(features.as_ref(), LimitKind::SharesForUser, for_recipient)?;

        if self
            .shares
            .find_for(company.id, recipient.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "share for {} already exists",
                input.recipient_email
            )));
        }

        let now = Utc::now();
        let share = CompanyShare {
            id: Uuid::new_v4(),
            company_id: company.id,
            recipient_id: recipient.id,
            grantor_id: actor.user_id(),
            permissions: input.permissions,
            status: ShareStatus::PendingAcceptance,
            created_at: now,
            updated_at: now,
        };
        let share = self.shares.insert(&share).await?;
        info!(share = %share.id, recipient = %share.recipient_id, "share created");
        Ok(share)
    }

    /// Revoke a grant. Revocation takes effect immediately.
    #[instrument(skip(self), fields(company = %company_id, share = %share_id))]
    pub async fn revoke_share(
        &self,
        actor: &Actor,
        company_id: Uuid,
        share_id: Uuid,
    ) -> AppResult<CompanyShare> {
        let company = self.load_company(company_id).await?;
        self.access
            .authorize(actor, &company, AccessClass::Write, None)
            .await?;

        let share = self
            .shares
            .find_by_id(share_id)
            .await?
            .filter(|s| s.company_id == company.id)
            .ok_or_else(|| AppError::ShareNotFound(share_id.to_string()))?;

        let share = self
            .shares
            .update_status(share.id, ShareStatus::Revoked)
            .await?;
        info!(share = %share.id, recipient = %share.recipient_id, "share revoked");
        Ok(share)
    }

    /// Accept a pending grant. Only the recipient can accept, and only once.
    #[instrument(skip(self), fields(share = %share_id))]
    pub async fn accept_share(&self, actor: &Actor, share_id: Uuid) -> AppResult<CompanyShare> {
        let recipient_id = match actor {
            Actor::User(id) => *id,
            Actor::AdministrativeOverride { .. } => return Err(AppError::Forbidden),
        };

        let share = self
            .shares
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::ShareNotFound(share_id.to_string()))?;
        if share.recipient_id != recipient_id {
            return Err(AppError::Forbidden);
        }
        if share.status != ShareStatus::PendingAcceptance {
            return Err(AppError::Conflict(format!(
                "share is {}, not pending acceptance",
                share.status
            )));
        }

        let share = self
            .shares
            .update_status(share.id, ShareStatus::Active)
            .await?;
        info!(share = %share.id, recipient = %share.recipient_id, "share accepted");
        Ok(share)
    }
}
