//! Access resolution
//!
//! Decides whether an actor may perform an operation class on a company,
//! across the three overlapping roles: owner, shared collaborator with a
//! granular permission set, and the break-glass administrative actor.
//!
//! The administrative override is resolved exactly once at the boundary
//! (`resolve_actor`) into an explicit `Actor` variant; business logic never
//! re-infers it from ambient state. The substitution is logged for audit and
//! fails closed when the secret does not match or the administrative account
//! record cannot be found.

use cotiza_core::models::{Company, ShareAction};
use cotiza_core::traits::{AuthContext, ShareRepository, UserRepository};
use cotiza_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// The acting identity, resolved once at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Normal authenticated user
    User(Uuid),
    /// Break-glass administrative actor impersonating the owner of the
    /// stated company
    AdministrativeOverride { admin_id: Uuid, company_id: Uuid },
}

impl Actor {
    /// The underlying user id (the administrative account for overrides)
    pub fn user_id(&self) -> Uuid {
        match self {
            Actor::User(id) => *id,
            Actor::AdministrativeOverride { admin_id, .. } => *admin_id,
        }
    }
}

/// Requested operation class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessClass {
    Read,
    Write,
}

/// How access was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRole {
    Owner,
    Shared,
    Administrative,
}

/// A successful access decision
#[derive(Debug, Clone, Copy)]
pub struct AccessGrant {
    pub role: AccessRole,
}

/// Resolve the authentication context into an `Actor`.
///
/// The override path requires the configured secret to match the presented
/// one, an explicit target company, and a resolvable administrative account
/// record; anything missing denies with `Forbidden`.
#[instrument(skip(ctx, configured_secret, users))]
pub async fn resolve_actor<U: UserRepository>(
    ctx: &AuthContext,
    configured_secret: Option<&str>,
    users: &U,
) -> AppResult<Actor> {
    if !ctx.is_administrative_override {
        return Ok(Actor::User(ctx.actor_user_id));
    }

    let expected = match configured_secret {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!("administrative override requested but no secret is configured");
            return Err(AppError::Forbidden);
        }
    };
    match ctx.override_secret.as_deref() {
        Some(presented) if presented == expected => {}
        _ => {
            warn!(
                actor = %ctx.actor_user_id,
                "administrative override rejected: secret mismatch"
            );
            return Err(AppError::Forbidden);
        }
    }

    let company_id = ctx.override_company_id.ok_or_else(|| {
        warn!("administrative override rejected: no target company");
        AppError::Forbidden
    })?;

    // Fail closed when the administrative account record cannot be resolved
    let admin = users
        .find_by_id(ctx.actor_user_id)
        .await?
        .ok_or_else(|| {
            warn!(
                actor = %ctx.actor_user_id,
                "administrative override rejected: account record not found"
            );
            AppError::Forbidden
        })?;

    warn!(
        admin = %admin.id,
        company = %company_id,
        "administrative override in effect: acting as company owner"
    );

    Ok(Actor::AdministrativeOverride {
        admin_id: admin.id,
        company_id,
    })
}

/// Resolves actor access against a company snapshot
pub struct AccessResolver<S: ShareRepository> {
    shares: Arc<S>,
}

impl<S: ShareRepository> AccessResolver<S> {
    /// Create a new access resolver
    pub fn new(shares: Arc<S>) -> Self {
        Self { shares }
    }

    /// Decide whether `actor` may perform `class` on `company`.
    ///
    /// For write operations by shared users, `action` names the specific
    /// permission the share must carry; a write with no mappable action is
    /// owner-only (shared users are always denied it).
    ///
    /// Decision order:
    /// 1. Administrative override on the stated company: as if owner.
    /// 2. Owner: read and write, except write on an inactive company
    ///    (`CompanyInactive`; reads stay allowed).
    /// 3. An active share: read always; write only with the mapped
    ///    permission and only on a non-inactive company. Non-owners get no
    ///    access at all without an active share.
    #[instrument(skip(self, company), fields(company = %company.id))]
    pub async fn authorize(
        &self,
        actor: &Actor,
        company: &Company,
        class: AccessClass,
        action: Option<ShareAction>,
    ) -> AppResult<AccessGrant> {
        if let Actor::AdministrativeOverride {
            admin_id,
            company_id,
        } = actor
        {
            // The override grants nothing beyond the stated company
            if *company_id != company.id {
                warn!(
                    admin = %admin_id,
                    stated = %company_id,
                    "administrative override used against a different company"
                );
                return Err(AppError::Forbidden);
            }
            if class == AccessClass::Write && company.blocks_writes() {
                return Err(AppError::CompanyInactive(company.id.to_string()));
            }
            return Ok(AccessGrant {
                role: AccessRole::Administrative,
            });
        }

        let user_id = actor.user_id();

        if company.is_owned_by(user_id) {
            if class == AccessClass::Write && company.blocks_writes() {
                return Err(AppError::CompanyInactive(company.id.to_string()));
            }
            return Ok(AccessGrant {
                role: AccessRole::Owner,
            });
        }

        let share = self
            .shares
            .find_for(company.id, user_id)
            .await?
            .filter(|s| s.is_active())
            .ok_or(AppError::Forbidden)?;

        match class {
            AccessClass::Read => {
                debug!(user = %user_id, "read access via share");
                Ok(AccessGrant {
                    role: AccessRole::Shared,
                })
            }
            AccessClass::Write => {
                // Non-owners get zero write access on an inactive company;
                // there is no read-only carve-out to fall back to here.
                if company.blocks_writes() {
                    return Err(AppError::CompanyInactive(company.id.to_string()));
                }
                let permitted = action
                    .map(|a| share.permissions.permits(a))
                    .unwrap_or(false);
                if !permitted {
                    warn!(user = %user_id, ?action, "share lacks permission for write");
                    return Err(AppError::Forbidden);
                }
                Ok(AccessGrant {
                    role: AccessRole::Shared,
                })
            }
        }
    }
}
