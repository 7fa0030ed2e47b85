//! Per-request application context.
//!
//! `create_context` runs once per request, after routing, and the resulting
//! `AppContext` is handed to every RPC caller while the request is handled.
//! Nothing in it outlives the request.

pub mod authorization;
pub mod bloom;
pub mod builder_login;
pub mod cache;
pub mod handles;
pub mod plan;

pub use authorization::{create_authorization_context, AuthorizationContext};
pub use bloom::BloomFilter;
pub use builder_login::{BuilderLoginCheck, DashboardLogins};
pub use cache::RpcCache;
pub use handles::{DeploymentContext, DeploymentEnv, DomainContext, EntriContext};
pub use plan::{create_user_plan_context, PlanFeatures};

use crate::auth::AuthError;
use crate::request::RequestInfo;
use crate::services::StoreError;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Data that must exist given a valid precedent is missing
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
    /// Canvas requests never carry an authorization context
    #[error("authorization context is not available for canvas requests")]
    CanvasAuthorization,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub struct AppContext {
    pub authorization: AuthorizationContext,
    pub domain: DomainContext,
    pub deployment: DeploymentContext,
    pub entri: EntriContext,
    pub user_plan_features: Option<PlanFeatures>,
    pub rpc_cache: RpcCache,
}

/// Build the context for one request. Sub-contexts are resolved in order;
/// authorization comes first since the plan lookup depends on its owner.
pub async fn create_context(state: &AppState, request: &RequestInfo) -> Result<AppContext, ContextError> {
    let authorization = create_authorization_context(state, request).await?;

    let domain = DomainContext::new(state.domain.clone());

    let deployment = DeploymentContext::new(
        state.deployment.clone(),
        DeploymentEnv {
            builder_origin: request.builder_url.source_origin.clone(),
            github_ref: state.config.deployment.github_ref.clone(),
            github_sha: state.config.deployment.github_sha.clone(),
        },
    );

    let entri = EntriContext::new(state.entri.clone());

    let user_plan_features =
        create_user_plan_context(authorization.owner_id.as_deref(), state.plans.as_ref()).await?;

    tracing::debug!(
        "Created context: user={:?} owner={:?} service_call={}",
        authorization.user_id,
        authorization.owner_id,
        authorization.is_service_call
    );

    Ok(AppContext {
        authorization,
        domain,
        deployment,
        entri,
        user_plan_features,
        rpc_cache: RpcCache::new(),
    })
}
