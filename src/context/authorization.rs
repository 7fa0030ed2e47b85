use chrono::{DateTime, Utc};

use super::builder_login::{BuilderLoginCheck, DashboardLogins};
use super::ContextError;
use crate::auth;
use crate::request::{RequestInfo, RequestSurface};
use crate::services::StoreError;
use crate::state::AppState;

/// Identity and capabilities of the caller, passed to every RPC
#[derive(Debug)]
pub struct AuthorizationContext {
    /// Session identity; never replaced by token delegation
    pub user_id: Option<String>,
    pub session_created_at: Option<DateTime<Utc>>,
    pub auth_token: Option<String>,
    pub is_service_call: bool,
    /// Owner acted on behalf of: the token's project owner, else the session user
    pub owner_id: Option<String>,
    /// `None` means the capability cannot be verified for this request
    pub builder_login: Option<BuilderLoginCheck>,
}

impl AuthorizationContext {
    /// Denies when the request has no way to verify builder logins
    pub async fn is_logged_in_to_builder(&self, project_id: &str) -> Result<bool, StoreError> {
        match &self.builder_login {
            Some(check) => check.is_logged_in_to_builder(project_id).await,
            None => Ok(false),
        }
    }
}

pub async fn create_authorization_context(
    state: &AppState,
    request: &RequestInfo,
) -> Result<AuthorizationContext, ContextError> {
    let (authenticator, builder_project) = match &request.surface {
        RequestSurface::Canvas { .. } => return Err(ContextError::CanvasAuthorization),
        RequestSurface::Builder { project_id } => (&state.builder_auth, Some(project_id)),
        RequestSurface::Dashboard => (&state.dashboard_auth, None),
    };

    let auth_token = request.auth_token();
    let session = authenticator.is_authenticated(&request.headers).await?;
    let is_service_call = auth::is_service_call(&request.headers, &state.config.security.service_secret);

    let mut owner_id = session.as_ref().map(|s| s.user_id.clone());

    if let Some(token) = &auth_token {
        let record = state.tokens.find_unique(token).await?.ok_or_else(|| {
            ContextError::IntegrityViolation("authorization token does not resolve to a project".to_string())
        })?;

        let project_owner = record.project_owner_id.ok_or_else(|| {
            ContextError::IntegrityViolation(format!(
                "project {} of authorization token has no owner",
                record.project_id
            ))
        })?;

        tracing::debug!("Authorization token delegates project {} of {}", record.project_id, project_owner);
        owner_id = Some(project_owner);
    }

    let builder_login = match (&session, builder_project) {
        (Some(session), None) => Some(BuilderLoginCheck::Dashboard(DashboardLogins::new(
            session.user_id.clone(),
            session.created_at,
            state.builder_logins.clone(),
            state.config.security.bloom_false_positive_rate,
        ))),
        (Some(_), Some(project_id)) => Some(BuilderLoginCheck::Builder {
            project_id: project_id.clone(),
        }),
        (None, _) => None,
    };

    Ok(AuthorizationContext {
        user_id: session.as_ref().map(|s| s.user_id.clone()),
        session_created_at: session.as_ref().map(|s| s.created_at),
        auth_token,
        is_service_call,
        owner_id,
        builder_login,
    })
}
