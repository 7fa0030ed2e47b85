// handlers/dashboard.rs - GET /dashboard loader

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::context::{create_context, ContextError, PlanFeatures};
use crate::database::models::{DashboardProject, User};
use crate::error::ApiError;
use crate::middleware::{allowed_destinations, prevent_cross_origin_cookie, DASHBOARD_DESTINATIONS};
use crate::request::{login_path, RequestInfo};
use crate::rpc::DashboardProjectRouter;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub user: User,
    pub projects: Vec<DashboardProject>,
    pub project_templates: Vec<DashboardProject>,
    pub user_plan_features: PlanFeatures,
    pub publisher_host: String,
    pub image_base_url: String,
    /// Dashboard origin, used client-side to build per-project builder links
    pub origin: String,
}

/// GET /dashboard - projects, templates and plan of the signed-in user
///
/// Responses:
/// - 404 when the request does not target the dashboard surface
/// - 302 to the login page (with `returnTo`) when nobody is signed in
/// - 200 with a `DashboardPayload` and `Cache-Control: no-store`
/// - 5xx when an origin policy or integrity check fails
pub async fn dashboard_get(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let (parts, _body) = request.into_parts();
    let request = RequestInfo::from_parts(&parts, &state.config.server).map_err(|e| {
        tracing::warn!("Unparseable request URL: {}", e);
        ApiError::not_found("Not found")
    })?;

    if !request.is_dashboard() {
        return Err(ApiError::not_found("Not found"));
    }

    prevent_cross_origin_cookie(&request.headers)?;
    allowed_destinations(&request.headers, DASHBOARD_DESTINATIONS)?;

    let user = match find_authenticated_user(&state, &request).await? {
        Some(user) => user,
        None => {
            let location = login_path(&state.config.dashboard.login_path, request.url.path());
            return Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response());
        }
    };

    let ctx = create_context(&state, &request).await?;

    let router = DashboardProjectRouter::new(state.projects.clone());
    let caller = router.caller(&ctx);
    let projects = caller.find_many(&user.id).await?;
    let project_templates = caller
        .find_many_by_ids(&state.config.dashboard.project_templates)
        .await?;

    let user_plan_features = ctx.user_plan_features.clone().ok_or_else(|| {
        ContextError::IntegrityViolation(format!("plan features missing for signed-in user {}", user.id))
    })?;

    tracing::debug!(
        "Dashboard for {}: {} projects, {} templates",
        user.id,
        projects.len(),
        project_templates.len()
    );

    let payload = DashboardPayload {
        user,
        projects,
        project_templates,
        user_plan_features,
        publisher_host: state.config.dashboard.publisher_host.clone(),
        image_base_url: state.config.dashboard.image_base_url.clone(),
        origin: request.builder_url.source_origin.clone(),
    };

    Ok(([(header::CACHE_CONTROL, "no-store")], Json(payload)).into_response())
}

/// Session user, if the session points at an existing account
async fn find_authenticated_user(state: &AppState, request: &RequestInfo) -> Result<Option<User>, ApiError> {
    let session = match state.dashboard_auth.is_authenticated(&request.headers).await? {
        Some(session) => session,
        None => return Ok(None),
    };

    let user = state.users.find_by_id(&session.user_id).await?;
    if user.is_none() {
        tracing::warn!("Session references unknown user {}", session.user_id);
    }
    Ok(user)
}
