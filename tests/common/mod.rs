#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use studio_dashboard::auth::{CookieAuthenticator, SessionClaims};
use studio_dashboard::config::AppConfig;
use studio_dashboard::context::PlanFeatures;
use studio_dashboard::database::models::{DashboardProject, User};
use studio_dashboard::services::memory::MemoryStore;
use studio_dashboard::{app, AppState};

pub const HOST: &str = "studio.example.com";
pub const USER_ID: &str = "user-1";
pub const TEMPLATE_ID: &str = "template-1";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.auth_secret = "integration-secret".to_string();
    config.dashboard.project_templates = vec![TEMPLATE_ID.to_string()];
    config.dashboard.publisher_host = "publisher.example.com".to_string();
    config.dashboard.image_base_url = "/cgi/image/".to_string();
    config
}

pub fn project(id: &str, owner: &str) -> DashboardProject {
    DashboardProject {
        id: id.to_string(),
        title: format!("Project {id}"),
        domain: id.to_string(),
        user_id: Some(owner.to_string()),
        is_published: true,
        created_at: Utc::now() - Duration::hours(1),
        preview_image_asset_id: None,
    }
}

/// App over an in-memory store seeded with one user, one project and one template
pub async fn spawn_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());

    store
        .insert_user(User {
            id: USER_ID.to_string(),
            email: Some("user@example.com".to_string()),
            username: Some("user".to_string()),
            image: None,
            created_at: Utc::now(),
        })
        .await;
    store.insert_project(project("project-1", USER_ID)).await;
    store.insert_project(project(TEMPLATE_ID, "templates")).await;
    store.set_plan(USER_ID, PlanFeatures::free()).await;

    let state = AppState::in_memory(config.clone(), store.clone());
    TestApp {
        router: app(state),
        store,
        config,
    }
}

impl TestApp {
    pub fn session_cookie(&self, user_id: &str) -> String {
        let auth = CookieAuthenticator::new(
            self.config.security.session_cookie.clone(),
            self.config.security.auth_secret.clone(),
        );
        let token = auth
            .issue(&SessionClaims::new(user_id, Utc::now(), 1))
            .expect("issue session token");
        format!("{}={}", auth.cookie_name(), token)
    }

    pub async fn get(&self, host: &str, uri: &str, headers: &[(&str, String)]) -> Result<(StatusCode, HeaderMap, Value)> {
        let mut request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::HOST, host);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = self.router.clone().oneshot(request.body(Body::empty())?).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, headers, body))
    }
}
