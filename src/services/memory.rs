//! In-memory implementations of the service ports, for tests and local runs
//! without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::context::PlanFeatures;
use crate::database::models::{AuthorizationToken, DashboardProject, User};

use super::{
    AuthorizationTokenStore, BuilderLoginStore, DeploymentClient, DomainClient, DomainStatus,
    EntriClient, EntriToken, PlanFeaturesSource, ProjectStore, PublishRequest, PublishResponse,
    StoreError, UserStore,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    projects: RwLock<Vec<DashboardProject>>,
    tokens: RwLock<HashMap<String, AuthorizationToken>>,
    /// user id -> (project id, login time)
    builder_logins: RwLock<HashMap<String, Vec<(String, DateTime<Utc>)>>>,
    plans: RwLock<HashMap<String, PlanFeatures>>,
    project_queries: AtomicUsize,
    login_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn insert_project(&self, project: DashboardProject) {
        self.projects.write().await.push(project);
    }

    pub async fn insert_token(&self, token: AuthorizationToken) {
        self.tokens.write().await.insert(token.token.clone(), token);
    }

    pub async fn record_builder_login(&self, user_id: &str, project_id: &str) {
        self.record_builder_login_at(user_id, project_id, Utc::now()).await;
    }

    pub async fn record_builder_login_at(&self, user_id: &str, project_id: &str, at: DateTime<Utc>) {
        self.builder_logins
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push((project_id.to_string(), at));
    }

    pub async fn set_plan(&self, user_id: &str, plan: PlanFeatures) {
        self.plans.write().await.insert(user_id.to_string(), plan);
    }

    /// Number of project lookups served so far
    pub fn project_queries(&self) -> usize {
        self.project_queries.load(Ordering::SeqCst)
    }

    /// Number of builder-login lookups served so far
    pub fn login_queries(&self) -> usize {
        self.login_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn find_by_owner(&self, user_id: &str) -> Result<Vec<DashboardProject>, StoreError> {
        self.project_queries.fetch_add(1, Ordering::SeqCst);
        let mut projects: Vec<_> = self
            .projects
            .read()
            .await
            .iter()
            .filter(|p| p.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn find_by_ids(&self, project_ids: &[String]) -> Result<Vec<DashboardProject>, StoreError> {
        self.project_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .projects
            .read()
            .await
            .iter()
            .filter(|p| project_ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuthorizationTokenStore for MemoryStore {
    async fn find_unique(&self, token: &str) -> Result<Option<AuthorizationToken>, StoreError> {
        Ok(self.tokens.read().await.get(token).cloned())
    }
}

#[async_trait]
impl BuilderLoginStore for MemoryStore {
    async fn logged_in_projects(
        &self,
        user_id: &str,
        session_created_at: DateTime<Utc>,
    ) -> Result<Vec<String>, StoreError> {
        self.login_queries.fetch_add(1, Ordering::SeqCst);
        let logins = self.builder_logins.read().await;
        let mut project_ids: Vec<String> = logins
            .get(user_id)
            .into_iter()
            .flatten()
            .filter(|(_, at)| *at >= session_created_at)
            .map(|(project_id, _)| project_id.clone())
            .collect();
        project_ids.sort();
        project_ids.dedup();
        Ok(project_ids)
    }
}

#[async_trait]
impl PlanFeaturesSource for MemoryStore {
    async fn plan_features(&self, user_id: &str) -> Result<PlanFeatures, StoreError> {
        Ok(self.plans.read().await.get(user_id).cloned().unwrap_or_default())
    }
}

/// Upstream services that accept everything
#[derive(Debug, Clone, Default)]
pub struct MemoryUpstream;

#[async_trait]
impl DomainClient for MemoryUpstream {
    async fn verify(&self, _project_id: &str, domain: &str) -> Result<DomainStatus, StoreError> {
        Ok(DomainStatus {
            domain: domain.to_string(),
            status: "ACTIVE".to_string(),
            error: None,
        })
    }
}

#[async_trait]
impl DeploymentClient for MemoryUpstream {
    async fn publish(&self, _request: &PublishRequest) -> Result<PublishResponse, StoreError> {
        Ok(PublishResponse {
            success: true,
            error: None,
        })
    }
}

#[async_trait]
impl EntriClient for MemoryUpstream {
    async fn entri_token(&self) -> Result<EntriToken, StoreError> {
        Ok(EntriToken {
            token: "local-entri-token".to_string(),
            application_id: "local".to_string(),
        })
    }
}
