//! Collaborator ports used while handling a request.
//!
//! Each port has a production implementation (sqlx in `crate::database`,
//! reqwest in `postgrest` / `upstream`) and an in-memory one in `memory`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::PlanFeatures;
use crate::database::models::{AuthorizationToken, DashboardProject, User};
use crate::database::DatabaseError;

pub mod memory;
pub mod postgrest;
pub mod upstream;

pub use postgrest::PostgrestPlanClient;
pub use upstream::{HttpDeploymentClient, HttpDomainClient, HttpEntriClient};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{service} responded with status {status}")]
    Upstream { service: &'static str, status: u16 },
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Non-deleted projects of a user, newest first
    async fn find_by_owner(&self, user_id: &str) -> Result<Vec<DashboardProject>, StoreError>;

    async fn find_by_ids(&self, project_ids: &[String]) -> Result<Vec<DashboardProject>, StoreError>;
}

#[async_trait]
pub trait AuthorizationTokenStore: Send + Sync {
    async fn find_unique(&self, token: &str) -> Result<Option<AuthorizationToken>, StoreError>;
}

/// Builder projects a dashboard session has logged into
#[async_trait]
pub trait BuilderLoginStore: Send + Sync {
    async fn logged_in_projects(
        &self,
        user_id: &str,
        session_created_at: DateTime<Utc>,
    ) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
pub trait PlanFeaturesSource: Send + Sync {
    async fn plan_features(&self, user_id: &str) -> Result<PlanFeatures, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStatus {
    pub domain: String,
    pub status: String,
    pub error: Option<String>,
}

#[async_trait]
pub trait DomainClient: Send + Sync {
    async fn verify(&self, project_id: &str, domain: &str) -> Result<DomainStatus, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub build_id: String,
    pub builder_origin: String,
    pub github_ref: Option<String>,
    pub github_sha: Option<String>,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub success: bool,
    pub error: Option<String>,
}

#[async_trait]
pub trait DeploymentClient: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntriToken {
    pub token: String,
    pub application_id: String,
}

#[async_trait]
pub trait EntriClient: Send + Sync {
    async fn entri_token(&self) -> Result<EntriToken, StoreError>;
}
