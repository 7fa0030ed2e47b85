use std::sync::Arc;

use crate::services::{
    DeploymentClient, DomainClient, DomainStatus, EntriClient, EntriToken, PublishRequest,
    PublishResponse, StoreError,
};

#[derive(Clone)]
pub struct DomainContext {
    pub client: Arc<dyn DomainClient>,
}

impl DomainContext {
    pub fn new(client: Arc<dyn DomainClient>) -> Self {
        Self { client }
    }

    pub async fn verify(&self, project_id: &str, domain: &str) -> Result<DomainStatus, StoreError> {
        self.client.verify(project_id, domain).await
    }
}

/// Build metadata forwarded to the publishing service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentEnv {
    pub builder_origin: String,
    pub github_ref: Option<String>,
    pub github_sha: Option<String>,
}

#[derive(Clone)]
pub struct DeploymentContext {
    pub client: Arc<dyn DeploymentClient>,
    pub env: DeploymentEnv,
}

impl DeploymentContext {
    pub fn new(client: Arc<dyn DeploymentClient>, env: DeploymentEnv) -> Self {
        Self { client, env }
    }

    pub async fn publish(&self, build_id: &str, destination: &str) -> Result<PublishResponse, StoreError> {
        let request = PublishRequest {
            build_id: build_id.to_string(),
            builder_origin: self.env.builder_origin.clone(),
            github_ref: self.env.github_ref.clone(),
            github_sha: self.env.github_sha.clone(),
            destination: destination.to_string(),
        };
        self.client.publish(&request).await
    }
}

#[derive(Clone)]
pub struct EntriContext {
    pub client: Arc<dyn EntriClient>,
}

impl EntriContext {
    pub fn new(client: Arc<dyn EntriClient>) -> Self {
        Self { client }
    }

    pub async fn entri_token(&self) -> Result<EntriToken, StoreError> {
        self.client.entri_token().await
    }
}

macro_rules! opaque_debug {
    ($($ty:ident),*) => {
        $(impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(stringify!($ty))
            }
        })*
    };
}

opaque_debug!(DomainContext, EntriContext);

impl std::fmt::Debug for DeploymentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentContext").field("env", &self.env).finish()
    }
}
