use std::sync::Arc;

use crate::auth::{Authenticator, CookieAuthenticator};
use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, PgStore};
use crate::services::memory::{MemoryStore, MemoryUpstream};
use crate::services::{
    AuthorizationTokenStore, BuilderLoginStore, DeploymentClient, DomainClient, EntriClient,
    HttpDeploymentClient, HttpDomainClient, HttpEntriClient, PlanFeaturesSource,
    PostgrestPlanClient, ProjectStore, UserStore,
};

/// Shared handles, cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dashboard_auth: Arc<dyn Authenticator>,
    pub builder_auth: Arc<dyn Authenticator>,
    pub users: Arc<dyn UserStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub tokens: Arc<dyn AuthorizationTokenStore>,
    pub builder_logins: Arc<dyn BuilderLoginStore>,
    pub plans: Arc<dyn PlanFeaturesSource>,
    pub domain: Arc<dyn DomainClient>,
    pub deployment: Arc<dyn DeploymentClient>,
    pub entri: Arc<dyn EntriClient>,
    /// Absent when running on in-memory stores
    pub database: Option<DatabaseManager>,
}

const MAX_CONNECTIONS: u32 = 10;

impl AppState {
    /// Production wiring: Postgres stores and HTTP upstreams
    pub fn connect(config: AppConfig) -> Result<Self, DatabaseError> {
        let database = DatabaseManager::from_env(MAX_CONNECTIONS)?;
        let store = Arc::new(PgStore::new(database.pool()));
        let http = reqwest::Client::new();
        let secret = config.security.service_secret.clone();

        Ok(Self {
            dashboard_auth: Arc::new(dashboard_authenticator(&config)),
            builder_auth: Arc::new(builder_authenticator(&config)),
            users: store.clone(),
            projects: store.clone(),
            tokens: store.clone(),
            builder_logins: store,
            plans: Arc::new(PostgrestPlanClient::new(http.clone(), config.postgrest.clone())),
            domain: Arc::new(HttpDomainClient::new(
                http.clone(),
                config.deployment.domain_api_url.clone(),
                secret.clone(),
            )),
            deployment: Arc::new(HttpDeploymentClient::new(
                http.clone(),
                config.deployment.deployment_api_url.clone(),
                secret,
            )),
            entri: Arc::new(HttpEntriClient::new(http, config.entri.clone())),
            database: Some(database),
            config: Arc::new(config),
        })
    }

    /// Wiring over a single in-memory store
    pub fn in_memory(config: AppConfig, store: Arc<MemoryStore>) -> Self {
        let upstream = Arc::new(MemoryUpstream);

        Self {
            dashboard_auth: Arc::new(dashboard_authenticator(&config)),
            builder_auth: Arc::new(builder_authenticator(&config)),
            users: store.clone(),
            projects: store.clone(),
            tokens: store.clone(),
            builder_logins: store.clone(),
            plans: store,
            domain: upstream.clone(),
            deployment: upstream.clone(),
            entri: upstream,
            database: None,
            config: Arc::new(config),
        }
    }
}

fn dashboard_authenticator(config: &AppConfig) -> CookieAuthenticator {
    CookieAuthenticator::new(&config.security.session_cookie, &config.security.auth_secret)
}

fn builder_authenticator(config: &AppConfig) -> CookieAuthenticator {
    CookieAuthenticator::new(&config.security.builder_session_cookie, &config.security.auth_secret)
}
