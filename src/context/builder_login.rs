use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use super::bloom::BloomFilter;
use crate::services::{BuilderLoginStore, StoreError};

/// How a request answers "is this session logged into the builder of
/// project X". Chosen once per request from its surface.
pub enum BuilderLoginCheck {
    /// Dashboard session: membership in the session's recorded builder
    /// logins, loaded on first query. May report false positives.
    Dashboard(DashboardLogins),
    /// Builder session: exact match with the project in the request URL
    Builder { project_id: String },
}

pub struct DashboardLogins {
    user_id: String,
    session_created_at: DateTime<Utc>,
    store: Arc<dyn BuilderLoginStore>,
    false_positive_rate: f64,
    filter: OnceCell<BloomFilter>,
}

impl DashboardLogins {
    pub fn new(
        user_id: impl Into<String>,
        session_created_at: DateTime<Utc>,
        store: Arc<dyn BuilderLoginStore>,
        false_positive_rate: f64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_created_at,
            store,
            false_positive_rate,
            filter: OnceCell::new(),
        }
    }

    async fn filter(&self) -> Result<&BloomFilter, StoreError> {
        self.filter
            .get_or_try_init(|| async {
                let projects = self
                    .store
                    .logged_in_projects(&self.user_id, self.session_created_at)
                    .await?;
                tracing::debug!(
                    "Built builder-login filter for user {} over {} projects",
                    self.user_id,
                    projects.len()
                );
                Ok::<_, StoreError>(BloomFilter::from_items(projects, self.false_positive_rate))
            })
            .await
    }
}

impl BuilderLoginCheck {
    pub async fn is_logged_in_to_builder(&self, project_id: &str) -> Result<bool, StoreError> {
        match self {
            BuilderLoginCheck::Dashboard(logins) => Ok(logins.filter().await?.has(project_id)),
            BuilderLoginCheck::Builder { project_id: current } => Ok(current == project_id),
        }
    }
}

impl std::fmt::Debug for BuilderLoginCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderLoginCheck::Dashboard(logins) => f
                .debug_struct("Dashboard")
                .field("user_id", &logins.user_id)
                .field("loaded", &logins.filter.initialized())
                .finish(),
            BuilderLoginCheck::Builder { project_id } => {
                f.debug_struct("Builder").field("project_id", project_id).finish()
            }
        }
    }
}
