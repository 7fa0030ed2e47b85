use std::sync::Arc;

use super::RpcError;
use crate::context::AppContext;
use crate::database::models::DashboardProject;
use crate::services::ProjectStore;

pub const FIND_MANY_BY_IDS_PATH: &str = "dashboardProject.findManyByIds";
const TEMPLATES_MAX_AGE_SECS: u32 = 60;

#[derive(Clone)]
pub struct DashboardProjectRouter {
    projects: Arc<dyn ProjectStore>,
}

pub struct DashboardProjectCaller<'a> {
    projects: &'a dyn ProjectStore,
    ctx: &'a AppContext,
}

impl DashboardProjectRouter {
    pub fn new(projects: Arc<dyn ProjectStore>) -> Self {
        Self { projects }
    }

    pub fn caller<'a>(&'a self, ctx: &'a AppContext) -> DashboardProjectCaller<'a> {
        DashboardProjectCaller {
            projects: self.projects.as_ref(),
            ctx,
        }
    }
}

impl DashboardProjectCaller<'_> {
    /// Projects owned by `user_id`; only that user or a service call may list them
    pub async fn find_many(&self, user_id: &str) -> Result<Vec<DashboardProject>, RpcError> {
        let auth = &self.ctx.authorization;
        let allowed = auth.is_service_call || auth.user_id.as_deref() == Some(user_id);
        if !allowed {
            tracing::warn!("Refusing project listing of {} for {:?}", user_id, auth.user_id);
            return Err(RpcError::Forbidden("Not allowed to list these projects".to_string()));
        }

        Ok(self.projects.find_by_owner(user_id).await?)
    }

    /// Template projects, returned in the order of `project_ids`
    pub async fn find_many_by_ids(&self, project_ids: &[String]) -> Result<Vec<DashboardProject>, RpcError> {
        let mut projects = self.projects.find_by_ids(project_ids).await?;
        projects.sort_by_key(|project| {
            project_ids
                .iter()
                .position(|id| *id == project.id)
                .unwrap_or(usize::MAX)
        });

        self.ctx
            .rpc_cache
            .set_max_age(FIND_MANY_BY_IDS_PATH, TEMPLATES_MAX_AGE_SECS);
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use url::Url;

    use crate::config::AppConfig;
    use crate::context::create_context;
    use crate::request::RequestInfo;
    use crate::services::memory::MemoryStore;
    use crate::state::AppState;

    fn project(id: &str, owner: &str, age_days: i64) -> DashboardProject {
        DashboardProject {
            id: id.to_string(),
            title: format!("Project {id}"),
            domain: id.to_string(),
            user_id: Some(owner.to_string()),
            is_published: false,
            created_at: Utc::now() - Duration::days(age_days),
            preview_image_asset_id: None,
        }
    }

    async fn anonymous_context(store: Arc<MemoryStore>) -> (AppState, AppContext) {
        let state = AppState::in_memory(AppConfig::development(), store);
        let request = RequestInfo::new(
            Url::parse("https://studio.example.com/dashboard").unwrap(),
            Default::default(),
        );
        let ctx = create_context(&state, &request).await.unwrap();
        (state, ctx)
    }

    #[tokio::test]
    async fn find_many_requires_matching_session() {
        let store = Arc::new(MemoryStore::new());
        store.insert_project(project("a", "user-1", 1)).await;
        let (state, ctx) = anonymous_context(store).await;

        let router = DashboardProjectRouter::new(state.projects.clone());
        let result = router.caller(&ctx).find_many("user-1").await;
        assert!(matches!(result, Err(RpcError::Forbidden(_))));
    }

    #[tokio::test]
    async fn service_calls_may_list_any_user() {
        let store = Arc::new(MemoryStore::new());
        store.insert_project(project("old", "user-1", 5)).await;
        store.insert_project(project("new", "user-1", 1)).await;
        store.insert_project(project("other", "user-2", 1)).await;
        let (state, mut ctx) = anonymous_context(store).await;
        ctx.authorization.is_service_call = true;

        let router = DashboardProjectRouter::new(state.projects.clone());
        let projects = router.caller(&ctx).find_many("user-1").await.unwrap();
        let ids: Vec<_> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
    }

    #[tokio::test]
    async fn templates_follow_requested_order_and_set_max_age() {
        let store = Arc::new(MemoryStore::new());
        for id in ["t1", "t2", "t3"] {
            store.insert_project(project(id, "templates", 1)).await;
        }
        let (state, ctx) = anonymous_context(store).await;

        let router = DashboardProjectRouter::new(state.projects.clone());
        let wanted = vec!["t3".to_string(), "missing".to_string(), "t1".to_string()];
        let projects = router.caller(&ctx).find_many_by_ids(&wanted).await.unwrap();

        let ids: Vec<_> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["t3", "t1"]);
        assert_eq!(ctx.rpc_cache.get_max_age(FIND_MANY_BY_IDS_PATH), Some(60));
    }
}
