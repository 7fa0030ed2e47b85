use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::models::{AuthorizationToken, DashboardProject, User};
use crate::services::{
    AuthorizationTokenStore, BuilderLoginStore, ProjectStore, StoreError, UserStore,
};

const PROJECT_COLUMNS: &str = r#"
    id, title, domain,
    "userId" AS user_id,
    "isPublished" AS is_published,
    "createdAt" AS created_at,
    "previewImageAssetId" AS preview_image_asset_id
"#;

/// Postgres-backed implementation of the storage ports
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email, username, image, "createdAt" AS created_at
               FROM "User"
               WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn find_by_owner(&self, user_id: &str) -> Result<Vec<DashboardProject>, StoreError> {
        let query = format!(
            r#"SELECT {PROJECT_COLUMNS}
               FROM "DashboardProject"
               WHERE "userId" = $1 AND "isDeleted" = false
               ORDER BY "createdAt" DESC"#
        );

        let projects = sqlx::query_as::<_, DashboardProject>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn find_by_ids(&self, project_ids: &[String]) -> Result<Vec<DashboardProject>, StoreError> {
        if project_ids.is_empty() {
            return Ok(vec![]);
        }

        let query = format!(
            r#"SELECT {PROJECT_COLUMNS}
               FROM "DashboardProject"
               WHERE id = ANY($1) AND "isDeleted" = false"#
        );

        let projects = sqlx::query_as::<_, DashboardProject>(&query)
            .bind(project_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }
}

#[async_trait]
impl AuthorizationTokenStore for PgStore {
    async fn find_unique(&self, token: &str) -> Result<Option<AuthorizationToken>, StoreError> {
        // LEFT JOIN keeps tokens whose project vanished so the caller can flag them
        let row = sqlx::query_as::<_, AuthorizationToken>(
            r#"SELECT t.token, t."projectId" AS project_id, p."userId" AS project_owner_id
               FROM "AuthorizationToken" t
               LEFT JOIN "Project" p ON p.id = t."projectId"
               WHERE t.token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl BuilderLoginStore for PgStore {
    async fn logged_in_projects(
        &self,
        user_id: &str,
        session_created_at: DateTime<Utc>,
    ) -> Result<Vec<String>, StoreError> {
        let project_ids = sqlx::query_scalar::<_, String>(
            r#"SELECT DISTINCT "projectId"
               FROM "BuilderLogin"
               WHERE "userId" = $1 AND "createdAt" >= $2"#,
        )
        .bind(user_id)
        .bind(session_created_at)
        .fetch_all(&self.pool)
        .await?;

        Ok(project_ids)
    }
}
