use sqlx::FromRow;

/// Project access token; `project_owner_id` comes from a join on the project
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AuthorizationToken {
    pub token: String,
    pub project_id: String,
    pub project_owner_id: Option<String>,
}
