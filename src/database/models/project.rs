use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardProject {
    pub id: String,
    pub title: String,
    pub domain: String,
    pub user_id: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub preview_image_asset_id: Option<String>,
}
