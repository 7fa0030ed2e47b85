use async_trait::async_trait;
use serde::Deserialize;

use crate::config::PostgrestConfig;
use crate::context::plan::{PlanFeatures, ProductFeatures};

use super::{PlanFeaturesSource, StoreError};

/// Plan lookup against the PostgREST view of `UserProduct`
#[derive(Debug, Clone)]
pub struct PostgrestPlanClient {
    http: reqwest::Client,
    config: PostgrestConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserProductRow {
    subscription_id: Option<String>,
    product: Option<ProductRow>,
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    #[serde(default)]
    meta: serde_json::Value,
}

impl PostgrestPlanClient {
    pub fn new(http: reqwest::Client, config: PostgrestConfig) -> Self {
        Self { http, config }
    }

    fn user_products_url(&self) -> String {
        format!("{}/UserProduct", self.config.url.trim_end_matches('/'))
    }
}

/// Fold a user's products into plan features; unknown meta keys are ignored
fn plan_from_rows(rows: &[UserProductRow]) -> Result<PlanFeatures, StoreError> {
    rows.iter().try_fold(PlanFeatures::free(), |plan, row| {
        let Some(product) = &row.product else {
            return Ok(plan);
        };
        let features: ProductFeatures = if product.meta.is_null() {
            ProductFeatures::default()
        } else {
            serde_json::from_value(product.meta.clone())
                .map_err(|e| StoreError::Decode(format!("product meta: {e}")))?
        };
        Ok(plan.with_product(&features, row.subscription_id.is_some()))
    })
}

#[async_trait]
impl PlanFeaturesSource for PostgrestPlanClient {
    async fn plan_features(&self, user_id: &str) -> Result<PlanFeatures, StoreError> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .http
            .get(self.user_products_url())
            .query(&[
                ("select", "subscriptionId,product:Product(meta)"),
                ("userId", user_filter.as_str()),
            ])
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Upstream {
                service: "postgrest",
                status: response.status().as_u16(),
            });
        }

        let rows: Vec<UserProductRow> = response.json().await?;
        tracing::debug!("Resolved {} products for user {}", rows.len(), user_id);
        plan_from_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<UserProductRow> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn no_products_is_free_plan() {
        assert_eq!(plan_from_rows(&[]).unwrap(), PlanFeatures::free());
    }

    #[test]
    fn folds_product_meta() {
        let rows = rows(json!([
            { "subscriptionId": "sub_1", "product": { "meta": { "allowDynamicData": true, "maxPublishesAllowedPerUser": 100 } } },
            { "subscriptionId": null, "product": { "meta": null } },
            { "subscriptionId": null, "product": null }
        ]));

        let plan = plan_from_rows(&rows).unwrap();
        assert!(plan.has_subscription);
        assert!(plan.allow_dynamic_data);
        assert_eq!(plan.max_publishes_allowed_per_user, 100);
    }

    #[test]
    fn malformed_meta_is_a_decode_error() {
        let rows = rows(json!([
            { "subscriptionId": null, "product": { "meta": { "allowDynamicData": "yes" } } }
        ]));
        assert!(matches!(plan_from_rows(&rows), Err(StoreError::Decode(_))));
    }
}
