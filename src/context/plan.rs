use serde::{Deserialize, Serialize};

use crate::services::{PlanFeaturesSource, StoreError};

/// Entitlements of a user's plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    pub has_subscription: bool,
    pub has_pro_plan: bool,
    pub allow_share_admin_links: bool,
    pub allow_dynamic_data: bool,
    pub allow_contact_email: bool,
    pub max_domains_allowed_per_user: u32,
    pub max_publishes_allowed_per_user: u32,
}

/// Feature overrides a product may carry in its metadata
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFeatures {
    pub allow_share_admin_links: Option<bool>,
    pub allow_dynamic_data: Option<bool>,
    pub allow_contact_email: Option<bool>,
    pub max_domains_allowed_per_user: Option<u32>,
    pub max_publishes_allowed_per_user: Option<u32>,
}

impl Default for PlanFeatures {
    fn default() -> Self {
        Self::free()
    }
}

impl PlanFeatures {
    pub fn free() -> Self {
        Self {
            has_subscription: false,
            has_pro_plan: false,
            allow_share_admin_links: false,
            allow_dynamic_data: false,
            allow_contact_email: false,
            max_domains_allowed_per_user: 5,
            max_publishes_allowed_per_user: 10,
        }
    }

    /// Fold purchased products into the plan. The most permissive value wins.
    pub fn with_product(mut self, product: &ProductFeatures, subscribed: bool) -> Self {
        self.has_pro_plan = true;
        self.has_subscription |= subscribed;
        self.allow_share_admin_links |= product.allow_share_admin_links.unwrap_or(false);
        self.allow_dynamic_data |= product.allow_dynamic_data.unwrap_or(false);
        self.allow_contact_email |= product.allow_contact_email.unwrap_or(false);
        if let Some(max) = product.max_domains_allowed_per_user {
            self.max_domains_allowed_per_user = self.max_domains_allowed_per_user.max(max);
        }
        if let Some(max) = product.max_publishes_allowed_per_user {
            self.max_publishes_allowed_per_user = self.max_publishes_allowed_per_user.max(max);
        }
        self
    }
}

/// Plan of the resolved owner, if any
pub async fn create_user_plan_context(
    owner_id: Option<&str>,
    source: &dyn PlanFeaturesSource,
) -> Result<Option<PlanFeatures>, StoreError> {
    match owner_id {
        Some(owner_id) => Ok(Some(source.plan_features(owner_id).await?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products_merge_permissively() {
        let pro = ProductFeatures {
            allow_dynamic_data: Some(true),
            max_domains_allowed_per_user: Some(50),
            ..Default::default()
        };
        let addon = ProductFeatures {
            allow_contact_email: Some(true),
            max_domains_allowed_per_user: Some(2),
            ..Default::default()
        };

        let plan = PlanFeatures::free().with_product(&pro, true).with_product(&addon, false);
        assert!(plan.has_pro_plan);
        assert!(plan.has_subscription);
        assert!(plan.allow_dynamic_data);
        assert!(plan.allow_contact_email);
        assert!(!plan.allow_share_admin_links);
        assert_eq!(plan.max_domains_allowed_per_user, 50);
    }

    #[test]
    fn serializes_in_camel_case() {
        let value = serde_json::to_value(PlanFeatures::free()).unwrap();
        assert_eq!(value["maxDomainsAllowedPerUser"], 5);
        assert_eq!(value["hasProPlan"], false);
    }
}
