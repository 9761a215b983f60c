//! Static plan catalog shown on the billing page.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Marker for plans without a download cap.
pub const UNLIMITED: i32 = -1;

#[derive(ToSchema, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Price in cents.
    pub price: u32,
    pub interval: BillingInterval,
    pub features: Vec<String>,
    /// `-1` means unlimited.
    pub download_limit: i32,
}

#[derive(ToSchema, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    None,
    Once,
    Month,
}

impl Plan {
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.download_limit == UNLIMITED
    }

    /// Downloads left after `used`; `None` when the plan is unlimited.
    #[must_use]
    pub fn remaining_downloads(&self, used: u32) -> Option<u32> {
        if self.is_unlimited() {
            return None;
        }
        let limit = u32::try_from(self.download_limit).unwrap_or(0);
        Some(limit.saturating_sub(used))
    }
}

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[must_use]
pub fn catalog() -> Vec<Plan> {
    vec![
        Plan {
            id: "free".to_string(),
            name: "Free".to_string(),
            price: 0,
            interval: BillingInterval::None,
            features: features(&["ATS score preview", "One resume draft"]),
            download_limit: 0,
        },
        Plan {
            id: "one-time".to_string(),
            name: "Single Resume".to_string(),
            price: 999,
            interval: BillingInterval::Once,
            features: features(&[
                "AI resume enhancement",
                "PDF and DOCX export",
                "4 downloads",
            ]),
            download_limit: 4,
        },
        Plan {
            id: "premium".to_string(),
            name: "Premium".to_string(),
            price: 1999,
            interval: BillingInterval::Month,
            features: features(&[
                "Unlimited AI enhancements",
                "Cover letter generation",
                "Unlimited downloads",
            ]),
            download_limit: UNLIMITED,
        },
    ]
}

/// Look up a plan by id.
#[must_use]
pub fn find(id: &str) -> Option<Plan> {
    catalog().into_iter().find(|plan| plan.id == id)
}
