use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DIRECT_REFERRER: &str = "direct";
pub const UNKNOWN_USER_AGENT: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub validity_minutes: i64,
}

impl Link {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Click {
    pub timestamp: DateTime<Utc>,
    pub referrer: String,
    pub user_agent: String,
    pub location: String,
}

/// Click history of one short code. Clicks are appended in arrival order.
#[derive(Debug, Clone, Default)]
pub struct LinkAnalytics {
    pub total_clicks: u64,
    pub clicks: Vec<Click>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpecification {
    pub url: Option<String>,
    /// Kept loose so a non-integer value is reported as an invalid validity
    /// instead of a body parse failure.
    pub validity: Option<Value>,
    pub shortcode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLink {
    #[serde(skip_serializing)]
    pub short_code: String,
    pub short_link: String,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub shortcode: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub validity: i64,
    pub expired: bool,
    pub total_clicks: u64,
    pub click_data: Vec<Click>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub shortcode: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub total_clicks: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub urls: Vec<LinkSummary>,
    pub total_urls: usize,
    pub total_clicks: u64,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime: i64,
}
