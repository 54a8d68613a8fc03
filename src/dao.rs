use crate::error::ShortenerError;
use crate::model::{
    AnalyticsReport, Click, CreatedLink, Link, LinkAnalytics, LinkSummary, Statistics,
    DIRECT_REFERRER, UNKNOWN_USER_AGENT,
};
use crate::utils::{classify_location, generate_id, is_valid_shortcode, parse_url};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::IpAddr;

pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10;

/// Single-segment paths served by fixed routes; a link under one of these
/// could never be reached.
pub const RESERVED_CODES: &[&str] = &["api", "health", "shorturls"];

#[derive(Default)]
struct Tables {
    links: HashMap<String, Link>,
    analytics: HashMap<String, LinkAnalytics>,
    creation_order: Vec<String>,
}

impl Tables {
    fn is_taken(&self, code: &str) -> bool {
        RESERVED_CODES.contains(&code) || self.links.contains_key(code)
    }
}

/// In-memory short link store.
///
/// Links and their analytics are created together and never removed. Expired
/// links stop resolving but their analytics stay readable.
pub struct LinkStore {
    base_url: String,
    generate_code: fn() -> String,
    tables: RwLock<Tables>,
}

impl LinkStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_generator(base_url, generate_id)
    }

    pub fn with_generator(base_url: &str, generate_code: fn() -> String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            generate_code,
            tables: RwLock::new(Tables::default()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn create(
        &self,
        original_url: &str,
        validity_minutes: i64,
        custom_code: Option<&str>,
    ) -> Result<CreatedLink, ShortenerError> {
        self.create_at(Utc::now(), original_url, validity_minutes, custom_code)
    }

    pub fn create_at(
        &self,
        now: DateTime<Utc>,
        original_url: &str,
        validity_minutes: i64,
        custom_code: Option<&str>,
    ) -> Result<CreatedLink, ShortenerError> {
        let original_url = parse_url(original_url)?;
        let expires_at = expiry_for(now, validity_minutes)?;
        if let Some(code) = custom_code {
            if !is_valid_shortcode(code) {
                return Err(ShortenerError::InvalidShortcodeFormat);
            }
        }

        // Collision check and insert share one write guard.
        let mut tables = self.tables.write();
        let short_code = match custom_code {
            Some(code) if tables.is_taken(code) => {
                return Err(ShortenerError::ShortcodeCollision(code.to_string()));
            }
            Some(code) => code.to_string(),
            None => self.allocate_code(&tables)?,
        };

        tables.links.insert(
            short_code.clone(),
            Link {
                short_code: short_code.clone(),
                original_url,
                created_at: now,
                expires_at,
                validity_minutes,
            },
        );
        tables
            .analytics
            .insert(short_code.clone(), LinkAnalytics::default());
        tables.creation_order.push(short_code.clone());
        drop(tables);

        tracing::info!(short_code = %short_code, expiry = %expires_at, "Short link created");
        Ok(CreatedLink {
            short_link: format!("{}/{}", self.base_url, short_code),
            short_code,
            expiry: expires_at,
        })
    }

    fn allocate_code(&self, tables: &Tables) -> Result<String, ShortenerError> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let code = (self.generate_code)();
            if !tables.is_taken(&code) {
                return Ok(code);
            }
            tracing::debug!(attempt, short_code = %code, "Generated shortcode already taken");
        }
        tracing::error!("Exhausted all retries of generating a unique shortcode");
        Err(ShortenerError::AllocationExhausted(MAX_ALLOCATION_ATTEMPTS))
    }

    pub fn resolve(&self, code: &str) -> Option<Link> {
        self.resolve_at(code, Utc::now())
    }

    pub fn resolve_at(&self, code: &str, now: DateTime<Utc>) -> Option<Link> {
        self.tables
            .read()
            .links
            .get(code)
            .filter(|link| !link.is_expired_at(now))
            .cloned()
    }

    /// Appends a click to the analytics of `code`. Returns false when the code
    /// is unknown. Expiry is not checked here.
    pub fn record_click(
        &self,
        code: &str,
        referrer: Option<&str>,
        user_agent: Option<&str>,
        address: Option<IpAddr>,
    ) -> bool {
        self.record_click_at(code, Utc::now(), referrer, user_agent, address)
    }

    pub fn record_click_at(
        &self,
        code: &str,
        now: DateTime<Utc>,
        referrer: Option<&str>,
        user_agent: Option<&str>,
        address: Option<IpAddr>,
    ) -> bool {
        let mut tables = self.tables.write();
        let Some(analytics) = tables.analytics.get_mut(code) else {
            return false;
        };
        analytics.clicks.push(Click {
            timestamp: now,
            referrer: non_empty_or(referrer, DIRECT_REFERRER),
            user_agent: non_empty_or(user_agent, UNKNOWN_USER_AGENT),
            location: classify_location(address).to_string(),
        });
        analytics.total_clicks += 1;
        tracing::debug!(short_code = %code, clicks = analytics.total_clicks, "Click recorded");
        true
    }

    pub fn get_analytics(&self, code: &str) -> Option<AnalyticsReport> {
        self.get_analytics_at(code, Utc::now())
    }

    pub fn get_analytics_at(&self, code: &str, now: DateTime<Utc>) -> Option<AnalyticsReport> {
        let tables = self.tables.read();
        let link = tables.links.get(code)?;
        let analytics = tables.analytics.get(code)?;
        Some(AnalyticsReport {
            shortcode: link.short_code.clone(),
            original_url: link.original_url.clone(),
            created_at: link.created_at,
            expiry: link.expires_at,
            validity: link.validity_minutes,
            expired: link.is_expired_at(now),
            total_clicks: analytics.total_clicks,
            click_data: analytics.clicks.clone(),
        })
    }

    /// Every stored link with its click count, oldest first.
    pub fn list_all(&self) -> Vec<LinkSummary> {
        let tables = self.tables.read();
        tables
            .creation_order
            .iter()
            .filter_map(|code| {
                let link = tables.links.get(code)?;
                let total_clicks = tables
                    .analytics
                    .get(code)
                    .map(|analytics| analytics.total_clicks)
                    .unwrap_or_default();
                Some(LinkSummary {
                    shortcode: link.short_code.clone(),
                    original_url: link.original_url.clone(),
                    created_at: link.created_at,
                    expiry: link.expires_at,
                    total_clicks,
                })
            })
            .collect()
    }

    pub fn statistics(&self) -> Statistics {
        let urls = self.list_all();
        let total_clicks = urls.iter().map(|summary| summary.total_clicks).sum();
        Statistics {
            total_urls: urls.len(),
            total_clicks,
            urls,
        }
    }

    pub fn len(&self) -> usize {
        self.tables.read().links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn expiry_for(now: DateTime<Utc>, validity_minutes: i64) -> Result<DateTime<Utc>, ShortenerError> {
    if validity_minutes <= 0 {
        return Err(ShortenerError::InvalidValidity);
    }
    Duration::try_minutes(validity_minutes)
        .and_then(|validity| now.checked_add_signed(validity))
        .ok_or(ShortenerError::InvalidValidity)
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}
