//! Upcoming competitions from the cubing.com listing API.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Months, NaiveDate, Offset, Utc};
use cubestat_core::Competition;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::UpcomingError;

pub const DEFAULT_COMPETITIONS_API: &str = "https://cubing.com/api/v0/competition";

/// Listing dates are calendar days in China Standard Time.
const LISTING_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Region names the listing uses for the same place.
const REGION_ALIASES: &[(&str, &str)] = &[
    ("China", "中国"),
    ("Hong Kong, China", "中国香港"),
    ("Macau, China", "中国澳门"),
    ("Chinese Taipei", "中国台湾"),
];

#[derive(Debug, Deserialize)]
struct ListingResponse {
    status: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Vec<ListedCompetition>,
}

/// One competition as the listing API reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedCompetition {
    /// Numeric on most rows, occasionally a string.
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_zh: Option<String>,
    #[serde(default)]
    pub date: ListedDates,
    #[serde(default)]
    pub locations: Vec<ListedLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListedDates {
    /// Unix seconds.
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub to: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListedLocation {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub city_name: String,
    #[serde(default)]
    pub city_name_zh: Option<String>,
    #[serde(default)]
    pub province: Option<ListedProvince>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListedProvince {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_zh: Option<String>,
}

fn listing_offset() -> FixedOffset {
    FixedOffset::east_opt(LISTING_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

fn listing_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&listing_offset()).date_naive())
}

/// Today's date as the listing counts days.
pub fn listing_today() -> NaiveDate {
    Utc::now().with_timezone(&listing_offset()).date_naive()
}

fn prefer_local(local: Option<&str>, fallback: &str) -> String {
    match local.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => fallback.trim().to_string(),
    }
}

fn accepted_regions(region: &str) -> Vec<String> {
    let wanted = region.trim().to_lowercase();
    let mut accepted = vec![wanted.clone()];
    for (english, local) in REGION_ALIASES {
        if english.to_lowercase() == wanted || local.to_lowercase() == wanted {
            accepted.push(english.to_lowercase());
            accepted.push(local.to_lowercase());
        }
    }
    accepted
}

fn competition_id(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl ListedCompetition {
    fn to_competition(&self) -> Option<Competition> {
        let start_date = listing_date(self.date.from?)?;
        let end_date = self
            .date
            .to
            .and_then(listing_date)
            .unwrap_or(start_date);
        let first = self.locations.first();
        Some(Competition {
            id: competition_id(&self.id),
            name: prefer_local(self.name_zh.as_deref(), &self.name),
            city: first
                .map(|l| prefer_local(l.city_name_zh.as_deref(), &l.city_name))
                .unwrap_or_default(),
            province: first
                .and_then(|l| l.province.as_ref())
                .map(|p| prefer_local(p.name_zh.as_deref(), &p.name))
                .unwrap_or_default(),
            start_date,
            end_date,
        })
    }
}

/// Competitions held entirely in `region` that start within `months` of `today`.
///
/// Entries without locations or without a start date are dropped. The result
/// is ordered by start date, then name.
pub fn filter_upcoming(
    listing: &[ListedCompetition],
    region: &str,
    today: NaiveDate,
    months: u32,
) -> Vec<Competition> {
    let accepted = accepted_regions(region);
    let horizon = today
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX);

    let mut upcoming: Vec<Competition> = listing
        .iter()
        .filter(|c| {
            !c.locations.is_empty()
                && c.locations
                    .iter()
                    .all(|l| accepted.contains(&l.region.trim().to_lowercase()))
        })
        .filter_map(ListedCompetition::to_competition)
        .filter(|c| c.start_date >= today && c.start_date <= horizon)
        .collect();
    upcoming.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.name.cmp(&b.name))
    });
    upcoming
}

struct CachedListing {
    fetched: Instant,
    listing: Vec<ListedCompetition>,
}

/// Client for the competition listing, with a short-lived cache.
pub struct UpcomingGateway {
    http: reqwest::Client,
    base_url: String,
    ttl: Duration,
    cache: Mutex<Option<CachedListing>>,
}

impl UpcomingGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration, ttl: Duration) -> Result<Self, UpcomingError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cubestat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            ttl,
            cache: Mutex::new(None),
        })
    }

    /// Upcoming competitions in `region` starting within `months`.
    pub async fn list_upcoming(&self, region: &str, months: u32) -> Result<Vec<Competition>, UpcomingError> {
        let listing = self.listing().await?;
        let upcoming = filter_upcoming(&listing, region, listing_today(), months);
        log::debug!(
            "{} of {} listed competitions are upcoming in {region}",
            upcoming.len(),
            listing.len()
        );
        Ok(upcoming)
    }

    /// Drop the cached listing.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    async fn listing(&self) -> Result<Vec<ListedCompetition>, UpcomingError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched.elapsed() < self.ttl {
                return Ok(cached.listing.clone());
            }
        }
        let listing = self.fetch().await?;
        *cache = Some(CachedListing {
            fetched: Instant::now(),
            listing: listing.clone(),
        });
        Ok(listing)
    }

    async fn fetch(&self) -> Result<Vec<ListedCompetition>, UpcomingError> {
        log::debug!("Requesting competition listing from {}", self.base_url);
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("year", "current"), ("type", "WCA")])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpcomingError::Status(status.as_u16()));
        }
        let text = resp.text().await?;
        let body: ListingResponse = serde_json::from_str(&text)?;
        if body.status != 0 {
            return Err(UpcomingError::Api(
                body.message
                    .unwrap_or_else(|| format!("status {}", body.status)),
            ));
        }
        log::info!("Fetched {} listed competitions", body.data.len());
        Ok(body.data)
    }
}
