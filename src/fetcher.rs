use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{Credentials, SearchTarget};

const API_BASE: &str = "https://api.adzuna.com/v1/api/jobs";
const RESULTS_PER_PAGE: u32 = 50;

/// One page of search results as served by the API.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawListing>,
}

/// A raw listing as returned by the search API. Every field is optional:
/// nested objects may be absent entirely or arrive with missing sub-keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawListing {
    pub id: Option<String>,
    pub title: Option<String>,
    pub company: Option<CompanyRef>,
    pub location: Option<LocationRef>,
    pub category: Option<CategoryRef>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_is_predicted: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contract_type: Option<String>,
    pub contract_time: Option<String>,
    pub description: Option<String>,
    pub created: Option<String>,
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanyRef {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationRef {
    pub display_name: Option<String>,
    pub area: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryRef {
    pub label: Option<String>,
}

/// Request totals for one fetch run.
#[derive(Debug, Default)]
pub struct FetchStats {
    pub requests: usize,
    pub failed: usize,
    pub listings: usize,
}

pub struct Fetcher {
    client: Client,
    base_url: String,
    creds: Credentials,
    delay: Duration,
}

impl Fetcher {
    pub fn new(creds: Credentials, delay: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE.to_string(),
            creds,
            delay,
        }
    }

    /// Fetch every (target, page) combination in order, accumulating the
    /// listings of all successful pages. A failed page is logged and
    /// contributes nothing; the delay is observed after every request
    /// regardless of outcome. Duplicates across pages and locations are
    /// expected and resolved at insert time, not here.
    pub async fn fetch_all(
        &self,
        what: &str,
        targets: &[SearchTarget],
        pages: u32,
    ) -> Result<(Vec<RawListing>, FetchStats)> {
        let mut all = Vec::new();
        let mut stats = FetchStats::default();

        let pb = ProgressBar::new(targets.len() as u64 * pages as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                .progress_chars("=> "),
        );

        for target in targets {
            info!(
                "Fetching {:?} jobs for {}, {}",
                what, target.country, target.location
            );
            for page in 1..=pages {
                match self.fetch_page(what, target, page).await {
                    Ok(results) => {
                        stats.listings += results.len();
                        all.extend(results);
                    }
                    Err(e) => {
                        warn!(
                            "Failed for {} page {}: {}",
                            target.location, page, e
                        );
                        stats.failed += 1;
                    }
                }
                stats.requests += 1;
                pb.inc(1);
                tokio::time::sleep(self.delay).await;
            }
        }

        pb.finish_and_clear();
        info!(
            "Fetched {} listings ({} requests, {} failed)",
            all.len(),
            stats.requests,
            stats.failed
        );
        Ok((all, stats))
    }

    async fn fetch_page(
        &self,
        what: &str,
        target: &SearchTarget,
        page: u32,
    ) -> Result<Vec<RawListing>> {
        let url = format!("{}/{}/search/{}", self.base_url, target.country, page);
        let per_page = RESULTS_PER_PAGE.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("app_id", self.creds.app_id.as_str()),
                ("app_key", self.creds.app_key.as_str()),
                ("what", what),
                ("where", target.location.as_str()),
                ("results_per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("status {}", status);
        }
        let body: SearchResponse = response.json().await?;
        Ok(body.results)
    }
}

// ── Tests ──
