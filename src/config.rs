use anyhow::{Context, Result};

/// Adzuna API credentials. Constructed by the caller and passed into the
/// fetcher explicitly; nothing below `main` reads the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_key: String,
}

impl Credentials {
    /// Load `APP_ID` / `APP_KEY` from the environment, after loading a
    /// `.env` file if one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let app_id = std::env::var("APP_ID").context("APP_ID must be set (env or .env)")?;
        let app_key = std::env::var("APP_KEY").context("APP_KEY must be set (env or .env)")?;
        Ok(Self { app_id, app_key })
    }
}

/// One search target: an Adzuna country code plus a location name.
#[derive(Debug, Clone)]
pub struct SearchTarget {
    pub country: String,
    pub location: String,
}

/// Default search targets when none are given on the command line.
pub fn default_targets() -> Vec<SearchTarget> {
    [("gb", "London"), ("us", "New York"), ("us", "California")]
        .iter()
        .map(|(country, location)| SearchTarget {
            country: country.to_string(),
            location: location.to_string(),
        })
        .collect()
}

/// Parse a `country:location` argument, e.g. `gb:London` or `us:New York`.
pub fn parse_target(s: &str) -> Result<SearchTarget, String> {
    match s.split_once(':') {
        Some((country, location)) if !country.is_empty() && !location.is_empty() => {
            Ok(SearchTarget {
                country: country.to_string(),
                location: location.to_string(),
            })
        }
        _ => Err(format!("expected country:location, got {:?}", s)),
    }
}

// ── Tests ──
