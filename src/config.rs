use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::search::DEFAULT_DEBOUNCE;
use crate::view::ViewMode;

const DEFAULT_API_URL: &str = "https://eventra-18by.onrender.com";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_GEOCODER_USER_AGENT: &str = "EventOrganizerApp/1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub geocoder_base_url: String,
    pub geocoder_user_agent: String,
    pub search_debounce_ms: u64,
    pub default_view: ViewMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            geocoder_base_url: DEFAULT_GEOCODER_URL.to_string(),
            geocoder_user_agent: DEFAULT_GEOCODER_USER_AGENT.to_string(),
            search_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            default_view: ViewMode::Map,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or blank keys keep their defaults; malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("EVENTRA_API_URL") {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(url) = get("EVENTRA_GEOCODER_URL") {
            config.geocoder_base_url = url.trim().to_string();
        }
        if let Some(agent) = get("EVENTRA_GEOCODER_USER_AGENT") {
            config.geocoder_user_agent = agent.trim().to_string();
        }
        if let Some(raw) = get("EVENTRA_SEARCH_DEBOUNCE_MS") {
            config.search_debounce_ms = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("EVENTRA_SEARCH_DEBOUNCE_MS is not a number: {raw}"))?;
        }
        if let Some(raw) = get("EVENTRA_DEFAULT_VIEW") {
            config.default_view = raw
                .parse::<ViewMode>()
                .map_err(|err| anyhow!(err))
                .context("EVENTRA_DEFAULT_VIEW must be `map` or `list`")?;
        }

        for (key, url) in [
            ("EVENTRA_API_URL", &config.api_base_url),
            ("EVENTRA_GEOCODER_URL", &config.geocoder_base_url),
        ] {
            reqwest::Url::parse(url).with_context(|| format!("{key} is not a valid url: {url}"))?;
        }

        Ok(config)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
