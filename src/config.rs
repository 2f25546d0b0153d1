use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::api::endpoints;
use crate::units::Unit;

const CONFIG_FILE: &str = "config.toml";
const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Weather provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Overridden by OPENWEATHER_API_KEY when the variable is set.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            lang: default_lang(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

/// Geolocation settings. Pinned coordinates feed the CLI's static provider;
/// with none set, resolution fails and the fallback city takes over.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_location_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_location_max_age")]
    pub max_age_secs: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_location_timeout(),
            max_age_secs: default_location_max_age(),
            lat: None,
            lon: None,
        }
    }
}

/// Ambient background settings
#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_video_base_url")]
    pub base_url: String,
    #[serde(default = "default_preload_timeout")]
    pub preload_timeout_secs: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: default_video_base_url(),
            preload_timeout_secs: default_preload_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_error_display_ms")]
    pub error_display_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            error_display_ms: default_error_display_ms(),
        }
    }
}

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default = "default_fallback_city")]
    pub fallback_city: String,
    #[serde(default)]
    pub units: Unit,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            location: LocationConfig::default(),
            video: VideoConfig::default(),
            ui: UiConfig::default(),
            fallback_city: default_fallback_city(),
            units: Unit::default(),
        }
    }
}

fn default_base_url() -> String {
    endpoints::CURRENT_WEATHER.to_string()
}
fn default_lang() -> String {
    "kr".to_string()
}
fn default_fetch_timeout() -> u64 {
    10
}
fn default_location_timeout() -> u64 {
    10
}
fn default_location_max_age() -> u64 {
    60
}
fn default_video_base_url() -> String {
    "public/video".to_string()
}
fn default_preload_timeout() -> u64 {
    10
}
fn default_error_display_ms() -> u64 {
    3000
}
fn default_fallback_city() -> String {
    "Seoul".to_string()
}

impl AppConfig {
    /// Read the config file if present, fall back to defaults otherwise,
    /// then let the environment supply the API key.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));
        let mut config = if path.exists() {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&data)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.api.api_key = key;
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, endpoints::CURRENT_WEATHER);
        assert_eq!(config.api.lang, "kr");
        assert_eq!(config.api.fetch_timeout_secs, 10);
        assert_eq!(config.location.timeout_secs, 10);
        assert_eq!(config.location.max_age_secs, 60);
        assert_eq!(config.video.preload_timeout_secs, 10);
        assert_eq!(config.ui.error_display_ms, 3000);
        assert_eq!(config.fallback_city, "Seoul");
        assert_eq!(config.units, Unit::Metric);
    }

    #[test]
    fn partial_toml_overrides_selected_fields() {
        let config: AppConfig = toml::from_str(
            r#"
            units = "imperial"
            fallback_city = "Busan"

            [location]
            lat = 37.5665
            lon = 126.978

            [video]
            base_url = "https://cdn.example.com/clips"
            "#,
        )
        .unwrap();

        assert_eq!(config.units, Unit::Imperial);
        assert_eq!(config.fallback_city, "Busan");
        assert_eq!(config.location.lat, Some(37.5665));
        assert_eq!(config.video.base_url, "https://cdn.example.com/clips");
        // untouched sections keep their defaults
        assert_eq!(config.api.lang, "kr");
        assert_eq!(config.video.preload_timeout_secs, 10);
    }

    #[test]
    fn bad_unit_label_is_rejected_at_parse() {
        assert!(toml::from_str::<AppConfig>("units = \"kelvin\"").is_err());
    }

    #[test]
    fn programmatic_default_matches_serde_defaults() {
        let from_toml: AppConfig = toml::from_str("").unwrap();
        let programmatic = AppConfig::default();
        assert_eq!(programmatic.fallback_city, from_toml.fallback_city);
        assert_eq!(programmatic.api.base_url, from_toml.api.base_url);
        assert_eq!(programmatic.api.lang, from_toml.api.lang);
        assert_eq!(programmatic.ui.error_display_ms, from_toml.ui.error_display_ms);
    }
}
