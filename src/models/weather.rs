use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use crate::units::Unit;

/// Locator for one weather lookup: free-text name, coordinates, or provider
/// city id. Immutable per request.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    CityName(String),
    Coords { lat: f64, lon: f64 },
    CityId(u64),
}

impl Query {
    /// Canonical cache key: name passthrough, `"lat,lon"`, id digits.
    pub fn cache_key(&self) -> String {
        match self {
            Query::CityName(name) => name.clone(),
            Query::Coords { lat, lon } => format!("{lat:?},{lon:?}"),
            Query::CityId(id) => id.to_string(),
        }
    }
}

/// Decoded current-conditions snapshot. All numeric fields are expressed in
/// `unit`; re-expression goes through `units::convert` only.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub wind_speed: f64,
    pub humidity: i64,
    pub pressure: i64,
    pub condition_code: i64,
    pub condition_text: String,
    pub icon_id: String,
    pub timestamp_utc: i64,
    pub utc_offset_seconds: i32,
    pub city_name: String,
    pub country_code: String,
    pub unit: Unit,
}

impl WeatherSnapshot {
    /// Observation time shifted into the city's own UTC offset.
    pub fn local_time(&self) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.utc_offset_seconds)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        DateTime::<Utc>::from_timestamp(self.timestamp_utc, 0)
            .unwrap_or_default()
            .with_timezone(&offset)
    }
}

/// Raw current-weather response from OpenWeatherMap
#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    pub main: MainFields,
    #[serde(default)]
    pub wind: WindFields,
    #[serde(default)]
    pub weather: Vec<ConditionEntry>,
    pub dt: i64,
    pub timezone: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sys: SysFields,
}

#[derive(Debug, Deserialize)]
pub struct MainFields {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    #[serde(default)]
    pub humidity: i64,
    #[serde(default)]
    pub pressure: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct WindFields {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConditionEntry {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SysFields {
    #[serde(default)]
    pub country: String,
}

impl CurrentWeatherResponse {
    /// Flatten the provider's nested shape into the domain snapshot, stamped
    /// with the unit system the request asked for.
    pub fn into_snapshot(self, unit: Unit) -> WeatherSnapshot {
        let condition = self.weather.into_iter().next().unwrap_or_default();
        WeatherSnapshot {
            temp: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            wind_speed: self.wind.speed,
            humidity: self.main.humidity,
            pressure: self.main.pressure,
            condition_code: condition.id,
            condition_text: condition.description,
            icon_id: condition.icon,
            timestamp_utc: self.dt,
            utc_offset_seconds: self.timezone,
            city_name: self.name,
            country_code: self.sys.country,
            unit,
        }
    }
}
