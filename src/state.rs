use crate::error::InvalidUnit;
use crate::models::weather::WeatherSnapshot;
use crate::units::{self, Unit};

/// Most-recent-only weather cache plus the current display unit. The single
/// entry is valid only for the exact key it was stored under.
pub struct WeatherState {
    unit: Unit,
    last_key: String,
    cached: Option<WeatherSnapshot>,
}

impl WeatherState {
    pub fn new(unit: Unit, fallback_city: &str) -> Self {
        Self {
            unit,
            last_key: fallback_city.to_string(),
            cached: None,
        }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Parse and commit a unit label. State is untouched on a bad label.
    pub fn set_unit(&mut self, label: &str) -> Result<Unit, InvalidUnit> {
        let unit = label.parse::<Unit>()?;
        self.unit = unit;
        Ok(unit)
    }

    /// Replace the single entry unconditionally. An empty key falls back to
    /// the snapshot's own city name.
    pub fn store(&mut self, snapshot: WeatherSnapshot, key: &str) {
        self.last_key = if key.is_empty() {
            snapshot.city_name.clone()
        } else {
            key.to_string()
        };
        self.cached = Some(snapshot);
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.cached.is_some() && self.last_key == key
    }

    pub fn cached(&self) -> Option<&WeatherSnapshot> {
        self.cached.as_ref()
    }

    /// The key of the last stored entry (the fallback city before anything
    /// has been stored). Used to re-fetch when a unit change finds no cache.
    pub fn last_key(&self) -> &str {
        &self.last_key
    }

    /// Re-derive the cached snapshot in `target` units via the pure
    /// conversion routine. Returns the converted snapshot, or None when
    /// nothing is cached.
    pub fn convert_cached(&mut self, target: Unit) -> Option<WeatherSnapshot> {
        let converted = units::convert(self.cached.as_ref()?, target);
        self.cached = Some(converted.clone());
        Some(converted)
    }
}
