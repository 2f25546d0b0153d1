use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidUnit;
use crate::models::weather::WeatherSnapshot;

/// Display unit system. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    /// Value sent as the provider's `units` query parameter.
    pub fn api_value(&self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    pub fn temp_symbol(&self) -> &'static str {
        match self {
            Unit::Metric => "°C",
            Unit::Imperial => "°F",
        }
    }

    pub fn wind_label(&self) -> &'static str {
        match self {
            Unit::Metric => "m/s",
            Unit::Imperial => "mph",
        }
    }
}

impl FromStr for Unit {
    type Err = InvalidUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Unit::Metric),
            "imperial" => Ok(Unit::Imperial),
            _ => Err(InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_value())
    }
}

/// Convert Celsius to Fahrenheit
pub fn c_to_f(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Convert Fahrenheit to Celsius
pub fn f_to_c(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Convert meters per second to miles per hour
pub fn ms_to_mph(ms: f64) -> f64 {
    ms * 2.23694
}

/// Convert miles per hour to meters per second
pub fn mph_to_ms(mph: f64) -> f64 {
    mph / 2.23694
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Re-express a snapshot in `target` units: the four temperature fields
/// rounded to 1 decimal, wind speed to 2. Converting a snapshot to the unit
/// it is already in returns it unchanged.
pub fn convert(snapshot: &WeatherSnapshot, target: Unit) -> WeatherSnapshot {
    if snapshot.unit == target {
        return snapshot.clone();
    }

    let temp = match target {
        Unit::Metric => f_to_c,
        Unit::Imperial => c_to_f,
    };
    let wind = match target {
        Unit::Metric => mph_to_ms,
        Unit::Imperial => ms_to_mph,
    };

    let mut out = snapshot.clone();
    out.temp = round_to(temp(snapshot.temp), 1);
    out.feels_like = round_to(temp(snapshot.feels_like), 1);
    out.temp_min = round_to(temp(snapshot.temp_min), 1);
    out.temp_max = round_to(temp(snapshot.temp_max), 1);
    out.wind_speed = round_to(wind(snapshot.wind_speed), 2);
    out.unit = target;
    out
}
