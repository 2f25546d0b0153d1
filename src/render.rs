use std::time::Duration;

use crate::models::weather::WeatherSnapshot;

/// Write-only display surface the core renders into. Implementations own
/// presentation entirely; the core never reads anything back.
pub trait RenderSink {
    fn render_weather(&self, snapshot: &WeatherSnapshot);
    fn show_loading(&self, message: &str);
    fn hide_loading(&self);
    /// Display an error banner for at most `ttl`, then let it expire.
    fn show_error(&self, message: &str, ttl: Duration);
}

/// Console renderer standing in for the browser display slots.
pub struct ConsoleSink;

impl RenderSink for ConsoleSink {
    fn render_weather(&self, s: &WeatherSnapshot) {
        let unit = s.unit;
        println!("\n🌍 {}, {}", s.city_name, s.country_code);
        println!("   {}", s.local_time().format("%Y-%m-%d (%A) %H:%M"));
        println!(
            "   {}  {:.0}{}  (feels like {:.0}{})",
            s.condition_text,
            s.temp,
            unit.temp_symbol(),
            s.feels_like,
            unit.temp_symbol(),
        );
        println!(
            "   min {:.0}{}  |  max {:.0}{}",
            s.temp_min,
            unit.temp_symbol(),
            s.temp_max,
            unit.temp_symbol(),
        );
        println!(
            "   wind {} {}  |  humidity {}%  |  pressure {} hPa",
            s.wind_speed,
            unit.wind_label(),
            s.humidity,
            s.pressure,
        );
    }

    fn show_loading(&self, message: &str) {
        println!("{message}");
    }

    fn hide_loading(&self) {}

    fn show_error(&self, message: &str, _ttl: Duration) {
        // console lines cannot expire; the ttl is a display-surface concern
        eprintln!("⚠ {message}");
    }
}
