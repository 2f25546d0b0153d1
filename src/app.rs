use std::time::Duration;

use tracing::{debug, warn};

use crate::api::client::WeatherClient;
use crate::classify::classify;
use crate::config::AppConfig;
use crate::error::InvalidUnit;
use crate::location::{LocationProvider, LocationResolver};
use crate::models::weather::{Query, WeatherSnapshot};
use crate::render::RenderSink;
use crate::search::CityPicker;
use crate::state::WeatherState;
use crate::video::{VideoBackground, VideoSurface};

/// Composes the core components into one request/response cycle per user
/// action. Location failures are absorbed into the fallback city; fetch
/// failures become a transient banner; video failures are only logged.
pub struct WeatherApp<P, S, R> {
    state: WeatherState,
    client: WeatherClient,
    resolver: LocationResolver<P>,
    video: VideoBackground<S>,
    picker: CityPicker,
    sink: R,
    fallback_city: String,
    error_ttl: Duration,
}

impl<P, S, R> WeatherApp<P, S, R>
where
    P: LocationProvider,
    S: VideoSurface,
    R: RenderSink,
{
    pub fn new(
        client: WeatherClient,
        resolver: LocationResolver<P>,
        video: VideoBackground<S>,
        sink: R,
        config: &AppConfig,
    ) -> Self {
        Self {
            state: WeatherState::new(config.units, &config.fallback_city),
            client,
            resolver,
            video,
            picker: CityPicker::new(),
            sink,
            fallback_city: config.fallback_city.clone(),
            error_ttl: Duration::from_millis(config.ui.error_display_ms),
        }
    }

    pub fn picker(&self) -> &CityPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut CityPicker {
        &mut self.picker
    }

    pub fn state(&self) -> &WeatherState {
        &self.state
    }

    /// Startup flow: geolocate, fall back to the default city on any
    /// resolver failure. The failure kind is irrelevant here and is never
    /// surfaced to the user.
    pub async fn start(&mut self) {
        self.sink.show_loading("Resolving current location...");
        let query = match self.resolver.resolve().await {
            Ok(coords) => Query::Coords {
                lat: coords.lat,
                lon: coords.lon,
            },
            Err(e) => {
                warn!("location unavailable ({e}), falling back to {}", self.fallback_city);
                Query::CityName(self.fallback_city.clone())
            }
        };
        self.lookup(query).await;
        self.sink.hide_loading();
    }

    /// One cache-or-fetch cycle. A fetch failure leaves every piece of prior
    /// state untouched.
    pub async fn lookup(&mut self, query: Query) {
        let key = query.cache_key();

        if self.state.is_valid(&key) {
            debug!("cache hit for {key}");
            if let Some(snapshot) = self.state.cached().cloned() {
                self.display(&snapshot).await;
            }
            return;
        }

        match self.client.fetch(&query, self.state.unit()).await {
            Ok(snapshot) => {
                self.state.store(snapshot.clone(), &key);
                self.display(&snapshot).await;
            }
            Err(e) => self.sink.show_error(&e.to_string(), self.error_ttl),
        }
    }

    /// Unit toggle: re-derive displayed values from the cache when a
    /// snapshot exists; only fetch (by the last-known location text) when
    /// nothing is cached. Selecting the already-current unit does nothing.
    pub async fn set_unit(&mut self, label: &str) -> Result<(), InvalidUnit> {
        let previous = self.state.unit();
        let unit = self.state.set_unit(label)?;
        if unit == previous {
            return Ok(());
        }

        if let Some(snapshot) = self.state.convert_cached(unit) {
            self.display(&snapshot).await;
        } else {
            let city = self.state.last_key().to_string();
            self.lookup(Query::CityName(city)).await;
        }
        Ok(())
    }

    /// Combobox commit: fetch the highlighted city by provider id. The
    /// combobox is closed afterwards no matter what happened.
    pub async fn commit_selection(&mut self) {
        if let Some(entry) = self.picker.selected().copied() {
            self.lookup(Query::CityId(entry.id)).await;
        }
        self.picker.close();
    }

    /// Free-text submit: a known catalog name resolves to its provider id,
    /// anything else goes out as a name query. Blank input only closes the
    /// combobox.
    pub async fn submit(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            let query = match self.picker.find_by_name(text) {
                Some(entry) => Query::CityId(entry.id),
                None => Query::CityName(text.to_string()),
            };
            self.lookup(query).await;
        }
        self.picker.close();
    }

    async fn display(&mut self, snapshot: &WeatherSnapshot) {
        self.sink.render_weather(snapshot);

        let class = classify(snapshot.condition_code);
        if let Err(e) = self.video.change_background(class).await {
            warn!("background switch failed: {e}");
        }
    }
}
