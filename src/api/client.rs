use std::time::Duration;

use reqwest::Client;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::models::weather::{CurrentWeatherResponse, Query, WeatherSnapshot};
use crate::units::Unit;

/// OpenWeatherMap current-conditions client. One request per call, no
/// retries; the caller decides what a failure means.
pub struct WeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
    lang: String,
    timeout: Duration,
}

impl WeatherClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let http = Client::builder().user_agent("skycast/0.1.0").build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            lang: config.lang.clone(),
            timeout: Duration::from_secs(config.fetch_timeout_secs),
        })
    }

    /// Fetch current conditions for a query, expressed in `unit`. The
    /// deadline races the request; on expiry the in-flight request is
    /// dropped and the call fails with `Timeout`.
    pub async fn fetch(&self, query: &Query, unit: Unit) -> Result<WeatherSnapshot, FetchError> {
        let params = self.build_params(query, unit)?;

        debug!("weather request for {}", query.cache_key());

        let pending = self.http.get(&self.base_url).query(&params).send();
        let response = timeout(self.timeout, pending)
            .await
            .map_err(|_| FetchError::Timeout)??;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
            });
        }

        let decoded: CurrentWeatherResponse = response.json().await?;
        Ok(decoded.into_snapshot(unit))
    }

    /// The provider takes `units`, `appid`, `lang` plus exactly one of
    /// `q` / `lat`&`lon` / `id`. Unusable query content is rejected before
    /// anything goes on the wire.
    fn build_params(&self, query: &Query, unit: Unit) -> Result<Vec<(String, String)>, FetchError> {
        let mut params = vec![
            ("units".to_string(), unit.api_value().to_string()),
            ("appid".to_string(), self.api_key.clone()),
            ("lang".to_string(), self.lang.clone()),
        ];

        match query {
            Query::CityName(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(FetchError::InvalidQuery("empty city name".to_string()));
                }
                params.push(("q".to_string(), name.to_string()));
            }
            Query::Coords { lat, lon } => {
                if !lat.is_finite() || !lon.is_finite() {
                    return Err(FetchError::InvalidQuery(
                        "non-finite coordinates".to_string(),
                    ));
                }
                params.push(("lat".to_string(), lat.to_string()));
                params.push(("lon".to_string(), lon.to_string()));
            }
            Query::CityId(id) => {
                params.push(("id".to_string(), id.to_string()));
            }
        }

        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> ApiConfig {
        ApiConfig {
            base_url,
            api_key: "test-key".to_string(),
            lang: "kr".to_string(),
            fetch_timeout_secs: 10,
        }
    }

    fn seoul_body() -> serde_json::Value {
        serde_json::json!({
            "main": {
                "temp": 21.3,
                "feels_like": 20.9,
                "temp_min": 18.0,
                "temp_max": 24.0,
                "humidity": 55,
                "pressure": 1018
            },
            "wind": { "speed": 3.6 },
            "weather": [
                { "id": 800, "description": "clear sky", "icon": "01d" }
            ],
            "dt": 1_700_000_000,
            "timezone": 32400,
            "name": "Seoul",
            "sys": { "country": "KR" }
        })
    }

    #[tokio::test]
    async fn fetch_by_name_decodes_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Seoul"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test-key"))
            .and(query_param("lang", "kr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(seoul_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = WeatherClient::new(&test_config(format!("{}/weather", server.uri()))).unwrap();
        let snapshot = client
            .fetch(&Query::CityName("Seoul".to_string()), Unit::Metric)
            .await
            .unwrap();

        assert_eq!(snapshot.city_name, "Seoul");
        assert_eq!(snapshot.condition_code, 800);
        assert_eq!(snapshot.unit, Unit::Metric);
    }

    #[tokio::test]
    async fn fetch_by_coords_sends_lat_lon() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "37.5"))
            .and(query_param("lon", "127"))
            .respond_with(ResponseTemplate::new(200).set_body_json(seoul_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = WeatherClient::new(&test_config(format!("{}/weather", server.uri()))).unwrap();
        let result = client
            .fetch(&Query::Coords { lat: 37.5, lon: 127.0 }, Unit::Metric)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn upstream_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = WeatherClient::new(&test_config(format!("{}/weather", server.uri()))).unwrap();
        let err = client
            .fetch(&Query::CityName("Nowhere".to_string()), Unit::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Upstream { status: 404 }));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(seoul_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let mut config = test_config(format!("{}/weather", server.uri()));
        config.fetch_timeout_secs = 0;
        let client = WeatherClient::new(&config).unwrap();
        let err = client
            .fetch(&Query::CityName("Seoul".to_string()), Unit::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout));
    }

    #[tokio::test]
    async fn blank_city_name_is_rejected_without_network() {
        let client = WeatherClient::new(&test_config("http://127.0.0.1:9/weather".to_string()))
            .unwrap();
        let err = client
            .fetch(&Query::CityName("   ".to_string()), Unit::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn non_finite_coords_are_rejected() {
        let client = WeatherClient::new(&test_config("http://127.0.0.1:9/weather".to_string()))
            .unwrap();
        let err = client
            .fetch(&Query::Coords { lat: f64::NAN, lon: 0.0 }, Unit::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidQuery(_)));
    }
}
