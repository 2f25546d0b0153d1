use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::error::LocationError;

/// A geographic fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Platform geolocation capability. `last_known` reports the most recent fix
/// together with its age; `request_fix` asks the platform for a fresh one
/// and may take arbitrarily long — the resolver bounds it.
#[allow(async_fn_in_trait)]
pub trait LocationProvider {
    fn last_known(&self) -> Option<(Coordinates, Duration)>;
    async fn request_fix(&self) -> Result<Coordinates, LocationError>;
}

/// One-shot location resolution: a young-enough cached fix is served as-is,
/// anything else races a fresh fix against the timeout.
pub struct LocationResolver<P> {
    provider: P,
    timeout: Duration,
    max_age: Duration,
}

impl<P: LocationProvider> LocationResolver<P> {
    pub fn new(provider: P, timeout: Duration, max_age: Duration) -> Self {
        Self {
            provider,
            timeout,
            max_age,
        }
    }

    pub async fn resolve(&self) -> Result<Coordinates, LocationError> {
        if let Some((coords, age)) = self.provider.last_known() {
            if age <= self.max_age {
                debug!("using cached location fix ({}s old)", age.as_secs());
                return Ok(coords);
            }
        }

        timeout(self.timeout, self.provider.request_fix())
            .await
            .map_err(|_| LocationError::Timeout)?
    }
}

/// Provider backed by coordinates pinned in config, standing in for real
/// platform geolocation on the CLI. Reports them as a fresh fix; with no
/// coordinates configured the platform is unavailable.
pub struct StaticProvider {
    coords: Option<Coordinates>,
}

impl StaticProvider {
    pub fn new(lat: Option<f64>, lon: Option<f64>) -> Self {
        Self {
            coords: lat.zip(lon).map(|(lat, lon)| Coordinates { lat, lon }),
        }
    }
}

impl LocationProvider for StaticProvider {
    fn last_known(&self) -> Option<(Coordinates, Duration)> {
        self.coords.map(|c| (c, Duration::ZERO))
    }

    async fn request_fix(&self) -> Result<Coordinates, LocationError> {
        self.coords.ok_or(LocationError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const SEOUL: Coordinates = Coordinates {
        lat: 37.5665,
        lon: 126.978,
    };

    struct FakeProvider {
        cached: Option<(Coordinates, Duration)>,
        fresh: Result<Coordinates, LocationError>,
        fix_requests: Cell<u32>,
        hang: bool,
    }

    impl FakeProvider {
        fn new(
            cached: Option<(Coordinates, Duration)>,
            fresh: Result<Coordinates, LocationError>,
        ) -> Self {
            Self {
                cached,
                fresh,
                fix_requests: Cell::new(0),
                hang: false,
            }
        }
    }

    impl LocationProvider for FakeProvider {
        fn last_known(&self) -> Option<(Coordinates, Duration)> {
            self.cached
        }

        async fn request_fix(&self) -> Result<Coordinates, LocationError> {
            self.fix_requests.set(self.fix_requests.get() + 1);
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.fresh
        }
    }

    fn resolver(provider: FakeProvider) -> LocationResolver<FakeProvider> {
        LocationResolver::new(provider, Duration::from_secs(10), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn young_cached_fix_skips_fresh_request() {
        let r = resolver(FakeProvider::new(
            Some((SEOUL, Duration::from_secs(30))),
            Err(LocationError::Unavailable),
        ));

        assert_eq!(r.resolve().await.unwrap(), SEOUL);
        assert_eq!(r.provider.fix_requests.get(), 0);
    }

    #[tokio::test]
    async fn stale_cached_fix_requests_fresh_one() {
        let r = resolver(FakeProvider::new(
            Some((SEOUL, Duration::from_secs(120))),
            Ok(SEOUL),
        ));

        assert_eq!(r.resolve().await.unwrap(), SEOUL);
        assert_eq!(r.provider.fix_requests.get(), 1);
    }

    #[tokio::test]
    async fn provider_failure_passes_through() {
        let r = resolver(FakeProvider::new(None, Err(LocationError::PermissionDenied)));
        assert!(matches!(
            r.resolve().await,
            Err(LocationError::PermissionDenied)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_fix_request_times_out() {
        let mut provider = FakeProvider::new(None, Ok(SEOUL));
        provider.hang = true;
        let r = resolver(provider);

        assert!(matches!(r.resolve().await, Err(LocationError::Timeout)));
    }

    #[tokio::test]
    async fn static_provider_without_coords_is_unavailable() {
        let provider = StaticProvider::new(None, None);
        assert!(provider.last_known().is_none());
        assert!(matches!(
            provider.request_fix().await,
            Err(LocationError::Unavailable)
        ));
    }
}
