//! Device position for the "use my location" button.

use std::future::Future;
use std::time::Duration;
use log::{info, warn};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use crate::address::{AddressResolver, Coordinates};
use crate::form::BookingForm;

pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(15);
pub const MAX_POSITION_AGE: Duration = Duration::from_secs(60);

/// Failures a [`PositionSource`] reports.
///
/// The bundled sources only produce `Unsupported`; device-backed sources map
/// a refused permission prompt to `PermissionDenied` and a missing fix to
/// `Unavailable`, and the form shows their messages as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location access denied. Please enable location services and try again.")]
    PermissionDenied,

    #[error("Location unavailable. Please check your device settings.")]
    Unavailable,

    #[error("Location request timed out. Please try again.")]
    Timeout,

    #[error("Geolocation is not supported on this device.")]
    Unsupported,
}

/// Where positions come from.
///
/// Implementations return a [`GeolocationError`] instead of blocking forever;
/// [`Geolocator`] still bounds each call with its own timeout.
pub trait PositionSource: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;
}

/// A position given up front, e.g. on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// No position hardware at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositionSource;

impl PositionSource for NoPositionSource {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Wraps a [`PositionSource`] with an acquisition timeout and a short-lived cache.
pub struct Geolocator<S> {
    source: S,
    timeout: Duration,
    max_age: Duration,
    last: Option<(Coordinates, Instant)>,
}

impl<S: PositionSource> Geolocator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: ACQUIRE_TIMEOUT,
            max_age: MAX_POSITION_AGE,
            last: None,
        }
    }

    /// Current position; a cached one younger than the max age is reused.
    pub async fn locate(&mut self) -> Result<Coordinates, GeolocationError> {
        if let Some((coordinates, at)) = self.last {
            if at.elapsed() < self.max_age {
                return Ok(coordinates);
            }
        }

        let coordinates = tokio::time::timeout(self.timeout, self.source.current_position())
            .await
            .map_err(|_| GeolocationError::Timeout)??;
        self.last = Some((coordinates, Instant::now()));
        Ok(coordinates)
    }
}

/// Locate the device and fill the form's current location with its address.
///
/// Position failures end up in the form's Eircode error; address failures
/// cannot happen since coordinate resolution always yields something.
pub async fn fill_current_location<S: PositionSource>(
    geolocator: &mut Geolocator<S>,
    resolver: &AddressResolver,
    form: &Mutex<BookingForm>,
) -> Result<(), GeolocationError> {
    {
        let mut form = form.lock().await;
        form.status.loading_location = true;
        form.status.eircode_error = None;
    }

    let located = geolocator.locate().await;
    let resolved = match located {
        Ok(coordinates) => {
            info!("location obtained: ({coordinates})");
            Ok(resolver.resolve_by_coordinates(coordinates).await)
        }
        Err(e) => {
            warn!("geolocation failed: {e}");
            Err(e)
        }
    };

    let mut form = form.lock().await;
    form.status.loading_location = false;
    match resolved {
        Ok(resolved) => {
            form.apply_located_address(&resolved.address);
            Ok(())
        }
        Err(e) => {
            form.status.eircode_error = Some(e.to_string());
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::config::ResolverConfig;
    use crate::form::LocationFields;

    struct SlowSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl SlowSource {
        fn new(delay: Duration) -> Self {
            Self { calls: AtomicUsize::new(0), delay }
        }
    }

    impl PositionSource for SlowSource {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as f64;
            tokio::time::sleep(self.delay).await;
            Ok(Coordinates::new(53.0 + n, -6.0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cached_position_is_reused_within_a_minute() {
        let mut geolocator = Geolocator::new(SlowSource::new(Duration::from_millis(10)));
        let first = geolocator.locate().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(geolocator.locate().await.unwrap(), first);
        assert_eq!(geolocator.source.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        let refreshed = geolocator.locate().await.unwrap();
        assert_ne!(refreshed, first);
        assert_eq!(geolocator.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out() {
        let mut geolocator = Geolocator::new(SlowSource::new(Duration::from_secs(20)));
        assert_eq!(geolocator.locate().await, Err(GeolocationError::Timeout));
    }

    #[tokio::test]
    async fn unsupported_source_reports_its_error() {
        let mut geolocator = Geolocator::new(NoPositionSource);
        let err = geolocator.locate().await.unwrap_err();
        assert_eq!(err, GeolocationError::Unsupported);
        assert!(err.to_string().contains("not supported"));
    }

    /// Always fails with the given error.
    struct FailingSource(GeolocationError);

    impl PositionSource for FailingSource {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            Err(self.0)
        }
    }

    fn offline_resolver() -> AddressResolver {
        AddressResolver::new(ResolverConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn missing_source_leaves_its_message_on_the_form() {
        let mut geolocator = Geolocator::new(NoPositionSource);
        let form = Mutex::new(BookingForm::new());
        form.lock().await.status.eircode_error = Some("stale".into());

        let err = fill_current_location(&mut geolocator, &offline_resolver(), &form).await.unwrap_err();

        let form = form.into_inner();
        assert_eq!(err, GeolocationError::Unsupported);
        assert_eq!(form.status.eircode_error.as_deref(), Some("Geolocation is not supported on this device."));
        assert!(!form.status.loading_location);
        assert_eq!(form.current, LocationFields::default());
        assert_eq!(form.eircode, "");
    }

    #[tokio::test]
    async fn device_failures_reach_the_form_verbatim() {
        for error in [GeolocationError::PermissionDenied, GeolocationError::Unavailable] {
            let mut geolocator = Geolocator::new(FailingSource(error));
            let form = Mutex::new(BookingForm::new());

            assert_eq!(fill_current_location(&mut geolocator, &offline_resolver(), &form).await, Err(error));

            let form = form.into_inner();
            assert_eq!(form.status.eircode_error, Some(error.to_string()));
            assert!(!form.status.loading_location);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_source_clears_the_loading_flag() {
        let mut geolocator = Geolocator::new(SlowSource::new(Duration::from_secs(20)));
        let form = Mutex::new(BookingForm::new());

        let err = fill_current_location(&mut geolocator, &offline_resolver(), &form).await.unwrap_err();

        let form = form.into_inner();
        assert_eq!(err, GeolocationError::Timeout);
        assert_eq!(form.status.eircode_error.as_deref(), Some("Location request timed out. Please try again."));
        assert!(!form.status.loading_location);
    }

    #[test]
    fn messages_match_the_form_copy() {
        assert_eq!(
            GeolocationError::PermissionDenied.to_string(),
            "Location access denied. Please enable location services and try again."
        );
        assert_eq!(GeolocationError::Timeout.to_string(), "Location request timed out. Please try again.");
        assert_eq!(
            GeolocationError::Unavailable.to_string(),
            "Location unavailable. Please check your device settings."
        );
    }
}
