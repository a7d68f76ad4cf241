use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{GeolocationError, WeatherError};
use crate::location::Locator;
use crate::model::{Query, UnitSystem};
use crate::presenter::{self, Screen};
use crate::provider::WeatherProvider;

/// An error message left alone this long clears itself.
pub const ERROR_CLEAR_DELAY: Duration = Duration::from_millis(5000);

/// Visual lifecycle of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiStatus {
    #[default]
    Idle,
    Loading,
    Shown,
    Error,
}

#[derive(Debug, Default)]
struct StatusState {
    status: UiStatus,
    /// Bumped on every new error; lets a pending clear timer detect
    /// that its message has been replaced.
    error_epoch: u64,
}

/// One widget instance: wraps a provider, an optional locator and a
/// screen, and drives the loading/shown/error lifecycle around each
/// request.
///
/// Every request carries a generation id; an outcome whose generation
/// is no longer current is discarded, so a late response from a
/// superseded request can never overwrite the display.
pub struct WeatherSession<S> {
    provider: Arc<dyn WeatherProvider>,
    locator: Option<Arc<dyn Locator>>,
    screen: Arc<Mutex<S>>,
    state: Arc<Mutex<StatusState>>,
    generation: AtomicU64,
    units: UnitSystem,
    want_forecast: bool,
}

impl<S: Screen + Send + 'static> WeatherSession<S> {
    pub fn new(provider: Arc<dyn WeatherProvider>, screen: S) -> Self {
        Self {
            provider,
            locator: None,
            screen: Arc::new(Mutex::new(screen)),
            state: Arc::new(Mutex::new(StatusState::default())),
            generation: AtomicU64::new(0),
            units: UnitSystem::default(),
            want_forecast: false,
        }
    }

    pub fn with_locator(mut self, locator: Arc<dyn Locator>) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn with_forecast(mut self, want_forecast: bool) -> Self {
        self.want_forecast = want_forecast;
        self
    }

    pub fn status(&self) -> UiStatus {
        self.state.lock().status
    }

    pub fn screen(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.screen)
    }

    /// Search by place name. Empty input is rejected without starting
    /// a request.
    pub async fn search(&self, input: &str) {
        let query = match Query::place(input) {
            Ok(query) => query,
            Err(err) => {
                self.report_error(&err);
                return;
            }
        };

        let generation = self.begin();
        self.fetch_and_present(generation, query).await;
    }

    /// Fetch weather for the current position.
    pub async fn locate(&self) {
        let Some(locator) = self.locator.clone() else {
            self.report_error(&WeatherError::Geolocation(GeolocationError::Other(
                "geolocation is not available".to_string(),
            )));
            return;
        };

        let generation = self.begin();

        let position = match locator.current_position().await {
            Ok(position) => position,
            Err(err) => {
                self.finish_error(generation, &err.into());
                return;
            }
        };

        self.fetch_and_present(generation, position.into()).await;
    }

    async fn fetch_and_present(&self, generation: u64, query: Query) {
        match self.provider.current(&query).await {
            Ok(reading) => {
                if self.is_stale(generation) {
                    debug!(generation, "discarding superseded response");
                    return;
                }

                let presented = {
                    let mut screen = self.screen.lock();
                    presenter::present(&mut *screen, &reading, self.units)
                };

                match presented {
                    Ok(()) => self.finish_shown(),
                    Err(err) => {
                        self.finish_error(generation, &err);
                        return;
                    }
                }

                if self.want_forecast {
                    self.fetch_forecast(generation, &query).await;
                }
            }
            Err(err) => self.finish_error(generation, &err),
        }
    }

    /// Forecast is best-effort: failures go to the log sink and never
    /// disturb the current-conditions display.
    async fn fetch_forecast(&self, generation: u64, query: &Query) {
        match self.provider.forecast(query).await {
            Ok(days) => {
                if self.is_stale(generation) {
                    debug!(generation, "discarding superseded forecast");
                    return;
                }
                self.screen.lock().show_forecast(&days);
            }
            Err(err) => warn!(%err, "forecast fetch failed"),
        }
    }

    /// Start a new request: bump the generation and enter loading.
    fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.state.lock().status = UiStatus::Loading;

        let mut screen = self.screen.lock();
        screen.set_busy(true);
        screen.clear_message();
        screen.hide_card();

        generation
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation.load(Ordering::SeqCst)
    }

    fn finish_shown(&self) {
        self.state.lock().status = UiStatus::Shown;

        let mut screen = self.screen.lock();
        screen.set_busy(false);
        screen.clear_message();
    }

    fn finish_error(&self, generation: u64, err: &WeatherError) {
        if self.is_stale(generation) {
            debug!(generation, %err, "discarding error from superseded request");
            return;
        }
        self.report_error(err);
    }

    fn report_error(&self, err: &WeatherError) {
        warn!(%err, "request failed");

        let epoch = {
            let mut state = self.state.lock();
            state.status = UiStatus::Error;
            state.error_epoch += 1;
            state.error_epoch
        };

        {
            let mut screen = self.screen.lock();
            screen.set_busy(false);
            screen.hide_card();
            screen.show_message(&err.to_string());
        }

        self.schedule_clear(epoch);
    }

    /// Clear the message after `ERROR_CLEAR_DELAY` unless a newer
    /// error or a successful request got there first.
    fn schedule_clear(&self, epoch: u64) {
        let state = Arc::clone(&self.state);
        let screen = Arc::clone(&self.screen);

        tokio::spawn(async move {
            tokio::time::sleep(ERROR_CLEAR_DELAY).await;

            let mut state = state.lock();
            if state.error_epoch == epoch && state.status == UiStatus::Error {
                state.status = UiStatus::Idle;
                screen.lock().clear_message();
            }
        });
    }
}
