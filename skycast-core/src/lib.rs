//! Core library for the `skycast` weather widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider client and location resolution
//! - The presenter/screen abstraction and the request session that
//!   drives loading/shown/error states around each fetch
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod presenter;
pub mod provider;
pub mod session;

pub use config::{ClientOptions, Config, Theme};
pub use error::{GeolocationError, WeatherError};
pub use location::{IpLocator, Locator, Position};
pub use model::{ForecastEntry, Query, UnitSystem, WeatherReading};
pub use presenter::{Field, Screen};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use session::{UiStatus, WeatherSession};
