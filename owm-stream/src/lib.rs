// SPDX-License-Identifier: Apache-2.0

//! Streaming decoder for OpenWeatherMap current-weather and forecast responses.
//!
//! Responses are never held in memory. Bytes flow from a [`Transport`] through a
//! [`jsonlex::Tokenizer`] into a listener that recognises a fixed set of field
//! names and writes their values straight into caller-owned records. Working
//! memory is a few small fixed buffers regardless of response size.
//!
//! ```
//! use owm_stream::{decode_current, CurrentWeather};
//!
//! let payload = br#"{"weather":[{"id":521,"icon":"09d"}],"main":{"temp":290.56}}"#;
//! let mut current = CurrentWeather::default();
//! decode_current(payload, &mut current).unwrap();
//! assert_eq!(current.condition.weather_id, 521);
//! assert_eq!(current.temp, 290.56);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

// Compile-time capacity validation
mod config_check;

mod client;
pub mod coerce;
mod config;
mod context;
mod current;
mod error;
mod forecast;
pub mod icons;
pub mod keys;
mod model;
mod request;
mod transport;

pub use client::{decode_current, decode_forecasts, WeatherClient};
pub use config::{ClientConfig, Units};
pub use context::HourFilter;
pub use error::{FetchError, ForecastError};
pub use model::{Condition, CurrentWeather, Forecast};
pub use request::{Endpoint, Location};
pub use transport::{Clock, Transport};

#[cfg(feature = "std")]
pub use transport::{SystemClock, TcpTransport};
