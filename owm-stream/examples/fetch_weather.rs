// SPDX-License-Identifier: Apache-2.0

//! Fetches current conditions and the next forecasts over plain HTTP.
//!
//! ```text
//! OWM_APP_ID=... cargo run -p owm-stream --features std --example fetch_weather -- Zurich,CH
//! ```

use std::env;
use std::process;
use std::time::Duration;

use owm_stream::{
    ClientConfig, CurrentWeather, Forecast, HourFilter, Location, SystemClock, TcpTransport,
    WeatherClient,
};

fn main() {
    env_logger::init();

    let Ok(app_id) = env::var("OWM_APP_ID") else {
        eprintln!("Error: OWM_APP_ID is not set");
        process::exit(1);
    };
    let city = env::args().nth(1).unwrap_or_else(|| "Zurich,CH".to_string());

    let config = ClientConfig::default();
    let connect_timeout = Duration::from_millis(config.idle_timeout_ms());
    let mut client = WeatherClient::new(
        TcpTransport::new().with_connect_timeout(connect_timeout),
        SystemClock::new(),
        config,
    );

    let mut current = CurrentWeather::default();
    match client.update_current(&mut current, &app_id, Location::Name(&city)) {
        Ok(()) => println!(
            "{}, {}: {} {:.1}°C ({}) humidity {}%",
            current.city_name,
            current.country,
            current.condition.icon_glyph,
            current.temp,
            current.condition.description,
            current.humidity
        ),
        Err(e) => eprintln!("Current weather: {e}"),
    }

    let mut forecasts: [Forecast; 4] = Default::default();
    let hours = HourFilter::from_hours(&[0, 6, 12, 18]);
    let filled = match client.update_forecasts(&mut forecasts, &app_id, Location::Name(&city), &hours)
    {
        Ok(filled) => filled,
        Err(e) => {
            eprintln!("Forecast: {e}");
            e.filled
        }
    };
    for forecast in &forecasts[..filled] {
        println!(
            "{} {} {:.1}°C rain {:.1} mm",
            forecast.observation_time_text,
            forecast.condition.icon_glyph,
            forecast.temp,
            forecast.rain
        );
    }
}
