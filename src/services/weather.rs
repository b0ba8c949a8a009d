use reqwest::Client;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::error::FetchError;
use crate::models::weather::WeatherSnapshot;
use crate::services::upstream;

pub const SERVICE: &str = "openweather";

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainReading,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReading {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
    icon: String,
}

pub struct WeatherService {
    client: Client,
    config: Option<WeatherConfig>,
}

impl WeatherService {
    pub fn new(client: Client, config: Option<WeatherConfig>) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Current conditions for the configured location, in imperial units.
    /// The snapshot is all-or-nothing: a reading without a condition is
    /// rejected.
    pub async fn try_current(&self) -> Result<Option<WeatherSnapshot>, FetchError> {
        let config = self
            .config
            .as_ref()
            .ok_or(FetchError::NotConfigured("weather"))?;

        let response = self
            .client
            .get(format!("{}/weather", config.api_url.trim_end_matches('/')))
            .query(&[
                ("q", config.location.as_str()),
                ("units", "imperial"),
                ("appid", config.api_key.as_str()),
            ])
            .send()
            .await?;
        let current: CurrentWeather = upstream::read_json(SERVICE, response).await?;

        let condition = current
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::malformed(SERVICE, "no weather condition"))?;
        Ok(Some(WeatherSnapshot {
            temperature: current.main.temp.round() as i32,
            description: condition.description,
            icon: condition.icon,
        }))
    }

    pub async fn current(&self) -> Option<WeatherSnapshot> {
        upstream::or_default(SERVICE, self.try_current().await)
    }
}
