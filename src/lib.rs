// Library exports for the server, the operator CLI and tests
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use services::calendar::CalendarService;
use services::contentful::ContentfulService;
use services::drive::DriveService;
use services::sheets::SheetsService;
use services::weather::WeatherService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub contentful: Arc<ContentfulService>,
    pub sheets: Arc<SheetsService>,
    pub drive: Arc<DriveService>,
    pub calendar: Arc<CalendarService>,
    pub weather: Arc<WeatherService>,
}

impl AppState {
    /// Wire every accessor to one shared HTTP client. Unconfigured feature
    /// areas still get a service; it answers with its fallback value.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = services::upstream::build_client(config.http_timeout)?;
        Ok(Self {
            contentful: Arc::new(ContentfulService::new(client.clone(), config.contentful.clone())),
            sheets: Arc::new(SheetsService::new(client.clone(), config.sheets.clone())),
            drive: Arc::new(DriveService::new(client.clone(), config.drive.clone())),
            calendar: Arc::new(CalendarService::new(client.clone(), config.calendar.clone())),
            weather: Arc::new(WeatherService::new(client, config.weather.clone())),
            config: Arc::new(config),
        })
    }
}
