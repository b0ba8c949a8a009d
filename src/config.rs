use std::env;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONTENTFUL_GRAPHQL_URL: &str = "https://graphql.contentful.com/content/v1";
const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";
const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
const DEFAULT_OPENWEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub page_refresh_secs: u64,
    pub http_timeout: Duration,
    pub branding: BrandingConfig,
    pub display: DisplayConfig,
    // Feature areas (each optional, a missing section disables only that zone)
    pub contentful: Option<ContentfulConfig>,
    pub sheets: Option<SheetsConfig>,
    pub drive: Option<DriveConfig>,
    pub calendar: Option<CalendarConfig>,
    pub weather: Option<WeatherConfig>,
}

#[derive(Debug, Clone)]
pub struct BrandingConfig {
    pub school_name: String,
    pub team_name: String,
}

/// Rotation timings for the kiosk zones.
#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    pub ticker_period: Duration,
    pub gallery_period: Duration,
    pub announcement_period: Duration,
    pub athletics_period: Duration,
    pub transition: Duration,
    pub clock_period: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            ticker_period: Duration::from_millis(3000),
            gallery_period: Duration::from_millis(5000),
            announcement_period: Duration::from_millis(5000),
            athletics_period: Duration::from_millis(5000),
            transition: Duration::from_millis(500),
            clock_period: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentfulConfig {
    pub space_id: String,
    pub delivery_token: String,
    pub environment: String,
    pub graphql_url: String,
}

impl ContentfulConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}",
            self.graphql_url.trim_end_matches('/'),
            self.space_id,
            self.environment
        )
    }
}

/// Google service-account key, as downloaded from the cloud console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.into()
}

// The private key never ends up in logs.
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub credentials: ServiceAccountKey,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub folder_id: String,
    pub credentials: ServiceAccountKey,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub calendar_id: String,
    pub api_key: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    pub location: String,
    pub api_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (process env in
    /// production, a map in tests). Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.into());

        let credentials = get("GOOGLE_CREDENTIALS_JSON").and_then(|raw| {
            match serde_json::from_str::<ServiceAccountKey>(&raw) {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::warn!("GOOGLE_CREDENTIALS_JSON is not a valid service-account key: {}", e);
                    None
                }
            }
        });

        let contentful = match (get("CONTENTFUL_SPACE_ID"), get("CONTENTFUL_DELIVERY_TOKEN")) {
            (Some(space_id), Some(delivery_token)) => Some(ContentfulConfig {
                space_id,
                delivery_token,
                environment: or("CONTENTFUL_ENVIRONMENT", "master"),
                graphql_url: or("CONTENTFUL_GRAPHQL_URL", DEFAULT_CONTENTFUL_GRAPHQL_URL),
            }),
            _ => None,
        };

        let sheets = match (get("GOOGLE_SHEETS_ID"), credentials.clone()) {
            (Some(spreadsheet_id), Some(credentials)) => Some(SheetsConfig {
                spreadsheet_id,
                credentials,
                api_url: or("GOOGLE_SHEETS_API_URL", DEFAULT_SHEETS_API_URL),
            }),
            _ => None,
        };

        let drive = match (get("GOOGLE_DRIVE_FOLDER_ID"), credentials) {
            (Some(folder_id), Some(credentials)) => Some(DriveConfig {
                folder_id,
                credentials,
                api_url: or("GOOGLE_DRIVE_API_URL", DEFAULT_DRIVE_API_URL),
            }),
            _ => None,
        };

        let calendar = match (get("GOOGLE_CALENDAR_ID"), get("GOOGLE_CALENDAR_API_KEY")) {
            (Some(calendar_id), Some(api_key)) => Some(CalendarConfig {
                calendar_id,
                api_key,
                api_url: or("GOOGLE_CALENDAR_API_URL", DEFAULT_CALENDAR_API_URL),
            }),
            _ => None,
        };

        let weather = get("OPENWEATHER_API_KEY").map(|api_key| WeatherConfig {
            api_key,
            location: or("WEATHER_LOCATION", "Elmwood Park,IL,US"),
            api_url: or("OPENWEATHER_API_URL", DEFAULT_OPENWEATHER_API_URL),
        });

        let defaults = DisplayConfig::default();
        let millis = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            match get(key) {
                Some(v) => Ok(Duration::from_millis(v.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid value for {}: {}", key, v)
                })?)),
                None => Ok(default),
            }
        };
        let display = DisplayConfig {
            ticker_period: millis("TICKER_PERIOD_MS", defaults.ticker_period)?,
            gallery_period: millis("GALLERY_PERIOD_MS", defaults.gallery_period)?,
            announcement_period: millis("ANNOUNCEMENT_PERIOD_MS", defaults.announcement_period)?,
            athletics_period: millis("ATHLETICS_PERIOD_MS", defaults.athletics_period)?,
            transition: millis("TRANSITION_MS", defaults.transition)?,
            clock_period: defaults.clock_period,
        };
        let two_transitions = display
            .transition
            .checked_mul(2)
            .ok_or_else(|| anyhow::anyhow!("TRANSITION_MS is out of range"))?;
        for (key, period) in [
            ("TICKER_PERIOD_MS", display.ticker_period),
            ("GALLERY_PERIOD_MS", display.gallery_period),
            ("ANNOUNCEMENT_PERIOD_MS", display.announcement_period),
            ("ATHLETICS_PERIOD_MS", display.athletics_period),
        ] {
            if period <= two_transitions {
                anyhow::bail!(
                    "{} ({} ms) must be longer than two transitions ({} ms)",
                    key,
                    period.as_millis(),
                    two_transitions.as_millis()
                );
            }
        }

        Ok(Self {
            host: or("HOST", "0.0.0.0"),
            port: or("PORT", "3000").parse()?,
            static_dir: or("STATIC_DIR", "static"),
            page_refresh_secs: or("PAGE_REFRESH_SECS", "900").parse()?,
            http_timeout: Duration::from_secs(or("HTTP_TIMEOUT_SECS", "10").parse()?),
            branding: BrandingConfig {
                school_name: or("SCHOOL_NAME", "SCS News"),
                team_name: or("TEAM_NAME", "Celtics"),
            },
            display,
            contentful,
            sheets,
            drive,
            calendar,
            weather,
        })
    }

    /// Names of the feature areas that have complete configuration.
    pub fn enabled_features(&self) -> Vec<&'static str> {
        let mut features = Vec::new();
        if self.contentful.is_some() {
            features.push("contentful");
        }
        if self.sheets.is_some() {
            features.push("sheets");
        }
        if self.drive.is_some() {
            features.push("drive");
        }
        if self.calendar.is_some() {
            features.push("calendar");
        }
        if self.weather.is_some() {
            features.push("weather");
        }
        features
    }
}
