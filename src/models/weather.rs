use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeatherSnapshot {
    /// Degrees Fahrenheit, rounded.
    pub temperature: i32,
    pub description: String,
    pub icon: String,
}

impl WeatherSnapshot {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}
