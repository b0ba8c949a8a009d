use axum::{extract::State, Json};

use crate::{
    models::{api::ApiResponse, weather::WeatherSnapshot},
    services::{upstream, weather},
    AppState,
};

/// GET /api/weather
pub async fn get_weather(State(state): State<AppState>) -> Json<ApiResponse<Option<WeatherSnapshot>>> {
    let result = state.weather.try_current().await;
    Json(upstream::envelope(weather::SERVICE, result))
}
