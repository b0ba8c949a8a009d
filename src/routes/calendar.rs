use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::{
    models::{api::ApiResponse, calendar::CalendarEvent},
    services::{calendar, upstream},
    AppState,
};

#[derive(Debug, Default, Serialize)]
pub struct CalendarData {
    pub events: Vec<CalendarEvent>,
}

/// GET /api/calendar: events of the next seven days.
pub async fn get_calendar(State(state): State<AppState>) -> Json<ApiResponse<CalendarData>> {
    let result = state
        .calendar
        .try_upcoming_events(Utc::now())
        .await
        .map(|events| CalendarData { events });
    Json(upstream::envelope(calendar::SERVICE, result))
}
