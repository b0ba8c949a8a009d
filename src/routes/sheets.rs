use axum::{extract::State, Json};
use chrono::Local;

use crate::{
    models::{
        api::ApiResponse,
        schedule::{ScheduleEntry, SheetData},
    },
    services::{schedule, sheets, upstream},
    AppState,
};

/// GET /api/sheets-data: every tab as header-keyed rows.
pub async fn get_sheets_data(State(state): State<AppState>) -> Json<ApiResponse<SheetData>> {
    let result = state.sheets.try_all_tabs().await;
    Json(upstream::envelope(sheets::SERVICE, result))
}

/// GET /api/schedule: spreadsheet rows and ticker games inside the rolling
/// window, in start order. Each source degrades on its own, so this always
/// succeeds.
pub async fn get_schedule(State(state): State<AppState>) -> Json<ApiResponse<Vec<ScheduleEntry>>> {
    let (tabs, ticker) = tokio::join!(state.sheets.all_tabs(), state.contentful.sports_ticker());
    let entries = schedule::derive_schedule(&tabs, ticker.as_ref(), Local::now().naive_local());
    Json(ApiResponse::ok(entries))
}
