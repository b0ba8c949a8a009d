use axum::{extract::State, Json};
use chrono::Local;

use crate::{
    models::{announcement::AnnouncementBuckets, api::ApiResponse, sports::SportsTicker},
    services::{contentful, upstream},
    AppState,
};

/// GET /api/announcements: live announcements split into school and athletics.
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Json<ApiResponse<AnnouncementBuckets>> {
    let result = state
        .contentful
        .try_announcements(Local::now().fixed_offset())
        .await
        .map(AnnouncementBuckets::partition);
    Json(upstream::envelope(contentful::ANNOUNCEMENTS, result))
}

/// GET /api/sports-ticker: teams and games as entered, `null` when absent.
pub async fn get_sports_ticker(
    State(state): State<AppState>,
) -> Json<ApiResponse<Option<SportsTicker>>> {
    let result = state.contentful.try_sports_ticker().await;
    Json(upstream::envelope(contentful::SPORTS_TICKER, result))
}
