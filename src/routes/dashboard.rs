use axum::{extract::State, response::Html};
use chrono::Local;

use crate::{
    services::{dashboard, render},
    AppState,
};

/// GET /: the kiosk page, rendered from a fresh snapshot on every request.
pub async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    let snapshot = dashboard::load(&state, Local::now()).await;
    Html(render::page(&snapshot, &state.config))
}
