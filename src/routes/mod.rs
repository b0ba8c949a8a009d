pub mod announcements;
pub mod calendar;
pub mod dashboard;
pub mod health;
pub mod media;
pub mod metrics;
pub mod sheets;
pub mod weather;
pub mod websocket;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::AppState;

/// Every route of the kiosk server. Cross-cutting layers are added by the
/// binary.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(dashboard::dashboard_page))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        // JSON proxies
        .route("/api/announcements", get(announcements::list_announcements))
        .route("/api/sports-ticker", get(announcements::get_sports_ticker))
        .route("/api/gallery", get(media::get_gallery))
        .route("/api/drive-images", get(media::list_drive_images))
        .route("/api/sheets-data", get(sheets::get_sheets_data))
        .route("/api/schedule", get(sheets::get_schedule))
        .route("/api/calendar", get(calendar::get_calendar))
        .route("/api/weather", get(weather::get_weather))
        // Display session
        .route("/ws/display", get(websocket::display_ws_handler))
        .nest_service("/static", static_files)
        .with_state(state)
}
