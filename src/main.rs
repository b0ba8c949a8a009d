use axum::http::{header, Method};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scs_tv::{config::Config, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    for (feature, enabled) in [
        ("Contentful", config.contentful.is_some()),
        ("Google Sheets", config.sheets.is_some()),
        ("Google Drive", config.drive.is_some()),
        ("Google Calendar", config.calendar.is_some()),
        ("OpenWeatherMap", config.weather.is_some()),
    ] {
        if enabled {
            info!("{} configured", feature);
        } else {
            info!("{} not configured, its zone will stay empty", feature);
        }
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config)?;

    // The page and its JSON proxies are read-only; any origin may fetch them.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([header::ACCEPT, header::CONTENT_TYPE]))
        .allow_origin(Any);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    info!("SCS TV listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
