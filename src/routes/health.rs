use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Liveness plus the feature areas that have complete configuration.
/// Upstreams are not probed.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "features": state.config.enabled_features(),
    }))
}
