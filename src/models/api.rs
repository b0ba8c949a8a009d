use serde::Serialize;

use crate::error::FetchError;

/// Body of every `/api/*` response. Always sent with HTTP 200; `ok` and
/// `error` tell the client whether `data` is real or the empty fallback.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: T,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data,
            error: None,
        }
    }
}

impl<T: Default> ApiResponse<T> {
    pub fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self {
                ok: false,
                data: T::default(),
                error: Some(e.to_string()),
            },
        }
    }
}
