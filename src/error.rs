use reqwest::StatusCode;

/// Failure of one upstream accessor. Public accessors log it and fall back to
/// an empty value; the JSON routes report it in the response envelope.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response from {service}: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),
}

impl FetchError {
    pub fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            service,
            reason: reason.into(),
        }
    }

    /// Short label used for the `outcome` metric dimension.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::Upstream { .. } => "upstream_error",
            Self::Malformed { .. } => "malformed",
            Self::Http(_) => "transport_error",
            Self::Auth(_) => "auth_error",
        }
    }
}
