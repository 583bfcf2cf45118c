use shared::error::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("credential rejected by {endpoint}: {}", detail_or(.detail, "unauthorized"))]
    Auth {
        endpoint: String,
        detail: Option<String>,
    },
    #[error("{endpoint} reported not found")]
    NotFound { endpoint: String },
    #[error("{endpoint} failed ({}): {detail}", status_label(.status))]
    Service {
        endpoint: String,
        status: Option<u16>,
        detail: String,
    },
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
    #[error("invalid input: {0}")]
    Validation(String),
}

fn detail_or<'a>(detail: &'a Option<String>, fallback: &'a str) -> &'a str {
    detail.as_deref().unwrap_or(fallback)
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no response".to_string(),
    }
}

impl ClientError {
    /// Network, TLS and decode failures below HTTP all count as service errors.
    pub fn transport(endpoint: impl Into<String>, err: reqwest::Error) -> Self {
        ClientError::Service {
            endpoint: endpoint.into(),
            status: err.status().map(|status| status.as_u16()),
            detail: err.to_string(),
        }
    }

    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        ClientError::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorCode {
        match self {
            ClientError::Auth { .. } => ErrorCode::Unauthorized,
            ClientError::NotFound { .. } => ErrorCode::NotFound,
            ClientError::Service { .. } => ErrorCode::Service,
            ClientError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            ClientError::Validation(_) => ErrorCode::Validation,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}
