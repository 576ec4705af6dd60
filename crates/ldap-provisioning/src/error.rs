use crate::config::ConfigError;
use crate::directory::DirectoryError;
use crate::telemetry::TelemetryError;
use crate::workflows::accounts::AdminError;
use crate::workflows::provisioning::ParseError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Parse(ParseError),
    Directory(DirectoryError),
    NotFound(String),
    InvalidInput(String),
    Runtime(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Parse(err) => write!(f, "invalid batch: {}", err),
            AppError::Directory(err) => write!(f, "directory error: {}", err),
            AppError::NotFound(dn) => write!(f, "user not found: {}", dn),
            AppError::InvalidInput(message) => write!(f, "invalid input: {}", message),
            AppError::Runtime(message) => write!(f, "runtime error: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Parse(err) => Some(err),
            AppError::Directory(err) => Some(err),
            AppError::NotFound(_) | AppError::InvalidInput(_) | AppError::Runtime(_) => None,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Parse(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Directory(DirectoryError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
            AppError::Directory(DirectoryError::Rejected { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Runtime(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ParseError> for AppError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<DirectoryError> for AppError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

impl From<AdminError> for AppError {
    fn from(value: AdminError) -> Self {
        match value {
            AdminError::NotFound { dn } => Self::NotFound(dn),
            AdminError::Directory(err) => Self::Directory(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let parse = AppError::from(ParseError::MissingId { line: 2 });
        assert_eq!(parse.status_code(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(AdminError::NotFound {
            dn: "cn=x,ou=users,o=test".into(),
        });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.to_string(), "user not found: cn=x,ou=users,o=test");

        let down = AppError::from(DirectoryError::Unavailable("refused".into()));
        assert_eq!(down.status_code(), StatusCode::BAD_GATEWAY);

        let rejected = AppError::from(DirectoryError::rejected(50));
        assert_eq!(rejected.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
