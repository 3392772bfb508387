use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthFailure {
    CredentialsRequired,
    CredentialsBadFormat,
    InvalidToken,
}

impl AuthFailure {
    pub fn code(self) -> &'static str {
        match self {
            AuthFailure::CredentialsRequired => "credentials_required",
            AuthFailure::CredentialsBadFormat => "credentials_bad_format",
            AuthFailure::InvalidToken => "invalid_token",
        }
    }

    fn message(self) -> &'static str {
        match self {
            AuthFailure::CredentialsRequired => "No authorization token was found",
            AuthFailure::CredentialsBadFormat => {
                "Format is Authorization: Bearer [token]"
            }
            AuthFailure::InvalidToken => "Invalid token",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{}", .0.message())]
    Unauthorized(AuthFailure),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] crm_db::Error),
}

#[derive(serde::Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn missing_parameter(action: &str) -> Self {
        ApiError::BadRequest(format!("Can not {action}, at least one missing parameter"))
    }

    pub fn status_code(&self) -> StatusCode {
        use crm_db::Error as Db;
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(err) => match err {
                Db::Query(_) | Db::Status(_) => StatusCode::BAD_REQUEST,
                Db::NotFound { .. } => StatusCode::NOT_FOUND,
                Db::Conflict { .. } | Db::CustomerMissing(_) => StatusCode::CONFLICT,
                Db::MultipleMatches { .. } | Db::GetConnectionPool(_) | Db::Result(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn public_message(&self) -> String {
        match self {
            // driver details stay in the log
            ApiError::Store(crm_db::Error::GetConnectionPool(_) | crm_db::Error::Result(_)) => {
                "Error when accessing the data store".to_owned()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = ErrorBody {
            status: status.as_u16(),
            message: self.public_message(),
            code: match self {
                ApiError::Unauthorized(failure) => Some(failure.code()),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}
