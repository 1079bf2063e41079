//! HTTP error mapping.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use derive_more::{Display, Error};
use tracing::{error, warn};

use crate::{ErrorResponse, ServiceError};

/// Error returned by a handler, rendered as `{success: false, error}`.
#[derive(Debug, Clone, Display, Error)]
pub enum ApiError {
    /// 400: the request was malformed or failed validation.
    #[display("{message}")]
    BadRequest {
        /// Reason shown to the caller.
        message: String,
    },
    /// 404: the referenced player does not exist.
    #[display("{message}")]
    NotFound {
        /// Reason shown to the caller.
        message: String,
    },
    /// 500: storage or runtime failure.
    #[display("{message}")]
    Internal {
        /// Reason shown to the caller.
        message: String,
    },
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid { .. } => Self::BadRequest {
                message: err.to_string(),
            },
            ServiceError::PlayerNotFound { .. } => Self::NotFound {
                message: err.to_string(),
            },
            ServiceError::Storage(db) => {
                error!(error = %db, "Storage failure");
                Self::internal(db.message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        // A missing parameter means the route table and handler disagree.
        if rejection.status().is_server_error() {
            error!(error = %rejection.body_text(), "Path extraction failed");
            return Self::internal(rejection.body_text());
        }
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            warn!(%status, error = %self, "Request rejected");
        }
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
