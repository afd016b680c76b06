//! Translation of domain errors into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::{DiscussionError, ValidationErrors};
use serde_json::json;
use tracing::error;

/// Everything a handler can fail with. Domain failures carry their own
/// classification; the two extra variants exist only at the wire boundary.
#[derive(Debug)]
pub enum ApiError {
    /// The gateway headers identifying the requester were missing.
    Unauthorized,
    /// The request body or query string could not be parsed at all.
    Malformed(String),
    Domain(DiscussionError),
}

impl From<DiscussionError> for ApiError {
    fn from(err: DiscussionError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Domain(DiscussionError::Validation(err))
    }
}

fn developer_message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "developer_message": message }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => developer_message(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            ),
            ApiError::Malformed(detail) => developer_message(StatusCode::BAD_REQUEST, &detail),
            ApiError::Domain(err) => domain_response(err),
        }
    }
}

fn domain_response(err: DiscussionError) -> Response {
    match err {
        DiscussionError::Validation(errors) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "field_errors": errors }))).into_response()
        }
        DiscussionError::CourseNotFound
        | DiscussionError::DiscussionDisabled
        | DiscussionError::ThreadNotFound
        | DiscussionError::CommentNotFound
        | DiscussionError::DiscussionNotFound { .. }
        | DiscussionError::PageNotFound => {
            developer_message(StatusCode::NOT_FOUND, &err.to_string())
        }
        DiscussionError::PermissionDenied { detail } => developer_message(
            StatusCode::FORBIDDEN,
            detail.as_deref().unwrap_or("You do not have permission to perform this action."),
        ),
        DiscussionError::Blackout => {
            developer_message(StatusCode::FORBIDDEN, &err.to_string())
        }
        DiscussionError::Internal(source) => {
            error!(error = ?source, "request failed");
            developer_message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err: ApiError = ValidationErrors::single("title", "This field is required.").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn lookup_failures_map_to_not_found() {
        for err in [
            DiscussionError::CourseNotFound,
            DiscussionError::ThreadNotFound,
            DiscussionError::PageNotFound,
        ] {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn permission_denied_maps_to_forbidden() {
        let response = ApiError::from(DiscussionError::permission_denied()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
