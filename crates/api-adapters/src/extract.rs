//! Requester identity extraction.
//!
//! The service sits behind an authenticating gateway that forwards the
//! caller's identity in trusted headers. A request without both headers is
//! rejected before any handler logic runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use domains::Requester;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-forum-user-id";
pub const USERNAME_HEADER: &str = "x-forum-username";

/// The authenticated requester, pulled from gateway headers.
#[derive(Debug, Clone)]
pub struct Identity(pub Requester);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        match (header(USER_ID_HEADER), header(USERNAME_HEADER)) {
            (Some(id), Some(username)) => Ok(Identity(Requester { id, username })),
            _ => Err(ApiError::Unauthorized),
        }
    }
}
