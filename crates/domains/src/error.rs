//! # Error taxonomy
//!
//! Every failure surfaced by the API layer maps to one of these kinds.
//! Opaque comment-service request failures are reinterpreted at the boundary
//! (inputs are pre-validated, so a failed retrieve means "not found").

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Failure of a request against the remote comment-storage service.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("comment service returned status {0}")]
    Status(u16),
    #[error("comment service transport error: {0}")]
    Transport(String),
    #[error("comment service returned malformed payload: {0}")]
    Malformed(String),
}

/// Aggregated field-level validation failures. Multiple fields are reported
/// together rather than failing fast on the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn messages_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finish a validation pass: `Ok` if nothing accumulated.
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (field, messages) in &self.errors {
            write!(f, "; {}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// The primary error type for all discussion API operations.
#[derive(Error, Debug)]
pub enum DiscussionError {
    #[error("course not found")]
    CourseNotFound,

    #[error("discussion is disabled for the course")]
    DiscussionDisabled,

    #[error("thread not found")]
    ThreadNotFound,

    #[error("comment not found")]
    CommentNotFound,

    /// One or more requested topic ids do not exist in the course.
    #[error("discussion not found for '{}'", missing_ids.join(", "))]
    DiscussionNotFound { missing_ids: Vec<String> },

    #[error("page not found (no results on this page)")]
    PageNotFound,

    #[error("{}", detail.as_deref().unwrap_or("permission denied"))]
    PermissionDenied { detail: Option<String> },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("discussion is in blackout period")]
    Blackout,

    /// Adapter faults that are not reinterpretable as a domain condition.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DiscussionError {
    pub fn permission_denied() -> Self {
        DiscussionError::PermissionDenied { detail: None }
    }

    pub fn permission_denied_with(detail: impl Into<String>) -> Self {
        DiscussionError::PermissionDenied {
            detail: Some(detail.into()),
        }
    }
}

/// A specialized Result type for discussion API operations.
pub type Result<T> = std::result::Result<T, DiscussionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_aggregate_across_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "This field is required.");
        errors.add("raw_body", "This field is required.");
        errors.add("title", "This field may not be blank.");

        assert_eq!(errors.messages_for("title").len(), 2);
        assert_eq!(errors.fields().count(), 2);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn discussion_not_found_names_missing_ids() {
        let err = DiscussionError::DiscussionNotFound {
            missing_ids: vec!["t3".into(), "t9".into()],
        };
        assert_eq!(err.to_string(), "discussion not found for 't3, t9'");
    }
}
