//! # Ports
//!
//! Contracts this layer depends on. Adapters implement them; the service
//! layer only ever sees the traits. All of them are mocked with `mockall`
//! for tests (behind the `testing` feature for external crates).

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{
    CommentData, CommentDraft, CommentPatch, ContentRef, Course, CourseKey, ForumEvent, ForumRole,
    ProfileMap, ThreadCounts, ThreadData, ThreadDraft, ThreadPage, ThreadPatch, ThreadQuery,
    ThreadRetrieveOptions,
};

/// Client for the remote comment-storage service. Pure CRUD plus the
/// side-effecting per-user calls (follow, vote, flag, pin, mark-read).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentClient: Send + Sync {
    async fn retrieve_thread(
        &self,
        thread_id: &str,
        opts: ThreadRetrieveOptions,
    ) -> Result<ThreadData, ClientError>;

    async fn retrieve_comment(&self, comment_id: &str) -> Result<CommentData, ClientError>;

    async fn search_threads(&self, query: ThreadQuery) -> Result<ThreadPage, ClientError>;

    /// Threads the given user follows, filtered/paged by the same query shape.
    async fn subscribed_threads(
        &self,
        user_id: &str,
        query: ThreadQuery,
    ) -> Result<ThreadPage, ClientError>;

    async fn create_thread(&self, draft: ThreadDraft) -> Result<ThreadData, ClientError>;

    async fn update_thread(
        &self,
        thread_id: &str,
        patch: ThreadPatch,
    ) -> Result<ThreadData, ClientError>;

    async fn delete_thread(&self, thread_id: &str) -> Result<(), ClientError>;

    async fn create_comment(&self, draft: CommentDraft) -> Result<CommentData, ClientError>;

    async fn update_comment(
        &self,
        comment_id: &str,
        patch: CommentPatch,
    ) -> Result<CommentData, ClientError>;

    async fn delete_comment(&self, comment_id: &str) -> Result<(), ClientError>;

    async fn follow(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError>;

    async fn unfollow(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError>;

    async fn flag_abuse(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError>;

    async fn unflag_abuse(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError>;

    async fn vote(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError>;

    async fn unvote(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError>;

    async fn pin_thread(&self, user_id: &str, thread_id: &str) -> Result<(), ClientError>;

    async fn unpin_thread(&self, user_id: &str, thread_id: &str) -> Result<(), ClientError>;

    async fn mark_read(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError>;

    /// Per-commentable thread-type tallies for a whole course.
    async fn commentable_counts(
        &self,
        course: &CourseKey,
    ) -> Result<HashMap<String, ThreadCounts>, ClientError>;
}

/// Course structure, enrollment/access, roles, and cohort assignment.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn course(&self, key: &CourseKey) -> anyhow::Result<Option<Course>>;

    async fn has_access(&self, username: &str, key: &CourseKey) -> anyhow::Result<bool>;

    async fn user_roles(
        &self,
        username: &str,
        key: &CourseKey,
    ) -> anyhow::Result<HashSet<ForumRole>>;

    /// The requester's cohort group id for the course, if assigned.
    async fn group_for_user(
        &self,
        username: &str,
        key: &CourseKey,
    ) -> anyhow::Result<Option<i64>>;
}

/// Username to internal user-id resolution. Injected so callers never reach
/// for a global identity singleton.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_id_for_username(&self, username: &str) -> anyhow::Result<Option<String>>;
}

/// Batch account-profile lookup.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profiles(&self, usernames: &[String]) -> anyhow::Result<ProfileMap>;
}

/// Downstream event publication. Fire-and-continue: implementations must not
/// let a failed publish affect the request; they log and move on.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: ForumEvent);
}
