//! Request-handling logic for the course discussion forum API.
//!
//! Each public operation on [`DiscussionService`] runs to completion within
//! one inbound request: resolve the course and the requester's privilege,
//! call the remote comment-storage service through its port, shape the result
//! into an API payload, and optionally enrich it with account profiles. No
//! state is held here beyond the injected port handles.

use std::sync::Arc;

use domains::{CommentClient, CourseStore, EventSink, ProfileStore, UserDirectory};
use url::Url;

pub mod actions;
pub mod comments;
pub mod context;
pub mod enrich;
pub mod pagination;
pub mod permissions;
pub mod requests;
pub mod serialize;
pub mod threads;
pub mod topics;
pub mod urls;

pub use context::{Context, CourseInfo};
pub use pagination::Page;
pub use requests::{
    CommentCreateRequest, CommentUpdateRequest, RequestedFields, ThreadCreateRequest,
    ThreadListParams, ThreadOrdering, ThreadUpdateRequest, ViewFilter,
};
pub use serialize::{CommentView, ThreadView};
pub use threads::ThreadListPage;
pub use topics::{CourseTopicsView, TopicView};

/// The orchestration facade. One instance serves all requests; per-request
/// identity arrives as a [`domains::Requester`] argument on every operation.
pub struct DiscussionService {
    pub(crate) courses: Arc<dyn CourseStore>,
    pub(crate) client: Arc<dyn CommentClient>,
    pub(crate) users: Arc<dyn UserDirectory>,
    pub(crate) profiles: Arc<dyn ProfileStore>,
    pub(crate) events: Arc<dyn EventSink>,
    /// Base URL the API is served under; used for pagination and topic links.
    pub(crate) api_base: Url,
}

impl DiscussionService {
    pub fn new(
        courses: Arc<dyn CourseStore>,
        client: Arc<dyn CommentClient>,
        users: Arc<dyn UserDirectory>,
        profiles: Arc<dyn ProfileStore>,
        events: Arc<dyn EventSink>,
        api_base: Url,
    ) -> Self {
        Self {
            courses,
            client,
            users,
            profiles,
            events,
            api_base,
        }
    }
}

/// Reinterpret a comment-service failure that is not a pre-validated lookup
/// (create/update/side-effect calls) as an internal fault.
pub(crate) fn internal(err: domains::ClientError) -> domains::DiscussionError {
    domains::DiscussionError::Internal(anyhow::Error::new(err))
}
