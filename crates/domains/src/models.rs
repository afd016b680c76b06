//! # Domain Models
//!
//! Course structure, discussion topics, and the wire records exchanged with
//! the remote comment-storage service. Thread and comment ids are opaque
//! strings minted by that service.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque course identifier (e.g., "course-v1:Org+Course+Run").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseKey(pub String);

impl CourseKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A date range during which non-privileged users may not post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackoutWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BlackoutWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// A discussion topic attached to a courseware unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursewareTopic {
    pub id: String,
    /// Category (e.g., "Week 1") the unit belongs to; topics are grouped by it.
    pub category: String,
    /// Display name of the unit's discussion target.
    pub title: String,
    pub sort_key: Option<String>,
}

/// A course-level discussion topic not tied to any courseware unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreestandingTopic {
    pub id: String,
    pub name: String,
    pub sort_key: Option<String>,
}

/// Cohort/group division configuration for a course's discussions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DivisionSettings {
    pub enabled: bool,
    /// Commentable ids explicitly divided by group.
    pub divided_commentables: HashSet<String>,
    /// When set, courseware-linked (inline) topics are divided even if not
    /// listed in `divided_commentables`.
    pub always_divide_inline_discussions: bool,
}

/// Course record as far as this layer is concerned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub key: CourseKey,
    pub discussion_enabled: bool,
    pub allow_anonymous: bool,
    pub allow_anonymous_to_peers: bool,
    pub blackouts: Vec<BlackoutWindow>,
    pub courseware_topics: Vec<CoursewareTopic>,
    pub freestanding_topics: Vec<FreestandingTopic>,
    pub division: DivisionSettings,
}

impl Course {
    /// Whether the given commentable is restricted to the viewer's group.
    pub fn is_commentable_divided(&self, commentable_id: &str) -> bool {
        if !self.division.enabled {
            return false;
        }
        if self.division.divided_commentables.contains(commentable_id) {
            return true;
        }
        self.division.always_divide_inline_discussions
            && self
                .courseware_topics
                .iter()
                .any(|t| t.id == commentable_id)
    }

    /// Whether posting is open at `at` for a requester of the given privilege.
    /// Privileged users post through blackout windows.
    pub fn discussion_open(&self, at: DateTime<Utc>, privileged: bool) -> bool {
        privileged || !self.blackouts.iter().any(|w| w.contains(at))
    }
}

/// Per-course forum role. The first three are privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForumRole {
    #[serde(rename = "Administrator")]
    Administrator,
    #[serde(rename = "Moderator")]
    Moderator,
    #[serde(rename = "Community TA")]
    CommunityTa,
    #[serde(rename = "Student")]
    Student,
}

impl ForumRole {
    pub fn is_privileged(self) -> bool {
        matches!(
            self,
            ForumRole::Administrator | ForumRole::Moderator | ForumRole::CommunityTa
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ForumRole::Administrator => "Administrator",
            ForumRole::Moderator => "Moderator",
            ForumRole::CommunityTa => "Community TA",
            ForumRole::Student => "Student",
        }
    }
}

/// The authenticated user a request is being handled for. Identity is
/// resolved upstream; anonymous requests never reach this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub id: String,
    pub username: String,
}

/// The two kinds of thread the comment service distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadType {
    Discussion,
    Question,
}

impl Default for ThreadType {
    fn default() -> Self {
        ThreadType::Discussion
    }
}

impl ThreadType {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreadType::Discussion => "discussion",
            ThreadType::Question => "question",
        }
    }
}

/// Thread record as returned by the comment service.
///
/// Response collections are populated only when the thread was retrieved
/// `with_responses`: discussion threads fill `children`/`resp_total`,
/// question threads fill the endorsed/non-endorsed pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadData {
    pub id: String,
    pub course_id: String,
    pub commentable_id: String,
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub thread_type: ThreadType,
    pub title: String,
    pub body: String,
    pub group_id: Option<i64>,
    pub closed: bool,
    pub pinned: bool,
    pub read: bool,
    pub following: bool,
    pub abuse_flagged: bool,
    pub voted: bool,
    pub vote_count: i64,
    pub comment_count: u64,
    pub unread_comment_count: u64,
    /// Present only on privileged listings requesting flag counts.
    pub abuse_flagged_count: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub children: Vec<CommentData>,
    #[serde(default)]
    pub resp_total: u64,
    #[serde(default)]
    pub endorsed_responses: Vec<CommentData>,
    #[serde(default)]
    pub non_endorsed_responses: Vec<CommentData>,
    #[serde(default)]
    pub non_endorsed_resp_total: u64,
}

/// Comment record as returned by the comment service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentData {
    pub id: String,
    pub thread_id: String,
    pub parent_id: Option<String>,
    pub user_id: String,
    pub username: String,
    pub body: String,
    pub endorsed: bool,
    pub endorsed_by: Option<String>,
    pub endorsed_at: Option<DateTime<Utc>>,
    pub abuse_flagged: bool,
    pub voted: bool,
    pub vote_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub children: Vec<CommentData>,
}

/// Per-topic tallies of each thread type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadCounts {
    pub discussion: u64,
    pub question: u64,
}

/// Options for a thread retrieve call against the comment service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadRetrieveOptions {
    pub with_responses: bool,
    pub recursive: bool,
    pub mark_as_read: bool,
    /// Requesting user, for per-user read/vote state on the record.
    pub user_id: Option<String>,
    pub response_skip: Option<u64>,
    pub response_limit: Option<u64>,
}

/// Sort vocabulary of the comment service's search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Activity,
    Comments,
    Votes,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Activity => "activity",
            SortKey::Comments => "comments",
            SortKey::Votes => "votes",
        }
    }
}

/// Query parameters for thread search / subscribed-thread listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadQuery {
    pub user_id: String,
    /// None for privileged requesters (they see all groups).
    pub group_id: Option<i64>,
    pub page: u32,
    pub per_page: u32,
    pub text: Option<String>,
    pub sort_key: Option<SortKey>,
    pub author_id: Option<String>,
    pub flagged: Option<bool>,
    pub thread_type: Option<ThreadType>,
    pub count_flagged: bool,
    pub unread: bool,
    pub unanswered: bool,
    /// Set only for course-wide search (not for subscribed listings).
    pub course_id: Option<String>,
    /// Comma-joined commentable ids to restrict the search to.
    pub commentable_ids: Option<String>,
}

/// One page of threads from the comment service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadPage {
    pub collection: Vec<ThreadData>,
    pub page: u32,
    pub num_pages: u32,
    pub thread_count: u64,
    /// Search-term rewrite suggested by the service, if any.
    pub corrected_text: Option<String>,
}

/// Payload for creating a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadDraft {
    pub course_id: String,
    pub commentable_id: String,
    pub thread_type: ThreadType,
    pub title: String,
    pub body: String,
    pub user_id: String,
    pub group_id: Option<i64>,
    /// Privileged creators may open a thread already closed.
    #[serde(default)]
    pub closed: bool,
}

/// Partial update for a thread; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub commentable_id: Option<String>,
    pub thread_type: Option<ThreadType>,
    pub closed: Option<bool>,
}

impl ThreadPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.commentable_id.is_none()
            && self.thread_type.is_none()
            && self.closed.is_none()
    }
}

/// Payload for creating a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDraft {
    pub thread_id: String,
    pub parent_id: Option<String>,
    pub body: String,
    pub user_id: String,
    /// Privileged creators (or the question author) may create pre-endorsed.
    #[serde(default)]
    pub endorsed: bool,
}

/// Partial update for a comment; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentPatch {
    pub body: Option<String>,
    pub endorsed: Option<bool>,
    /// User performing the endorsement state change.
    pub endorse_user_id: Option<String>,
}

impl CommentPatch {
    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.endorsed.is_none()
    }
}

/// The two kinds of content side-effecting calls can target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentRef {
    Thread(String),
    Comment(String),
}

impl ContentRef {
    pub fn id(&self) -> &str {
        match self {
            ContentRef::Thread(id) => id,
            ContentRef::Comment(id) => id,
        }
    }
}

/// Profile image references for one account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileImage {
    pub has_image: bool,
    pub image_url_full: Option<String>,
    pub image_url_large: Option<String>,
    pub image_url_medium: Option<String>,
    pub image_url_small: Option<String>,
}

/// The slice of account settings this layer cares about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub profile_image: ProfileImage,
}

/// Domain events published on content mutations. Consumed by downstream
/// analytics and team-sync listeners; publishing never affects the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForumEvent {
    ThreadCreated {
        thread_id: String,
        course_id: String,
        commentable_id: String,
        actor: String,
        followed: bool,
    },
    ThreadEdited {
        thread_id: String,
        actor: String,
    },
    ThreadDeleted {
        thread_id: String,
        actor: String,
    },
    CommentCreated {
        comment_id: String,
        thread_id: String,
        commentable_id: String,
        actor: String,
    },
    CommentEdited {
        comment_id: String,
        actor: String,
    },
    CommentDeleted {
        comment_id: String,
        actor: String,
    },
    /// One event per vote or unvote call, thread or comment alike.
    Voted {
        target: ContentRef,
        actor: String,
        undo: bool,
    },
}

/// Map of username to profile details, as returned by the profile store.
pub type ProfileMap = HashMap<String, UserProfile>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blackout_window_bounds_are_half_open() {
        let w = BlackoutWindow {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(),
        };
        assert!(w.contains(w.start));
        assert!(!w.contains(w.end));
    }

    #[test]
    fn divided_commentable_checks_inline_rule() {
        let course = Course {
            key: CourseKey::new("course-v1:x+y+z"),
            discussion_enabled: true,
            allow_anonymous: false,
            allow_anonymous_to_peers: false,
            blackouts: vec![],
            courseware_topics: vec![CoursewareTopic {
                id: "t2".into(),
                category: "Week 1".into(),
                title: "Unit".into(),
                sort_key: None,
            }],
            freestanding_topics: vec![FreestandingTopic {
                id: "t1".into(),
                name: "General".into(),
                sort_key: None,
            }],
            division: DivisionSettings {
                enabled: true,
                divided_commentables: HashSet::from(["t1".to_string()]),
                always_divide_inline_discussions: true,
            },
        };
        assert!(course.is_commentable_divided("t1"));
        // inline topic divided through the always-divide rule
        assert!(course.is_commentable_divided("t2"));
        assert!(!course.is_commentable_divided("unknown"));
    }

    #[test]
    fn privileged_posting_ignores_blackouts() {
        let now = Utc::now();
        let course = Course {
            key: CourseKey::new("c"),
            discussion_enabled: true,
            allow_anonymous: false,
            allow_anonymous_to_peers: false,
            blackouts: vec![BlackoutWindow {
                start: now - chrono::Duration::hours(1),
                end: now + chrono::Duration::hours(1),
            }],
            courseware_topics: vec![],
            freestanding_topics: vec![],
            division: DivisionSettings::default(),
        };
        assert!(!course.discussion_open(now, false));
        assert!(course.discussion_open(now, true));
    }
}
