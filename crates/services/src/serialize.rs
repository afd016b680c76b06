//! Shapes comment-service records into API payloads.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use domains::{CommentData, ProfileImage, ThreadData, ThreadType};
use serde::Serialize;

use crate::context::Context;
use crate::permissions;

/// Minimal per-user profile sub-object attached on enrichment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSummary {
    pub profile: UserSummaryProfile,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSummaryProfile {
    pub image: ProfileImage,
}

/// API-shaped thread payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ThreadView {
    pub id: String,
    pub course_id: String,
    pub topic_id: String,
    pub group_id: Option<i64>,
    pub author: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(rename = "type")]
    pub thread_type: ThreadType,
    pub title: String,
    pub raw_body: String,
    pub pinned: bool,
    pub closed: bool,
    pub following: bool,
    pub abuse_flagged: bool,
    pub voted: bool,
    pub vote_count: i64,
    pub comment_count: u64,
    pub unread_comment_count: u64,
    pub read: bool,
    /// Total responses; present only when the thread was fetched with them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abuse_flagged_count: Option<u64>,
    pub editable_fields: Vec<String>,
    pub can_delete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<HashMap<String, UserSummary>>,
}

/// API-shaped comment payload. Children are serialized in place.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommentView {
    pub id: String,
    pub thread_id: String,
    pub parent_id: Option<String>,
    pub author: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub raw_body: String,
    pub endorsed: bool,
    pub endorsed_by: Option<String>,
    pub endorsed_at: Option<String>,
    pub abuse_flagged: bool,
    pub voted: bool,
    pub vote_count: i64,
    pub children: Vec<CommentView>,
    pub editable_fields: Vec<String>,
    pub can_delete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<HashMap<String, UserSummary>>,
}

/// RFC3339 with a trailing `Z`, the format the mobile clients expect.
pub(crate) fn format_datetime(dt: Option<DateTime<Utc>>) -> Option<String> {
    dt.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub(crate) fn thread_view(thread: &ThreadData, ctx: &Context, with_responses: bool) -> ThreadView {
    let response_count = if with_responses {
        Some(match thread.thread_type {
            ThreadType::Discussion => thread.resp_total,
            ThreadType::Question => {
                thread.endorsed_responses.len() as u64 + thread.non_endorsed_resp_total
            }
        })
    } else {
        None
    };
    ThreadView {
        id: thread.id.clone(),
        course_id: thread.course_id.clone(),
        topic_id: thread.commentable_id.clone(),
        group_id: thread.group_id,
        author: thread.username.clone(),
        created_at: format_datetime(thread.created_at),
        updated_at: format_datetime(thread.updated_at),
        thread_type: thread.thread_type,
        title: thread.title.clone(),
        raw_body: thread.body.clone(),
        pinned: thread.pinned,
        closed: thread.closed,
        following: thread.following,
        abuse_flagged: thread.abuse_flagged,
        voted: thread.voted,
        vote_count: thread.vote_count,
        comment_count: thread.comment_count,
        unread_comment_count: thread.unread_comment_count,
        read: thread.read,
        response_count,
        abuse_flagged_count: thread.abuse_flagged_count,
        editable_fields: permissions::editable_thread_fields(thread, ctx)
            .into_iter()
            .map(str::to_string)
            .collect(),
        can_delete: permissions::can_delete(&thread.user_id, ctx),
        users: None,
    }
}

pub(crate) fn comment_view(comment: &CommentData, thread: &ThreadData, ctx: &Context) -> CommentView {
    CommentView {
        id: comment.id.clone(),
        thread_id: comment.thread_id.clone(),
        parent_id: comment.parent_id.clone(),
        author: comment.username.clone(),
        created_at: format_datetime(comment.created_at),
        updated_at: format_datetime(comment.updated_at),
        raw_body: comment.body.clone(),
        endorsed: comment.endorsed,
        endorsed_by: comment.endorsed_by.clone(),
        endorsed_at: format_datetime(comment.endorsed_at),
        abuse_flagged: comment.abuse_flagged,
        voted: comment.voted,
        vote_count: comment.vote_count,
        children: comment
            .children
            .iter()
            .map(|child| comment_view(child, thread, ctx))
            .collect(),
        editable_fields: permissions::editable_comment_fields(comment, thread, ctx)
            .into_iter()
            .map(str::to_string)
            .collect(),
        can_delete: permissions::can_delete(&comment.user_id, ctx),
        users: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domains::{Course, CourseKey, DivisionSettings, ForumRole, Requester};
    use std::collections::HashSet;

    fn ctx() -> Context {
        Context {
            course: Course {
                key: CourseKey::new("course-v1:x+y+z"),
                discussion_enabled: true,
                allow_anonymous: false,
                allow_anonymous_to_peers: false,
                blackouts: vec![],
                courseware_topics: vec![],
                freestanding_topics: vec![],
                division: DivisionSettings::default(),
            },
            requester: Requester {
                id: "5".into(),
                username: "learner".into(),
            },
            roles: HashSet::from([ForumRole::Student]),
            is_privileged: false,
        }
    }

    #[test]
    fn datetimes_serialize_with_trailing_z() {
        let dt = Utc.with_ymd_and_hms(2020, 10, 20, 23, 59, 0).unwrap();
        assert_eq!(
            format_datetime(Some(dt)).unwrap(),
            "2020-10-20T23:59:00Z"
        );
    }

    #[test]
    fn question_response_count_spans_both_collections() {
        let thread = ThreadData {
            thread_type: ThreadType::Question,
            endorsed_responses: vec![CommentData::default(), CommentData::default()],
            non_endorsed_resp_total: 3,
            ..ThreadData::default()
        };
        let view = thread_view(&thread, &ctx(), true);
        assert_eq!(view.response_count, Some(5));
    }

    #[test]
    fn response_count_absent_without_responses() {
        let view = thread_view(&ThreadData::default(), &ctx(), false);
        assert_eq!(view.response_count, None);
    }

    #[test]
    fn comment_children_serialize_recursively() {
        let comment = CommentData {
            id: "c1".into(),
            children: vec![CommentData {
                id: "c2".into(),
                ..CommentData::default()
            }],
            ..CommentData::default()
        };
        let view = comment_view(&comment, &ThreadData::default(), &ctx());
        assert_eq!(view.children.len(), 1);
        assert_eq!(view.children[0].id, "c2");
    }
}
