//! Parsed request parameter and body types.
//!
//! Field presence matters for the mutation types: `None` means the field was
//! absent from the request, which is how the editable/initializable checks
//! and the action dispatcher decide what to touch. Unknown body fields are
//! rejected at deserialization (`deny_unknown_fields`), which is where the
//! "unrecognized action" validation arm lives.

use domains::{SortKey, ThreadType, ValidationErrors};
use serde::Deserialize;

use crate::actions::{CommentAction, ThreadAction};

/// Ordering keys accepted by the thread list, mapped onto the comment
/// service's internal sort vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadOrdering {
    #[default]
    LastActivityAt,
    CommentCount,
    VoteCount,
}

impl ThreadOrdering {
    pub fn parse(raw: &str) -> Result<Self, ValidationErrors> {
        match raw {
            "last_activity_at" => Ok(ThreadOrdering::LastActivityAt),
            "comment_count" => Ok(ThreadOrdering::CommentCount),
            "vote_count" => Ok(ThreadOrdering::VoteCount),
            other => Err(ValidationErrors::single(
                "order_by",
                format!(
                    "Invalid value. '{other}' must be 'last_activity_at', 'comment_count', or 'vote_count'"
                ),
            )),
        }
    }

    pub fn sort_key(self) -> SortKey {
        match self {
            ThreadOrdering::LastActivityAt => SortKey::Activity,
            ThreadOrdering::CommentCount => SortKey::Comments,
            ThreadOrdering::VoteCount => SortKey::Votes,
        }
    }
}

/// The only supported direction is descending; the parameter survives for
/// API compatibility.
pub fn parse_order_direction(raw: &str) -> Result<(), ValidationErrors> {
    if raw == "desc" {
        Ok(())
    } else {
        Err(ValidationErrors::single(
            "order_direction",
            format!("Invalid value. '{raw}' must be 'desc'"),
        ))
    }
}

/// Thread list view filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFilter {
    Unread,
    Unanswered,
}

impl ViewFilter {
    pub fn parse(raw: &str) -> Result<Self, ValidationErrors> {
        match raw {
            "unread" => Ok(ViewFilter::Unread),
            "unanswered" => Ok(ViewFilter::Unanswered),
            other => Err(ValidationErrors::single(
                "view",
                format!("Invalid value. '{other}' must be 'unread' or 'unanswered'"),
            )),
        }
    }
}

/// Additional response fields the caller asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestedFields {
    pub profile_image: bool,
}

impl RequestedFields {
    pub fn parse<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut requested = RequestedFields::default();
        for field in fields {
            if field == "profile_image" {
                requested.profile_image = true;
            }
        }
        requested
    }
}

/// Parameters for the thread listing. `topic_id_list`, `text_search`, and
/// `following` are mutually exclusive.
#[derive(Debug, Clone)]
pub struct ThreadListParams {
    pub page: u32,
    pub page_size: u32,
    pub topic_id_list: Vec<String>,
    pub text_search: Option<String>,
    pub following: bool,
    pub author: Option<String>,
    pub thread_type: Option<ThreadType>,
    pub flagged: Option<bool>,
    pub view: Option<ViewFilter>,
    pub order_by: ThreadOrdering,
    pub count_flagged: bool,
    pub requested_fields: RequestedFields,
}

impl Default for ThreadListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            topic_id_list: Vec::new(),
            text_search: None,
            following: false,
            author: None,
            thread_type: None,
            flagged: None,
            view: None,
            order_by: ThreadOrdering::default(),
            count_flagged: false,
            requested_fields: RequestedFields::default(),
        }
    }
}

/// Body of a thread creation request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThreadCreateRequest {
    pub course_id: Option<String>,
    pub topic_id: Option<String>,
    #[serde(rename = "type")]
    pub thread_type: Option<ThreadType>,
    pub title: Option<String>,
    pub raw_body: Option<String>,
    pub group_id: Option<i64>,
    pub closed: Option<bool>,
    pub following: Option<bool>,
    pub voted: Option<bool>,
    pub abuse_flagged: Option<bool>,
    pub read: Option<bool>,
    pub pinned: Option<bool>,
}

impl ThreadCreateRequest {
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        present(&mut fields, "course_id", self.course_id.is_some());
        present(&mut fields, "topic_id", self.topic_id.is_some());
        present(&mut fields, "type", self.thread_type.is_some());
        present(&mut fields, "title", self.title.is_some());
        present(&mut fields, "raw_body", self.raw_body.is_some());
        present(&mut fields, "group_id", self.group_id.is_some());
        present(&mut fields, "closed", self.closed.is_some());
        present(&mut fields, "following", self.following.is_some());
        present(&mut fields, "voted", self.voted.is_some());
        present(&mut fields, "abuse_flagged", self.abuse_flagged.is_some());
        present(&mut fields, "read", self.read.is_some());
        present(&mut fields, "pinned", self.pinned.is_some());
        fields
    }

    pub fn actions(&self) -> Vec<ThreadAction> {
        thread_actions(
            self.following,
            self.abuse_flagged,
            self.voted,
            self.read,
            self.pinned,
        )
    }
}

/// Body of a thread update request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThreadUpdateRequest {
    pub topic_id: Option<String>,
    #[serde(rename = "type")]
    pub thread_type: Option<ThreadType>,
    pub title: Option<String>,
    pub raw_body: Option<String>,
    pub closed: Option<bool>,
    pub following: Option<bool>,
    pub voted: Option<bool>,
    pub abuse_flagged: Option<bool>,
    pub read: Option<bool>,
    pub pinned: Option<bool>,
}

impl ThreadUpdateRequest {
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        present(&mut fields, "topic_id", self.topic_id.is_some());
        present(&mut fields, "type", self.thread_type.is_some());
        present(&mut fields, "title", self.title.is_some());
        present(&mut fields, "raw_body", self.raw_body.is_some());
        present(&mut fields, "closed", self.closed.is_some());
        present(&mut fields, "following", self.following.is_some());
        present(&mut fields, "voted", self.voted.is_some());
        present(&mut fields, "abuse_flagged", self.abuse_flagged.is_some());
        present(&mut fields, "read", self.read.is_some());
        present(&mut fields, "pinned", self.pinned.is_some());
        fields
    }

    /// Whether any field outside the fixed action set was supplied. The saved
    /// record is only written (and the edit event only fired) in that case.
    pub fn has_saved_fields(&self) -> bool {
        self.topic_id.is_some()
            || self.thread_type.is_some()
            || self.title.is_some()
            || self.raw_body.is_some()
            || self.closed.is_some()
    }

    pub fn actions(&self) -> Vec<ThreadAction> {
        thread_actions(
            self.following,
            self.abuse_flagged,
            self.voted,
            self.read,
            self.pinned,
        )
    }
}

/// Body of a comment creation request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentCreateRequest {
    pub thread_id: Option<String>,
    pub parent_id: Option<String>,
    pub raw_body: Option<String>,
    pub endorsed: Option<bool>,
    pub voted: Option<bool>,
    pub abuse_flagged: Option<bool>,
}

impl CommentCreateRequest {
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        present(&mut fields, "thread_id", self.thread_id.is_some());
        present(&mut fields, "parent_id", self.parent_id.is_some());
        present(&mut fields, "raw_body", self.raw_body.is_some());
        present(&mut fields, "endorsed", self.endorsed.is_some());
        present(&mut fields, "voted", self.voted.is_some());
        present(&mut fields, "abuse_flagged", self.abuse_flagged.is_some());
        fields
    }

    pub fn actions(&self) -> Vec<CommentAction> {
        comment_actions(self.voted, self.abuse_flagged)
    }
}

/// Body of a comment update request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentUpdateRequest {
    pub raw_body: Option<String>,
    pub endorsed: Option<bool>,
    pub voted: Option<bool>,
    pub abuse_flagged: Option<bool>,
}

impl CommentUpdateRequest {
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        present(&mut fields, "raw_body", self.raw_body.is_some());
        present(&mut fields, "endorsed", self.endorsed.is_some());
        present(&mut fields, "voted", self.voted.is_some());
        present(&mut fields, "abuse_flagged", self.abuse_flagged.is_some());
        fields
    }

    pub fn has_saved_fields(&self) -> bool {
        self.raw_body.is_some() || self.endorsed.is_some()
    }

    pub fn actions(&self) -> Vec<CommentAction> {
        comment_actions(self.voted, self.abuse_flagged)
    }
}

fn present(fields: &mut Vec<&'static str>, name: &'static str, is_present: bool) {
    if is_present {
        fields.push(name);
    }
}

fn thread_actions(
    following: Option<bool>,
    abuse_flagged: Option<bool>,
    voted: Option<bool>,
    read: Option<bool>,
    pinned: Option<bool>,
) -> Vec<ThreadAction> {
    let mut actions = Vec::new();
    if let Some(value) = following {
        actions.push(ThreadAction::Following(value));
    }
    if let Some(value) = abuse_flagged {
        actions.push(ThreadAction::AbuseFlagged(value));
    }
    if let Some(value) = voted {
        actions.push(ThreadAction::Voted(value));
    }
    if let Some(value) = read {
        actions.push(ThreadAction::Read(value));
    }
    if let Some(value) = pinned {
        actions.push(ThreadAction::Pinned(value));
    }
    actions
}

fn comment_actions(voted: Option<bool>, abuse_flagged: Option<bool>) -> Vec<CommentAction> {
    let mut actions = Vec::new();
    if let Some(value) = voted {
        actions.push(CommentAction::Voted(value));
    }
    if let Some(value) = abuse_flagged {
        actions.push(CommentAction::AbuseFlagged(value));
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_maps_to_service_sort_keys() {
        assert_eq!(
            ThreadOrdering::parse("last_activity_at").unwrap().sort_key(),
            SortKey::Activity
        );
        assert_eq!(
            ThreadOrdering::parse("comment_count").unwrap().sort_key(),
            SortKey::Comments
        );
        assert_eq!(
            ThreadOrdering::parse("vote_count").unwrap().sort_key(),
            SortKey::Votes
        );
    }

    #[test]
    fn unknown_ordering_fails_validation() {
        let err = ThreadOrdering::parse("karma").unwrap_err();
        assert!(err.messages_for("order_by")[0].contains("'karma'"));
    }

    #[test]
    fn order_direction_only_accepts_desc() {
        assert!(parse_order_direction("desc").is_ok());
        assert!(parse_order_direction("asc").is_err());
    }

    #[test]
    fn unknown_body_field_is_rejected() {
        let raw = r#"{"thread_id": "t1", "sparkle": true}"#;
        let parsed: Result<CommentCreateRequest, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn present_fields_reflect_supplied_keys_only() {
        let request: ThreadUpdateRequest =
            serde_json::from_str(r#"{"raw_body": "hi", "voted": true}"#).unwrap();
        assert_eq!(request.present_fields(), vec!["raw_body", "voted"]);
        assert!(request.has_saved_fields());

        let actions_only: ThreadUpdateRequest =
            serde_json::from_str(r#"{"voted": false, "read": true}"#).unwrap();
        assert!(!actions_only.has_saved_fields());
        assert_eq!(actions_only.actions().len(), 2);
    }
}
