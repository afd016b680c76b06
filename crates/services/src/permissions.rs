//! Field-level access rules: which fields a requester may set at creation,
//! which they may edit afterwards, and who may delete content.

use std::collections::BTreeSet;

use domains::{CommentData, ThreadData, ThreadType, ValidationErrors};
use once_cell::sync::Lazy;

use crate::context::Context;

/// Thread fields handled by the action dispatcher rather than saved on the
/// record.
pub static THREAD_ACTION_FIELDS: Lazy<BTreeSet<&'static str>> =
    Lazy::new(|| BTreeSet::from(["abuse_flagged", "following", "pinned", "read", "voted"]));

/// Comment fields handled by the action dispatcher.
pub static COMMENT_ACTION_FIELDS: Lazy<BTreeSet<&'static str>> =
    Lazy::new(|| BTreeSet::from(["abuse_flagged", "voted"]));

pub fn initializable_thread_fields(ctx: &Context) -> BTreeSet<&'static str> {
    let mut fields = BTreeSet::from([
        "abuse_flagged",
        "course_id",
        "following",
        "raw_body",
        "read",
        "title",
        "topic_id",
        "type",
        "voted",
    ]);
    if ctx.is_privileged {
        fields.extend(["closed", "group_id", "pinned"]);
    }
    fields
}

pub fn initializable_comment_fields(ctx: &Context) -> BTreeSet<&'static str> {
    let mut fields = BTreeSet::from([
        "abuse_flagged",
        "parent_id",
        "raw_body",
        "thread_id",
        "voted",
    ]);
    if ctx.is_privileged {
        fields.insert("endorsed");
    }
    fields
}

pub fn editable_thread_fields(thread: &ThreadData, ctx: &Context) -> BTreeSet<&'static str> {
    let mut fields = BTreeSet::from(["abuse_flagged", "following", "read", "voted"]);
    if is_author_or_privileged(&thread.user_id, ctx) {
        fields.extend(["raw_body", "title", "topic_id", "type"]);
    }
    if ctx.is_privileged {
        fields.extend(["closed", "pinned"]);
    }
    fields
}

pub fn editable_comment_fields(
    comment: &CommentData,
    thread: &ThreadData,
    ctx: &Context,
) -> BTreeSet<&'static str> {
    let mut fields = BTreeSet::from(["abuse_flagged", "voted"]);
    if is_author_or_privileged(&comment.user_id, ctx) {
        fields.insert("raw_body");
    }
    if can_endorse(thread, ctx) {
        fields.insert("endorsed");
    }
    fields
}

/// Privileged users endorse anywhere; a question's author endorses responses
/// on their own thread.
pub fn can_endorse(thread: &ThreadData, ctx: &Context) -> bool {
    ctx.is_privileged
        || (thread.thread_type == ThreadType::Question && thread.user_id == ctx.requester.id)
}

pub fn can_delete(author_id: &str, ctx: &Context) -> bool {
    is_author_or_privileged(author_id, ctx)
}

pub fn is_author_or_privileged(author_id: &str, ctx: &Context) -> bool {
    ctx.is_privileged || ctx.requester.id == author_id
}

/// Reject every supplied field not in the allowed set, reporting all of them
/// at once.
pub fn check_fields(
    allowed: &BTreeSet<&'static str>,
    present: &[&'static str],
    message: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for field in present {
        if !allowed.contains(field) {
            errors.add(*field, message);
        }
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Course, CourseKey, DivisionSettings, ForumRole, Requester};
    use std::collections::HashSet;

    fn context(privileged: bool) -> Context {
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
            roles: if privileged {
                HashSet::from([ForumRole::Moderator])
            } else {
                HashSet::from([ForumRole::Student])
            },
            is_privileged: privileged,
        }
    }

    fn thread(author_id: &str, thread_type: ThreadType) -> ThreadData {
        ThreadData {
            user_id: author_id.into(),
            thread_type,
            ..ThreadData::default()
        }
    }

    #[test]
    fn students_cannot_initialize_moderation_fields() {
        let fields = initializable_thread_fields(&context(false));
        assert!(!fields.contains("pinned"));
        assert!(!fields.contains("closed"));
        assert!(!fields.contains("group_id"));
        assert!(fields.contains("following"));
    }

    #[test]
    fn moderators_may_pin_and_close() {
        let fields = initializable_thread_fields(&context(true));
        assert!(fields.contains("pinned"));
        assert!(fields.contains("closed"));
        assert!(fields.contains("group_id"));
    }

    #[test]
    fn non_author_student_cannot_edit_content() {
        let fields = editable_thread_fields(&thread("99", ThreadType::Discussion), &context(false));
        assert!(!fields.contains("raw_body"));
        assert!(fields.contains("voted"));
    }

    #[test]
    fn author_edits_own_content() {
        let fields = editable_thread_fields(&thread("5", ThreadType::Discussion), &context(false));
        assert!(fields.contains("raw_body"));
        assert!(fields.contains("title"));
        assert!(!fields.contains("closed"));
    }

    #[test]
    fn question_author_may_endorse_responses() {
        let ctx = context(false);
        let question = thread("5", ThreadType::Question);
        let discussion = thread("5", ThreadType::Discussion);
        let comment = CommentData::default();
        assert!(editable_comment_fields(&comment, &question, &ctx).contains("endorsed"));
        assert!(!editable_comment_fields(&comment, &discussion, &ctx).contains("endorsed"));
    }

    #[test]
    fn check_fields_reports_every_violation() {
        let allowed = BTreeSet::from(["raw_body"]);
        let err = check_fields(&allowed, &["raw_body", "pinned", "closed"], "nope").unwrap_err();
        assert_eq!(err.fields().count(), 2);
    }
}
