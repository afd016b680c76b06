//! Course resolution, per-request context, and the content fetch helpers
//! that enforce access control.

use std::collections::HashSet;

use domains::{
    CommentData, Course, CourseKey, DiscussionError, ForumRole, Requester, Result, ThreadData,
    ThreadRetrieveOptions,
};
use serde::Serialize;

use crate::serialize::format_datetime;
use crate::urls;
use crate::DiscussionService;

/// Ephemeral per-request bundle handed to serializers and validators.
#[derive(Debug, Clone)]
pub struct Context {
    pub course: Course,
    pub requester: Requester,
    pub roles: HashSet<ForumRole>,
    pub is_privileged: bool,
}

/// General discussion information for a course.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CourseInfo {
    pub id: String,
    pub blackouts: Vec<BlackoutView>,
    pub thread_list_url: String,
    pub following_thread_list_url: String,
    pub topics_url: String,
    pub allow_anonymous: bool,
    pub allow_anonymous_to_peers: bool,
    pub user_roles: Vec<String>,
    pub user_is_privileged: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BlackoutView {
    pub start: String,
    pub end: String,
}

impl DiscussionService {
    /// Resolve the course for the requester, failing with `CourseNotFound`
    /// if it is absent or inaccessible and `DiscussionDisabled` if the
    /// discussion tab is off.
    pub(crate) async fn resolve_course(
        &self,
        requester: &Requester,
        course_key: &CourseKey,
    ) -> Result<Context> {
        let course = self
            .courses
            .course(course_key)
            .await?
            .ok_or(DiscussionError::CourseNotFound)?;
        if !self
            .courses
            .has_access(&requester.username, course_key)
            .await?
        {
            return Err(DiscussionError::CourseNotFound);
        }
        if !course.discussion_enabled {
            return Err(DiscussionError::DiscussionDisabled);
        }
        let roles = self
            .courses
            .user_roles(&requester.username, course_key)
            .await?;
        let is_privileged = roles.iter().any(|role| role.is_privileged());
        Ok(Context {
            course,
            requester: requester.clone(),
            roles,
            is_privileged,
        })
    }

    /// Retrieve a thread and build the context for it, enforcing cohort
    /// visibility: outside a group-restricted thread's group, non-privileged
    /// requesters see `ThreadNotFound`. A failed retrieve is reinterpreted as
    /// `ThreadNotFound` since inputs are pre-validated.
    pub(crate) async fn thread_and_context(
        &self,
        requester: &Requester,
        thread_id: &str,
        opts: ThreadRetrieveOptions,
    ) -> Result<(ThreadData, Context)> {
        let thread = self
            .client
            .retrieve_thread(thread_id, opts)
            .await
            .map_err(|_| DiscussionError::ThreadNotFound)?;
        let course_key = CourseKey::new(thread.course_id.clone());
        let ctx = self.resolve_course(requester, &course_key).await?;
        if !ctx.is_privileged
            && thread.group_id.is_some()
            && ctx.course.is_commentable_divided(&thread.commentable_id)
        {
            let requester_group = self
                .courses
                .group_for_user(&requester.username, &course_key)
                .await?;
            if let Some(group) = requester_group {
                if thread.group_id != Some(group) {
                    return Err(DiscussionError::ThreadNotFound);
                }
            }
        }
        Ok((thread, ctx))
    }

    /// Retrieve a comment and the context of its parent thread. A failed
    /// comment retrieve is reinterpreted as `CommentNotFound`.
    pub(crate) async fn comment_and_context(
        &self,
        requester: &Requester,
        comment_id: &str,
    ) -> Result<(CommentData, ThreadData, Context)> {
        let comment = self
            .client
            .retrieve_comment(comment_id)
            .await
            .map_err(|_| DiscussionError::CommentNotFound)?;
        let (thread, ctx) = self
            .thread_and_context(requester, &comment.thread_id, ThreadRetrieveOptions::default())
            .await?;
        Ok((comment, thread, ctx))
    }

    /// General discussion information for the course: blackout windows,
    /// canonical listing URLs, and the requester's roles.
    pub async fn get_course(
        &self,
        requester: &Requester,
        course_key: &CourseKey,
    ) -> Result<CourseInfo> {
        let ctx = self.resolve_course(requester, course_key).await?;
        let mut user_roles: Vec<String> = ctx
            .roles
            .iter()
            .map(|role| role.as_str().to_string())
            .collect();
        user_roles.sort();
        Ok(CourseInfo {
            id: course_key.to_string(),
            blackouts: ctx
                .course
                .blackouts
                .iter()
                .map(|w| BlackoutView {
                    start: format_datetime(Some(w.start)).unwrap_or_default(),
                    end: format_datetime(Some(w.end)).unwrap_or_default(),
                })
                .collect(),
            thread_list_url: urls::thread_list_url(&self.api_base, course_key, &[], false),
            following_thread_list_url: urls::thread_list_url(
                &self.api_base,
                course_key,
                &[],
                true,
            ),
            topics_url: urls::topics_url(&self.api_base, course_key),
            allow_anonymous: ctx.course.allow_anonymous,
            allow_anonymous_to_peers: ctx.course.allow_anonymous_to_peers,
            user_roles,
            user_is_privileged: ctx.is_privileged,
        })
    }
}
