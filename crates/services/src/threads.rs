//! Thread listing, retrieval, and mutations.

use domains::{
    CourseKey, DiscussionError, ForumEvent, Requester, Result, ThreadDraft, ThreadPatch,
    ThreadQuery, ThreadRetrieveOptions, ValidationErrors,
};
use serde::Serialize;
use tracing::debug;

use crate::pagination::{self, Page};
use crate::permissions;
use crate::requests::{
    RequestedFields, ThreadCreateRequest, ThreadListParams, ThreadUpdateRequest, ViewFilter,
};
use crate::serialize::{thread_view, ThreadView};
use crate::urls;
use crate::{internal, DiscussionService};

/// The thread listing envelope: a page plus the service's search-term
/// rewrite, if any.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ThreadListPage {
    #[serde(flatten)]
    pub page: Page<ThreadView>,
    pub text_search_rewrite: Option<String>,
}

impl ThreadListPage {
    fn empty() -> Self {
        Self {
            page: Page::empty(),
            text_search_rewrite: None,
        }
    }
}

impl DiscussionService {
    /// List the discussion threads of a course.
    ///
    /// `topic_id_list`, `text_search`, and `following` are mutually
    /// exclusive. `count_flagged` requires a privileged requester. An
    /// unknown `author` yields an empty page rather than an error, so the
    /// listing cannot be used to probe for usernames.
    pub async fn get_thread_list(
        &self,
        requester: &Requester,
        course_key: &CourseKey,
        params: ThreadListParams,
    ) -> Result<ThreadListPage> {
        let exclusive_count = [
            !params.topic_id_list.is_empty(),
            params.text_search.is_some(),
            params.following,
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if exclusive_count > 1 {
            return Err(ValidationErrors::single(
                "__all__",
                "The following query parameters are mutually exclusive: topic_id, text_search, following",
            )
            .into());
        }

        let ctx = self.resolve_course(requester, course_key).await?;

        let author_id = match &params.author {
            Some(author) => match self.users.user_id_for_username(author).await? {
                Some(id) => Some(id),
                None => {
                    // Reporting an error here would leak the presence of a
                    // username.
                    debug!(author, "author filter matched no user");
                    return Ok(ThreadListPage::empty());
                }
            },
            None => None,
        };

        if params.count_flagged && !ctx.is_privileged {
            return Err(DiscussionError::permission_denied_with(
                "`count_flagged` can only be set by users with moderator access or higher.",
            ));
        }

        let group_id = if ctx.is_privileged {
            None
        } else {
            self.courses
                .group_for_user(&requester.username, course_key)
                .await?
        };

        let mut query = ThreadQuery {
            user_id: requester.id.clone(),
            group_id,
            page: params.page,
            per_page: params.page_size,
            text: params.text_search.clone(),
            sort_key: Some(params.order_by.sort_key()),
            author_id,
            flagged: params.flagged,
            thread_type: params.thread_type,
            count_flagged: params.count_flagged,
            unread: params.view == Some(ViewFilter::Unread),
            unanswered: params.view == Some(ViewFilter::Unanswered),
            course_id: None,
            commentable_ids: None,
        };

        let results = if params.following {
            self.client
                .subscribed_threads(&requester.id, query)
                .await
                .map_err(internal)?
        } else {
            query.course_id = Some(course_key.to_string());
            query.commentable_ids = (!params.topic_id_list.is_empty())
                .then(|| params.topic_id_list.join(","));
            self.client.search_threads(query).await.map_err(internal)?
        };

        // The comment service clamps an out-of-range page to the last one;
        // surface it as an error instead.
        if results.page != params.page {
            return Err(DiscussionError::PageNotFound);
        }

        let mut views: Vec<ThreadView> = results
            .collection
            .iter()
            .map(|thread| thread_view(thread, &ctx, false))
            .collect();
        self.attach_profiles(&mut views, params.requested_fields.profile_image)
            .await?;

        let page = pagination::build_page(
            &self.api_base,
            &format!("{}/threads", urls::API_ROOT),
            &thread_list_query(course_key, &params),
            results.page,
            results.num_pages,
            results.thread_count,
            views,
        );
        Ok(ThreadListPage {
            page,
            text_search_rewrite: results.corrected_text,
        })
    }

    /// Retrieve a single thread, with its response count.
    pub async fn get_thread(
        &self,
        requester: &Requester,
        thread_id: &str,
        requested_fields: RequestedFields,
    ) -> Result<ThreadView> {
        let (thread, ctx) = self
            .thread_and_context(
                requester,
                thread_id,
                ThreadRetrieveOptions {
                    with_responses: true,
                    user_id: Some(requester.id.clone()),
                    ..ThreadRetrieveOptions::default()
                },
            )
            .await?;
        let mut views = vec![thread_view(&thread, &ctx, true)];
        self.attach_profiles(&mut views, requested_fields.profile_image)
            .await?;
        Ok(views.pop().expect("serialized exactly one thread"))
    }

    /// Create a thread.
    pub async fn create_thread(
        &self,
        requester: &Requester,
        request: ThreadCreateRequest,
    ) -> Result<ThreadView> {
        let course_id = request
            .course_id
            .clone()
            .ok_or_else(|| ValidationErrors::single("course_id", "This field is required."))?;
        let course_key = CourseKey::new(course_id.clone());
        let ctx = self.resolve_course(requester, &course_key).await?;

        if !ctx
            .course
            .discussion_open(chrono::Utc::now(), ctx.is_privileged)
        {
            return Err(DiscussionError::Blackout);
        }

        permissions::check_fields(
            &permissions::initializable_thread_fields(&ctx),
            &request.present_fields(),
            "This field is not initializable.",
        )?;

        // Auto-assign the requester's cohort group for divided topics.
        let group_id = match request.group_id {
            Some(group) => Some(group),
            None => match &request.topic_id {
                Some(topic_id) if ctx.course.is_commentable_divided(topic_id) => {
                    self.courses
                        .group_for_user(&requester.username, &course_key)
                        .await?
                }
                _ => None,
            },
        };

        let mut errors = ValidationErrors::new();
        let topic_id = required_text(&mut errors, "topic_id", request.topic_id.as_deref());
        let title = required_text(&mut errors, "title", request.title.as_deref());
        let body = required_text(&mut errors, "raw_body", request.raw_body.as_deref());
        errors.into_result()?;

        let created = self
            .client
            .create_thread(ThreadDraft {
                course_id,
                commentable_id: topic_id.expect("validated"),
                thread_type: request.thread_type.unwrap_or_default(),
                title: title.expect("validated"),
                body: body.expect("validated"),
                user_id: requester.id.clone(),
                group_id,
                closed: request.closed.unwrap_or(false),
            })
            .await
            .map_err(internal)?;

        self.events
            .publish(ForumEvent::ThreadCreated {
                thread_id: created.id.clone(),
                course_id: created.course_id.clone(),
                commentable_id: created.commentable_id.clone(),
                actor: requester.username.clone(),
                followed: request.following.unwrap_or(false),
            })
            .await;

        let mut view = thread_view(&created, &ctx, false);
        self.apply_thread_actions(&ctx, &mut view, &request.actions())
            .await?;
        Ok(view)
    }

    /// Update a thread. The record is only written (and the edit event only
    /// published) if at least one non-action field was supplied; the
    /// response always reports the thread as read.
    pub async fn update_thread(
        &self,
        requester: &Requester,
        thread_id: &str,
        request: ThreadUpdateRequest,
    ) -> Result<ThreadView> {
        let (thread, ctx) = self
            .thread_and_context(
                requester,
                thread_id,
                ThreadRetrieveOptions {
                    with_responses: true,
                    ..ThreadRetrieveOptions::default()
                },
            )
            .await?;

        permissions::check_fields(
            &permissions::editable_thread_fields(&thread, &ctx),
            &request.present_fields(),
            "This field is not editable.",
        )?;

        let mut errors = ValidationErrors::new();
        reject_blank(&mut errors, "title", request.title.as_deref());
        reject_blank(&mut errors, "raw_body", request.raw_body.as_deref());
        reject_blank(&mut errors, "topic_id", request.topic_id.as_deref());
        errors.into_result()?;

        let saved = if request.has_saved_fields() {
            let updated = self
                .client
                .update_thread(
                    thread_id,
                    ThreadPatch {
                        title: request.title.clone(),
                        body: request.raw_body.clone(),
                        commentable_id: request.topic_id.clone(),
                        thread_type: request.thread_type,
                        closed: request.closed,
                    },
                )
                .await
                .map_err(internal)?;
            self.events
                .publish(ForumEvent::ThreadEdited {
                    thread_id: thread_id.to_string(),
                    actor: requester.username.clone(),
                })
                .await;
            updated
        } else {
            thread
        };

        let mut view = thread_view(&saved, &ctx, true);
        self.apply_thread_actions(&ctx, &mut view, &request.actions())
            .await?;

        // Reported as read unconditionally; an accepted approximation rather
        // than a fresh unread-count recomputation.
        view.read = true;
        view.unread_comment_count = 0;
        Ok(view)
    }

    /// Delete a thread. Owner or privileged only.
    pub async fn delete_thread(&self, requester: &Requester, thread_id: &str) -> Result<()> {
        let (thread, ctx) = self
            .thread_and_context(requester, thread_id, ThreadRetrieveOptions::default())
            .await?;
        if !permissions::can_delete(&thread.user_id, &ctx) {
            return Err(DiscussionError::permission_denied());
        }
        self.client.delete_thread(thread_id).await.map_err(internal)?;
        self.events
            .publish(ForumEvent::ThreadDeleted {
                thread_id: thread_id.to_string(),
                actor: requester.username.clone(),
            })
            .await;
        Ok(())
    }
}

/// Listing query reproduced for the next/previous links.
fn thread_list_query(course_key: &CourseKey, params: &ThreadListParams) -> Vec<(String, String)> {
    let mut query = vec![("course_id".to_string(), course_key.to_string())];
    for topic_id in &params.topic_id_list {
        query.push(("topic_id".to_string(), topic_id.clone()));
    }
    if let Some(text) = &params.text_search {
        query.push(("text_search".to_string(), text.clone()));
    }
    if params.following {
        query.push(("following".to_string(), "true".to_string()));
    }
    if let Some(author) = &params.author {
        query.push(("author".to_string(), author.clone()));
    }
    query.push(("page_size".to_string(), params.page_size.to_string()));
    query
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
) -> Option<String> {
    match value {
        None => {
            errors.add(field, "This field is required.");
            None
        }
        Some(text) if text.trim().is_empty() => {
            errors.add(field, "This field may not be blank.");
            None
        }
        Some(text) => Some(text.to_string()),
    }
}

fn reject_blank(errors: &mut ValidationErrors, field: &'static str, value: Option<&str>) {
    if let Some(text) = value {
        if text.trim().is_empty() {
            errors.add(field, "This field may not be blank.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_aggregates_missing_and_blank() {
        let mut errors = ValidationErrors::new();
        assert!(required_text(&mut errors, "title", None).is_none());
        assert!(required_text(&mut errors, "raw_body", Some("  ")).is_none());
        assert_eq!(
            required_text(&mut errors, "topic_id", Some("t1")).as_deref(),
            Some("t1")
        );
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.fields().count(), 2);
    }
}
