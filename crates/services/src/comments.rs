//! Comment listing (thread responses and response children) and mutations.

use domains::{
    CommentData, CommentDraft, CommentPatch, DiscussionError, ForumEvent, Requester, Result,
    ThreadData, ThreadRetrieveOptions, ThreadType, ValidationErrors,
};

use crate::context::Context;
use crate::pagination::{self, Page};
use crate::permissions;
use crate::requests::{CommentCreateRequest, CommentUpdateRequest, RequestedFields};
use crate::serialize::{comment_view, CommentView};
use crate::urls;
use crate::{internal, DiscussionService};

impl DiscussionService {
    /// List a thread's responses.
    ///
    /// Question threads must be asked for either endorsed or non-endorsed
    /// responses; discussion threads must not be. An empty page other than
    /// page 1 is `PageNotFound`.
    pub async fn get_comment_list(
        &self,
        requester: &Requester,
        thread_id: &str,
        endorsed: Option<bool>,
        page: u32,
        page_size: u32,
        requested_fields: RequestedFields,
    ) -> Result<Page<CommentView>> {
        // `page` is 1-indexed; saturate so a zero page cannot underflow.
        let response_skip = u64::from(page_size) * u64::from(page.saturating_sub(1));
        let (thread, ctx) = self
            .thread_and_context(
                requester,
                thread_id,
                ThreadRetrieveOptions {
                    with_responses: true,
                    recursive: false,
                    user_id: Some(requester.id.clone()),
                    response_skip: Some(response_skip),
                    response_limit: Some(u64::from(page_size)),
                    ..ThreadRetrieveOptions::default()
                },
            )
            .await?;

        // Responses to question threads are split by endorsement in the
        // comment service's interface; discussion threads have one flat list.
        let (responses, total): (Vec<&CommentData>, u64) = match thread.thread_type {
            ThreadType::Question => match endorsed {
                None => {
                    return Err(ValidationErrors::single(
                        "endorsed",
                        "This field is required for question threads.",
                    )
                    .into());
                }
                Some(true) => {
                    // The service does not apply skip/limit to endorsed
                    // responses of a question; slice locally.
                    let skip = response_skip as usize;
                    let sliced: Vec<&CommentData> = thread
                        .endorsed_responses
                        .iter()
                        .skip(skip)
                        .take(page_size as usize)
                        .collect();
                    (sliced, thread.endorsed_responses.len() as u64)
                }
                Some(false) => (
                    thread.non_endorsed_responses.iter().collect(),
                    thread.non_endorsed_resp_total,
                ),
            },
            ThreadType::Discussion => {
                if endorsed.is_some() {
                    return Err(ValidationErrors::single(
                        "endorsed",
                        "This field may not be specified for discussion threads.",
                    )
                    .into());
                }
                (thread.children.iter().collect(), thread.resp_total)
            }
        };

        if responses.is_empty() && page != 1 {
            return Err(DiscussionError::PageNotFound);
        }

        let mut views: Vec<CommentView> = responses
            .iter()
            .map(|comment| comment_view(comment, &thread, &ctx))
            .collect();
        self.attach_profiles(&mut views, requested_fields.profile_image)
            .await?;

        let mut query = vec![("thread_id".to_string(), thread_id.to_string())];
        if let Some(endorsed) = endorsed {
            query.push(("endorsed".to_string(), endorsed.to_string()));
        }
        query.push(("page_size".to_string(), page_size.to_string()));
        Ok(pagination::build_page(
            &self.api_base,
            &format!("{}/comments", urls::API_ROOT),
            &query,
            page,
            pagination::num_pages(total, page_size),
            total,
            views,
        ))
    }

    /// List the child comments of one response, paged locally.
    pub async fn get_response_comments(
        &self,
        requester: &Requester,
        comment_id: &str,
        page: u32,
        page_size: u32,
        requested_fields: RequestedFields,
    ) -> Result<Page<CommentView>> {
        let comment = self
            .client
            .retrieve_comment(comment_id)
            .await
            .map_err(|_| DiscussionError::CommentNotFound)?;
        let (thread, ctx) = self
            .thread_and_context(
                requester,
                &comment.thread_id,
                ThreadRetrieveOptions {
                    with_responses: true,
                    recursive: true,
                    ..ThreadRetrieveOptions::default()
                },
            )
            .await?;

        let children = find_response_children(&thread, comment_id);

        let skip = (page_size as usize) * (page.saturating_sub(1) as usize);
        let paged: Vec<&CommentData> = children
            .iter()
            .skip(skip)
            .take(page_size as usize)
            .copied()
            .collect();
        if paged.is_empty() && page != 1 {
            return Err(DiscussionError::PageNotFound);
        }

        let mut views: Vec<CommentView> = paged
            .iter()
            .map(|child| comment_view(child, &thread, &ctx))
            .collect();
        self.attach_profiles(&mut views, requested_fields.profile_image)
            .await?;

        let total = children.len() as u64;
        let query = vec![("page_size".to_string(), page_size.to_string())];
        Ok(pagination::build_page(
            &self.api_base,
            &format!("{}/comments/{comment_id}", urls::API_ROOT),
            &query,
            page,
            pagination::num_pages(total, page_size),
            total,
            views,
        ))
    }

    /// Create a comment on a thread (or under one of its responses).
    pub async fn create_comment(
        &self,
        requester: &Requester,
        request: CommentCreateRequest,
    ) -> Result<CommentView> {
        let thread_id = request
            .thread_id
            .clone()
            .ok_or_else(|| ValidationErrors::single("thread_id", "This field is required."))?;
        let (thread, ctx) = self
            .thread_and_context(requester, &thread_id, ThreadRetrieveOptions::default())
            .await?;

        if !ctx
            .course
            .discussion_open(chrono::Utc::now(), ctx.is_privileged)
        {
            return Err(DiscussionError::Blackout);
        }

        // No new comments on a closed thread.
        if thread.closed {
            return Err(DiscussionError::permission_denied());
        }

        permissions::check_fields(
            &permissions::initializable_comment_fields(&ctx),
            &request.present_fields(),
            "This field is not initializable.",
        )?;

        let mut errors = ValidationErrors::new();
        let body = match request.raw_body.as_deref() {
            None => {
                errors.add("raw_body", "This field is required.");
                None
            }
            Some(text) if text.trim().is_empty() => {
                errors.add("raw_body", "This field may not be blank.");
                None
            }
            Some(text) => Some(text.to_string()),
        };
        errors.into_result()?;

        let created = self
            .client
            .create_comment(CommentDraft {
                thread_id: thread_id.clone(),
                parent_id: request.parent_id.clone(),
                body: body.expect("validated"),
                user_id: requester.id.clone(),
                endorsed: request.endorsed.unwrap_or(false),
            })
            .await
            .map_err(internal)?;

        self.events
            .publish(ForumEvent::CommentCreated {
                comment_id: created.id.clone(),
                thread_id: thread_id.clone(),
                commentable_id: thread.commentable_id.clone(),
                actor: requester.username.clone(),
            })
            .await;

        let mut view = comment_view(&created, &thread, &ctx);
        self.apply_comment_actions(&ctx, &mut view, &request.actions())
            .await?;
        Ok(view)
    }

    /// Update a comment. Saves and publishes the edit event only when a
    /// non-action field was supplied.
    pub async fn update_comment(
        &self,
        requester: &Requester,
        comment_id: &str,
        request: CommentUpdateRequest,
    ) -> Result<CommentView> {
        let (comment, thread, ctx) = self.comment_and_context(requester, comment_id).await?;

        permissions::check_fields(
            &permissions::editable_comment_fields(&comment, &thread, &ctx),
            &request.present_fields(),
            "This field is not editable.",
        )?;

        if let Some(body) = request.raw_body.as_deref() {
            if body.trim().is_empty() {
                return Err(
                    ValidationErrors::single("raw_body", "This field may not be blank.").into(),
                );
            }
        }

        let saved = if request.has_saved_fields() {
            let updated = self
                .client
                .update_comment(
                    comment_id,
                    CommentPatch {
                        body: request.raw_body.clone(),
                        endorsed: request.endorsed,
                        endorse_user_id: request
                            .endorsed
                            .is_some()
                            .then(|| requester.id.clone()),
                    },
                )
                .await
                .map_err(internal)?;
            self.events
                .publish(ForumEvent::CommentEdited {
                    comment_id: comment_id.to_string(),
                    actor: requester.username.clone(),
                })
                .await;
            updated
        } else {
            comment
        };

        let mut view = comment_view(&saved, &thread, &ctx);
        self.apply_comment_actions(&ctx, &mut view, &request.actions())
            .await?;
        Ok(view)
    }

    /// Delete a comment. Owner or privileged only.
    pub async fn delete_comment(&self, requester: &Requester, comment_id: &str) -> Result<()> {
        let (comment, _thread, ctx) = self.comment_and_context(requester, comment_id).await?;
        if !permissions::can_delete(&comment.user_id, &ctx) {
            return Err(DiscussionError::permission_denied());
        }
        self.client
            .delete_comment(comment_id)
            .await
            .map_err(internal)?;
        self.events
            .publish(ForumEvent::CommentDeleted {
                comment_id: comment_id.to_string(),
                actor: requester.username.clone(),
            })
            .await;
        Ok(())
    }
}

/// Locate the response with the given id across the thread's response
/// collections and return its children.
fn find_response_children<'a>(thread: &'a ThreadData, comment_id: &str) -> Vec<&'a CommentData> {
    let responses: Box<dyn Iterator<Item = &CommentData>> = match thread.thread_type {
        ThreadType::Question => Box::new(
            thread
                .endorsed_responses
                .iter()
                .chain(thread.non_endorsed_responses.iter()),
        ),
        ThreadType::Discussion => Box::new(thread.children.iter()),
    };
    for response in responses {
        if response.id == comment_id {
            return response.children.iter().collect();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, children: Vec<CommentData>) -> CommentData {
        CommentData {
            id: id.into(),
            children,
            ..CommentData::default()
        }
    }

    #[test]
    fn response_children_found_across_question_collections() {
        let thread = ThreadData {
            thread_type: ThreadType::Question,
            endorsed_responses: vec![comment("r1", vec![comment("c1", vec![])])],
            non_endorsed_responses: vec![comment("r2", vec![comment("c2", vec![])])],
            ..ThreadData::default()
        };
        assert_eq!(find_response_children(&thread, "r1")[0].id, "c1");
        assert_eq!(find_response_children(&thread, "r2")[0].id, "c2");
        assert!(find_response_children(&thread, "r9").is_empty());
    }

    #[test]
    fn response_children_found_in_discussion_children() {
        let thread = ThreadData {
            thread_type: ThreadType::Discussion,
            children: vec![comment("r1", vec![comment("c1", vec![])])],
            ..ThreadData::default()
        };
        assert_eq!(find_response_children(&thread, "r1").len(), 1);
    }
}
