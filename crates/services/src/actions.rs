//! The extra-action dispatcher: boolean actions distinct from the saved
//! record fields, each performed through a separate comment-service call.
//!
//! An action only fires when the requested value differs from the entity's
//! current serialized value. The variants are a closed set; unrecognized
//! action names never reach this module (body deserialization rejects them).

use domains::{ContentRef, ForumEvent, Result};

use crate::context::Context;
use crate::internal;
use crate::serialize::{CommentView, ThreadView};
use crate::DiscussionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadAction {
    Following(bool),
    AbuseFlagged(bool),
    Voted(bool),
    Read(bool),
    Pinned(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Voted(bool),
    AbuseFlagged(bool),
}

impl DiscussionService {
    pub(crate) async fn apply_thread_actions(
        &self,
        ctx: &Context,
        view: &mut ThreadView,
        actions: &[ThreadAction],
    ) -> Result<()> {
        let user_id = ctx.requester.id.as_str();
        let target = ContentRef::Thread(view.id.clone());
        for action in actions {
            match *action {
                ThreadAction::Following(value) => {
                    if value != view.following {
                        view.following = value;
                        if value {
                            self.client.follow(user_id, &target).await
                        } else {
                            self.client.unfollow(user_id, &target).await
                        }
                        .map_err(internal)?;
                    }
                }
                ThreadAction::AbuseFlagged(value) => {
                    if value != view.abuse_flagged {
                        view.abuse_flagged = value;
                        if value {
                            self.client.flag_abuse(user_id, &target).await
                        } else {
                            self.client.unflag_abuse(user_id, &target).await
                        }
                        .map_err(internal)?;
                    }
                }
                ThreadAction::Voted(value) => {
                    if value != view.voted {
                        self.vote_on(ctx, &target, value, &mut view.voted, &mut view.vote_count)
                            .await?;
                    }
                }
                ThreadAction::Read(value) => {
                    if value != view.read {
                        view.read = value;
                        if value {
                            self.client.mark_read(user_id, &target).await.map_err(internal)?;
                            // Marking a thread read marks all of its
                            // responses and comments read too.
                            view.unread_comment_count = 0;
                        }
                    }
                }
                ThreadAction::Pinned(value) => {
                    if value != view.pinned {
                        view.pinned = value;
                        if value {
                            self.client.pin_thread(user_id, &view.id).await
                        } else {
                            self.client.unpin_thread(user_id, &view.id).await
                        }
                        .map_err(internal)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) async fn apply_comment_actions(
        &self,
        ctx: &Context,
        view: &mut CommentView,
        actions: &[CommentAction],
    ) -> Result<()> {
        let user_id = ctx.requester.id.as_str();
        let target = ContentRef::Comment(view.id.clone());
        for action in actions {
            match *action {
                CommentAction::Voted(value) => {
                    if value != view.voted {
                        self.vote_on(ctx, &target, value, &mut view.voted, &mut view.vote_count)
                            .await?;
                    }
                }
                CommentAction::AbuseFlagged(value) => {
                    if value != view.abuse_flagged {
                        view.abuse_flagged = value;
                        if value {
                            self.client.flag_abuse(user_id, &target).await
                        } else {
                            self.client.unflag_abuse(user_id, &target).await
                        }
                        .map_err(internal)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Vote or undo a vote, adjust the serialized count by the delta, and
    /// publish one vote event per call.
    async fn vote_on(
        &self,
        ctx: &Context,
        target: &ContentRef,
        value: bool,
        voted: &mut bool,
        vote_count: &mut i64,
    ) -> Result<()> {
        let user_id = ctx.requester.id.as_str();
        *voted = value;
        if value {
            self.client.vote(user_id, target).await.map_err(internal)?;
            *vote_count += 1;
        } else {
            self.client.unvote(user_id, target).await.map_err(internal)?;
            *vote_count -= 1;
        }
        self.events
            .publish(ForumEvent::Voted {
                target: target.clone(),
                actor: ctx.requester.username.clone(),
                undo: !value,
            })
            .await;
        Ok(())
    }
}
