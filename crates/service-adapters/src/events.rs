//! Event sink that emits domain events as structured tracing records.
//! Downstream consumers (analytics pipelines, team sync) tail these; a
//! failed emit never affects the request.

use async_trait::async_trait;
use domains::{ContentRef, EventSink, ForumEvent};
use tracing::info;

#[derive(Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: ForumEvent) {
        match event {
            ForumEvent::ThreadCreated {
                thread_id,
                course_id,
                commentable_id,
                actor,
                followed,
            } => info!(
                target: "forum_events",
                event = "thread_created",
                %thread_id, %course_id, %commentable_id, %actor, followed
            ),
            ForumEvent::ThreadEdited { thread_id, actor } => {
                info!(target: "forum_events", event = "thread_edited", %thread_id, %actor)
            }
            ForumEvent::ThreadDeleted { thread_id, actor } => {
                info!(target: "forum_events", event = "thread_deleted", %thread_id, %actor)
            }
            ForumEvent::CommentCreated {
                comment_id,
                thread_id,
                commentable_id,
                actor,
            } => info!(
                target: "forum_events",
                event = "comment_created",
                %comment_id, %thread_id, %commentable_id, %actor
            ),
            ForumEvent::CommentEdited { comment_id, actor } => {
                info!(target: "forum_events", event = "comment_edited", %comment_id, %actor)
            }
            ForumEvent::CommentDeleted { comment_id, actor } => {
                info!(target: "forum_events", event = "comment_deleted", %comment_id, %actor)
            }
            ForumEvent::Voted {
                target,
                actor,
                undo,
            } => {
                let (content_type, content_id) = match &target {
                    ContentRef::Thread(id) => ("thread", id.as_str()),
                    ContentRef::Comment(id) => ("comment", id.as_str()),
                };
                info!(
                    target: "forum_events",
                    event = "voted",
                    content_type, content_id, %actor, undo
                )
            }
        }
    }
}
