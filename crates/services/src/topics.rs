//! Course topic listing: courseware-linked topics grouped into category
//! trees, freestanding topics flat, both merged with per-topic thread counts.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use domains::{CourseKey, DiscussionError, Requester, Result, ThreadCounts};
use serde::Serialize;

use crate::context::Context;
use crate::internal;
use crate::urls;
use crate::DiscussionService;

/// One node of the topic tree. Category nodes have no id and no counts;
/// leaves always carry counts (zeroed when the topic has no threads yet).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopicView {
    pub id: Option<String>,
    pub name: String,
    pub thread_list_url: String,
    pub children: Vec<TopicView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_counts: Option<ThreadCounts>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CourseTopicsView {
    pub courseware_topics: Vec<TopicView>,
    pub non_courseware_topics: Vec<TopicView>,
}

impl DiscussionService {
    /// The course topic listing, filtered by `topic_ids` when given. Fails
    /// with `DiscussionNotFound` naming any requested id found in neither
    /// the courseware nor the freestanding set.
    pub async fn get_course_topics(
        &self,
        requester: &Requester,
        course_key: &CourseKey,
        topic_ids: Option<&BTreeSet<String>>,
    ) -> Result<CourseTopicsView> {
        let ctx = self.resolve_course(requester, course_key).await?;
        let thread_counts = self
            .client
            .commentable_counts(course_key)
            .await
            .map_err(internal)?;

        let mut existing_ids = BTreeSet::new();
        let courseware_topics =
            self.courseware_topics(&ctx, topic_ids, &thread_counts, &mut existing_ids);
        let non_courseware_topics =
            self.non_courseware_topics(&ctx, topic_ids, &thread_counts, &mut existing_ids);

        if let Some(requested) = topic_ids {
            let missing: Vec<String> = requested.difference(&existing_ids).cloned().collect();
            if !missing.is_empty() {
                return Err(DiscussionError::DiscussionNotFound {
                    missing_ids: missing,
                });
            }
        }

        Ok(CourseTopicsView {
            courseware_topics,
            non_courseware_topics,
        })
    }

    fn courseware_topics(
        &self,
        ctx: &Context,
        topic_ids: Option<&BTreeSet<String>>,
        thread_counts: &HashMap<String, ThreadCounts>,
        existing_ids: &mut BTreeSet<String>,
    ) -> Vec<TopicView> {
        // Group by category, categories in name order, items by sort key
        // falling back to the display title.
        let mut by_category: BTreeMap<&str, Vec<&domains::CoursewareTopic>> = BTreeMap::new();
        for topic in &ctx.course.courseware_topics {
            by_category.entry(&topic.category).or_default().push(topic);
        }

        let mut courseware = Vec::new();
        for (category, mut topics) in by_category {
            topics.sort_by_key(|t| t.sort_key.clone().unwrap_or_else(|| t.title.clone()));

            let mut children = Vec::new();
            for topic in &topics {
                if topic_ids.map_or(true, |ids| ids.contains(&topic.id)) {
                    children.push(self.leaf_topic(
                        ctx,
                        &topic.id,
                        &topic.title,
                        thread_counts,
                    ));
                    if topic_ids.is_some() {
                        existing_ids.insert(topic.id.clone());
                    }
                }
            }

            if topic_ids.is_none() || !children.is_empty() {
                let all_ids: Vec<String> = topics.iter().map(|t| t.id.clone()).collect();
                courseware.push(TopicView {
                    id: None,
                    name: category.to_string(),
                    thread_list_url: urls::thread_list_url(
                        &self.api_base,
                        &ctx.course.key,
                        &all_ids,
                        false,
                    ),
                    children,
                    thread_counts: None,
                });
            }
        }
        courseware
    }

    fn non_courseware_topics(
        &self,
        ctx: &Context,
        topic_ids: Option<&BTreeSet<String>>,
        thread_counts: &HashMap<String, ThreadCounts>,
        existing_ids: &mut BTreeSet<String>,
    ) -> Vec<TopicView> {
        let mut topics: Vec<&domains::FreestandingTopic> =
            ctx.course.freestanding_topics.iter().collect();
        topics.sort_by_key(|t| t.sort_key.clone().unwrap_or_else(|| t.name.clone()));

        let mut views = Vec::new();
        for topic in topics {
            if topic_ids.map_or(true, |ids| ids.contains(&topic.id)) {
                views.push(self.leaf_topic(ctx, &topic.id, &topic.name, thread_counts));
                if topic_ids.is_some() {
                    existing_ids.insert(topic.id.clone());
                }
            }
        }
        views
    }

    fn leaf_topic(
        &self,
        ctx: &Context,
        id: &str,
        name: &str,
        thread_counts: &HashMap<String, ThreadCounts>,
    ) -> TopicView {
        TopicView {
            id: Some(id.to_string()),
            name: name.to_string(),
            thread_list_url: urls::thread_list_url(
                &self.api_base,
                &ctx.course.key,
                &[id.to_string()],
                false,
            ),
            children: Vec::new(),
            thread_counts: Some(thread_counts.get(id).copied().unwrap_or_default()),
        }
    }
}
