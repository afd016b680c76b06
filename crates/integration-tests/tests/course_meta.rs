//! Course information and topic-tree behavior.

use std::collections::{BTreeSet, HashMap};

use domains::{DiscussionError, Requester, ThreadCounts};
use integration_tests::fixtures::{course, course_key, learner, staff, Harness, COURSE_ID};

#[tokio::test]
async fn stranger_sees_course_not_found() {
    let (service, _) = Harness::new().build();
    let stranger = Requester {
        id: "77".to_string(),
        username: "stranger".to_string(),
    };
    let err = service
        .get_course(&stranger, &course_key())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscussionError::CourseNotFound));
}

#[tokio::test]
async fn disabled_discussion_is_reported() {
    let mut disabled = course();
    disabled.discussion_enabled = false;
    let (service, _) = Harness::with_course(disabled).build();
    let err = service
        .get_course(&learner(), &course_key())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscussionError::DiscussionDisabled));
}

#[tokio::test]
async fn course_info_reports_roles_and_urls() {
    let (service, _) = Harness::new().build();
    let info = service.get_course(&staff(), &course_key()).await.unwrap();
    assert_eq!(info.id, COURSE_ID);
    assert!(info.user_is_privileged);
    assert_eq!(info.user_roles, vec!["Moderator".to_string()]);
    assert!(info.thread_list_url.contains("/api/discussion/v1/threads"));
    assert!(info.following_thread_list_url.contains("following=true"));
    assert!(info.topics_url.contains("/api/discussion/v1/course_topics/"));
}

#[tokio::test]
async fn learner_is_not_privileged() {
    let (service, _) = Harness::new().build();
    let info = service.get_course(&learner(), &course_key()).await.unwrap();
    assert!(!info.user_is_privileged);
    assert!(info.user_roles.is_empty());
}

#[tokio::test]
async fn topics_are_grouped_and_counted() {
    let mut harness = Harness::new();
    harness.client.expect_commentable_counts().returning(|_| {
        Ok(HashMap::from([(
            "t1".to_string(),
            ThreadCounts {
                discussion: 4,
                question: 2,
            },
        )]))
    });
    let (service, _) = harness.build();
    let topics = service
        .get_course_topics(&learner(), &course_key(), None)
        .await
        .unwrap();

    assert_eq!(topics.courseware_topics.len(), 1);
    let week = &topics.courseware_topics[0];
    assert_eq!(week.name, "Week 1");
    assert!(week.id.is_none());
    assert!(week.thread_counts.is_none());
    let child_ids: Vec<_> = week
        .children
        .iter()
        .map(|child| child.id.clone().unwrap())
        .collect();
    assert_eq!(child_ids, vec!["t1", "t2"]);
    assert_eq!(
        week.children[0].thread_counts,
        Some(ThreadCounts {
            discussion: 4,
            question: 2
        })
    );
    // Topics without threads still carry zeroed counts.
    assert_eq!(week.children[1].thread_counts, Some(ThreadCounts::default()));

    assert_eq!(topics.non_courseware_topics.len(), 1);
    assert_eq!(topics.non_courseware_topics[0].id.as_deref(), Some("general"));
}

#[tokio::test]
async fn missing_topic_ids_are_named_in_the_error() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_commentable_counts()
        .returning(|_| Ok(HashMap::new()));
    let (service, _) = harness.build();
    let requested = BTreeSet::from(["t1".to_string(), "t3".to_string(), "t4".to_string()]);
    let err = service
        .get_course_topics(&learner(), &course_key(), Some(&requested))
        .await
        .unwrap_err();
    match err {
        DiscussionError::DiscussionNotFound { missing_ids } => {
            assert_eq!(missing_ids, vec!["t3", "t4"]);
        }
        other => panic!("expected missing-topic error, got {other:?}"),
    }
}

#[tokio::test]
async fn topic_filter_narrows_the_tree() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_commentable_counts()
        .returning(|_| Ok(HashMap::new()));
    let (service, _) = harness.build();
    let requested = BTreeSet::from(["general".to_string()]);
    let topics = service
        .get_course_topics(&learner(), &course_key(), Some(&requested))
        .await
        .unwrap();
    assert!(topics.courseware_topics.is_empty());
    assert_eq!(topics.non_courseware_topics.len(), 1);
}
