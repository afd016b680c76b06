//! Thread listing behavior against the mocked comment service.

use domains::{DiscussionError, SortKey};
use integration_tests::fixtures::{
    course_key, learner, staff, thread, thread_page, Harness, LEARNER_ID, STAFF_ID,
};
use services::ThreadListParams;

#[tokio::test]
async fn exclusive_filters_are_rejected_together() {
    let (service, _) = Harness::new().build();
    let params = ThreadListParams {
        topic_id_list: vec!["t1".to_string()],
        text_search: Some("tree".to_string()),
        ..ThreadListParams::default()
    };
    let err = service
        .get_thread_list(&learner(), &course_key(), params)
        .await
        .unwrap_err();
    match err {
        DiscussionError::Validation(errors) => {
            assert!(errors.messages_for("__all__")[0].contains("mutually exclusive"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_author_yields_an_empty_page() {
    // No comment-service expectations: the listing must short-circuit
    // without revealing whether the username exists.
    let (service, _) = Harness::new().build();
    let params = ThreadListParams {
        author: Some("ghost".to_string()),
        ..ThreadListParams::default()
    };
    let listing = service
        .get_thread_list(&learner(), &course_key(), params)
        .await
        .unwrap();
    assert!(listing.page.results.is_empty());
    assert_eq!(listing.page.count, 0);
    assert_eq!(listing.page.num_pages, 1);
}

#[tokio::test]
async fn count_flagged_needs_moderator_access() {
    let (service, _) = Harness::new().build();
    let params = ThreadListParams {
        count_flagged: true,
        ..ThreadListParams::default()
    };
    let err = service
        .get_thread_list(&learner(), &course_key(), params)
        .await
        .unwrap_err();
    match err {
        DiscussionError::PermissionDenied { detail } => {
            assert!(detail.unwrap().contains("count_flagged"));
        }
        other => panic!("expected permission denial, got {other:?}"),
    }
}

#[tokio::test]
async fn out_of_range_page_is_page_not_found() {
    let mut harness = Harness::new();
    // The comment service clamps to the last page instead of failing.
    harness
        .client
        .expect_search_threads()
        .returning(|_| Ok(thread_page(vec![], 1, 1)));
    let (service, _) = harness.build();
    let params = ThreadListParams {
        page: 7,
        ..ThreadListParams::default()
    };
    let err = service
        .get_thread_list(&learner(), &course_key(), params)
        .await
        .unwrap_err();
    assert!(matches!(err, DiscussionError::PageNotFound));
}

#[tokio::test]
async fn following_reads_the_subscription_listing() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_subscribed_threads()
        .withf(|user_id, query| {
            user_id == LEARNER_ID && query.course_id.is_none() && query.commentable_ids.is_none()
        })
        .returning(|_, _| Ok(thread_page(vec![thread("w1")], 1, 1)));
    let (service, _) = harness.build();
    let params = ThreadListParams {
        following: true,
        ..ThreadListParams::default()
    };
    let listing = service
        .get_thread_list(&learner(), &course_key(), params)
        .await
        .unwrap();
    assert_eq!(listing.page.results.len(), 1);
    assert_eq!(listing.page.results[0].id, "w1");
}

#[tokio::test]
async fn moderator_listing_is_not_group_scoped() {
    let mut harness = Harness::new();
    harness.courses = harness.courses.with_group("staff", &course_key(), 7);
    harness
        .client
        .expect_search_threads()
        .withf(|query| query.group_id.is_none() && query.user_id == STAFF_ID)
        .returning(|_| Ok(thread_page(vec![], 1, 1)));
    let (service, _) = harness.build();
    service
        .get_thread_list(&staff(), &course_key(), ThreadListParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn learner_listing_carries_their_cohort_group() {
    let mut harness = Harness::new();
    harness.courses = harness.courses.with_group("learner", &course_key(), 7);
    harness
        .client
        .expect_search_threads()
        .withf(|query| query.group_id == Some(7))
        .returning(|_| Ok(thread_page(vec![], 1, 1)));
    let (service, _) = harness.build();
    service
        .get_thread_list(&learner(), &course_key(), ThreadListParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn topic_filter_and_ordering_reach_the_query() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_search_threads()
        .withf(|query| {
            query.commentable_ids.as_deref() == Some("t1,t2")
                && query.sort_key == Some(SortKey::Votes)
                && query.course_id.as_deref() == Some("course-v1:Test+Forum+2026")
        })
        .returning(|_| Ok(thread_page(vec![], 1, 1)));
    let (service, _) = harness.build();
    let params = ThreadListParams {
        topic_id_list: vec!["t1".to_string(), "t2".to_string()],
        order_by: services::ThreadOrdering::VoteCount,
        ..ThreadListParams::default()
    };
    service
        .get_thread_list(&learner(), &course_key(), params)
        .await
        .unwrap();
}

#[tokio::test]
async fn pagination_links_reproduce_the_listing_query() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_search_threads()
        .returning(|_| Ok(thread_page(vec![thread("w1")], 2, 3)));
    let (service, _) = harness.build();
    let params = ThreadListParams {
        page: 2,
        ..ThreadListParams::default()
    };
    let listing = service
        .get_thread_list(&learner(), &course_key(), params)
        .await
        .unwrap();
    let next = listing.page.next.unwrap();
    assert!(next.contains("page=3"));
    assert!(next.contains("course_id="));
    assert!(listing.page.previous.unwrap().contains("page=1"));
}
