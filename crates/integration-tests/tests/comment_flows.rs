//! Comment listing, creation, endorsement, and deletion flows.

use domains::{CommentData, DiscussionError, ForumEvent, ThreadData, ThreadType};
use integration_tests::fixtures::{learner, staff, thread, Harness, LEARNER_ID, STAFF_ID};
use services::{CommentCreateRequest, CommentUpdateRequest, RequestedFields};

fn response(id: &str, children: Vec<CommentData>) -> CommentData {
    CommentData {
        id: id.to_string(),
        thread_id: "w1".to_string(),
        user_id: LEARNER_ID.to_string(),
        username: "learner".to_string(),
        body: "a response".to_string(),
        children,
        ..CommentData::default()
    }
}

fn question_thread() -> ThreadData {
    ThreadData {
        thread_type: ThreadType::Question,
        ..thread("w1")
    }
}

#[tokio::test]
async fn question_thread_requires_the_endorsed_param() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_retrieve_thread()
        .returning(|_, _| Ok(question_thread()));
    let (service, _) = harness.build();
    let err = service
        .get_comment_list(&learner(), "w1", None, 1, 10, RequestedFields::default())
        .await
        .unwrap_err();
    match err {
        DiscussionError::Validation(errors) => assert_eq!(
            errors.messages_for("endorsed"),
            ["This field is required for question threads."]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn discussion_thread_rejects_the_endorsed_param() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_retrieve_thread()
        .returning(|_, _| Ok(thread("w1")));
    let (service, _) = harness.build();
    let err = service
        .get_comment_list(
            &learner(),
            "w1",
            Some(true),
            1,
            10,
            RequestedFields::default(),
        )
        .await
        .unwrap_err();
    match err {
        DiscussionError::Validation(errors) => assert_eq!(
            errors.messages_for("endorsed"),
            ["This field may not be specified for discussion threads."]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn endorsed_responses_are_paged_locally() {
    let mut harness = Harness::new();
    harness.client.expect_retrieve_thread().returning(|_, _| {
        Ok(ThreadData {
            endorsed_responses: vec![
                response("r1", vec![]),
                response("r2", vec![]),
                response("r3", vec![]),
            ],
            ..question_thread()
        })
    });
    let (service, _) = harness.build();
    let page = service
        .get_comment_list(
            &learner(),
            "w1",
            Some(true),
            2,
            2,
            RequestedFields::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.num_pages, 2);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, "r3");
    assert!(page.next.is_none());
    assert!(page.previous.as_deref().unwrap().contains("endorsed=true"));
}

#[tokio::test]
async fn empty_page_beyond_the_first_is_not_found() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_retrieve_thread()
        .returning(|_, _| Ok(thread("w1")));
    let (service, _) = harness.build();
    let err = service
        .get_comment_list(&learner(), "w1", None, 2, 10, RequestedFields::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscussionError::PageNotFound));

    let mut harness = Harness::new();
    harness
        .client
        .expect_retrieve_thread()
        .returning(|_, _| Ok(thread("w1")));
    let (service, _) = harness.build();
    let page = service
        .get_comment_list(&learner(), "w1", None, 1, 10, RequestedFields::default())
        .await
        .unwrap();
    assert!(page.results.is_empty());
    assert_eq!(page.num_pages, 1);
}

#[tokio::test]
async fn response_children_are_paged_locally() {
    let mut harness = Harness::new();
    harness.client.expect_retrieve_comment().returning(|_| {
        Ok(CommentData {
            id: "r1".to_string(),
            thread_id: "w1".to_string(),
            ..CommentData::default()
        })
    });
    harness.client.expect_retrieve_thread().returning(|_, _| {
        Ok(ThreadData {
            children: vec![response(
                "r1",
                vec![
                    response("c1", vec![]),
                    response("c2", vec![]),
                    response("c3", vec![]),
                ],
            )],
            ..thread("w1")
        })
    });
    let (service, _) = harness.build();
    let page = service
        .get_response_comments(&learner(), "r1", 2, 2, RequestedFields::default())
        .await
        .unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, "c3");
}

#[tokio::test]
async fn response_children_page_beyond_range_is_not_found() {
    let mut harness = Harness::new();
    harness.client.expect_retrieve_comment().returning(|_| {
        Ok(CommentData {
            id: "r1".to_string(),
            thread_id: "w1".to_string(),
            ..CommentData::default()
        })
    });
    harness.client.expect_retrieve_thread().returning(|_, _| {
        Ok(ThreadData {
            children: vec![response("r1", vec![response("c1", vec![])])],
            ..thread("w1")
        })
    });
    let (service, _) = harness.build();
    let err = service
        .get_response_comments(&learner(), "r1", 2, 10, RequestedFields::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscussionError::PageNotFound));
}

#[tokio::test]
async fn childless_response_yields_an_empty_first_page() {
    let mut harness = Harness::new();
    harness.client.expect_retrieve_comment().returning(|_| {
        Ok(CommentData {
            id: "r1".to_string(),
            thread_id: "w1".to_string(),
            ..CommentData::default()
        })
    });
    harness.client.expect_retrieve_thread().returning(|_, _| {
        Ok(ThreadData {
            children: vec![response("r1", vec![])],
            ..thread("w1")
        })
    });
    let (service, _) = harness.build();
    let page = service
        .get_response_comments(&learner(), "r1", 1, 10, RequestedFields::default())
        .await
        .unwrap();
    assert!(page.results.is_empty());
    assert_eq!(page.count, 0);
    assert_eq!(page.num_pages, 1);
}

#[tokio::test]
async fn missing_comment_is_reinterpreted_as_not_found() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_retrieve_comment()
        .returning(|_| Err(domains::ClientError::Status(404)));
    let (service, _) = harness.build();
    let err = service
        .get_response_comments(&learner(), "nope", 1, 10, RequestedFields::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscussionError::CommentNotFound));
}

#[tokio::test]
async fn closed_thread_rejects_new_comments() {
    let mut harness = Harness::new();
    harness.client.expect_retrieve_thread().returning(|_, _| {
        Ok(ThreadData {
            closed: true,
            ..thread("w1")
        })
    });
    let (service, _) = harness.build();
    let request = CommentCreateRequest {
        thread_id: Some("w1".to_string()),
        raw_body: Some("hello".to_string()),
        ..CommentCreateRequest::default()
    };
    let err = service
        .create_comment(&learner(), request)
        .await
        .unwrap_err();
    assert!(matches!(err, DiscussionError::PermissionDenied { .. }));
}

#[tokio::test]
async fn comment_creation_publishes_an_event() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_retrieve_thread()
        .returning(|_, _| Ok(thread("w1")));
    harness
        .client
        .expect_create_comment()
        .withf(|draft| draft.thread_id == "w1" && draft.parent_id.as_deref() == Some("r1"))
        .returning(|draft| {
            Ok(CommentData {
                id: "c9".to_string(),
                thread_id: draft.thread_id.clone(),
                parent_id: draft.parent_id.clone(),
                body: draft.body.clone(),
                user_id: draft.user_id.clone(),
                ..CommentData::default()
            })
        });
    let (service, events) = harness.build();
    let request = CommentCreateRequest {
        thread_id: Some("w1".to_string()),
        parent_id: Some("r1".to_string()),
        raw_body: Some("hello".to_string()),
        ..CommentCreateRequest::default()
    };
    let view = service.create_comment(&learner(), request).await.unwrap();
    assert_eq!(view.id, "c9");
    assert!(matches!(
        events.all().as_slice(),
        [ForumEvent::CommentCreated { comment_id, .. }] if comment_id == "c9"
    ));
}

#[tokio::test]
async fn learner_cannot_endorse_on_a_discussion_thread() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_retrieve_comment()
        .returning(|_| Ok(response("r1", vec![])));
    harness
        .client
        .expect_retrieve_thread()
        .returning(|_, _| Ok(thread("w1")));
    let (service, _) = harness.build();
    let request = CommentUpdateRequest {
        endorsed: Some(true),
        ..CommentUpdateRequest::default()
    };
    let err = service
        .update_comment(&learner(), "r1", request)
        .await
        .unwrap_err();
    match err {
        DiscussionError::Validation(errors) => assert_eq!(
            errors.messages_for("endorsed"),
            ["This field is not editable."]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn moderator_endorsement_records_the_endorser() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_retrieve_comment()
        .returning(|_| Ok(response("r1", vec![])));
    harness
        .client
        .expect_retrieve_thread()
        .returning(|_, _| Ok(thread("w1")));
    harness
        .client
        .expect_update_comment()
        .withf(|id, patch| {
            id == "r1"
                && patch.endorsed == Some(true)
                && patch.endorse_user_id.as_deref() == Some(STAFF_ID)
        })
        .returning(|_, _| {
            Ok(CommentData {
                endorsed: true,
                endorsed_by: Some("staff".to_string()),
                ..response("r1", vec![])
            })
        });
    let (service, events) = harness.build();
    let request = CommentUpdateRequest {
        endorsed: Some(true),
        ..CommentUpdateRequest::default()
    };
    let view = service.update_comment(&staff(), "r1", request).await.unwrap();
    assert!(view.endorsed);
    assert!(matches!(
        events.all().as_slice(),
        [ForumEvent::CommentEdited { .. }]
    ));
}

#[tokio::test]
async fn question_author_may_endorse_their_responses() {
    let mut harness = Harness::new();
    harness
        .client
        .expect_retrieve_comment()
        .returning(|_| Ok(response("r1", vec![])));
    harness
        .client
        .expect_retrieve_thread()
        .returning(|_, _| Ok(question_thread()));
    harness
        .client
        .expect_update_comment()
        .returning(|_, _| {
            Ok(CommentData {
                endorsed: true,
                ..response("r1", vec![])
            })
        });
    let (service, _) = harness.build();
    let request = CommentUpdateRequest {
        endorsed: Some(true),
        ..CommentUpdateRequest::default()
    };
    let view = service
        .update_comment(&learner(), "r1", request)
        .await
        .unwrap();
    assert!(view.endorsed);
}

#[tokio::test]
async fn comment_deletion_needs_ownership_or_privilege() {
    let mut harness = Harness::new();
    harness.client.expect_retrieve_comment().returning(|_| {
        Ok(CommentData {
            user_id: "99".to_string(),
            ..response("r1", vec![])
        })
    });
    harness
        .client
        .expect_retrieve_thread()
        .returning(|_, _| Ok(thread("w1")));
    let (service, _) = harness.build();
    let err = service.delete_comment(&learner(), "r1").await.unwrap_err();
    assert!(matches!(err, DiscussionError::PermissionDenied { .. }));
}
