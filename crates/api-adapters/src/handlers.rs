//! Route handlers. Each one parses the wire shape, delegates to the
//! service, and lets [`ApiError`] turn failures into responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::CourseKey;
use services::{
    CommentCreateRequest, CommentUpdateRequest, CommentView, CourseInfo, CourseTopicsView, Page,
    ThreadCreateRequest, ThreadListPage, ThreadUpdateRequest, ThreadView,
};

use crate::error::ApiError;
use crate::extract::Identity;
use crate::params::{
    CommentListQuery, FieldsQuery, PageBounds, PagedQuery, ThreadListQuery, TopicsQuery,
};
use crate::AppState;

fn bounds(state: &AppState) -> PageBounds {
    PageBounds {
        default_size: state.default_page_size,
        max_size: state.max_page_size,
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::Malformed(rejection.body_text())),
    }
}

pub async fn get_course(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(course_id): Path<String>,
) -> Result<Json<CourseInfo>, ApiError> {
    let course = state
        .service
        .get_course(&requester, &CourseKey::new(course_id))
        .await?;
    Ok(Json(course))
}

pub async fn get_course_topics(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(course_id): Path<String>,
    Query(query): Query<TopicsQuery>,
) -> Result<Json<CourseTopicsView>, ApiError> {
    let topic_ids = query.topic_ids();
    let topics = state
        .service
        .get_course_topics(&requester, &CourseKey::new(course_id), topic_ids.as_ref())
        .await?;
    Ok(Json(topics))
}

pub async fn list_threads(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Query(query): Query<ThreadListQuery>,
) -> Result<Json<ThreadListPage>, ApiError> {
    let (course_key, params) = query.parse(bounds(&state))?;
    let page = state
        .service
        .get_thread_list(&requester, &course_key, params)
        .await?;
    Ok(Json(page))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(thread_id): Path<String>,
    Query(query): Query<FieldsQuery>,
) -> Result<Json<ThreadView>, ApiError> {
    let thread = state
        .service
        .get_thread(&requester, &thread_id, query.parse())
        .await?;
    Ok(Json(thread))
}

pub async fn create_thread(
    State(state): State<AppState>,
    Identity(requester): Identity,
    payload: Result<Json<ThreadCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ThreadView>), ApiError> {
    let request = body(payload)?;
    let thread = state.service.create_thread(&requester, request).await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn update_thread(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(thread_id): Path<String>,
    payload: Result<Json<ThreadUpdateRequest>, JsonRejection>,
) -> Result<Json<ThreadView>, ApiError> {
    let request = body(payload)?;
    let thread = state
        .service
        .update_thread(&requester, &thread_id, request)
        .await?;
    Ok(Json(thread))
}

pub async fn delete_thread(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(thread_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_thread(&requester, &thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_comments(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<Page<CommentView>>, ApiError> {
    let (thread_id, endorsed, page, page_size, fields) = query.parse(bounds(&state))?;
    let comments = state
        .service
        .get_comment_list(&requester, &thread_id, endorsed, page, page_size, fields)
        .await?;
    Ok(Json(comments))
}

pub async fn get_response_comments(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(comment_id): Path<String>,
    Query(query): Query<PagedQuery>,
) -> Result<Json<Page<CommentView>>, ApiError> {
    let (page, page_size, fields) = query.parse(bounds(&state))?;
    let comments = state
        .service
        .get_response_comments(&requester, &comment_id, page, page_size, fields)
        .await?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Identity(requester): Identity,
    payload: Result<Json<CommentCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentView>), ApiError> {
    let request = body(payload)?;
    let comment = state.service.create_comment(&requester, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(comment_id): Path<String>,
    payload: Result<Json<CommentUpdateRequest>, JsonRejection>,
) -> Result<Json<CommentView>, ApiError> {
    let request = body(payload)?;
    let comment = state
        .service
        .update_comment(&requester, &comment_id, request)
        .await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Identity(requester): Identity,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_comment(&requester, &comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
