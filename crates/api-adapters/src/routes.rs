use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the versioned discussion API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/discussion/v1/courses/{course_id}", get(handlers::get_course))
        .route(
            "/api/discussion/v1/course_topics/{course_id}",
            get(handlers::get_course_topics),
        )
        .route(
            "/api/discussion/v1/threads",
            get(handlers::list_threads).post(handlers::create_thread),
        )
        .route(
            "/api/discussion/v1/threads/{thread_id}",
            get(handlers::get_thread)
                .patch(handlers::update_thread)
                .delete(handlers::delete_thread),
        )
        .route(
            "/api/discussion/v1/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/api/discussion/v1/comments/{comment_id}",
            get(handlers::get_response_comments)
                .patch(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
