//! Discussion API server.
//!
//! Wires the HTTP adapters around the orchestration service and serves the
//! axum router. Course metadata and the username directory are held in
//! memory and seeded at startup; the comment-storage and profile services
//! are remote.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_adapters::AppState;
use chrono::{TimeZone, Utc};
use configs::AppConfig;
use domains::{
    BlackoutWindow, Course, CourseKey, CoursewareTopic, DivisionSettings, FreestandingTopic,
};
use service_adapters::{
    HttpCommentClient, HttpProfileStore, InMemoryCourseStore, InMemoryUserDirectory,
    TracingEventSink,
};
use services::DiscussionService;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;

    let comment_base = Url::parse(&config.comment_service.base_url)
        .context("invalid comment_service.base_url")?;
    let profile_base = Url::parse(&config.profile_service.base_url)
        .context("invalid profile_service.base_url")?;
    let api_base = Url::parse(&config.api.base_url).context("invalid api.base_url")?;

    let client = Arc::new(HttpCommentClient::new(
        comment_base,
        config.comment_service.api_key.clone(),
        Duration::from_secs(config.comment_service.timeout_secs),
    )?);
    let profiles = Arc::new(HttpProfileStore::new(profile_base));
    let courses = Arc::new(seed_courses());
    let users = Arc::new(seed_users());
    let events = Arc::new(TracingEventSink::new());

    let service = Arc::new(DiscussionService::new(
        courses, client, users, profiles, events, api_base,
    ));
    let state = AppState::new(
        service,
        config.api.default_page_size,
        config.api.max_page_size,
    );

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr())
        .await
        .context("failed to bind server address")?;
    info!(addr = %config.server.bind_addr(), "listening");
    axum::serve(listener, api_adapters::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

/// Demo course catalog. A deployment backed by a real LMS replaces this
/// with its own `CourseStore` implementation.
fn seed_courses() -> InMemoryCourseStore {
    let key = CourseKey::new("course-v1:Demo+Forum+2026");
    let course = Course {
        key: key.clone(),
        discussion_enabled: true,
        allow_anonymous: false,
        allow_anonymous_to_peers: false,
        blackouts: vec![BlackoutWindow {
            start: Utc.with_ymd_and_hms(2026, 12, 24, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 12, 26, 0, 0, 0).unwrap(),
        }],
        courseware_topics: vec![
            CoursewareTopic {
                id: "week-1".to_string(),
                category: "Week 1".to_string(),
                title: "Getting started".to_string(),
                sort_key: None,
            },
            CoursewareTopic {
                id: "week-2".to_string(),
                category: "Week 2".to_string(),
                title: "Going deeper".to_string(),
                sort_key: None,
            },
        ],
        freestanding_topics: vec![FreestandingTopic {
            id: "general".to_string(),
            name: "General".to_string(),
            sort_key: None,
        }],
        division: DivisionSettings::default(),
    };
    InMemoryCourseStore::new()
        .with_course(course)
        .with_enrollment("learner", &key)
        .with_enrollment("staff", &key)
        .with_role("staff", &key, domains::ForumRole::Moderator)
}

fn seed_users() -> InMemoryUserDirectory {
    InMemoryUserDirectory::new()
        .with_user("learner", "1")
        .with_user("staff", "2")
}
