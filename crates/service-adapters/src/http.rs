//! # HTTP adapters
//!
//! `HttpCommentClient` speaks the comment service's REST interface;
//! `HttpProfileStore` fetches account settings in batches. Both map
//! transport and status failures into the opaque `ClientError` the service
//! layer reinterprets at its boundary.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use domains::{
    ClientError, CommentClient, CommentData, CommentDraft, CommentPatch, ContentRef, CourseKey,
    ProfileMap, ProfileStore, ThreadCounts, ThreadData, ThreadDraft, ThreadPage, ThreadPatch,
    ThreadQuery, ThreadRetrieveOptions, UserProfile,
};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

const API_KEY_HEADER: &str = "X-Api-Key";

pub struct HttpCommentClient {
    http: reqwest::Client,
    base: Url,
    api_key: SecretString,
}

impl HttpCommentClient {
    pub fn new(base: Url, api_key: SecretString, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|err| ClientError::Transport(err.to_string()))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| ClientError::Malformed(err.to_string()))
    }

    async fn send_no_body(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        let response = request
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(())
    }

    /// The follow/flag/vote/read family addresses content by type and id.
    fn content_path(target: &ContentRef, suffix: &str) -> String {
        match target {
            ContentRef::Thread(id) => format!("api/v1/threads/{id}/{suffix}"),
            ContentRef::Comment(id) => format!("api/v1/comments/{id}/{suffix}"),
        }
    }
}

#[derive(Serialize)]
struct UserBody<'a> {
    user_id: &'a str,
}

fn query_from(query: &ThreadQuery) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("user_id", query.user_id.clone()),
        ("page", query.page.to_string()),
        ("per_page", query.per_page.to_string()),
    ];
    if let Some(group_id) = query.group_id {
        pairs.push(("group_id", group_id.to_string()));
    }
    if let Some(text) = &query.text {
        pairs.push(("text", text.clone()));
    }
    if let Some(sort_key) = query.sort_key {
        pairs.push(("sort_key", sort_key.as_str().to_string()));
    }
    if let Some(author_id) = &query.author_id {
        pairs.push(("author_id", author_id.clone()));
    }
    if let Some(flagged) = query.flagged {
        pairs.push(("flagged", flagged.to_string()));
    }
    if let Some(thread_type) = query.thread_type {
        pairs.push(("thread_type", thread_type.as_str().to_string()));
    }
    if query.count_flagged {
        pairs.push(("count_flagged", "true".to_string()));
    }
    if query.unread {
        pairs.push(("unread", "true".to_string()));
    }
    if query.unanswered {
        pairs.push(("unanswered", "true".to_string()));
    }
    if let Some(course_id) = &query.course_id {
        pairs.push(("course_id", course_id.clone()));
    }
    if let Some(commentable_ids) = &query.commentable_ids {
        pairs.push(("commentable_ids", commentable_ids.clone()));
    }
    pairs
}

#[async_trait]
impl CommentClient for HttpCommentClient {
    async fn retrieve_thread(
        &self,
        thread_id: &str,
        opts: ThreadRetrieveOptions,
    ) -> Result<ThreadData, ClientError> {
        let url = self.endpoint(&format!("api/v1/threads/{thread_id}"))?;
        let mut pairs = vec![
            ("with_responses", opts.with_responses.to_string()),
            ("recursive", opts.recursive.to_string()),
            ("mark_as_read", opts.mark_as_read.to_string()),
        ];
        if let Some(user_id) = &opts.user_id {
            pairs.push(("user_id", user_id.clone()));
        }
        if let Some(skip) = opts.response_skip {
            pairs.push(("resp_skip", skip.to_string()));
        }
        if let Some(limit) = opts.response_limit {
            pairs.push(("resp_limit", limit.to_string()));
        }
        self.send(self.http.get(url).query(&pairs)).await
    }

    async fn retrieve_comment(&self, comment_id: &str) -> Result<CommentData, ClientError> {
        let url = self.endpoint(&format!("api/v1/comments/{comment_id}"))?;
        self.send(self.http.get(url)).await
    }

    async fn search_threads(&self, query: ThreadQuery) -> Result<ThreadPage, ClientError> {
        let url = self.endpoint("api/v1/search/threads")?;
        self.send(self.http.get(url).query(&query_from(&query))).await
    }

    async fn subscribed_threads(
        &self,
        user_id: &str,
        query: ThreadQuery,
    ) -> Result<ThreadPage, ClientError> {
        let url = self.endpoint(&format!("api/v1/users/{user_id}/subscribed_threads"))?;
        self.send(self.http.get(url).query(&query_from(&query))).await
    }

    async fn create_thread(&self, draft: ThreadDraft) -> Result<ThreadData, ClientError> {
        let url = self.endpoint("api/v1/threads")?;
        self.send(self.http.post(url).json(&draft)).await
    }

    async fn update_thread(
        &self,
        thread_id: &str,
        patch: ThreadPatch,
    ) -> Result<ThreadData, ClientError> {
        let url = self.endpoint(&format!("api/v1/threads/{thread_id}"))?;
        self.send(self.http.put(url).json(&patch)).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("api/v1/threads/{thread_id}"))?;
        self.send_no_body(self.http.delete(url)).await
    }

    async fn create_comment(&self, draft: CommentDraft) -> Result<CommentData, ClientError> {
        let url = self.endpoint(&format!("api/v1/threads/{}/comments", draft.thread_id))?;
        self.send(self.http.post(url).json(&draft)).await
    }

    async fn update_comment(
        &self,
        comment_id: &str,
        patch: CommentPatch,
    ) -> Result<CommentData, ClientError> {
        let url = self.endpoint(&format!("api/v1/comments/{comment_id}"))?;
        self.send(self.http.put(url).json(&patch)).await
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("api/v1/comments/{comment_id}"))?;
        self.send_no_body(self.http.delete(url)).await
    }

    async fn follow(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError> {
        let url = self.endpoint(&Self::content_path(target, "subscriptions"))?;
        self.send_no_body(self.http.post(url).json(&UserBody { user_id }))
            .await
    }

    async fn unfollow(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError> {
        let url = self.endpoint(&Self::content_path(target, "subscriptions"))?;
        self.send_no_body(self.http.delete(url).json(&UserBody { user_id }))
            .await
    }

    async fn flag_abuse(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError> {
        let url = self.endpoint(&Self::content_path(target, "abuse_flag"))?;
        self.send_no_body(self.http.put(url).json(&UserBody { user_id }))
            .await
    }

    async fn unflag_abuse(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError> {
        let url = self.endpoint(&Self::content_path(target, "abuse_unflag"))?;
        self.send_no_body(self.http.put(url).json(&UserBody { user_id }))
            .await
    }

    async fn vote(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError> {
        let url = self.endpoint(&Self::content_path(target, "votes"))?;
        self.send_no_body(
            self.http
                .put(url)
                .json(&serde_json::json!({ "user_id": user_id, "value": "up" })),
        )
        .await
    }

    async fn unvote(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError> {
        let url = self.endpoint(&Self::content_path(target, "votes"))?;
        self.send_no_body(self.http.delete(url).json(&UserBody { user_id }))
            .await
    }

    async fn pin_thread(&self, user_id: &str, thread_id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("api/v1/threads/{thread_id}/pin"))?;
        self.send_no_body(self.http.put(url).json(&UserBody { user_id }))
            .await
    }

    async fn unpin_thread(&self, user_id: &str, thread_id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("api/v1/threads/{thread_id}/unpin"))?;
        self.send_no_body(self.http.put(url).json(&UserBody { user_id }))
            .await
    }

    async fn mark_read(&self, user_id: &str, target: &ContentRef) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("api/v1/users/{user_id}/read"))?;
        let (source_type, source_id) = match target {
            ContentRef::Thread(id) => ("thread", id.as_str()),
            ContentRef::Comment(id) => ("comment", id.as_str()),
        };
        self.send_no_body(
            self.http
                .post(url)
                .json(&serde_json::json!({ "source_type": source_type, "source_id": source_id })),
        )
        .await
    }

    async fn commentable_counts(
        &self,
        course: &CourseKey,
    ) -> Result<HashMap<String, ThreadCounts>, ClientError> {
        let url = self.endpoint(&format!("api/v1/commentables/{}/counts", course.as_str()))?;
        self.send(self.http.get(url)).await
    }
}

/// Batch account-profile lookup against the user/accounts API.
pub struct HttpProfileStore {
    http: reqwest::Client,
    base: Url,
}

impl HttpProfileStore {
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn profiles(&self, usernames: &[String]) -> anyhow::Result<ProfileMap> {
        if usernames.is_empty() {
            return Ok(ProfileMap::new());
        }
        let url = self.base.join("api/user/v1/accounts")?;
        let accounts: Vec<UserProfile> = self
            .http
            .get(url)
            .query(&[("username", usernames.join(","))])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(accounts
            .into_iter()
            .map(|profile| (profile.username.clone(), profile))
            .collect())
    }
}
