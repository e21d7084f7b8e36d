//! Shared fixtures: API-shaped JSON and a scripted in-memory comment source

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use studio_activity::fetcher::{CommentSource, FetcherResult};
use studio_activity::identifier::ResourceId;
use studio_activity::{Comment, Reply};

/// Comment object as the studio API serves it
pub fn comment_json(id: u64, user: &str, created: DateTime<Utc>, replies: u32) -> Value {
    json!({
        "id": id,
        "parent_id": null,
        "commentee_id": null,
        "content": format!("comment {id}"),
        "datetime_created": created.to_rfc3339(),
        "datetime_modified": created.to_rfc3339(),
        "visibility": "visible",
        "author": {"id": id + 1000, "username": user, "scratchteam": false},
        "reply_count": replies
    })
}

/// Reply object as the studio API serves it
pub fn reply_json(id: u64, user: &str) -> Value {
    json!({
        "id": id,
        "content": "reply",
        "author": {"id": id + 2000, "username": user, "scratchteam": false}
    })
}

pub fn comment(id: u64, user: &str, created: DateTime<Utc>, replies: u32) -> Comment {
    serde_json::from_value(comment_json(id, user, created, replies)).unwrap()
}

pub fn reply(user: &str) -> Reply {
    serde_json::from_value(reply_json(0, user)).unwrap()
}

/// What a scripted source answers for one request
#[derive(Clone)]
pub enum Scripted<T> {
    Data(T),
    NoData,
    RateLimited,
}

/// In-memory [`CommentSource`] keyed by offset and comment id
///
/// Offsets without a script return an empty page, comment ids without a
/// script return "no data".
#[derive(Default)]
pub struct ScriptedSource {
    pages: HashMap<u64, Scripted<Vec<Comment>>>,
    replies: HashMap<u64, Scripted<Vec<Reply>>>,
    reply_delays: HashMap<u64, Duration>,
    requested_offsets: Mutex<Vec<u64>>,
    requested_threads: Mutex<Vec<u64>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, offset: u64, comments: Vec<Comment>) -> Self {
        self.pages.insert(offset, Scripted::Data(comments));
        self
    }

    pub fn page_script(mut self, offset: u64, script: Scripted<Vec<Comment>>) -> Self {
        self.pages.insert(offset, script);
        self
    }

    pub fn replies(mut self, comment_id: u64, replies: Vec<Reply>) -> Self {
        self.replies.insert(comment_id, Scripted::Data(replies));
        self
    }

    pub fn replies_script(mut self, comment_id: u64, script: Scripted<Vec<Reply>>) -> Self {
        self.replies.insert(comment_id, script);
        self
    }

    /// Hold the answer for `comment_id` back by `delay`
    pub fn reply_delay(mut self, comment_id: u64, delay: Duration) -> Self {
        self.reply_delays.insert(comment_id, delay);
        self
    }

    pub fn requested_offsets(&self) -> Vec<u64> {
        self.requested_offsets.lock().unwrap().clone()
    }

    pub fn requested_threads(&self) -> Vec<u64> {
        let mut threads = self.requested_threads.lock().unwrap().clone();
        threads.sort_unstable();
        threads
    }
}

fn answer<T: Clone>(script: Option<&Scripted<T>>, missing: Option<T>) -> FetcherResult<Option<T>> {
    use studio_activity::downloader::RateLimitError;
    use studio_activity::fetcher::FetcherError;

    match script {
        Some(Scripted::Data(data)) => Ok(Some(data.clone())),
        Some(Scripted::NoData) => Ok(None),
        Some(Scripted::RateLimited) => Err(FetcherError::RateLimitThresholdExceeded(
            RateLimitError::ThresholdExceeded {
                hits: 5,
                threshold: 5,
            },
        )),
        None => Ok(missing),
    }
}

#[async_trait]
impl CommentSource for ScriptedSource {
    async fn fetch_comments(
        &self,
        _resource: &ResourceId,
        offset: u64,
        _limit: u32,
    ) -> FetcherResult<Option<Vec<Comment>>> {
        self.requested_offsets.lock().unwrap().push(offset);
        answer(self.pages.get(&offset), Some(Vec::new()))
    }

    async fn fetch_replies(
        &self,
        _resource: &ResourceId,
        comment_id: u64,
    ) -> FetcherResult<Option<Vec<Reply>>> {
        self.requested_threads.lock().unwrap().push(comment_id);
        match self.reply_delays.get(&comment_id) {
            Some(delay) => tokio::time::sleep(*delay).await,
            None => tokio::task::yield_now().await,
        }
        answer(self.replies.get(&comment_id), None)
    }
}
