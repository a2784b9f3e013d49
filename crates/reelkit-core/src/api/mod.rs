//! REST API client
//!
//! Thin wrapper over the three endpoints the player consumes:
//! - `GET videos/details?id=` for metadata
//! - `POST videos/track-watch` for watch-time telemetry
//! - `POST videos/action/{action}` for like/save/report style mutations
//!
//! Every call goes through one request wrapper that separates success from
//! failure and keeps the server's message for the user.

mod models;

pub use models::*;

use crate::config::ApiConfig;
use crate::types::VideoId;
use crate::watch_time::{WatchReport, WatchReporter};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Sink for video mutations
#[async_trait]
pub trait VideoActions: Send + Sync {
    async fn perform(
        &self,
        video_id: &VideoId,
        action: VideoAction,
        reason: Option<String>,
    ) -> Result<ActionOutcome>;
}

/// HTTP client for the video API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base(&config.base_url)?,
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Fetch video metadata
    #[instrument(skip(self))]
    pub async fn video_details(&self, video_id: &VideoId) -> Result<VideoDetails> {
        let url = self.endpoint("videos/details")?;
        let request = self.client.get(url).query(&[("id", video_id.as_str())]);

        self.send::<VideoDetails>(request)
            .await?
            .ok_or_else(|| Error::api(200, Some("Video details missing from response".into())))
    }

    /// Report cumulative watch time. Only the status code is checked.
    #[instrument(skip(self), fields(video_id = %report.video_id, seconds = report.watch_duration))]
    pub async fn track_watch(&self, report: &WatchReport) -> Result<()> {
        let url = self.endpoint("videos/track-watch")?;
        let response = self.authorize(self.client.post(url).json(report)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &body));
        }
        Ok(())
    }

    /// Perform a video action
    #[instrument(skip(self))]
    pub async fn perform_action(
        &self,
        video_id: &VideoId,
        action: VideoAction,
        reason: Option<String>,
    ) -> Result<ActionOutcome> {
        let url = self.endpoint(&format!("videos/action/{}", action.path()))?;
        let body = ActionRequest {
            video_id: video_id.clone(),
            reason,
        };

        let outcome = self
            .send::<ActionOutcome>(self.client.post(url).json(&body))
            .await?;
        Ok(outcome.unwrap_or_default())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(status = status.as_u16(), bytes = body.len(), "API response");

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(None);
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(Error::api(status.as_u16(), envelope.message));
        }
        Ok(envelope.data)
    }
}

#[async_trait]
impl WatchReporter for ApiClient {
    async fn report_watch(&self, report: &WatchReport) -> Result<()> {
        self.track_watch(report).await
    }
}

#[async_trait]
impl VideoActions for ApiClient {
    async fn perform(
        &self,
        video_id: &VideoId,
        action: VideoAction,
        reason: Option<String>,
    ) -> Result<ActionOutcome> {
        self.perform_action(video_id, action, reason).await
    }
}

/// Base URLs always end in `/` so relative joins keep their path prefix
fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidConfig(format!("API base URL cannot be a base: {}", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Build an API error, keeping the server message when the body has one
fn error_from_body(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });
    Error::api(status, message)
}
