//! YouTube Data API integration for the live tagger.
//!
//! Fetches the authoritative start instant of a live stream
//! (`videos.list` with `liveStreamingDetails`), used to retroactively
//! correct the session clock.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const VIDEOS_API_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// YouTube client errors.
#[derive(Debug, Error)]
pub enum YouTubeError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// The video does not exist (or is not visible to this key).
    #[error("video not found: {video_id}")]
    VideoNotFound { video_id: String },
    /// The video has no live-stream start time.
    #[error("video {video_id} has no live stream start time")]
    MissingStartTime { video_id: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// YouTube Data API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone
/// shares the underlying HTTP connection pool.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or
    /// if the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, YouTubeError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(YouTubeError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(YouTubeError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(YouTubeError::ClientBuild)?;

        Ok(Self { http, api_key })
    }

    /// Fetches the actual start instant of a live stream.
    pub async fn live_stream_start(&self, video_id: &str) -> Result<DateTime<Utc>, YouTubeError> {
        let response = self
            .http
            .get(VIDEOS_API_URL)
            .query(&[
                ("part", "liveStreamingDetails"),
                ("id", video_id),
                ("key", &self.api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| YouTubeError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        parse_start_time(&body, video_id)
    }
}

/// Extracts the bare video ID from a YouTube URL.
///
/// Handles `youtu.be/<id>` and `youtube.com/watch?v=<id>` forms;
/// anything else passes through unchanged, treated as an already-bare
/// ID.
#[must_use]
pub fn video_id(input: &str) -> &str {
    let trimmed = input.trim();
    if let Some((_, rest)) = trimmed.split_once("youtu.be/") {
        return id_prefix(rest);
    }
    if let Some((_, rest)) = trimmed.split_once("v=") {
        return id_prefix(rest);
    }
    trimmed
}

/// Cuts a candidate ID at the first URL delimiter.
fn id_prefix(rest: &str) -> &str {
    match rest.find(['&', '?', '/', '#']) {
        Some(end) => &rest[..end],
        None => rest,
    }
}

fn parse_start_time(body: &str, video_id: &str) -> Result<DateTime<Utc>, YouTubeError> {
    #[derive(Deserialize)]
    struct VideosResponse {
        #[serde(default)]
        items: Vec<Video>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Video {
        live_streaming_details: Option<LiveStreamingDetails>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct LiveStreamingDetails {
        actual_start_time: Option<String>,
    }

    let payload: VideosResponse =
        serde_json::from_str(body).map_err(|err| YouTubeError::InvalidResponse(err.to_string()))?;
    let Some(video) = payload.items.into_iter().next() else {
        return Err(YouTubeError::VideoNotFound {
            video_id: video_id.to_string(),
        });
    };
    let Some(start) = video
        .live_streaming_details
        .and_then(|details| details.actual_start_time)
    else {
        return Err(YouTubeError::MissingStartTime {
            video_id: video_id.to_string(),
        });
    };
    start
        .parse::<DateTime<Utc>>()
        .map_err(|err| YouTubeError::InvalidResponse(err.to_string()))
}

fn parse_api_error(body: &str) -> Option<YouTubeError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| YouTubeError::Api {
            message: payload.error.message,
        })
}
