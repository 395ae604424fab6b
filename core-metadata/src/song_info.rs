//! # Song Info Provider
//!
//! Looks up the details of a song (lyrics, source URL, release date) by
//! group and title.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_metadata::song_info::{HttpSongInfoProvider, SongInfoProvider, SongInfoQuery};
//!
//! let provider = HttpSongInfoProvider::new(http_client, "http://localhost:7070");
//! let details = provider
//!     .fetch(&SongInfoQuery::new("Queen", "Bohemian Rhapsody"))
//!     .await?;
//! println!("released {}", details.release_date);
//! ```

use crate::error::{MetadataError, Result};
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_library::models::{NewSong, ReleaseDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const INFO_PATH: &str = "/info";
const JSON_CONTENT_TYPE: &str = "application/json";

// =============================================================================
// Core Types
// =============================================================================

/// Which song to look up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongInfoQuery {
    pub group: String,
    pub song: String,
}

impl SongInfoQuery {
    pub fn new(group: impl Into<String>, song: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            song: song.into(),
        }
    }
}

/// Validated details returned by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDetails {
    pub lyrics: String,
    pub url: String,
    pub release_date: ReleaseDate,
}

impl SongDetails {
    /// Combine with the looked-up identity into a library insert.
    pub fn into_new_song(self, query: &SongInfoQuery) -> NewSong {
        NewSong::new(
            query.group.clone(),
            query.song.clone(),
            self.lyrics,
            self.url,
            self.release_date,
        )
    }
}

// =============================================================================
// Provider Trait
// =============================================================================

/// Source of song details
#[async_trait]
pub trait SongInfoProvider: Send + Sync {
    /// Fetch the details of one song
    ///
    /// # Errors
    /// * `SongInfoFetchFailed` if the service is unreachable or answers
    ///   with a non-200 status
    /// * `InvalidSongInfo` if the answer is not JSON, has an empty text or
    ///   url, or a date not in `DD.MM.YYYY` form
    async fn fetch(&self, query: &SongInfoQuery) -> Result<SongDetails>;
}

// =============================================================================
// HTTP Provider
// =============================================================================

/// Wire shape of the song-info service response
#[derive(Debug, Deserialize)]
struct SongInfoResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    release_date: String,
    #[serde(default)]
    url: String,
}

/// Song-info service reached over HTTP: `GET {base}/info?group=..&name=..`
pub struct HttpSongInfoProvider {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpSongInfoProvider {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
            timeout: None,
        }
    }

    /// Per-request timeout passed down to the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_url(&self, query: &SongInfoQuery) -> String {
        format!(
            "{}{}?group={}&name={}",
            self.base_url,
            INFO_PATH,
            urlencoding::encode(&query.group),
            urlencoding::encode(&query.song)
        )
    }

    fn validate(response: SongInfoResponse) -> Result<SongDetails> {
        if response.text.is_empty() {
            return Err(MetadataError::InvalidSongInfo("song text empty".to_string()));
        }
        if response.url.is_empty() {
            return Err(MetadataError::InvalidSongInfo("song url empty".to_string()));
        }
        let release_date = ReleaseDate::parse(&response.release_date)
            .map_err(|e| MetadataError::InvalidSongInfo(e.to_string()))?;

        Ok(SongDetails {
            lyrics: response.text,
            url: response.url,
            release_date,
        })
    }
}

#[async_trait]
impl SongInfoProvider for HttpSongInfoProvider {
    async fn fetch(&self, query: &SongInfoQuery) -> Result<SongDetails> {
        let url = self.request_url(query);
        info!(url = %url, "sending song info request");

        let mut request = HttpRequest::get(&url).header("Accept", JSON_CONTENT_TYPE);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(error = %e, "failed to get song info");
            MetadataError::SongInfoFetchFailed(e.to_string())
        })?;

        if response.status != 200 {
            warn!(status = response.status, "failed to get song info");
            return Err(MetadataError::SongInfoFetchFailed(format!(
                "song info service answered HTTP {}",
                response.status
            )));
        }

        if response.content_type() != Some(JSON_CONTENT_TYPE) {
            warn!(content_type = ?response.content_type(), "unexpected content type in response");
            return Err(MetadataError::InvalidSongInfo(format!(
                "expected {}, got {:?}",
                JSON_CONTENT_TYPE,
                response.content_type()
            )));
        }

        let body: SongInfoResponse = response
            .json()
            .map_err(|e| MetadataError::InvalidSongInfo(format!("Parse error: {}", e)))?;

        let details = Self::validate(body)?;
        debug!(release_date = %details.release_date, "song info received");
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpResponse, RetryPolicy};
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        pub Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> BridgeResult<HttpResponse>;
        }
    }

    fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        HttpResponse {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }
    }

    fn provider_answering(answer: HttpResponse) -> HttpSongInfoProvider {
        let mut http = MockHttp::new();
        let mut answer = Some(answer);
        http.expect_execute()
            .times(1)
            .returning(move |_| Ok(answer.take().unwrap()));
        HttpSongInfoProvider::new(Arc::new(http), "http://info.local")
    }

    fn query() -> SongInfoQuery {
        SongInfoQuery::new("Queen", "Bohemian Rhapsody")
    }

    #[core_async::test]
    async fn test_fetch_parses_details() {
        let provider = provider_answering(response(
            200,
            "application/json",
            r#"{"text": "Is this the real life?", "release_date": "31.10.1975", "url": "http://x"}"#,
        ));

        let details = provider.fetch(&query()).await.unwrap();

        assert_eq!(details.lyrics, "Is this the real life?");
        assert_eq!(details.url, "http://x");
        assert_eq!(details.release_date.to_string(), "31.10.1975");

        let new_song = details.into_new_song(&query());
        assert_eq!(new_song.group, "Queen");
        assert_eq!(new_song.title, "Bohemian Rhapsody");
    }

    #[core_async::test]
    async fn test_request_url_encodes_query() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|request| {
                request.url == "http://info.local/info?group=AC%2FDC&name=Back%20in%20Black"
                    && request.timeout == Some(Duration::from_secs(2))
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    "application/json; charset=utf-8",
                    r#"{"text": "t", "release_date": "25.07.1980", "url": "u"}"#,
                ))
            });

        let provider = HttpSongInfoProvider::new(Arc::new(http), "http://info.local/")
            .with_timeout(Duration::from_secs(2));
        assert_eq!(provider.base_url(), "http://info.local");

        provider
            .fetch(&SongInfoQuery::new("AC/DC", "Back in Black"))
            .await
            .unwrap();
    }

    #[core_async::test]
    async fn test_non_200_is_fetch_failure() {
        let provider = provider_answering(response(503, "text/plain", "down"));
        let err = provider.fetch(&query()).await.unwrap_err();
        assert!(matches!(err, MetadataError::SongInfoFetchFailed(msg) if msg.contains("503")));
    }

    #[core_async::test]
    async fn test_transport_error_is_fetch_failure() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("connection refused".into())));
        let provider = HttpSongInfoProvider::new(Arc::new(http), "http://info.local");

        let err = provider.fetch(&query()).await.unwrap_err();
        assert!(matches!(err, MetadataError::SongInfoFetchFailed(_)));
    }

    #[core_async::test]
    async fn test_wrong_content_type_is_invalid() {
        let provider = provider_answering(response(200, "text/html", "<html></html>"));
        let err = provider.fetch(&query()).await.unwrap_err();
        assert!(matches!(err, MetadataError::InvalidSongInfo(_)));
    }

    #[core_async::test]
    async fn test_empty_text_or_url_is_invalid() {
        let provider = provider_answering(response(
            200,
            "application/json",
            r#"{"text": "", "release_date": "31.10.1975", "url": "http://x"}"#,
        ));
        let err = provider.fetch(&query()).await.unwrap_err();
        assert!(matches!(err, MetadataError::InvalidSongInfo(msg) if msg.contains("text")));

        let provider = provider_answering(response(
            200,
            "application/json",
            r#"{"text": "t", "release_date": "31.10.1975"}"#,
        ));
        let err = provider.fetch(&query()).await.unwrap_err();
        assert!(matches!(err, MetadataError::InvalidSongInfo(msg) if msg.contains("url")));
    }

    #[core_async::test]
    async fn test_bad_date_is_invalid() {
        let provider = provider_answering(response(
            200,
            "application/json",
            r#"{"text": "t", "release_date": "1975-10-31", "url": "u"}"#,
        ));
        let err = provider.fetch(&query()).await.unwrap_err();
        assert!(matches!(err, MetadataError::InvalidSongInfo(msg) if msg.contains("release_date")));
    }

    #[core_async::test]
    async fn test_malformed_json_is_invalid() {
        let provider = provider_answering(response(200, "application/json", "{not json"));
        let err = provider.fetch(&query()).await.unwrap_err();
        assert!(matches!(err, MetadataError::InvalidSongInfo(msg) if msg.contains("Parse error")));
    }
}
