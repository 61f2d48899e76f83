use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, PRAGMA};

use crate::error::ServiceResult;

/// Source of raw calendar data.
///
/// Implementations reduce every failure to `None`; a missing feed is not an
/// error for the caller.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

/// ## Summary
/// Fetches every URL in order, one at a time.
///
/// The result has one entry per URL, `None` where the fetch failed.
#[tracing::instrument(skip_all, fields(count = urls.len()))]
pub async fn fetch_all(fetcher: &dyn FeedFetcher, urls: &[String]) -> Vec<Option<Vec<u8>>> {
    let mut blobs = Vec::with_capacity(urls.len());
    for url in urls {
        blobs.push(fetcher.fetch(url).await);
    }
    tracing::debug!(
        fetched = blobs.iter().filter(|blob| blob.is_some()).count(),
        "Feeds fetched"
    );
    blobs
}

/// Fetches feeds over HTTP(S), bypassing intermediate caches.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// ## Summary
    /// Creates a fetcher whose requests time out after `timeout`.
    ///
    /// ## Errors
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(timeout: Duration) -> ServiceResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let host = host_of(url);
        let target = cache_busted_url(url, chrono::Utc::now().timestamp());

        let response = match self
            .client
            .get(&target)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%host, error = %err, "Feed request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%host, %status, "Feed request returned an error status");
            return None;
        }

        match response.bytes().await {
            Ok(body) => {
                tracing::debug!(%host, bytes = body.len(), "Feed fetched");
                Some(body.to_vec())
            }
            Err(err) => {
                tracing::warn!(%host, error = %err, "Reading feed body failed");
                None
            }
        }
    }
}

/// ## Summary
/// Appends a `_cb=<timestamp>` query parameter so caches between us and the
/// calendar host serve fresh data.
#[must_use]
pub fn cache_busted_url(url: &str, timestamp: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}_cb={timestamp}")
}

/// Host part of `url` for logging; feed URLs often embed private tokens.
fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_else(|| "<invalid url>".to_owned())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct StubFetcher {
        feeds: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
            self.feeds.get(url).cloned()
        }
    }

    #[test]
    fn cache_buster_starts_a_query() {
        assert_eq!(
            cache_busted_url("https://example.com/cal.ics", 1_700_000_000),
            "https://example.com/cal.ics?_cb=1700000000"
        );
    }

    #[test]
    fn cache_buster_extends_an_existing_query() {
        assert_eq!(
            cache_busted_url("https://example.com/cal.ics?token=abc", 42),
            "https://example.com/cal.ics?token=abc&_cb=42"
        );
    }

    #[test]
    fn host_is_extracted_for_logging() {
        assert_eq!(host_of("https://calendar.example.com/private/x.ics"), "calendar.example.com");
        assert_eq!(host_of("not a url"), "<invalid url>");
    }

    #[tokio::test]
    async fn fetch_all_keeps_url_order_and_gaps() {
        let fetcher = StubFetcher {
            feeds: HashMap::from([
                ("a".to_owned(), b"first".to_vec()),
                ("c".to_owned(), b"third".to_vec()),
            ]),
        };
        let urls = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];

        let blobs = fetch_all(&fetcher, &urls).await;
        assert_eq!(
            blobs,
            vec![Some(b"first".to_vec()), None, Some(b"third".to_vec())]
        );
    }

    #[tokio::test]
    async fn unreachable_host_yields_no_blob() {
        let fetcher = HttpFeedFetcher::new(Duration::from_secs(2)).unwrap();
        assert!(fetcher.fetch("http://127.0.0.1:9/calendar.ics").await.is_none());
    }

    #[tokio::test]
    async fn invalid_url_yields_no_blob() {
        let fetcher = HttpFeedFetcher::new(Duration::from_secs(2)).unwrap();
        assert!(fetcher.fetch("not a url").await.is_none());
    }
}
