//! Fetching bibliography text from URLs, files, or memory.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use crate::FetchError;

/// Something that can turn a source string into bibliography text.
pub trait Fetch: Send + Sync {
    fn fetch<'a>(
        &'a self,
        source: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, FetchError>> + Send + 'a>>;
}

/// Fetches `http(s)://` URLs over the network and reads everything else
/// (`file://` URLs and plain paths) from disk.
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("localbib/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build();
        let client = match client {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "failed to build HTTP client, using defaults");
                reqwest::Client::new()
            }
        };
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_url(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

impl Default for SourceFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Fetch for SourceFetcher {
    fn fetch<'a>(
        &'a self,
        source: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            if is_remote(source) {
                tracing::debug!(source, "fetching over HTTP");
                self.fetch_url(source).await
            } else {
                let path = local_path(source);
                tracing::debug!(path = %path.display(), "reading from disk");
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FetchError::Io { path, source })
            }
        })
    }
}

pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn local_path(source: &str) -> PathBuf {
    let source = source.trim();
    PathBuf::from(source.strip_prefix("file://").unwrap_or(source))
}

/// Serves bibliography text from a map. Useful for tests and for embedding.
#[derive(Default)]
pub struct MemoryFetcher {
    sources: Mutex<HashMap<String, String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&self, name: impl Into<String>, text: impl Into<String>) {
        if let Ok(mut sources) = self.sources.lock() {
            sources.insert(name.into(), text.into());
        }
    }
}

impl Fetch for MemoryFetcher {
    fn fetch<'a>(
        &'a self,
        source: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, FetchError>> + Send + 'a>> {
        let text = self
            .sources
            .lock()
            .ok()
            .and_then(|s| s.get(source).cloned());
        Box::pin(async move { text.ok_or_else(|| FetchError::UnknownSource(source.to_string())) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.org/refs.bib"));
        assert!(is_remote("HTTP://example.org/refs.bib"));
        assert!(!is_remote("file:///tmp/refs.bib"));
        assert!(!is_remote("refs.bib"));
    }

    #[tokio::test]
    async fn reads_plain_paths_and_file_urls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "@misc{{k, title = {{T}}}}").unwrap();
        let path = file.path().display().to_string();

        let fetcher = SourceFetcher::default();
        let text = fetcher.fetch(&path).await.unwrap();
        assert!(text.starts_with("@misc"));

        let url = format!("file://{path}");
        assert_eq!(fetcher.fetch(&url).await.unwrap(), text);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let fetcher = SourceFetcher::default();
        let err = fetcher
            .fetch("/definitely/not/here/refs.bib")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn local_reads_yield_to_other_tasks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let body = format!("@misc{{k, abstract = {{{}}}}}", "x".repeat(1 << 20));
        file.write_all(body.as_bytes()).unwrap();
        let path = file.path().display().to_string();
        let fetcher = SourceFetcher::default();

        let (ticker_tx, mut ticker_rx) = tokio::sync::mpsc::unbounded_channel();
        let ticker = tokio::spawn(async move {
            loop {
                if ticker_tx.send(()).is_err() {
                    break;
                }
                tokio::task::yield_now().await;
            }
        });

        let text = fetcher.fetch(&path).await.unwrap();
        assert_eq!(text.len(), body.len());
        // The single worker was free to run the ticker while the file was read.
        assert!(ticker_rx.try_recv().is_ok());
        ticker.abort();
    }

    #[tokio::test]
    async fn memory_fetcher_serves_known_sources() {
        let fetcher = MemoryFetcher::new().with_source("mem://a", "text");
        assert_eq!(fetcher.fetch("mem://a").await.unwrap(), "text");
        assert!(matches!(
            fetcher.fetch("mem://b").await,
            Err(FetchError::UnknownSource(_))
        ));
    }
}
