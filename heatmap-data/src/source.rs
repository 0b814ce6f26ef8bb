//! Feature sources: HTTP, local files, and a router between them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use heatmap_core::constants::{CONTENT_TYPE_CSV, CONTENT_TYPE_JSON};
use heatmap_core::error::{HeatmapError, Result};
use heatmap_core::traits::{FeatureSource, RawPayload};

// ═══════════════════════════════════════════════════════════════════════════════
// HTTP
// ═══════════════════════════════════════════════════════════════════════════════

/// Fetches point data over HTTP(S).
///
/// No retry. No timeout unless built with [`HttpSource::with_timeout`].
#[derive(Clone, Debug, Default)]
pub struct HttpSource {
    http_client: reqwest::Client,
}

impl HttpSource {
    /// Creates a source with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HeatmapError::Http(e.to_string()))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl FeatureSource for HttpSource {
    #[instrument(skip(self))]
    async fn fetch(&self, location: &str) -> Result<RawPayload> {
        let response = self
            .http_client
            .get(location)
            .send()
            .await
            .map_err(|e| HeatmapError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HeatmapError::FetchFailed {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .text()
            .await
            .map_err(|e| HeatmapError::Http(e.to_string()))?;

        debug!(bytes = body.len(), content_type = ?content_type, "Fetched");
        Ok(RawPayload::new(content_type, body))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILE
// ═══════════════════════════════════════════════════════════════════════════════

/// Reads point data from the local filesystem.
///
/// The content type comes from the extension: `.json` and `.geojson` are
/// JSON, anything else is treated as CSV.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSource;

impl FileSource {
    fn content_type_for(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json" | "geojson") => CONTENT_TYPE_JSON,
            _ => CONTENT_TYPE_CSV,
        }
    }
}

#[async_trait]
impl FeatureSource for FileSource {
    #[instrument(skip(self))]
    async fn fetch(&self, location: &str) -> Result<RawPayload> {
        let path = PathBuf::from(location);
        let body = tokio::fs::read_to_string(&path).await.map_err(|e| {
            HeatmapError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", path.display(), e),
            ))
        })?;

        debug!(bytes = body.len(), path = %path.display(), "Read file");
        Ok(RawPayload::new(Some(Self::content_type_for(&path).to_string()), body))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Routes `http(s)://` locations to [`HttpSource`], `file://` URLs and plain
/// paths to [`FileSource`].
#[derive(Clone, Debug, Default)]
pub struct LocationSource {
    http: HttpSource,
    file: FileSource,
}

impl LocationSource {
    /// Creates a router with default sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router around a configured HTTP source.
    pub fn with_http(http: HttpSource) -> Self {
        Self {
            http,
            file: FileSource,
        }
    }
}

#[async_trait]
impl FeatureSource for LocationSource {
    async fn fetch(&self, location: &str) -> Result<RawPayload> {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => self.http.fetch(location).await,
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| HeatmapError::Config(format!("Invalid file URL: {location}")))?;
                self.file.fetch(&path.to_string_lossy()).await
            }
            // Plain paths, including Windows drive letters parsed as schemes.
            _ => self.file.fetch(location).await,
        }
    }
}
