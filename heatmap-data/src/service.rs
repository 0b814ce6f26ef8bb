//! Cache-first loading of point data.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument};

use heatmap_cache::TtlCache;
use heatmap_core::constants::{DEFAULT_CACHE_KEY, DEFAULT_STALE_TIME};
use heatmap_core::error::Result;
use heatmap_core::notify::{Notification, TracingNotifier};
use heatmap_core::traits::{Clock, FeatureSource, KeyValueStore, Notifier};
use heatmap_core::types::FeatureCollection;
use heatmap_core::SystemClock;

use crate::normalize::decode_payload;

/// Loading behaviour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataConfig {
    /// Key the collection is cached under (before namespacing)
    pub cache_key: String,
    /// Maximum age of a cached collection
    pub stale_time: Duration,
    /// Whether to consult and populate the cache at all
    pub use_cache: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            stale_time: DEFAULT_STALE_TIME,
            use_cache: true,
        }
    }
}

/// Fetches, parses, cleans and caches point data.
pub struct DataService<F, S, C = SystemClock> {
    source: F,
    cache: TtlCache<S, C>,
    notifier: Arc<dyn Notifier>,
    config: DataConfig,
}

impl<F, S, C> DataService<F, S, C>
where
    F: FeatureSource,
    S: KeyValueStore,
    C: Clock,
{
    /// Creates a service with the default config, reporting through tracing.
    pub fn new(source: F, cache: TtlCache<S, C>) -> Self {
        Self {
            source,
            cache,
            notifier: Arc::new(TracingNotifier),
            config: DataConfig::default(),
        }
    }

    /// Replaces the config.
    pub fn with_config(mut self, config: DataConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Returns the config.
    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Returns the cache.
    pub fn cache(&self) -> &TtlCache<S, C> {
        &self.cache
    }

    /// Drops the cached collection so the next load fetches.
    pub fn invalidate(&self) {
        self.cache.remove(&self.config.cache_key);
    }

    /// Loads the collection at `location`.
    ///
    /// A fresh cached collection is returned without touching the source.
    /// Otherwise the payload is fetched, decoded by content type, cleaned
    /// and cached. Any failure is reported as an error notification and
    /// returned; the cache is left as it was.
    #[instrument(skip(self), fields(cache_key = %self.config.cache_key))]
    pub async fn load(&self, location: &str) -> Result<FeatureCollection> {
        if self.config.use_cache {
            if let Some(cached) = self
                .cache
                .get::<FeatureCollection>(&self.config.cache_key, self.config.stale_time)
            {
                info!(count = cached.len(), "Using cached data");
                return Ok(cached);
            }
        }

        match self.fetch_and_decode(location).await {
            Ok(collection) => {
                if self.config.use_cache {
                    self.cache.set(&self.config.cache_key, &collection);
                }
                info!(count = collection.len(), "Loaded data");
                Ok(collection)
            }
            Err(e) => {
                error!(error = %e, "Failed to load data");
                self.notifier
                    .notify(Notification::error(format!("Failed to load data: {e}")));
                Err(e)
            }
        }
    }

    async fn fetch_and_decode(&self, location: &str) -> Result<FeatureCollection> {
        let payload = self.source.fetch(location).await?;
        decode_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_cache::MemoryStore;
    use heatmap_core::{HeatmapError, ManualClock, NotificationKind};
    use parking_lot::Mutex;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::source::HttpSource;

    const CSV: &str = "latitude,longitude,intensity,district\n-33.87,151.21,100,Sydney\n-37.81,144.96,90,Melbourne";

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notification>>);

    impl Notifier for Recorder {
        fn notify(&self, notification: Notification) {
            self.0.lock().push(notification);
        }
    }

    type TestService = DataService<HttpSource, Arc<MemoryStore>, Arc<ManualClock>>;

    fn service(store: &Arc<MemoryStore>, clock: &Arc<ManualClock>, recorder: &Arc<Recorder>) -> TestService {
        let cache = TtlCache::with_clock(Arc::clone(store), Arc::clone(clock));
        DataService::new(HttpSource::new(), cache).with_notifier(Arc::clone(recorder) as Arc<dyn Notifier>)
    }

    async fn csv_server(expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(CSV, "text/csv"),
            )
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_load_fetches_then_uses_cache() {
        let server = csv_server(1).await;
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let recorder = Arc::new(Recorder::default());
        let svc = service(&store, &clock, &recorder);
        let url = format!("{}/points.csv", server.uri());

        let first = svc.load(&url).await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(store.get_item("heatmap_data").unwrap().is_some());

        let second = svc.load(&url).await.unwrap();
        assert_eq!(second, first);
        assert!(recorder.0.lock().is_empty());
    }

    #[tokio::test]
    async fn test_stale_cache_refetches() {
        let server = csv_server(2).await;
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let recorder = Arc::new(Recorder::default());
        let svc = service(&store, &clock, &recorder)
            .with_config(DataConfig { stale_time: Duration::from_secs(60), ..DataConfig::default() });
        let url = format!("{}/points.csv", server.uri());

        svc.load(&url).await.unwrap();
        clock.advance(Duration::from_secs(61));
        svc.load(&url).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_cache_always_fetches() {
        let server = csv_server(2).await;
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let recorder = Arc::new(Recorder::default());
        let svc = service(&store, &clock, &recorder)
            .with_config(DataConfig { use_cache: false, ..DataConfig::default() });
        let url = format!("{}/points.csv", server.uri());

        svc.load(&url).await.unwrap();
        svc.load(&url).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let server = csv_server(2).await;
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let recorder = Arc::new(Recorder::default());
        let svc = service(&store, &clock, &recorder);
        let url = format!("{}/points.csv", server.uri());

        svc.load(&url).await.unwrap();
        svc.invalidate();
        svc.load(&url).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_failure_notifies_and_leaves_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let recorder = Arc::new(Recorder::default());
        let svc = service(&store, &clock, &recorder);

        let err = svc.load(&format!("{}/points.csv", server.uri())).await.unwrap_err();
        assert!(matches!(err, HeatmapError::FetchFailed { status: 500, .. }));
        assert!(store.is_empty());

        let notes = recorder.0.lock();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert_eq!(
            notes[0].message,
            "Failed to load data: Failed to fetch data: 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_invalid_geojson_notifies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"type":"Feature"}"#, "application/json"),
            )
            .mount(&server)
            .await;
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let recorder = Arc::new(Recorder::default());
        let svc = service(&store, &clock, &recorder);

        let err = svc.load(&server.uri()).await.unwrap_err();
        assert!(matches!(err, HeatmapError::InvalidFeatureCollection(_)));
        assert!(store.is_empty());

        let notes = recorder.0.lock();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.starts_with("Failed to load data: "));
        assert!(notes[0].message.contains("GeoJSON FeatureCollection format"));
    }

    #[tokio::test]
    async fn test_geojson_load_is_cleaned_and_cached() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "intensity": 10, "district": "Sydney" },
                    "geometry": { "type": "Point", "coordinates": [151.21, -33.87] }
                },
                {
                    "type": "Feature",
                    "properties": { "intensity": 5 },
                    "geometry": { "type": "Point", "coordinates": [null, -33.9] }
                }
            ]
        })
        .to_string();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .expect(1)
            .mount(&server)
            .await;
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let recorder = Arc::new(Recorder::default());
        let svc = service(&store, &clock, &recorder);

        let collection = svc.load(&server.uri()).await.unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features[0].properties.get_str("district"), Some("Sydney"));
        assert_eq!(store.len(), 1);

        let cached = svc.load(&server.uri()).await.unwrap();
        assert_eq!(cached, collection);
        assert!(recorder.0.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let recorder = Arc::new(Recorder::default());
        let svc = service(&store, &clock, &recorder);

        let good = csv_server(1).await;
        svc.load(&good.uri()).await.unwrap();
        let cached = store.get_item("heatmap_data").unwrap();

        // Stale, and the source now fails: the entry is evicted on read, nothing new is written.
        clock.advance(DEFAULT_STALE_TIME + Duration::from_secs(1));
        let bad = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&bad)
            .await;
        assert!(svc.load(&bad.uri()).await.is_err());
        assert!(cached.is_some());
        assert!(store.get_item("heatmap_data").unwrap().is_none());
    }
}
