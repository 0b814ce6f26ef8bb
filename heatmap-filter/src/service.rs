//! Stateful filtering with change subscribers.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use heatmap_core::notify::Notification;
use heatmap_core::traits::Notifier;
use heatmap_core::types::FeatureCollection;

use crate::apply::{apply_filters, FilterOutcome, FilterSummary};
use crate::state::{FilterDimension, FilterState, FilterValue};

/// Listener called with every recomputed outcome.
pub type FilterCallback = Box<dyn Fn(&FilterOutcome) + Send + Sync>;

/// Holds the source collection and filter state, and pushes every
/// recomputation to its subscribers.
///
/// Every mutation recomputes against the full source collection.
#[derive(Default)]
pub struct FilterService {
    source: Option<FeatureCollection>,
    state: FilterState,
    subscribers: Vec<FilterCallback>,
    notifier: Option<Arc<dyn Notifier>>,
    summary: Option<FilterSummary>,
}

impl FilterService {
    /// Creates a service with no data and no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends an info notification for every recomputation.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Registers a change listener.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&FilterOutcome) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Current filter state.
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Source collection, if one has been set.
    pub fn source_data(&self) -> Option<&FeatureCollection> {
        self.source.as_ref()
    }

    /// Summary of the last recomputation.
    pub fn summary(&self) -> Option<&FilterSummary> {
        self.summary.as_ref()
    }

    /// Replaces the source collection.
    ///
    /// Subscribers are only notified if a constraint is already active.
    pub fn set_source_data(&mut self, collection: FeatureCollection) -> Option<FilterOutcome> {
        self.source = Some(collection);
        if self.state.is_active() {
            self.recompute()
        } else {
            None
        }
    }

    /// Sets one dimension and recomputes.
    pub fn set_filter(&mut self, dimension: FilterDimension, value: impl Into<FilterValue>) -> Option<FilterOutcome> {
        self.state.set(dimension, value);
        self.recompute()
    }

    /// Clears every dimension and recomputes.
    pub fn reset_filters(&mut self) -> Option<FilterOutcome> {
        self.state.reset();
        self.recompute()
    }

    /// Runs the filter pass against the source data.
    ///
    /// Returns `None` (and notifies no one) while no source data is set.
    pub fn recompute(&mut self) -> Option<FilterOutcome> {
        let Some(source) = self.source.as_ref() else {
            warn!("No data available for filtering");
            return None;
        };

        let outcome = apply_filters(source, &self.state);
        let summary = FilterSummary::new(outcome.count, &self.state);
        debug!(summary = %summary, "Filter summary");

        if let Some(notifier) = &self.notifier {
            notifier.notify(Notification::info(summary.notification_text()));
        }
        for callback in &self.subscribers {
            callback(&outcome);
        }

        self.summary = Some(summary);
        Some(outcome)
    }
}

impl fmt::Debug for FilterService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterService")
            .field("records", &self.source.as_ref().map(FeatureCollection::len))
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_core::{Coordinates, Feature, NotificationKind, Properties};
    use parking_lot::Mutex;

    fn data() -> FeatureCollection {
        (0..10)
            .map(|i| {
                let district = if i < 3 { "Sydney" } else { "Brisbane" };
                let props = Properties::with_intensity(f64::from(i)).with("district", district);
                Feature::new(Coordinates::new(150.0, -30.0 - f64::from(i)), props)
            })
            .collect()
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notification>>);

    impl Notifier for Recorder {
        fn notify(&self, notification: Notification) {
            self.0.lock().push(notification);
        }
    }

    fn counting(service: &mut FilterService) -> Arc<Mutex<Vec<usize>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        service.subscribe(move |outcome| sink.lock().push(outcome.count));
        seen
    }

    #[test]
    fn test_set_filter_then_reset() {
        let mut service = FilterService::new();
        let seen = counting(&mut service);

        assert!(service.set_source_data(data()).is_none());
        let filtered = service.set_filter(FilterDimension::District, "Sydney").unwrap();
        assert_eq!(filtered.count, 3);
        assert_eq!(
            service.summary().unwrap().to_string(),
            "Showing 3 results filtered by district: Sydney"
        );

        let all = service.reset_filters().unwrap();
        assert_eq!(all.count, 10);
        assert_eq!(*seen.lock(), vec![3, 10]);
    }

    #[test]
    fn test_without_source_is_noop() {
        let mut service = FilterService::new();
        let seen = counting(&mut service);

        assert!(service.set_filter(FilterDimension::Weather, "Rain").is_none());
        assert!(seen.lock().is_empty());
        assert_eq!(service.state().get(FilterDimension::Weather), FilterValue::Exact("Rain".into()));
    }

    #[test]
    fn test_new_source_reapplies_active_filters() {
        let mut service = FilterService::new();
        let seen = counting(&mut service);

        service.set_filter(FilterDimension::District, "Sydney");
        let outcome = service.set_source_data(data()).unwrap();
        assert_eq!(outcome.count, 3);
        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn test_every_subscriber_called() {
        let mut service = FilterService::new();
        let first = counting(&mut service);
        let second = counting(&mut service);

        service.set_source_data(data());
        service.set_filter(FilterDimension::District, "Brisbane");
        assert_eq!(*first.lock(), vec![7]);
        assert_eq!(*second.lock(), vec![7]);
    }

    #[test]
    fn test_notifications() {
        let recorder = Arc::new(Recorder::default());
        let mut service = FilterService::new().with_notifier(Arc::clone(&recorder) as Arc<dyn Notifier>);

        service.set_source_data(data());
        service.set_filter(FilterDimension::District, "Sydney");
        service.set_filter(FilterDimension::District, "all");

        let notes = recorder.0.lock();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].kind, NotificationKind::Info);
        assert_eq!(notes[0].message, "Found 3 locations matching: district: Sydney");
        assert_eq!(notes[1].message, "Showing all 10 locations");
    }
}
