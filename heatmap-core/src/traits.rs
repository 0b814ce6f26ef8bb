//! Common traits for the heatmap toolkit.
//!
//! These are the seams between the core logic and its collaborators:
//! storage, time, data retrieval and the notification surface.

use std::sync::Arc;

use async_trait::async_trait;

use crate::constants::CONTENT_TYPE_JSON;
use crate::error::Result;
use crate::notify::Notification;

// ═══════════════════════════════════════════════════════════════════════════════
// KEY-VALUE STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Persistent string key-value store, the contract browser storage offers.
///
/// Implementations might use:
/// - A process-local map (tests, ephemeral runs)
/// - A JSON file on disk (survives restarts)
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes a value. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Lists every stored key.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of "now" for staleness checks.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FEATURE SOURCE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Undecoded payload returned by a [`FeatureSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawPayload {
    /// Declared content type, if the source knows one
    pub content_type: Option<String>,
    /// Payload text
    pub body: String,
}

impl RawPayload {
    /// Creates a payload.
    pub fn new(content_type: Option<String>, body: impl Into<String>) -> Self {
        Self {
            content_type,
            body: body.into(),
        }
    }

    /// Returns true if the payload should be read as GeoJSON.
    ///
    /// Anything not declared as JSON is treated as tabular text.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains(CONTENT_TYPE_JSON))
    }
}

/// Interface for retrieving point data by location (URL or path).
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Retrieves the payload at `location`.
    ///
    /// Fails on network errors and non-success responses. No retry.
    async fn fetch(&self, location: &str) -> Result<RawPayload>;
}

#[async_trait]
impl<T: FeatureSource + ?Sized> FeatureSource for Arc<T> {
    async fn fetch(&self, location: &str) -> Result<RawPayload> {
        (**self).fetch(location).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NOTIFIER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// The single surface all user-visible messages go through.
pub trait Notifier: Send + Sync {
    /// Shows a notification.
    fn notify(&self, notification: Notification);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some("application/json"), true ; "plain json")]
    #[test_case(Some("application/json; charset=utf-8"), true ; "json with charset")]
    #[test_case(Some("Application/JSON"), true ; "mixed case")]
    #[test_case(Some("text/csv"), false ; "csv")]
    #[test_case(Some("text/plain"), false ; "plain text")]
    #[test_case(None, false ; "undeclared")]
    fn test_payload_dispatch(content_type: Option<&str>, expected: bool) {
        let payload = RawPayload::new(content_type.map(str::to_owned), "");
        assert_eq!(payload.is_json(), expected);
    }
}
