//! Shared constants for the heatmap toolkit.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Namespace prepended to every cache key (`"heatmap_<key>"`).
pub const CACHE_NAMESPACE: &str = "heatmap";

/// Cache key used for the loaded point collection when none is given.
pub const DEFAULT_CACHE_KEY: &str = "data";

/// How long a cached collection stays fresh by default (one hour).
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60 * 60);

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT FORMATS
// ═══════════════════════════════════════════════════════════════════════════════

/// Content type that routes a payload through the GeoJSON path.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type assumed for tabular payloads.
pub const CONTENT_TYPE_CSV: &str = "text/csv";

/// CSV column holding the latitude.
pub const COLUMN_LATITUDE: &str = "latitude";

/// CSV column holding the longitude.
pub const COLUMN_LONGITUDE: &str = "longitude";

/// CSV column holding the intensity.
pub const COLUMN_INTENSITY: &str = "intensity";

/// Columns every CSV payload must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_LATITUDE, COLUMN_LONGITUDE, COLUMN_INTENSITY];

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Numeric weight of a record.
pub const PROPERTY_INTENSITY: &str = "intensity";

/// Categorical intensity band (e.g. "High").
pub const PROPERTY_INTENSITY_CATEGORY: &str = "intensity_category";

/// District name.
pub const PROPERTY_DISTRICT: &str = "district";

/// Occurrence frequency band.
pub const PROPERTY_FREQUENCY: &str = "frequency";

/// Time-of-day band.
pub const PROPERTY_TIME_PERIOD: &str = "time_period";

/// Weather condition.
pub const PROPERTY_WEATHER: &str = "weather";

/// Sentinel filter value meaning "do not restrict on this dimension".
pub const FILTER_ALL: &str = "all";

// ═══════════════════════════════════════════════════════════════════════════════
// NOTIFICATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Display time for success notifications.
pub const SUCCESS_DURATION: Duration = Duration::from_millis(3000);

/// Display time for info notifications.
pub const INFO_DURATION: Duration = Duration::from_millis(3000);

/// Display time for warning notifications.
pub const WARNING_DURATION: Duration = Duration::from_millis(4000);

/// Display time for error notifications.
pub const ERROR_DURATION: Duration = Duration::from_millis(5000);
