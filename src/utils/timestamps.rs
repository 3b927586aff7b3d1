//! Epoch timestamp normalization shared by the flattener, reconciliation logging and the CLI.

use chrono::{DateTime, Datelike, Local};
use serde_json::Value;

/// Placeholder rendered for any timestamp that cannot be displayed
pub const NOT_AVAILABLE: &str = "N/A";

/// Fixed display format for every rendered timestamp
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Anything that may carry an epoch value in seconds (numbers, numeric strings, JSON values)
pub trait AsEpoch {
    fn as_epoch(&self) -> Option<f64>;
}

impl AsEpoch for f64 {
    fn as_epoch(&self) -> Option<f64> {
        self.is_finite().then_some(*self)
    }
}

impl AsEpoch for i64 {
    fn as_epoch(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl AsEpoch for i32 {
    fn as_epoch(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl AsEpoch for str {
    fn as_epoch(&self) -> Option<f64> {
        self.trim().parse::<f64>().ok().and_then(|v| v.as_epoch())
    }
}

impl AsEpoch for String {
    fn as_epoch(&self) -> Option<f64> {
        self.as_str().as_epoch()
    }
}

impl AsEpoch for Value {
    fn as_epoch(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64().and_then(|v| v.as_epoch()),
            Value::String(s) => s.as_epoch(),
            _ => None,
        }
    }
}

impl<T: AsEpoch> AsEpoch for Option<T> {
    fn as_epoch(&self) -> Option<f64> {
        self.as_ref().and_then(AsEpoch::as_epoch)
    }
}

impl<T: AsEpoch + ?Sized> AsEpoch for &T {
    fn as_epoch(&self) -> Option<f64> {
        (**self).as_epoch()
    }
}

/// Years a four-digit `%Y` can render
const DISPLAY_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Convert epoch seconds to a local date-time, `None` outside years 1..=9999
pub fn epoch_to_local(epoch: f64) -> Option<DateTime<Local>> {
    if !epoch.is_finite() {
        return None;
    }

    let secs = epoch.floor();
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    let nanos = (((epoch - secs) * 1e9) as u32).min(999_999_999);

    let utc = DateTime::from_timestamp(secs as i64, nanos)?;
    let local = utc.with_timezone(&Local);
    // Millisecond epochs land here as five- and six-digit years
    (DISPLAY_YEARS.contains(&utc.year()) && DISPLAY_YEARS.contains(&local.year())).then_some(local)
}

/// Format a raw epoch value as `YYYY-MM-DD HH:MM:SS` in local time.
///
/// Accepts numbers and numeric strings. Missing, non-numeric, non-finite or out-of-range
/// input renders as [`NOT_AVAILABLE`]; this function never fails.
///
/// # Examples
///
/// ```
/// use chat_archive_explorer::utils::timestamps::format_timestamp;
///
/// assert_eq!(format_timestamp(&None::<f64>), "N/A");
/// assert_eq!(format_timestamp("abc"), "N/A");
/// assert_eq!(format_timestamp(&-1).len(), 19);
/// ```
pub fn format_timestamp<T: AsEpoch + ?Sized>(raw: &T) -> String {
    raw.as_epoch()
        .and_then(epoch_to_local)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
