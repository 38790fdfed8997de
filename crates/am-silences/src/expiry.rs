//! Expiry resolution.
//!
//! A silence ends either at an absolute RFC3339 timestamp (`--expire-on`) or a
//! relative duration after the invocation time (`--expires`). The absolute form
//! always wins; the two are never combined.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Result, SilenceError};

/// Duration used when neither flags nor the config file set one.
pub const DEFAULT_EXPIRES: &str = "1h";

/// Start and end of a silence. The end is always strictly after the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceWindow {
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl SilenceWindow {
    /// Creates a window.
    ///
    /// # Errors
    ///
    /// Returns `SilenceError::InvalidTimestamp` if `ends_at` is not after `starts_at`.
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<Self> {
        if ends_at <= starts_at {
            return Err(SilenceError::InvalidTimestamp {
                input: ends_at.to_rfc3339(),
                reason: format!("silence must end after it starts ({})", starts_at.to_rfc3339()),
            });
        }
        Ok(Self { starts_at, ends_at })
    }

    /// When the silence starts.
    #[must_use]
    pub const fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    /// When the silence ends.
    #[must_use]
    pub const fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }
}

/// Resolves the silence window for an invocation at `now`.
///
/// A non-empty `expire_on` is parsed as RFC3339 and used as the end time.
/// Otherwise `expires` is parsed as a duration (`1h`, `100h`, `1h30m`) and added to `now`.
///
/// # Errors
///
/// Returns `InvalidTimestamp` when `expire_on` does not parse or is not in the future,
/// and `InvalidDuration` when `expires` does not parse, is zero, or overflows.
pub fn resolve_expiry(
    expire_on: Option<&str>,
    expires: &str,
    now: DateTime<Utc>,
) -> Result<SilenceWindow> {
    if let Some(raw) = expire_on.map(str::trim).filter(|s| !s.is_empty()) {
        let ends_at = DateTime::parse_from_rfc3339(raw)
            .map_err(|e| SilenceError::InvalidTimestamp {
                input: raw.to_string(),
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        if ends_at <= now {
            return Err(SilenceError::InvalidTimestamp {
                input: raw.to_string(),
                reason: "expiry time is not in the future".to_string(),
            });
        }

        debug!(ends_at = %ends_at, "Using absolute expiry");
        return SilenceWindow::new(now, ends_at);
    }

    let raw = expires.trim();
    let invalid = |reason: String| SilenceError::InvalidDuration {
        input: raw.to_string(),
        reason,
    };

    let duration = humantime::parse_duration(raw).map_err(|e| invalid(e.to_string()))?;
    if duration.is_zero() {
        return Err(invalid("duration must be greater than zero".to_string()));
    }

    let duration = chrono::Duration::from_std(duration)
        .map_err(|_| invalid("duration is too large".to_string()))?;
    let ends_at = now
        .checked_add_signed(duration)
        .ok_or_else(|| invalid("duration is too large".to_string()))?;

    debug!(expires = raw, ends_at = %ends_at, "Using relative expiry");
    SilenceWindow::new(now, ends_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid date")
    }

    #[test]
    fn absolute_expiry_overrides_duration() {
        let window = resolve_expiry(Some("2030-01-01T00:00:00Z"), "1h", now()).expect("valid");

        let expected = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).single().expect("valid date");
        assert_eq!(window.ends_at(), expected);
        assert_eq!(window.starts_at(), now());
    }

    #[test]
    fn absolute_expiry_with_offset_is_normalized_to_utc() {
        let window =
            resolve_expiry(Some("2030-01-01T02:00:00+02:00"), "1h", now()).expect("valid");

        let expected = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).single().expect("valid date");
        assert_eq!(window.ends_at(), expected);
    }

    #[test]
    fn relative_expiry_adds_to_now() {
        let window = resolve_expiry(None, "2h", now()).expect("valid");

        assert_eq!(window.starts_at(), now());
        assert_eq!(window.ends_at(), now() + Duration::hours(2));
    }

    #[test]
    fn empty_absolute_expiry_falls_back_to_duration() {
        let window = resolve_expiry(Some(""), "30m", now()).expect("valid");
        assert_eq!(window.ends_at(), now() + Duration::minutes(30));
    }

    #[test_case("1h", Duration::hours(1) ; "one hour")]
    #[test_case("100h", Duration::hours(100) ; "hundred hours")]
    #[test_case("1h30m", Duration::minutes(90) ; "compound")]
    #[test_case("45s", Duration::seconds(45) ; "seconds")]
    #[test_case("2d", Duration::days(2) ; "days")]
    fn parses_durations(input: &str, expected: Duration) {
        let window = resolve_expiry(None, input, now()).expect("valid");
        assert_eq!(window.ends_at() - window.starts_at(), expected);
    }

    #[test_case("soon" ; "no number")]
    #[test_case("" ; "empty")]
    #[test_case("-1h" ; "negative")]
    #[test_case("0s" ; "zero")]
    #[test_case("10" ; "missing unit")]
    fn rejects_bad_durations(input: &str) {
        let result = resolve_expiry(None, input, now());
        assert!(matches!(result, Err(SilenceError::InvalidDuration { .. })));
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        let result = resolve_expiry(Some("2030-01-01 00:00"), "1h", now());
        match result {
            Err(SilenceError::InvalidTimestamp { input, .. }) => {
                assert_eq!(input, "2030-01-01 00:00");
            }
            other => panic!("expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn rejects_timestamp_in_the_past() {
        let result = resolve_expiry(Some("2020-01-01T00:00:00Z"), "1h", now());
        assert!(matches!(result, Err(SilenceError::InvalidTimestamp { .. })));
    }

    #[test]
    fn bad_duration_is_ignored_when_timestamp_given() {
        let result = resolve_expiry(Some("2030-01-01T00:00:00Z"), "garbage", now());
        assert!(result.is_ok());
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(SilenceWindow::new(now(), now()).is_err());
        assert!(SilenceWindow::new(now(), now() - Duration::seconds(1)).is_err());
        assert!(SilenceWindow::new(now(), now() + Duration::seconds(1)).is_ok());
    }
}
