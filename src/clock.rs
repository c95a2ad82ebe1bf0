//! Time source for envelope timestamps.

use chrono::{DateTime, Utc};

/// Anything that can tell the current time.
///
/// Closures qualify, which keeps tests deterministic:
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use envelope::Clock;
///
/// let frozen = || Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(frozen.now().to_rfc3339(), "2024-01-01T00:00:00+00:00");
/// ```
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock. Default for every builder.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> { self() }
}
