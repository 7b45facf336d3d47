//! Timezone handling utilities
//!
//! Events store wall-clock times in their calendar's zone. The helpers here
//! turn those wall-clock values into absolute instants (and back) so that
//! durations survive zone changes and DST transitions.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{CalendarError, CalendarResult};

/// Parse an IANA timezone string (e.g., "Asia/Singapore", "Europe/London")
///
/// # Examples
///
/// ```
/// use daybook_core::timezone::parse_timezone;
///
/// let tz = parse_timezone("America/New_York").unwrap();
/// assert_eq!(tz.name(), "America/New_York");
/// ```
pub fn parse_timezone(tz_str: &str) -> CalendarResult<Tz> {
    tz_str
        .trim()
        .parse::<Tz>()
        .map_err(|_| CalendarError::InvalidTimezone(tz_str.to_string()))
}

/// Get the default timezone (UTC)
pub fn default_timezone() -> Tz {
    Tz::UTC
}

/// Attach a zone to a wall-clock value.
///
/// During a DST fold the earlier of the two instants is chosen. A wall-clock
/// value that falls in a DST gap does not exist in the zone and fails with
/// [`CalendarError::TimezoneResolution`].
pub fn localize(local: NaiveDateTime, tz: Tz) -> CalendarResult<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(first, second) => Ok(first.min(second)),
        LocalResult::None => Err(CalendarError::TimezoneResolution(format!(
            "{} in {}",
            local.format("%Y-%m-%dT%H:%M"),
            tz.name()
        ))),
    }
}

/// Absolute time elapsed between two wall-clock values of the same zone.
///
/// Unlike `end - start` on the naive values, this accounts for DST shifts
/// between the two points.
pub fn elapsed(start: NaiveDateTime, end: NaiveDateTime, tz: Tz) -> CalendarResult<Duration> {
    Ok(localize(end, tz)? - localize(start, tz)?)
}

/// Add an absolute duration to a wall-clock value, returning the wall clock
/// of the resulting instant in the same zone.
pub fn advance(local: NaiveDateTime, by: Duration, tz: Tz) -> CalendarResult<NaiveDateTime> {
    let instant = localize(local, tz)? + by;
    Ok(instant.naive_local())
}

/// Re-express a wall-clock value from one zone in another, keeping the
/// instant fixed.
pub fn reproject(local: NaiveDateTime, from: Tz, to: Tz) -> CalendarResult<NaiveDateTime> {
    Ok(localize(local, from)?.with_timezone(&to).naive_local())
}

/// A validated IANA timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timezone(Tz);

impl Timezone {
    /// Create a new Timezone if valid
    pub fn new(tz: &str) -> CalendarResult<Self> {
        parse_timezone(tz).map(Self)
    }

    /// The zone used for date arithmetic
    pub fn tz(&self) -> Tz {
        self.0
    }

    /// Get the IANA name
    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(default_timezone())
    }
}

impl From<Tz> for Timezone {
    fn from(tz: Tz) -> Self {
        Self(tz)
    }
}

impl TryFrom<String> for Timezone {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Timezone> for String {
    fn from(tz: Timezone) -> Self {
        tz.name().to_string()
    }
}

impl std::fmt::Display for Timezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.name())
    }
}
