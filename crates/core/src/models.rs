//! Core domain models for Daybook
//!
//! Event times are wall-clock values in the owning calendar's timezone. The
//! calendar carries the zone, the event does not.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::datetime::format_date_time;
use crate::error::{CalendarError, CalendarResult};
use crate::types::{EventId, SeriesId};

/// Everything a caller supplies to create an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: Option<String>,
    pub location: Option<String>,
    pub is_public: bool,
    pub is_all_day: bool,
}

impl EventDraft {
    /// A public, timed event with no description or location
    pub fn new(name: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            description: None,
            location: None,
            is_public: true,
            is_all_day: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn all_day(mut self) -> Self {
        self.is_all_day = true;
        self
    }
}

/// The (name, start, end) triple callers use to point at an event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventIdentity {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl EventIdentity {
    pub fn new(name: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }
}

impl fmt::Display for EventIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' from {} to {}",
            self.name,
            format_date_time(self.start),
            format_date_time(self.end)
        )
    }
}

/// Event entity
///
/// One concrete occurrence. Occurrences of a recurring series share a
/// [`SeriesId`]; standalone events have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_all_day: bool,
    pub description: Option<String>,
    pub location: Option<String>,
    pub is_public: bool,
    pub series_id: Option<SeriesId>,
}

impl Event {
    /// Validate a draft and turn it into a standalone event
    ///
    /// Fails with [`CalendarError::InvalidEvent`] when the name is blank or
    /// the end precedes the start. All-day drafts are stretched to
    /// 00:00 of the start day and 23:59 of the end day.
    pub fn new(draft: EventDraft) -> CalendarResult<Self> {
        Self::build(draft, None)
    }

    /// Same as [`Event::new`] but tags the event as a series occurrence
    pub fn in_series(draft: EventDraft, series_id: SeriesId) -> CalendarResult<Self> {
        Self::build(draft, Some(series_id))
    }

    fn build(draft: EventDraft, series_id: Option<SeriesId>) -> CalendarResult<Self> {
        let (start, end) = if draft.is_all_day {
            all_day_bounds(draft.start, draft.end)
        } else {
            (draft.start, draft.end)
        };
        validate_span(&draft.name, start, end)?;

        Ok(Self {
            id: EventId::new(),
            name: draft.name,
            start,
            end,
            is_all_day: draft.is_all_day,
            description: draft.description,
            location: draft.location,
            is_public: draft.is_public,
            series_id,
        })
    }

    pub fn identity(&self) -> EventIdentity {
        EventIdentity::new(self.name.clone(), self.start, self.end)
    }

    pub fn matches(&self, identity: &EventIdentity) -> bool {
        self.name == identity.name && self.start == identity.start && self.end == identity.end
    }

    /// Wall-clock length, not adjusted for DST
    pub fn wall_duration(&self) -> Duration {
        self.end - self.start
    }

    /// The draft this event could be rebuilt from
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            name: self.name.clone(),
            start: self.start,
            end: self.end,
            description: self.description.clone(),
            location: self.location.clone(),
            is_public: self.is_public,
            is_all_day: self.is_all_day,
        }
    }

    /// Last calendar day the half-open `[start, end)` interval touches.
    ///
    /// An event ending exactly at midnight does not touch the day that
    /// midnight begins. A zero-length event touches its own day.
    pub fn last_day(&self) -> NaiveDate {
        if self.end > self.start && self.end.time() == NaiveTime::MIN {
            self.end.date().pred_opt().unwrap_or(self.start.date())
        } else {
            self.end.date()
        }
    }

    /// Every calendar day this event is present on, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let last = self.last_day();
        self.start.date().iter_days().take_while(move |day| *day <= last)
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.start.date() <= date && date <= self.last_day()
    }
}

/// Check the invariants every stored event must satisfy
pub fn validate_span(name: &str, start: NaiveDateTime, end: NaiveDateTime) -> CalendarResult<()> {
    if name.trim().is_empty() {
        return Err(CalendarError::InvalidEvent(
            "event name must not be empty".to_string(),
        ));
    }

    if end < start {
        return Err(CalendarError::InvalidEvent(format!(
            "end {} is before start {}",
            format_date_time(end),
            format_date_time(start)
        )));
    }

    Ok(())
}

fn all_day_bounds(start: NaiveDateTime, end: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let day_end = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
    (
        start.date().and_time(NaiveTime::MIN),
        end.date().and_time(day_end),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_event_defaults() {
        let event = Event::new(EventDraft::new(
            "Lunch",
            at(2024, 1, 1, 12, 0),
            at(2024, 1, 1, 13, 0),
        ))
        .unwrap();

        assert_eq!(event.name, "Lunch");
        assert!(event.is_public);
        assert!(!event.is_all_day);
        assert!(event.series_id.is_none());
        assert_eq!(event.wall_duration(), Duration::hours(1));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = Event::new(EventDraft::new(
            "   ",
            at(2024, 1, 1, 12, 0),
            at(2024, 1, 1, 13, 0),
        ));
        assert!(matches!(result, Err(CalendarError::InvalidEvent(_))));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let result = Event::new(EventDraft::new(
            "Backwards",
            at(2024, 1, 1, 13, 0),
            at(2024, 1, 1, 12, 0),
        ));
        assert!(matches!(result, Err(CalendarError::InvalidEvent(_))));
    }

    #[test]
    fn test_zero_length_event_allowed() {
        let event = Event::new(EventDraft::new(
            "Deadline",
            at(2024, 1, 1, 17, 0),
            at(2024, 1, 1, 17, 0),
        ))
        .unwrap();
        assert_eq!(event.days().collect::<Vec<_>>(), vec![day(2024, 1, 1)]);
    }

    #[test]
    fn test_all_day_normalization() {
        let event = Event::new(
            EventDraft::new("Holiday", at(2024, 7, 4, 9, 30), at(2024, 7, 4, 10, 0)).all_day(),
        )
        .unwrap();

        assert_eq!(event.start, at(2024, 7, 4, 0, 0));
        assert_eq!(event.end, at(2024, 7, 4, 23, 59));
        assert_eq!(event.days().collect::<Vec<_>>(), vec![day(2024, 7, 4)]);
    }

    #[test]
    fn test_days_of_multi_day_event() {
        let event = Event::new(EventDraft::new(
            "Conference",
            at(2024, 3, 4, 9, 0),
            at(2024, 3, 6, 17, 0),
        ))
        .unwrap();

        let days: Vec<_> = event.days().collect();
        assert_eq!(days, vec![day(2024, 3, 4), day(2024, 3, 5), day(2024, 3, 6)]);
        assert!(!event.occurs_on(day(2024, 3, 7)));
    }

    #[test]
    fn test_event_ending_at_midnight_stays_on_its_day() {
        let event = Event::new(EventDraft::new(
            "Late shift",
            at(2024, 3, 4, 20, 0),
            at(2024, 3, 5, 0, 0),
        ))
        .unwrap();

        assert!(event.occurs_on(day(2024, 3, 4)));
        assert!(!event.occurs_on(day(2024, 3, 5)));
    }

    #[test]
    fn test_identity_display() {
        let identity = EventIdentity::new("Standup", at(2024, 6, 1, 9, 0), at(2024, 6, 1, 9, 30));
        assert_eq!(
            identity.to_string(),
            "'Standup' from 2024-06-01T09:00 to 2024-06-01T09:30"
        );
    }
}
