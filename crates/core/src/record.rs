//! Tabular event rows used for import and export
//!
//! One row per event with the columns `Subject, Start Date, Start Time,
//! End Date, End Time, All Day Event, Description, Location, Private`.
//! Text encoding of the rows is left to the front end.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::datetime::{format_date, format_time, parse_date, parse_time};
use crate::error::CalendarResult;
use crate::models::{Event, EventDraft};

/// Column headers, in order
pub const COLUMNS: [&str; 9] = [
    "Subject",
    "Start Date",
    "Start Time",
    "End Date",
    "End Time",
    "All Day Event",
    "Description",
    "Location",
    "Private",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Start Date")]
    pub start_date: NaiveDate,
    #[serde(rename = "Start Time")]
    pub start_time: NaiveTime,
    #[serde(rename = "End Date")]
    pub end_date: NaiveDate,
    #[serde(rename = "End Time")]
    pub end_time: NaiveTime,
    #[serde(rename = "All Day Event")]
    pub all_day: bool,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Private")]
    pub private: bool,
}

impl EventRecord {
    pub fn from_event(event: &Event) -> Self {
        Self {
            subject: event.name.clone(),
            start_date: event.start.date(),
            start_time: event.start.time(),
            end_date: event.end.date(),
            end_time: event.end.time(),
            all_day: event.is_all_day,
            description: event.description.clone().unwrap_or_default(),
            location: event.location.clone().unwrap_or_default(),
            private: !event.is_public,
        }
    }

    /// Build a row from its nine text columns
    pub fn from_fields(fields: &[String; 9]) -> CalendarResult<Self> {
        let all_day = parse_bool(&fields[5]);
        let start_time = if all_day { NaiveTime::MIN } else { parse_time(&fields[2])? };
        let end_time = if all_day { NaiveTime::MIN } else { parse_time(&fields[4])? };

        Ok(Self {
            subject: fields[0].clone(),
            start_date: parse_date(&fields[1])?,
            start_time,
            end_date: parse_date(&fields[3])?,
            end_time,
            all_day,
            description: fields[6].clone(),
            location: fields[7].clone(),
            private: parse_bool(&fields[8]),
        })
    }

    /// The nine text columns of this row
    pub fn to_fields(&self) -> [String; 9] {
        [
            self.subject.clone(),
            format_date(self.start_date),
            format_time(self.start_time),
            format_date(self.end_date),
            format_time(self.end_time),
            format_bool(self.all_day),
            self.description.clone(),
            self.location.clone(),
            format_bool(self.private),
        ]
    }

    /// Turn the row back into an event draft. All-day rows are normalized
    /// when the draft is validated.
    pub fn into_draft(self) -> EventDraft {
        let trimmed = |s: String| {
            let s = s.trim().to_string();
            (!s.is_empty()).then_some(s)
        };

        EventDraft {
            name: self.subject,
            start: self.start_date.and_time(self.start_time),
            end: self.end_date.and_time(self.end_time),
            description: trimmed(self.description),
            location: trimmed(self.location),
            is_public: !self.private,
            is_all_day: self.all_day,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn format_bool(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}
