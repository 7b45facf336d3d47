//! Field-level edits of a single event
//!
//! Edits never touch sibling occurrences of a series. Moving an occurrence
//! (editing its start or end) detaches it from its series and turns an
//! all-day event into a timed one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::datetime::parse_date_time;
use crate::error::{CalendarError, CalendarResult};
use crate::models::{Event, validate_span};

/// The fields a caller may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventField {
    Name,
    Description,
    Location,
    Public,
    Start,
    End,
}

impl FromStr for EventField {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "subject" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            "location" => Ok(Self::Location),
            "public" | "ispublic" => Ok(Self::Public),
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            _ => Err(CalendarError::InvalidProperty(s.to_string())),
        }
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Location => "location",
            Self::Public => "public",
            Self::Start => "start",
            Self::End => "end",
        };
        f.write_str(name)
    }
}

/// Return a copy of `event` with `field` set to `value`.
///
/// The copy is checked against the same invariants as a new event, so an
/// end before the start fails with [`CalendarError::InvalidEvent`].
pub fn apply_edit(event: &Event, field: EventField, value: &str) -> CalendarResult<Event> {
    let mut edited = event.clone();

    match field {
        EventField::Name => edited.name = value.to_string(),
        EventField::Description => edited.description = optional_text(value),
        EventField::Location => edited.location = optional_text(value),
        EventField::Public => edited.is_public = parse_flag(field, value)?,
        EventField::Start | EventField::End => {
            let moved = parse_date_time(value)?;
            if field == EventField::Start {
                edited.start = moved;
            } else {
                edited.end = moved;
            }
            edited.series_id = None;
            edited.is_all_day = false;
        }
    }

    validate_span(&edited.name, edited.start, edited.end)?;
    Ok(edited)
}

/// Empty strings clear optional text fields
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_flag(field: EventField, value: &str) -> CalendarResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(CalendarError::InvalidValue {
            property: field.to_string(),
            value: value.to_string(),
        }),
    }
}
