//! The set of named calendars and the active-calendar pointer
//!
//! The registry always holds at least one calendar and exactly one active
//! calendar. Calendars are never deleted, so positions stay stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::calendar::Calendar;
use crate::error::{CalendarError, CalendarResult};
use crate::models::Event;
use crate::timezone::{Timezone, reproject};

/// What happens to stored wall-clock times when a calendar changes zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimezonePolicy {
    /// Keep every wall-clock value; absolute instants shift with the zone
    #[default]
    Reinterpret,
    /// Re-express every event in the new zone so instants stay put
    Reproject,
}

impl FromStr for TimezonePolicy {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reinterpret" => Ok(Self::Reinterpret),
            "reproject" => Ok(Self::Reproject),
            _ => Err(CalendarError::InvalidValue {
                property: "timezone policy".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TimezonePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reinterpret => f.write_str("reinterpret"),
            Self::Reproject => f.write_str("reproject"),
        }
    }
}

/// Calendar registry
#[derive(Debug, Clone)]
pub struct CalendarRegistry {
    calendars: Vec<Calendar>,
    active: usize,
}

impl CalendarRegistry {
    /// Create a registry holding one calendar, which becomes active
    pub fn new(default_name: impl Into<String>, timezone: Timezone) -> Self {
        Self {
            calendars: vec![Calendar::new(default_name, timezone)],
            active: 0,
        }
    }

    /// Add a calendar. Names are case-sensitive and must be unique.
    pub fn create(&mut self, name: &str, timezone: &str) -> CalendarResult<&Calendar> {
        let name = validate_name(name)?;
        if self.position_of(name).is_some() {
            return Err(CalendarError::DuplicateCalendarName(name.to_string()));
        }
        let timezone = Timezone::new(timezone)?;

        self.calendars.push(Calendar::new(name, timezone));
        tracing::info!("Created calendar '{}' ({})", name, timezone);
        Ok(&self.calendars[self.calendars.len() - 1])
    }

    /// Switch the active calendar. Events are not moved.
    pub fn set_active(&mut self, name: &str) -> CalendarResult<()> {
        self.active = self.require(name)?;
        tracing::debug!("Active calendar is now '{}'", name);
        Ok(())
    }

    pub fn active(&self) -> &Calendar {
        &self.calendars[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Calendar {
        &mut self.calendars[self.active]
    }

    pub fn get(&self, name: &str) -> CalendarResult<&Calendar> {
        self.require(name).map(|i| &self.calendars[i])
    }

    pub fn get_mut(&mut self, name: &str) -> CalendarResult<&mut Calendar> {
        let position = self.require(name)?;
        Ok(&mut self.calendars[position])
    }

    /// Snapshot of every calendar name
    pub fn names(&self) -> BTreeSet<String> {
        self.calendars.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.calendars.len()
    }

    /// Always false; kept for symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }

    /// Change a calendar's zone.
    ///
    /// With [`TimezonePolicy::Reinterpret`] only the label changes, so
    /// every stored wall-clock value now denotes a different instant. With
    /// [`TimezonePolicy::Reproject`] timed events are rewritten to keep
    /// their instants; all-day events keep their day bounds. Reprojection
    /// is all-or-nothing.
    pub fn edit_timezone(
        &mut self,
        name: &str,
        timezone: &str,
        policy: TimezonePolicy,
    ) -> CalendarResult<()> {
        let new_zone = Timezone::new(timezone)?;
        let calendar = self.get_mut(name)?;
        let old_zone = calendar.timezone();

        if policy == TimezonePolicy::Reproject {
            let moved = calendar
                .events()
                .iter()
                .map(|event| reproject_event(event, old_zone, new_zone))
                .collect::<CalendarResult<Vec<_>>>()?;
            calendar.replace_events(moved);
        }
        calendar.set_timezone(new_zone);

        tracing::info!(
            "Calendar '{}' moved from {} to {} ({})",
            name,
            old_zone,
            new_zone,
            policy
        );
        Ok(())
    }

    /// Rename a calendar; the active pointer follows it
    pub fn rename(&mut self, name: &str, new_name: &str) -> CalendarResult<()> {
        let new_name = validate_name(new_name)?;
        let position = self.require(name)?;
        if name != new_name && self.position_of(new_name).is_some() {
            return Err(CalendarError::DuplicateCalendarName(new_name.to_string()));
        }

        self.calendars[position].set_name(new_name.to_string());
        tracing::info!("Renamed calendar '{}' to '{}'", name, new_name);
        Ok(())
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.calendars.iter().position(|c| c.name() == name)
    }

    fn require(&self, name: &str) -> CalendarResult<usize> {
        self.position_of(name)
            .ok_or_else(|| CalendarError::CalendarNotFound(name.to_string()))
    }
}

fn validate_name(name: &str) -> CalendarResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CalendarError::InvalidValue {
            property: "calendar name".to_string(),
            value: name.to_string(),
        });
    }
    Ok(name)
}

fn reproject_event(event: &Event, from: Timezone, to: Timezone) -> CalendarResult<Event> {
    if event.is_all_day {
        return Ok(event.clone());
    }
    let start = reproject(event.start, from.tz(), to.tz())?;
    let end = reproject(event.end, from.tz(), to.tz())?;

    // A fall-back fold in the new zone can put the end's wall clock first
    if end < start {
        return Err(CalendarError::TimezoneResolution(format!(
            "{} cannot be expressed in {} without ending before it starts",
            event.identity(),
            to
        )));
    }

    Ok(Event {
        start,
        end,
        ..event.clone()
    })
}
