//! A named, timezone-bound collection of events
//!
//! Events are kept in insertion order. A day index maps every calendar day
//! to the events present on it, so date queries do not scan the whole
//! calendar. Events spanning more than [`MAX_INDEXED_DAYS`] days are kept
//! in a separate list and checked against each queried date instead.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashSet};

use crate::edit::{EventField, apply_edit};
use crate::error::{CalendarError, CalendarResult};
use crate::models::{Event, EventIdentity};
use crate::timezone::Timezone;
use crate::types::{EventId, SeriesId};

/// Longest span, in days, that gets one index entry per day
pub const MAX_INDEXED_DAYS: i64 = 366;

/// Calendar entity
#[derive(Debug, Clone)]
pub struct Calendar {
    name: String,
    timezone: Timezone,
    events: Vec<Event>,
    by_day: BTreeMap<NaiveDate, Vec<usize>>,
    spanning: Vec<usize>,
}

impl Calendar {
    pub fn new(name: impl Into<String>, timezone: Timezone) -> Self {
        Self {
            name: name.into(),
            timezone,
            events: Vec::new(),
            by_day: BTreeMap::new(),
            spanning: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// All events in insertion order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_timezone(&mut self, timezone: Timezone) {
        self.timezone = timezone;
    }

    /// Append a standalone event. Unrelated events with the same identity
    /// are not rejected.
    pub fn add_event(&mut self, event: Event) -> &Event {
        let position = self.events.len();
        self.events.push(event);
        self.index(position);
        &self.events[position]
    }

    /// Insert every occurrence of a series, or none of them.
    ///
    /// Fails with [`CalendarError::DuplicateEvent`] if an occurrence has
    /// the same identity as an existing event or as another occurrence.
    pub fn add_series(&mut self, occurrences: Vec<Event>) -> CalendarResult<usize> {
        let mut seen = HashSet::with_capacity(occurrences.len());
        for occurrence in &occurrences {
            let identity = occurrence.identity();
            if self.contains_identity(&identity) || !seen.insert(identity.clone()) {
                return Err(CalendarError::DuplicateEvent(identity.to_string()));
            }
        }

        let inserted = occurrences.len();
        for occurrence in occurrences {
            self.add_event(occurrence);
        }
        Ok(inserted)
    }

    /// Events whose `[start, end)` interval intersects `date`, ordered by
    /// start time then name
    pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .by_day
            .get(&date)
            .map(|positions| positions.iter().map(|&i| &self.events[i]).collect())
            .unwrap_or_default();
        events.extend(
            self.spanning
                .iter()
                .map(|&i| &self.events[i])
                .filter(|e| e.occurs_on(date)),
        );
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.name.cmp(&b.name)));
        events
    }

    /// Whether anything is scheduled on `date`
    pub fn is_busy_on(&self, date: NaiveDate) -> bool {
        self.by_day.get(&date).is_some_and(|positions| !positions.is_empty())
            || self.spanning.iter().any(|&i| self.events[i].occurs_on(date))
    }

    pub fn contains_identity(&self, identity: &EventIdentity) -> bool {
        self.events.iter().any(|e| e.matches(identity))
    }

    /// Exact match on (name, start, end).
    ///
    /// When several events share the identity, the first one inserted wins.
    pub fn find_by_identity(&self, identity: &EventIdentity) -> CalendarResult<&Event> {
        self.position_of(identity).map(|i| &self.events[i])
    }

    /// First-inserted event with this name and start
    pub fn find_by_name_and_start(&self, name: &str, start: NaiveDateTime) -> CalendarResult<&Event> {
        self.events
            .iter()
            .find(|e| e.name == name && e.start == start)
            .ok_or_else(|| {
                CalendarError::EventNotFound(format!(
                    "'{}' starting {}",
                    name,
                    crate::datetime::format_date_time(start)
                ))
            })
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Occurrences of one series, in chronological order
    pub fn series(&self, series_id: SeriesId) -> Vec<&Event> {
        let mut occurrences: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| e.series_id == Some(series_id))
            .collect();
        occurrences.sort_by_key(|e| e.start);
        occurrences
    }

    /// Change one field of the event matching `identity`.
    ///
    /// The edit is validated before anything is stored; on failure the
    /// event is left as it was.
    pub fn edit_event(
        &mut self,
        identity: &EventIdentity,
        field: EventField,
        value: &str,
    ) -> CalendarResult<&Event> {
        let id = self.find_by_identity(identity)?.id;
        self.edit_event_by_id(id, field, value)
    }

    /// Change one field of the event with this id. The id survives the edit.
    pub fn edit_event_by_id(
        &mut self,
        id: EventId,
        field: EventField,
        value: &str,
    ) -> CalendarResult<&Event> {
        let position = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))?;
        let edited = apply_edit(&self.events[position], field, value)?;

        self.unindex(position);
        self.events[position] = edited;
        self.index(position);
        Ok(&self.events[position])
    }

    /// Swap every event at once and rebuild the day index
    pub(crate) fn replace_events(&mut self, events: Vec<Event>) {
        self.events = events;
        self.by_day.clear();
        self.spanning.clear();
        for position in 0..self.events.len() {
            self.index(position);
        }
    }

    fn position_of(&self, identity: &EventIdentity) -> CalendarResult<usize> {
        self.events
            .iter()
            .position(|e| e.matches(identity))
            .ok_or_else(|| CalendarError::EventNotFound(identity.to_string()))
    }

    fn is_spanning(&self, position: usize) -> bool {
        let event = &self.events[position];
        (event.last_day() - event.start.date()).num_days() >= MAX_INDEXED_DAYS
    }

    fn index(&mut self, position: usize) {
        if self.is_spanning(position) {
            if let Err(slot) = self.spanning.binary_search(&position) {
                self.spanning.insert(slot, position);
            }
            return;
        }
        for day in self.events[position].days() {
            let positions = self.by_day.entry(day).or_default();
            if let Err(slot) = positions.binary_search(&position) {
                positions.insert(slot, position);
            }
        }
    }

    fn unindex(&mut self, position: usize) {
        if self.is_spanning(position) {
            self.spanning.retain(|&p| p != position);
            return;
        }
        for day in self.events[position].days() {
            if let Some(positions) = self.by_day.get_mut(&day) {
                positions.retain(|&p| p != position);
                if positions.is_empty() {
                    self.by_day.remove(&day);
                }
            }
        }
    }
}
