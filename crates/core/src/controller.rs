//! String-level operations used by front ends
//!
//! The controller owns the registry for the whole session. Front ends hold
//! one controller and call into it one operation at a time; every operation
//! either applies completely or returns an error and changes nothing.

use std::collections::BTreeSet;

use crate::calendar::Calendar;
use crate::config::CoreConfig;
use crate::copy;
use crate::datetime::{parse_date, parse_date_time};
use crate::edit::{EventField, optional_text};
use crate::error::{CalendarError, CalendarResult};
use crate::models::{Event, EventDraft, EventIdentity};
use crate::record::EventRecord;
use crate::recurrence::{RecurrenceRule, Termination, WeekdaySet, expand};
use crate::registry::{CalendarRegistry, TimezonePolicy};
use crate::types::SeriesId;

/// Session state shared by every front end
#[derive(Debug, Clone)]
pub struct Controller {
    registry: CalendarRegistry,
    horizon_days: u32,
    timezone_policy: TimezonePolicy,
}

impl Controller {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            registry: CalendarRegistry::new(config.default_calendar.clone(), config.default_timezone),
            horizon_days: config.recurrence_horizon_days,
            timezone_policy: config.timezone_policy,
        }
    }

    pub fn registry(&self) -> &CalendarRegistry {
        &self.registry
    }

    pub fn active_calendar(&self) -> &Calendar {
        self.registry.active()
    }

    pub fn timezone_policy(&self) -> TimezonePolicy {
        self.timezone_policy
    }

    /// Create one standalone event in the active calendar
    #[allow(clippy::too_many_arguments)]
    pub fn create_single_event(
        &mut self,
        name: &str,
        start: &str,
        end: &str,
        description: &str,
        location: &str,
        is_public: bool,
        is_all_day: bool,
    ) -> CalendarResult<Event> {
        let draft = draft(name, start, end, description, location, is_public, is_all_day)?;
        let event = Event::new(draft)?;

        let calendar = self.registry.active_mut();
        tracing::debug!("Creating {} in '{}'", event.identity(), calendar.name());
        Ok(calendar.add_event(event).clone())
    }

    /// Create a series that stops after `occurrences` events
    #[allow(clippy::too_many_arguments)]
    pub fn create_recurring_event_occurrences(
        &mut self,
        name: &str,
        start: &str,
        end: &str,
        description: &str,
        location: &str,
        is_public: bool,
        weekdays: &str,
        occurrences: u32,
        is_all_day: bool,
    ) -> CalendarResult<Vec<Event>> {
        let draft = draft(name, start, end, description, location, is_public, is_all_day)?;
        let termination = Termination::from_parts(Some(occurrences), None)?;
        self.create_series(draft, weekdays, termination)
    }

    /// Create a series whose occurrences start no later than `until`
    #[allow(clippy::too_many_arguments)]
    pub fn create_recurring_event_until(
        &mut self,
        name: &str,
        start: &str,
        end: &str,
        description: &str,
        location: &str,
        is_public: bool,
        weekdays: &str,
        until: &str,
        is_all_day: bool,
    ) -> CalendarResult<Vec<Event>> {
        let draft = draft(name, start, end, description, location, is_public, is_all_day)?;
        let termination = Termination::from_parts(None, Some(parse_date_time(until)?))?;
        self.create_series(draft, weekdays, termination)
    }

    fn create_series(
        &mut self,
        draft: EventDraft,
        weekdays: &str,
        termination: Termination,
    ) -> CalendarResult<Vec<Event>> {
        let rule = RecurrenceRule::new(
            WeekdaySet::parse(weekdays)?,
            draft.start,
            draft.end,
            termination,
        )?;
        let occurrences = expand(&rule, &draft, SeriesId::new(), self.horizon_days)?;

        let calendar = self.registry.active_mut();
        calendar.add_series(occurrences.clone())?;
        tracing::info!(
            "Created series '{}' with {} occurrences in '{}'",
            draft.name,
            occurrences.len(),
            calendar.name()
        );
        Ok(occurrences)
    }

    /// Change one property of the event identified by name, start and end
    pub fn edit_single_event(
        &mut self,
        property: &str,
        name: &str,
        start: &str,
        end: &str,
        new_value: &str,
    ) -> CalendarResult<Event> {
        let field: EventField = property.parse()?;
        let identity = EventIdentity::new(name, parse_date_time(start)?, parse_date_time(end)?);

        let edited = self
            .registry
            .active_mut()
            .edit_event(&identity, field, new_value)?
            .clone();
        tracing::debug!("Edited {} of {}", field, identity);
        Ok(edited)
    }

    /// Copy an event of the active calendar into `target_calendar`.
    ///
    /// The source is matched on name and start; its end is taken from the
    /// matched event.
    pub fn copy_event(
        &mut self,
        name: &str,
        source_start: &str,
        target_calendar: &str,
        target_start: &str,
    ) -> CalendarResult<Event> {
        let source_start = parse_date_time(source_start)?;
        let target_start = parse_date_time(target_start)?;

        let source = self.registry.active();
        let identity = source.find_by_name_and_start(name, source_start)?.identity();
        let source_name = source.name().to_string();

        copy::copy_event(
            &mut self.registry,
            &source_name,
            &identity,
            target_calendar,
            target_start,
        )
    }

    /// Events of the active calendar on a `yyyy-MM-dd` day
    pub fn get_events_on(&self, date: &str) -> CalendarResult<Vec<Event>> {
        let date = parse_date(date)?;
        Ok(self
            .registry
            .active()
            .events_on(date)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn is_busy_on(&self, date: &str) -> CalendarResult<bool> {
        Ok(self.registry.active().is_busy_on(parse_date(date)?))
    }

    pub fn create_calendar(&mut self, name: &str, timezone: &str) -> CalendarResult<()> {
        self.registry.create(name, timezone).map(|_| ())
    }

    pub fn use_calendar(&mut self, name: &str) -> CalendarResult<()> {
        self.registry.set_active(name)
    }

    pub fn get_calendar_names(&self) -> BTreeSet<String> {
        self.registry.names()
    }

    /// Change a calendar's `name` or `timezone`
    pub fn edit_calendar(&mut self, name: &str, property: &str, value: &str) -> CalendarResult<()> {
        match property.trim().to_ascii_lowercase().as_str() {
            "name" => self.registry.rename(name, value),
            "timezone" => self
                .registry
                .edit_timezone(name, value, self.timezone_policy),
            _ => Err(CalendarError::InvalidProperty(property.to_string())),
        }
    }

    /// Rows for every event of the active calendar, ordered by start
    pub fn export_records(&self) -> Vec<EventRecord> {
        let mut events: Vec<&Event> = self.registry.active().events().iter().collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.name.cmp(&b.name)));
        events.into_iter().map(EventRecord::from_event).collect()
    }

    /// Add every row to the active calendar as a standalone event.
    ///
    /// All rows are validated first; one bad row rejects the whole import.
    pub fn import_records(&mut self, records: Vec<EventRecord>) -> CalendarResult<usize> {
        let events = records
            .into_iter()
            .map(|record| Event::new(record.into_draft()))
            .collect::<CalendarResult<Vec<_>>>()?;

        let calendar = self.registry.active_mut();
        let imported = events.len();
        for event in events {
            calendar.add_event(event);
        }
        tracing::info!("Imported {} events into '{}'", imported, calendar.name());
        Ok(imported)
    }
}

fn draft(
    name: &str,
    start: &str,
    end: &str,
    description: &str,
    location: &str,
    is_public: bool,
    is_all_day: bool,
) -> CalendarResult<EventDraft> {
    Ok(EventDraft {
        name: name.to_string(),
        start: parse_date_time(start)?,
        end: parse_date_time(end)?,
        description: optional_text(description),
        location: optional_text(location),
        is_public,
        is_all_day,
    })
}
