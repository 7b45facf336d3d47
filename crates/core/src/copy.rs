//! Copying an event into another calendar
//!
//! The copy starts at a caller-chosen wall-clock time in the target
//! calendar's zone and lasts exactly as long, in absolute time, as the
//! source. Copies are always standalone events.

use chrono::NaiveDateTime;

use crate::error::{CalendarError, CalendarResult};
use crate::models::{Event, EventIdentity};
use crate::registry::CalendarRegistry;
use crate::timezone::{advance, elapsed};

/// Copy the event matching `identity` in `source_calendar` into
/// `target_calendar`, starting at `target_start`.
///
/// Fails with `EventNotFound` / `CalendarNotFound` when either side cannot
/// be resolved, `TimezoneResolution` when a wall-clock value does not exist
/// in its zone or a fold would put the end before the start, and
/// `DuplicateEvent` when the target already holds an event with the
/// resulting identity. Nothing is inserted on failure.
pub fn copy_event(
    registry: &mut CalendarRegistry,
    source_calendar: &str,
    identity: &EventIdentity,
    target_calendar: &str,
    target_start: NaiveDateTime,
) -> CalendarResult<Event> {
    let source = registry.get(source_calendar)?;
    let original = source.find_by_identity(identity)?;
    let source_zone = source.timezone();
    let target_zone = registry.get(target_calendar)?.timezone();

    let length = elapsed(original.start, original.end, source_zone.tz())?;
    let target_end = advance(target_start, length, target_zone.tz())?;

    // Starting inside a fall-back fold can land the end on an earlier wall clock
    if target_end < target_start {
        return Err(CalendarError::TimezoneResolution(format!(
            "{} in {} lasts {} minutes but would end at {} on the wall clock",
            target_start.format("%Y-%m-%dT%H:%M"),
            target_zone,
            length.num_minutes(),
            target_end.format("%Y-%m-%dT%H:%M")
        )));
    }

    let mut draft = original.to_draft();
    draft.start = target_start;
    draft.end = target_end;
    let copy = Event::new(draft)?;

    let target = registry.get_mut(target_calendar)?;
    if target.contains_identity(&copy.identity()) {
        return Err(CalendarError::DuplicateEvent(copy.identity().to_string()));
    }

    tracing::info!(
        "Copied {} from '{}' ({}) to '{}' ({})",
        identity,
        source_calendar,
        source_zone,
        target_calendar,
        target_zone
    );
    Ok(target.add_event(copy).clone())
}
