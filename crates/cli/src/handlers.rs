//! Command handlers
//!
//! Implementation of all command handlers. Each handler runs one command
//! against the session controller and returns the text to show the user.

use crate::commands::{Command, NewEvent, RepeatEnd, USAGE};
use crate::csv_file;
use anyhow::{Context, Result};
use daybook_core::datetime::{format_date, format_date_time, format_time, parse_date};
use daybook_core::{Controller, Event};
use std::path::Path;

/// What the front end should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Message(String),
    Exit,
}

/// Route a command to its handler
pub fn handle_command(controller: &mut Controller, command: Command) -> Result<Response> {
    tracing::debug!("Handling command: {:?}", command);

    let message = match command {
        Command::CreateCalendar { name, timezone } => {
            controller.create_calendar(&name, &timezone)?;
            format!("Created calendar '{}' ({})", name, timezone.trim())
        }
        Command::UseCalendar { name } => {
            controller.use_calendar(&name)?;
            format!("Using calendar '{}'", name)
        }
        Command::EditCalendar {
            name,
            property,
            value,
        } => {
            controller.edit_calendar(&name, &property, &value)?;
            format!("Updated {} of calendar '{}'", property.to_ascii_lowercase(), name)
        }
        Command::ShowCalendars => handle_show_calendars(controller),
        Command::CreateEvent(event) => handle_create_event(controller, event)?,
        Command::EditEvent {
            property,
            name,
            start,
            end,
            value,
        } => {
            let edited = controller.edit_single_event(&property, &name, &start, &end, &value)?;
            format!("Updated {}", edited.identity())
        }
        Command::CopyEvent {
            name,
            start,
            target,
            target_start,
        } => {
            let copy = controller.copy_event(&name, &start, &target, &target_start)?;
            format!("Copied to '{}' as {}", target, copy.identity())
        }
        Command::PrintEvents { date } => handle_print_events(controller, &date)?,
        Command::Busy { date } => {
            if controller.is_busy_on(&date)? {
                format!("Busy on {}", date)
            } else {
                format!("Available on {}", date)
            }
        }
        Command::Export { path } => handle_export(controller, Path::new(&path))?,
        Command::Import { path } => handle_import(controller, Path::new(&path))?,
        Command::Help => USAGE.to_string(),
        Command::Exit => return Ok(Response::Exit),
    };

    Ok(Response::Message(message))
}

fn handle_show_calendars(controller: &Controller) -> String {
    let active = controller.active_calendar().name();
    let registry = controller.registry();

    let mut response = format!("Calendars ({})", registry.len());
    for name in controller.get_calendar_names() {
        let marker = if name == active { "*" } else { " " };
        let timezone = registry
            .get(&name)
            .map(|calendar| calendar.timezone().name())
            .unwrap_or_default();
        response.push_str(&format!("\n{} {} [{}]", marker, name, timezone));
    }
    response
}

fn handle_create_event(controller: &mut Controller, event: NewEvent) -> Result<String> {
    let NewEvent {
        name,
        start,
        end,
        all_day,
        repeat,
        description,
        location,
        private,
    } = event;
    let is_public = !private;

    let Some(repeat) = repeat else {
        let created = controller.create_single_event(
            &name,
            &start,
            &end,
            &description,
            &location,
            is_public,
            all_day,
        )?;
        return Ok(format!("Created {}", created.identity()));
    };

    let created = match repeat.end {
        RepeatEnd::Times(times) => controller.create_recurring_event_occurrences(
            &name,
            &start,
            &end,
            &description,
            &location,
            is_public,
            &repeat.weekdays,
            times,
            all_day,
        )?,
        RepeatEnd::Until(until) => controller.create_recurring_event_until(
            &name,
            &start,
            &end,
            &description,
            &location,
            is_public,
            &repeat.weekdays,
            &until,
            all_day,
        )?,
    };

    Ok(format!(
        "Created {} occurrences of '{}' on {}",
        created.len(),
        name,
        repeat.weekdays.to_ascii_uppercase()
    ))
}

fn handle_print_events(controller: &Controller, date: &str) -> Result<String> {
    let events = controller.get_events_on(date)?;
    let day = format_date(parse_date(date)?);

    if events.is_empty() {
        return Ok(format!("No events on {}", day));
    }

    let mut response = format!("Events on {} ({})", day, events.len());
    for (idx, event) in events.iter().enumerate() {
        response.push_str(&format!("\n{}. {}", idx + 1, format_event(event)));
    }
    Ok(response)
}

/// One line of the day view
pub fn format_event(event: &Event) -> String {
    let mut line = if event.is_all_day {
        if event.start.date() == event.end.date() {
            format!("{} (all day)", event.name)
        } else {
            format!(
                "{} (all day, {} to {})",
                event.name,
                format_date(event.start.date()),
                format_date(event.end.date())
            )
        }
    } else if event.start.date() == event.end.date() {
        format!(
            "{} {} to {}",
            event.name,
            format_time(event.start.time()),
            format_time(event.end.time())
        )
    } else {
        format!(
            "{} {} to {}",
            event.name,
            format_date_time(event.start),
            format_date_time(event.end)
        )
    };

    if let Some(location) = &event.location {
        line.push_str(&format!(" at {}", location));
    }
    if !event.is_public {
        line.push_str(" [private]");
    }
    line
}

fn handle_export(controller: &Controller, path: &Path) -> Result<String> {
    let records = controller.export_records();
    csv_file::write_file(path, &records)?;

    tracing::info!(
        "Exported {} events from '{}' to {}",
        records.len(),
        controller.active_calendar().name(),
        path.display()
    );
    Ok(format!("Exported {} events to {}", records.len(), path.display()))
}

fn handle_import(controller: &mut Controller, path: &Path) -> Result<String> {
    let records = csv_file::read_file(path)?;
    let imported = controller
        .import_records(records)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    Ok(format!("Imported {} events from {}", imported, path.display()))
}
