//! Daybook Core - Domain logic and models
//!
//! This crate contains pure domain logic with no I/O operations.
//! Calendars, events, recurrence expansion, date queries and the
//! cross-calendar copy all live here, together with their error types.

pub mod calendar;
pub mod config;
pub mod controller;
pub mod copy;
pub mod datetime;
pub mod edit;
pub mod error;
pub mod models;
pub mod record;
pub mod recurrence;
pub mod registry;
pub mod timezone;
pub mod types;

pub use calendar::Calendar;
pub use controller::Controller;
pub use error::{CalendarError, CalendarResult};
pub use models::{Event, EventDraft, EventIdentity};
pub use registry::{CalendarRegistry, TimezonePolicy};
pub use timezone::{Timezone, parse_timezone};
