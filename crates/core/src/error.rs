//! Error types for Daybook core domain logic

use thiserror::Error;

/// Core calendar domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRecurrenceRule(String),

    #[error("Unsatisfiable recurrence: {0}")]
    UnsatisfiableRecurrence(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Calendar already exists: {0}")]
    DuplicateCalendarName(String),

    #[error("Duplicate event: {0}")]
    DuplicateEvent(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Cannot resolve local time {0}")]
    TimezoneResolution(String),

    #[error("Invalid date '{0}', expected yyyy-MM-dd")]
    InvalidDate(String),

    #[error("Invalid date-time '{0}', expected yyyy-MM-ddTHH:mm")]
    InvalidDateTime(String),

    #[error("Unknown property: {0}")]
    InvalidProperty(String),

    #[error("Invalid value for {property}: {value}")]
    InvalidValue { property: String, value: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment variable: {0}")]
    InvalidEnvVar(String),
}

/// Result type alias for calendar operations
pub type CalendarResult<T> = Result<T, CalendarError>;
