//! Shared configuration logic
//!
//! Handles loading of common environment variables.

use crate::error::ConfigError;
use crate::recurrence::DEFAULT_HORIZON_DAYS;
use crate::registry::TimezonePolicy;
use crate::timezone::Timezone;
use std::env;

/// Common configuration used across front ends
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Name of the calendar created at startup (default: "Default Calendar")
    pub default_calendar: String,

    /// Zone of the startup calendar (default: UTC)
    pub default_timezone: Timezone,

    /// Days scanned when expanding a recurrence rule (default: 3660)
    pub recurrence_horizon_days: u32,

    /// How a calendar's events react to a timezone change (default: reinterpret)
    pub timezone_policy: TimezonePolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_calendar: "Default Calendar".to_string(),
            default_timezone: Timezone::default(),
            recurrence_horizon_days: DEFAULT_HORIZON_DAYS,
            timezone_policy: TimezonePolicy::default(),
        }
    }
}

impl CoreConfig {
    /// Load common configuration from environment variables
    ///
    /// This will also initialize dotenv if it hasn't been done yet.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let default_timezone = match env::var("DAYBOOK_TIMEZONE") {
            Ok(tz) => Timezone::new(&tz)
                .map_err(|_| ConfigError::InvalidEnvVar("DAYBOOK_TIMEZONE".to_string()))?,
            Err(_) => defaults.default_timezone,
        };

        let recurrence_horizon_days = match env::var("DAYBOOK_RECURRENCE_HORIZON_DAYS") {
            Ok(days) => days
                .parse::<u32>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar("DAYBOOK_RECURRENCE_HORIZON_DAYS".to_string())
                })?,
            Err(_) => defaults.recurrence_horizon_days,
        };

        let timezone_policy = match env::var("DAYBOOK_TIMEZONE_POLICY") {
            Ok(policy) => policy
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("DAYBOOK_TIMEZONE_POLICY".to_string()))?,
            Err(_) => defaults.timezone_policy,
        };

        Ok(Self {
            default_calendar: env::var("DAYBOOK_DEFAULT_CALENDAR")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.default_calendar),
            default_timezone,
            recurrence_horizon_days,
            timezone_policy,
        })
    }
}
