//! CLI configuration
//!
//! Loads configuration from environment variables

use anyhow::{Context, Result};
use daybook_core::config::CoreConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared core settings
    pub core: CoreConfig,

    /// Prompt printed before each interactive command
    pub prompt: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let core = CoreConfig::from_env().context("Failed to load core configuration")?;

        let prompt = std::env::var("DAYBOOK_PROMPT").unwrap_or_else(|_| "daybook> ".to_string());

        Ok(Self { core, prompt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env() {
        unsafe {
            std::env::remove_var("DAYBOOK_TIMEZONE");
            std::env::set_var("DAYBOOK_PROMPT", "cal> ");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.prompt, "cal> ");
        assert_eq!(config.core.default_timezone.name(), "UTC");

        unsafe {
            std::env::remove_var("DAYBOOK_PROMPT");
        }
    }

    #[test]
    #[serial]
    fn test_config_reports_core_failure() {
        unsafe {
            std::env::set_var("DAYBOOK_TIMEZONE", "Not/AZone");
        }

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("core configuration"));

        unsafe {
            std::env::remove_var("DAYBOOK_TIMEZONE");
        }
    }
}
