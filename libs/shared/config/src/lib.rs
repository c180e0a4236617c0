use std::env;
use thiserror::Error;
use tracing::warn;

pub mod context;

pub use context::AppContext;

pub const DEFAULT_APPOINTMENTS_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_DATE_LOCALE: &str = "pt-BR";
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;
pub const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 30;
pub const DEFAULT_SERVER_PORT: u16 = 3001;

// A fixed offset must stay strictly inside one day.
const MAX_OFFSET_MINUTES: i32 = 23 * 60 + 59;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be provided before it is used; call AppContext::provide during startup")]
    NotProvided(&'static str),

    #[error("{0} has already been provided")]
    AlreadyProvided(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub appointments_api_url: String,
    pub date_locale: String,
    pub display_utc_offset_minutes: i32,
    pub slot_interval_minutes: u32,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            appointments_api_url: DEFAULT_APPOINTMENTS_API_URL.to_string(),
            date_locale: DEFAULT_DATE_LOCALE.to_string(),
            display_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            appointments_api_url: env::var("APPOINTMENTS_API_URL")
                .unwrap_or_else(|_| {
                    warn!("APPOINTMENTS_API_URL not set, using default");
                    DEFAULT_APPOINTMENTS_API_URL.to_string()
                }),
            date_locale: env::var("DATE_LOCALE")
                .unwrap_or_else(|_| {
                    warn!("DATE_LOCALE not set, using {}", DEFAULT_DATE_LOCALE);
                    DEFAULT_DATE_LOCALE.to_string()
                }),
            display_utc_offset_minutes: parse_var(
                "DISPLAY_UTC_OFFSET_MINUTES",
                DEFAULT_UTC_OFFSET_MINUTES,
            ),
            slot_interval_minutes: parse_var(
                "SLOT_INTERVAL_MINUTES",
                DEFAULT_SLOT_INTERVAL_MINUTES,
            ),
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.appointments_api_url.trim().is_empty()
    }

    /// Checks the values that cannot be corrected silently at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::InvalidValue {
                name: "APPOINTMENTS_API_URL",
                value: self.appointments_api_url.clone(),
            });
        }

        if self.display_utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::InvalidValue {
                name: "DISPLAY_UTC_OFFSET_MINUTES",
                value: self.display_utc_offset_minutes.to_string(),
            });
        }

        if self.slot_interval_minutes == 0 || self.slot_interval_minutes > 720 {
            return Err(ConfigError::InvalidValue {
                name: "SLOT_INTERVAL_MINUTES",
                value: self.slot_interval_minutes.to_string(),
            });
        }

        Ok(())
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using {}", name, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using {}", name, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_offset_outside_one_day() {
        let config = AppConfig {
            display_utc_offset_minutes: 24 * 60,
            ..AppConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { name: "DISPLAY_UTC_OFFSET_MINUTES", .. })
        );
    }

    #[test]
    fn rejects_zero_slot_interval() {
        let config = AppConfig {
            slot_interval_minutes: 0,
            ..AppConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { name: "SLOT_INTERVAL_MINUTES", .. })
        );
    }

    #[test]
    fn blank_api_url_is_not_configured() {
        let config = AppConfig {
            appointments_api_url: "  ".to_string(),
            ..AppConfig::default()
        };
        assert!(!config.is_configured());
        assert!(config.validate().is_err());
    }
}
