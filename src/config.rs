use std::{fmt, ops::RangeInclusive, str::FromStr};

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Deployment environment, read from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Test,
}

impl Environment {
    /// Whether destructive test helpers (`POST /api/sensors/reset`) are exposed.
    pub fn allows_reset(self) -> bool {
        self != Self::Production
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            other => Err(anyhow::anyhow!("unknown environment: {other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// FanLimitUnit
// ---------------------------------------------------------------------------

/// Unit the device firmware uses for `fan_limits` bounds.
///
/// Selects both the payload keys and the accepted closed range:
///
/// | Unit    | Keys                   | Range     |
/// |---------|------------------------|-----------|
/// | Celsius | `min_temp`, `max_temp` | 0..=100   |
/// | Rpm     | `min_rpm`, `max_rpm`   | 0..=5000  |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanLimitUnit {
    Celsius,
    Rpm,
}

impl FanLimitUnit {
    pub fn min_key(self) -> &'static str {
        match self {
            Self::Celsius => "min_temp",
            Self::Rpm => "min_rpm",
        }
    }

    pub fn max_key(self) -> &'static str {
        match self {
            Self::Celsius => "max_temp",
            Self::Rpm => "max_rpm",
        }
    }

    pub fn range(self) -> RangeInclusive<i64> {
        match self {
            Self::Celsius => 0..=100,
            Self::Rpm => 0..=5000,
        }
    }
}

impl fmt::Display for FanLimitUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FanLimitUnit::Celsius => "°C",
            FanLimitUnit::Rpm => "RPM",
        };
        f.write_str(s)
    }
}

impl FromStr for FanLimitUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "celsius" => Ok(Self::Celsius),
            "rpm" => Ok(Self::Rpm),
            other => Err(anyhow::anyhow!("unknown fan limit unit: {other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// sqlx SQLite URL, e.g. `sqlite://mydb.sqlite3` or `sqlite::memory:`.
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub environment: Environment,
    pub fan_limit_unit: FanLimitUnit,
    /// Maximum number of pending commands kept for the device.
    pub command_queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: optional("DATABASE_URL", "sqlite://mydb.sqlite3"),
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "3000")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            environment: optional("APP_ENV", "production")
                .trim()
                .parse()
                .context("APP_ENV must be one of production, development, test")?,
            fan_limit_unit: optional("FAN_LIMITS_UNIT", "celsius")
                .trim()
                .parse()
                .context("FAN_LIMITS_UNIT must be either celsius or rpm")?,
            command_queue_capacity: parse_capacity(&optional("COMMAND_QUEUE_CAPACITY", "32"))?,
        })
    }
}

fn parse_capacity(raw: &str) -> Result<usize> {
    let capacity: usize = raw
        .trim()
        .parse()
        .context("COMMAND_QUEUE_CAPACITY must be a positive integer")?;
    anyhow::ensure!(capacity > 0, "COMMAND_QUEUE_CAPACITY must be at least 1");
    Ok(capacity)
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_from_str_known_values() {
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
    }

    #[test]
    fn environment_unknown_errors() {
        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("unknown environment"));
    }

    #[test]
    fn only_production_hides_reset() {
        assert!(!Environment::Production.allows_reset());
        assert!(Environment::Development.allows_reset());
        assert!(Environment::Test.allows_reset());
    }

    #[test]
    fn fan_limit_unit_keys_and_ranges() {
        let c: FanLimitUnit = "celsius".parse().unwrap();
        assert_eq!(c.min_key(), "min_temp");
        assert_eq!(c.max_key(), "max_temp");
        assert_eq!(c.range(), 0..=100);

        let r: FanLimitUnit = "rpm".parse().unwrap();
        assert_eq!(r.min_key(), "min_rpm");
        assert_eq!(r.max_key(), "max_rpm");
        assert_eq!(r.range(), 0..=5000);
    }

    #[test]
    fn fan_limit_unit_unknown_errors() {
        let err = "fahrenheit".parse::<FanLimitUnit>().unwrap_err();
        assert!(err.to_string().contains("unknown fan limit unit"));
    }

    #[test]
    fn capacity_must_be_positive() {
        assert_eq!(parse_capacity("16").unwrap(), 16);
        assert_eq!(parse_capacity(" 4 ").unwrap(), 4);
        assert!(parse_capacity("0").is_err());
        assert!(parse_capacity("-3").is_err());
        assert!(parse_capacity("lots").is_err());
    }
}
