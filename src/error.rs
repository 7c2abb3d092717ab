use thiserror::Error;

use crate::config::FanLimitUnit;

/// Rejected client input. Every variant maps to `400 Bad Request`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field '{0}' must be numeric")]
    NotNumeric(&'static str),

    #[error("Invalid '{0}' date")]
    InvalidDate(&'static str),

    #[error("command must be a JSON object with a string 'type' field")]
    InvalidCommand,

    #[error("fan limit values must be numbers")]
    FanLimitsNotNumbers,

    #[error(
        "fan limit values must be between {} and {} {}",
        .unit.range().start(),
        .unit.range().end(),
        .unit
    )]
    FanLimitsOutOfRange { unit: FanLimitUnit },

    #[error("{} must be less than {}", .unit.min_key(), .unit.max_key())]
    FanLimitsInverted { unit: FanLimitUnit },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        assert_eq!(
            ValidationError::MissingField("humidity").to_string(),
            "missing required field: humidity"
        );
        assert_eq!(
            ValidationError::NotNumeric("led_temp").to_string(),
            "field 'led_temp' must be numeric"
        );
        assert_eq!(ValidationError::InvalidDate("to").to_string(), "Invalid 'to' date");
    }

    #[test]
    fn fan_limit_messages_follow_unit() {
        let celsius = FanLimitUnit::Celsius;
        assert_eq!(
            ValidationError::FanLimitsOutOfRange { unit: celsius }.to_string(),
            "fan limit values must be between 0 and 100 °C"
        );
        assert_eq!(
            ValidationError::FanLimitsInverted { unit: celsius }.to_string(),
            "min_temp must be less than max_temp"
        );

        let rpm = FanLimitUnit::Rpm;
        assert_eq!(
            ValidationError::FanLimitsOutOfRange { unit: rpm }.to_string(),
            "fan limit values must be between 0 and 5000 RPM"
        );
        assert_eq!(
            ValidationError::FanLimitsInverted { unit: rpm }.to_string(),
            "min_rpm must be less than max_rpm"
        );
    }
}
