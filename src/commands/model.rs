use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{config::FanLimitUnit, error::ValidationError};

/// Tag of the only command type with a single-instance rule.
pub const FAN_LIMITS: &str = "fan_limits";

/// An instruction queued for the device, picked up on its next upload.
///
/// Serialises back to the shape the client sent: `{"type": ..., ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Command {
    /// Validates an untrusted `POST /api/command` body.
    ///
    /// `fan_limits` bounds are checked against `unit` and replaced with their
    /// integer values; every other type is accepted as-is.
    pub fn from_json(body: Value, unit: FanLimitUnit) -> Result<Self, ValidationError> {
        let Value::Object(mut payload) = body else {
            return Err(ValidationError::InvalidCommand);
        };
        let kind = match payload.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(ValidationError::InvalidCommand),
        };

        if kind == FAN_LIMITS {
            FanLimits::parse(&payload, unit)?.write_into(&mut payload, unit);
        }

        Ok(Self { kind, payload })
    }

    pub fn is_fan_limits(&self) -> bool {
        self.kind == FAN_LIMITS
    }
}

/// Validated fan bounds, in the deployment's unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanLimits {
    pub min: i64,
    pub max: i64,
}

impl FanLimits {
    /// Checks, in order: both bounds are integers, both lie in the unit's
    /// range, and `min < max`.
    pub fn parse(payload: &Map<String, Value>, unit: FanLimitUnit) -> Result<Self, ValidationError> {
        let min = payload.get(unit.min_key()).and_then(coerce_i64);
        let max = payload.get(unit.max_key()).and_then(coerce_i64);
        let (Some(min), Some(max)) = (min, max) else {
            return Err(ValidationError::FanLimitsNotNumbers);
        };

        let range = unit.range();
        if !range.contains(&min) || !range.contains(&max) {
            return Err(ValidationError::FanLimitsOutOfRange { unit });
        }
        if min >= max {
            return Err(ValidationError::FanLimitsInverted { unit });
        }
        Ok(Self { min, max })
    }

    fn write_into(self, payload: &mut Map<String, Value>, unit: FanLimitUnit) {
        payload.insert(unit.min_key().to_owned(), Value::from(self.min));
        payload.insert(unit.max_key().to_owned(), Value::from(self.max));
    }
}

/// Accepts a JSON integer, a whole JSON float, or a string holding an integer.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .filter(|f| (i64::MIN as f64..=i64::MAX as f64).contains(f))
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const C: FanLimitUnit = FanLimitUnit::Celsius;

    #[test]
    fn fan_limits_are_coerced_to_integers() {
        let cmd = Command::from_json(
            json!({"type": "fan_limits", "min_temp": "18", "max_temp": 25.0}),
            C,
        )
        .unwrap();
        assert!(cmd.is_fan_limits());
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({"type": "fan_limits", "min_temp": 18, "max_temp": 25})
        );
    }

    #[test]
    fn extra_fan_limit_fields_are_kept() {
        let cmd = Command::from_json(
            json!({"type": "fan_limits", "min_temp": 20, "max_temp": 30, "source": "dashboard"}),
            C,
        )
        .unwrap();
        assert_eq!(cmd.payload["source"], "dashboard");
    }

    #[test]
    fn fan_limits_need_numbers() {
        for body in [
            json!({"type": "fan_limits"}),
            json!({"type": "fan_limits", "min_temp": 20}),
            json!({"type": "fan_limits", "min_temp": "cool", "max_temp": 30}),
            json!({"type": "fan_limits", "min_temp": 20.5, "max_temp": 30}),
            json!({"type": "fan_limits", "min_temp": null, "max_temp": 30}),
        ] {
            assert_eq!(
                Command::from_json(body, C).unwrap_err(),
                ValidationError::FanLimitsNotNumbers
            );
        }
    }

    #[test]
    fn fan_limits_must_be_in_range() {
        for (min, max) in [(-1, 30), (20, 101), (150, 200)] {
            let body = json!({"type": "fan_limits", "min_temp": min, "max_temp": max});
            assert_eq!(
                Command::from_json(body, C).unwrap_err(),
                ValidationError::FanLimitsOutOfRange { unit: C }
            );
        }
    }

    #[test]
    fn range_edges_are_accepted() {
        let body = json!({"type": "fan_limits", "min_temp": 0, "max_temp": 100});
        assert!(Command::from_json(body, C).is_ok());
    }

    #[test]
    fn fan_limits_min_must_be_below_max() {
        for (min, max) in [(40, 30), (30, 30)] {
            let body = json!({"type": "fan_limits", "min_temp": min, "max_temp": max});
            assert_eq!(
                Command::from_json(body, C).unwrap_err(),
                ValidationError::FanLimitsInverted { unit: C }
            );
        }
    }

    #[test]
    fn range_check_runs_before_ordering_check() {
        let body = json!({"type": "fan_limits", "min_temp": 500, "max_temp": 30});
        assert_eq!(
            Command::from_json(body, C).unwrap_err(),
            ValidationError::FanLimitsOutOfRange { unit: C }
        );
    }

    #[test]
    fn rpm_unit_uses_rpm_keys_and_range() {
        let rpm = FanLimitUnit::Rpm;
        let cmd = Command::from_json(
            json!({"type": "fan_limits", "min_rpm": 800, "max_rpm": "4500"}),
            rpm,
        )
        .unwrap();
        assert_eq!(cmd.payload["max_rpm"], 4500);

        // Celsius keys mean nothing to an RPM deployment.
        let err = Command::from_json(
            json!({"type": "fan_limits", "min_temp": 20, "max_temp": 30}),
            rpm,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::FanLimitsNotNumbers);
    }

    #[test]
    fn other_types_pass_through() {
        let body = json!({"type": "led", "state": "on", "min_temp": "ignored"});
        let cmd = Command::from_json(body.clone(), C).unwrap();
        assert_eq!(cmd.kind, "led");
        assert!(!cmd.is_fan_limits());
        assert_eq!(serde_json::to_value(&cmd).unwrap(), body);
    }

    #[test]
    fn type_tag_is_required() {
        for body in [json!({"min_temp": 1}), json!({"type": 7}), json!("fan_limits"), json!(null)] {
            assert_eq!(
                Command::from_json(body, C).unwrap_err(),
                ValidationError::InvalidCommand
            );
        }
    }
}
