use serde_json::{Map, Value};

use crate::error::ValidationError;

const REQUIRED_FIELDS: [&str; 3] = ["temperature", "humidity", "led_temp"];

/// A validated sensor upload, ready to be inserted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewReading {
    pub temperature: f64,
    pub humidity: f64,
    pub led_temp: f64,
}

impl NewReading {
    /// Validates an untrusted `POST /api/sensors` body.
    ///
    /// All missing fields are reported before any non-numeric one, so a
    /// client that forgets `humidity` and sends `temperature: "hot"` is told
    /// about `humidity` first.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;

        for field in REQUIRED_FIELDS {
            if matches!(obj.get(field), None | Some(Value::Null)) {
                return Err(ValidationError::MissingField(field));
            }
        }

        Ok(Self {
            temperature: numeric_field(obj, "temperature")?,
            humidity: numeric_field(obj, "humidity")?,
            led_temp: numeric_field(obj, "led_temp")?,
        })
    }
}

fn numeric_field(obj: &Map<String, Value>, field: &'static str) -> Result<f64, ValidationError> {
    obj.get(field)
        .and_then(coerce_f64)
        .ok_or(ValidationError::NotNumeric(field))
}

/// Accepts a JSON number or a string holding one. The result is always finite.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
