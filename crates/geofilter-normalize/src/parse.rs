//! Textual geometry input.
//!
//! Text is first tried as serialized JSON (an object or an array). Failing
//! that it is read as comma-delimited numbers: two make a point and four a
//! bounding box. Text that is neither is handed on as a JSON string, which
//! no shape accepts.

use crate::models::GeometryInput;
use serde_json::Value;

/// Structured value for any geometry input
pub fn parse_geometry_input(input: &GeometryInput) -> Value {
    match input {
        GeometryInput::Text(text) => parse_text(text),
        GeometryInput::Shape(value) => value.clone(),
    }
}

pub fn parse_text(text: &str) -> Value {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if value.is_object() || value.is_array() {
            return value;
        }
    }

    match parse_delimited(text) {
        Some(numbers) => Value::Array(numbers.into_iter().map(number_value).collect()),
        None => Value::String(text.to_string()),
    }
}

// Whole numbers stay integers so they echo back the way they were typed
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::from(number as i64)
    } else {
        Value::from(number)
    }
}

fn parse_delimited(text: &str) -> Option<Vec<f64>> {
    text.split(',')
        .map(|token| token.trim().parse::<f64>().ok().filter(|number| number.is_finite()))
        .collect()
}
