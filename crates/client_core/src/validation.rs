//! Payload validation for raw assessment input.

use std::fmt;

use serde_json::Value;
use shared::{
    domain::{StudentRecord, REQUIRED_FIELDS},
    error::ValidationError,
};

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 4.0;

/// Checks raw text and turns it into a [`StudentRecord`].
///
/// Pure: the same input always gives the same answer. The parsed record is
/// returned untouched, no numeric coercion beyond what JSON parsing does.
pub fn validate(raw: &str) -> Result<StudentRecord, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|err| ValidationError::SyntaxError(err.to_string()))?;

    let Value::Object(fields) = value else {
        return Err(ValidationError::SyntaxError(format!(
            "expected a JSON object, found {}",
            value_kind(&value)
        )));
    };

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !fields.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingRequiredField(missing));
    }

    Ok(StudentRecord::from_fields(fields))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A score outside the conventional range. Shown as a warning, never blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreAdvisory {
    pub field: String,
    pub score: f64,
}

impl fmt::Display for ScoreAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside the expected {SCORE_MIN}-{SCORE_MAX} range",
            self.field, self.score
        )
    }
}

pub fn score_advisories(record: &StudentRecord) -> Vec<ScoreAdvisory> {
    record
        .scores()
        .filter(|(_, score)| !(SCORE_MIN..=SCORE_MAX).contains(score))
        .map(|(field, score)| ScoreAdvisory {
            field: field.to_string(),
            score,
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
