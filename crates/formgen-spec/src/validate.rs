use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rules::{BaseType, Check, Constraint, FormSchema, REQUIRED_MESSAGE, ValidationRule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Outcome of checking a set of preview values against a schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
    #[serde(default)]
    pub missing_required: Vec<String>,
    #[serde(default)]
    pub unknown_fields: Vec<String>,
}

impl ValidationResult {
    pub fn error_for(&self, field: &str) -> Option<&ValidationError> {
        self.errors
            .iter()
            .find(|error| error.field.as_deref() == Some(field))
    }
}

impl FormSchema {
    /// Checks preview values (a JSON object keyed by field name).
    pub fn validate(&self, values: &Value) -> ValidationResult {
        let values_map = values.as_object().cloned().unwrap_or_default();

        let mut errors = Vec::new();
        let mut missing_required = Vec::new();

        for entry in &self.entries {
            let value = values_map.get(&entry.name).filter(|value| !value.is_null());
            match value {
                None => {
                    if !entry.rule.is_optional() {
                        missing_required.push(entry.name.clone());
                    }
                }
                Some(value) => {
                    if let Some((message, code)) = check_value(&entry.rule, value) {
                        errors.push(ValidationError {
                            field: Some(entry.name.clone()),
                            path: Some(format!("/{}", entry.name)),
                            message,
                            code: Some(code.into()),
                        });
                    }
                }
            }
        }

        let unknown_fields: Vec<String> = values_map
            .keys()
            .filter(|key| !self.names().any(|name| name == key.as_str()))
            .cloned()
            .collect();

        ValidationResult {
            valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
            errors,
            missing_required,
            unknown_fields,
        }
    }
}

/// Validates a present value; `None` means it passed.
pub fn check_value(rule: &ValidationRule, value: &Value) -> Option<(String, &'static str)> {
    let typed = match coerce(rule.base, value) {
        Some(typed) => typed,
        None => {
            let message = rule
                .base_message
                .clone()
                .unwrap_or_else(|| type_mismatch_message(rule.base));
            return Some((message, "type_mismatch"));
        }
    };

    rule.constraints
        .iter()
        .find_map(|constraint| enforce(constraint, &typed))
}

/// A value after base-type coercion.
enum Typed<'a> {
    Text(&'a str),
    Number(f64),
    Flag(bool),
    List(usize),
    Binary,
}

fn coerce(base: BaseType, value: &Value) -> Option<Typed<'_>> {
    match base {
        BaseType::String => value.as_str().map(Typed::Text),
        BaseType::Number => coerce_number(value).map(Typed::Number),
        BaseType::Boolean => value.as_bool().map(Typed::Flag),
        BaseType::StringArray => value
            .as_array()
            .filter(|items| items.iter().all(Value::is_string))
            .map(|items| Typed::List(items.len())),
        BaseType::Binary => value
            .as_object()
            .filter(|file| file.get("name").is_some_and(Value::is_string))
            .map(|_| Typed::Binary),
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.filter(|number| !number.is_nan())
}

fn type_mismatch_message(base: BaseType) -> String {
    match base {
        BaseType::String => "Expected string".into(),
        BaseType::Number => "Expected number".into(),
        BaseType::Boolean => "Expected boolean".into(),
        BaseType::StringArray => "Expected array of strings".into(),
        BaseType::Binary => "Input not instance of File".into(),
    }
}

/// Lengths are counted in UTF-16 units, like the generated component does.
fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

fn enforce(constraint: &Constraint, typed: &Typed<'_>) -> Option<(String, &'static str)> {
    let fail = |fallback: String, code: &'static str| {
        Some((constraint.message.clone().unwrap_or(fallback), code))
    };

    match (&constraint.check, typed) {
        (Check::MinLength { value }, Typed::Text(text)) if text_length(text) < *value => fail(
            format!("String must contain at least {} character(s)", value),
            "min_length",
        ),
        (Check::MinLength { value }, Typed::List(len)) if len < value => fail(
            format!("Array must contain at least {} element(s)", value),
            "min_length",
        ),
        (Check::MaxLength { value }, Typed::Text(text)) if text_length(text) > *value => fail(
            format!("String must contain at most {} character(s)", value),
            "max_length",
        ),
        (Check::MaxLength { value }, Typed::List(len)) if len > value => fail(
            format!("Array must contain at most {} element(s)", value),
            "max_length",
        ),
        (Check::Min { value }, Typed::Number(number)) if number < value => {
            fail(format!("Number must be greater than or equal to {}", value), "min")
        }
        (Check::Max { value }, Typed::Number(number)) if number > value => {
            fail(format!("Number must be less than or equal to {}", value), "max")
        }
        (Check::Pattern { pattern }, Typed::Text(text)) => match Regex::new(pattern.source()) {
            Ok(regex) if !regex.is_match(text) => {
                fail(pattern.message().to_string(), "pattern_mismatch")
            }
            _ => None,
        },
        (Check::MustBeTrue, Typed::Flag(flag)) if !*flag => {
            fail(REQUIRED_MESSAGE.to_string(), "must_be_true")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_coercion_accepts_numeric_strings() {
        assert_eq!(coerce_number(&json!("12.5")), Some(12.5));
        assert_eq!(coerce_number(&json!("")), Some(0.0));
        assert_eq!(coerce_number(&json!(true)), Some(1.0));
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }

    #[test]
    fn lengths_count_utf16_units() {
        assert_eq!(text_length("abc"), 3);
        assert_eq!(text_length("é"), 1);
        assert_eq!(text_length("😀"), 2);
    }
}
