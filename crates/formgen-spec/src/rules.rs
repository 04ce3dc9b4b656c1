use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::{FieldDefinition, FieldType, FormDefinition, ValueType};

/// Message attached to presence checks.
pub const REQUIRED_MESSAGE: &str = "Required";

/// Minimum length every password field enforces.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Value shape a rule accepts before any constraint runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum BaseType {
    String,
    /// Coerced from strings and booleans.
    Number,
    Boolean,
    StringArray,
    Binary,
}

/// Character class a text value must match in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    DigitsOnly,
    Alphanumeric,
}

impl Pattern {
    /// Regular expression source, anchored at both ends.
    pub fn source(&self) -> &'static str {
        match self {
            Pattern::DigitsOnly => r"^\d+$",
            Pattern::Alphanumeric => r"^[a-zA-Z0-9\s]+$",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Pattern::DigitsOnly => "Must contain only numbers",
            Pattern::Alphanumeric => "Must contain only letters, numbers, and spaces",
        }
    }

    fn for_value_type(value_type: Option<ValueType>) -> Option<Pattern> {
        match value_type {
            Some(ValueType::Number) => Some(Pattern::DigitsOnly),
            Some(ValueType::Alphanumeric) => Some(Pattern::Alphanumeric),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Check {
    MinLength { value: usize },
    MaxLength { value: usize },
    Min { value: f64 },
    Max { value: f64 },
    Pattern { pattern: Pattern },
    MustBeTrue,
    /// Absent values are accepted.
    Optional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Constraint {
    pub check: Check,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Declarative validation rule derived from one field.
///
/// Constraint order is significant and mirrors the method chain of the emitted
/// schema text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationRule {
    pub base: BaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_message: Option<String>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl ValidationRule {
    pub fn checks(&self) -> impl Iterator<Item = &Check> {
        self.constraints.iter().map(|constraint| &constraint.check)
    }

    pub fn is_optional(&self) -> bool {
        self.checks().any(|check| matches!(check, Check::Optional))
    }
}

struct RuleBuilder {
    rule: ValidationRule,
}

impl RuleBuilder {
    fn new(base: BaseType) -> Self {
        Self {
            rule: ValidationRule {
                base,
                base_message: None,
                constraints: Vec::new(),
            },
        }
    }

    fn base_message(mut self, message: &str) -> Self {
        self.rule.base_message = Some(message.into());
        self
    }

    fn push(mut self, check: Check, message: Option<String>) -> Self {
        self.rule.constraints.push(Constraint { check, message });
        self
    }

    fn push_if(self, condition: bool, check: Check, message: Option<String>) -> Self {
        if condition {
            self.push(check, message)
        } else {
            self
        }
    }

    fn presence(self, required: bool) -> Self {
        if required {
            self.push(
                Check::MinLength { value: 1 },
                Some(REQUIRED_MESSAGE.into()),
            )
        } else {
            self.push(Check::Optional, None)
        }
    }

    fn length_bounds(self, min: Option<usize>, max: Option<usize>) -> Self {
        let builder = match min {
            Some(value) => self.push(Check::MinLength { value }, Some(min_length_message(value))),
            None => self,
        };
        match max {
            Some(value) => builder.push(Check::MaxLength { value }, Some(max_length_message(value))),
            None => builder,
        }
    }

    fn build(self) -> ValidationRule {
        self.rule
    }
}

fn min_length_message(value: usize) -> String {
    format!("Must be at least {} characters", value)
}

fn max_length_message(value: usize) -> String {
    format!("Must be at most {} characters", value)
}

/// Zero lengths count as unset.
fn length(value: Option<usize>) -> Option<usize> {
    value.filter(|len| *len > 0)
}

/// Derives the validation rule for a single field.
pub fn derive(field: &FieldDefinition) -> ValidationRule {
    match field.kind {
        FieldType::Number => {
            let builder = RuleBuilder::new(BaseType::Number);
            let builder = if field.required {
                builder.push(
                    Check::Min {
                        value: field.min.unwrap_or(0.0),
                    },
                    Some(REQUIRED_MESSAGE.into()),
                )
            } else {
                builder.push(Check::Optional, None)
            };
            match field.max {
                Some(max) => builder.push(
                    Check::Max { value: max },
                    Some(format!(
                        "Value must be less than or equal to {}",
                        format_number(max)
                    )),
                ),
                None => builder,
            }
            .build()
        }
        FieldType::CheckboxGroup => RuleBuilder::new(BaseType::StringArray)
            .push_if(
                field.required,
                Check::MinLength { value: 1 },
                Some(REQUIRED_MESSAGE.into()),
            )
            .build(),
        FieldType::Checkbox => RuleBuilder::new(BaseType::Boolean)
            .push_if(
                field.required,
                Check::MustBeTrue,
                Some(REQUIRED_MESSAGE.into()),
            )
            .build(),
        FieldType::Date => RuleBuilder::new(BaseType::String)
            .presence(field.required)
            .build(),
        FieldType::Text | FieldType::Textarea => {
            let builder = match Pattern::for_value_type(field.value_type) {
                Some(pattern) => RuleBuilder::new(BaseType::String)
                    .push(Check::Pattern { pattern }, Some(pattern.message().into())),
                None => RuleBuilder::new(BaseType::String),
            };
            builder
                .length_bounds(length(field.min_length), length(field.max_length))
                .presence(field.required)
                .build()
        }
        FieldType::Password => {
            let extra_min = length(field.min_length).filter(|len| *len > PASSWORD_MIN_LENGTH);
            RuleBuilder::new(BaseType::String)
                .push(
                    Check::MinLength {
                        value: PASSWORD_MIN_LENGTH,
                    },
                    Some(format!(
                        "Password must be at least {} characters",
                        PASSWORD_MIN_LENGTH
                    )),
                )
                .length_bounds(extra_min, length(field.max_length))
                .presence(field.required)
                .build()
        }
        FieldType::File => {
            if field.required {
                RuleBuilder::new(BaseType::Binary)
                    .base_message(REQUIRED_MESSAGE)
                    .build()
            } else {
                RuleBuilder::new(BaseType::Binary)
                    .push(Check::Optional, None)
                    .build()
            }
        }
        FieldType::Select | FieldType::Radio => RuleBuilder::new(BaseType::String)
            .presence(field.required)
            .build(),
    }
}

/// One `name -> rule` entry of a form schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaEntry {
    pub name: String,
    pub rule: ValidationRule,
}

/// Rules for every field of a form, in field order.
///
/// Lookups by name resolve to the last entry carrying that name, matching how
/// the emitted object literal behaves when two fields collide.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FormSchema {
    pub entries: Vec<SchemaEntry>,
}

impl FormSchema {
    pub fn get(&self, name: &str) -> Option<&ValidationRule> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.rule)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derives the schema for a whole form.
pub fn derive_schema(form: &FormDefinition) -> FormSchema {
    FormSchema {
        entries: form
            .fields
            .iter()
            .map(|field| SchemaEntry {
                name: field.name.clone(),
                rule: derive(field),
            })
            .collect(),
    }
}

/// Prints a number the way the target language prints numeric literals:
/// plain decimals inside `[1e-6, 1e21)`, exponent form with an explicit sign
/// outside it.
pub(crate) fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }
    if !value.is_finite() {
        return match value {
            v if v.is_nan() => "NaN".into(),
            v if v > 0.0 => "Infinity".into(),
            _ => "-Infinity".into(),
        };
    }
    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }
    let exponent_form = format!("{:e}", value);
    match exponent_form.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => exponent_form,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_drops_trailing_zero_fraction() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-12.5), "-12.5");
    }

    #[test]
    fn format_number_switches_to_exponent_form_at_the_edges() {
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-9), "1.5e-9");
    }
}
