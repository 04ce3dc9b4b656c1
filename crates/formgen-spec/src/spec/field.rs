use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Opaque field identifier (`element-N`), unique within a form.
pub type FieldId = String;

/// Rows used by textarea fields that do not set `rows`.
pub const DEFAULT_TEXTAREA_ROWS: u32 = 3;

/// Closed set of field kinds understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea,
    Select,
    Checkbox,
    CheckboxGroup,
    Radio,
    Date,
    File,
    Password,
    Number,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::CheckboxGroup,
        FieldType::Radio,
        FieldType::Date,
        FieldType::File,
        FieldType::Password,
        FieldType::Number,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::CheckboxGroup => "checkbox-group",
            FieldType::Radio => "radio",
            FieldType::Date => "date",
            FieldType::File => "file",
            FieldType::Password => "password",
            FieldType::Number => "number",
        }
    }

    /// Identifier-safe spelling used as the prefix of generated field names.
    pub fn identifier(&self) -> &'static str {
        match self {
            FieldType::CheckboxGroup => "checkboxGroup",
            other => other.as_str(),
        }
    }

    /// Choice fields carry an `options` list.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Radio | FieldType::CheckboxGroup
        )
    }

    /// Text-like fields get a placeholder when created.
    pub fn is_text_like(&self) -> bool {
        matches!(self, FieldType::Text | FieldType::Textarea)
    }

    fn default_label(&self) -> String {
        let raw = self.as_str();
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => format!("{}{} Label", first.to_ascii_uppercase(), chars.as_str()),
            None => "Label".into(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase();
        FieldType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| format!("unknown field type '{}'", value))
    }
}

/// Refines how text-like and date fields interpret their content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    /// Digits only.
    Number,
    Alphanumeric,
    Datetime,
    Password,
}

/// One entry of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A single form field and all of its optional constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_past_dates: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_future_dates: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl FieldDefinition {
    /// Bare field with every optional attribute unset.
    pub fn new(
        id: impl Into<FieldId>,
        kind: FieldType,
        label: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            name: name.into(),
            required: false,
            placeholder: None,
            options: None,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            step: None,
            rows: None,
            value_type: None,
            disable_past_dates: false,
            disable_future_dates: false,
        }
    }

    /// Field as created when the user picks a type; `seq` is the allocated number.
    pub fn with_defaults(kind: FieldType, seq: u64) -> Self {
        let mut field = Self::new(
            element_id(seq),
            kind,
            kind.default_label(),
            format!("{}{}", kind.identifier(), seq),
        );
        if kind.is_text_like() {
            field.placeholder = Some("Enter text here...".into());
        }
        if kind.is_choice() {
            field.options = Some(vec![
                FieldOption::new("Option 1", "option1"),
                FieldOption::new("Option 2", "option2"),
            ]);
        }
        field
    }

    /// Options as a slice; missing options behave like an empty list.
    pub fn options(&self) -> &[FieldOption] {
        self.options.as_deref().unwrap_or_default()
    }

    pub fn rows_or_default(&self) -> u32 {
        self.rows.unwrap_or(DEFAULT_TEXTAREA_ROWS)
    }

    pub fn has_value_type(&self, value_type: ValueType) -> bool {
        self.value_type == Some(value_type)
    }
}

/// Formats the stable id for the `seq`-th allocated field.
pub fn element_id(seq: u64) -> FieldId {
    format!("element-{}", seq)
}

/// Explicit counter handing out field sequence numbers.
///
/// The allocator is a plain value: every allocation returns the number and the
/// advanced allocator, so callers thread it through their own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// Sequence number the next allocation will return.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn allocate(self) -> (u64, IdAllocator) {
        (self.next, IdAllocator { next: self.next + 1 })
    }
}

/// Data keys must be usable as bare object keys in the emitted component.
pub fn is_identifier_safe(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
}
