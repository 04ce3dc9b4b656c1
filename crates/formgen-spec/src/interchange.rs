use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::spec::{
    FieldDefinition, FieldOption, FieldType, FormDefinition, IdAllocator, ValueType, element_id,
};

pub const PROJECT_ID: u64 = 10001;
pub const PROJECT_NAME: &str = "Dynamic Form Builder";
pub const FORM_ID: u64 = 1;

/// Structural failures; anything else in a document degrades to defaults.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document has no FormFields array of objects")]
    MissingFieldList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Project {
    #[serde(default = "default_project_id", deserialize_with = "lenient")]
    pub id: u64,
    #[serde(default = "default_project_name", deserialize_with = "lenient")]
    pub name: String,
}

fn default_project_id() -> u64 {
    PROJECT_ID
}

fn default_project_name() -> String {
    PROJECT_NAME.into()
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: PROJECT_ID,
            name: PROJECT_NAME.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FormHeader {
    #[serde(default)]
    pub form_id: Value,
    #[serde(default)]
    pub form_name: Value,
}

/// Type description of one exported field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FieldTypeSpec {
    #[serde(rename = "Type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub default_values: Vec<Value>,
    #[serde(default)]
    pub max_length: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub value_type: String,
    #[serde(default)]
    pub required: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct InterchangeField {
    #[serde(default)]
    pub field_id: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub field_caption: String,
    #[serde(default, deserialize_with = "lenient")]
    pub field_name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub field_type: FieldTypeSpec,
}

/// The external field-description document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InterchangeDoc {
    #[serde(default, deserialize_with = "lenient")]
    pub project: Project,
    #[serde(rename = "Form", default, deserialize_with = "lenient")]
    pub form: FormHeader,
    #[serde(rename = "FormFields")]
    pub form_fields: Vec<InterchangeField>,
}

/// Accepts any JSON for a member and falls back to its default when the
/// value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        tracing::debug!(%err, "ignoring malformed interchange member");
        T::default()
    }))
}

impl InterchangeDoc {
    pub fn from_value(value: Value) -> Result<Self, ImportError> {
        let Value::Object(mut root) = value else {
            return Err(ImportError::MissingFieldList);
        };
        let items = match root.remove("FormFields") {
            Some(Value::Array(items)) if items.iter().all(Value::is_object) => items,
            _ => return Err(ImportError::MissingFieldList),
        };

        let form_fields = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item).unwrap_or_else(|err| {
                    tracing::debug!(index, %err, "field entry unreadable, using defaults");
                    InterchangeField::default()
                })
            })
            .collect();

        let project = root
            .remove("project")
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        let form = root
            .remove("Form")
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();

        Ok(Self {
            project,
            form,
            form_fields,
        })
    }

    /// Form name carried by the document, when it is a non-empty string.
    pub fn form_name(&self) -> Option<&str> {
        self.form.form_name.as_str().filter(|name| !name.is_empty())
    }
}

pub fn parse_document(json: &str) -> Result<InterchangeDoc, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    InterchangeDoc::from_value(value)
}

pub fn to_interchange(form: &FormDefinition) -> InterchangeDoc {
    InterchangeDoc {
        project: Project::default(),
        form: FormHeader {
            form_id: json!(FORM_ID),
            form_name: Value::String(form.name.clone()),
        },
        form_fields: form
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| export_field(index + 1, field))
            .collect(),
    }
}

fn export_field(position: usize, field: &FieldDefinition) -> InterchangeField {
    let (kind, value_type, default_values) = match field.kind {
        FieldType::Text => {
            let code = match field.value_type {
                Some(ValueType::Number) => "NUMBERONLY",
                Some(ValueType::Text) => "TEXTONLY",
                Some(ValueType::Alphanumeric) => "TEXTWITHNUMBER",
                _ => "",
            };
            ("text", code, Vec::new())
        }
        FieldType::Textarea => ("text", "TEXTONLY", Vec::new()),
        FieldType::Select | FieldType::Radio => ("DropDown", "", option_values(field)),
        FieldType::CheckboxGroup => ("MultiCheck", "", option_values(field)),
        FieldType::Date if field.has_value_type(ValueType::Datetime) => {
            ("DATETIME", "DATEANDTIME", Vec::new())
        }
        FieldType::Date => ("DATE", "", Vec::new()),
        FieldType::File => ("FILE", "", Vec::new()),
        FieldType::Checkbox | FieldType::Password | FieldType::Number => {
            tracing::debug!(
                name = %field.name,
                kind = %field.kind,
                "no interchange type, exporting as text"
            );
            ("text", "", Vec::new())
        }
    };

    InterchangeField {
        field_id: Value::String(position.to_string()),
        field_caption: field.label.clone(),
        field_name: field.name.clone(),
        field_type: FieldTypeSpec {
            kind: Some(kind.into()),
            default_values,
            max_length: Value::String(
                field
                    .max_length
                    .map(|len| len.to_string())
                    .unwrap_or_default(),
            ),
            value_type: value_type.into(),
            required: Value::String(if field.required { "YES" } else { "NO" }.into()),
        },
    }
}

fn option_values(field: &FieldDefinition) -> Vec<Value> {
    field
        .options()
        .iter()
        .map(|option| json!({ "label": option.label, "value": option.value }))
        .collect()
}

/// Fields recovered from an interchange document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedForm {
    pub name: Option<String>,
    pub fields: Vec<FieldDefinition>,
    pub next_id: IdAllocator,
}

impl ImportedForm {
    /// Replaces the fields of `current`, keeping its layout and, when the
    /// document carries none, its name.
    pub fn apply_to(self, current: &FormDefinition) -> FormDefinition {
        FormDefinition {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            layout: current.layout,
            fields: self.fields,
        }
    }
}

pub fn from_interchange(doc: &InterchangeDoc) -> ImportedForm {
    let fields: Vec<FieldDefinition> = doc
        .form_fields
        .iter()
        .enumerate()
        .map(|(index, field)| import_field(index as u64 + 1, field))
        .collect();

    ImportedForm {
        name: doc.form_name().map(str::to_string),
        next_id: IdAllocator::starting_at(fields.len() as u64 + 1),
        fields,
    }
}

fn import_field(seq: u64, source: &InterchangeField) -> FieldDefinition {
    let spec = &source.field_type;
    let kind = import_type(spec.kind.as_deref());

    let mut field = FieldDefinition::new(
        element_id(seq),
        kind,
        source.field_caption.clone(),
        source.field_name.clone(),
    );
    field.required = match &spec.required {
        Value::Bool(flag) => *flag,
        Value::String(text) => text == "YES",
        _ => false,
    };
    if kind.is_text_like() {
        field.placeholder = Some(format!("Enter {}...", source.field_caption));
    }
    field.max_length = parse_max_length(&spec.max_length);
    if spec.default_values.first().is_some_and(Value::is_object) {
        field.options = Some(
            spec.default_values
                .iter()
                .filter_map(|value| import_option(&field.name, value))
                .collect(),
        );
    } else if !spec.default_values.is_empty() {
        tracing::debug!(name = %field.name, "default values are not objects, options left unset");
    }
    field.value_type = import_value_type(&spec.value_type);
    field
}

/// Reads an option object, accepting numbers and booleans for `label` and
/// `value` as their JSON text.
fn import_option(field: &str, value: &Value) -> Option<FieldOption> {
    let member = |key: &str| match value.get(key) {
        Some(Value::String(text)) => Some(text.clone()),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Some(scalar.to_string()),
        _ => None,
    };
    match (member("label"), member("value")) {
        (Some(label), Some(value)) => Some(FieldOption::new(label, value)),
        _ => {
            tracing::debug!(field, option = %value, "unreadable option dropped");
            None
        }
    }
}

fn import_type(code: Option<&str>) -> FieldType {
    match code.map(str::to_lowercase).as_deref() {
        Some("text") => FieldType::Text,
        Some("dropdown") => FieldType::Select,
        Some("datetime") => FieldType::Date,
        Some("multicheck") => FieldType::CheckboxGroup,
        other => {
            tracing::debug!(code = ?other, "unmapped interchange type, importing as text");
            FieldType::Text
        }
    }
}

fn import_value_type(code: &str) -> Option<ValueType> {
    match code {
        "NUMBERONLY" => Some(ValueType::Number),
        "TEXTONLY" => Some(ValueType::Text),
        "TEXTWITHNUMBER" => Some(ValueType::Alphanumeric),
        "DATEANDTIME" => Some(ValueType::Datetime),
        "" => None,
        other => {
            tracing::debug!(code = other, "unknown value type code ignored");
            None
        }
    }
}

/// Reads a max length from a JSON number or from the leading digits of a
/// string; blank, zero and negative values leave it unset.
fn parse_max_length(value: &Value) -> Option<usize> {
    let parsed = match value {
        Value::Null => return None,
        Value::String(text) if text.is_empty() => return None,
        Value::Number(number) => number
            .as_f64()
            .filter(|number| number.is_finite() && *number >= 0.0)
            .map(|number| number.trunc() as usize),
        Value::String(text) => leading_integer(text),
        _ => None,
    };
    if parsed.is_none() {
        tracing::debug!(%value, "unparsable MaxLength ignored");
    }
    parsed.filter(|len| *len > 0)
}

fn leading_integer(text: &str) -> Option<usize> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let end = text
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}
