use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::field::{FieldDefinition, FieldId, FieldType, is_identifier_safe};

/// Name given to a fresh form.
pub const DEFAULT_FORM_NAME: &str = "My Form";

/// Container arrangement of the rendered fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FormLayout {
    #[default]
    OneColumn,
    TwoColumns,
}

impl FormLayout {
    /// Class of the element wrapping the field blocks.
    pub fn container_class(&self) -> &'static str {
        match self {
            FormLayout::OneColumn => "space-y-6",
            FormLayout::TwoColumns => "grid grid-cols-1 md:grid-cols-2 gap-6",
        }
    }
}

/// Top-level form definition: field order is render and tab order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDefinition {
    pub name: String,
    #[serde(default)]
    pub layout: FormLayout,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl Default for FormDefinition {
    fn default() -> Self {
        Self::new(DEFAULT_FORM_NAME)
    }
}

impl FormDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout: FormLayout::default(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_layout(mut self, layout: FormLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.id == id)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    pub fn contains_type(&self, kind: FieldType) -> bool {
        self.fields.iter().any(|field| field.kind == kind)
    }

    /// Reports every structural invariant the form currently violates.
    pub fn check(&self) -> Vec<DefinitionIssue> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(DefinitionIssue::EmptyFormName);
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for field in &self.fields {
            if !ids.insert(field.id.as_str()) {
                issues.push(DefinitionIssue::DuplicateId {
                    id: field.id.clone(),
                });
            }
            if !field.name.is_empty() && !names.insert(field.name.as_str()) {
                issues.push(DefinitionIssue::DuplicateName {
                    name: field.name.clone(),
                });
            }
            issues.extend(field_issues(field));
        }
        issues
    }

    /// True when no two fields share a data key.
    pub fn names_are_unique(&self) -> bool {
        !self
            .check()
            .iter()
            .any(|issue| matches!(issue, DefinitionIssue::DuplicateName { .. }))
    }
}

/// Invariants checked on a single field in isolation.
pub fn field_issues(field: &FieldDefinition) -> Vec<DefinitionIssue> {
    let mut issues = Vec::new();
    if field.name.is_empty() {
        issues.push(DefinitionIssue::EmptyName {
            id: field.id.clone(),
        });
    } else if !is_identifier_safe(&field.name) {
        issues.push(DefinitionIssue::InvalidName {
            id: field.id.clone(),
            name: field.name.clone(),
        });
    }

    if let Some(options) = &field.options {
        if !field.kind.is_choice() && !options.is_empty() {
            issues.push(DefinitionIssue::UnexpectedOptions {
                id: field.id.clone(),
                kind: field.kind,
            });
        }
        let mut seen = HashSet::new();
        for option in options {
            if !seen.insert(option.value.as_str()) {
                issues.push(DefinitionIssue::DuplicateOptionValue {
                    id: field.id.clone(),
                    value: option.value.clone(),
                });
            }
        }
    }

    if let (Some(min), Some(max)) = (field.min_length, field.max_length)
        && min > max
    {
        issues.push(DefinitionIssue::LengthBounds {
            id: field.id.clone(),
            min,
            max,
        });
    }
    if let (Some(min), Some(max)) = (field.min, field.max)
        && min > max
    {
        issues.push(DefinitionIssue::NumericBounds {
            id: field.id.clone(),
            min,
            max,
        });
    }
    if field.rows == Some(0) {
        issues.push(DefinitionIssue::ZeroRows {
            id: field.id.clone(),
        });
    }
    issues
}

/// A violated form invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionIssue {
    #[error("form name cannot be empty")]
    EmptyFormName,
    #[error("field '{id}' has an empty name")]
    EmptyName { id: FieldId },
    #[error("field '{id}' name '{name}' is not a valid identifier")]
    InvalidName { id: FieldId, name: String },
    #[error("duplicate field id '{id}'")]
    DuplicateId { id: FieldId },
    #[error("duplicate field name '{name}'")]
    DuplicateName { name: String },
    #[error("field '{id}' of type {kind} cannot carry options")]
    UnexpectedOptions { id: FieldId, kind: FieldType },
    #[error("field '{id}' repeats option value '{value}'")]
    DuplicateOptionValue { id: FieldId, value: String },
    #[error("field '{id}' minLength {min} exceeds maxLength {max}")]
    LengthBounds { id: FieldId, min: usize, max: usize },
    #[error("field '{id}' min {min} exceeds max {max}")]
    NumericBounds { id: FieldId, min: f64, max: f64 },
    #[error("field '{id}' must have at least one row")]
    ZeroRows { id: FieldId },
}
