//! Snapshot-based editing of a form definition.
//!
//! Every operation consumes the current [`FormState`] and returns the next
//! one, so a caller can keep older snapshots around for undo or diffing.

use thiserror::Error;

use crate::interchange::{self, ImportError, InterchangeDoc};
use crate::spec::{
    DefinitionIssue, FieldDefinition, FieldId, FieldOption, FieldType, FormDefinition,
    FormLayout, IdAllocator, element_id, field_issues,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("no field with id '{0}'")]
    UnknownField(FieldId),
    #[error("cannot move field from {from} to {to} in a form of {len} fields")]
    MoveOutOfRange { from: usize, to: usize, len: usize },
    #[error("option {index} does not exist on field '{id}'")]
    UnknownOption { id: FieldId, index: usize },
    #[error("option label and value must both be non-empty")]
    EmptyOption,
    #[error(transparent)]
    Definition(#[from] DefinitionIssue),
}

/// The form being edited together with its id allocator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    form: FormDefinition,
    ids: IdAllocator,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing form; the allocator resumes after the highest
    /// `element-N` id present.
    pub fn from_form(form: FormDefinition) -> Self {
        let highest = form
            .fields
            .iter()
            .filter_map(|field| field.id.strip_prefix("element-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            form,
            ids: IdAllocator::starting_at(highest + 1),
        }
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn into_form(self) -> FormDefinition {
        self.form
    }

    pub fn ids(&self) -> IdAllocator {
        self.ids
    }

    /// Appends a field of `kind` with its default attributes.
    pub fn add_field(self, kind: FieldType) -> (Self, FieldId) {
        let Self { mut form, mut ids } = self;
        let field = loop {
            let (seq, next) = ids.allocate();
            ids = next;
            let candidate = FieldDefinition::with_defaults(kind, seq);
            if form.field(&candidate.id).is_none() && !form.has_name(&candidate.name) {
                break candidate;
            }
            tracing::debug!(seq, "default id or name already taken, skipping");
        };
        let id = field.id.clone();
        form.fields.push(field);
        (Self { form, ids }, id)
    }

    /// Replaces the field carrying the same id.
    pub fn update_field(mut self, field: FieldDefinition) -> Result<Self, EditError> {
        let index = self
            .form
            .position(&field.id)
            .ok_or_else(|| EditError::UnknownField(field.id.clone()))?;

        if let Some(issue) = field_issues(&field).into_iter().next() {
            return Err(issue.into());
        }
        let collides = self
            .form
            .fields
            .iter()
            .any(|other| other.id != field.id && other.name == field.name);
        if collides {
            return Err(DefinitionIssue::DuplicateName { name: field.name }.into());
        }

        self.form.fields[index] = field;
        Ok(self)
    }

    pub fn remove_field(mut self, id: &str) -> Result<Self, EditError> {
        let index = self
            .form
            .position(id)
            .ok_or_else(|| EditError::UnknownField(id.to_string()))?;
        self.form.fields.remove(index);
        Ok(self)
    }

    /// Moves the field at `from` so that it ends up at index `to`.
    pub fn move_field(mut self, from: usize, to: usize) -> Result<Self, EditError> {
        let len = self.form.fields.len();
        if from >= len || to >= len {
            return Err(EditError::MoveOutOfRange { from, to, len });
        }
        let field = self.form.fields.remove(from);
        self.form.fields.insert(to, field);
        Ok(self)
    }

    pub fn set_layout(mut self, layout: FormLayout) -> Self {
        self.form.layout = layout;
        self
    }

    pub fn set_name(mut self, name: impl Into<String>) -> Result<Self, EditError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DefinitionIssue::EmptyFormName.into());
        }
        self.form.name = name;
        Ok(self)
    }

    pub fn add_option(self, id: &str, option: FieldOption) -> Result<Self, EditError> {
        if option.label.is_empty() || option.value.is_empty() {
            return Err(EditError::EmptyOption);
        }
        let mut field = self
            .form
            .field(id)
            .cloned()
            .ok_or_else(|| EditError::UnknownField(id.to_string()))?;
        field.options.get_or_insert_with(Vec::new).push(option);
        self.update_field(field)
    }

    pub fn remove_option(self, id: &str, index: usize) -> Result<Self, EditError> {
        let mut field = self
            .form
            .field(id)
            .cloned()
            .ok_or_else(|| EditError::UnknownField(id.to_string()))?;
        let options = field.options.get_or_insert_with(Vec::new);
        if index >= options.len() {
            return Err(EditError::UnknownOption {
                id: id.to_string(),
                index,
            });
        }
        options.remove(index);
        self.update_field(field)
    }

    /// Drops every field; name, layout and the id counter are kept.
    pub fn clear(mut self) -> Self {
        self.form.fields.clear();
        self
    }

    /// Replaces the fields with those of an interchange document.
    pub fn import(self, doc: &InterchangeDoc) -> Self {
        let imported = interchange::from_interchange(doc);
        let ids = imported.next_id;
        tracing::info!(
            fields = imported.fields.len(),
            next_id = %element_id(ids.peek()),
            "imported interchange document"
        );
        Self {
            form: imported.apply_to(&self.form),
            ids,
        }
    }

    /// Parses and imports a document. The current snapshot is only borrowed,
    /// so a failed import leaves it as it was.
    pub fn import_json(&self, json: &str) -> Result<Self, ImportError> {
        let doc = interchange::parse_document(json)?;
        Ok(self.clone().import(&doc))
    }
}
