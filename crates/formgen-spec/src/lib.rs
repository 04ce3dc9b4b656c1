#![allow(missing_docs)]

pub mod editor;
pub mod emit;
pub mod interchange;
pub mod rules;
pub mod spec;
pub mod validate;

pub use editor::{EditError, FormState};
pub use emit::{EMPTY_MESSAGE, Emission, EmitError, Renderer, emit};
pub use interchange::{
    ImportError, ImportedForm, InterchangeDoc, from_interchange, parse_document, to_interchange,
};
pub use rules::{
    BaseType, Check, Constraint, FormSchema, Pattern, SchemaEntry, ValidationRule, derive,
    derive_schema,
};
pub use spec::{
    DefinitionIssue, FieldDefinition, FieldId, FieldOption, FieldType, FormDefinition,
    FormLayout, IdAllocator, ValueType,
};
pub use validate::{ValidationError, ValidationResult};

/// JSON Schema describing a form definition file.
pub fn definition_schema() -> serde_json::Value {
    schemars::schema_for!(FormDefinition).to_value()
}
