pub mod field;
pub mod form;

pub use field::{
    DEFAULT_TEXTAREA_ROWS, FieldDefinition, FieldId, FieldOption, FieldType, IdAllocator,
    ValueType, element_id, is_identifier_safe,
};
pub use form::{DEFAULT_FORM_NAME, DefinitionIssue, FormDefinition, FormLayout, field_issues};
