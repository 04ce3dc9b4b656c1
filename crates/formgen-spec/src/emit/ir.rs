//! Typed intermediate representation of a synthesized form component.
//!
//! Everything that decides what the generated code means lives here; the
//! renderer only prints these values.

use std::fmt;

use crate::rules::{BaseType, Check, Constraint, ValidationRule, derive, format_number};
use crate::spec::{FieldDefinition, FieldOption, FieldType, FormDefinition, ValueType};

/// Imports every generated component starts with.
pub const BASE_IMPORTS: [&str; 5] = [
    r#"import { Button } from "@/components/ui/button""#,
    r#"import { useForm } from "react-hook-form""#,
    r#"import { zodResolver } from "@hookform/resolvers/zod""#,
    r#"import * as z from "zod""#,
    r#"import { useState, useEffect } from "react""#,
];

/// UI primitive groups a component may need to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Input,
    PasswordInput,
    Textarea,
    Select,
    Checkbox,
    RadioGroup,
    Label,
    FormWrapper,
}

impl Primitive {
    pub fn import_line(&self) -> &'static str {
        match self {
            Primitive::Input => r#"import { Input } from "@/components/ui/input""#,
            Primitive::PasswordInput => {
                r#"import { PasswordInput } from "@/components/password-input""#
            }
            Primitive::Textarea => r#"import { Textarea } from "@/components/ui/textarea""#,
            Primitive::Select => {
                r#"import { Select, SelectContent, SelectItem, SelectTrigger, SelectValue } from "@/components/ui/select""#
            }
            Primitive::Checkbox => r#"import { Checkbox } from "@/components/ui/checkbox""#,
            Primitive::RadioGroup => {
                r#"import { RadioGroup, RadioGroupItem } from "@/components/ui/radio-group""#
            }
            Primitive::Label => r#"import { Label } from "@/components/ui/label""#,
            Primitive::FormWrapper => {
                r#"import { Form, FormField, FormItem, FormLabel, FormControl, FormDescription, FormMessage } from "@/components/ui/form""#
            }
        }
    }

    /// Control primitive a field type renders with, if any.
    pub fn for_field(kind: FieldType) -> Option<Primitive> {
        match kind {
            FieldType::Text | FieldType::Date | FieldType::File | FieldType::Number => {
                Some(Primitive::Input)
            }
            FieldType::Password => Some(Primitive::PasswordInput),
            FieldType::Textarea => Some(Primitive::Textarea),
            FieldType::Select => Some(Primitive::Select),
            FieldType::Checkbox | FieldType::CheckboxGroup => Some(Primitive::Checkbox),
            FieldType::Radio => Some(Primitive::RadioGroup),
        }
    }
}

/// Insertion-ordered set of primitives: first use decides position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    primitives: Vec<Primitive>,
}

impl ImportSet {
    pub fn for_fields(kinds: impl IntoIterator<Item = FieldType>) -> Self {
        let mut set = ImportSet::default();
        for kind in kinds {
            if let Some(primitive) = Primitive::for_field(kind) {
                set.insert(primitive);
            }
            set.insert(Primitive::Label);
            set.insert(Primitive::FormWrapper);
        }
        set
    }

    pub fn insert(&mut self, primitive: Primitive) -> bool {
        if self.contains(primitive) {
            return false;
        }
        self.primitives.push(primitive);
        true
    }

    pub fn contains(&self, primitive: Primitive) -> bool {
        self.primitives.contains(&primitive)
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Base imports followed by one line per primitive group.
    pub fn lines(&self) -> Vec<&'static str> {
        BASE_IMPORTS
            .iter()
            .copied()
            .chain(self.primitives.iter().map(Primitive::import_line))
            .collect()
    }
}

/// Head of a schema expression, before any chained method.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaHead {
    String,
    CoercedNumber,
    Boolean,
    StringArray,
    File { message: Option<String> },
}

/// One chained schema method call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainCall {
    pub method: &'static str,
    pub args: Vec<String>,
}

impl ChainCall {
    fn from_constraint(constraint: &Constraint) -> Self {
        let (method, mut args) = match &constraint.check {
            Check::MinLength { value } => ("min", vec![value.to_string()]),
            Check::MaxLength { value } => ("max", vec![value.to_string()]),
            Check::Min { value } => ("min", vec![format_number(*value)]),
            Check::Max { value } => ("max", vec![format_number(*value)]),
            Check::Pattern { pattern } => ("regex", vec![format!("/{}/", pattern.source())]),
            Check::MustBeTrue => ("refine", vec!["val => val === true".to_string()]),
            Check::Optional => ("optional", Vec::new()),
        };
        if let Some(message) = &constraint.message {
            args.push(message_object(message));
        }
        ChainCall { method, args }
    }
}

fn message_object(message: &str) -> String {
    format!("{{ message: '{}' }}", message)
}

/// A field's rule in the target schema library's method-chain form.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaExpr {
    pub head: SchemaHead,
    pub calls: Vec<ChainCall>,
}

impl SchemaExpr {
    pub fn from_rule(rule: &ValidationRule) -> Self {
        let head = match rule.base {
            BaseType::String => SchemaHead::String,
            BaseType::Number => SchemaHead::CoercedNumber,
            BaseType::Boolean => SchemaHead::Boolean,
            BaseType::StringArray => SchemaHead::StringArray,
            BaseType::Binary => SchemaHead::File {
                message: rule.base_message.clone(),
            },
        };
        SchemaExpr {
            head,
            calls: rule.constraints.iter().map(ChainCall::from_constraint).collect(),
        }
    }
}

impl fmt::Display for SchemaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.head {
            SchemaHead::String => f.write_str("z.string()")?,
            SchemaHead::CoercedNumber => f.write_str("z.coerce.number()")?,
            SchemaHead::Boolean => f.write_str("z.boolean()")?,
            SchemaHead::StringArray => f.write_str("z.array(z.string())")?,
            SchemaHead::File { message: None } => f.write_str("z.instanceof(File)")?,
            SchemaHead::File {
                message: Some(message),
            } => write!(f, "z.instanceof(File, {})", message_object(message))?,
        }
        for call in &self.calls {
            write!(f, ".{}({})", call.method, call.args.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    pub name: String,
    pub expr: SchemaExpr,
}

/// A JSX attribute emitted only when its property is set.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxAttribute {
    pub name: &'static str,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Quoted string literal.
    Literal(String),
    /// Braced expression.
    Expr(String),
}

impl JsxAttribute {
    fn literal(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: AttrValue::Literal(value.into()),
        }
    }

    fn expr(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: AttrValue::Expr(value.into()),
        }
    }
}

impl fmt::Display for JsxAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            AttrValue::Literal(value) => write!(f, "{}=\"{}\"", self.name, value),
            AttrValue::Expr(value) => write!(f, "{}={{{}}}", self.name, value),
        }
    }
}

const TODAY_EXPR: &str = "new Date().toISOString().split('T')[0]";

/// Type-specific body of a field block.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Input {
        placeholder: String,
        attributes: Vec<JsxAttribute>,
    },
    Password {
        placeholder: String,
        attributes: Vec<JsxAttribute>,
    },
    Number {
        placeholder: String,
        attributes: Vec<JsxAttribute>,
    },
    Textarea {
        placeholder: String,
        attributes: Vec<JsxAttribute>,
    },
    Select {
        options: Vec<FieldOption>,
    },
    Checkbox,
    CheckboxGroup {
        options: Vec<FieldOption>,
    },
    Radio {
        options: Vec<FieldOption>,
    },
    Date {
        attributes: Vec<JsxAttribute>,
    },
    File,
}

impl Control {
    pub fn for_field(field: &FieldDefinition) -> Self {
        let placeholder = field.placeholder.clone().unwrap_or_default();
        match field.kind {
            FieldType::Text => {
                let mut attributes = Vec::new();
                if field.has_value_type(ValueType::Number) {
                    attributes.push(JsxAttribute::literal("type", "number"));
                }
                attributes.extend(length_attributes(field));
                Control::Input {
                    placeholder,
                    attributes,
                }
            }
            FieldType::Password => Control::Password {
                placeholder,
                attributes: length_attributes(field),
            },
            FieldType::Number => {
                let bounds = [("min", field.min), ("max", field.max), ("step", field.step)];
                let attributes = bounds
                    .into_iter()
                    .filter_map(|(name, value)| {
                        value.map(|value| JsxAttribute::expr(name, format_number(value)))
                    })
                    .collect();
                Control::Number {
                    placeholder,
                    attributes,
                }
            }
            FieldType::Textarea => {
                let mut attributes = vec![JsxAttribute::expr(
                    "rows",
                    field.rows_or_default().to_string(),
                )];
                attributes.extend(length_attributes(field));
                Control::Textarea {
                    placeholder,
                    attributes,
                }
            }
            FieldType::Select => Control::Select {
                options: field.options().to_vec(),
            },
            FieldType::Checkbox => Control::Checkbox,
            FieldType::CheckboxGroup => Control::CheckboxGroup {
                options: field.options().to_vec(),
            },
            FieldType::Radio => Control::Radio {
                options: field.options().to_vec(),
            },
            FieldType::Date => {
                let mut attributes = Vec::new();
                if field.disable_past_dates {
                    attributes.push(JsxAttribute::expr("min", TODAY_EXPR));
                }
                if field.disable_future_dates {
                    attributes.push(JsxAttribute::expr("max", TODAY_EXPR));
                }
                Control::Date { attributes }
            }
            FieldType::File => Control::File,
        }
    }

    /// Name of the template that prints this control.
    pub fn template_name(&self) -> &'static str {
        match self {
            Control::Input { .. } => "field_input",
            Control::Password { .. } => "field_password",
            Control::Number { .. } => "field_number",
            Control::Textarea { .. } => "field_textarea",
            Control::Select { .. } => "field_select",
            Control::Checkbox => "field_checkbox",
            Control::CheckboxGroup { .. } => "field_checkbox_group",
            Control::Radio { .. } => "field_radio",
            Control::Date { .. } => "field_date",
            Control::File => "field_file",
        }
    }

    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Control::Input { placeholder, .. }
            | Control::Password { placeholder, .. }
            | Control::Number { placeholder, .. }
            | Control::Textarea { placeholder, .. } => Some(placeholder.as_str()),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[JsxAttribute] {
        match self {
            Control::Input { attributes, .. }
            | Control::Password { attributes, .. }
            | Control::Number { attributes, .. }
            | Control::Textarea { attributes, .. }
            | Control::Date { attributes } => attributes.as_slice(),
            _ => &[],
        }
    }

    pub fn options(&self) -> &[FieldOption] {
        match self {
            Control::Select { options }
            | Control::CheckboxGroup { options }
            | Control::Radio { options } => options.as_slice(),
            _ => &[],
        }
    }
}

fn length_attributes(field: &FieldDefinition) -> Vec<JsxAttribute> {
    [
        ("minLength", field.min_length),
        ("maxLength", field.max_length),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        value
            .filter(|len| *len > 0)
            .map(|len| JsxAttribute::expr(name, len.to_string()))
    })
    .collect()
}

/// Presentation block for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBlock {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub control: Control,
}

impl FieldBlock {
    pub fn for_field(field: &FieldDefinition) -> Self {
        Self {
            name: field.name.clone(),
            label: field.label.clone(),
            required: field.required,
            control: Control::for_field(field),
        }
    }

    pub fn required_marker(&self) -> &'static str {
        if self.required { " *" } else { "" }
    }
}

/// Initial value of a field in the generated form state.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    False,
    EmptyList,
    EmptyString,
    Undefined,
    Number(f64),
}

impl DefaultValue {
    pub fn for_field(field: &FieldDefinition) -> Self {
        match field.kind {
            FieldType::Checkbox => DefaultValue::False,
            FieldType::CheckboxGroup => DefaultValue::EmptyList,
            FieldType::Number if field.required => {
                DefaultValue::Number(field.min.unwrap_or(0.0))
            }
            FieldType::Number | FieldType::File => DefaultValue::Undefined,
            _ => DefaultValue::EmptyString,
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::False => f.write_str("false"),
            DefaultValue::EmptyList => f.write_str("[]"),
            DefaultValue::EmptyString => f.write_str("\"\""),
            DefaultValue::Undefined => f.write_str("undefined"),
            DefaultValue::Number(value) => f.write_str(&format_number(*value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultEntry {
    pub name: String,
    pub value: DefaultValue,
}

/// The whole component, ready to be printed.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentIr {
    pub component_name: String,
    pub title: String,
    pub imports: ImportSet,
    pub password_support: bool,
    pub file_preview_support: bool,
    pub schema: Vec<SchemaEntry>,
    pub fields: Vec<FieldBlock>,
    pub defaults: Vec<DefaultEntry>,
    pub container_class: &'static str,
}

impl ComponentIr {
    pub fn build(form: &FormDefinition) -> Self {
        let imports = ImportSet::for_fields(form.fields.iter().map(|field| field.kind));
        Self {
            component_name: component_name(&form.name),
            title: form.name.clone(),
            password_support: imports.contains(Primitive::PasswordInput),
            imports,
            file_preview_support: form.contains_type(FieldType::File),
            schema: form
                .fields
                .iter()
                .map(|field| SchemaEntry {
                    name: field.name.clone(),
                    expr: SchemaExpr::from_rule(&derive(field)),
                })
                .collect(),
            fields: form.fields.iter().map(FieldBlock::for_field).collect(),
            defaults: form
                .fields
                .iter()
                .map(|field| DefaultEntry {
                    name: field.name.clone(),
                    value: DefaultValue::for_field(field),
                })
                .collect(),
            container_class: form.layout.container_class(),
        }
    }
}

/// Form name with all whitespace removed; no other sanitization happens.
pub fn component_name(form_name: &str) -> String {
    form_name.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_set_keeps_first_use_order_without_duplicates() {
        let set = ImportSet::for_fields([
            FieldType::Date,
            FieldType::Password,
            FieldType::Text,
            FieldType::Checkbox,
            FieldType::CheckboxGroup,
        ]);
        assert_eq!(
            set.primitives(),
            &[
                Primitive::Input,
                Primitive::Label,
                Primitive::FormWrapper,
                Primitive::PasswordInput,
                Primitive::Checkbox,
            ]
        );
    }

    #[test]
    fn attributes_print_literal_and_expression_forms() {
        assert_eq!(
            JsxAttribute::literal("type", "number").to_string(),
            r#"type="number""#
        );
        assert_eq!(JsxAttribute::expr("rows", "3").to_string(), "rows={3}");
    }

    #[test]
    fn component_name_only_strips_whitespace() {
        assert_eq!(component_name("My  Sign-up\tForm"), "MySign-upForm");
    }
}
