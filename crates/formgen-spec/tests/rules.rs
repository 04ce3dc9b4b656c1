use formgen_spec::spec::{FieldDefinition, FieldType, FormDefinition, ValueType};
use formgen_spec::{BaseType, Check, Pattern, derive, derive_schema};

fn field(kind: FieldType, name: &str) -> FieldDefinition {
    FieldDefinition::new("element-1", kind, "Label", name)
}

fn checks(field: &FieldDefinition) -> Vec<Check> {
    derive(field).checks().cloned().collect()
}

fn messages(field: &FieldDefinition) -> Vec<Option<String>> {
    derive(field)
        .constraints
        .into_iter()
        .map(|constraint| constraint.message)
        .collect()
}

#[test]
fn required_text_orders_bounds_before_presence() {
    let mut full_name = field(FieldType::Text, "fullName");
    full_name.required = true;
    full_name.min_length = Some(2);
    full_name.max_length = Some(50);

    let rule = derive(&full_name);
    assert_eq!(rule.base, BaseType::String);
    assert_eq!(
        checks(&full_name),
        vec![
            Check::MinLength { value: 2 },
            Check::MaxLength { value: 50 },
            Check::MinLength { value: 1 },
        ]
    );
    assert_eq!(
        messages(&full_name),
        vec![
            Some("Must be at least 2 characters".to_string()),
            Some("Must be at most 50 characters".to_string()),
            Some("Required".to_string()),
        ]
    );
}

#[test]
fn optional_text_with_value_type_leads_with_pattern() {
    let mut postal = field(FieldType::Text, "postalCode");
    postal.value_type = Some(ValueType::Number);
    assert_eq!(
        checks(&postal),
        vec![
            Check::Pattern {
                pattern: Pattern::DigitsOnly
            },
            Check::Optional,
        ]
    );

    let mut code = field(FieldType::Textarea, "code");
    code.value_type = Some(ValueType::Alphanumeric);
    code.max_length = Some(10);
    assert_eq!(
        messages(&code)[0].as_deref(),
        Some("Must contain only letters, numbers, and spaces")
    );
    assert_eq!(checks(&code)[1], Check::MaxLength { value: 10 });
}

#[test]
fn zero_lengths_are_treated_as_unset() {
    let mut text = field(FieldType::Text, "nickname");
    text.min_length = Some(0);
    text.max_length = Some(0);
    assert_eq!(checks(&text), vec![Check::Optional]);
}

#[test]
fn password_always_enforces_eight_characters() {
    let password = field(FieldType::Password, "password");
    assert_eq!(
        checks(&password),
        vec![Check::MinLength { value: 8 }, Check::Optional]
    );
    assert_eq!(
        messages(&password)[0].as_deref(),
        Some("Password must be at least 8 characters")
    );

    let mut short = field(FieldType::Password, "pin");
    short.min_length = Some(5);
    short.required = true;
    assert_eq!(
        checks(&short),
        vec![Check::MinLength { value: 8 }, Check::MinLength { value: 1 }]
    );

    let mut long = field(FieldType::Password, "secret");
    long.min_length = Some(12);
    long.max_length = Some(64);
    long.value_type = Some(ValueType::Number);
    assert_eq!(
        checks(&long),
        vec![
            Check::MinLength { value: 8 },
            Check::MinLength { value: 12 },
            Check::MaxLength { value: 64 },
            Check::Optional,
        ]
    );
}

#[test]
fn required_number_without_min_requires_zero() {
    let mut quantity = field(FieldType::Number, "quantity");
    quantity.required = true;
    let rule = derive(&quantity);
    assert_eq!(rule.base, BaseType::Number);
    assert_eq!(checks(&quantity), vec![Check::Min { value: 0.0 }]);
    assert_eq!(messages(&quantity), vec![Some("Required".to_string())]);

    quantity.min = Some(3.0);
    quantity.max = Some(9.5);
    assert_eq!(
        checks(&quantity),
        vec![Check::Min { value: 3.0 }, Check::Max { value: 9.5 }]
    );
    assert_eq!(
        messages(&quantity)[1].as_deref(),
        Some("Value must be less than or equal to 9.5")
    );
}

#[test]
fn optional_number_only_keeps_max() {
    let mut score = field(FieldType::Number, "score");
    score.min = Some(1.0);
    score.max = Some(10.0);
    assert_eq!(
        checks(&score),
        vec![Check::Optional, Check::Max { value: 10.0 }]
    );
}

#[test]
fn boolean_and_array_fields_only_constrain_when_required() {
    let mut terms = field(FieldType::Checkbox, "terms");
    assert_eq!(derive(&terms).base, BaseType::Boolean);
    assert!(checks(&terms).is_empty());
    terms.required = true;
    assert_eq!(checks(&terms), vec![Check::MustBeTrue]);

    let mut interests = field(FieldType::CheckboxGroup, "interests");
    assert_eq!(derive(&interests).base, BaseType::StringArray);
    assert!(checks(&interests).is_empty());
    interests.required = true;
    assert_eq!(checks(&interests), vec![Check::MinLength { value: 1 }]);
}

#[test]
fn choice_and_date_fields_use_presence_only() {
    for kind in [FieldType::Select, FieldType::Radio, FieldType::Date] {
        let mut choice = field(kind, "choice");
        choice.disable_past_dates = true;
        assert_eq!(checks(&choice), vec![Check::Optional], "{kind}");
        choice.required = true;
        assert_eq!(checks(&choice), vec![Check::MinLength { value: 1 }], "{kind}");
    }
}

#[test]
fn file_rules_carry_message_on_base_when_required() {
    let mut avatar = field(FieldType::File, "avatar");
    let optional = derive(&avatar);
    assert_eq!(optional.base, BaseType::Binary);
    assert_eq!(optional.base_message, None);
    assert_eq!(checks(&avatar), vec![Check::Optional]);

    avatar.required = true;
    let required = derive(&avatar);
    assert_eq!(required.base_message.as_deref(), Some("Required"));
    assert!(required.constraints.is_empty());
}

#[test]
fn schema_follows_field_order_and_last_name_wins() {
    let mut first = FieldDefinition::new("element-1", FieldType::Text, "Email", "email");
    first.required = true;
    let second = FieldDefinition::new("element-2", FieldType::Checkbox, "Email", "email");
    let third = FieldDefinition::new("element-3", FieldType::Number, "Age", "age");
    let form = FormDefinition::default().with_fields(vec![first, second, third]);

    let schema = derive_schema(&form);
    assert_eq!(schema.len(), 3);
    assert_eq!(schema.names().collect::<Vec<_>>(), ["email", "email", "age"]);
    assert_eq!(
        schema.get("email").map(|rule| rule.base),
        Some(BaseType::Boolean)
    );
    assert!(schema.get("missing").is_none());
    assert!(!form.names_are_unique());
}

#[test]
fn rules_serialize_with_kind_tags() {
    let mut full_name = field(FieldType::Text, "fullName");
    full_name.required = true;
    let value = serde_json::to_value(derive(&full_name)).expect("serialize rule");
    assert_eq!(value["base"], "string");
    assert_eq!(value["constraints"][0]["check"]["kind"], "min-length");
    assert_eq!(value["constraints"][0]["check"]["value"], 1);
    assert_eq!(value["constraints"][0]["message"], "Required");
}
