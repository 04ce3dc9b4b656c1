use formgen_spec::spec::{DefinitionIssue, FieldOption, FieldType, FormLayout};
use formgen_spec::{EditError, FormState, ImportError, Renderer, emit::emit_with};

fn names(state: &FormState) -> Vec<&str> {
    state
        .form()
        .fields
        .iter()
        .map(|field| field.name.as_str())
        .collect()
}

fn three_fields() -> FormState {
    let (state, _) = FormState::new().add_field(FieldType::Text);
    let (state, _) = state.add_field(FieldType::Select);
    let (state, _) = state.add_field(FieldType::CheckboxGroup);
    state
}

#[test]
fn added_fields_get_sequential_ids_and_defaults() {
    let state = FormState::new();
    assert_eq!(state.form().name, "My Form");

    let (state, first) = state.add_field(FieldType::Text);
    let (state, second) = state.add_field(FieldType::CheckboxGroup);
    assert_eq!(first, "element-1");
    assert_eq!(second, "element-2");
    assert_eq!(names(&state), ["text1", "checkboxGroup2"]);
    assert_eq!(state.ids().peek(), 3);

    let group = state.form().field(&second).expect("group field");
    assert_eq!(group.label, "Checkbox-group Label");
    assert_eq!(group.options().len(), 2);
    assert!(state.form().check().is_empty());
}

#[test]
fn add_skips_sequence_numbers_whose_name_is_taken() {
    let (state, id) = FormState::new().add_field(FieldType::Text);
    let mut field = state.form().field(&id).cloned().expect("field");
    field.name = "text2".into();
    let state = state.update_field(field).expect("rename");

    let (state, id) = state.add_field(FieldType::Text);
    assert_eq!(id, "element-3");
    assert_eq!(names(&state), ["text2", "text3"]);
}

#[test]
fn update_replaces_by_identity() {
    let state = three_fields();
    let mut select = state.form().fields[1].clone();
    select.label = "Country".into();
    select.required = true;

    let state = state.update_field(select).expect("update");
    let updated = &state.form().fields[1];
    assert_eq!(updated.id, "element-2");
    assert_eq!(updated.label, "Country");
    assert!(updated.required);
    assert_eq!(state.form().fields.len(), 3);
}

#[test]
fn update_rejects_broken_invariants() {
    let state = three_fields();

    let mut clash = state.form().fields[0].clone();
    clash.name = "select2".into();
    assert_eq!(
        state.clone().update_field(clash),
        Err(EditError::Definition(DefinitionIssue::DuplicateName {
            name: "select2".into()
        }))
    );

    let mut invalid = state.form().fields[0].clone();
    invalid.name = "first-name".into();
    assert!(matches!(
        state.clone().update_field(invalid),
        Err(EditError::Definition(DefinitionIssue::InvalidName { .. }))
    ));

    let mut bounds = state.form().fields[0].clone();
    bounds.min_length = Some(10);
    bounds.max_length = Some(5);
    assert!(matches!(
        state.clone().update_field(bounds),
        Err(EditError::Definition(DefinitionIssue::LengthBounds { .. }))
    ));

    let mut stranger = state.form().fields[0].clone();
    stranger.id = "element-99".into();
    assert_eq!(
        state.update_field(stranger),
        Err(EditError::UnknownField("element-99".into()))
    );
}

#[test]
fn move_splices_like_a_drag() {
    let state = three_fields().move_field(0, 2).expect("move");
    assert_eq!(names(&state), ["select2", "checkboxGroup3", "text1"]);

    let state = state.move_field(2, 0).expect("move back");
    assert_eq!(names(&state), ["text1", "select2", "checkboxGroup3"]);

    assert_eq!(
        state.move_field(1, 3),
        Err(EditError::MoveOutOfRange {
            from: 1,
            to: 3,
            len: 3
        })
    );
}

#[test]
fn remove_and_clear_keep_the_counter() {
    let state = three_fields().remove_field("element-2").expect("remove");
    assert_eq!(names(&state), ["text1", "checkboxGroup3"]);
    assert!(matches!(
        state.clone().remove_field("element-2"),
        Err(EditError::UnknownField(_))
    ));

    let state = state.clear();
    assert!(state.form().fields.is_empty());
    let (_, id) = state.add_field(FieldType::Date);
    assert_eq!(id, "element-4");
}

#[test]
fn options_are_edited_through_the_field() {
    let state = three_fields();
    let state = state
        .add_option("element-2", FieldOption::new("Option 3", "option3"))
        .expect("add option");
    assert_eq!(state.form().fields[1].options().len(), 3);

    assert_eq!(
        state
            .clone()
            .add_option("element-2", FieldOption::new("", "blank")),
        Err(EditError::EmptyOption)
    );
    assert!(matches!(
        state
            .clone()
            .add_option("element-2", FieldOption::new("Again", "option1")),
        Err(EditError::Definition(
            DefinitionIssue::DuplicateOptionValue { .. }
        ))
    ));
    assert!(matches!(
        state
            .clone()
            .add_option("element-1", FieldOption::new("Nope", "nope")),
        Err(EditError::Definition(DefinitionIssue::UnexpectedOptions { .. }))
    ));

    let state = state.remove_option("element-2", 0).expect("remove option");
    let values: Vec<&str> = state.form().fields[1]
        .options()
        .iter()
        .map(|option| option.value.as_str())
        .collect();
    assert_eq!(values, ["option2", "option3"]);
    assert!(matches!(
        state.remove_option("element-2", 5),
        Err(EditError::UnknownOption { index: 5, .. })
    ));
}

#[test]
fn name_and_layout_edits() {
    let state = FormState::new().set_layout(FormLayout::TwoColumns);
    assert_eq!(state.form().layout, FormLayout::TwoColumns);

    let state = state.set_name("Event Signup").expect("rename");
    assert_eq!(state.form().name, "Event Signup");
    assert_eq!(
        state.set_name("   "),
        Err(EditError::Definition(DefinitionIssue::EmptyFormName))
    );
}

#[test]
fn import_replaces_fields_and_keeps_layout() {
    let state = three_fields().set_layout(FormLayout::TwoColumns);
    let state = state
        .import_json(include_str!("../tests/fixtures/canonical_doc.json"))
        .expect("import");

    assert_eq!(state.form().name, "Customer Intake");
    assert_eq!(state.form().layout, FormLayout::TwoColumns);
    assert_eq!(
        names(&state),
        ["customerName", "region", "channels", "visit"]
    );
    let (state, id) = state.add_field(FieldType::Text);
    assert_eq!(id, "element-5");

    let form = state.into_form();
    assert_eq!(form.fields.len(), 5);
    assert_eq!(form.fields[4].name, "text5");
}

#[test]
fn import_without_form_name_keeps_current_name() {
    let state = FormState::new().set_name("Keep Me").expect("rename");
    let state = state
        .import_json(r#"{"FormFields":[{"FieldCaption":"A","FieldName":"a"}]}"#)
        .expect("import");
    assert_eq!(state.form().name, "Keep Me");
    assert_eq!(names(&state), ["a"]);
}

#[test]
fn failed_import_leaves_state_untouched() {
    let state = three_fields();
    let result = state.import_json(r#"{"Form":{"FormName":"Other"}}"#);
    assert!(matches!(result, Err(ImportError::MissingFieldList)));
    assert_eq!(state.form().fields.len(), 3);
    assert_eq!(state.form().name, "My Form");
}

#[test]
fn snapshots_feed_the_emitter() {
    let renderer = Renderer::new().expect("renderer");
    let state = three_fields();
    let before = emit_with(&renderer, state.form()).expect("emit");
    let state = state.remove_field("element-3").expect("remove");
    let after = emit_with(&renderer, state.form()).expect("emit");

    assert!(before.to_string().contains("checkboxGroup3"));
    assert!(!after.to_string().contains("checkboxGroup3"));
}
