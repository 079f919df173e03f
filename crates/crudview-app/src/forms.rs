// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{EditorKind, FieldValue, Record, RecordData, Template};

pub const DEFAULT_FIELD_INVALID_CLASS: &str = "x-field-invalid";
pub const DEFAULT_ERROR_MESSAGE_CLASS: &str = "x-field-error-msg";

/// One input bound to a record field by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    name: String,
    label: String,
    kind: EditorKind,
    value: FieldValue,
    default_value: FieldValue,
    classes: Vec<String>,
}

impl Editor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: EditorKind) -> Self {
        let default_value = kind.default_value();
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            value: default_value.clone(),
            default_value,
            classes: Vec::new(),
        }
    }

    /// Editor labelled with its own field name.
    pub fn for_field(name: impl Into<String>, kind: EditorKind) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, kind)
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.value = value.clone();
        self.default_value = value;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn set_value(&mut self, value: FieldValue) {
        self.value = value;
    }

    pub fn set_input(&mut self, raw: &str) {
        self.value = self.kind.parse_input(raw);
    }

    pub fn reset(&mut self) {
        self.value = self.default_value.clone();
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|existing| existing != class);
    }
}

/// Inline message placed directly after the editor it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    for_field: String,
    class: String,
    text: String,
    hidden: bool,
}

impl ErrorMessage {
    pub fn for_field(&self) -> &str {
        &self.for_field
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }
}

/// How error messages are built: the class they carry and the template that
/// receives `{field}` and `{message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessageStyle {
    pub class: String,
    pub template: Template,
}

impl Default for ErrorMessageStyle {
    fn default() -> Self {
        Self {
            class: DEFAULT_ERROR_MESSAGE_CLASS.to_owned(),
            template: Template::field("message"),
        }
    }
}

impl ErrorMessageStyle {
    fn render(&self, field: &str, message: &str) -> String {
        let data = RecordData::from([
            ("field".to_owned(), FieldValue::from(field)),
            ("message".to_owned(), FieldValue::from(message)),
        ]);
        self.template.apply(&data, None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fieldset {
    pub title: Option<String>,
    pub items: Vec<FormItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormItem {
    Editor(Editor),
    ErrorMessage(ErrorMessage),
    Fieldset(Fieldset),
}

/// Editable field set for adding or editing one record. `generated` marks
/// items produced from the schema; anything else is caller-owned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormSurface {
    items: Vec<FormItem>,
    generated: bool,
}

impl FormSurface {
    pub fn custom(items: Vec<FormItem>) -> Self {
        Self {
            items,
            generated: false,
        }
    }

    pub fn from_editors(editors: Vec<Editor>) -> Self {
        Self::custom(editors.into_iter().map(FormItem::Editor).collect())
    }

    pub fn items(&self) -> &[FormItem] {
        &self.items
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn needs_generation(&self) -> bool {
        self.items.is_empty() || self.generated
    }

    pub fn set_generated_items(&mut self, items: Vec<FormItem>) {
        self.items = items;
        self.generated = true;
    }

    pub fn clear_generated_marker(&mut self) {
        self.generated = false;
    }

    /// Editors in document order, descending into fieldsets.
    pub fn editors(&self) -> Vec<&Editor> {
        let mut editors = Vec::new();
        collect_editors(&self.items, &mut editors);
        editors
    }

    pub fn editor(&self, name: &str) -> Option<&Editor> {
        self.editors().into_iter().find(|editor| editor.name == name)
    }

    pub fn error_message(&self, field: &str) -> Option<&ErrorMessage> {
        find_error(&self.items, field)
    }

    pub fn visible_errors(&self) -> Vec<&ErrorMessage> {
        let mut messages = Vec::new();
        collect_errors(&self.items, &mut messages);
        messages.retain(|message| message.is_visible());
        messages
    }

    pub fn values(&self) -> RecordData {
        self.editors()
            .into_iter()
            .map(|editor| (editor.name.clone(), editor.value.clone()))
            .collect()
    }

    pub fn set_value(&mut self, name: &str, value: FieldValue) -> bool {
        match find_editor_mut(&mut self.items, name) {
            Some(editor) => {
                editor.set_value(value);
                true
            }
            None => false,
        }
    }

    pub fn set_input(&mut self, name: &str, raw: &str) -> bool {
        match find_editor_mut(&mut self.items, name) {
            Some(editor) => {
                editor.set_input(raw);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        visit_leaves_mut(&mut self.items, &mut |item| {
            if let FormItem::Editor(editor) = item {
                editor.reset();
            }
        });
    }

    /// Copies the record's values into matching editors; editors without a
    /// matching field keep their value.
    pub fn load(&mut self, data: &RecordData) {
        visit_leaves_mut(&mut self.items, &mut |item| {
            if let FormItem::Editor(editor) = item
                && let Some(value) = data.get(&editor.name)
            {
                editor.value = value.clone();
            }
        });
    }

    pub fn update_record<R: Record + ?Sized>(&self, record: &mut R) {
        for editor in self.editors() {
            record.set(&editor.name, editor.value.clone());
        }
    }

    /// Hides every error message and drops the invalid class from every editor.
    pub fn clear_errors(&mut self, invalid_class: &str) {
        visit_leaves_mut(&mut self.items, &mut |item| match item {
            FormItem::Editor(editor) => editor.remove_class(invalid_class),
            FormItem::ErrorMessage(message) => message.hidden = true,
            FormItem::Fieldset(_) => {}
        });
    }

    /// Flags the editor for `field` and shows `message` right after it,
    /// creating the message element the first time. Returns false when no
    /// editor is bound to `field`.
    pub fn mark_invalid(
        &mut self,
        field: &str,
        message: &str,
        invalid_class: &str,
        style: &ErrorMessageStyle,
    ) -> bool {
        let Some(editor) = find_editor_mut(&mut self.items, field) else {
            return false;
        };
        editor.add_class(invalid_class);

        if find_error_mut(&mut self.items, field).is_none() {
            let created = ErrorMessage {
                for_field: field.to_owned(),
                class: style.class.clone(),
                text: String::new(),
                hidden: true,
            };
            if insert_after_editor(&mut self.items, field, created).is_err() {
                return false;
            }
        }

        match find_error_mut(&mut self.items, field) {
            Some(error) => {
                error.text = style.render(field, message);
                error.hidden = false;
                true
            }
            None => false,
        }
    }
}

fn collect_editors<'a>(items: &'a [FormItem], out: &mut Vec<&'a Editor>) {
    for item in items {
        match item {
            FormItem::Editor(editor) => out.push(editor),
            FormItem::Fieldset(set) => collect_editors(&set.items, out),
            FormItem::ErrorMessage(_) => {}
        }
    }
}

fn collect_errors<'a>(items: &'a [FormItem], out: &mut Vec<&'a ErrorMessage>) {
    for item in items {
        match item {
            FormItem::ErrorMessage(message) => out.push(message),
            FormItem::Fieldset(set) => collect_errors(&set.items, out),
            FormItem::Editor(_) => {}
        }
    }
}

fn find_error<'a>(items: &'a [FormItem], field: &str) -> Option<&'a ErrorMessage> {
    for item in items {
        match item {
            FormItem::ErrorMessage(message) if message.for_field == field => return Some(message),
            FormItem::Fieldset(set) => {
                if let Some(found) = find_error(&set.items, field) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn find_editor_mut<'a>(items: &'a mut [FormItem], name: &str) -> Option<&'a mut Editor> {
    for item in items.iter_mut() {
        match item {
            FormItem::Editor(editor) if editor.name == name => return Some(editor),
            FormItem::Fieldset(set) => {
                if let Some(found) = find_editor_mut(&mut set.items, name) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn find_error_mut<'a>(items: &'a mut [FormItem], field: &str) -> Option<&'a mut ErrorMessage> {
    for item in items.iter_mut() {
        match item {
            FormItem::ErrorMessage(message) if message.for_field == field => return Some(message),
            FormItem::Fieldset(set) => {
                if let Some(found) = find_error_mut(&mut set.items, field) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn insert_after_editor(
    items: &mut Vec<FormItem>,
    field: &str,
    message: ErrorMessage,
) -> Result<(), ErrorMessage> {
    let position = items
        .iter()
        .position(|item| matches!(item, FormItem::Editor(editor) if editor.name == field));
    if let Some(index) = position {
        items.insert(index + 1, FormItem::ErrorMessage(message));
        return Ok(());
    }

    let mut message = message;
    for item in items.iter_mut() {
        if let FormItem::Fieldset(set) = item {
            match insert_after_editor(&mut set.items, field, message) {
                Ok(()) => return Ok(()),
                Err(returned) => message = returned,
            }
        }
    }
    Err(message)
}

fn visit_leaves_mut(items: &mut [FormItem], visit: &mut impl FnMut(&mut FormItem)) {
    for item in items.iter_mut() {
        if let FormItem::Fieldset(set) = item {
            visit_leaves_mut(&mut set.items, visit);
        } else {
            visit(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_FIELD_INVALID_CLASS, Editor, ErrorMessageStyle, Fieldset, FormItem, FormSurface,
    };
    use crate::{EditorKind, FieldValue, Template, record_data};

    fn sample_form() -> FormSurface {
        FormSurface::custom(vec![
            FormItem::Fieldset(Fieldset {
                title: Some("Name".to_owned()),
                items: vec![
                    FormItem::Editor(Editor::new("firstName", "First", EditorKind::Text)),
                    FormItem::Editor(Editor::new("lastName", "Last", EditorKind::Text)),
                ],
            }),
            FormItem::Editor(Editor::for_field("active", EditorKind::Toggle)),
        ])
    }

    #[test]
    fn editors_are_collected_depth_first() {
        let form = sample_form();
        let names: Vec<&str> = form.editors().into_iter().map(Editor::name).collect();
        assert_eq!(names, vec!["firstName", "lastName", "active"]);
    }

    #[test]
    fn reset_restores_editor_defaults() {
        let mut form = sample_form();
        assert!(form.set_input("firstName", "Ada"));
        assert!(form.set_input("active", "yes"));
        form.reset();
        assert_eq!(
            form.values(),
            record_data([
                ("firstName", FieldValue::Null),
                ("lastName", FieldValue::Null),
                ("active", FieldValue::Bool(false)),
            ])
        );
    }

    #[test]
    fn load_only_touches_matching_editors() {
        let mut form = sample_form();
        form.set_input("lastName", "Lovelace");
        form.load(&record_data([("firstName", "Ada"), ("unknown", "x")]));
        assert_eq!(form.editor("firstName").map(Editor::value), Some(&FieldValue::from("Ada")));
        assert_eq!(
            form.editor("lastName").map(Editor::value),
            Some(&FieldValue::from("Lovelace"))
        );
    }

    #[test]
    fn setting_unknown_editor_reports_false() {
        let mut form = sample_form();
        assert!(!form.set_value("missing", FieldValue::Int(1)));
    }

    #[test]
    fn error_message_is_inserted_after_editor_in_its_fieldset() {
        let mut form = sample_form();
        let style = ErrorMessageStyle::default();
        assert!(form.mark_invalid(
            "firstName",
            "must be present",
            DEFAULT_FIELD_INVALID_CLASS,
            &style
        ));

        let FormItem::Fieldset(set) = &form.items()[0] else {
            panic!("expected fieldset first");
        };
        assert!(matches!(&set.items[1], FormItem::ErrorMessage(message) if message.for_field() == "firstName"));
        let editor = form.editor("firstName").expect("editor exists");
        assert!(editor.has_class(DEFAULT_FIELD_INVALID_CLASS));
        let message = form.error_message("firstName").expect("message exists");
        assert!(message.is_visible());
        assert_eq!(message.text(), "must be present");
    }

    #[test]
    fn error_message_is_reused_on_repeat() {
        let mut form = sample_form();
        let style = ErrorMessageStyle {
            class: "err".to_owned(),
            template: Template::parse("{field}: {message}").expect("valid template"),
        };
        form.mark_invalid("active", "first", "bad", &style);
        form.clear_errors("bad");
        assert!(form.visible_errors().is_empty());
        assert!(!form.editor("active").expect("editor").has_class("bad"));

        form.mark_invalid("active", "second", "bad", &style);
        assert_eq!(form.items().len(), 3);
        let message = form.error_message("active").expect("message exists");
        assert_eq!(message.text(), "active: second");
        assert_eq!(message.class(), "err");
        assert_eq!(form.visible_errors().len(), 1);
    }

    #[test]
    fn error_for_unbound_field_is_dropped() {
        let mut form = sample_form();
        let before = form.clone();
        assert!(!form.mark_invalid("age", "bad", "x", &ErrorMessageStyle::default()));
        assert_eq!(form, before);
    }

    #[test]
    fn invalid_class_is_not_duplicated() {
        let mut editor = Editor::for_field("age", EditorKind::Number);
        editor.add_class("bad");
        editor.add_class("bad");
        assert_eq!(editor.classes(), ["bad".to_owned()]);
        editor.remove_class("bad");
        assert!(editor.classes().is_empty());
    }
}
