// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::debug;

use crate::{
    Collection, FieldError, FieldValue, Record, RecordData, RecordFactory, Schema, Shared,
    same_record, shared,
};

pub const PRESENCE_MESSAGE: &str = "must be present";
pub const LENGTH_MESSAGE: &str = "is the wrong length";
pub const INCLUSION_MESSAGE: &str = "is not included in the list of acceptable values";
pub const EXCLUSION_MESSAGE: &str = "is not an acceptable value";
pub const EMAIL_MESSAGE: &str = "is not a valid email address";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    Presence,
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    Inclusion(Vec<String>),
    Exclusion(Vec<String>),
    Email,
}

impl ValidationKind {
    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::Presence => PRESENCE_MESSAGE,
            Self::Length { .. } => LENGTH_MESSAGE,
            Self::Inclusion(_) => INCLUSION_MESSAGE,
            Self::Exclusion(_) => EXCLUSION_MESSAGE,
            Self::Email => EMAIL_MESSAGE,
        }
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        match self {
            Self::Presence => !value.is_blank(),
            Self::Length { min, max } => {
                if value.is_null() {
                    return false;
                }
                let length = value.display().chars().count();
                let too_short = min.is_some_and(|min| length < min);
                let too_long = max.is_some_and(|max| length > max);
                !(too_short || too_long)
            }
            Self::Inclusion(allowed) => allowed.contains(&value.display()),
            Self::Exclusion(denied) => !denied.contains(&value.display()),
            Self::Email => is_email(&value.display()),
        }
    }
}

/// A model-level rule on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub field: String,
    pub kind: ValidationKind,
    pub message: Option<String>,
}

impl Validation {
    pub fn new(field: impl Into<String>, kind: ValidationKind) -> Self {
        Self {
            field: field.into(),
            kind,
            message: None,
        }
    }

    pub fn presence(field: impl Into<String>) -> Self {
        Self::new(field, ValidationKind::Presence)
    }

    pub fn length(field: impl Into<String>, min: Option<usize>, max: Option<usize>) -> Self {
        Self::new(field, ValidationKind::Length { min, max })
    }

    pub fn inclusion(field: impl Into<String>, allowed: &[&str]) -> Self {
        Self::new(
            field,
            ValidationKind::Inclusion(allowed.iter().map(|value| (*value).to_owned()).collect()),
        )
    }

    pub fn exclusion(field: impl Into<String>, denied: &[&str]) -> Self {
        Self::new(
            field,
            ValidationKind::Exclusion(denied.iter().map(|value| (*value).to_owned()).collect()),
        )
    }

    pub fn email(field: impl Into<String>) -> Self {
        Self::new(field, ValidationKind::Email)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn check(&self, data: &RecordData) -> Option<FieldError> {
        let value = data.get(&self.field).cloned().unwrap_or_default();
        if self.kind.accepts(&value) {
            return None;
        }
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| self.kind.default_message().to_owned());
        Some(FieldError::new(self.field.clone(), message))
    }
}

// local@domain.tld, letters/digits/`_.-` only, tld of two or more alphanumerics.
fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let allowed = |ch: char| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-');
    if local.is_empty() || !local.chars().all(allowed) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, hosts)) = labels.split_last() else {
        return false;
    };
    if hosts.is_empty() {
        return false;
    }
    let host_ok = hosts.iter().all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    });
    host_ok && tld.len() >= 2 && tld.chars().all(|ch| ch.is_ascii_alphanumeric())
}

/// Schema plus validation rules shared by a collection and its records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Model {
    pub schema: Schema,
    pub validations: Vec<Validation>,
}

impl Model {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            validations: Vec::new(),
        }
    }

    pub fn with_validations(mut self, validations: Vec<Validation>) -> Self {
        self.validations = validations;
        self
    }

    /// Every schema field set to Null.
    fn blank_data(&self) -> RecordData {
        self.schema
            .fields()
            .iter()
            .map(|field| (field.name.clone(), FieldValue::Null))
            .collect()
    }
}

/// In-memory record. `begin_edit` snapshots the values so `cancel_edit`
/// can restore them.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    model: Rc<Model>,
    values: RecordData,
    pending: Option<RecordData>,
}

impl MemoryRecord {
    pub fn new(model: Rc<Model>) -> Self {
        let values = model.blank_data();
        Self {
            model,
            values,
            pending: None,
        }
    }

    pub fn with_data(model: Rc<Model>, data: RecordData) -> Self {
        let mut record = Self::new(model);
        for (name, value) in data {
            record.set(&name, value);
        }
        record
    }

    /// Record with no schema: every field is accepted as given.
    pub fn detached(data: RecordData) -> Self {
        Self {
            model: Rc::new(Model::default()),
            values: data,
            pending: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.pending.is_some()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}

impl Record for MemoryRecord {
    fn get(&self, field: &str) -> Option<FieldValue> {
        self.values.get(field).cloned()
    }

    fn set(&mut self, field: &str, value: FieldValue) {
        if self.model.schema.is_empty() {
            self.values.insert(field.to_owned(), value);
            return;
        }
        if let Some(schema_field) = self.model.schema.field(field) {
            let converted = schema_field.field_type.convert(value);
            self.values.insert(field.to_owned(), converted);
        }
    }

    fn data(&self) -> RecordData {
        self.values.clone()
    }

    fn begin_edit(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.values.clone());
        }
    }

    fn end_edit(&mut self) {
        self.pending = None;
    }

    fn cancel_edit(&mut self) {
        if let Some(previous) = self.pending.take() {
            self.values = previous;
        }
    }

    fn validate(&self) -> Vec<FieldError> {
        self.model
            .validations
            .iter()
            .filter_map(|validation| validation.check(&self.values))
            .collect()
    }
}

/// In-memory collection. Records added without an identifier get the next
/// integer identifier.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    id: Option<String>,
    type_name: String,
    model: Rc<Model>,
    records: Vec<Shared<MemoryRecord>>,
}

impl MemoryCollection {
    pub fn new(type_name: impl Into<String>, model: Model) -> Self {
        Self {
            id: None,
            type_name: type_name.into(),
            model: Rc::new(model),
            records: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Builds a record from `data` and adds it.
    pub fn insert(&mut self, data: RecordData) -> Shared<MemoryRecord> {
        let record = shared(MemoryRecord::with_data(Rc::clone(&self.model), data));
        self.add(Rc::clone(&record));
        record
    }

    pub fn position(&self, record: &Shared<MemoryRecord>) -> Option<usize> {
        self.records
            .iter()
            .position(|candidate| same_record(candidate, record))
    }

    /// One past the largest stored id, or the smallest free positive id once
    /// the largest is `i64::MAX`.
    fn next_id(&self, id_field: &str) -> i64 {
        let ids: BTreeSet<i64> = self
            .records
            .iter()
            .filter_map(|record| record.borrow().values.get(id_field).and_then(FieldValue::as_int))
            .collect();
        let last = ids.last().copied().unwrap_or(0);
        last.checked_add(1)
            .unwrap_or_else(|| (1..).find(|id| !ids.contains(id)).unwrap_or(0))
    }
}

impl RecordFactory for MemoryCollection {
    type Record = MemoryRecord;

    fn create(&self) -> Shared<MemoryRecord> {
        shared(MemoryRecord::new(Rc::clone(&self.model)))
    }
}

impl Collection for MemoryCollection {
    fn collection_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> Option<&Schema> {
        Some(&self.model.schema)
    }

    fn records(&self) -> &[Shared<MemoryRecord>] {
        &self.records
    }

    fn add(&mut self, record: Shared<MemoryRecord>) {
        if self.contains(&record) {
            return;
        }
        if let Some(id_field) = self.model.schema.id_field() {
            let missing = record
                .borrow()
                .values
                .get(id_field)
                .is_none_or(FieldValue::is_null);
            if missing {
                let id = self.next_id(id_field);
                record.borrow_mut().set(id_field, FieldValue::Int(id));
            }
        }
        debug!(collection = %self.type_name, "record added");
        self.records.push(record);
    }

    fn remove(&mut self, record: &Shared<MemoryRecord>) -> bool {
        match self.position(record) {
            Some(index) => {
                self.records.remove(index);
                debug!(collection = %self.type_name, "record removed");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryCollection, MemoryRecord, Model, Validation, is_email};
    use crate::{Collection, Field, FieldError, FieldValue, Record, RecordFactory, Schema, record_data};
    use std::rc::Rc;

    fn people_model() -> Model {
        Model::new(
            Schema::new(vec![
                Field::integer("id"),
                Field::text("firstName"),
                Field::integer("age"),
            ])
            .with_id_field("id"),
        )
    }

    #[test]
    fn set_converts_and_ignores_unknown_fields() {
        let mut record = MemoryRecord::new(Rc::new(people_model()));
        record.set("age", FieldValue::from("36"));
        record.set("nickname", FieldValue::from("x"));
        assert_eq!(record.get("age"), Some(FieldValue::Int(36)));
        assert_eq!(record.get("nickname"), None);
        assert_eq!(record.data().len(), 3);
    }

    #[test]
    fn cancel_edit_restores_snapshot() {
        let mut record = MemoryRecord::with_data(
            Rc::new(people_model()),
            record_data([("firstName", "Ada")]),
        );
        record.begin_edit();
        record.set("firstName", "Grace".into());
        assert!(record.is_editing());
        record.cancel_edit();
        assert_eq!(record.get("firstName"), Some("Ada".into()));
        assert!(!record.is_editing());
    }

    #[test]
    fn end_edit_keeps_changes() {
        let mut record = MemoryRecord::new(Rc::new(people_model()));
        record.begin_edit();
        record.set("firstName", "Grace".into());
        record.end_edit();
        record.cancel_edit();
        assert_eq!(record.get("firstName"), Some("Grace".into()));
    }

    #[test]
    fn validations_report_default_and_custom_messages() {
        let model = people_model().with_validations(vec![
            Validation::presence("firstName"),
            Validation::length("firstName", Some(2), Some(5)).with_message("2-5 chars"),
            Validation::inclusion("age", &["18", "36"]),
        ]);
        let record = MemoryRecord::new(Rc::new(model));
        assert_eq!(
            record.validate(),
            vec![
                FieldError::new("firstName", "must be present"),
                FieldError::new("firstName", "2-5 chars"),
                FieldError::new("age", "is not included in the list of acceptable values"),
            ]
        );
    }

    #[test]
    fn exclusion_and_length_accept_valid_values() {
        let model = people_model().with_validations(vec![
            Validation::exclusion("firstName", &["admin"]),
            Validation::length("firstName", None, Some(3)),
        ]);
        let record = MemoryRecord::with_data(Rc::new(model), record_data([("firstName", "Ada")]));
        assert!(record.validate().is_empty());
    }

    #[test]
    fn email_check_matches_common_shapes() {
        assert!(is_email("ada@example.com"));
        assert!(is_email("a.b-c_d@mail.example.org"));
        assert!(!is_email("ada@example"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("ada@.com"));
        assert!(!is_email("ada example@x.com"));
        assert!(!is_email("ada@example.c"));
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let mut collection = MemoryCollection::new("Person", people_model());
        let first = collection.insert(record_data([("firstName", "Ada")]));
        let second = collection.create();
        collection.add(second.clone());
        assert_eq!(first.borrow().get("id"), Some(FieldValue::Int(1)));
        assert_eq!(second.borrow().get("id"), Some(FieldValue::Int(2)));
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn id_after_maximum_reuses_a_free_slot() {
        let mut collection = MemoryCollection::new("Person", people_model());
        collection.insert(record_data([
            ("id", FieldValue::Int(i64::MAX)),
            ("firstName", FieldValue::from("Max")),
        ]));
        collection.insert(record_data([
            ("id", FieldValue::Int(1)),
            ("firstName", FieldValue::from("One")),
        ]));
        let next = collection.insert(record_data([("firstName", "Ada")]));
        assert_eq!(next.borrow().get("id"), Some(FieldValue::Int(2)));
    }

    #[test]
    fn add_is_idempotent_per_handle() {
        let mut collection = MemoryCollection::new("Person", people_model());
        let record = collection.insert(record_data([("firstName", "Ada")]));
        collection.add(record.clone());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn remove_matches_by_handle() {
        let mut collection = MemoryCollection::new("Person", people_model());
        let record = collection.insert(record_data([("firstName", "Ada")]));
        let lookalike = collection.create();
        assert!(!collection.remove(&lookalike));
        assert!(collection.remove(&record));
        assert!(collection.is_empty());
    }
}
