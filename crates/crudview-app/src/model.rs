// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::Schema;

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Single-threaded shared handle. Two handles name the same record only when
/// they point at the same allocation.
pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

pub fn same_record<T>(left: &Shared<T>, right: &Shared<T>) -> bool {
    Rc::ptr_eq(left, right)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Date(Date),
    Text(String),
}

impl FieldValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(number) => Some(*number),
            _ => None,
        }
    }

    /// Equality by value: an integer and a decimal holding the same number
    /// match.
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(int), Self::Decimal(decimal)) | (Self::Decimal(decimal), Self::Int(int)) => {
                *int as f64 == *decimal
            }
            _ => self == other,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(flag) => flag.to_string(),
            Self::Int(number) => number.to_string(),
            Self::Decimal(number) => number.to_string(),
            Self::Date(date) => date.format(DATE_FORMAT).unwrap_or_default(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Field name to value, ordered by name.
pub type RecordData = BTreeMap<String, FieldValue>;

/// Same field names with [`FieldValue::same_value`] values. The form's dirty
/// check compares with this.
pub fn same_values(left: &RecordData, right: &RecordData) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|((left_name, left_value), (right_name, right_value))| {
                left_name == right_name && left_value.same_value(right_value)
            })
}

/// Builds [`RecordData`] from `(name, value)` pairs.
pub fn record_data<K, V, I>(pairs: I) -> RecordData
where
    K: Into<String>,
    V: Into<FieldValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// One data item with a transactional edit protocol. Validation rules belong
/// to the record; an empty result means valid.
pub trait Record {
    fn get(&self, field: &str) -> Option<FieldValue>;
    fn set(&mut self, field: &str, value: FieldValue);
    fn data(&self) -> RecordData;
    fn begin_edit(&mut self);
    fn end_edit(&mut self);
    fn cancel_edit(&mut self);
    fn validate(&self) -> Vec<FieldError>;
}

pub trait RecordFactory {
    type Record: Record;

    /// A new empty record conforming to the collection's schema.
    fn create(&self) -> Shared<Self::Record>;
}

pub trait Collection: RecordFactory {
    /// Identifier the host registered the collection under, if any.
    fn collection_id(&self) -> Option<&str>;
    /// Name derived from the collection's type, used when there is no id.
    fn type_name(&self) -> &str;
    fn schema(&self) -> Option<&Schema>;
    fn records(&self) -> &[Shared<Self::Record>];
    fn add(&mut self, record: Shared<Self::Record>);
    fn remove(&mut self, record: &Shared<Self::Record>) -> bool;

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn contains(&self, record: &Shared<Self::Record>) -> bool {
        self.records()
            .iter()
            .any(|candidate| same_record(candidate, record))
    }
}
