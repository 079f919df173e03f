// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::BTreeSet;
use time::Date;
use tracing::warn;

use crate::model::{DATE_FORMAT, FieldValue};

/// Semantic type of a schema field. Anything unrecognised is text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    Date,
    Integer,
    Decimal,
    #[default]
    Text,
}

impl FieldType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Text => "text",
        }
    }

    /// Accepts the long names plus the short aliases `bool`, `int` and
    /// `float`. Never fails: unknown names resolve to [`FieldType::Text`].
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Self::Boolean,
            "date" => Self::Date,
            "integer" | "int" => Self::Integer,
            "decimal" | "float" | "number" => Self::Decimal,
            _ => Self::Text,
        }
    }

    pub const fn editor_kind(self) -> EditorKind {
        match self {
            Self::Boolean => EditorKind::Toggle,
            Self::Date => EditorKind::DatePicker,
            Self::Integer | Self::Decimal => EditorKind::Number,
            Self::Text => EditorKind::Text,
        }
    }

    /// Coerces a value into this type. Input that cannot be represented
    /// becomes [`FieldValue::Null`].
    pub fn convert(self, value: FieldValue) -> FieldValue {
        match (self, value) {
            (_, FieldValue::Null) => FieldValue::Null,
            (Self::Text, FieldValue::Text(text)) => FieldValue::Text(text),
            (Self::Text, other) => FieldValue::Text(other.display()),
            (Self::Boolean, FieldValue::Bool(flag)) => FieldValue::Bool(flag),
            (Self::Boolean, FieldValue::Int(number)) => FieldValue::Bool(number != 0),
            (Self::Boolean, FieldValue::Text(text)) => {
                parse_flag(&text).map_or(FieldValue::Null, FieldValue::Bool)
            }
            (Self::Boolean, _) => FieldValue::Null,
            (Self::Integer, FieldValue::Int(number)) => FieldValue::Int(number),
            (Self::Integer, FieldValue::Decimal(number)) => {
                whole_number(number).map_or(FieldValue::Null, FieldValue::Int)
            }
            (Self::Integer, FieldValue::Bool(flag)) => FieldValue::Int(i64::from(flag)),
            (Self::Integer, FieldValue::Text(text)) => {
                let trimmed = text.trim();
                match trimmed.parse::<i64>() {
                    Ok(number) => FieldValue::Int(number),
                    Err(_) => trimmed
                        .parse::<f64>()
                        .ok()
                        .and_then(whole_number)
                        .map_or(FieldValue::Null, FieldValue::Int),
                }
            }
            (Self::Integer, _) => FieldValue::Null,
            (Self::Decimal, FieldValue::Decimal(number)) => FieldValue::Decimal(number),
            (Self::Decimal, FieldValue::Int(number)) => FieldValue::Decimal(number as f64),
            (Self::Decimal, FieldValue::Text(text)) => match text.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => FieldValue::Decimal(number),
                _ => FieldValue::Null,
            },
            (Self::Decimal, _) => FieldValue::Null,
            (Self::Date, FieldValue::Date(date)) => FieldValue::Date(date),
            (Self::Date, FieldValue::Text(text)) => {
                parse_date(&text).map_or(FieldValue::Null, FieldValue::Date)
            }
            (Self::Date, _) => FieldValue::Null,
        }
    }
}

/// Editor used for a field in a generated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorKind {
    Toggle,
    DatePicker,
    Number,
    Text,
}

impl EditorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::DatePicker => "date_picker",
            Self::Number => "number",
            Self::Text => "text",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "toggle" => Some(Self::Toggle),
            "date_picker" => Some(Self::DatePicker),
            "number" => Some(Self::Number),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn default_value(self) -> FieldValue {
        match self {
            Self::Toggle => FieldValue::Bool(false),
            Self::DatePicker | Self::Number | Self::Text => FieldValue::Null,
        }
    }

    /// Turns raw editor input into the value the editor would report.
    pub fn parse_input(self, raw: &str) -> FieldValue {
        let trimmed = raw.trim();
        match self {
            Self::Text => FieldValue::Text(raw.to_owned()),
            Self::Toggle => FieldValue::Bool(parse_flag(trimmed).unwrap_or(false)),
            Self::Number => {
                if let Ok(number) = trimmed.parse::<i64>() {
                    FieldValue::Int(number)
                } else {
                    match trimmed.parse::<f64>() {
                        Ok(number) if number.is_finite() => FieldValue::Decimal(number),
                        _ => FieldValue::Null,
                    }
                }
            }
            Self::DatePicker => parse_date(trimmed).map_or(FieldValue::Null, FieldValue::Date),
        }
    }
}

/// Truncates toward zero; `None` when the result does not fit an `i64`.
fn whole_number(number: f64) -> Option<i64> {
    let whole = number.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (whole >= i64::MIN as f64 && whole < i64::MAX as f64).then_some(whole as i64)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), DATE_FORMAT).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn decimal(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Decimal)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub const fn editor_kind(&self) -> EditorKind {
        self.field_type.editor_kind()
    }
}

/// Ordered field list plus the name of the identifier field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<Field>,
    id_field: Option<String>,
}

impl Schema {
    /// Field names must be unique; later duplicates are dropped.
    pub fn new(fields: Vec<Field>) -> Self {
        let mut seen = BTreeSet::new();
        let mut unique = Vec::with_capacity(fields.len());
        for field in fields {
            if seen.insert(field.name.clone()) {
                unique.push(field);
            } else {
                warn!(field = %field.name, "dropping duplicate schema field");
            }
        }
        Self {
            fields: unique,
            id_field: None,
        }
    }

    pub fn with_id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = Some(name.into());
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn id_field(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    pub fn is_id_field(&self, name: &str) -> bool {
        self.id_field.as_deref() == Some(name)
    }

    pub fn first_field_name(&self) -> Option<&str> {
        self.fields.first().map(|field| field.name.as_str())
    }

    /// Fields in schema order, minus the identifier.
    pub fn editable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|field| !self.is_id_field(&field.name))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Resolves the field used as a record's title: the configured name, or the
/// first schema field. The schema walk is cached until [`TitleField::invalidate`].
#[derive(Debug, Clone, Default)]
pub struct TitleField {
    configured: Option<String>,
    derived: OnceCell<Option<String>>,
}

impl TitleField {
    pub fn new(configured: Option<String>) -> Self {
        Self {
            configured,
            derived: OnceCell::new(),
        }
    }

    pub fn configured(&self) -> Option<&str> {
        self.configured.as_deref()
    }

    pub fn set_configured(&mut self, configured: Option<String>) {
        self.configured = configured;
    }

    pub fn resolve(&self, schema: Option<&Schema>) -> Option<String> {
        if let Some(configured) = self.configured.as_deref().filter(|name| !name.is_empty()) {
            return Some(configured.to_owned());
        }
        // Nothing worth caching until a schema exists.
        let schema = schema?;
        self.derived
            .get_or_init(|| schema.first_field_name().map(str::to_owned))
            .clone()
    }

    pub fn invalidate(&mut self) {
        self.derived.take();
    }
}
