// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;
use std::fmt;

use crate::RecordData;

/// Placeholder that expands to the value of the record's title field.
pub const RECORD_TITLE_TOKEN: &str = "@title";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateError {
    Unterminated { offset: usize },
    EmptyPlaceholder { offset: usize },
    UnmatchedClose { offset: usize },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unterminated { offset } => {
                write!(f, "unterminated placeholder starting at byte {offset}")
            }
            Self::EmptyPlaceholder { offset } => {
                write!(f, "empty placeholder at byte {offset}")
            }
            Self::UnmatchedClose { offset } => {
                write!(f, "unmatched `}}` at byte {offset}; write `}}}}` for a literal brace")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
    RecordTitle,
}

/// Text with `{field}` placeholders, `{@title}` for the record title, and
/// `{{` / `}}` for literal braces. Missing values render as empty text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, ch)) = chars.next() {
            match ch {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(TemplateError::Unterminated { offset });
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder { offset });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(if name == RECORD_TITLE_TOKEN {
                        Segment::RecordTitle
                    } else {
                        Segment::Field(name.to_owned())
                    });
                }
                '}' => return Err(TemplateError::UnmatchedClose { offset }),
                _ => literal.push(ch),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_owned(),
            segments,
        })
    }

    pub fn record_title() -> Self {
        Self::prefixed_record_title("")
    }

    pub fn prefixed_record_title(prefix: &str) -> Self {
        let mut segments = Vec::with_capacity(2);
        if !prefix.is_empty() {
            segments.push(Segment::Literal(prefix.to_owned()));
        }
        segments.push(Segment::RecordTitle);
        Self {
            source: format!("{}{{{RECORD_TITLE_TOKEN}}}", escape(prefix)),
            segments,
        }
    }

    /// Template for one field's value, e.g. a generated detail cell.
    pub fn field(name: &str) -> Self {
        Self {
            source: format!("{{{name}}}"),
            segments: vec![Segment::Field(name.to_owned())],
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Field names referenced by `{field}` placeholders, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn apply(&self, data: &RecordData, title_field: Option<&str>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    if let Some(value) = data.get(name) {
                        out.push_str(&value.display());
                    }
                }
                Segment::RecordTitle => {
                    if let Some(value) = title_field.and_then(|name| data.get(name)) {
                        out.push_str(&value.display());
                    }
                }
            }
        }
        out
    }
}

impl TryFrom<String> for Template {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn escape(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}
