// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Record, RecordData, Shared, Template};

/// Read-only listing of every record in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSurface {
    item_template: Template,
}

impl Default for ListSurface {
    fn default() -> Self {
        Self {
            item_template: Template::record_title(),
        }
    }
}

impl ListSurface {
    pub fn new(item_template: Template) -> Self {
        Self { item_template }
    }

    pub fn item_template(&self) -> &Template {
        &self.item_template
    }

    pub fn items<R: Record>(&self, records: &[Shared<R>], title_field: Option<&str>) -> Vec<String> {
        records
            .iter()
            .map(|record| self.item_template.apply(&record.borrow().data(), title_field))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailTemplate {
    /// Label/value pairs, one per field.
    Table(Vec<DetailRow>),
    Custom(Template),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailContent {
    Rows(Vec<(String, String)>),
    Text(String),
}

/// Display of a single record. `generated` is set only when the template came
/// from the schema, so custom templates (even empty ones) are never replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailSurface {
    template: Option<DetailTemplate>,
    generated: bool,
}

impl DetailSurface {
    pub fn custom(template: DetailTemplate) -> Self {
        Self {
            template: Some(template),
            generated: false,
        }
    }

    pub fn template(&self) -> Option<&DetailTemplate> {
        self.template.as_ref()
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn needs_generation(&self) -> bool {
        self.template.is_none() || self.generated
    }

    pub fn set_generated_template(&mut self, template: DetailTemplate) {
        self.template = Some(template);
        self.generated = true;
    }

    pub fn clear_generated_marker(&mut self) {
        self.generated = false;
    }

    pub fn render(&self, data: &RecordData, title_field: Option<&str>) -> Option<DetailContent> {
        let content = match self.template.as_ref()? {
            DetailTemplate::Table(rows) => DetailContent::Rows(
                rows.iter()
                    .map(|row| {
                        let value = data
                            .get(&row.field)
                            .map(|value| value.display())
                            .unwrap_or_default();
                        (row.label.clone(), value)
                    })
                    .collect(),
            ),
            DetailTemplate::Custom(template) => DetailContent::Text(template.apply(data, title_field)),
        };
        Some(content)
    }
}

#[cfg(test)]
mod tests {
    use super::{DetailContent, DetailRow, DetailSurface, DetailTemplate, ListSurface};
    use crate::{FieldValue, Template, record_data};

    #[test]
    fn empty_detail_needs_generation() {
        let detail = DetailSurface::default();
        assert!(detail.needs_generation());
        assert!(!detail.is_generated());
    }

    #[test]
    fn custom_detail_never_needs_generation() {
        let detail = DetailSurface::custom(DetailTemplate::Custom(
            Template::parse("").expect("valid template"),
        ));
        assert!(!detail.needs_generation());
    }

    #[test]
    fn table_renders_rows_in_order() {
        let mut detail = DetailSurface::default();
        detail.set_generated_template(DetailTemplate::Table(vec![
            DetailRow {
                label: "firstName".to_owned(),
                field: "firstName".to_owned(),
            },
            DetailRow {
                label: "age".to_owned(),
                field: "age".to_owned(),
            },
        ]));
        let data = record_data([("firstName", FieldValue::from("Ada")), ("age", 36_i64.into())]);
        assert_eq!(
            detail.render(&data, None),
            Some(DetailContent::Rows(vec![
                ("firstName".to_owned(), "Ada".to_owned()),
                ("age".to_owned(), "36".to_owned()),
            ]))
        );
    }

    #[test]
    fn detail_without_template_renders_nothing() {
        assert_eq!(DetailSurface::default().render(&record_data([("a", "b")]), None), None);
    }

    #[test]
    fn list_defaults_to_record_title() {
        let list = ListSurface::default();
        let records = vec![
            crate::shared(crate::MemoryRecord::detached(record_data([("name", "Ada")]))),
            crate::shared(crate::MemoryRecord::detached(record_data([("name", "Grace")]))),
        ];
        assert_eq!(
            list.items(&records, Some("name")),
            vec!["Ada".to_owned(), "Grace".to_owned()]
        );
    }
}
