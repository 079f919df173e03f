// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::{DetailRow, DetailSurface, DetailTemplate, Editor, Fieldset, FormItem, FormSurface, Schema};

/// Fills the detail surface with a label/value row per non-identifier field.
/// Leaves caller-supplied templates alone and does nothing without a schema.
pub fn generate_detail(detail: &mut DetailSurface, schema: Option<&Schema>) -> bool {
    let Some(schema) = schema else {
        return false;
    };
    if !detail.needs_generation() {
        return false;
    }

    let rows = schema
        .editable_fields()
        .map(|field| DetailRow {
            label: field.name.clone(),
            field: field.name.clone(),
        })
        .collect::<Vec<_>>();
    debug!(rows = rows.len(), "generated detail template");
    detail.set_generated_template(DetailTemplate::Table(rows));
    true
}

/// Fills the form with one editor per non-identifier field, wrapped in a
/// single untitled fieldset. Same guards as [`generate_detail`].
pub fn generate_form(form: &mut FormSurface, schema: Option<&Schema>) -> bool {
    let Some(schema) = schema else {
        return false;
    };
    if !form.needs_generation() {
        return false;
    }

    let editors = schema
        .editable_fields()
        .map(|field| FormItem::Editor(Editor::for_field(field.name.clone(), field.editor_kind())))
        .collect::<Vec<_>>();
    debug!(editors = editors.len(), "generated form fields");
    form.set_generated_items(vec![FormItem::Fieldset(Fieldset {
        title: None,
        items: editors,
    })]);
    true
}
