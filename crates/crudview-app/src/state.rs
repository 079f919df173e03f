// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::{
    ActionKind, ButtonStates, Collection, ConfirmPrompt, ConfirmRequest, ConfirmResponse,
    ConfirmToken, CrudConfig, DEFAULT_ERROR_MESSAGE_CLASS, DEFAULT_FIELD_INVALID_CLASS,
    DEFAULT_QUIET_WINDOW, Debouncer, DetailContent, DetailSurface, ErrorMessageStyle, FieldError,
    FieldValue, FormSurface, ListSurface, NavigationStack, Record, RecordData, RecordFactory,
    Shared, SurfaceKind, Template, TitleField, generate_detail, generate_form, same_record,
    same_values,
};

pub const DEFAULT_ADD_TITLE: &str = "Add";
pub const DEFAULT_EDIT_TITLE_PREFIX: &str = "Edit ";
pub const DEFAULT_DELETE_CONFIRM_TEXT: &str = "Delete this record?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Viewing,
    Adding,
    Editing,
}

impl Lifecycle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Viewing => "viewing",
            Self::Adding => "adding",
            Self::Editing => "editing",
        }
    }
}

enum LifecycleState<R> {
    Idle,
    Viewing(Shared<R>),
    Adding,
    Editing(Shared<R>),
}

impl<R> LifecycleState<R> {
    const fn phase(&self) -> Lifecycle {
        match self {
            Self::Idle => Lifecycle::Idle,
            Self::Viewing(_) => Lifecycle::Viewing,
            Self::Adding => Lifecycle::Adding,
            Self::Editing(_) => Lifecycle::Editing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudCommand {
    TapListItem(usize),
    TapAdd,
    TapEdit,
    TapDelete,
    TapSave,
    TapBack,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CrudEvent {
    SurfacePushed(SurfaceKind),
    SurfacePopped(SurfaceKind),
    ActiveSurfaceChanged(SurfaceKind),
    ButtonsChanged(ButtonStates),
    TitleChanged(String),
    SaveEnabledChanged(bool),
    RecordInserted,
    RecordCommitted,
    RecordRemoved,
    ValidationFailed(Vec<FieldError>),
    ConfirmationRequested(ConfirmToken),
    CollectionChanged,
    SurfacesRegenerated { detail: bool, form: bool },
}

/// Host-tunable text and styling the view consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSettings {
    pub display_name: Option<String>,
    pub title_field: Option<String>,
    pub add_title: String,
    pub detail_title: Template,
    pub edit_title: Template,
    pub delete_confirm_text: String,
    pub field_invalid_class: String,
    pub error_message: ErrorMessageStyle,
    pub field_change_debounce: Duration,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            display_name: None,
            title_field: None,
            add_title: DEFAULT_ADD_TITLE.to_owned(),
            detail_title: Template::record_title(),
            edit_title: Template::prefixed_record_title(DEFAULT_EDIT_TITLE_PREFIX),
            delete_confirm_text: DEFAULT_DELETE_CONFIRM_TEXT.to_owned(),
            field_invalid_class: DEFAULT_FIELD_INVALID_CLASS.to_owned(),
            error_message: ErrorMessageStyle {
                class: DEFAULT_ERROR_MESSAGE_CLASS.to_owned(),
                template: Template::field("message"),
            },
            field_change_debounce: DEFAULT_QUIET_WINDOW,
        }
    }
}

/// List/Detail/Form controller over one collection.
///
/// Every user-facing operation returns the events it caused, in order. Stack
/// changes always report the new active surface, then the recomputed buttons,
/// then the recomputed title.
pub struct CrudView<C: Collection, P: ConfirmPrompt> {
    collection: Option<Shared<C>>,
    prompt: P,
    settings: ViewSettings,
    title_field: TitleField,
    nav: NavigationStack,
    buttons: ButtonStates,
    list: ListSurface,
    detail: DetailSurface,
    form: FormSurface,
    detail_record: Option<Shared<C::Record>>,
    form_record: Option<Shared<C::Record>>,
    lifecycle: LifecycleState<C::Record>,
    snapshot: Option<RecordData>,
    debouncer: Debouncer,
    pending_delete: Option<(ConfirmToken, Shared<C::Record>)>,
    next_token: u64,
}

impl<C: Collection, P: ConfirmPrompt> CrudView<C, P> {
    pub fn new(prompt: P) -> Self {
        Self::with_settings(ViewSettings::default(), prompt)
    }

    pub fn with_settings(settings: ViewSettings, prompt: P) -> Self {
        let mut buttons = ButtonStates::default();
        buttons.apply_visibility(SurfaceKind::List);
        Self {
            collection: None,
            prompt,
            title_field: TitleField::new(settings.title_field.clone()),
            debouncer: Debouncer::new(settings.field_change_debounce),
            settings,
            nav: NavigationStack::default(),
            buttons,
            list: ListSurface::default(),
            detail: DetailSurface::default(),
            form: FormSurface::default(),
            detail_record: None,
            form_record: None,
            lifecycle: LifecycleState::Idle,
            snapshot: None,
            pending_delete: None,
            next_token: 0,
        }
    }

    /// Builds a view with the settings, button labels and custom surfaces
    /// from `config`.
    pub fn from_config(config: &CrudConfig, prompt: P) -> Result<Self> {
        let mut view = Self::with_settings(config.view_settings()?, prompt);
        view.buttons = config.buttons();
        view.buttons.apply_visibility(SurfaceKind::List);
        view.list = config.list_surface();
        view.detail = config.detail_surface();
        view.form = config.form_surface();
        Ok(view)
    }

    pub fn collection(&self) -> Option<&Shared<C>> {
        self.collection.as_ref()
    }

    /// Swaps the backing collection. Selection, cached schema lookups and
    /// generated surfaces are all rebuilt; custom surfaces are kept.
    pub fn set_collection(&mut self, collection: Option<Shared<C>>) -> Vec<CrudEvent> {
        self.collection = collection;
        self.detail_record = None;
        self.form_record = None;
        self.lifecycle = LifecycleState::Idle;
        self.snapshot = None;
        self.pending_delete = None;
        self.debouncer.cancel();
        self.title_field.invalidate();
        self.form.clear_errors(&self.settings.field_invalid_class);
        self.discard_generated();
        let popped = self.nav.reset();
        debug!(popped, "collection swapped");

        let mut events = vec![CrudEvent::CollectionChanged];
        events.extend(self.regenerate());
        events.extend(self.surface_events());
        events
    }

    pub fn on_schema_changed(&mut self) -> Vec<CrudEvent> {
        self.title_field.invalidate();
        self.discard_generated();
        let mut events = self.regenerate();
        events.push(CrudEvent::TitleChanged(self.title()));
        events
    }

    /// Reacts to records added or removed by someone else. When the shown or
    /// edited record is gone, every surface above the List is popped.
    pub fn on_collection_changed(&mut self) -> Vec<CrudEvent> {
        let mut events = vec![CrudEvent::CollectionChanged];
        let orphaned = self.collection.as_ref().is_some_and(|collection| {
            let collection = collection.borrow();
            [&self.detail_record, &self.form_record]
                .into_iter()
                .flatten()
                .any(|record| !collection.contains(record))
        });
        if !orphaned {
            events.push(CrudEvent::TitleChanged(self.title()));
            return events;
        }

        debug!("shown record left the collection");
        self.form.clear_errors(&self.settings.field_invalid_class);
        while self.nav.active() != SurfaceKind::List {
            let popped = self.pop();
            if popped.is_empty() {
                break;
            }
            events.extend(popped);
        }
        events
    }

    pub fn set_list(&mut self, list: ListSurface) {
        self.list = list;
    }

    /// Installs a caller-built detail surface and returns the previous one
    /// with its generated marker cleared. An empty surface is filled from the
    /// schema.
    pub fn replace_detail(&mut self, detail: DetailSurface) -> DetailSurface {
        let mut previous = std::mem::replace(&mut self.detail, detail);
        previous.clear_generated_marker();
        self.regenerate();
        previous
    }

    /// Form counterpart of [`CrudView::replace_detail`].
    pub fn replace_form(&mut self, form: FormSurface) -> FormSurface {
        let mut previous = std::mem::replace(&mut self.form, form);
        previous.clear_generated_marker();
        self.regenerate();
        previous
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn set_display_name(&mut self, display_name: Option<String>) -> Vec<CrudEvent> {
        self.settings.display_name = display_name;
        vec![CrudEvent::TitleChanged(self.title())]
    }

    pub fn set_title_field(&mut self, title_field: Option<String>) -> Vec<CrudEvent> {
        self.settings.title_field = title_field.clone();
        self.title_field.set_configured(title_field);
        vec![CrudEvent::TitleChanged(self.title())]
    }

    pub fn title_field(&self) -> Option<String> {
        match &self.collection {
            Some(collection) => self.title_field.resolve(collection.borrow().schema()),
            None => self.title_field.resolve(None),
        }
    }

    pub fn active_surface(&self) -> SurfaceKind {
        self.nav.active()
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.nav
    }

    pub fn buttons(&self) -> &ButtonStates {
        &self.buttons
    }

    pub fn save_enabled(&self) -> bool {
        self.buttons.save.enabled
    }

    pub fn list(&self) -> &ListSurface {
        &self.list
    }

    pub fn detail(&self) -> &DetailSurface {
        &self.detail
    }

    pub fn form(&self) -> &FormSurface {
        &self.form
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.phase()
    }

    pub fn detail_record(&self) -> Option<&Shared<C::Record>> {
        self.detail_record.as_ref()
    }

    pub fn form_record(&self) -> Option<&Shared<C::Record>> {
        self.form_record.as_ref()
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut P {
        &mut self.prompt
    }

    pub fn pending_confirmation(&self) -> Option<ConfirmToken> {
        self.pending_delete.as_ref().map(|(token, _)| *token)
    }

    /// When the pending field activity will be recomputed, if any.
    pub fn field_activity_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Navigation-bar title, computed from the active surface and its record.
    pub fn title(&self) -> String {
        match self.nav.active() {
            SurfaceKind::List => self.list_title(),
            SurfaceKind::Detail => match &self.detail_record {
                Some(record) => {
                    let title_field = self.title_field();
                    self.settings
                        .detail_title
                        .apply(&record.borrow().data(), title_field.as_deref())
                }
                None => String::new(),
            },
            SurfaceKind::Form => match &self.form_record {
                Some(record) => {
                    let title_field = self.title_field();
                    self.settings
                        .edit_title
                        .apply(&record.borrow().data(), title_field.as_deref())
                }
                None => self.settings.add_title.clone(),
            },
        }
    }

    fn list_title(&self) -> String {
        if let Some(name) = self
            .settings
            .display_name
            .as_deref()
            .filter(|name| !name.is_empty())
        {
            return name.to_owned();
        }
        let Some(collection) = &self.collection else {
            return String::new();
        };
        let collection = collection.borrow();
        collection
            .collection_id()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| collection.type_name())
            .to_owned()
    }

    pub fn list_items(&self) -> Vec<String> {
        let Some(collection) = &self.collection else {
            return Vec::new();
        };
        let title_field = self.title_field();
        self.list
            .items(collection.borrow().records(), title_field.as_deref())
    }

    pub fn detail_content(&self) -> Option<DetailContent> {
        let record = self.detail_record.as_ref()?;
        let title_field = self.title_field();
        self.detail
            .render(&record.borrow().data(), title_field.as_deref())
    }

    pub fn dispatch(&mut self, command: CrudCommand) -> Vec<CrudEvent> {
        match command {
            CrudCommand::TapListItem(index) => {
                if self.nav.active() != SurfaceKind::List {
                    return Vec::new();
                }
                let record = self
                    .collection
                    .as_ref()
                    .and_then(|collection| collection.borrow().records().get(index).cloned());
                match record {
                    Some(record) => self.select_for_view(record),
                    None => Vec::new(),
                }
            }
            CrudCommand::TapAdd if self.actionable(ActionKind::Add) => self.begin_add(),
            CrudCommand::TapEdit if self.actionable(ActionKind::Edit) => {
                match self.detail_record.clone() {
                    Some(record) => self.begin_edit(record),
                    None => Vec::new(),
                }
            }
            CrudCommand::TapDelete if self.actionable(ActionKind::Delete) => {
                match self.detail_record.clone() {
                    Some(record) => self.delete(record),
                    None => Vec::new(),
                }
            }
            CrudCommand::TapSave if self.actionable(ActionKind::Save) => self.save(),
            CrudCommand::TapBack => self.back(),
            CrudCommand::TapAdd
            | CrudCommand::TapEdit
            | CrudCommand::TapDelete
            | CrudCommand::TapSave => {
                debug!(?command, "ignored command for hidden or disabled action");
                Vec::new()
            }
        }
    }

    pub fn select_for_view(&mut self, record: Shared<C::Record>) -> Vec<CrudEvent> {
        debug!("viewing record");
        self.detail_record = Some(record.clone());
        self.lifecycle = LifecycleState::Viewing(record);
        self.push(SurfaceKind::Detail)
    }

    pub fn begin_add(&mut self) -> Vec<CrudEvent> {
        debug!("adding record");
        self.form.clear_errors(&self.settings.field_invalid_class);
        self.form_record = None;
        self.form.reset();
        self.snapshot = None;
        self.debouncer.cancel();
        self.lifecycle = LifecycleState::Adding;

        let mut events: Vec<CrudEvent> = self.set_save_enabled(true).into_iter().collect();
        events.extend(self.push(SurfaceKind::Form));
        events
    }

    pub fn begin_edit(&mut self, record: Shared<C::Record>) -> Vec<CrudEvent> {
        debug!("editing record");
        self.form.clear_errors(&self.settings.field_invalid_class);
        self.form.reset();
        let data = record.borrow().data();
        self.form.load(&data);
        self.snapshot = Some(self.form.values());
        self.form_record = Some(record.clone());
        self.debouncer.cancel();
        self.lifecycle = LifecycleState::Editing(record);

        let mut events: Vec<CrudEvent> = self.set_save_enabled(false).into_iter().collect();
        events.extend(self.push(SurfaceKind::Form));
        events
    }

    /// Copies the form into a record inside an edit scope and validates it.
    /// Success commits and pops the form; failure rolls the record back and
    /// marks the offending editors, leaving the form in place.
    pub fn save(&mut self) -> Vec<CrudEvent> {
        let Some(collection) = self.collection.clone() else {
            debug!("save ignored without a collection");
            return Vec::new();
        };
        let (record, adding) = match &self.lifecycle {
            LifecycleState::Adding => (collection.borrow().create(), true),
            LifecycleState::Editing(record) => (record.clone(), false),
            LifecycleState::Idle | LifecycleState::Viewing(_) => {
                debug!(
                    lifecycle = self.lifecycle.phase().as_str(),
                    "save ignored outside the form"
                );
                return Vec::new();
            }
        };

        self.form.clear_errors(&self.settings.field_invalid_class);
        let errors = {
            let mut target = record.borrow_mut();
            target.begin_edit();
            self.form.update_record(&mut *target);
            let errors = target.validate();
            if errors.is_empty() {
                target.end_edit();
            } else {
                target.cancel_edit();
            }
            errors
        };

        if !errors.is_empty() {
            for error in &errors {
                let shown = self.form.mark_invalid(
                    &error.field,
                    &error.message,
                    &self.settings.field_invalid_class,
                    &self.settings.error_message,
                );
                if !shown {
                    debug!(field = %error.field, "no editor for validation error");
                }
            }
            debug!(errors = errors.len(), "validation failed");
            return vec![CrudEvent::ValidationFailed(errors)];
        }

        let mut events = Vec::new();
        if adding {
            collection.borrow_mut().add(record.clone());
            info!("record inserted");
            events.push(CrudEvent::RecordInserted);
        } else {
            info!("record committed");
            events.push(CrudEvent::RecordCommitted);
        }
        if self
            .detail_record
            .as_ref()
            .is_some_and(|shown| same_record(shown, &record))
        {
            self.detail_record = Some(record);
        }
        events.extend(self.pop());
        events
    }

    /// Asks for confirmation before removing `record`. A synchronous answer
    /// is applied at once; otherwise the request waits for
    /// [`CrudView::answer_confirmation`]. A new request supersedes any
    /// unanswered one.
    pub fn delete(&mut self, record: Shared<C::Record>) -> Vec<CrudEvent> {
        self.pending_delete = None;
        self.next_token += 1;
        let token = ConfirmToken::new(self.next_token);
        let request = ConfirmRequest {
            token,
            message: self.settings.delete_confirm_text.clone(),
        };
        debug!(token = token.get(), "delete confirmation requested");

        let mut events = vec![CrudEvent::ConfirmationRequested(token)];
        match self.prompt.confirm(&request) {
            Some(response) => events.extend(self.resolve_delete(record, response)),
            None => self.pending_delete = Some((token, record)),
        }
        events
    }

    /// Resumes a deferred delete. Unknown or superseded tokens are ignored.
    pub fn answer_confirmation(
        &mut self,
        token: ConfirmToken,
        response: ConfirmResponse,
    ) -> Vec<CrudEvent> {
        match self.pending_delete.take() {
            Some((pending, record)) if pending == token => self.resolve_delete(record, response),
            other => {
                self.pending_delete = other;
                debug!(token = token.get(), "ignored stale confirmation");
                Vec::new()
            }
        }
    }

    fn resolve_delete(
        &mut self,
        record: Shared<C::Record>,
        response: ConfirmResponse,
    ) -> Vec<CrudEvent> {
        if response == ConfirmResponse::No {
            debug!("delete declined");
            return Vec::new();
        }
        let Some(collection) = self.collection.clone() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        if collection.borrow_mut().remove(&record) {
            info!("record removed");
            events.push(CrudEvent::RecordRemoved);
        }
        if self.nav.active() == SurfaceKind::Detail {
            events.extend(self.pop());
        }
        events
    }

    pub fn back(&mut self) -> Vec<CrudEvent> {
        self.pop()
    }

    /// Recomputes whether Save is enabled: always while adding, and while
    /// editing only when the form differs from the snapshot taken on entry.
    pub fn on_form_field_activity(&mut self) -> Vec<CrudEvent> {
        self.debouncer.cancel();
        let enabled = match &self.lifecycle {
            LifecycleState::Adding => true,
            LifecycleState::Editing(_) => self
                .snapshot
                .as_ref()
                .is_none_or(|snapshot| !same_values(snapshot, &self.form.values())),
            LifecycleState::Idle | LifecycleState::Viewing(_) => return Vec::new(),
        };
        self.set_save_enabled(enabled).into_iter().collect()
    }

    /// Stores a value in the named editor and schedules a debounced
    /// recomputation. Returns false when no editor has that name.
    pub fn note_field_change(&mut self, name: &str, value: FieldValue, now: Instant) -> bool {
        let changed = self.form.set_value(name, value);
        if changed {
            self.debouncer.touch(now);
        }
        changed
    }

    /// Like [`CrudView::note_field_change`] with raw editor text.
    pub fn note_field_input(&mut self, name: &str, raw: &str, now: Instant) -> bool {
        let changed = self.form.set_input(name, raw);
        if changed {
            self.debouncer.touch(now);
        }
        changed
    }

    pub fn note_field_activity(&mut self, now: Instant) {
        self.debouncer.touch(now);
    }

    /// Runs the debounced recomputation once the quiet window has passed.
    pub fn poll(&mut self, now: Instant) -> Vec<CrudEvent> {
        if self.debouncer.poll(now) {
            self.on_form_field_activity()
        } else {
            Vec::new()
        }
    }

    fn actionable(&self, action: ActionKind) -> bool {
        self.buttons.get(action).is_actionable()
    }

    fn set_save_enabled(&mut self, enabled: bool) -> Option<CrudEvent> {
        if self.buttons.save.enabled == enabled {
            return None;
        }
        self.buttons.save.enabled = enabled;
        Some(CrudEvent::SaveEnabledChanged(enabled))
    }

    fn push(&mut self, surface: SurfaceKind) -> Vec<CrudEvent> {
        if !self.nav.push(surface) {
            return vec![CrudEvent::TitleChanged(self.title())];
        }
        debug!(
            surface = surface.label(),
            depth = self.nav.depth(),
            "pushed surface"
        );
        let mut events = vec![CrudEvent::SurfacePushed(surface)];
        events.extend(self.surface_events());
        events
    }

    fn pop(&mut self) -> Vec<CrudEvent> {
        let Some(popped) = self.nav.pop() else {
            return Vec::new();
        };
        match popped {
            SurfaceKind::Form => {
                self.snapshot = None;
                self.form_record = None;
                self.debouncer.cancel();
            }
            SurfaceKind::Detail => self.pending_delete = None,
            SurfaceKind::List => {}
        }
        if self.nav.active() == SurfaceKind::List {
            self.detail_record = None;
        }
        self.lifecycle = match (self.nav.active(), self.detail_record.clone()) {
            (SurfaceKind::Detail, Some(record)) => LifecycleState::Viewing(record),
            _ => LifecycleState::Idle,
        };
        debug!(
            surface = popped.label(),
            depth = self.nav.depth(),
            "popped surface"
        );

        let mut events = vec![CrudEvent::SurfacePopped(popped)];
        events.extend(self.surface_events());
        events
    }

    fn surface_events(&mut self) -> Vec<CrudEvent> {
        let active = self.nav.active();
        self.buttons.apply_visibility(active);
        vec![
            CrudEvent::ActiveSurfaceChanged(active),
            CrudEvent::ButtonsChanged(self.buttons.clone()),
            CrudEvent::TitleChanged(self.title()),
        ]
    }

    /// Empties surfaces that still hold generated content so nothing bound to
    /// an earlier schema survives when the new one is missing.
    fn discard_generated(&mut self) {
        if self.detail.is_generated() {
            self.detail = DetailSurface::default();
        }
        if self.form.is_generated() {
            self.form = FormSurface::default();
        }
    }

    fn regenerate(&mut self) -> Vec<CrudEvent> {
        let Some(collection) = self.collection.clone() else {
            return Vec::new();
        };
        let collection = collection.borrow();
        let schema = collection.schema();
        let detail = generate_detail(&mut self.detail, schema);
        let form = generate_form(&mut self.form, schema);
        if detail || form {
            vec![CrudEvent::SurfacesRegenerated { detail, form }]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CrudCommand, CrudEvent, CrudView, Lifecycle, ViewSettings};
    use crate::{
        ConfirmResponse, ConfirmToken, DeferredPrompt, Editor, EditorKind, Field, FieldValue,
        FormSurface, MemoryCollection, Model, Record, Schema, Shared, SurfaceKind, record_data,
        shared,
    };
    use crate::model::Collection;
    use std::time::{Duration, Instant};

    type View = CrudView<MemoryCollection, DeferredPrompt>;

    fn people() -> Shared<MemoryCollection> {
        let schema = Schema::new(vec![
            Field::integer("id"),
            Field::text("firstName"),
            Field::integer("age"),
        ])
        .with_id_field("id");
        let mut collection = MemoryCollection::new("Person", Model::new(schema)).with_id("people");
        collection.insert(record_data([
            ("firstName", FieldValue::from("Grace")),
            ("age", FieldValue::Int(45)),
        ]));
        shared(collection)
    }

    fn view_with_people() -> (View, Shared<MemoryCollection>) {
        let collection = people();
        let settings = ViewSettings {
            title_field: Some("firstName".to_owned()),
            ..ViewSettings::default()
        };
        let mut view = View::with_settings(settings, DeferredPrompt::default());
        view.set_collection(Some(collection.clone()));
        (view, collection)
    }

    #[test]
    fn fresh_view_sits_on_empty_list() {
        let view = View::new(DeferredPrompt::default());
        assert_eq!(view.active_surface(), SurfaceKind::List);
        assert_eq!(view.lifecycle(), Lifecycle::Idle);
        assert_eq!(view.title(), "");
        assert!(view.buttons().add.visible);
        assert!(view.list_items().is_empty());
    }

    #[test]
    fn push_reports_surface_then_buttons_then_title() {
        let (mut view, _collection) = view_with_people();
        let events = view.dispatch(CrudCommand::TapListItem(0));
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], CrudEvent::SurfacePushed(SurfaceKind::Detail));
        assert_eq!(events[1], CrudEvent::ActiveSurfaceChanged(SurfaceKind::Detail));
        assert!(matches!(&events[2], CrudEvent::ButtonsChanged(buttons) if buttons.edit.visible));
        assert_eq!(events[3], CrudEvent::TitleChanged("Grace".to_owned()));
        assert_eq!(view.lifecycle(), Lifecycle::Viewing);
    }

    #[test]
    fn out_of_range_tap_is_ignored() {
        let (mut view, _collection) = view_with_people();
        assert!(view.dispatch(CrudCommand::TapListItem(9)).is_empty());
        assert_eq!(view.active_surface(), SurfaceKind::List);
    }

    #[test]
    fn hidden_actions_are_ignored() {
        let (mut view, _collection) = view_with_people();
        assert!(view.dispatch(CrudCommand::TapSave).is_empty());
        assert!(view.dispatch(CrudCommand::TapEdit).is_empty());
        assert!(view.dispatch(CrudCommand::TapDelete).is_empty());
        assert!(view.dispatch(CrudCommand::TapBack).is_empty());
    }

    #[test]
    fn disabled_save_is_ignored() {
        let (mut view, collection) = view_with_people();
        let record = collection.borrow().records()[0].clone();
        view.select_for_view(record.clone());
        view.begin_edit(record);
        assert!(!view.save_enabled());
        assert!(view.dispatch(CrudCommand::TapSave).is_empty());
        assert_eq!(view.active_surface(), SurfaceKind::Form);
    }

    #[test]
    fn deferred_delete_waits_for_matching_token() {
        let (mut view, collection) = view_with_people();
        view.dispatch(CrudCommand::TapListItem(0));
        let events = view.dispatch(CrudCommand::TapDelete);
        let Some(CrudEvent::ConfirmationRequested(token)) = events.first().cloned() else {
            panic!("expected a confirmation request");
        };
        assert_eq!(view.prompt().requests[0].message, "Delete this record?");
        assert_eq!(collection.borrow().len(), 1);

        let stale = ConfirmToken::new(token.get() + 1);
        assert!(view.answer_confirmation(stale, ConfirmResponse::Yes).is_empty());
        assert_eq!(view.pending_confirmation(), Some(token));

        let events = view.answer_confirmation(token, ConfirmResponse::Yes);
        assert_eq!(events[0], CrudEvent::RecordRemoved);
        assert!(collection.borrow().is_empty());
        assert_eq!(view.active_surface(), SurfaceKind::List);
        assert_eq!(view.pending_confirmation(), None);
    }

    #[test]
    fn dismissed_prompt_leaves_everything_in_place() {
        let (mut view, collection) = view_with_people();
        view.dispatch(CrudCommand::TapListItem(0));
        view.dispatch(CrudCommand::TapDelete);
        view.dispatch(CrudCommand::TapBack);
        assert_eq!(collection.borrow().len(), 1);
        assert_eq!(view.active_surface(), SurfaceKind::List);
    }

    #[test]
    fn swapping_collection_resets_stack_and_selection() {
        let (mut view, _collection) = view_with_people();
        view.dispatch(CrudCommand::TapListItem(0));
        view.dispatch(CrudCommand::TapEdit);
        assert_eq!(view.stack().depth(), 3);

        let other = Schema::new(vec![Field::text("title"), Field::boolean("done")]);
        let tasks = shared(MemoryCollection::new("Task", Model::new(other)));
        let events = view.set_collection(Some(tasks));
        assert_eq!(events[0], CrudEvent::CollectionChanged);
        assert!(events.contains(&CrudEvent::SurfacesRegenerated {
            detail: true,
            form: true
        }));
        assert_eq!(view.active_surface(), SurfaceKind::List);
        assert_eq!(view.lifecycle(), Lifecycle::Idle);
        assert!(view.detail_record().is_none());
        assert_eq!(view.title(), "Task");
        let names: Vec<&str> = view.form().editors().into_iter().map(Editor::name).collect();
        assert_eq!(names, vec!["title", "done"]);
    }

    #[test]
    fn derived_title_field_follows_the_collection() {
        let mut view = View::new(DeferredPrompt::default());
        assert_eq!(view.title_field(), None);
        view.set_collection(Some(people()));
        assert_eq!(view.title_field().as_deref(), Some("id"));

        let tasks = Schema::new(vec![Field::text("title")]);
        view.set_collection(Some(shared(MemoryCollection::new("Task", Model::new(tasks)))));
        assert_eq!(view.title_field().as_deref(), Some("title"));
    }

    #[test]
    fn detaching_collection_drops_generated_surfaces() {
        let (mut view, _collection) = view_with_people();
        assert!(view.form().is_generated());
        view.set_collection(None);
        assert!(view.form().editors().is_empty());
        assert!(view.detail().template().is_none());
        assert_eq!(view.title(), "");
    }

    #[test]
    fn replacing_form_returns_previous_without_marker() {
        let (mut view, _collection) = view_with_people();
        let custom = FormSurface::from_editors(vec![Editor::new("age", "Age", EditorKind::Number)]);
        let previous = view.replace_form(custom.clone());
        assert!(!previous.is_generated());
        assert_eq!(previous.editors().len(), 2);
        assert_eq!(view.form(), &custom);

        view.set_collection(Some(people()));
        assert_eq!(view.form(), &custom);
    }

    #[test]
    fn empty_replacement_form_is_generated() {
        let (mut view, _collection) = view_with_people();
        view.replace_form(FormSurface::default());
        assert!(view.form().is_generated());
        assert_eq!(view.form().editors().len(), 2);
    }

    #[test]
    fn debounced_activity_recomputes_after_quiet_window() {
        let (mut view, collection) = view_with_people();
        let record = collection.borrow().records()[0].clone();
        view.select_for_view(record.clone());
        view.begin_edit(record);

        let start = Instant::now();
        assert!(view.note_field_input("age", "46", start));
        assert!(!view.note_field_input("height", "180", start));
        assert!(view.poll(start + Duration::from_millis(50)).is_empty());
        assert!(!view.save_enabled());

        let events = view.poll(start + Duration::from_millis(100));
        assert_eq!(events, vec![CrudEvent::SaveEnabledChanged(true)]);
        assert!(view.field_activity_deadline().is_none());
    }

    #[test]
    fn back_from_edit_discards_form_state() {
        let (mut view, collection) = view_with_people();
        let record = collection.borrow().records()[0].clone();
        view.select_for_view(record.clone());
        view.begin_edit(record.clone());
        view.note_field_change("firstName", FieldValue::from("Hopper"), Instant::now());
        view.back();

        assert_eq!(view.active_surface(), SurfaceKind::Detail);
        assert_eq!(view.lifecycle(), Lifecycle::Viewing);
        assert!(view.form_record().is_none());
        assert!(view.field_activity_deadline().is_none());
        assert_eq!(
            record.borrow().get("firstName"),
            Some(FieldValue::from("Grace"))
        );
    }

    #[test]
    fn settings_drive_titles() {
        let settings = ViewSettings {
            display_name: Some("Staff".to_owned()),
            add_title: "New person".to_owned(),
            ..ViewSettings::default()
        };
        let mut view = View::with_settings(settings, DeferredPrompt::default());
        view.set_collection(Some(people()));
        assert_eq!(view.title(), "Staff");
        view.begin_add();
        assert_eq!(view.title(), "New person");
        assert_eq!(view.lifecycle(), Lifecycle::Adding);
    }

    #[test]
    fn configured_title_field_overrides_schema() {
        let (mut view, collection) = view_with_people();
        view.set_title_field(Some("age".to_owned()));
        let record = collection.borrow().records()[0].clone();
        view.select_for_view(record.clone());
        assert_eq!(view.title(), "45");
        view.begin_edit(record);
        assert_eq!(view.title(), "Edit 45");
    }
}
