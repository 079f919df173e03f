// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    ActionKind, ButtonStates, DEFAULT_ADD_TITLE, DEFAULT_DELETE_CONFIRM_TEXT,
    DEFAULT_EDIT_TITLE_PREFIX, DEFAULT_ERROR_MESSAGE_CLASS, DEFAULT_FIELD_INVALID_CLASS,
    DetailSurface, DetailTemplate, Editor, EditorKind, ErrorMessageStyle, FormSurface,
    ListSurface, Template, ViewSettings,
};

pub const APP_NAME: &str = "crudview";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_DEBOUNCE: &str = "100ms";

#[derive(Debug, Clone, Deserialize)]
pub struct CrudConfig {
    pub version: i64,
    pub display_name: Option<String>,
    pub title_field: Option<String>,
    pub add_title: Option<String>,
    pub detail_title_template: Option<Template>,
    pub edit_title_template: Option<Template>,
    pub delete_confirm_text: Option<String>,
    pub field_invalid_class: Option<String>,
    pub field_change_debounce: Option<String>,
    #[serde(default)]
    pub error_message: ErrorMessageConfig,
    #[serde(default)]
    pub buttons: ButtonsConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub detail: DetailConfig,
    #[serde(default)]
    pub form: FormConfig,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            display_name: None,
            title_field: None,
            add_title: Some(DEFAULT_ADD_TITLE.to_owned()),
            detail_title_template: None,
            edit_title_template: None,
            delete_confirm_text: Some(DEFAULT_DELETE_CONFIRM_TEXT.to_owned()),
            field_invalid_class: Some(DEFAULT_FIELD_INVALID_CLASS.to_owned()),
            field_change_debounce: Some(DEFAULT_DEBOUNCE.to_owned()),
            error_message: ErrorMessageConfig::default(),
            buttons: ButtonsConfig::default(),
            list: ListConfig::default(),
            detail: DetailConfig::default(),
            form: FormConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorMessageConfig {
    pub class: Option<String>,
    pub template: Option<Template>,
}

impl Default for ErrorMessageConfig {
    fn default() -> Self {
        Self {
            class: Some(DEFAULT_ERROR_MESSAGE_CLASS.to_owned()),
            template: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ButtonsConfig {
    pub add: Option<String>,
    pub delete: Option<String>,
    pub edit: Option<String>,
    pub save: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListConfig {
    pub item_template: Option<Template>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailConfig {
    pub template: Option<Template>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub fields: Vec<FormFieldConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormFieldConfig {
    pub name: String,
    pub label: Option<String>,
    pub editor: Option<String>,
}

impl CrudConfig {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("CRUDVIEW_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set CRUDVIEW_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::parse(&raw, path)
    }

    /// Parses TOML text; `origin` only labels error messages.
    pub fn parse(raw: &str, origin: &Path) -> Result<Self> {
        let value: toml::Value = toml::from_str(raw)
            .with_context(|| format!("parse TOML config {}", origin.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = {CONFIG_VERSION}` at the top",
                    origin.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = {CONFIG_VERSION}",
                version,
                origin.display()
            );
        }

        let config: CrudConfig = value
            .try_into()
            .with_context(|| format!("decode config {}", origin.display()))?;
        config.validate(origin)?;
        Ok(config)
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        if let Some(debounce) = &self.field_change_debounce {
            let parsed = parse_duration(debounce)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "field_change_debounce in {} must be positive, got {}",
                    origin.display(),
                    debounce
                );
            }
        }

        for (index, field) in self.form.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                bail!(
                    "form.fields[{index}] in {} has an empty name",
                    origin.display()
                );
            }
            if let Some(editor) = &field.editor
                && EditorKind::parse(editor).is_none()
            {
                bail!(
                    "form.fields[{index}].editor in {} is {:?}; use one of: toggle, date_picker, number, text",
                    origin.display(),
                    editor
                );
            }
        }

        Ok(())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn title_field(&self) -> Option<&str> {
        self.title_field.as_deref().filter(|name| !name.is_empty())
    }

    pub fn add_title(&self) -> &str {
        self.add_title.as_deref().unwrap_or(DEFAULT_ADD_TITLE)
    }

    pub fn detail_title_template(&self) -> Template {
        self.detail_title_template
            .clone()
            .unwrap_or_else(Template::record_title)
    }

    pub fn edit_title_template(&self) -> Template {
        self.edit_title_template
            .clone()
            .unwrap_or_else(|| Template::prefixed_record_title(DEFAULT_EDIT_TITLE_PREFIX))
    }

    pub fn delete_confirm_text(&self) -> &str {
        self.delete_confirm_text
            .as_deref()
            .unwrap_or(DEFAULT_DELETE_CONFIRM_TEXT)
    }

    pub fn field_invalid_class(&self) -> &str {
        self.field_invalid_class
            .as_deref()
            .unwrap_or(DEFAULT_FIELD_INVALID_CLASS)
    }

    pub fn field_change_debounce(&self) -> Result<Duration> {
        parse_duration(
            self.field_change_debounce
                .as_deref()
                .unwrap_or(DEFAULT_DEBOUNCE),
        )
    }

    pub fn error_message_style(&self) -> ErrorMessageStyle {
        let fallback = ErrorMessageStyle::default();
        ErrorMessageStyle {
            class: self.error_message.class.clone().unwrap_or(fallback.class),
            template: self
                .error_message
                .template
                .clone()
                .unwrap_or(fallback.template),
        }
    }

    pub fn view_settings(&self) -> Result<ViewSettings> {
        Ok(ViewSettings {
            display_name: self.display_name().map(str::to_owned),
            title_field: self.title_field().map(str::to_owned),
            add_title: self.add_title().to_owned(),
            detail_title: self.detail_title_template(),
            edit_title: self.edit_title_template(),
            delete_confirm_text: self.delete_confirm_text().to_owned(),
            field_invalid_class: self.field_invalid_class().to_owned(),
            error_message: self.error_message_style(),
            field_change_debounce: self.field_change_debounce()?,
        })
    }

    pub fn buttons(&self) -> ButtonStates {
        let mut buttons = ButtonStates::default();
        for (action, label) in [
            (ActionKind::Add, &self.buttons.add),
            (ActionKind::Delete, &self.buttons.delete),
            (ActionKind::Edit, &self.buttons.edit),
            (ActionKind::Save, &self.buttons.save),
        ] {
            if let Some(label) = label {
                buttons.get_mut(action).text = label.clone();
            }
        }
        buttons
    }

    pub fn list_surface(&self) -> ListSurface {
        self.list
            .item_template
            .clone()
            .map(ListSurface::new)
            .unwrap_or_default()
    }

    /// A custom detail when a template is configured, otherwise an empty one
    /// left for schema generation.
    pub fn detail_surface(&self) -> DetailSurface {
        self.detail
            .template
            .clone()
            .map(|template| DetailSurface::custom(DetailTemplate::Custom(template)))
            .unwrap_or_default()
    }

    pub fn form_surface(&self) -> FormSurface {
        let editors = self
            .form
            .fields
            .iter()
            .map(|field| {
                let kind = field
                    .editor
                    .as_deref()
                    .and_then(EditorKind::parse)
                    .unwrap_or(EditorKind::Text);
                let label = field.label.clone().unwrap_or_else(|| field.name.clone());
                Editor::new(field.name.clone(), label, kind)
            })
            .collect();
        FormSurface::from_editors(editors)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# {APP_NAME} config\n# Place this file at: {}\n\nversion = {CONFIG_VERSION}\n\n# display_name = \"People\"\n# title_field = \"lastName\"\nadd_title = \"{DEFAULT_ADD_TITLE}\"\ndetail_title_template = \"{{@title}}\"\nedit_title_template = \"{DEFAULT_EDIT_TITLE_PREFIX}{{@title}}\"\ndelete_confirm_text = \"{DEFAULT_DELETE_CONFIRM_TEXT}\"\nfield_invalid_class = \"{DEFAULT_FIELD_INVALID_CLASS}\"\nfield_change_debounce = \"{DEFAULT_DEBOUNCE}\"\n\n[error_message]\nclass = \"{DEFAULT_ERROR_MESSAGE_CLASS}\"\ntemplate = \"{{message}}\"\n\n[buttons]\nadd = \"Add\"\ndelete = \"Delete\"\nedit = \"Edit\"\nsave = \"Save\"\n\n[list]\n# item_template = \"{{lastName}}, {{firstName}}\"\n\n[detail]\n# template = \"{{firstName}} is {{age}} years old\"\n\n# [[form.fields]]\n# name = \"firstName\"\n# label = \"First\"\n# editor = \"text\"\n",
            path.display(),
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid debounce duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid debounce duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s (for example 100ms)")
}

#[cfg(test)]
mod tests {
    use super::{CrudConfig, parse_duration};
    use crate::{EditorKind, FieldValue, Template, record_data};
    use anyhow::Result;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = CrudConfig::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.add_title(), "Add");
        assert_eq!(config.delete_confirm_text(), "Delete this record?");
        assert_eq!(config.field_invalid_class(), "x-field-invalid");
        assert_eq!(config.field_change_debounce()?, Duration::from_millis(100));
        assert_eq!(config.edit_title_template().source(), "Edit {@title}");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("add_title = \"New\"\n")?;
        let error = CrudConfig::load(&path).expect_err("unversioned config should fail");
        assert!(error.to_string().contains("version = 1"));
        Ok(())
    }

    #[test]
    fn future_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 7\n")?;
        let error = CrudConfig::load(&path).expect_err("unknown version should fail");
        assert!(error.to_string().contains("unsupported config version 7"));
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\ndisplay_name = \"People\"\ntitle_field = \"lastName\"\nadd_title = \"New person\"\ndetail_title_template = \"{firstName} {lastName}\"\nfield_change_debounce = \"250ms\"\n[error_message]\nclass = \"oops\"\ntemplate = \"{field}: {message}\"\n[buttons]\nsave = \"Done\"\n[list]\nitem_template = \"{lastName}, {firstName}\"\n[[form.fields]]\nname = \"firstName\"\nlabel = \"First\"\n[[form.fields]]\nname = \"age\"\neditor = \"number\"\n",
        )?;

        let config = CrudConfig::load(&path)?;
        assert_eq!(config.display_name(), Some("People"));
        assert_eq!(config.title_field(), Some("lastName"));
        assert_eq!(config.add_title(), "New person");
        assert_eq!(config.field_change_debounce()?, Duration::from_millis(250));
        assert_eq!(config.buttons().save.text, "Done");
        assert_eq!(config.buttons().add.text, "Add");

        let style = config.error_message_style();
        assert_eq!(style.class, "oops");
        assert_eq!(style.template, Template::parse("{field}: {message}")?);

        let data = record_data([("firstName", FieldValue::from("Ada")), ("lastName", "Lovelace".into())]);
        assert_eq!(config.detail_title_template().apply(&data, None), "Ada Lovelace");
        assert_eq!(
            config.list_surface().item_template().apply(&data, None),
            "Lovelace, Ada"
        );

        let form = config.form_surface();
        assert!(!form.needs_generation());
        let editors: Vec<(&str, &str, EditorKind)> = form
            .editors()
            .into_iter()
            .map(|editor| (editor.name(), editor.label(), editor.kind()))
            .collect();
        assert_eq!(
            editors,
            vec![
                ("firstName", "First", EditorKind::Text),
                ("age", "age", EditorKind::Number),
            ]
        );
        Ok(())
    }

    #[test]
    fn default_config_matches_default_view_settings() -> Result<()> {
        assert_eq!(CrudConfig::default().view_settings()?, crate::ViewSettings::default());
        Ok(())
    }

    #[test]
    fn default_surfaces_are_left_for_generation() {
        let config = CrudConfig::default();
        assert!(config.detail_surface().needs_generation());
        assert!(config.form_surface().needs_generation());
    }

    #[test]
    fn configured_detail_template_is_custom() -> Result<()> {
        let config = CrudConfig::parse(
            "version = 1\n[detail]\ntemplate = \"{age} years\"\n",
            Path::new("inline.toml"),
        )?;
        assert!(!config.detail_surface().needs_generation());
        Ok(())
    }

    #[test]
    fn malformed_template_reports_decode_error() -> Result<()> {
        let (_temp, path) = write_config("version = 1\nadd_title = \"x\"\nedit_title_template = \"Edit {name\"\n")?;
        let error = CrudConfig::load(&path).expect_err("bad template should fail");
        assert!(format!("{error:#}").contains("unterminated placeholder"));
        Ok(())
    }

    #[test]
    fn unknown_editor_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[[form.fields]]\nname = \"age\"\neditor = \"slider\"\n")?;
        let error = CrudConfig::load(&path).expect_err("unknown editor should fail");
        assert!(error.to_string().contains("slider"));
        Ok(())
    }

    #[test]
    fn zero_debounce_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\nfield_change_debounce = \"0ms\"\n")?;
        let error = CrudConfig::load(&path).expect_err("zero debounce should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = CrudConfig::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn duration_parser_accepts_ms_and_seconds() -> Result<()> {
        assert_eq!(parse_duration("150ms")?, Duration::from_millis(150));
        assert_eq!(parse_duration("2s")?, Duration::from_secs(2));
        assert!(parse_duration("fast").is_err());
        Ok(())
    }

    #[test]
    fn env_override_sets_default_path() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("custom.toml");
        // SAFETY: tests touching the environment hold ENV_LOCK.
        unsafe { std::env::set_var("CRUDVIEW_CONFIG_PATH", &path) };
        let resolved = CrudConfig::default_path();
        unsafe { std::env::remove_var("CRUDVIEW_CONFIG_PATH") };
        assert_eq!(resolved?, path);
        Ok(())
    }

    #[test]
    fn example_config_parses_and_round_trips_defaults() -> Result<()> {
        let text = CrudConfig::example_config(Path::new("/tmp/crudview/config.toml"));
        let config = CrudConfig::parse(&text, Path::new("example.toml"))?;
        assert_eq!(config.add_title(), "Add");
        assert_eq!(config.edit_title_template(), Template::prefixed_record_title("Edit "));
        assert!(config.form_surface().needs_generation());
        Ok(())
    }
}
