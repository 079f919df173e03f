// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    List,
    Detail,
    Form,
}

impl SurfaceKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Detail => "detail",
            Self::Form => "form",
        }
    }
}

/// Push/pop stack of surfaces. The list is the root and is never popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStack {
    stack: Vec<SurfaceKind>,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self {
            stack: vec![SurfaceKind::List],
        }
    }
}

impl NavigationStack {
    pub fn active(&self) -> SurfaceKind {
        self.stack.last().copied().unwrap_or(SurfaceKind::List)
    }

    pub fn surfaces(&self) -> &[SurfaceKind] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_at_root(&self) -> bool {
        self.stack.len() <= 1
    }

    /// Refuses to push the surface that is already on top.
    pub fn push(&mut self, surface: SurfaceKind) -> bool {
        if self.active() == surface {
            return false;
        }
        self.stack.push(surface);
        true
    }

    pub fn pop(&mut self) -> Option<SurfaceKind> {
        if self.is_at_root() {
            return None;
        }
        self.stack.pop()
    }

    /// Back to the root; true if anything was popped.
    pub fn reset(&mut self) -> bool {
        let popped = !self.is_at_root();
        self.stack.truncate(1);
        popped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Add,
    Delete,
    Edit,
    Save,
}

impl ActionKind {
    pub const ALL: [Self; 4] = [Self::Add, Self::Delete, Self::Edit, Self::Save];

    /// The only surface on which the action is shown.
    pub const fn home_surface(self) -> SurfaceKind {
        match self {
            Self::Add => SurfaceKind::List,
            Self::Delete | Self::Edit => SurfaceKind::Detail,
            Self::Save => SurfaceKind::Form,
        }
    }

    pub const fn default_label(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Delete => "Delete",
            Self::Edit => "Edit",
            Self::Save => "Save",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub visible: bool,
    pub enabled: bool,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: false,
            enabled: true,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.visible && self.enabled
    }
}

/// Navigation-bar actions. Visibility is a function of the active surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonStates {
    pub add: Button,
    pub delete: Button,
    pub edit: Button,
    pub save: Button,
}

impl Default for ButtonStates {
    fn default() -> Self {
        Self {
            add: Button::new(ActionKind::Add.default_label()),
            delete: Button::new(ActionKind::Delete.default_label()),
            edit: Button::new(ActionKind::Edit.default_label()),
            save: Button::new(ActionKind::Save.default_label()),
        }
    }
}

impl ButtonStates {
    pub fn get(&self, action: ActionKind) -> &Button {
        match action {
            ActionKind::Add => &self.add,
            ActionKind::Delete => &self.delete,
            ActionKind::Edit => &self.edit,
            ActionKind::Save => &self.save,
        }
    }

    pub fn get_mut(&mut self, action: ActionKind) -> &mut Button {
        match action {
            ActionKind::Add => &mut self.add,
            ActionKind::Delete => &mut self.delete,
            ActionKind::Edit => &mut self.edit,
            ActionKind::Save => &mut self.save,
        }
    }

    /// Shows exactly the actions whose home is `active`; enablement is kept.
    pub fn apply_visibility(&mut self, active: SurfaceKind) {
        for action in ActionKind::ALL {
            self.get_mut(action).visible = action.home_surface() == active;
        }
    }

    pub fn visible_actions(&self) -> Vec<ActionKind> {
        ActionKind::ALL
            .into_iter()
            .filter(|action| self.get(*action).visible)
            .collect()
    }
}
