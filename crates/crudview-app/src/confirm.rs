// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfirmToken(u64);

impl ConfirmToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResponse {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub token: ConfirmToken,
    pub message: String,
}

/// Asks the user a yes/no question. Returning `None` defers the answer: the
/// host later calls `CrudView::answer_confirmation` with the request token,
/// or never does if the prompt is dismissed.
pub trait ConfirmPrompt {
    fn confirm(&mut self, request: &ConfirmRequest) -> Option<ConfirmResponse>;
}

/// Prompt that always defers; answers arrive through the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredPrompt {
    pub requests: Vec<ConfirmRequest>,
}

impl ConfirmPrompt for DeferredPrompt {
    fn confirm(&mut self, request: &ConfirmRequest) -> Option<ConfirmResponse> {
        self.requests.push(request.clone());
        None
    }
}
