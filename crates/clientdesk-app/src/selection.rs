// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ClientId;

pub const DELETE_PROMPT: &str = "Delete this client? This cannot be undone.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: ClientId,
    pub prompt: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub id: ClientId,
}

/// The single selected record and the two-step delete protocol around it:
/// `request_delete` raises a confirmation, then `confirm_delete` or
/// `cancel_delete` resolves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<ClientId>,
    confirmation: Option<DeleteConfirmation>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ClientId> {
        self.current.as_ref()
    }

    pub fn is_selected(&self, id: &ClientId) -> bool {
        self.current.as_ref() == Some(id)
    }

    /// Selects `id`, replacing any previous selection. A pending delete
    /// confirmation belongs to the old selection and is dropped.
    pub fn select(&mut self, id: ClientId) {
        self.confirmation = None;
        self.current = Some(id);
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.confirmation = None;
    }

    pub fn request_delete(&mut self) -> Option<&DeleteConfirmation> {
        let id = self.current.clone()?;
        self.confirmation = Some(DeleteConfirmation {
            id,
            prompt: DELETE_PROMPT,
        });
        self.confirmation.as_ref()
    }

    pub fn confirmation(&self) -> Option<&DeleteConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn confirm_delete(&mut self) -> Option<DeleteRequest> {
        let confirmation = self.confirmation.take()?;
        Some(DeleteRequest {
            id: confirmation.id,
        })
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.confirmation.take().is_some()
    }
}
