// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::mpsc::Receiver;

use tracing::{debug, info, warn};

use crate::{
    AuditPanel, CellKey, Change, ChangeFeed, Client, ClientField, ClientId, CreateField,
    CreateForm, Criterion, DeleteConfirmation, EditCoordinator, EditOutcome, EditTicket, Filter,
    RecordStore, Request, Response, Selection, build_query_params, chips, clear_criterion,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    FetchFailed,
    SaveFailed,
    CreateFailed,
    DeleteFailed,
    Invalid,
}

impl NoticeKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::FetchFailed => "load failed",
            Self::SaveFailed => "save failed",
            Self::CreateFailed => "create failed",
            Self::DeleteFailed => "delete failed",
            Self::Invalid => "invalid",
        }
    }
}

/// Transient error shown in the status line. `token` identifies this notice
/// for the delayed clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub token: u64,
}

/// Owns every piece of console state and hands out backend requests.
///
/// Nothing here blocks or performs I/O. Callers run the returned
/// [`Request`]s wherever they like and feed the completions back through
/// [`Console::apply`], in any order.
#[derive(Debug, Default)]
pub struct Console {
    store: RecordStore,
    edits: EditCoordinator,
    filter: Filter,
    audit: AuditPanel,
    selection: Selection,
    create_form: Option<CreateForm>,
    loading: bool,
    list_token: u64,
    create_token: u64,
    notice: Option<Notice>,
    notice_token: u64,
    feed: ChangeFeed,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<Change> {
        self.feed.subscribe()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn edits(&self) -> &EditCoordinator {
        &self.edits
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn audit(&self) -> &AuditPanel {
        &self.audit
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn confirmation(&self) -> Option<&DeleteConfirmation> {
        self.selection.confirmation()
    }

    pub fn create_form(&self) -> Option<&CreateForm> {
        self.create_form.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn cell_text(&self, id: &ClientId, field: ClientField) -> String {
        self.edits
            .cell_text(&self.store, &CellKey::new(id.clone(), field))
    }

    pub fn chips(&self) -> Vec<(Criterion, String)> {
        chips(&self.filter)
    }

    pub fn suggestions(&self, criterion: Criterion) -> Vec<String> {
        crate::suggestions(&self.store, criterion, self.filter.get(criterion))
    }

    // Filters and list fetches.

    /// Fetches the list for the current filter. Any earlier fetch still in
    /// flight becomes stale.
    pub fn refresh(&mut self) -> Request {
        self.list_token += 1;
        self.dismiss_notice();
        self.set_loading(true);
        let params = build_query_params(&self.filter);
        debug!(token = self.list_token, ?params, "list fetch");
        Request::ListClients {
            token: self.list_token,
            params,
        }
    }

    /// Updates one criterion without fetching.
    pub fn set_criterion(&mut self, criterion: Criterion, value: impl Into<String>) {
        self.filter.set(criterion, value);
        self.feed.publish(Change::Filter);
    }

    pub fn apply_suggestion(&mut self, criterion: Criterion, token: &str) {
        let merged = crate::apply_suggestion(self.filter.get(criterion), token);
        self.set_criterion(criterion, merged);
    }

    /// Removes one chip and refetches.
    pub fn clear_criterion(&mut self, criterion: Criterion) -> Request {
        self.filter = clear_criterion(&self.filter, criterion);
        self.feed.publish(Change::Filter);
        self.refresh()
    }

    pub fn clear_filters(&mut self) -> Request {
        self.filter = Filter::default();
        self.feed.publish(Change::Filter);
        self.refresh()
    }

    // Inline edits.

    pub fn edit_cell(&mut self, id: &ClientId, field: ClientField, text: impl Into<String>) -> bool {
        let changed = self
            .edits
            .update_draft(CellKey::new(id.clone(), field), text);
        if changed {
            self.feed.publish(Change::Drafts);
        }
        changed
    }

    pub fn discard_draft(&mut self, id: &ClientId, field: ClientField) -> bool {
        let discarded = self
            .edits
            .discard_draft(&CellKey::new(id.clone(), field));
        if discarded {
            self.feed.publish(Change::Drafts);
        }
        discarded
    }

    pub fn commit_cell(&mut self, id: &ClientId, field: ClientField) -> Option<Request> {
        let key = CellKey::new(id.clone(), field);
        if self.edits.draft(&key).is_none() {
            return None;
        }
        let request = self.edits.commit(&mut self.store, &key);
        self.feed.publish(Change::Drafts);
        let request = request?;
        self.feed.publish(Change::Records);
        Some(Request::SaveField(request))
    }

    pub fn toggle_flag(&mut self, id: &ClientId, field: ClientField) -> Option<Request> {
        let request = self.edits.toggle(&mut self.store, id, field)?;
        self.feed.publish(Change::Records);
        Some(Request::SaveField(request))
    }

    // Selection, audit and delete.

    pub fn select_record(&mut self, id: &ClientId) -> Request {
        let had_confirmation = self.selection.confirmation().is_some();
        self.selection.select(id.clone());
        let request = self.audit.begin(id.clone());
        self.feed.publish(Change::Selection);
        self.feed.publish(Change::Audit);
        if had_confirmation {
            self.feed.publish(Change::Confirmation);
        }
        Request::LoadAudit {
            token: request.token,
            id: request.id,
        }
    }

    pub fn request_delete(&mut self) -> bool {
        let raised = self.selection.request_delete().is_some();
        if raised {
            self.feed.publish(Change::Confirmation);
        }
        raised
    }

    pub fn confirm_delete(&mut self) -> Option<Request> {
        let request = self.selection.confirm_delete()?;
        self.dismiss_notice();
        self.feed.publish(Change::Confirmation);
        debug!(id = %request.id, "delete confirmed");
        Some(Request::DeleteClient { id: request.id })
    }

    pub fn cancel_delete(&mut self) -> bool {
        let cancelled = self.selection.cancel_delete();
        if cancelled {
            self.feed.publish(Change::Confirmation);
        }
        cancelled
    }

    // Create form.

    pub fn open_create_form(&mut self) {
        if self.create_form.is_none() {
            self.create_form = Some(CreateForm::default());
            self.feed.publish(Change::CreateForm);
        }
    }

    /// Closes the form and throws away what was typed.
    pub fn close_create_form(&mut self) {
        if self.create_form.take().is_some() {
            self.feed.publish(Change::CreateForm);
        }
    }

    pub fn set_create_field(&mut self, field: CreateField, value: impl Into<String>) {
        if let Some(form) = self.create_form.as_mut() {
            *form.get_mut(field) = value.into();
            self.feed.publish(Change::CreateForm);
        }
    }

    pub fn focus_create_field(&mut self, field: CreateField) {
        if let Some(form) = self.create_form.as_mut() {
            form.focus = field;
            self.feed.publish(Change::CreateForm);
        }
    }

    /// Validates the form and, when it passes, emits the create request.
    /// Validation failures become an `Invalid` notice.
    pub fn submit_create(&mut self) -> Option<Request> {
        let form = self.create_form.as_mut()?;
        if form.submitting {
            return None;
        }
        match form.validate() {
            Ok(input) => {
                form.submitting = true;
                self.create_token += 1;
                self.dismiss_notice();
                self.feed.publish(Change::CreateForm);
                Some(Request::CreateClient {
                    token: self.create_token,
                    input,
                })
            }
            Err(error) => {
                self.show_notice(NoticeKind::Invalid, error.to_string());
                None
            }
        }
    }

    // Completions.

    pub fn apply(&mut self, response: Response) {
        match response {
            Response::Clients { token, result } => self.apply_clients(token, result),
            Response::Audit { token, id, result } => self.apply_audit(token, &id, result),
            Response::Saved { ticket, id, result } => self.apply_saved(ticket, &id, result),
            Response::Created { token, result } => self.apply_created(token, result),
            Response::Deleted { id, result } => self.apply_deleted(&id, result),
        }
    }

    /// Drops the notice if `token` still names it. Later notices survive
    /// earlier timers.
    pub fn clear_notice(&mut self, token: u64) -> bool {
        if self.notice.as_ref().is_some_and(|notice| notice.token == token) {
            self.notice = None;
            self.feed.publish(Change::Notice);
            return true;
        }
        false
    }

    fn apply_clients(&mut self, token: u64, result: Result<Vec<Client>, String>) {
        if token != self.list_token {
            debug!(token, latest = self.list_token, "stale list response discarded");
            return;
        }
        self.set_loading(false);
        match result {
            Ok(records) => {
                debug!(count = records.len(), "list loaded");
                self.store.replace_all(records);
                self.feed.publish(Change::Records);
            }
            Err(error) => self.show_notice(NoticeKind::FetchFailed, error),
        }
    }

    fn apply_audit(
        &mut self,
        token: u64,
        id: &ClientId,
        result: Result<Vec<crate::AuditEntry>, String>,
    ) {
        match result {
            Ok(entries) => {
                if self.audit.accept(token, id, entries) {
                    self.feed.publish(Change::Audit);
                }
            }
            Err(error) => {
                if self.audit.fail(token, id) {
                    self.feed.publish(Change::Audit);
                    self.show_notice(NoticeKind::FetchFailed, error);
                }
            }
        }
    }

    fn apply_saved(&mut self, ticket: EditTicket, id: &ClientId, result: Result<Client, String>) {
        let result = result.and_then(|canonical| {
            if &canonical.id == id {
                Ok(canonical)
            } else {
                Err(format!(
                    "server returned record {} for {}",
                    canonical.id, id
                ))
            }
        });
        let (outcome, error) = match result {
            Ok(canonical) => (self.edits.reconcile(&mut self.store, ticket, canonical), None),
            Err(error) => (self.edits.roll_back(&mut self.store, ticket), Some(error)),
        };
        match outcome {
            EditOutcome::Reconciled(_) => self.feed.publish(Change::Records),
            EditOutcome::RolledBack(_) => {
                self.feed.publish(Change::Records);
                if let Some(error) = error {
                    self.show_notice(NoticeKind::SaveFailed, error);
                }
            }
            EditOutcome::Superseded(_) | EditOutcome::UnknownTicket => {}
        }
    }

    fn apply_created(&mut self, token: u64, result: Result<Client, String>) {
        if token != self.create_token {
            return;
        }
        match result {
            Ok(record) => {
                info!(id = %record.id, "client created");
                self.store.prepend(record);
                self.create_form = None;
                self.feed.publish(Change::Records);
                self.feed.publish(Change::CreateForm);
            }
            Err(error) => {
                if let Some(form) = self.create_form.as_mut() {
                    form.submitting = false;
                    self.feed.publish(Change::CreateForm);
                }
                self.show_notice(NoticeKind::CreateFailed, error);
            }
        }
    }

    fn apply_deleted(&mut self, id: &ClientId, result: Result<(), String>) {
        match result {
            Ok(()) => {
                info!(id = %id, "client deleted");
                if self.store.remove(id).is_some() {
                    self.feed.publish(Change::Records);
                }
                if self.selection.is_selected(id) {
                    self.selection.clear();
                    self.audit.clear();
                    self.feed.publish(Change::Selection);
                    self.feed.publish(Change::Audit);
                }
            }
            Err(error) => self.show_notice(NoticeKind::DeleteFailed, error),
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.feed.publish(Change::Loading);
        }
    }

    fn show_notice(&mut self, kind: NoticeKind, error: String) {
        self.notice_token += 1;
        let message = match kind {
            NoticeKind::Invalid => error,
            _ => format!("{}: {error}", kind.prefix()),
        };
        warn!(kind = kind.prefix(), %message, "notice");
        self.notice = Some(Notice {
            kind,
            message,
            token: self.notice_token,
        });
        self.feed.publish(Change::Notice);
    }

    fn dismiss_notice(&mut self) {
        if self.notice.take().is_some() {
            self.feed.publish(Change::Notice);
        }
    }
}
