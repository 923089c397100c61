// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Optimistic inline editing.
//!
//! A cell moves Idle → Editing (draft buffered, store untouched) → Committing
//! (draft dropped, record snapshotted, value applied to the store, save
//! request emitted) → Reconciled or RolledBack → Idle. Flags skip Editing.
//!
//! Every commit gets an [`EditTicket`] from one increasing sequence. Only the
//! newest pending ticket of a cell may reconcile or roll back that cell. A
//! reconcile makes older pending tickets of the cell stale. A rollback hands
//! the cell back to the newest older ticket still pending, whose completion
//! then settles the cell.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::codec::{display_text, parse_cell_text};
use crate::{Client, ClientField, ClientId, FieldKind, FieldPatch, FieldValue, RecordStore};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub id: ClientId,
    pub field: ClientField,
}

impl CellKey {
    pub fn new(id: impl Into<ClientId>, field: ClientField) -> Self {
        Self {
            id: id.into(),
            field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditTicket(u64);

impl EditTicket {
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub ticket: EditTicket,
    pub id: ClientId,
    pub patch: FieldPatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPhase {
    Idle,
    Editing,
    Committing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Reconciled(CellKey),
    RolledBack(CellKey),
    /// A newer commit for the same cell superseded this one.
    Superseded(CellKey),
    UnknownTicket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingEdit {
    key: CellKey,
    snapshot: Client,
}

#[derive(Debug, Clone, Default)]
pub struct EditCoordinator {
    drafts: BTreeMap<CellKey, String>,
    pending: BTreeMap<EditTicket, PendingEdit>,
    latest: HashMap<CellKey, EditTicket>,
    next_ticket: u64,
}

impl EditCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self, key: &CellKey) -> CellPhase {
        if self.drafts.contains_key(key) {
            return CellPhase::Editing;
        }
        match self.latest.get(key) {
            Some(ticket) if self.pending.contains_key(ticket) => CellPhase::Committing,
            _ => CellPhase::Idle,
        }
    }

    pub fn draft(&self, key: &CellKey) -> Option<&str> {
        self.drafts.get(key).map(String::as_str)
    }

    pub fn drafts(&self) -> impl Iterator<Item = (&CellKey, &str)> {
        self.drafts.iter().map(|(key, text)| (key, text.as_str()))
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Stores the full input text for a cell. The first call moves the cell
    /// from Idle to Editing. Flag cells never hold drafts.
    pub fn update_draft(&mut self, key: CellKey, text: impl Into<String>) -> bool {
        if key.field.kind() == FieldKind::Flag {
            return false;
        }
        let text = text.into();
        if !self.drafts.contains_key(&key) {
            debug!(id = %key.id, field = key.field.as_str(), "cell editing");
        }
        self.drafts.insert(key, text);
        true
    }

    pub fn discard_draft(&mut self, key: &CellKey) -> bool {
        self.drafts.remove(key).is_some()
    }

    /// Blur/Enter on a cell. Without a draft nothing happens. The draft is
    /// always consumed; a record that is no longer in the store yields no
    /// request.
    pub fn commit(&mut self, store: &mut RecordStore, key: &CellKey) -> Option<SaveRequest> {
        let text = self.drafts.remove(key)?;
        let value = parse_cell_text(key.field.kind(), &text)?;
        self.begin_commit(store, key, value)
    }

    /// Checkbox toggle: the flipped value is committed immediately.
    pub fn toggle(
        &mut self,
        store: &mut RecordStore,
        id: &ClientId,
        field: ClientField,
    ) -> Option<SaveRequest> {
        let FieldValue::Flag(current) = store.get(id)?.value(field) else {
            return None;
        };
        let key = CellKey::new(id.clone(), field);
        self.begin_commit(store, &key, FieldValue::Flag(!current))
    }

    fn begin_commit(
        &mut self,
        store: &mut RecordStore,
        key: &CellKey,
        value: FieldValue,
    ) -> Option<SaveRequest> {
        let Some(snapshot) = store.get(&key.id).cloned() else {
            debug!(id = %key.id, field = key.field.as_str(), "commit dropped; record gone");
            return None;
        };

        store.find_and_map(&key.id, |client| client.with_value(key.field, value.clone()));

        self.next_ticket += 1;
        let ticket = EditTicket(self.next_ticket);
        self.pending.insert(
            ticket,
            PendingEdit {
                key: key.clone(),
                snapshot,
            },
        );
        self.latest.insert(key.clone(), ticket);
        debug!(
            id = %key.id,
            field = key.field.as_str(),
            ticket = ticket.get(),
            "cell committing"
        );

        Some(SaveRequest {
            ticket,
            id: key.id.clone(),
            patch: FieldPatch {
                field: key.field,
                value,
            },
        })
    }

    /// Successful save: the server's record replaces the stored one wholesale.
    pub fn reconcile(
        &mut self,
        store: &mut RecordStore,
        ticket: EditTicket,
        canonical: Client,
    ) -> EditOutcome {
        let Some(pending) = self.settle(ticket) else {
            return self.outcome_for_unsettled(ticket);
        };
        self.latest.remove(&pending.key);
        store.replace_one(&pending.key.id, canonical);
        info!(
            id = %pending.key.id,
            field = pending.key.field.as_str(),
            ticket = ticket.get(),
            "cell reconciled"
        );
        EditOutcome::Reconciled(pending.key)
    }

    /// Failed save: the record returns to its pre-edit snapshot, all fields.
    pub fn roll_back(&mut self, store: &mut RecordStore, ticket: EditTicket) -> EditOutcome {
        let Some(pending) = self.settle(ticket) else {
            return self.outcome_for_unsettled(ticket);
        };
        self.hand_back(&pending.key);
        store.replace_one(&pending.key.id, pending.snapshot);
        warn!(
            id = %pending.key.id,
            field = pending.key.field.as_str(),
            ticket = ticket.get(),
            "cell rolled back"
        );
        EditOutcome::RolledBack(pending.key)
    }

    /// What a cell shows: the live draft, else the stored value as text.
    pub fn cell_text(&self, store: &RecordStore, key: &CellKey) -> String {
        if let Some(draft) = self.draft(key) {
            return draft.to_owned();
        }
        store
            .get(&key.id)
            .map(|client| display_text(&client.value(key.field)))
            .unwrap_or_default()
    }

    /// Removes the pending entry for `ticket` and returns it only when it is
    /// still the newest commit for its cell. The caller decides what becomes
    /// of `latest`.
    fn settle(&mut self, ticket: EditTicket) -> Option<PendingEdit> {
        let pending = self.pending.get(&ticket)?;
        if self.latest.get(&pending.key) != Some(&ticket) {
            return None;
        }
        self.pending.remove(&ticket)
    }

    /// After a rollback the newest older ticket of `key` still in flight, if
    /// any, owns the cell again.
    fn hand_back(&mut self, key: &CellKey) {
        let previous = self
            .pending
            .iter()
            .rev()
            .find(|(_, pending)| pending.key == *key)
            .map(|(ticket, _)| *ticket);
        match previous {
            Some(ticket) => {
                debug!(
                    id = %key.id,
                    field = key.field.as_str(),
                    ticket = ticket.get(),
                    "cell handed back to earlier save"
                );
                self.latest.insert(key.clone(), ticket);
            }
            None => {
                self.latest.remove(key);
            }
        }
    }

    fn outcome_for_unsettled(&mut self, ticket: EditTicket) -> EditOutcome {
        match self.pending.remove(&ticket) {
            Some(stale) => {
                debug!(
                    id = %stale.key.id,
                    field = stale.key.field.as_str(),
                    ticket = ticket.get(),
                    "superseded save discarded"
                );
                EditOutcome::Superseded(stale.key)
            }
            None => EditOutcome::UnknownTicket,
        }
    }
}
