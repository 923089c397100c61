// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::{AuditEntry, ClientId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRequest {
    pub token: u64,
    pub id: ClientId,
}

/// Change history shown for the selected record.
///
/// Only the most recent fetch may fill the panel. Older fetches, including
/// ones for a record that has since been deselected, are ignored when they
/// complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditPanel {
    subject: Option<ClientId>,
    entries: Vec<AuditEntry>,
    loading: bool,
    token: u64,
}

impl AuditPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch for `id`, clearing whatever history was on screen.
    pub fn begin(&mut self, id: ClientId) -> AuditRequest {
        self.token = self.token.saturating_add(1);
        self.subject = Some(id.clone());
        self.entries.clear();
        self.loading = true;
        AuditRequest {
            token: self.token,
            id,
        }
    }

    /// Applies fetched entries when they answer the latest request. Returns
    /// whether the panel changed.
    pub fn accept(&mut self, token: u64, id: &ClientId, entries: Vec<AuditEntry>) -> bool {
        if !self.is_current(token, id) {
            debug!(id = %id, token, "stale audit response discarded");
            return false;
        }
        self.entries = entries;
        self.loading = false;
        true
    }

    /// A failed latest fetch empties the panel. The subject stays.
    pub fn fail(&mut self, token: u64, id: &ClientId) -> bool {
        if !self.is_current(token, id) {
            return false;
        }
        self.entries.clear();
        self.loading = false;
        true
    }

    pub fn clear(&mut self) {
        self.subject = None;
        self.entries.clear();
        self.loading = false;
    }

    pub fn subject(&self) -> Option<&ClientId> {
        self.subject.as_ref()
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    fn is_current(&self, token: u64, id: &ClientId) -> bool {
        token == self.token && self.subject.as_ref() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::AuditPanel;
    use crate::{AuditEntry, AuditEntryId, ClientId};

    fn entry(client: &str, field: &str) -> AuditEntry {
        AuditEntry {
            id: AuditEntryId::from(format!("{client}-{field}")),
            client_id: ClientId::from(client),
            user_id: None,
            field_name: field.to_owned(),
            old_value: None,
            new_value: Some("x".to_owned()),
            changed_at: "2026-01-09T14:03:11+00:00".to_owned(),
        }
    }

    #[test]
    fn begin_clears_previous_entries_immediately() {
        let mut panel = AuditPanel::new();
        let first = panel.begin(ClientId::from("a"));
        assert!(panel.accept(first.token, &first.id, vec![entry("a", "region")]));
        assert_eq!(panel.entries().len(), 1);

        panel.begin(ClientId::from("b"));
        assert!(panel.entries().is_empty());
        assert!(panel.loading());
        assert_eq!(panel.subject(), Some(&ClientId::from("b")));
    }

    #[test]
    fn late_response_for_previous_subject_is_ignored() {
        let mut panel = AuditPanel::new();
        let a = panel.begin(ClientId::from("a"));
        let b = panel.begin(ClientId::from("b"));

        assert!(!panel.accept(a.token, &a.id, vec![entry("a", "tickers")]));
        assert!(panel.entries().is_empty());
        assert!(panel.loading());

        assert!(panel.accept(b.token, &b.id, vec![entry("b", "region")]));
        assert!(!panel.accept(a.token, &a.id, vec![entry("a", "tickers")]));
        assert_eq!(panel.entries(), &[entry("b", "region")]);
    }

    #[test]
    fn reselecting_the_same_record_only_honours_latest_fetch() {
        let mut panel = AuditPanel::new();
        let older = panel.begin(ClientId::from("a"));
        let newer = panel.begin(ClientId::from("a"));

        assert!(!panel.accept(older.token, &older.id, vec![entry("a", "old")]));
        assert!(panel.accept(newer.token, &newer.id, vec![entry("a", "new")]));
        assert_eq!(panel.entries(), &[entry("a", "new")]);
    }

    #[test]
    fn failure_empties_entries_but_keeps_subject() {
        let mut panel = AuditPanel::new();
        let request = panel.begin(ClientId::from("a"));
        assert!(panel.fail(request.token, &request.id));
        assert!(panel.entries().is_empty());
        assert!(!panel.loading());
        assert_eq!(panel.subject(), Some(&ClientId::from("a")));
    }

    #[test]
    fn stale_failure_does_not_touch_newer_entries() {
        let mut panel = AuditPanel::new();
        let a = panel.begin(ClientId::from("a"));
        let b = panel.begin(ClientId::from("b"));
        panel.accept(b.token, &b.id, vec![entry("b", "region")]);

        assert!(!panel.fail(a.token, &a.id));
        assert_eq!(panel.entries().len(), 1);
    }
}
