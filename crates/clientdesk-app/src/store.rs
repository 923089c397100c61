// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::{Client, ClientField, ClientId, FieldValue};

/// Rows currently shown in the grid, in server response order.
///
/// Holds at most one record per id. Every mutation replaces either the whole
/// collection or exactly one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<Client>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collection after a list fetch. Later duplicates of an id
    /// are dropped so the one-record-per-id invariant survives a bad response.
    pub fn replace_all(&mut self, records: Vec<Client>) {
        let mut seen = BTreeSet::new();
        self.records = records
            .into_iter()
            .filter(|record| seen.insert(record.id.clone()))
            .collect();
    }

    /// Swaps the record stored under `id`. Returns false, changing nothing,
    /// when `id` is not present.
    pub fn replace_one(&mut self, id: &ClientId, record: Client) -> bool {
        match self.records.iter_mut().find(|current| &current.id == id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Inserts a created record at the top. A record whose id is already
    /// present replaces the existing entry where it stands instead.
    pub fn prepend(&mut self, record: Client) {
        let id = record.id.clone();
        if !self.replace_one(&id, record.clone()) {
            self.records.insert(0, record);
        }
    }

    pub fn remove(&mut self, id: &ClientId) -> Option<Client> {
        let index = self.position(id)?;
        Some(self.records.remove(index))
    }

    /// Applies `transform` to the record matching `id` only.
    pub fn find_and_map<F>(&mut self, id: &ClientId, transform: F) -> bool
    where
        F: FnOnce(&Client) -> Client,
    {
        let Some(slot) = self.records.iter_mut().find(|current| &current.id == id) else {
            return false;
        };
        *slot = transform(slot);
        true
    }

    pub fn get(&self, id: &ClientId) -> Option<&Client> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn position(&self, id: &ClientId) -> Option<usize> {
        self.records.iter().position(|record| &record.id == id)
    }

    pub fn at(&self, index: usize) -> Option<&Client> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Client] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct tokens of a list field across all loaded records.
    pub fn unique_tokens(&self, field: ClientField) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|record| match record.value(field) {
                FieldValue::List(tokens) => Some(tokens),
                _ => None,
            })
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
