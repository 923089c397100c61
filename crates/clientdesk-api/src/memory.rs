// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! In-process registry used by `--demo`. Applies the same normalization,
//! filtering and audit rules as the REST service.

use anyhow::{Result, bail};
use clientdesk_app::{
    AuditEntry, AuditEntryId, Backend, Client, ClientField, ClientId, FieldPatch, FieldValue,
    NewClient,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

#[derive(Debug, Default)]
struct Registry {
    clients: Vec<Client>,
    audit: Vec<AuditEntry>,
    next_client_id: u64,
    next_audit_id: u64,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    registry: Mutex<Registry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clients(clients: Vec<Client>) -> Self {
        let next_client_id = clients
            .iter()
            .filter_map(|client| client.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            registry: Mutex::new(Registry {
                clients,
                next_client_id,
                ..Registry::default()
            }),
        }
    }

    /// Three sample clients with every column filled in.
    pub fn demo() -> Self {
        Self::with_clients(demo_clients())
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn list_clients(&self, params: &[(&'static str, String)]) -> Result<Vec<Client>> {
        let mut query = None;
        let mut tickers = Vec::new();
        let mut currencies = Vec::new();
        for (name, value) in params {
            match *name {
                "q" if !value.is_empty() => query = Some(value.to_lowercase()),
                "ticker" => tickers = normalize_list(value.split(',')),
                "currency" => currencies = normalize_list(value.split(',')),
                _ => {}
            }
        }

        let registry = self.registry();
        let items = registry
            .clients
            .iter()
            .filter(|client| contains_all(&client.tickers, &tickers))
            .filter(|client| contains_all(&client.currencies, &currencies))
            .filter(|client| {
                query.as_deref().is_none_or(|needle| {
                    client.client_name.to_lowercase().contains(needle)
                        || client
                            .tickers
                            .iter()
                            .any(|ticker| ticker.to_lowercase().contains(needle))
                })
            })
            .cloned()
            .collect::<Vec<_>>();
        debug!(count = items.len(), "demo list");
        Ok(items)
    }

    fn client_audit(&self, id: &ClientId) -> Result<Vec<AuditEntry>> {
        let registry = self.registry();
        Ok(registry
            .audit
            .iter()
            .rev()
            .filter(|entry| &entry.client_id == id)
            .cloned()
            .collect())
    }

    fn update_client(&self, id: &ClientId, patch: &FieldPatch) -> Result<Client> {
        let mut registry = self.registry();
        let Some(index) = registry.clients.iter().position(|client| &client.id == id) else {
            bail!("server error (404): Client not found");
        };

        let current = &registry.clients[index];
        let old = current.value(patch.field);
        let change = match &patch.value {
            // absent values are skipped, matching the service's partial-update rule
            FieldValue::Text(None) => None,
            FieldValue::Text(Some(text)) => (old != patch.value).then(|| {
                (
                    FieldValue::Text(Some(text.clone())),
                    text_audit(&old),
                    Some(text.clone()),
                )
            }),
            FieldValue::Flag(flag) => (old != patch.value)
                .then(|| (FieldValue::Flag(*flag), text_audit(&old), Some(flag_label(*flag)))),
            FieldValue::List(tokens) => {
                let next = normalize_list(tokens.iter().map(String::as_str));
                let FieldValue::List(previous) = &old else {
                    bail!("{} is not a list field", patch.field.as_str());
                };
                (sorted(previous) != sorted(&next)).then(|| {
                    (
                        FieldValue::List(next.clone()),
                        Some(previous.join(", ")),
                        Some(next.join(", ")),
                    )
                })
            }
        };

        if let Some((value, old_value, new_value)) = change {
            if !registry.clients[index].set_value(patch.field, value) {
                bail!("{} cannot hold that value", patch.field.as_str());
            }
            registry.record_audit(id, patch.field, old_value, new_value);
        }
        Ok(registry.clients[index].clone())
    }

    fn create_client(&self, input: &NewClient) -> Result<Client> {
        let name = input.client_name.trim();
        if name.is_empty() {
            bail!("server error (422): client_name: Field required");
        }
        let mut registry = self.registry();
        registry.next_client_id += 1;
        let client = Client {
            tickers: normalize_list(input.tickers.iter().map(String::as_str)),
            currencies: normalize_list(input.currencies.iter().map(String::as_str)),
            region: input.region.clone(),
            ..Client::blank(registry.next_client_id.to_string(), name)
        };
        registry.clients.push(client.clone());
        debug!(id = %client.id, "demo create");
        Ok(client)
    }

    fn delete_client(&self, id: &ClientId) -> Result<()> {
        let mut registry = self.registry();
        let before = registry.clients.len();
        registry.clients.retain(|client| &client.id != id);
        if registry.clients.len() == before {
            bail!("server error (404): Client not found");
        }
        registry.audit.retain(|entry| &entry.client_id != id);
        Ok(())
    }
}

impl Registry {
    fn record_audit(
        &mut self,
        id: &ClientId,
        field: ClientField,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.next_audit_id += 1;
        let changed_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        self.audit.push(AuditEntry {
            id: AuditEntryId::from(self.next_audit_id.to_string()),
            client_id: id.clone(),
            user_id: None,
            field_name: field.as_str().to_owned(),
            old_value,
            new_value,
            changed_at,
        });
    }
}

/// Trims, upper-cases and drops empty tokens. A repeated token is kept once.
fn normalize_list<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for value in values {
        let item = value.trim().to_uppercase();
        if !item.is_empty() && !cleaned.contains(&item) {
            cleaned.push(item);
        }
    }
    cleaned
}

fn contains_all(have: &[String], wanted: &[String]) -> bool {
    wanted.iter().all(|token| have.contains(token))
}

fn sorted(tokens: &[String]) -> Vec<String> {
    let mut tokens = tokens.to_vec();
    tokens.sort();
    tokens
}

fn text_audit(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Flag(flag) => Some(flag_label(*flag)),
        FieldValue::List(tokens) => Some(tokens.join(", ")),
    }
}

fn flag_label(flag: bool) -> String {
    let label = if flag { "True" } else { "False" };
    label.to_owned()
}

fn text(value: &str) -> Option<String> {
    Some(value.to_owned())
}

fn list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}

pub fn demo_clients() -> Vec<Client> {
    vec![
        Client {
            tickers: list(&["AAPL", "MSFT"]),
            currencies: list(&["CAD", "GBP"]),
            tenors_min: text("2Y"),
            tenors_max: text("10Y"),
            tenors_sweetspot: text("5Y"),
            frn_buyer: true,
            callable_buyer: false,
            private_placement_buyer: text("Yes"),
            esg_green: true,
            esg_social: false,
            esg_sustainable: false,
            target_spread_ois: text("OIS+110"),
            target_g_spread: text("G+140"),
            toms_code: text("RBIB-01"),
            client_notes: text("Prefers high quality issuers."),
            region: text("NA"),
            ..Client::blank("1", "RBIB")
        },
        Client {
            tickers: list(&["TSLA"]),
            currencies: list(&["USD"]),
            tenors_min: text("1Y"),
            tenors_max: text("7Y"),
            tenors_sweetspot: text("3Y"),
            frn_buyer: false,
            callable_buyer: true,
            private_placement_buyer: text("No"),
            esg_green: false,
            esg_social: true,
            esg_sustainable: true,
            target_spread_ois: text("OIS+90"),
            target_g_spread: text("G+120"),
            toms_code: text("BH-88"),
            client_notes: text("Likes callable structures."),
            region: text("US"),
            ..Client::blank("2", "Blue Harbor")
        },
        Client {
            tickers: list(&["NVDA", "AAPL"]),
            currencies: list(&["EUR", "USD"]),
            tenors_min: text("3Y"),
            tenors_max: text("12Y"),
            tenors_sweetspot: text("7Y"),
            frn_buyer: true,
            callable_buyer: true,
            private_placement_buyer: text("Maybe"),
            esg_green: true,
            esg_social: true,
            esg_sustainable: false,
            target_spread_ois: text("OIS+130"),
            target_g_spread: text("G+160"),
            toms_code: text("NWC-12"),
            client_notes: text("Sensitive to spread volatility."),
            region: text("EU"),
            ..Client::blank("3", "Northwind Capital")
        },
    ]
}
