// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use clientdesk_app::{
    AuditEntry, AuditEntryId, Backend, Client, ClientId, FieldPatch, NewClient,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

const NAME_STEMS: [&str; 14] = [
    "Northwind",
    "Blue Harbor",
    "Granite",
    "Silver Birch",
    "Meridian",
    "Harbor Point",
    "Lakeshore",
    "Redwood",
    "Summit",
    "Crescent",
    "Ironbridge",
    "Westfield",
    "Oakmont",
    "Kestrel",
];

const NAME_SUFFIXES: [&str; 6] = [
    "Capital",
    "Asset Management",
    "Partners",
    "Investors",
    "Pension Fund",
    "Treasury",
];

const TICKERS: [&str; 12] = [
    "AAPL", "MSFT", "NVDA", "TSLA", "AMZN", "GOOG", "META", "JPM", "XOM", "KO", "PFE", "IBM",
];

const CURRENCIES: [&str; 7] = ["USD", "EUR", "GBP", "CAD", "JPY", "CHF", "AUD"];

const TENORS: [&str; 8] = ["1Y", "2Y", "3Y", "5Y", "7Y", "10Y", "12Y", "30Y"];

const REGIONS: [&str; 5] = ["NA", "US", "EU", "APAC", "LATAM"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Reproducible client records for tests that need more than a handful of
/// rows.
#[derive(Debug, Clone)]
pub struct ClientFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl ClientFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 0,
        }
    }

    pub fn client(&mut self) -> Client {
        self.next_id += 1;
        let stem = self.pick(&NAME_STEMS);
        let suffix = self.pick(&NAME_SUFFIXES);
        let min = self.rng.int_n(TENORS.len() / 2);
        let max = min + 1 + self.rng.int_n(TENORS.len() - min - 1);
        let code = stem
            .chars()
            .filter(char::is_ascii_uppercase)
            .collect::<String>();

        Client {
            tickers: self.tokens(&TICKERS, 3),
            currencies: self.tokens(&CURRENCIES, 2),
            tenors_min: Some(TENORS[min].to_owned()),
            tenors_max: Some(TENORS[max].to_owned()),
            tenors_sweetspot: Some(TENORS[(min + max) / 2].to_owned()),
            frn_buyer: self.rng.bool(),
            callable_buyer: self.rng.bool(),
            private_placement_buyer: Some(self.pick(&["Yes", "No", "Maybe"]).to_owned()),
            esg_green: self.rng.bool(),
            esg_social: self.rng.bool(),
            esg_sustainable: self.rng.bool(),
            target_spread_ois: Some(format!("OIS+{}", 50 + 10 * self.rng.int_n(12))),
            target_g_spread: Some(format!("G+{}", 80 + 10 * self.rng.int_n(12))),
            toms_code: Some(format!("{code}-{:02}", self.next_id)),
            client_notes: None,
            region: Some(self.pick(&REGIONS).to_owned()),
            ..Client::blank(self.next_id.to_string(), format!("{stem} {suffix}"))
        }
    }

    pub fn clients(&mut self, count: usize) -> Vec<Client> {
        (0..count).map(|_| self.client()).collect()
    }

    /// One audit entry for `client_id`, `minutes_ago` before the fixture time.
    pub fn audit_entry(&mut self, client_id: &ClientId, minutes_ago: i64) -> AuditEntry {
        let at = fixture_now() - Duration::minutes(minutes_ago);
        let old = self.pick(&REGIONS).to_owned();
        let new = self.pick(&REGIONS).to_owned();
        AuditEntry {
            id: AuditEntryId::from(format!("{client_id}-{minutes_ago}")),
            client_id: client_id.clone(),
            user_id: None,
            field_name: "region".to_owned(),
            old_value: Some(old),
            new_value: Some(new),
            changed_at: at.format(&Rfc3339).unwrap_or_else(|_| fixture_datetime().to_owned()),
        }
    }

    fn tokens(&mut self, pool: &[&str], max: usize) -> Vec<String> {
        let count = 1 + self.rng.int_n(max);
        let mut tokens = Vec::with_capacity(count);
        while tokens.len() < count {
            let token = self.pick(pool).to_owned();
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// A record with only the columns the grid tests usually care about.
pub fn sample_client(id: &str, name: &str, tickers: &[&str], currencies: &[&str]) -> Client {
    Client {
        tickers: tickers.iter().map(|t| (*t).to_owned()).collect(),
        currencies: currencies.iter().map(|c| (*c).to_owned()).collect(),
        ..Client::blank(id, name)
    }
}

pub fn fixture_datetime() -> &'static str {
    "2026-01-09T14:03:11Z"
}

fn fixture_now() -> OffsetDateTime {
    OffsetDateTime::parse(fixture_datetime(), &Rfc3339).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

/// Every call a [`ScriptedBackend`] received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(Vec<(&'static str, String)>),
    Audit(ClientId),
    Update(ClientId, FieldPatch),
    Create(NewClient),
    Delete(ClientId),
}

type Reply<T> = Result<T, String>;

/// Backend double that answers from queued replies and records each call.
/// An empty queue answers with an error naming the call.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<Call>>,
    lists: Mutex<VecDeque<Reply<Vec<Client>>>>,
    audits: Mutex<VecDeque<Reply<Vec<AuditEntry>>>>,
    updates: Mutex<VecDeque<Reply<Client>>>,
    creates: Mutex<VecDeque<Reply<Client>>>,
    deletes: Mutex<VecDeque<Reply<()>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_list(&self, reply: Reply<Vec<Client>>) -> &Self {
        locked(&self.lists).push_back(reply);
        self
    }

    pub fn push_audit(&self, reply: Reply<Vec<AuditEntry>>) -> &Self {
        locked(&self.audits).push_back(reply);
        self
    }

    pub fn push_update(&self, reply: Reply<Client>) -> &Self {
        locked(&self.updates).push_back(reply);
        self
    }

    pub fn push_create(&self, reply: Reply<Client>) -> &Self {
        locked(&self.creates).push_back(reply);
        self
    }

    pub fn push_delete(&self, reply: Reply<()>) -> &Self {
        locked(&self.deletes).push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        locked(&self.calls).clone()
    }

    fn record(&self, call: Call) {
        locked(&self.calls).push(call);
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn next_reply<T>(queue: &Mutex<VecDeque<Reply<T>>>, what: &str) -> Result<T> {
    locked(queue)
        .pop_front()
        .ok_or_else(|| anyhow!("no scripted reply for {what}"))?
        .map_err(|message| anyhow!(message))
}

impl Backend for ScriptedBackend {
    fn list_clients(&self, params: &[(&'static str, String)]) -> Result<Vec<Client>> {
        self.record(Call::List(params.to_vec()));
        next_reply(&self.lists, "list")
    }

    fn client_audit(&self, id: &ClientId) -> Result<Vec<AuditEntry>> {
        self.record(Call::Audit(id.clone()));
        next_reply(&self.audits, "audit")
    }

    fn update_client(&self, id: &ClientId, patch: &FieldPatch) -> Result<Client> {
        self.record(Call::Update(id.clone(), patch.clone()));
        next_reply(&self.updates, "update")
    }

    fn create_client(&self, input: &NewClient) -> Result<Client> {
        self.record(Call::Create(input.clone()));
        next_reply(&self.creates, "create")
    }

    fn delete_client(&self, id: &ClientId) -> Result<()> {
        self.record(Call::Delete(id.clone()));
        next_reply(&self.deletes, "delete")
    }
}
