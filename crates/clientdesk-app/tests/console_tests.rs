// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use clientdesk_app::{
    Change, ClientField, ClientId, Console, CreateField, Criterion, DELETE_PROMPT, FieldPatch,
    FieldValue, NoticeKind, Request, Response,
};
use clientdesk_testkit::{Call, ClientFaker, ScriptedBackend, sample_client};

fn run(console: &mut Console, backend: &ScriptedBackend, request: Request) {
    let response = request.execute(backend);
    console.apply(response);
}

fn loaded_console(backend: &ScriptedBackend) -> Console {
    backend.push_list(Ok(vec![
        sample_client("1", "Acme", &["AAPL"], &["USD"]),
        sample_client("2", "Blue Harbor", &["TSLA"], &["USD"]),
        sample_client("3", "Northwind", &["NVDA", "AAPL"], &["EUR", "USD"]),
    ]));
    let mut console = Console::new();
    let request = console.refresh();
    run(&mut console, backend, request);
    console
}

fn tickers_of(console: &Console, id: &str) -> Vec<String> {
    console
        .store()
        .get(&ClientId::from(id))
        .map(|client| client.tickers.clone())
        .unwrap_or_default()
}

fn ids(console: &Console) -> Vec<String> {
    console
        .store()
        .iter()
        .map(|client| client.id.to_string())
        .collect()
}

#[test]
fn ticker_edit_reconciles_to_the_server_record() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    let id = ClientId::from("1");

    console.edit_cell(&id, ClientField::Tickers, "AAPL, NVDA");
    let request = console
        .commit_cell(&id, ClientField::Tickers)
        .expect("commit should save");
    assert_eq!(tickers_of(&console, "1"), vec!["AAPL", "NVDA"]);

    backend.push_update(Ok(sample_client(
        "1",
        "Acme",
        &["AAPL", "NVDA", "MSFT"],
        &["USD"],
    )));
    run(&mut console, &backend, request);

    assert_eq!(tickers_of(&console, "1"), vec!["AAPL", "NVDA", "MSFT"]);
    assert!(console.notice().is_none());
    assert_eq!(
        backend.calls().last(),
        Some(&Call::Update(
            id,
            FieldPatch {
                field: ClientField::Tickers,
                value: FieldValue::List(vec!["AAPL".to_owned(), "NVDA".to_owned()]),
            }
        ))
    );
}

#[test]
fn ticker_edit_rolls_back_and_reports_on_failure() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    let id = ClientId::from("1");

    console.edit_cell(&id, ClientField::Tickers, "AAPL, NVDA");
    let request = console
        .commit_cell(&id, ClientField::Tickers)
        .expect("commit should save");
    backend.push_update(Err("server error (500): database unavailable".to_owned()));
    run(&mut console, &backend, request);

    assert_eq!(tickers_of(&console, "1"), vec!["AAPL"]);
    let notice = console.notice().expect("error notice");
    assert_eq!(notice.kind, NoticeKind::SaveFailed);
    assert_eq!(
        notice.message,
        "save failed: server error (500): database unavailable"
    );
}

#[test]
fn mismatched_canonical_record_counts_as_a_failed_save() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    let id = ClientId::from("1");

    console.edit_cell(&id, ClientField::Region, "EU");
    let request = console
        .commit_cell(&id, ClientField::Region)
        .expect("commit should save");
    backend.push_update(Ok(sample_client("2", "Blue Harbor", &["TSLA"], &["USD"])));
    run(&mut console, &backend, request);

    assert_eq!(ids(&console), vec!["1", "2", "3"]);
    assert_eq!(
        console
            .store()
            .get(&ClientId::from("1"))
            .and_then(|client| client.region.clone()),
        None
    );
    assert_eq!(console.notice().map(|n| n.kind), Some(NoticeKind::SaveFailed));
}

#[test]
fn saves_on_different_records_complete_in_any_order() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    let first = ClientId::from("1");
    let second = ClientId::from("2");

    console.edit_cell(&first, ClientField::Tickers, "MSFT");
    let first_save = console
        .commit_cell(&first, ClientField::Tickers)
        .expect("first save");
    let flag_save = console
        .toggle_flag(&second, ClientField::CallableBuyer)
        .expect("toggle save");

    let mut blue_harbor = sample_client("2", "Blue Harbor", &["TSLA"], &["USD"]);
    blue_harbor.callable_buyer = true;
    backend.push_update(Ok(blue_harbor));
    run(&mut console, &backend, flag_save);

    backend.push_update(Err("timeout".to_owned()));
    run(&mut console, &backend, first_save);

    assert_eq!(tickers_of(&console, "1"), vec!["AAPL"]);
    assert!(
        console
            .store()
            .get(&second)
            .is_some_and(|client| client.callable_buyer)
    );
}

#[test]
fn stale_audit_response_never_reaches_the_panel() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    let mut faker = ClientFaker::new(11);
    let a = ClientId::from("1");
    let b = ClientId::from("2");

    let audit_a = console.select_record(&a);
    let audit_b = console.select_record(&b);
    assert!(console.audit().entries().is_empty());
    assert!(console.audit().loading());

    let b_entries = vec![faker.audit_entry(&b, 1)];
    backend.push_audit(Ok(b_entries.clone()));
    run(&mut console, &backend, audit_b);
    backend.push_audit(Ok(vec![faker.audit_entry(&a, 5)]));
    run(&mut console, &backend, audit_a);

    assert_eq!(console.selection().current(), Some(&b));
    assert_eq!(console.audit().entries(), b_entries.as_slice());
}

#[test]
fn audit_failure_clears_entries_and_keeps_selection() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    let id = ClientId::from("3");

    let request = console.select_record(&id);
    backend.push_audit(Err("server error (500): boom".to_owned()));
    run(&mut console, &backend, request);

    assert!(console.audit().entries().is_empty());
    assert!(!console.audit().loading());
    assert_eq!(console.selection().current(), Some(&id));
    assert_eq!(
        console.notice().map(|n| n.kind),
        Some(NoticeKind::FetchFailed)
    );
}

#[test]
fn filter_composition_reaches_the_backend_as_typed() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);

    console.set_criterion(Criterion::Text, "RBIB");
    console.set_criterion(Criterion::Ticker, "AA");
    console.apply_suggestion(Criterion::Ticker, "AAPL");
    console.set_criterion(Criterion::Ticker, format!("{},", console.filter().ticker));
    console.apply_suggestion(Criterion::Ticker, "NVDA");
    console.set_criterion(Criterion::Currency, "USD");

    backend.push_list(Ok(Vec::new()));
    let request = console.refresh();
    run(&mut console, &backend, request);

    assert_eq!(
        backend.calls().last(),
        Some(&Call::List(vec![
            ("q", "RBIB".to_owned()),
            ("ticker", "AAPL, NVDA".to_owned()),
            ("currency", "USD".to_owned()),
        ]))
    );
    assert!(console.store().is_empty());
    assert_eq!(
        console
            .chips()
            .into_iter()
            .map(|(_, label)| label)
            .collect::<Vec<_>>(),
        vec!["Text: RBIB", "Ticker: AAPL, NVDA", "Currency: USD"]
    );
}

#[test]
fn suggestions_come_from_loaded_records() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);

    assert_eq!(
        console.suggestions(Criterion::Ticker),
        vec!["AAPL", "NVDA", "TSLA"]
    );
    console.set_criterion(Criterion::Currency, "USD, e");
    assert_eq!(console.suggestions(Criterion::Currency), vec!["EUR"]);
}

#[test]
fn confirmed_delete_removes_exactly_one_record() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    let id = ClientId::from("2");

    let audit = console.select_record(&id);
    backend.push_audit(Ok(Vec::new()));
    run(&mut console, &backend, audit);

    assert!(console.request_delete());
    assert_eq!(console.confirmation().map(|c| c.prompt), Some(DELETE_PROMPT));
    let request = console.confirm_delete().expect("delete request");
    backend.push_delete(Ok(()));
    run(&mut console, &backend, request);

    assert_eq!(ids(&console), vec!["1", "3"]);
    assert!(console.selection().current().is_none());
    assert!(console.audit().subject().is_none());
    assert!(console.audit().entries().is_empty());
}

#[test]
fn failed_delete_changes_nothing_but_the_notice() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    let id = ClientId::from("2");
    console.select_record(&id);
    console.request_delete();

    let request = console.confirm_delete().expect("delete request");
    backend.push_delete(Err("server error (404): Client not found".to_owned()));
    run(&mut console, &backend, request);

    assert_eq!(ids(&console), vec!["1", "2", "3"]);
    assert_eq!(console.selection().current(), Some(&id));
    assert_eq!(
        console.notice().map(|n| n.message.as_str()),
        Some("delete failed: server error (404): Client not found")
    );
}

#[test]
fn cancelled_delete_sends_nothing() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    console.select_record(&ClientId::from("1"));
    console.request_delete();

    assert!(console.cancel_delete());
    assert!(console.confirm_delete().is_none());
    assert!(
        !backend
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Delete(_)))
    );
}

#[test]
fn create_prepends_the_server_record_and_closes_the_form() -> Result<()> {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);

    console.open_create_form();
    console.set_create_field(CreateField::ClientName, "  Harbor Point ");
    console.set_create_field(CreateField::Tickers, "aapl, msft");
    let request = console.submit_create().expect("create request");
    let Request::CreateClient { input, .. } = &request else {
        anyhow::bail!("expected a create request, got {request:?}");
    };
    assert_eq!(input.client_name, "Harbor Point");
    assert_eq!(input.tickers, vec!["aapl", "msft"]);

    backend.push_create(Ok(sample_client("9", "Harbor Point", &["AAPL", "MSFT"], &[])));
    run(&mut console, &backend, request);

    assert_eq!(ids(&console), vec!["9", "1", "2", "3"]);
    assert!(console.create_form().is_none());
    Ok(())
}

#[test]
fn create_requires_a_name_and_keeps_the_form_open() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    console.open_create_form();
    console.set_create_field(CreateField::Tickers, "AAPL");

    assert!(console.submit_create().is_none());
    assert!(console.create_form().is_some());
    let notice = console.notice().expect("validation notice");
    assert_eq!(notice.kind, NoticeKind::Invalid);
    assert_eq!(notice.message, "Client name is required.");
}

#[test]
fn create_failure_reenables_the_form() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    console.open_create_form();
    console.set_create_field(CreateField::ClientName, "Dup");

    let request = console.submit_create().expect("create request");
    assert!(console.submit_create().is_none());
    backend.push_create(Err("server error (422): invalid".to_owned()));
    run(&mut console, &backend, request);

    assert!(console.create_form().is_some_and(|form| !form.submitting));
    assert_eq!(ids(&console), vec!["1", "2", "3"]);
    assert_eq!(
        console.notice().map(|n| n.kind),
        Some(NoticeKind::CreateFailed)
    );
}

#[test]
fn subscribers_hear_about_completed_saves() {
    let backend = ScriptedBackend::new();
    let mut console = loaded_console(&backend);
    let changes = console.subscribe();
    let id = ClientId::from("3");

    let request = console
        .toggle_flag(&id, ClientField::EsgGreen)
        .expect("toggle");
    backend.push_update(Err("nope".to_owned()));
    run(&mut console, &backend, request);

    assert_eq!(
        changes.try_iter().collect::<Vec<_>>(),
        vec![Change::Records, Change::Records, Change::Notice]
    );
}
