// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use clientdesk_app::{
    CellKey, CellPhase, Change, ClientField, ClientId, Console, CreateField, Criterion,
    FieldKind, NoticeKind, Request, Response,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use std::io;
use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::warn;

const COLUMN_WIDTH: u16 = 16;
const MAX_SUGGESTIONS: usize = 8;
const NOTICE_TIMEOUT: Duration = Duration::from_secs(4);

/// Executes backend requests for the event loop. Completions must come back
/// on `tx` as [`InternalEvent::Backend`].
pub trait AppRuntime {
    fn execute(&mut self, request: Request) -> Response;

    /// Runs `request` inline by default. Runtimes that talk to a real server
    /// override this to run off the UI thread.
    fn dispatch(&mut self, request: Request, tx: Sender<InternalEvent>) -> Result<()> {
        let response = self.execute(request);
        tx.send(InternalEvent::Backend(response))
            .map_err(|_| anyhow::anyhow!("backend event channel closed"))?;
        Ok(())
    }

    fn notice_timeout(&self) -> Duration {
        NOTICE_TIMEOUT
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearNotice { token: u64 },
    Backend(Response),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Nav,
    Edit(CellKey),
    Filter(Criterion),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    mode: InputMode,
    cursor_row: usize,
    cursor_col: usize,
    suggestion_index: usize,
    notice_token: u64,
}

pub fn run_app<R: AppRuntime>(console: &mut Console, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    let changes = console.subscribe();

    let request = console.refresh();
    dispatch_request(console, runtime, &internal_tx, request);

    let mut dirty = true;
    let mut result = Ok(());
    loop {
        process_internal_events(console, &mut view_data, &internal_rx);
        dirty |= drain_changes(&changes);
        schedule_notice_clear(console, runtime, &mut view_data, &internal_tx);

        if dirty {
            if let Err(error) = terminal.draw(|frame| render(frame, console, &view_data)) {
                result = Err(error).context("draw frame");
                break;
            }
            dirty = false;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(console, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn drain_changes(changes: &Receiver<Change>) -> bool {
    changes.try_iter().count() > 0
}

fn process_internal_events(
    console: &mut Console,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearNotice { token } => {
                console.clear_notice(token);
            }
            InternalEvent::Backend(response) => console.apply(response),
        }
    }
    clamp_cursor(console, view_data);
}

fn schedule_notice_clear<R: AppRuntime>(
    console: &Console,
    runtime: &R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(notice) = console.notice() else {
        return;
    };
    if notice.token == view_data.notice_token {
        return;
    }
    view_data.notice_token = notice.token;
    let token = notice.token;
    let timeout = runtime.notice_timeout();
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(timeout);
        let _ = sender.send(InternalEvent::ClearNotice { token });
    });
}

/// A request the runtime refuses still completes, as a failure, so optimistic
/// edits roll back and busy flags clear.
fn dispatch_request<R: AppRuntime>(
    console: &mut Console,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
    request: Request,
) {
    if let Err(error) = runtime.dispatch(request.clone(), internal_tx.clone()) {
        warn!(request = request.label(), error = %error, "dispatch failed");
        console.apply(request.failed(&error));
    }
}

fn handle_key_event<R: AppRuntime>(
    console: &mut Console,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if console.confirmation().is_some() {
        handle_confirmation_key(console, runtime, internal_tx, key);
        return false;
    }

    if console.create_form().is_some() {
        handle_create_form_key(console, runtime, internal_tx, key);
        return false;
    }

    match view_data.mode.clone() {
        InputMode::Edit(cell) => handle_edit_key(console, runtime, view_data, internal_tx, cell, key),
        InputMode::Filter(criterion) => {
            handle_filter_key(console, runtime, view_data, internal_tx, criterion, key);
        }
        InputMode::Nav => handle_nav_key(console, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_nav_key<R: AppRuntime>(
    console: &mut Console,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j') | KeyCode::Down, _) => move_cursor(console, view_data, 1, 0),
        (KeyCode::Char('k') | KeyCode::Up, _) => move_cursor(console, view_data, -1, 0),
        (KeyCode::Char('l') | KeyCode::Right, _) => move_cursor(console, view_data, 0, 1),
        (KeyCode::Char('h') | KeyCode::Left, _) => move_cursor(console, view_data, 0, -1),
        (KeyCode::Char('g'), _) => view_data.cursor_row = 0,
        (KeyCode::Char('G'), _) => {
            view_data.cursor_row = console.store().len().saturating_sub(1);
        }
        (KeyCode::Char('^'), _) => view_data.cursor_col = 0,
        (KeyCode::Char('$'), _) => view_data.cursor_col = ClientField::ALL.len() - 1,
        (KeyCode::Enter, _) => {
            let Some((id, field)) = cursor_cell(console, view_data) else {
                return;
            };
            if field.kind() == FieldKind::Flag {
                if let Some(request) = console.toggle_flag(&id, field) {
                    dispatch_request(console, runtime, internal_tx, request);
                }
            } else {
                view_data.mode = InputMode::Edit(CellKey::new(id, field));
            }
        }
        (KeyCode::Char(' '), _) => {
            if let Some((id, field)) = cursor_cell(console, view_data)
                && field.kind() == FieldKind::Flag
                && let Some(request) = console.toggle_flag(&id, field)
            {
                dispatch_request(console, runtime, internal_tx, request);
            }
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            if let Some(client) = console.store().at(view_data.cursor_row) {
                let id = client.id.clone();
                let request = console.select_record(&id);
                dispatch_request(console, runtime, internal_tx, request);
            }
        }
        (KeyCode::Char('D'), _) => {
            console.request_delete();
        }
        (KeyCode::Char('n'), KeyModifiers::NONE) => console.open_create_form(),
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            let request = console.refresh();
            dispatch_request(console, runtime, internal_tx, request);
        }
        (KeyCode::Char('/'), _) => enter_filter(view_data, Criterion::Text),
        (KeyCode::Char('t'), KeyModifiers::NONE) => enter_filter(view_data, Criterion::Ticker),
        (KeyCode::Char('c'), KeyModifiers::NONE) => enter_filter(view_data, Criterion::Currency),
        (KeyCode::Char('X'), _) => {
            let request = console.clear_filters();
            dispatch_request(console, runtime, internal_tx, request);
        }
        _ => {}
    }
}

fn enter_filter(view_data: &mut ViewData, criterion: Criterion) {
    view_data.mode = InputMode::Filter(criterion);
    view_data.suggestion_index = 0;
}

/// Keys while a cell is open. Leaving the cell any way but Esc is a blur and
/// commits the draft.
fn handle_edit_key<R: AppRuntime>(
    console: &mut Console,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    cell: CellKey,
    key: KeyEvent,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            console.discard_draft(&cell.id, cell.field);
            view_data.mode = InputMode::Nav;
        }
        KeyCode::Enter => commit_and_leave(console, runtime, view_data, internal_tx, &cell),
        KeyCode::Tab => {
            commit_and_leave(console, runtime, view_data, internal_tx, &cell);
            move_cursor(console, view_data, 0, 1);
        }
        KeyCode::Up | KeyCode::Down => {
            commit_and_leave(console, runtime, view_data, internal_tx, &cell);
            let delta = if key.code == KeyCode::Up { -1 } else { 1 };
            move_cursor(console, view_data, delta, 0);
        }
        KeyCode::Char('u') if ctrl => {
            console.edit_cell(&cell.id, cell.field, "");
        }
        KeyCode::Backspace => {
            let mut text = console.cell_text(&cell.id, cell.field);
            text.pop();
            console.edit_cell(&cell.id, cell.field, text);
        }
        KeyCode::Char(ch) if !ctrl => {
            let mut text = console.cell_text(&cell.id, cell.field);
            text.push(ch);
            console.edit_cell(&cell.id, cell.field, text);
        }
        _ => {}
    }
}

fn commit_and_leave<R: AppRuntime>(
    console: &mut Console,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    cell: &CellKey,
) {
    if let Some(request) = console.commit_cell(&cell.id, cell.field) {
        dispatch_request(console, runtime, internal_tx, request);
    }
    view_data.mode = InputMode::Nav;
}

fn handle_filter_key<R: AppRuntime>(
    console: &mut Console,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    criterion: Criterion,
    key: KeyEvent,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => view_data.mode = InputMode::Nav,
        KeyCode::Enter => {
            view_data.mode = InputMode::Nav;
            let request = console.refresh();
            dispatch_request(console, runtime, internal_tx, request);
        }
        KeyCode::Tab => {
            let suggestions = visible_suggestions(console, criterion);
            if let Some(token) = suggestions.get(view_data.suggestion_index) {
                console.apply_suggestion(criterion, token);
                view_data.suggestion_index = 0;
            }
        }
        KeyCode::Down => {
            let count = visible_suggestions(console, criterion).len();
            if count > 0 {
                view_data.suggestion_index = (view_data.suggestion_index + 1) % count;
            }
        }
        KeyCode::Up => {
            let count = visible_suggestions(console, criterion).len();
            if count > 0 {
                view_data.suggestion_index = (view_data.suggestion_index + count - 1) % count;
            }
        }
        KeyCode::Char('u') if ctrl => {
            let request = console.clear_criterion(criterion);
            dispatch_request(console, runtime, internal_tx, request);
            view_data.suggestion_index = 0;
        }
        KeyCode::Backspace => {
            let mut text = console.filter().get(criterion).to_owned();
            text.pop();
            console.set_criterion(criterion, text);
            view_data.suggestion_index = 0;
        }
        KeyCode::Char(ch) if !ctrl => {
            let mut text = console.filter().get(criterion).to_owned();
            text.push(ch);
            console.set_criterion(criterion, text);
            view_data.suggestion_index = 0;
        }
        _ => {}
    }
}

fn handle_create_form_key<R: AppRuntime>(
    console: &mut Console,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(form) = console.create_form() else {
        return;
    };
    let focus = form.focus;
    let current = form.get(focus).to_owned();
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => console.close_create_form(),
        KeyCode::Enter => {
            if let Some(request) = console.submit_create() {
                dispatch_request(console, runtime, internal_tx, request);
            }
        }
        KeyCode::Tab | KeyCode::Down => console.focus_create_field(focus.next()),
        KeyCode::BackTab | KeyCode::Up => console.focus_create_field(focus.previous()),
        KeyCode::Backspace => {
            let mut text = current;
            text.pop();
            console.set_create_field(focus, text);
        }
        KeyCode::Char('u') if ctrl => console.set_create_field(focus, ""),
        KeyCode::Char(ch) if !ctrl => {
            let mut text = current;
            text.push(ch);
            console.set_create_field(focus, text);
        }
        _ => {}
    }
}

fn handle_confirmation_key<R: AppRuntime>(
    console: &mut Console,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            if let Some(request) = console.confirm_delete() {
                dispatch_request(console, runtime, internal_tx, request);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            console.cancel_delete();
        }
        _ => {}
    }
}

fn cursor_cell(console: &Console, view_data: &ViewData) -> Option<(ClientId, ClientField)> {
    let client = console.store().at(view_data.cursor_row)?;
    let field = *ClientField::ALL.get(view_data.cursor_col)?;
    Some((client.id.clone(), field))
}

fn move_cursor(console: &Console, view_data: &mut ViewData, rows: isize, cols: isize) {
    let row_count = console.store().len();
    let col_count = ClientField::ALL.len();
    view_data.cursor_row = shift_index(view_data.cursor_row, rows, row_count);
    view_data.cursor_col = shift_index(view_data.cursor_col, cols, col_count);
}

fn shift_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

fn clamp_cursor(console: &mut Console, view_data: &mut ViewData) {
    let rows = console.store().len();
    view_data.cursor_row = view_data.cursor_row.min(rows.saturating_sub(1));
    if let InputMode::Edit(cell) = &view_data.mode
        && console.store().get(&cell.id).is_none()
    {
        console.discard_draft(&cell.id, cell.field);
        view_data.mode = InputMode::Nav;
    }
}

fn visible_suggestions(console: &Console, criterion: Criterion) -> Vec<String> {
    console
        .suggestions(criterion)
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Columns that fit in `width`, scrolled so the cursor column is visible.
fn visible_field_window(cursor_col: usize, width: u16) -> Range<usize> {
    let fit = usize::from((width / (COLUMN_WIDTH + 1)).max(1)).min(ClientField::ALL.len());
    let start = (cursor_col + 1).saturating_sub(fit);
    start..start + fit
}

fn render(frame: &mut ratatui::Frame<'_>, console: &Console, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let chips = Paragraph::new(chips_text(console)).block(
        Block::default()
            .title(header_title(console))
            .borders(Borders::ALL),
    );
    frame.render_widget(chips, layout[0]);

    let filters = Paragraph::new(filter_bar_text(console, view_data))
        .block(Block::default().title("filters").borders(Borders::ALL));
    frame.render_widget(filters, layout[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(layout[2]);
    render_grid(frame, body[0], console, view_data);

    let audit = Paragraph::new(audit_text(console))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("change history").borders(Borders::ALL));
    frame.render_widget(audit, body[1]);

    let status_style = match console.notice() {
        Some(notice) if notice.kind == NoticeKind::Invalid => Style::default().fg(Color::Magenta),
        Some(_) => Style::default().fg(Color::Red),
        None => Style::default().fg(Color::Yellow),
    };
    let status = Paragraph::new(status_text(console, view_data))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if let InputMode::Filter(criterion) = view_data.mode
        && criterion != Criterion::Text
    {
        let area = suggestion_rect(layout[1], layout[2], criterion);
        frame.render_widget(Clear, area);
        let menu = Paragraph::new(suggestions_text(console, criterion, view_data.suggestion_index))
            .block(Block::default().title("suggestions").borders(Borders::ALL));
        frame.render_widget(menu, area);
    }

    if console.create_form().is_some() {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let form = Paragraph::new(create_form_text(console))
            .block(Block::default().title("new client").borders(Borders::ALL));
        frame.render_widget(form, area);
    }

    if let Some(confirmation) = console.confirmation() {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let dialog = Paragraph::new(format!("{}\n\ny delete · n keep", confirmation.prompt))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("delete")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(dialog, area);
    }
}

fn render_grid(frame: &mut ratatui::Frame<'_>, area: Rect, console: &Console, view_data: &ViewData) {
    let window = visible_field_window(view_data.cursor_col, area.width.saturating_sub(4));
    let fields = &ClientField::ALL[window];

    let header = Row::new(fields.iter().map(|field| {
        Cell::from(field.label()).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = console
        .store()
        .iter()
        .enumerate()
        .map(|(row_index, client)| {
            let cursor_row = row_index == view_data.cursor_row;
            let selected = console.selection().is_selected(&client.id);
            let cells = fields
                .iter()
                .map(|field| {
                    let key = CellKey::new(client.id.clone(), *field);
                    let mut style = Style::default();
                    if selected {
                        style = style.fg(Color::Green);
                    }
                    match console.edits().phase(&key) {
                        CellPhase::Editing => {
                            style = style.fg(Color::Yellow).add_modifier(Modifier::ITALIC);
                        }
                        CellPhase::Committing => style = style.add_modifier(Modifier::DIM),
                        CellPhase::Idle => {}
                    }
                    if cursor_row {
                        style = style.bg(Color::DarkGray);
                    }
                    let on_cursor = cursor_row && ClientField::ALL[view_data.cursor_col] == *field;
                    if on_cursor {
                        style = Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                    let mut text = console.cell_text(&client.id, *field);
                    if on_cursor && view_data.mode == InputMode::Edit(key) {
                        text.push('▏');
                    }
                    Cell::from(text).style(style)
                })
                .collect::<Vec<_>>();
            Row::new(cells)
        });

    let widths = vec![Constraint::Length(COLUMN_WIDTH); fields.len()];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(grid_title(console, view_data))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn header_title(console: &Console) -> String {
    if console.loading() {
        "clientdesk · loading…".to_owned()
    } else {
        format!("clientdesk · {} clients", console.store().len())
    }
}

fn grid_title(console: &Console, view_data: &ViewData) -> String {
    let column = ClientField::ALL
        .get(view_data.cursor_col)
        .map(|field| field.label())
        .unwrap_or_default();
    let row = if console.store().is_empty() {
        0
    } else {
        view_data.cursor_row + 1
    };
    format!("clients {row}/{} · {column}", console.store().len())
}

fn chips_text(console: &Console) -> String {
    let chips = console.chips();
    if chips.is_empty() {
        return "No filters applied".to_owned();
    }
    chips
        .into_iter()
        .map(|(_, label)| format!("[{label}]"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn filter_bar_text(console: &Console, view_data: &ViewData) -> String {
    Criterion::ALL
        .into_iter()
        .map(|criterion| {
            let active = view_data.mode == InputMode::Filter(criterion);
            let marker = if active { "›" } else { " " };
            let cursor = if active { "▏" } else { "" };
            format!(
                "{marker}{}: {}{cursor}",
                criterion.label(),
                console.filter().get(criterion)
            )
        })
        .collect::<Vec<_>>()
        .join("   ")
}

fn suggestions_text(console: &Console, criterion: Criterion, index: usize) -> String {
    let suggestions = visible_suggestions(console, criterion);
    if suggestions.is_empty() {
        return match criterion {
            Criterion::Currency => "No currencies yet".to_owned(),
            _ => "No tickers yet".to_owned(),
        };
    }
    suggestions
        .iter()
        .enumerate()
        .map(|(position, token)| {
            let marker = if position == index { "›" } else { " " };
            format!("{marker} {token}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn suggestion_rect(filter_area: Rect, body_area: Rect, criterion: Criterion) -> Rect {
    let offset = match criterion {
        Criterion::Text => 0,
        Criterion::Ticker => filter_area.width / 3,
        Criterion::Currency => filter_area.width * 2 / 3,
    };
    let height = u16::try_from(MAX_SUGGESTIONS + 2)
        .unwrap_or(u16::MAX)
        .min(body_area.height);
    Rect {
        x: filter_area.x + offset,
        y: body_area.y,
        width: (filter_area.width / 3).max(12).min(filter_area.width),
        height,
    }
}

fn audit_text(console: &Console) -> String {
    let audit = console.audit();
    if audit.subject().is_none() {
        return "Select a client with s to see its change history.".to_owned();
    }
    if audit.loading() {
        return "loading…".to_owned();
    }
    if audit.entries().is_empty() {
        return "No changes recorded.".to_owned();
    }
    audit
        .entries()
        .iter()
        .map(|entry| {
            let field = ClientField::parse(&entry.field_name)
                .map(ClientField::label)
                .unwrap_or(entry.field_name.as_str());
            format!(
                "{}\n  {field}: {} → {}",
                entry.changed_at_label(),
                entry.old_value.as_deref().unwrap_or("(none)"),
                entry.new_value.as_deref().unwrap_or("(none)"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn create_form_text(console: &Console) -> String {
    let Some(form) = console.create_form() else {
        return String::new();
    };
    let mut lines = CreateField::ALL
        .into_iter()
        .map(|field| {
            let focused = form.focus == field;
            let marker = if focused { "›" } else { " " };
            let cursor = if focused { "▏" } else { "" };
            format!("{marker} {}: {}{cursor}", field.label(), form.get(field))
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push(if form.submitting {
        "saving…".to_owned()
    } else {
        "enter create · tab next field · esc cancel".to_owned()
    });
    lines.join("\n")
}

fn mode_badge(view_data: &ViewData) -> &'static str {
    match view_data.mode {
        InputMode::Nav => "NAV",
        InputMode::Edit(_) => "EDIT",
        InputMode::Filter(_) => "FILTER",
    }
}

fn status_text(console: &Console, view_data: &ViewData) -> String {
    let hints = if console.confirmation().is_some() {
        "y confirm | n cancel"
    } else if console.create_form().is_some() {
        "tab/shift+tab field | enter create | esc cancel"
    } else {
        match view_data.mode {
            InputMode::Nav => {
                "j/k/h/l | enter edit | space toggle | s history | / t c filter | X clear | n new | D delete | r reload | ctrl+q"
            }
            InputMode::Edit(_) => "enter save | esc discard | tab next",
            InputMode::Filter(Criterion::Text) => "enter apply | ctrl+u clear | esc back",
            InputMode::Filter(_) => "tab pick | up/down choose | enter apply | ctrl+u clear | esc back",
        }
    };
    let badge = mode_badge(view_data);
    match console.notice() {
        Some(notice) => format!("{badge} | {} | {hints}", notice.message),
        None => format!("{badge} | {hints}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
