// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod editor;

pub use editor::{Field, FieldKey, FieldValue, FormEditor};

use aidesk_app::{
    Action, AppCommand, AppEvent, AppState, Command, DashboardKind, FormSnapshot, Lookups, Notice,
    Outcome, PAGE_SIZE, SearchResult, Severity, View,
};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::{Date, OffsetDateTime};

const NOTICE_TTL: Duration = Duration::from_secs(4);
const FOCUS_MARK: &str = "›";

/// The store-facing half of the UI. Reads and writes are synchronous; the
/// UI blocks on each call.
pub trait DashboardRuntime {
    fn execute(&mut self, command: &Command) -> Outcome;
    fn load_lookups(&mut self, kind: DashboardKind) -> Lookups;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearNotice { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DashboardView {
    editor: FormEditor,
    lookups: Lookups,
    lookups_loaded: bool,
    result: Option<SearchResult>,
    /// Absolute row index into `result`.
    selected_row: usize,
    /// Last form that parsed; its filter re-renders the table when a field
    /// is rejected.
    last_parsed: Option<FormSnapshot>,
}

impl DashboardView {
    fn blank(kind: DashboardKind, today: Date) -> Self {
        Self {
            editor: FormEditor::blank(kind, today),
            lookups: Lookups::default(),
            lookups_loaded: false,
            result: None,
            selected_row: 0,
            last_parsed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewData {
    dashboards: Vec<DashboardView>,
    today: Date,
    notice_token: u64,
}

impl ViewData {
    fn new(today: Date) -> Self {
        Self {
            dashboards: DashboardKind::ALL
                .iter()
                .map(|kind| DashboardView::blank(*kind, today))
                .collect(),
            today,
            notice_token: 0,
        }
    }

    fn dashboard(&self, kind: DashboardKind) -> &DashboardView {
        &self.dashboards[slot(kind)]
    }

    fn dashboard_mut(&mut self, kind: DashboardKind) -> &mut DashboardView {
        &mut self.dashboards[slot(kind)]
    }
}

fn slot(kind: DashboardKind) -> usize {
    DashboardKind::ALL
        .iter()
        .position(|candidate| *candidate == kind)
        .unwrap_or(0)
}

pub fn run_app<R: DashboardRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(OffsetDateTime::now_utc().date());
    let (internal_tx, internal_rx) = mpsc::channel();
    open_dashboard(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearNotice { token } if token == view_data.notice_token => {
                state.dispatch(AppCommand::ClearNotice);
            }
            InternalEvent::ClearNotice { .. } => {}
        }
    }
}

fn schedule_notice_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(NOTICE_TTL);
        let _ = sender.send(InternalEvent::ClearNotice { token });
    });
}

fn emit_notice(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notice: Notice,
) {
    state.dispatch(AppCommand::ShowNotice(notice));
    view_data.notice_token = view_data.notice_token.saturating_add(1);
    schedule_notice_clear(internal_tx, view_data.notice_token);
}

fn handle_key_event<R: DashboardRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c')) {
        return true;
    }

    if state.is_blocked() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            state.dispatch(AppCommand::DismissAlert);
        }
        return false;
    }

    if state.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            state.dispatch(AppCommand::ToggleHelp);
        }
        return false;
    }

    let kind = state.active;
    match (key.code, ctrl) {
        (KeyCode::F(1), _) => {
            state.dispatch(AppCommand::ToggleHelp);
        }
        (KeyCode::Esc, _) => {
            state.dispatch(AppCommand::ClearNotice);
        }
        (KeyCode::Tab, _) => {
            state.dispatch(AppCommand::NextDashboard);
            open_dashboard(state, runtime, view_data, internal_tx);
        }
        (KeyCode::BackTab, _) => {
            state.dispatch(AppCommand::PrevDashboard);
            open_dashboard(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Up, true) => move_row(state, view_data, -1),
        (KeyCode::Down, true) => move_row(state, view_data, 1),
        (KeyCode::Up, false) => view_data.dashboard_mut(kind).editor.move_cursor(-1),
        (KeyCode::Down, false) => view_data.dashboard_mut(kind).editor.move_cursor(1),
        (KeyCode::Left | KeyCode::Right, _) => {
            let delta = if key.code == KeyCode::Left { -1 } else { 1 };
            let dashboard = view_data.dashboard_mut(kind);
            dashboard.editor.cycle(delta, &dashboard.lookups);
        }
        (KeyCode::PageUp, _) => change_page(state, view_data, AppCommand::PrevPage),
        (KeyCode::PageDown, _) => {
            let page_count = view_data
                .dashboard(kind)
                .result
                .as_ref()
                .map_or(1, SearchResult::page_count);
            change_page(state, view_data, AppCommand::NextPage { page_count });
        }
        (KeyCode::Enter, _) => load_selected_row(state, view_data, internal_tx),
        (KeyCode::Char(ch @ ('f' | 'n' | 'u' | 'd')), true) => {
            let action = match ch {
                'n' => Action::Insert,
                'u' => Action::Update,
                'd' => Action::Delete,
                _ => Action::Search,
            };
            run_action(state, runtime, view_data, internal_tx, action);
        }
        (KeyCode::Char('r'), true) => refresh_dashboard(state, runtime, view_data, internal_tx),
        (KeyCode::Char('l'), true) => {
            view_data.dashboard_mut(kind).editor = FormEditor::blank(kind, view_data.today);
            emit_notice(state, view_data, internal_tx, Notice::info("form cleared"));
        }
        (KeyCode::Char(' '), false) => {
            let editor = &mut view_data.dashboard_mut(kind).editor;
            if !editor.toggle() {
                editor.insert_char(' ');
            }
        }
        (KeyCode::Char(ch), false) => {
            view_data.dashboard_mut(kind).editor.insert_char(ch);
        }
        (KeyCode::Backspace, _) => {
            view_data.dashboard_mut(kind).editor.backspace();
        }
        _ => {}
    }
    false
}

/// First visit loads lookups and the unfiltered table; later visits keep
/// whatever the operator left there.
fn open_dashboard<R: DashboardRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let kind = state.active;
    let dashboard = view_data.dashboard_mut(kind);
    if kind.has_lookups() && !dashboard.lookups_loaded {
        dashboard.lookups = runtime.load_lookups(kind);
        dashboard.lookups_loaded = true;
    }
    if dashboard.result.is_none() {
        let blank = FormEditor::blank(kind, view_data.today);
        if let Ok(snapshot) = blank.snapshot() {
            let outcome = runtime.execute(&Command::search(snapshot));
            apply_outcome(state, view_data, internal_tx, outcome);
        }
    }
}

fn refresh_dashboard<R: DashboardRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let kind = state.active;
    if kind.has_lookups() {
        let dashboard = view_data.dashboard_mut(kind);
        dashboard.lookups = runtime.load_lookups(kind);
        dashboard.lookups_loaded = true;
    }
    let blank = FormEditor::blank(kind, view_data.today);
    if let Ok(snapshot) = blank.snapshot() {
        let outcome = runtime.execute(&Command::search(snapshot));
        apply_outcome(state, view_data, internal_tx, outcome);
    }
    if state.alert.is_none() {
        emit_notice(state, view_data, internal_tx, Notice::info("lists refreshed"));
    }
}

fn run_action<R: DashboardRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: Action,
) {
    let kind = state.active;
    let snapshot = match view_data.dashboard(kind).editor.snapshot() {
        Ok(snapshot) => snapshot,
        Err(error) => {
            let fallback = view_data
                .dashboard(kind)
                .last_parsed
                .clone()
                .unwrap_or_else(|| FormSnapshot::blank_for(kind, view_data.today));
            let outcome = runtime.execute(&Command::search(fallback));
            apply_outcome(state, view_data, internal_tx, outcome);
            let notice = Notice::warning(format!("{error:#} -- fix the field and retry"));
            emit_notice(state, view_data, internal_tx, notice);
            return;
        }
    };
    view_data.dashboard_mut(kind).last_parsed = Some(snapshot.clone());
    let outcome = runtime.execute(&Command::new(action, snapshot));
    apply_outcome(state, view_data, internal_tx, outcome);
}

fn apply_outcome(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    outcome: Outcome,
) {
    let Outcome { notice, view } = outcome;
    match view {
        View::Table(result) => {
            let dashboard = view_data.dashboard_mut(result.kind());
            dashboard.result = Some(result);
            dashboard.selected_row = 0;
            state.dispatch(AppCommand::ResetPage);
        }
        View::Alert(message) => {
            state.dispatch(AppCommand::RaiseAlert(message));
        }
    }
    if let Some(notice) = notice {
        emit_notice(state, view_data, internal_tx, notice);
    }
}

fn change_page(state: &mut AppState, view_data: &mut ViewData, command: AppCommand) {
    let events = state.dispatch(command);
    if let Some(AppEvent::PageChanged(page)) = events.first() {
        view_data.dashboard_mut(state.active).selected_row = page * PAGE_SIZE;
    }
}

/// Moves the row cursor without leaving the current page.
fn move_row(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let dashboard = view_data.dashboard_mut(state.active);
    let Some(result) = &dashboard.result else {
        return;
    };
    if result.is_empty() {
        return;
    }
    let first = result.clamp_page(state.page) * PAGE_SIZE;
    let last = (first + PAGE_SIZE).min(result.len()) - 1;
    let next = (dashboard.selected_row as isize + delta).clamp(first as isize, last as isize);
    dashboard.selected_row = next as usize;
}

fn load_selected_row(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let dashboard = view_data.dashboard_mut(state.active);
    let Some(result) = &dashboard.result else {
        return;
    };
    let row = dashboard.selected_row;
    if dashboard.editor.load_row(result, row) {
        let message = format!("row {} loaded into the form", row + 1);
        emit_notice(state, view_data, internal_tx, Notice::info(message));
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let titles = DashboardKind::ALL
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("aidesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(slot(state.active));
    frame.render_widget(tabs, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(36), Constraint::Percentage(64)])
        .split(layout[1]);
    let dashboard = view_data.dashboard(state.active);
    render_form(frame, body[0], state.active, dashboard);
    render_table(frame, body[1], state, dashboard);

    let (status, color) = match &state.notice {
        Some(notice) => (
            format!("{}: {}", notice.severity.label(), notice.message),
            severity_color(notice.severity),
        ),
        None => (KEY_HINTS.to_owned(), Color::Gray),
    };
    let status_widget = Paragraph::new(status)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[2]);

    if state.show_help {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }

    if let Some(message) = &state.alert {
        let area = centered_rect(60, 30, frame.area());
        frame.render_widget(Clear, area);
        let alert = Paragraph::new(format!("{message}\n\nesc to dismiss"))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("error")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(alert, area);
    }
}

fn render_form(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    kind: DashboardKind,
    dashboard: &DashboardView,
) {
    let lines = form_lines(dashboard)
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            if index == dashboard.editor.cursor() {
                Line::styled(
                    text,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Line::raw(text)
            }
        })
        .collect::<Vec<_>>();
    let form = Paragraph::new(lines).block(
        Block::default()
            .title(kind.entity_label())
            .borders(Borders::ALL),
    );
    frame.render_widget(form, area);
}

fn form_lines(dashboard: &DashboardView) -> Vec<String> {
    let editor = &dashboard.editor;
    editor
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let mark = if index == editor.cursor() {
                FOCUS_MARK
            } else {
                " "
            };
            let value = editor.display_value(field, &dashboard.lookups);
            format!("{mark} {:<22} {value}", field.label)
        })
        .collect()
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    dashboard: &DashboardView,
) {
    let Some(result) = &dashboard.result else {
        let empty = Paragraph::new(String::new()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.active.label()),
        );
        frame.render_widget(empty, area);
        return;
    };

    let page = result.clamp_page(state.page);
    let headers = result.headers();
    let widths = vec![Constraint::Min(6); headers.len().max(1)];
    let header = Row::new(headers.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let first = page * PAGE_SIZE;
    let rows = result
        .page_rows(page)
        .into_iter()
        .enumerate()
        .map(|(offset, cells)| {
            let row = Row::new(cells);
            if first + offset == dashboard.selected_row {
                row.style(Style::default().bg(Color::DarkGray))
            } else {
                row
            }
        });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state.active, result, page))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn table_title(kind: DashboardKind, result: &SearchResult, page: usize) -> String {
    let rows = result.len();
    let noun = if rows == 1 { "row" } else { "rows" };
    format!(
        "{} | {rows} {noun} | page {}/{}",
        kind.label(),
        page + 1,
        result.page_count()
    )
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::White,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

const KEY_HINTS: &str = "tab dashboards | up/down fields | ^F search ^N insert ^U update ^D delete | ^R refresh | F1 help | ^Q quit";

fn help_overlay_text() -> &'static str {
    "dashboards: tab/shift+tab switch\n\
form: up/down field | type to edit | left/right choose | space toggle | ctrl+l clear\n\
actions: ctrl+f search | ctrl+n insert | ctrl+u update | ctrl+d delete\n\
lists: ctrl+r reload lookups and table\n\
table: ctrl+up/ctrl+down row | enter load row into form | pgup/pgdn page\n\
search: id wins when set, else the name field filters, else everything\n\
global: esc dismiss notice/alert | f1 help | ctrl+q or ctrl+c quit"
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
