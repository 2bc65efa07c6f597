// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Provides the interactive call-tree viewer (ratatui + crossterm), including a built-in demo
//! trace. The poller runs as a tokio task and feeds the UI thread through a channel; the UI
//! thread owns the [`TraceSession`] and applies each tick's batch before drawing.

use std::{collections::HashSet, io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::format::{display_name, is_model_call, pretty_json, short_summary, strip_indent};
use crate::model::{CallId, CallRecord};
use crate::nav::KeyMap;
use crate::session::TraceSession;
use crate::tail::{LogSource, TailConfig, TailEvent, TailPoller};

pub mod demo;

const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(100);
const SELECTED_COLOR: Color = Color::LightGreen;
const UNFOCUSED_COLOR: Color = Color::DarkGray;
const ARGS_COLOR: Color = Color::LightMagenta;
const RESULT_COLOR: Color = Color::LightBlue;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const STALLED_COLOR: Color = Color::LightRed;
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const MODEL_CALL_MARKER: &str = "💬";

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("ui thread failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Tails `source` into `session` and runs the terminal UI until the user quits.
///
/// The poller task is cancelled when the UI returns, whatever the reason.
pub async fn run_live<S>(
    session: TraceSession,
    source: S,
    config: TailConfig,
) -> Result<(), TuiError>
where
    S: LogSource + 'static,
{
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let poller = TailPoller::with_cancel(source, config, cancel.clone());
    let poll_task = tokio::spawn(async move {
        let mut tx = tx;
        poller.run(&mut tx).await;
    });

    let ui_cancel = cancel.clone();
    let ui = tokio::task::spawn_blocking(move || run(session, rx, ui_cancel)).await;

    cancel.cancel();
    if let Err(err) = poll_task.await {
        debug!(error = %err, "poller task ended abnormally");
    }
    ui?
}

/// Blocking UI loop. Drains `events` before every frame.
pub fn run(
    session: TraceSession,
    mut events: UnboundedReceiver<TailEvent>,
    cancel: CancellationToken,
) -> Result<(), TuiError> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(session);
    info!(trace = %app.session.trace_id(), "viewer started");

    while !app.should_quit && !cancel.is_cancelled() {
        app.drain_events(&mut events);
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(FRAME_POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                }
                _ => {}
            }
        }
        app.frame = app.frame.wrapping_add(1);
    }

    cancel.cancel();
    info!(trace = %app.session.trace_id(), "viewer closed");
    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let main_area = layout[0];
    let status_area = layout[1];

    let direction = if stack_panes_vertically(main_area) {
        Direction::Vertical
    } else {
        Direction::Horizontal
    };
    let panes = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_area);

    let rows = app.visible_rows();
    let selected_index = app
        .session
        .nav()
        .selected()
        .and_then(|selected| rows.iter().position(|row| &row.id == selected));
    app.list_state.select(selected_index);

    let focus = app.session.focus();
    let items = rows
        .iter()
        .map(|row| {
            let record = app.session.tree().get(&row.id);
            ListItem::new(tree_row_line(row, record, focus.contains(&row.id), app.frame))
        })
        .collect::<Vec<_>>();

    let tree_block = Block::default().borders(Borders::ALL).title(tree_title(&app.session));
    let list = List::new(items)
        .block(tree_block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED).fg(SELECTED_COLOR));
    frame.render_stateful_widget(list, panes[0], &mut app.list_state);

    let detail = Paragraph::new(Text::from(detail_lines(&app.session, app.tab)))
        .block(Block::default().borders(Borders::ALL).title(detail_title(app.tab)))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(detail, panes[1]);

    frame.render_widget(Paragraph::new(status_line(&app.session)), status_area);
}

// Extracted tree/detail/footer rendering helpers.
include!("chrome.rs");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailTab {
    InputsOutputs,
    Source,
}

impl DetailTab {
    fn toggle(self) -> Self {
        match self {
            Self::InputsOutputs => Self::Source,
            Self::Source => Self::InputsOutputs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TreeRow {
    id: CallId,
    depth: usize,
    child_count: usize,
    expanded: bool,
}

struct App {
    session: TraceSession,
    keys: KeyMap,
    tab: DetailTab,
    detail_scroll: u16,
    list_state: ListState,
    frame: usize,
    should_quit: bool,
}

impl App {
    fn new(session: TraceSession) -> Self {
        Self {
            session,
            keys: KeyMap::standard(),
            tab: DetailTab::InputsOutputs,
            detail_scroll: 0,
            list_state: ListState::default(),
            frame: 0,
            should_quit: false,
        }
    }

    fn drain_events(&mut self, events: &mut UnboundedReceiver<TailEvent>) {
        while let Ok(event) = events.try_recv() {
            self.session.handle_event(event);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    /// Returns `true` when the key asks to quit.
    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        let dispatch = self.session.dispatch_key(&self.keys, code);
        if dispatch.is_handled() {
            self.detail_scroll = 0;
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = self.tab.toggle();
                self.detail_scroll = 0;
            }
            KeyCode::PageDown => self.detail_scroll = self.detail_scroll.saturating_add(10),
            KeyCode::PageUp => self.detail_scroll = self.detail_scroll.saturating_sub(10),
            _ => {}
        }
        false
    }

    /// Rows of the tree pane: the children of the first top-level call, descending into
    /// expanded nodes.
    fn visible_rows(&self) -> Vec<TreeRow> {
        let tree = self.session.tree();
        let nav = self.session.nav();
        let mut rows = Vec::new();
        let Some(first_root) = tree.first_top_level() else {
            return rows;
        };

        let mut seen = HashSet::from([first_root.clone()]);
        let mut stack: Vec<(CallId, usize)> =
            tree.children_of(first_root).iter().rev().map(|id| (id.clone(), 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let children = tree.children_of(&id);
            let expanded = nav.is_expanded(&id);
            if expanded {
                stack.extend(children.iter().rev().map(|child| (child.clone(), depth + 1)));
            }
            rows.push(TreeRow { child_count: children.len(), expanded, id, depth });
        }
        rows
    }
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{draw, App, DetailTab, TailEvent, TraceSession};
    use crossterm::event::KeyCode;
    use ratatui::{backend::TestBackend, Terminal};

    pub(crate) struct HeadlessTui {
        app: App,
    }

    impl HeadlessTui {
        pub(crate) fn new(session: TraceSession) -> Self {
            Self { app: App::new(session) }
        }

        pub(crate) fn push(&mut self, event: TailEvent) {
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            let _ = tx.send(event);
            self.app.drain_events(&mut rx);
        }

        pub(crate) fn press(&mut self, code: KeyCode) -> bool {
            self.app.handle_key_code(code)
        }

        pub(crate) fn session(&self) -> &TraceSession {
            &self.app.session
        }

        pub(crate) fn showing_source(&self) -> bool {
            self.app.tab == DetailTab::Source
        }

        /// Tree pane rows as `(depth, display name)`.
        pub(crate) fn rows(&self) -> Vec<(usize, String)> {
            self.app
                .visible_rows()
                .into_iter()
                .map(|row| {
                    let name = self
                        .app
                        .session
                        .tree()
                        .get(&row.id)
                        .map(super::display_name)
                        .unwrap_or_default();
                    (row.depth, name)
                })
                .collect()
        }

        /// Renders one frame and returns the screen as text, one string per terminal row.
        pub(crate) fn render(&mut self, width: u16, height: u16) -> Vec<String> {
            let backend = TestBackend::new(width, height);
            let mut terminal = Terminal::new(backend).expect("test terminal");
            terminal.draw(|frame| draw(frame, &mut self.app)).expect("draw frame");
            let buffer = terminal.backend().buffer();
            (0..height)
                .map(|y| (0..width).map(|x| buffer[(x, y)].symbol().to_owned()).collect::<String>())
                .collect()
        }
    }
}
