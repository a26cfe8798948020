//! Interactive search state and event loop.
//!
//! The app has two modes, switched with Tab:
//!
//! - **Search**: every keystroke reruns the ranked [`Searcher`] over the whole
//!   index, the same results `search` prints.
//! - **Fuzzy**: `nucleo` matches the query against every documented object's full
//!   name, which is handy when you half-remember an identifier.
//!
//! Redraws happen only when state changed, or every 100ms so terminal resizes
//! are picked up.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use nucleo::pattern::{CaseMatching, Normalization};
use nucleo::{Config, Nucleo};
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::debug;

use super::events::{Action, poll_event};
use super::rendering::{RenderState, render_ui};
use crate::clipboard::{copy_to_clipboard, link_for};
use crate::models::{ResultKind, SearchIndex, SearchResult};
use crate::query::Searcher;

const STATUS_SUCCESS_MS: u64 = 3000;
const STATUS_ERROR_MS: u64 = 5000;
const MAX_QUERY_LEN: usize = 256;
const PAGE: isize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Search,
    Fuzzy,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Search => "SEARCH",
            Mode::Fuzzy => "FUZZY",
        }
    }

    fn toggled(self) -> Self {
        match self {
            Mode::Search => Mode::Fuzzy,
            Mode::Fuzzy => Mode::Search,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status-bar message
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// One row per documented object, shaped like an object search hit
fn object_rows(index: &SearchIndex) -> Vec<SearchResult> {
    index
        .iter_objects()
        .filter_map(|(prefix, entry)| {
            let (docname, filename, page_title) = index.document(entry.doc_id)?;
            let label = index.objname(entry.type_id).map(|n| n.label.as_str()).unwrap_or("");
            Some(SearchResult {
                docname: docname.to_string(),
                title: entry.fullname(prefix),
                anchor: format!("#{}", index.resolve_anchor(prefix, entry)),
                description: Some(format!("{}, in {}", label, page_title)),
                score: 0,
                filename: filename.to_string(),
                kind: ResultKind::Object,
            })
        })
        .collect()
}

pub struct App<'a> {
    searcher: Searcher<'a>,
    nucleo: Nucleo<SearchResult>,
    object_count: usize,
    mode: Mode,
    query: String,
    results: Vec<SearchResult>,
    selected_idx: usize,
    base_url: Option<String>,
    status_message: Option<StatusMessage>,
    should_quit: bool,
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl<'a> App<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        let nucleo = Nucleo::new(Config::DEFAULT, Arc::new(|| {}), None, 1);
        let rows = object_rows(index);
        let object_count = rows.len();

        let injector = nucleo.injector();
        for row in rows {
            injector.push(row, |row, cols| {
                cols[0] = row.title.as_str().into();
            });
        }

        Self {
            searcher: Searcher::new(index),
            nucleo,
            object_count,
            mode: Mode::Search,
            query: String::new(),
            results: Vec::new(),
            selected_idx: 0,
            base_url: None,
            status_message: None,
            should_quit: false,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        }
    }

    /// Prefix copied links with the published site's URL
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.clear_expired_status();
            self.nucleo.tick(10);

            let rows = self.visible_rows();
            let row_count = rows.len();

            let now = Instant::now();
            if self.needs_redraw || now.duration_since(self.last_draw_time) >= Duration::from_millis(100)
            {
                terminal.draw(|f| {
                    let state = RenderState {
                        query: &self.query,
                        mode: self.mode,
                        document_count: self.searcher.index().document_count(),
                        object_count: self.object_count,
                        status_message: self.status_message.as_ref(),
                    };
                    render_ui(f, &rows, self.selected_idx, &state);
                })?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action, row_count);
        }
        Ok(())
    }

    /// Rows for the current mode, best first
    fn visible_rows(&self) -> Vec<&SearchResult> {
        match self.mode {
            Mode::Search => self.results.iter().collect(),
            Mode::Fuzzy => {
                let snapshot = self.nucleo.snapshot();
                snapshot
                    .matched_items(..snapshot.matched_item_count())
                    .map(|item| item.data)
                    .collect()
            }
        }
    }

    fn handle_action(&mut self, action: Action, row_count: usize) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ClearQuery => {
                if self.query.is_empty() {
                    self.should_quit = true;
                } else {
                    self.query.clear();
                    self.refresh();
                }
            }
            Action::MoveUp => self.move_selection(-1, row_count),
            Action::MoveDown => self.move_selection(1, row_count),
            Action::PageUp => self.move_selection(-PAGE, row_count),
            Action::PageDown => self.move_selection(PAGE, row_count),
            Action::Top => self.move_selection(isize::MIN / 2, row_count),
            Action::Bottom => self.move_selection(isize::MAX / 2, row_count),
            Action::ToggleMode => {
                self.mode = self.mode.toggled();
                debug!(mode = self.mode.label(), "Switched mode");
                self.refresh();
            }
            Action::CopyLink => self.copy_selected_link(),
            Action::Type(c) => {
                if self.query.chars().count() < MAX_QUERY_LEN {
                    self.query.push(c);
                    self.refresh();
                }
            }
            Action::Backspace => {
                if self.query.pop().is_some() {
                    self.refresh();
                }
            }
            Action::None => {}
        }
    }

    /// Recompute matches for the current query in the current mode
    fn refresh(&mut self) {
        match self.mode {
            Mode::Search => {
                self.results = if self.query.trim().is_empty() {
                    Vec::new()
                } else {
                    self.searcher.search(&self.query)
                };
            }
            Mode::Fuzzy => {
                self.nucleo.pattern.reparse(
                    0,
                    self.query.trim(),
                    CaseMatching::Smart,
                    Normalization::Smart,
                    false,
                );
                self.nucleo.tick(10);
            }
        }
        self.selected_idx = 0;
        self.needs_redraw = true;
    }

    fn move_selection(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.selected_idx = 0;
            return;
        }
        let target = (self.selected_idx as isize).saturating_add(delta).max(0) as usize;
        let target = target.min(total - 1);
        if target != self.selected_idx {
            self.selected_idx = target;
            self.needs_redraw = true;
        }
    }

    fn copy_selected_link(&mut self) {
        let link = {
            let rows = self.visible_rows();
            rows.get(self.selected_idx).map(|row| link_for(self.base_url.as_deref(), &row.url()))
        };
        let Some(link) = link else {
            self.set_status("✗ No result selected", MessageType::Error, STATUS_ERROR_MS);
            return;
        };
        match copy_to_clipboard(&link) {
            Ok(()) => {
                self.set_status(format!("✓ Copied {}", link), MessageType::Success, STATUS_SUCCESS_MS)
            }
            Err(e) => {
                self.set_status(format!("✗ Clipboard error: {}", e), MessageType::Error, STATUS_ERROR_MS)
            }
        }
    }

    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType, duration_ms: u64) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    fn clear_expired_status(&mut self) {
        if self.status_message.as_ref().is_some_and(|msg| Instant::now() >= msg.expires_at) {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }
}
