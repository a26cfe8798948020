use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::app::{MessageType, Mode, StatusMessage};
use super::layout::AppLayout;
use crate::models::{ResultKind, SearchResult};
use crate::utils::single_line;

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const DANGER: Color = Color::Rgb(239, 68, 68);
const BAR: Color = Color::Rgb(24, 24, 27);

/// Everything besides the rows that the frame needs
pub struct RenderState<'a> {
    pub query: &'a str,
    pub mode: Mode,
    pub document_count: usize,
    pub object_count: usize,
    pub status_message: Option<&'a StatusMessage>,
}

pub fn render_ui(frame: &mut Frame, rows: &[&SearchResult], selected_idx: usize, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_query(frame, layout.query_area, state);
    render_results_list(frame, layout.results_area, rows, selected_idx);
    render_preview(frame, layout.preview_area, rows.get(selected_idx).copied());
    render_status_bar(frame, layout.status_area, rows.len(), selected_idx, state);
}

fn bordered(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).border_style(Style::default().fg(MUTED)).title(title)
}

fn kind_tag(kind: ResultKind) -> &'static str {
    match kind {
        ResultKind::Object => "obj",
        ResultKind::Index => "idx",
        ResultKind::Title => "sec",
        ResultKind::Text => "txt",
    }
}

fn render_query(frame: &mut Frame, area: Rect, state: &RenderState) {
    let line = Line::from(vec![
        Span::styled(format!("[{}] ", state.mode.label()), Style::default().fg(ACCENT)),
        Span::raw(single_line(state.query)),
        Span::styled("█", Style::default().fg(MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line).block(bordered(" Query ")), area);
}

fn render_results_list(frame: &mut Frame, area: Rect, rows: &[&SearchResult], selected_idx: usize) {
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut content = format!("{} {}", kind_tag(row.kind), single_line(&row.title));
            if let Some(description) = row.description.as_deref() {
                let short: String = single_line(description).chars().take(40).collect();
                content.push_str(" · ");
                content.push_str(&short);
            }

            let style = if idx == selected_idx {
                Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };
            ListItem::new(content).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(bordered(" Results ")), area);
}

fn field<'a>(name: &'a str, value: String) -> Line<'a> {
    Line::from(vec![Span::styled(format!("{}: ", name), Style::default().fg(MUTED)), Span::raw(value)])
}

fn render_preview(frame: &mut Frame, area: Rect, row: Option<&SearchResult>) {
    let content = match row {
        Some(row) => {
            let anchor = row.anchor.trim_start_matches('#');
            let mut lines = vec![
                Line::from(Span::styled(single_line(&row.title), Style::default().add_modifier(Modifier::BOLD))),
                Line::from(""),
                field("Kind", row.kind.as_str().to_string()),
                field("Page", row.docname.clone()),
                field("File", row.filename.clone()),
                field("Anchor", if anchor.is_empty() { "(page)".to_string() } else { anchor.to_string() }),
                field("Link", row.url()),
            ];
            if row.score != 0 {
                lines.push(field("Score", row.score.to_string()));
            }
            if let Some(description) = row.description.as_deref() {
                lines.push(Line::from(""));
                lines.push(Line::from(single_line(description)));
            }
            Text::from(lines)
        }
        None => Text::from("Type to search. Tab switches between ranked and fuzzy matching."),
    };

    let paragraph = Paragraph::new(content).block(bordered(" Preview ")).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    row_count: usize,
    selected_idx: usize,
    state: &RenderState,
) {
    let (text, style) = match state.status_message {
        Some(msg) => {
            let fg = match msg.message_type {
                MessageType::Success => ACCENT,
                MessageType::Error => DANGER,
            };
            (format!(" {} ", msg.text), Style::default().fg(fg).bg(BAR))
        }
        None => {
            let mut parts = vec![format!("{} pages, {} objects", state.document_count, state.object_count)];
            if row_count > 0 {
                parts.push(format!("result {}/{}", selected_idx + 1, row_count));
            } else if !state.query.trim().is_empty() {
                parts.push("no matches".to_string());
            }
            parts.push("Tab: mode".to_string());
            parts.push("Ctrl+Y: copy link".to_string());
            let escape = if state.query.is_empty() { "Esc: quit" } else { "Esc: clear" };
            parts.push(escape.to_string());
            (format!(" {} ", parts.join(" | ")), Style::default().fg(BRIGHT).bg(BAR))
        }
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn result(title: &str, kind: ResultKind) -> SearchResult {
        SearchResult {
            docname: "api".into(),
            title: title.into(),
            anchor: "#pkg.run".into(),
            description: Some("Python function, in API Reference".into()),
            score: 16,
            filename: "api.rst".into(),
            kind,
        }
    }

    fn state<'a>(query: &'a str, status: Option<&'a StatusMessage>) -> RenderState<'a> {
        RenderState { query, mode: Mode::Search, document_count: 3, object_count: 12, status_message: status }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_ui_with_rows() {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        let rows = [result("pkg.run", ResultKind::Object), result("Usage", ResultKind::Title)];
        let refs: Vec<&SearchResult> = rows.iter().collect();

        terminal.draw(|f| render_ui(f, &refs, 0, &state("run", None))).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("[SEARCH]"));
        assert!(text.contains("obj pkg.run"));
        assert!(text.contains("api.html#pkg.run"));
        assert!(text.contains("result 1/2"));
    }

    #[test]
    fn test_render_ui_empty() {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        terminal.draw(|f| render_ui(f, &[], 0, &state("", None))).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("3 pages, 12 objects"));
        assert!(text.contains("Esc: quit"));
    }

    #[test]
    fn test_render_no_matches() {
        let mut terminal = Terminal::new(TestBackend::new(120, 1)).unwrap();

        terminal
            .draw(|f| {
                let area = f.area();
                render_status_bar(f, area, 0, 0, &state("zzz", None));
            })
            .unwrap();

        assert!(screen_text(&terminal).contains("no matches"));
    }

    #[test]
    fn test_render_status_message() {
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        let msg = StatusMessage {
            text: "✗ Clipboard error: unavailable".into(),
            message_type: MessageType::Error,
            expires_at: Instant::now() + Duration::from_secs(5),
        };

        terminal
            .draw(|f| {
                let area = f.area();
                render_status_bar(f, area, 1, 0, &state("x", Some(&msg)));
            })
            .unwrap();

        assert!(screen_text(&terminal).contains("Clipboard error"));
    }

    #[test]
    fn test_render_preview_page_result() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut row = result("Welcome", ResultKind::Text);
        row.anchor.clear();
        row.description = None;

        terminal
            .draw(|f| {
                let area = f.area();
                render_preview(f, area, Some(&row));
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("(page)"));
        assert!(text.contains("api.html"));
    }

    #[test]
    fn test_render_strips_control_sequences() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let rows = [result("\x1b[31mred\x1b[0m", ResultKind::Object)];
        let refs: Vec<&SearchResult> = rows.iter().collect();

        terminal
            .draw(|f| {
                let area = f.area();
                render_results_list(f, area, &refs, 0);
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("obj red"));
        assert!(!text.contains('\x1b'));
    }
}
