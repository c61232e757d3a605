//! Mapping the slot sequence to terminal rows.
//!
//! Rendering is read-only over the presenter: the slot pool knows
//! nothing about rows, styles, or widths.

use crate::engine::ChatEngine;
use crate::state::{SlotContent, StreamPresenter};
use crate::view::UiState;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

pub(crate) fn draw(
    frame: &mut Frame,
    presenter: &StreamPresenter,
    engine: &dyn ChatEngine,
    ui: &UiState,
) {
    let [header, body, composer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    render_header(frame, header, presenter, ui);
    render_comments(frame, body, presenter, engine, ui);
    render_composer(frame, composer, ui);
}

fn render_header(frame: &mut Frame, area: Rect, presenter: &StreamPresenter, ui: &UiState) {
    let title = presenter.stream_title().unwrap_or("connecting…");
    // Filled marker once the broadcaster's avatar has loaded.
    let host_marker = if presenter.broadcaster_avatar().is_some() {
        "◉ "
    } else {
        "○ "
    };
    let mut spans = vec![
        Span::raw(host_marker),
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("♥ {}", presenter.stream_hearts()),
            Style::default().fg(Color::Red),
        ),
    ];
    if presenter.own_avatar().is_some() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("you ◉", Style::default().fg(Color::Green)));
    }
    if ui.autoheart_on {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("auto-heart on", Style::default().fg(Color::Yellow)));
    }

    let widget = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_comments(
    frame: &mut Frame,
    area: Rect,
    presenter: &StreamPresenter,
    engine: &dyn ChatEngine,
    ui: &UiState,
) {
    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = presenter
        .comments()
        .map(|content| ListItem::new(comment_line(content, engine, width)))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("chat"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if presenter.occupied() > 0 {
        state.select(Some(ui.selected.min(presenter.occupied() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn comment_line<'a>(content: &'a SlotContent, engine: &dyn ChatEngine, width: usize) -> Line<'a> {
    // System messages have no identity and render as a quiet notice.
    let Some(author) = content.author else {
        return Line::from(vec![
            Span::styled("· ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                truncate_to_width(&content.body, width.saturating_sub(2)),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]);
    };

    if content.deleted {
        return Line::from(Span::styled(
            "[deleted]",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
        ));
    }

    let name = engine.user_info(author).name;
    let avatar_marker = if content.avatar.is_some() { "◉ " } else { "○ " };
    let mut spans = vec![
        Span::raw(avatar_marker),
        Span::styled(name, Style::default().fg(Color::Cyan)),
        Span::raw(": "),
    ];

    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    spans.push(Span::raw(truncate_to_width(
        &content.body,
        width.saturating_sub(used + 6),
    )));

    if !content.hearts.is_empty() {
        spans.push(Span::styled(
            format!("  ♥{}", content.hearts.len()),
            Style::default().fg(Color::Red),
        ));
    }

    Line::from(spans)
}

fn render_composer(frame: &mut Frame, area: Rect, ui: &UiState) {
    let widget = Paragraph::new(Line::from(vec![
        Span::raw("> "),
        Span::raw(ui.composer.as_str()),
        Span::styled("▏", Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("post"));
    frame.render_widget(widget, area);
}

/// Clip to a display width, appending an ellipsis when text was cut.
fn truncate_to_width(text: &str, max: usize) -> String {
    let mut width = 0usize;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max {
            out.push('…');
            break;
        }
        width += w;
        out.push(ch);
    }
    out
}
