//! TUI rendering functions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use flowchat_core::Role;

use crate::app::ChatSession;

const TITLE: &str = "AI Analytics Assistant";

/// Draw the full UI.
pub fn draw(frame: &mut Frame, session: &mut ChatSession) {
    // Compute input height: wrap the input text to the available inner width.
    let inner_input_width = frame.area().width.saturating_sub(2) as usize; // minus borders
    let input_lines = saturate_rows(wrapped_rows(
        UnicodeWidthStr::width(session.input.as_str()),
        inner_input_width,
    ));
    // +2 for borders, cap at a third of the screen so messages stay visible
    let max_input_height = frame.area().height / 3;
    let input_height = input_lines.saturating_add(2).min(max_input_height).max(3);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Header
            Constraint::Min(5),               // Messages
            Constraint::Length(input_height), // Input (dynamic)
            Constraint::Length(1),            // Status bar
        ])
        .split(frame.area());

    draw_header(frame, session, chunks[0]);
    draw_messages(frame, session, chunks[1]);
    draw_input(frame, session, chunks[2]);
    draw_status_bar(frame, session, chunks[3]);
}

/// Rows a line of `display_width` columns takes when wrapped to `width`.
fn wrapped_rows(display_width: usize, width: usize) -> usize {
    if width == 0 || display_width == 0 {
        return 1;
    }
    display_width.div_ceil(width)
}

/// Clamp a row count to what the terminal widgets can address.
fn saturate_rows(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn draw_header(frame: &mut Frame, session: &ChatSession, area: Rect) {
    let flow = if session.settings.flow_id.is_empty() {
        String::new()
    } else {
        format!(" | Flow: {}", session.settings.flow_id)
    };
    let busy = if session.is_loading {
        " [thinking...]"
    } else {
        ""
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            TITLE,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(flow),
        Span::styled(busy, Style::default().fg(Color::Yellow)),
    ]));

    frame.render_widget(header, area);
}

fn draw_messages(frame: &mut Frame, session: &mut ChatSession, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    for msg in session.messages() {
        let (prefix, color) = match msg.role {
            Role::User => ("You: ", Color::Green),
            Role::Assistant => ("Assistant: ", Color::Blue),
        };
        let prefix_style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let mut content_lines = msg.content.split('\n');
        lines.push(Line::from(vec![
            Span::styled(prefix, prefix_style),
            Span::raw(content_lines.next().unwrap_or_default()),
        ]));
        let indent = " ".repeat(prefix.len());
        for content_line in content_lines {
            lines.push(Line::from(vec![
                Span::raw(indent.clone()),
                Span::raw(content_line),
            ]));
        }
    }

    if session.is_loading {
        lines.push(Line::from(Span::styled(
            "Thinking...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let inner_height = area.height.saturating_sub(2); // minus borders
    let inner_width = area.width.saturating_sub(2) as usize; // minus borders

    // Count wrapped visual lines using unicode display width
    let total: usize = lines
        .iter()
        .map(|line| {
            let display_width: usize = line
                .spans
                .iter()
                .map(|s| UnicodeWidthStr::width(s.content.as_ref()))
                .sum();
            wrapped_rows(display_width, inner_width)
        })
        .sum();
    let total = saturate_rows(total);

    // Scroll offset is kept relative to the bottom
    let max_scroll = total.saturating_sub(inner_height);
    let scroll = if session.scroll_pinned {
        max_scroll
    } else {
        max_scroll.saturating_sub(session.scroll_offset)
    };

    let title = if session.scroll_pinned {
        "Conversation".to_string()
    } else {
        format!(
            "Conversation [scroll: {}/{}]",
            max_scroll.saturating_sub(scroll),
            max_scroll
        )
    };

    let messages = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(messages, area);

    // Record the bounds so scroll methods can clamp
    session.viewport_height = inner_height;
    session.total_lines = total;
}

#[allow(clippy::cast_possible_truncation)]
fn draw_input(frame: &mut Frame, session: &ChatSession, area: Rect) {
    let input = Paragraph::new(session.input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(if session.is_loading {
                    "Waiting..."
                } else {
                    "Ask about your social media analytics"
                }),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(input, area);

    // Position cursor accounting for text wrapping.
    let inner_width = area.width.saturating_sub(2) as usize; // minus borders
    let cursor_display_width =
        UnicodeWidthStr::width(&session.input[..session.cursor_pos.min(session.input.len())]);

    let (cursor_row, cursor_col) = if inner_width == 0 {
        (0u16, 0u16)
    } else {
        (
            (cursor_display_width / inner_width) as u16,
            (cursor_display_width % inner_width) as u16,
        )
    };

    let cursor_x = area.x.saturating_add(1).saturating_add(cursor_col);
    let cursor_y = area.y.saturating_add(1).saturating_add(cursor_row);
    // Clamp to stay within the input area
    let cursor_x = cursor_x.min(area.x.saturating_add(area.width.saturating_sub(2)));
    let cursor_y = cursor_y.min(area.y.saturating_add(area.height.saturating_sub(2)));
    frame.set_cursor_position((cursor_x, cursor_y));
}

fn draw_status_bar(frame: &mut Frame, session: &ChatSession, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(&session.status, Style::default().fg(Color::DarkGray)),
        Span::styled(
            " | Ctrl+C: quit | Enter: send | PgUp/PgDn: scroll",
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    frame.render_widget(status, area);
}
