use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

/// Render a centered error banner offering a retry: [r]etry, and
/// optionally [R]eload all
pub fn render_error(frame: &mut Frame, title: &str, message: &str, allow_reload: bool) {
    let area = centered_rect(60, 8, frame.area());
    frame.render_widget(Clear, area);

    let mut keys = vec![
        Span::styled("[r]", Style::default().fg(Color::Green)),
        Span::raw("etry"),
    ];
    if allow_reload {
        keys.push(Span::raw("  "));
        keys.push(Span::styled("[R]", Style::default().fg(Color::Yellow)));
        keys.push(Span::raw("eload all"));
    }

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(keys),
    ];

    let popup = Paragraph::new(lines)
        .block(
            Block::default().borders(Borders::ALL).title(Span::styled(
                format!(" {} ", title),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
        )
        .wrap(Wrap { trim: true })
        .alignment(ratatui::layout::Alignment::Center);

    frame.render_widget(popup, area);
}

/// Create a rect of the given size centered in the outer rect
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let popup_width = width.min(outer.width);
    let popup_height = height.min(outer.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((outer.height.saturating_sub(popup_height)) / 2),
            Constraint::Length(popup_height),
            Constraint::Min(0),
        ])
        .split(outer);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((outer.width.saturating_sub(popup_width)) / 2),
            Constraint::Length(popup_width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
