mod detail;
mod gallery;
mod popup;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::Gallery => gallery::render(frame, app, chunks[1]),
        Screen::Detail => detail::render(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.screen {
        Screen::Gallery => format!(
            "pixgrid - {} ({} photos, page {})",
            app.source().name(),
            app.state().items.len(),
            app.state().current_page
        ),
        Screen::Detail => match app.detail_state() {
            Some(detail) => match &detail.photo {
                Some(photo) => format!("pixgrid - Photo {} by {}", photo.id, photo.author),
                None => format!("pixgrid - Photo {}", detail.id),
            },
            None => "pixgrid - Photo".to_string(),
        },
    };

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(flash) = &app.flash {
        Line::from(vec![Span::styled(
            flash.as_str(),
            Style::default().fg(Color::Green),
        )])
    } else if app.state().is_loading_initial {
        Line::from(vec![Span::styled(
            "Loading photos...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = match app.screen {
            Screen::Gallery => {
                "h/j/k/l: nav | Ctrl+d/u: page | g/G: top/bottom | Enter: open | r: retry | R: reload | o: browser | y: yank | q: quit"
            }
            Screen::Detail => "r: retry | o: browser | y: yank | q: back",
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

/// Shorten `text` to at most `max` characters, marking the cut with "...".
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(&".".repeat(max.min(3)));
    out
}
