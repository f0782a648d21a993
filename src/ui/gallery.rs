use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::viewport::{CARD_HEIGHT, CARD_WIDTH};

use super::{popup, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    if state.items.is_empty() {
        let block = Block::default().borders(Borders::ALL).title("Photo Gallery");
        let text = if state.is_loading_initial {
            "Loading photos..."
        } else if state.last_error.is_some() {
            ""
        } else {
            "No photos found"
        };
        let empty = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, chunks[0]);
    } else {
        render_grid(frame, app, chunks[0]);
    }

    render_footer(frame, app, chunks[1]);

    if let Some(error) = &state.last_error {
        popup::render_error(frame, "Could not load photos", error, true);
    }
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let grid = app.grid;
    let items = &app.state().items;
    let first = app.first_row * grid.columns;
    let last = (first + grid.visible_rows * grid.columns).min(items.len());
    let inner = CARD_WIDTH.saturating_sub(2) as usize;

    for (offset, photo) in items[first.min(last)..last].iter().enumerate() {
        let index = first + offset;
        let col = (offset % grid.columns) as u16;
        let row = (offset / grid.columns) as u16;
        let card = Rect {
            x: area.x + col * CARD_WIDTH,
            y: area.y + row * CARD_HEIGHT,
            width: CARD_WIDTH,
            height: CARD_HEIGHT,
        }
        .intersection(area);
        if card.is_empty() {
            continue;
        }

        let is_selected = index == app.selected;
        let border_style = if is_selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let lines = vec![
            Line::from(Span::styled(
                truncate(&photo.author, inner),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(Span::styled(
                photo.aspect_label(),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                truncate(&app.source().thumbnail_url(&photo.id), inner),
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(format!(" #{} ", photo.id), border_style)),
        );
        frame.render_widget(widget, card);
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state();
    let line = if state.is_loading_more {
        Line::from(Span::styled(
            format!(
                "Loading more... (page {}, {} per page)",
                state.current_page,
                app.gallery.page_size()
            ),
            Style::default().fg(Color::Yellow),
        ))
    } else if state.reached_end() {
        Line::from(Span::styled(
            "You've reached the end.",
            Style::default().fg(Color::Gray),
        ))
    } else if !state.items.is_empty() {
        Line::from(Span::styled(
            format!("{} / {}", app.selected + 1, state.items.len()),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from("")
    };

    frame.render_widget(
        Paragraph::new(line).alignment(ratatui::layout::Alignment::Center),
        area,
    );
}
