use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::types::Photo;

use super::popup;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = app.detail_state() else {
        let block = Block::default().borders(Borders::ALL).title("Photo");
        let empty = Paragraph::new("No photo selected")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    match &detail.photo {
        Some(photo) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(7), Constraint::Min(0)])
                .split(area);
            render_meta(frame, photo, chunks[0]);
            render_renditions(frame, app, photo, chunks[1]);
        }
        None => {
            let text = if detail.loading {
                format!("Loading photo {}...", detail.id)
            } else {
                String::new()
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!("Photo {}", detail.id));
            frame.render_widget(
                Paragraph::new(text)
                    .block(block)
                    .style(Style::default().fg(Color::Yellow)),
                area,
            );
        }
    }

    if let Some(error) = &detail.error {
        popup::render_error(frame, "Could not load photo", error, false);
    }
}

fn render_meta(frame: &mut Frame, photo: &Photo, area: Rect) {
    let label = Style::default().fg(Color::Gray);
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("Photo {} ", photo.id),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("by "),
            Span::styled(&photo.author, Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("Size:      ", label),
            Span::raw(photo.aspect_label()),
        ]),
        Line::from(vec![
            Span::styled("Source:    ", label),
            Span::raw(&photo.url),
        ]),
        Line::from(vec![
            Span::styled("Full size: ", label),
            Span::raw(&photo.download_url),
        ]),
        Line::from(Span::styled(
            "The catalogue provides no title or description.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let meta = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Details"));
    frame.render_widget(meta, area);
}

fn render_renditions(frame: &mut Frame, app: &App, photo: &Photo, area: Rect) {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{:>6}  ", "thumb"),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(app.source().thumbnail_url(&photo.id)),
    ])];
    lines.extend(
        app.source()
            .variant_urls(&photo.id)
            .into_iter()
            .map(|(width, url)| {
                Line::from(vec![
                    Span::styled(format!("{:>5}w  ", width), Style::default().fg(Color::Gray)),
                    Span::raw(url),
                ])
            }),
    );

    let renditions = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Renditions"));
    frame.render_widget(renditions, area);
}
