//! Favorites overlay
//!
//! A centered list of the user's favorites in the order they were added.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::app::App;

/// Tallest the overlay grows before the list scrolls
const MAX_HEIGHT: u16 = 20;

/// Renders the favorites overlay on top of the current view
pub fn render(frame: &mut Frame, app: &App) {
    let favorites = app.favorites.list();
    let height = (favorites.len().max(1) as u16)
        .saturating_add(4)
        .min(MAX_HEIGHT);
    let overlay_area = centered_rect(48, height, frame.area());

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(format!(" Favorites ({}) ", favorites.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    let lines: Vec<Line> = if favorites.is_empty() {
        vec![Line::from(Span::styled(
            "No favorites",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        favorites
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let is_selected = index == app.favorites_cursor;
                let cursor = if is_selected { "\u{25B8} " } else { "  " };
                let name_style = if is_selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(cursor, Style::default().fg(Color::Cyan)),
                    Span::styled(entry.name.clone(), name_style),
                    Span::styled(
                        format!("  {}", entry.category.title()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };

    // Keep the cursor row visible
    let visible_rows = parts[0].height as usize;
    let offset = if visible_rows > 0 && app.favorites_cursor >= visible_rows {
        app.favorites_cursor + 1 - visible_rows
    } else {
        0
    };
    frame.render_widget(
        Paragraph::new(lines).scroll((offset as u16, 0)),
        parts[0],
    );

    let hint = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Enter open  d remove  Esc close",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(hint), parts[1]);
}
