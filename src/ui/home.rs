//! Home screen rendering
//!
//! Renders the three category sections side by side. Each section shows its own
//! loading state, the list of names with favorite markers, and a summary card for
//! the selected item once its details have resolved.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::favorite_marker;
use crate::app::{App, DetailView};
use crate::data::CategoryKind;

/// Height of the summary card under each section, borders included
const CARD_HEIGHT: u16 = 5;

/// Renders the home screen
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state containing the catalog and selection
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let banner_height = if app.catalog.error.is_some() { 1 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),             // Header
            Constraint::Length(banner_height), // Error banner
            Constraint::Min(5),                // Sections
            Constraint::Length(1),             // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    if let Some(error) = &app.catalog.error {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled("! ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled(error.clone(), Style::default().fg(Color::Red)),
        ]));
        frame.render_widget(banner, chunks[1]);
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[2]);

    for category in CategoryKind::ALL {
        render_section(frame, app, category, columns[category.index()]);
    }

    render_help(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let separator = "─".repeat(area.width as usize);
    let mut title = vec![
        Span::styled(
            "HOLOCRON",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Favorites ({})", app.favorites.len()),
            Style::default().fg(Color::Yellow),
        ),
    ];
    if app.catalog.loading {
        title.push(Span::raw("  "));
        title.push(Span::styled("Loading...", Style::default().fg(Color::DarkGray)));
    }

    let lines = vec![
        Line::from(title),
        Line::from(Span::styled(separator, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_section(frame: &mut Frame, app: &App, category: CategoryKind, area: Rect) {
    let is_focused = app.focused == category;
    let border_color = if is_focused { Color::Cyan } else { Color::DarkGray };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(CARD_HEIGHT)])
        .split(area);

    let items = app.catalog.items(category);
    let selected = app.selected_index(category);

    let lines: Vec<Line> = if items.is_empty() {
        let (text, color) = if app.catalog.is_pending(category) {
            ("Loading...", Color::Cyan)
        } else {
            ("Nothing to show", Color::DarkGray)
        };
        vec![Line::from(Span::styled(text, Style::default().fg(color)))]
    } else {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let is_selected = index == selected;
                let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space
                let name_style = if is_selected && is_focused {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else if is_selected {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(cursor, Style::default().fg(Color::Cyan)),
                    favorite_marker(app.favorites.is_favorite(&item.uid)),
                    Span::raw(" "),
                    Span::styled(item.name.clone(), name_style),
                ])
            })
            .collect()
    };

    // Keep the selected row visible
    let visible_rows = parts[0].height.saturating_sub(2) as usize;
    let offset = if visible_rows > 0 && selected >= visible_rows {
        selected + 1 - visible_rows
    } else {
        0
    };

    let mut title = format!(" {} ", category.title());
    if app.catalog.is_pending(category) && !items.is_empty() {
        title.push_str("(refreshing) ");
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let list = Paragraph::new(lines)
        .block(block)
        .scroll((offset as u16, 0));
    frame.render_widget(list, parts[0]);

    render_card(frame, app, category, parts[1]);
}

/// Renders the summary fields of a section's selected item
fn render_card(frame: &mut Frame, app: &App, category: CategoryKind, area: Rect) {
    let selected = app
        .catalog
        .items(category)
        .get(app.selected_index(category));

    let lines: Vec<Line> = match selected.map(|item| app.detail_view(category, &item.uid)) {
        Some(Some(DetailView::Ready(record))) => category
            .schema()
            .card_fields
            .iter()
            .map(|field| {
                Line::from(vec![
                    Span::styled(format!("{}: ", field.label), Style::default().fg(Color::Gray)),
                    Span::raw(record.property(field.key).unwrap_or("-").to_string()),
                ])
            })
            .collect(),
        Some(Some(DetailView::Loading)) => vec![Line::from(Span::styled(
            "Loading details...",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(Some(DetailView::Unavailable(_))) => vec![Line::from(Span::styled(
            "Details unavailable",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(None) | None => Vec::new(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let card = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(card, area);
}

/// Renders the help text at the bottom of the screen
fn render_help(frame: &mut Frame, area: Rect) {
    let help_text = Line::from(vec![
        Span::styled("←/→", Style::default().fg(Color::Yellow)),
        Span::raw(" Section  "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Navigate  "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Details  "),
        Span::styled("f", Style::default().fg(Color::Yellow)),
        Span::raw(" Favorite  "),
        Span::styled("v", Style::default().fg(Color::Yellow)),
        Span::raw(" Favorites  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Reload  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);
    let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
