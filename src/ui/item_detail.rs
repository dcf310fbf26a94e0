//! Item detail screen rendering
//!
//! Shows the item's image link, favorite state, and the full field schema of its
//! category. When the record cannot be resolved, a degraded view keeps the image
//! link and explains that details are unavailable.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::favorite_marker;
use crate::app::{App, DetailView};
use crate::data::{CategoryKind, DetailRecord, FieldSpec};

/// Renders the detail view for one item
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state
/// * `category` - Category the item belongs to
/// * `uid` - The item's id within its category
pub fn render(frame: &mut Frame, app: &App, category: CategoryKind, uid: &str) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_title(frame, app, category, uid, chunks[0]);
    render_body(frame, app, category, uid, chunks[1]);
    render_help(frame, chunks[2]);
}

fn render_title(frame: &mut Frame, app: &App, category: CategoryKind, uid: &str, area: Rect) {
    let name = app
        .item_name(category, uid)
        .unwrap_or_else(|| format!("{} #{}", category.title(), uid));

    let lines = vec![
        Line::from(vec![
            favorite_marker(app.favorites.is_favorite(uid)),
            Span::raw(" "),
            Span::styled(
                name,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", category.title()),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(
            "─".repeat(area.width as usize),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_body(frame: &mut Frame, app: &App, category: CategoryKind, uid: &str, area: Rect) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Image: ", Style::default().fg(Color::Gray)),
            Span::styled(
                category.image_url(uid),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        Line::from(""),
    ];

    match app.detail_view(category, uid) {
        Some(DetailView::Ready(record)) => {
            lines.extend(
                category
                    .schema()
                    .detail_fields
                    .iter()
                    .map(|field| field_line(field, record)),
            );
        }
        Some(DetailView::Unavailable(error)) => {
            lines.push(Line::from(Span::styled(
                "Details could not be loaded",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                "The API may be temporarily unavailable due to rate limiting.",
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Press r to try again",
                Style::default().fg(Color::DarkGray),
            )));
        }
        Some(DetailView::Loading) | None => {
            lines.push(Line::from(Span::styled(
                "Loading details...",
                Style::default().fg(Color::Cyan),
            )));
        }
    }

    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// `Label: value unit`, with the unit left off when the value is missing
fn field_line(field: &FieldSpec, record: &DetailRecord) -> Line<'static> {
    let value = record.property(field.key).unwrap_or_default();
    let text = match field.unit {
        Some(unit) if !value.is_empty() => format!("{} {}", value, unit),
        _ if value.is_empty() => "-".to_string(),
        _ => value.to_string(),
    };

    Line::from(vec![
        Span::styled(
            format!("{:<16}", format!("{}:", field.label)),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(text),
    ])
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help_text = Line::from(vec![
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" Back  "),
        Span::styled("f", Style::default().fg(Color::Yellow)),
        Span::raw(" Favorite  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Retry  "),
        Span::styled("v", Style::default().fg(Color::Yellow)),
        Span::raw(" Favorites  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);
    let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
