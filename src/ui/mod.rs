//! UI rendering module for holocron
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod favorites_overlay;
pub mod help_overlay;
pub mod home;
pub mod item_detail;

pub use favorites_overlay::render as render_favorites_overlay;
pub use help_overlay::render as render_help_overlay;
pub use home::render as render_home;
pub use item_detail::render as render_item_detail;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Span,
    Frame,
};

use crate::app::{App, AppState};

/// Renders the current view plus any open overlay
pub fn render(frame: &mut Frame, app: &App) {
    match &app.state {
        AppState::Home => render_home(frame, app),
        AppState::Details { category, uid } => render_item_detail(frame, app, *category, uid),
    }

    if app.show_favorites {
        render_favorites_overlay(frame, app);
    }
    if app.show_help {
        render_help_overlay(frame);
    }
}

/// ★ for favorites, ☆ otherwise
pub(crate) fn favorite_marker(is_favorite: bool) -> Span<'static> {
    if is_favorite {
        Span::styled("★", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("☆", Style::default().fg(Color::DarkGray))
    }
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
