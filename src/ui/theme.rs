//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme — change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── tree view ──────────────────────────────────────────────
    pub fn label_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn value_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn marker_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    /// Background for the Types / Variables / Functions header rows.
    pub fn group_header_style() -> Style {
        Style::default().bg(Color::Rgb(28, 32, 40))
    }

    pub fn selected_style() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    /// Selection while the tree does not have focus.
    pub fn selected_unfocused_style() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    // ── editor ─────────────────────────────────────────────────
    pub fn source_style() -> Style {
        Style::default().fg(Color::White)
    }

    /// Source text while the host rejects it.
    pub fn invalid_source_style() -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn error_line_style() -> Style {
        Style::default().bg(Color::Rgb(70, 20, 20))
    }

    pub fn error_message_style() -> Style {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn focused_border_style() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn platform_bar_style() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
