//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Error box never grows past this many rows (borders included).
const MAX_ERROR_HEIGHT: u16 = 6;

/// Primary screen layout, top to bottom: platform bar, declarations editor,
/// error box (collapsed while the text is valid), type tree, status bar.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub platform_area: Rect,
    pub editor_area: Rect,
    pub error_area: Rect,
    pub tree_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect, error_height: u16) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),            // platform bar
                Constraint::Percentage(35),       // editor
                Constraint::Length(error_height), // error box
                Constraint::Min(3),               // tree pane
                Constraint::Length(1),            // status bar
            ])
            .split(area);

        Self {
            platform_area: chunks[0],
            editor_area: chunks[1],
            error_area: chunks[2],
            tree_area: chunks[3],
            status_area: chunks[4],
        }
    }
}

/// Rows needed to show `message` wrapped inside a bordered box `width`
/// cells wide; zero when there is none.
pub fn error_box_height(message: Option<&str>, width: u16) -> u16 {
    let Some(message) = message else {
        return 0;
    };
    let inner = (width as usize).saturating_sub(2).max(1);
    let rows: usize = message
        .lines()
        .map(|line| line.chars().count().div_ceil(inner).max(1))
        .sum();
    (rows.max(1) + 2).min(MAX_ERROR_HEIGHT as usize) as u16
}

/// Whether the cell at (`col`, `row`) falls inside `area`.
pub fn contains(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
