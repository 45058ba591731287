//! Popup overlay for choosing the target platform.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::core::platform::PlatformRef;

// ───────────────────────────────────────── platform popup ────

/// Platform picker overlay.
pub struct PlatformPopup<'a> {
    pub platforms: &'a [PlatformRef],
    pub selected: usize,
    /// Platform the session is using right now.
    pub current: &'a PlatformRef,
}

impl PlatformPopup<'_> {
    /// First list row shown so that `selected` stays visible in `rows` rows.
    fn scroll(&self, rows: usize) -> usize {
        if rows == 0 || self.selected < rows {
            0
        } else {
            self.selected + 1 - rows
        }
    }
}

impl<'a> Widget for PlatformPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let widest = self
            .platforms
            .iter()
            .map(|p| p.name().chars().count())
            .max()
            .unwrap_or(0) as u16;
        let width = (widest + 12).max(36);
        // list + blank above/below + hint + borders
        let height = (self.platforms.len() as u16).saturating_add(5);
        let popup = centered_fixed(width, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Platform ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let list_rows = (inner.height as usize).saturating_sub(3);
        let first = self.scroll(list_rows);

        let mut lines = Vec::new();
        lines.push(Line::raw(""));
        for (i, platform) in self
            .platforms
            .iter()
            .enumerate()
            .skip(first)
            .take(list_rows)
        {
            let (prefix, style) = if i == self.selected {
                (
                    " ▸ ",
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("   ", Style::default().fg(Color::White))
            };

            let mut spans = vec![Span::styled(format!("{prefix}{}", platform.name()), style)];
            if platform == self.current {
                spans.push(Span::styled("  (current)", Style::default().fg(Color::Green)));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter: select  Esc: close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platforms(n: usize) -> Vec<PlatformRef> {
        (0..n).map(|i| PlatformRef::new(format!("platform-{i}"))).collect()
    }

    fn screen(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_fixed(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_fixed(50, 50, area), area);
    }

    #[test]
    fn marks_selection_and_current() {
        let list = platforms(3);
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        PlatformPopup {
            platforms: &list,
            selected: 1,
            current: &list[2],
        }
        .render(area, &mut buf);

        let text = screen(&buf);
        assert!(text.contains("▸ platform-1"));
        assert!(text.contains("platform-2  (current)"));
    }

    #[test]
    fn long_lists_scroll_to_selection() {
        let list = platforms(30);
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        PlatformPopup {
            platforms: &list,
            selected: 25,
            current: &list[0],
        }
        .render(area, &mut buf);

        let text = screen(&buf);
        assert!(text.contains("▸ platform-25"));
        assert!(!text.contains("platform-0 "));
    }
}
