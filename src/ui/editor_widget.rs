//! Declarations pane: draws a [`TextBuffer`] with its cursor, turning the
//! text red while the host rejects it and marking the reported error line.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    text::Line,
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::editor::TextBuffer;

use super::theme::Theme;

/// Tab stops every this many columns.
const TAB_WIDTH: usize = 4;

pub struct EditorWidget<'a> {
    block: Option<Block<'a>>,
    invalid: bool,
    /// 0-based line to highlight.
    error_line: Option<usize>,
}

impl<'a> EditorWidget<'a> {
    pub fn new() -> Self {
        Self {
            block: None,
            invalid: false,
            error_line: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn invalid(mut self, invalid: bool) -> Self {
        self.invalid = invalid;
        self
    }

    /// Highlight the 1-based `line`, as hosts report it.
    pub fn error_line(mut self, line: Option<usize>) -> Self {
        self.error_line = line.and_then(|l| l.checked_sub(1));
        self
    }

    fn inner(&self, area: Rect) -> Rect {
        match &self.block {
            Some(block) => block.inner(area),
            None => area,
        }
    }

    /// Where the terminal cursor goes for `buffer` drawn into `area`.
    /// Call after the buffer's scroll has been clamped by a render.
    pub fn cursor_position(&self, area: Rect, buffer: &TextBuffer) -> Option<Position> {
        let inner = self.inner(area);
        if inner.width == 0 || inner.height == 0 {
            return None;
        }
        let (row, col) = buffer.cursor();
        let y = row.checked_sub(buffer.scroll)?;
        if y >= inner.height as usize {
            return None;
        }
        let col = display_col(&buffer.lines()[row], col);
        let x = col - h_scroll(col, inner.width);
        Some(Position::new(inner.x + x as u16, inner.y + y as u16))
    }
}

impl Default for EditorWidget<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Screen column of the `col`-th char of `line`, with tabs expanded.
fn display_col(line: &str, col: usize) -> usize {
    line.chars().take(col).fold(0, |x, ch| match ch {
        '\t' => x + TAB_WIDTH - x % TAB_WIDTH,
        _ => x + 1,
    })
}

/// `line` with each tab replaced by spaces up to the next tab stop.
fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - out.chars().count() % TAB_WIDTH;
            out.extend(std::iter::repeat(' ').take(pad));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Columns scrolled off to the left so that `col` stays on screen.
fn h_scroll(col: usize, width: u16) -> usize {
    col.saturating_sub((width as usize).saturating_sub(1))
}

impl<'a> StatefulWidget for EditorWidget<'a> {
    type State = TextBuffer;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = self.inner(area);
        if let Some(block) = self.block {
            block.render(area, buf);
        }
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        state.clamp_scroll(inner.height as usize);
        let (row, col) = state.cursor();
        let skip = h_scroll(display_col(&state.lines()[row], col), inner.width);
        let style = if self.invalid {
            Theme::invalid_source_style()
        } else {
            Theme::source_style()
        };

        let rows = state
            .lines()
            .iter()
            .enumerate()
            .skip(state.scroll)
            .take(inner.height as usize);
        for (i, (idx, text)) in rows.enumerate() {
            let y = inner.y + i as u16;
            let visible: String = expand_tabs(text).chars().skip(skip).collect();
            buf.set_line(inner.x, y, &Line::styled(visible, style), inner.width);
            if self.error_line == Some(idx) {
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), Theme::error_line_style());
            }
        }
    }
}
