//! Custom Ratatui widget that renders a [`ViewTree`] as an indented,
//! collapsible two-column tree: label on the left, value on the right.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::tree::{NodeId, ViewTree};

use super::theme::Theme;

/// Blank cells between the label column and the value column.
const COLUMN_GAP: usize = 2;

// ───────────────────────────────────────── state ─────────────

/// Persistent state for the tree widget (selected index, scroll offsets).
#[derive(Debug, Default)]
pub struct TreeWidgetState {
    /// Index into the *visible* flat list that is currently highlighted.
    pub selected: usize,
    /// Vertical scroll offset (first visible row).
    pub offset: usize,
    /// Horizontal scroll offset in cells.
    pub h_offset: usize,
}

impl TreeWidgetState {
    pub fn select_next(&mut self, max: usize) {
        if max > 0 && self.selected < max - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Ensure the selected row is visible within the viewport of `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }
}

// ───────────────────────────────────────── row model ─────────

/// One rendered row in the tree view.
#[derive(Debug)]
pub struct TreeRow {
    pub depth: usize,
    pub label: String,
    pub value: Option<String>,
    pub expanded: bool,
    pub has_children: bool,
}

// ───────────────────────────────────────── widget ────────────

/// The tree widget itself — created fresh each frame.
pub struct TreeWidget<'a> {
    tree: &'a ViewTree,
    block: Option<Block<'a>>,
    indent: usize,
    focused: bool,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree: &'a ViewTree) -> Self {
        Self {
            tree,
            block: None,
            indent: 2,
            focused: true,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Cells of indentation per depth level.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Build the flat list of visible rows.
    pub fn build_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        for &root in &self.tree.roots {
            self.collect_rows(root, &mut rows);
        }
        rows
    }

    fn collect_rows(&self, node_id: NodeId, rows: &mut Vec<TreeRow>) {
        let node = self.tree.get(node_id);
        rows.push(TreeRow {
            depth: node.depth,
            label: node.label.clone(),
            value: node.value.clone(),
            expanded: node.expanded,
            has_children: node.has_children(),
        });
        if node.expanded {
            for &child in &node.children {
                self.collect_rows(child, rows);
            }
        }
    }

    /// Turn a row into styled segments laid out on the two columns.
    fn row_segments(&self, row: &TreeRow, label_width: usize) -> Vec<(String, Style)> {
        let marker = if !row.has_children {
            "  "
        } else if row.expanded {
            "▼ "
        } else {
            "▶ "
        };
        let lead = row.depth * self.indent;
        let used = lead + 2 + row.label.chars().count();
        let pad = label_width.saturating_sub(used) + COLUMN_GAP;

        let mut segments = vec![
            (" ".repeat(lead), Style::default()),
            (marker.to_string(), Theme::marker_style()),
            (row.label.clone(), Theme::label_style()),
        ];
        if let Some(value) = &row.value {
            segments.push((" ".repeat(pad), Style::default()));
            segments.push((value.clone(), Theme::value_style()));
        }
        segments
    }
}

/// Drop the first `skip` chars of the segments, keeping styles.
fn clip_segments(segments: Vec<(String, Style)>, mut skip: usize) -> Line<'static> {
    let mut spans = Vec::with_capacity(segments.len());
    for (text, style) in segments {
        let len = text.chars().count();
        if skip >= len {
            skip -= len;
            continue;
        }
        let kept: String = text.chars().skip(skip).collect();
        skip = 0;
        spans.push(Span::styled(kept, style));
    }
    Line::from(spans)
}

impl<'a> StatefulWidget for TreeWidget<'a> {
    type State = TreeWidgetState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // Resolve the inner area (inside the optional block border).
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let rows = self.build_rows();
        if rows.is_empty() {
            return;
        }
        state.selected = state.selected.min(rows.len() - 1);
        state.clamp_scroll(inner.height as usize);

        let label_width = self.tree.label_column_width(self.indent);
        let widest = rows
            .iter()
            .map(|r| {
                let value = r.value.as_ref().map_or(0, |v| COLUMN_GAP + v.chars().count());
                label_width + value
            })
            .max()
            .unwrap_or(0);
        state.h_offset = state.h_offset.min(widest.saturating_sub(inner.width as usize));

        let visible_rows = rows
            .iter()
            .enumerate()
            .skip(state.offset)
            .take(inner.height as usize);

        for (i, (row_idx, row)) in visible_rows.enumerate() {
            let y = inner.y + i as u16;
            let line_area = Rect::new(inner.x, y, inner.width, 1);

            let base = if row_idx == state.selected {
                if self.focused {
                    Theme::selected_style()
                } else {
                    Theme::selected_unfocused_style()
                }
            } else if row.depth == 0 {
                Theme::group_header_style()
            } else {
                Style::default()
            };

            let line = clip_segments(self.row_segments(row, label_width), state.h_offset);
            buf.set_line(inner.x, y, &line, inner.width);
            // Patch the whole row so the background runs past the text.
            buf.set_style(line_area, base);
        }
    }
}
