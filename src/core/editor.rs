//! Plain multi-line text buffer behind the declarations pane.
//!
//! Lines are stored separately; the cursor is a `(row, col)` pair where `col`
//! counts chars, not bytes.  Every mutating call reports whether the text
//! actually changed so the caller only re-parses on real edits.

/// Editable source text with a cursor.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,
    row: usize,
    col: usize,
    /// First line shown in the pane.
    pub scroll: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            scroll: 0,
        }
    }
}

/// Byte index of the `col`-th char of `s` (or `s.len()` past the end).
fn byte_idx(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(i, _)| i)
}

impl TextBuffer {
    pub fn from_text(text: &str) -> Self {
        let mut buf = Self::default();
        buf.set_text(text);
        buf
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Replace the content, keeping the cursor as close as possible to where
    /// it was.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.row = self.row.min(self.lines.len() - 1);
        self.col = self.col.min(self.line_len(self.row));
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    // ── edits ───────────────────────────────────────────────────

    pub fn insert_char(&mut self, ch: char) -> bool {
        if ch == '\n' {
            return self.newline();
        }
        let line = &mut self.lines[self.row];
        let at = byte_idx(line, self.col);
        line.insert(at, ch);
        self.col += 1;
        true
    }

    /// Insert pasted text.  `\r\n` and lone `\r` become newlines.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if text.is_empty() {
            return false;
        }
        for ch in text.chars() {
            self.insert_char(ch);
        }
        true
    }

    pub fn newline(&mut self) -> bool {
        let line = &mut self.lines[self.row];
        let at = byte_idx(line, self.col);
        let rest = line.split_off(at);
        self.row += 1;
        self.col = 0;
        self.lines.insert(self.row, rest);
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let at = byte_idx(line, self.col - 1);
            line.remove(at);
            self.col -= 1;
            true
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
            true
        } else {
            false
        }
    }

    pub fn delete(&mut self) -> bool {
        if self.col < self.line_len(self.row) {
            let line = &mut self.lines[self.row];
            let at = byte_idx(line, self.col);
            line.remove(at);
            true
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
            true
        } else {
            false
        }
    }

    // ── movement ────────────────────────────────────────────────

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.line_len(self.row);
    }

    /// Keep the cursor row inside a viewport of `height` lines.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + height {
            self.scroll = self.row - height + 1;
        }
    }
}
