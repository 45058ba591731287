//! Input handling — maps key/mouse/paste events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::ui::layout::contains;

use super::state::{ActiveView, AppState, PaneFocus};

/// Cells moved per horizontal scroll step in the tree.
const H_SCROLL_STEP: usize = 4;

/// Process a key event, dispatching based on the active view and focus.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }
    state.status_message = None;

    match state.active_view {
        ActiveView::PlatformPicker => handle_picker_key(state, key),
        ActiveView::Main => match state.focus {
            PaneFocus::Editor => handle_editor_key(state, key),
            PaneFocus::Tree => handle_tree_key(state, key),
        },
    }
}

/// Bracketed paste goes straight into the editor.
pub fn handle_paste(state: &mut AppState, text: &str) {
    if state.active_view != ActiveView::Main || state.focus != PaneFocus::Editor {
        return;
    }
    if state.editor.insert_str(text) {
        state.apply_source_edit();
    }
}

// ── Editor pane ─────────────────────────────────────────────────

fn handle_editor_key(state: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    // Bindings that carry a modifier still work while typing.
    if ctrl || alt {
        match state.config.match_key(key) {
            Some(Action::PickPlatform) => state.open_platform_picker(),
            Some(Action::Quit) => state.should_quit = true,
            // AltGr arrives as Ctrl+Alt on Windows.
            None if ctrl && alt => {
                if let KeyCode::Char(ch) = key.code {
                    if state.editor.insert_char(ch) {
                        state.apply_source_edit();
                    }
                }
            }
            _ => {}
        }
        return;
    }

    let editor = &mut state.editor;
    let changed = match key.code {
        KeyCode::Esc => {
            state.focus = PaneFocus::Tree;
            return;
        }
        KeyCode::Tab => editor.insert_char('\t'),
        KeyCode::Char(ch) => editor.insert_char(ch),
        KeyCode::Enter => editor.newline(),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => {
            editor.move_left();
            false
        }
        KeyCode::Right => {
            editor.move_right();
            false
        }
        KeyCode::Up => {
            editor.move_up();
            false
        }
        KeyCode::Down => {
            editor.move_down();
            false
        }
        KeyCode::Home => {
            editor.move_home();
            false
        }
        KeyCode::End => {
            editor.move_end();
            false
        }
        _ => false,
    };

    if changed {
        state.apply_source_edit();
    }
}

// ── Tree pane (configurable bindings) ───────────────────────────

fn handle_tree_key(state: &mut AppState, key: KeyEvent) {
    let rows = state.view.visible_nodes().len();

    match key.code {
        KeyCode::Home => {
            state.tree_state.selected = 0;
            state.tree_state.offset = 0;
            return;
        }
        KeyCode::End => {
            state.tree_state.selected = rows.saturating_sub(1);
            return;
        }
        KeyCode::Enter => {
            if let Some(id) = state.selected_node() {
                state.view.toggle_expand(id);
            }
            return;
        }
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => state.should_quit = true,
        Action::FocusEditor => state.focus = PaneFocus::Editor,
        Action::PickPlatform => state.open_platform_picker(),
        Action::MoveUp => state.tree_state.select_prev(),
        Action::MoveDown => state.tree_state.select_next(rows),
        Action::PageUp => {
            let page = tree_page(state);
            state.tree_state.selected = state.tree_state.selected.saturating_sub(page);
        }
        Action::PageDown => {
            let page = tree_page(state);
            state.tree_state.selected =
                (state.tree_state.selected + page).min(rows.saturating_sub(1));
        }
        Action::Expand => handle_expand(state),
        Action::Collapse => handle_collapse(state),
        Action::ExpandAll => state.view.expand_all(),
        Action::CollapseAll => {
            let root = state
                .selected_node()
                .map(|id| root_of(state, id));
            state.view.collapse_all();
            match root {
                Some(root) => state.select_node(root),
                None => state.tree_state.selected = 0,
            }
        }
        Action::ScrollLeft => {
            state.tree_state.h_offset = state.tree_state.h_offset.saturating_sub(H_SCROLL_STEP);
        }
        Action::ScrollRight => {
            // The widget clamps this against the widest row on render.
            state.tree_state.h_offset += H_SCROLL_STEP;
        }
    }
}

/// Expand a collapsed node, or step into an expanded one.
fn handle_expand(state: &mut AppState) {
    let Some(id) = state.selected_node() else {
        return;
    };
    let node = state.view.get(id);
    if !node.has_children() {
        return;
    }
    if node.expanded {
        let first = node.children[0];
        state.select_node(first);
    } else {
        state.view.set_expanded(id, true);
    }
}

/// Collapse an expanded node, or jump to the parent of anything else.
fn handle_collapse(state: &mut AppState) {
    let Some(id) = state.selected_node() else {
        return;
    };
    let node = state.view.get(id);
    if node.expanded {
        state.view.set_expanded(id, false);
    } else if let Some(parent) = node.parent {
        state.select_node(parent);
    }
}

fn root_of(state: &AppState, mut id: usize) -> usize {
    while let Some(parent) = state.view.get(id).parent {
        id = parent;
    }
    id
}

/// Rows inside the tree pane's border.
fn tree_page(state: &AppState) -> usize {
    (state.layout().tree_area.height as usize).saturating_sub(2).max(1)
}

// ── Platform picker ─────────────────────────────────────────────

fn handle_picker_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            state.picker_selected = state.picker_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.picker_selected + 1 < state.platforms.len() {
                state.picker_selected += 1;
            }
        }
        KeyCode::Home => state.picker_selected = 0,
        KeyCode::End => state.picker_selected = state.platforms.len().saturating_sub(1),
        KeyCode::Enter | KeyCode::Char(' ') => state.confirm_platform(),
        KeyCode::Esc | KeyCode::Char('q') => state.active_view = ActiveView::Main,
        _ => {}
    }
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.active_view != ActiveView::Main {
        return;
    }

    let layout = state.layout();
    let in_editor = contains(layout.editor_area, mouse.column, mouse.row);
    let in_tree = contains(layout.tree_area, mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if in_editor {
                state.focus = PaneFocus::Editor;
                return;
            }
            if !in_tree {
                return;
            }
            state.focus = PaneFocus::Tree;

            let content_top = layout.tree_area.y.saturating_add(1);
            let content_bottom = layout
                .tree_area
                .y
                .saturating_add(layout.tree_area.height.saturating_sub(1));
            if mouse.row < content_top || mouse.row >= content_bottom {
                return;
            }

            let clicked = (mouse.row - content_top) as usize + state.tree_state.offset;
            let visible = state.view.visible_nodes();
            if let Some(&id) = visible.get(clicked) {
                // Clicking the selected row again toggles it.
                if clicked == state.tree_state.selected {
                    state.view.toggle_expand(id);
                }
                state.tree_state.selected = clicked;
            }
        }
        MouseEventKind::ScrollUp => {
            if in_editor {
                state.editor.move_up();
            } else if in_tree {
                state.tree_state.select_prev();
            }
        }
        MouseEventKind::ScrollDown => {
            if in_editor {
                state.editor.move_down();
            } else if in_tree {
                let rows = state.view.visible_nodes().len();
                state.tree_state.select_next(rows);
            }
        }
        MouseEventKind::ScrollLeft if in_tree => {
            state.tree_state.h_offset = state.tree_state.h_offset.saturating_sub(H_SCROLL_STEP);
        }
        MouseEventKind::ScrollRight if in_tree => {
            state.tree_state.h_offset += H_SCROLL_STEP;
        }
        _ => {}
    }
}
