//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::{
    editor::TextBuffer,
    platform::{PlatformRef, PlatformRegistry},
    tree::{NodeId, ViewTree},
};
use crate::prefs::SettingsStore;
use crate::ui::layout::{error_box_height, AppLayout};
use crate::ui::tree_widget::TreeWidgetState;

use super::session::{Session, UpdateOutcome};

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Main,
    PlatformPicker,
}

/// Which pane receives keyboard input on the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneFocus {
    #[default]
    Editor,
    Tree,
}

/// Top-level application state.
pub struct AppState {
    /// Platform, source text, last rendering and current error.
    pub session: Session,
    /// The declarations being edited.
    pub editor: TextBuffer,
    /// Expandable rows built from the last good rendering.
    pub view: ViewTree,
    /// Widget-level state (selection, scroll).
    pub tree_state: TreeWidgetState,
    pub focus: PaneFocus,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// Platforms offered by the picker, fetched when it opens.
    pub platforms: Vec<PlatformRef>,
    /// Highlighted row in the picker.
    pub picker_selected: usize,
    /// User-configurable keybindings and display settings.
    pub config: AppConfig,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Last full terminal area, for mouse hit-testing.
    pub terminal_area: Rect,
    registry: Box<dyn PlatformRegistry>,
    store: Box<dyn SettingsStore>,
}

impl AppState {
    /// Restore the last session from `store` and render it once.
    /// `platform` overrides both the configured default and the persisted
    /// choice.
    pub fn new(
        config: AppConfig,
        registry: Box<dyn PlatformRegistry>,
        store: Box<dyn SettingsStore>,
        platform: Option<PlatformRef>,
    ) -> Self {
        let mut session = Session::restore(store.as_ref(), &config.default_platform);
        if let Some(platform) = platform {
            session.platform = platform;
        }
        let editor = TextBuffer::from_text(&session.source);

        let mut state = Self {
            session,
            editor,
            view: ViewTree::default(),
            tree_state: TreeWidgetState::default(),
            focus: PaneFocus::default(),
            active_view: ActiveView::default(),
            platforms: Vec::new(),
            picker_selected: 0,
            config,
            should_quit: false,
            status_message: None,
            terminal_area: Rect::default(),
            registry,
            store,
        };
        state.refresh();
        state
    }

    pub fn layout(&self) -> AppLayout {
        let message = self.session.error.as_ref().map(|e| e.message.as_str());
        let error_height = error_box_height(message, self.terminal_area.width);
        AppLayout::from_area(self.terminal_area, error_height)
    }

    /// Push the editor text into the session and re-render.
    pub fn apply_source_edit(&mut self) {
        self.session.set_source(&self.editor.text());
        self.refresh();
    }

    fn refresh(&mut self) {
        let outcome = self
            .session
            .update_types(self.registry.as_ref(), self.store.as_mut());
        if outcome == UpdateOutcome::Rendered {
            self.rebuild_view();
        }
    }

    /// Rebuild the row tree from the session's forest.  Everything is
    /// expanded; scroll offsets are kept and the selection is clamped.
    pub fn rebuild_view(&mut self) {
        let Some(forest) = self.session.forest.as_ref() else {
            return;
        };
        self.view = ViewTree::from_forest(forest);
        self.view.expand_all();

        let count = self.view.visible_nodes().len();
        self.tree_state.selected = self.tree_state.selected.min(count.saturating_sub(1));
    }

    // ── platforms ───────────────────────────────────────────────

    pub fn open_platform_picker(&mut self) {
        match self.registry.list_platforms() {
            Ok(platforms) if !platforms.is_empty() => {
                self.picker_selected = platforms
                    .iter()
                    .position(|p| *p == self.session.platform)
                    .unwrap_or(0);
                self.platforms = platforms;
                self.active_view = ActiveView::PlatformPicker;
            }
            Ok(_) => {
                self.status_message = Some("type host reported no platforms".into());
            }
            Err(e) => {
                tracing::warn!("listing platforms failed: {e}");
                self.status_message = Some(format!("cannot list platforms: {e}"));
            }
        }
    }

    /// Switch to the highlighted picker entry and close the picker.
    pub fn confirm_platform(&mut self) {
        self.active_view = ActiveView::Main;
        let Some(platform) = self.platforms.get(self.picker_selected).cloned() else {
            return;
        };
        if platform == self.session.platform {
            return;
        }
        let outcome = self.session.select_platform(
            platform,
            self.registry.as_ref(),
            self.store.as_mut(),
        );
        if outcome == UpdateOutcome::Rendered {
            self.rebuild_view();
        }
    }

    // ── tree helpers ────────────────────────────────────────────

    /// Node under the tree selection, if any.
    pub fn selected_node(&self) -> Option<NodeId> {
        self.view.visible_nodes().get(self.tree_state.selected).copied()
    }

    /// Point the selection at `id` if it is visible.
    pub fn select_node(&mut self, id: NodeId) {
        if let Some(idx) = self.view.visible_nodes().iter().position(|&n| n == id) {
            self.tree_state.selected = idx;
        }
    }
}
