//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No host calls or settings I/O happen here.

pub mod editor_widget;
pub mod layout;
pub mod popup;
pub mod theme;
pub mod tree_widget;
