//! Core model — parsed types, the type host seam, rendering, and the view
//! tree.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod editor;
pub mod host;
pub mod platform;
pub mod render;
pub mod tree;
pub mod types;
