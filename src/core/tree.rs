//! Arena-backed view tree built from a [`DisplayForest`].
//!
//! The renderer produces a nested [`DisplayNode`] tree; the viewer wants a
//! flat list of rows with per-node expansion state.  Nodes are stored in a
//! flat `Vec` and link to each other by index, so toggling expansion and
//! flattening the visible rows never fights the borrow checker.

use super::render::{DisplayForest, DisplayNode};

/// Index into [`ViewTree::nodes`].
pub type NodeId = usize;

/// A single row of the arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub value: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Whether this node's children are shown.
    pub expanded: bool,
    /// Depth from the top-level group (0 = `Types` / `Variables` / ...).
    pub depth: usize,
}

impl TreeNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// The forest the tree pane shows.  Several roots, one per top-level group.
#[derive(Debug, Clone, Default)]
pub struct ViewTree {
    pub nodes: Vec<TreeNode>,
    pub roots: Vec<NodeId>,
}

impl ViewTree {
    /// Flatten a rendered forest into the arena.  Everything starts collapsed.
    pub fn from_forest(forest: &DisplayForest) -> Self {
        let mut tree = Self::default();
        for group in &forest.groups {
            let id = tree.push(group, None, 0);
            tree.roots.push(id);
        }
        tree
    }

    fn push(&mut self, node: &DisplayNode, parent: Option<NodeId>, depth: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            label: node.label.clone(),
            value: node.value.clone(),
            parent,
            children: Vec::with_capacity(node.children.len()),
            expanded: false,
            depth,
        });
        for child in &node.children {
            let child_id = self.push(child, Some(id), depth + 1);
            self.nodes[id].children.push(child_id);
        }
        id
    }

    /// Node ids whose ancestors are all expanded, in display order.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_visible(root, &mut out);
        }
        out
    }

    fn collect_visible(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        let node = &self.nodes[id];
        if node.expanded {
            for &child in &node.children {
                self.collect_visible(child, out);
            }
        }
    }

    /// Toggle expansion.  Leaves stay as they are.
    pub fn toggle_expand(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        if node.has_children() {
            node.expanded = !node.expanded;
        }
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        let node = &mut self.nodes[id];
        if node.has_children() {
            node.expanded = expanded;
        }
    }

    pub fn expand_all(&mut self) {
        for node in &mut self.nodes {
            node.expanded = node.has_children();
        }
    }

    pub fn collapse_all(&mut self) {
        for node in &mut self.nodes {
            node.expanded = false;
        }
    }

    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    /// Widest `indent + label` over the currently visible rows, in cells.
    /// Used to auto-size the label column.
    pub fn label_column_width(&self, indent: usize) -> usize {
        self.visible_nodes()
            .into_iter()
            .map(|id| {
                let node = &self.nodes[id];
                // two cells for the expand marker
                node.depth * indent + 2 + node.label.chars().count()
            })
            .max()
            .unwrap_or(0)
    }
}
