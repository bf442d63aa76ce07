//! `LayoutTree`: owned layout root and its structural mutations.

use super::bounds::PanelBounds;
use super::node::LayoutNode;
use super::path::{Branch, LayoutPath};
use super::{Edge, LayoutError, clamp_ratio};
use crate::ids::PanelId;
use std::collections::HashSet;

/// Layout of one Page. Always holds at least one leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    root: LayoutNode,
}

impl LayoutTree {
    /// Create a layout holding a single panel
    pub fn new(panel_id: PanelId) -> Self {
        Self {
            root: LayoutNode::leaf(panel_id),
        }
    }

    /// Adopt an existing node as root, rejecting repeated panel ids
    pub fn from_root(root: LayoutNode) -> Result<Self, LayoutError> {
        let mut seen = HashSet::new();
        for id in root.panel_ids() {
            if !seen.insert(id) {
                return Err(LayoutError::DuplicatePanel(id));
            }
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &LayoutNode {
        &self.root
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.root.contains(id)
    }

    /// Panel ids in first-to-second (reading) order
    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.root.panel_ids()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn path_of(&self, id: PanelId) -> Option<LayoutPath> {
        self.root.path_of(id)
    }

    pub fn node_at(&self, path: &LayoutPath) -> Option<&LayoutNode> {
        self.root.node_at(path)
    }

    /// Split the leaf holding `target`, placing `new_panel` against `edge`
    ///
    /// The target leaf's position is replaced by a 50/50 split. `Top`/`Left`
    /// put the new leaf first; `Bottom`/`Right` put it second.
    pub fn split(
        &mut self,
        target: PanelId,
        new_panel: PanelId,
        edge: Edge,
    ) -> Result<(), LayoutError> {
        self.insert_subtree(target, LayoutNode::leaf(new_panel), edge)
    }

    fn insert_subtree(
        &mut self,
        target: PanelId,
        incoming: LayoutNode,
        edge: Edge,
    ) -> Result<(), LayoutError> {
        for id in incoming.panel_ids() {
            if self.contains(id) {
                return Err(LayoutError::DuplicatePanel(id));
            }
        }
        let path = self
            .path_of(target)
            .ok_or(LayoutError::PanelNotFound(target))?;
        let slot = self
            .root
            .node_at_mut(&path)
            .ok_or_else(|| LayoutError::InvalidPath(path.clone()))?;

        let existing = std::mem::replace(slot, LayoutNode::leaf(target));
        *slot = if edge.incoming_first() {
            LayoutNode::split(edge.direction(), 0.5, incoming, existing)
        } else {
            LayoutNode::split(edge.direction(), 0.5, existing, incoming)
        };
        Ok(())
    }

    /// Remove a panel's leaf, collapsing its parent split
    ///
    /// The sibling subtree takes the parent split's place. Returns the removed
    /// leaf node. The last remaining leaf cannot be removed.
    pub fn remove_panel(&mut self, id: PanelId) -> Result<LayoutNode, LayoutError> {
        let path = self.path_of(id).ok_or(LayoutError::PanelNotFound(id))?;
        let Some(parent_path) = path.parent() else {
            return Err(LayoutError::LastPanel);
        };
        let removed_branch = path.branches()[path.len() - 1];

        let parent = self
            .root
            .node_at_mut(&parent_path)
            .ok_or_else(|| LayoutError::InvalidPath(parent_path.clone()))?;

        match std::mem::replace(parent, LayoutNode::leaf(id)) {
            LayoutNode::Split { first, second, .. } => {
                let (removed, sibling) = match removed_branch {
                    Branch::First => (first, second),
                    Branch::Second => (second, first),
                };
                *parent = *sibling;
                Ok(*removed)
            }
            leaf @ LayoutNode::Leaf(_) => {
                // A leaf's parent is always a split; restore and report
                *parent = leaf;
                Err(LayoutError::InvalidPath(parent_path))
            }
        }
    }

    /// Relocate `source`'s leaf next to `target`'s leaf
    ///
    /// Equivalent to removing the source leaf (collapsing its parent) and
    /// splitting the target against `edge` with it.
    pub fn move_panel(
        &mut self,
        source: PanelId,
        target: PanelId,
        edge: Edge,
    ) -> Result<(), LayoutError> {
        if source == target {
            return Err(LayoutError::SelfTarget(source));
        }
        if !self.contains(source) {
            return Err(LayoutError::PanelNotFound(source));
        }
        if !self.contains(target) {
            return Err(LayoutError::PanelNotFound(target));
        }
        let removed = self.remove_panel(source)?;
        self.insert_subtree(target, removed, edge)
    }

    /// Ratio of the split at `path`, or `None` if the path is not a split
    pub fn ratio_at(&self, path: &LayoutPath) -> Option<f32> {
        match self.root.node_at(path)? {
            LayoutNode::Split { ratio, .. } => Some(*ratio),
            LayoutNode::Leaf(_) => None,
        }
    }

    /// Set the ratio of the split at `path`, returning the clamped value stored
    pub fn set_ratio(&mut self, path: &LayoutPath, new_ratio: f32) -> Result<f32, LayoutError> {
        match self.root.node_at_mut(path) {
            Some(LayoutNode::Split { ratio, .. }) => {
                *ratio = clamp_ratio(new_ratio);
                Ok(*ratio)
            }
            _ => Err(LayoutError::InvalidPath(path.clone())),
        }
    }

    /// Resolve pixel bounds for every leaf
    pub fn calculate_bounds(
        &self,
        total: PanelBounds,
        divider_width: f32,
    ) -> Vec<(PanelId, PanelBounds)> {
        let mut out = Vec::with_capacity(self.leaf_count());
        self.root.calculate_bounds(total, divider_width, &mut out);
        out
    }
}
