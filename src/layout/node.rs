//! `LayoutNode`: binary tree structure for arbitrary panel nesting.

use super::bounds::PanelBounds;
use super::path::{Branch, LayoutPath};
use super::{SplitDirection, clamp_ratio};
use crate::ids::PanelId;

/// Tree node for panel layout
///
/// The layout tree is a binary tree where:
/// - Leaf nodes reference a Panel by id
/// - Split nodes contain two children with a split direction and ratio
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    /// A leaf node referencing a panel
    Leaf(PanelId),
    /// A split containing two child nodes
    Split {
        /// Direction of the split
        direction: SplitDirection,
        /// Split ratio - position of divider, always within `[MIN_RATIO, MAX_RATIO]`
        /// For horizontal: ratio is height of first child / total height
        /// For vertical: ratio is width of first child / total width
        ratio: f32,
        /// First child (top for horizontal, left for vertical)
        first: Box<LayoutNode>,
        /// Second child (bottom for horizontal, right for vertical)
        second: Box<LayoutNode>,
    },
}

impl LayoutNode {
    /// Create a new leaf node
    pub fn leaf(panel_id: PanelId) -> Self {
        LayoutNode::Leaf(panel_id)
    }

    /// Create a new split node
    pub fn split(
        direction: SplitDirection,
        ratio: f32,
        first: LayoutNode,
        second: LayoutNode,
    ) -> Self {
        LayoutNode::Split {
            direction,
            ratio: clamp_ratio(ratio),
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        matches!(self, LayoutNode::Leaf(_))
    }

    /// Panel id if this is a leaf node
    pub fn as_panel(&self) -> Option<PanelId> {
        match self {
            LayoutNode::Leaf(id) => Some(*id),
            LayoutNode::Split { .. } => None,
        }
    }

    /// Check whether a panel appears in this subtree
    pub fn contains(&self, id: PanelId) -> bool {
        match self {
            LayoutNode::Leaf(leaf) => *leaf == id,
            LayoutNode::Split { first, second, .. } => first.contains(id) || second.contains(id),
        }
    }

    /// Get all panel IDs in this subtree, first-to-second order
    pub fn panel_ids(&self) -> Vec<PanelId> {
        let mut ids = Vec::new();
        self.collect_panel_ids(&mut ids);
        ids
    }

    fn collect_panel_ids(&self, ids: &mut Vec<PanelId>) {
        match self {
            LayoutNode::Leaf(id) => ids.push(*id),
            LayoutNode::Split { first, second, .. } => {
                first.collect_panel_ids(ids);
                second.collect_panel_ids(ids);
            }
        }
    }

    /// Count total number of leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            LayoutNode::Leaf(_) => 1,
            LayoutNode::Split { first, second, .. } => first.leaf_count() + second.leaf_count(),
        }
    }

    /// Descend along a path
    pub fn node_at(&self, path: &LayoutPath) -> Option<&LayoutNode> {
        let mut node = self;
        for step in path.branches() {
            node = match node {
                LayoutNode::Leaf(_) => return None,
                LayoutNode::Split { first, second, .. } => match step {
                    Branch::First => &**first,
                    Branch::Second => &**second,
                },
            };
        }
        Some(node)
    }

    /// Descend along a path (mutable)
    pub fn node_at_mut(&mut self, path: &LayoutPath) -> Option<&mut LayoutNode> {
        let mut node = self;
        for step in path.branches() {
            node = match node {
                LayoutNode::Leaf(_) => return None,
                LayoutNode::Split { first, second, .. } => match step {
                    Branch::First => &mut **first,
                    Branch::Second => &mut **second,
                },
            };
        }
        Some(node)
    }

    /// Path from this node to the leaf holding `id`
    pub fn path_of(&self, id: PanelId) -> Option<LayoutPath> {
        let mut steps = Vec::new();
        if self.path_of_recursive(id, &mut steps) {
            Some(LayoutPath::from(steps))
        } else {
            None
        }
    }

    fn path_of_recursive(&self, id: PanelId, steps: &mut Vec<Branch>) -> bool {
        match self {
            LayoutNode::Leaf(leaf) => *leaf == id,
            LayoutNode::Split { first, second, .. } => {
                steps.push(Branch::First);
                if first.path_of_recursive(id, steps) {
                    return true;
                }
                steps.pop();
                steps.push(Branch::Second);
                if second.path_of_recursive(id, steps) {
                    return true;
                }
                steps.pop();
                false
            }
        }
    }

    /// Calculate bounds for all leaves given the total available area
    ///
    /// This recursively distributes space according to split ratios.
    pub fn calculate_bounds(
        &self,
        bounds: PanelBounds,
        divider_width: f32,
        out: &mut Vec<(PanelId, PanelBounds)>,
    ) {
        match self {
            LayoutNode::Leaf(id) => out.push((*id, bounds)),
            LayoutNode::Split {
                direction,
                ratio,
                first,
                second,
            } => {
                let (first_bounds, second_bounds) =
                    bounds.split(*direction, *ratio, divider_width);
                first.calculate_bounds(first_bounds, divider_width, out);
                second.calculate_bounds(second_bounds, divider_width, out);
            }
        }
    }
}
