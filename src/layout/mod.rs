//! Binary split layout for the Panels of a Page
//!
//! This module provides the layout infrastructure for split panels:
//! - `LayoutNode`: Tree structure of leaves (Panel ids) and splits
//! - `LayoutTree`: Owned root with split/remove/move/ratio operations
//! - `LayoutPath`: Address of a node as a sequence of first/second choices
//! - `PanelBounds`: Pixel-space rectangle produced by bounds resolution
//!
//! The tree holds no back-pointers. Every lookup descends from the root, and
//! paths are recomputed rather than stored.

mod bounds;
mod node;
mod path;
mod tree;


pub use bounds::PanelBounds;
pub use node::LayoutNode;
pub use path::{Branch, LayoutPath};
pub use tree::LayoutTree;

use crate::ids::PanelId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest ratio either side of a split may be given
pub const MIN_RATIO: f32 = 0.1;
/// Largest ratio either side of a split may be given
pub const MAX_RATIO: f32 = 0.9;

/// Clamp a split ratio into `[MIN_RATIO, MAX_RATIO]`; non-finite values center the divider
pub fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() {
        ratio.clamp(MIN_RATIO, MAX_RATIO)
    } else {
        0.5
    }
}

/// Direction of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitDirection {
    /// Panels are stacked vertically (split creates top/bottom panels)
    Horizontal,
    /// Panels are side by side (split creates left/right panels)
    Vertical,
}

/// Edge of a Panel a new or moved Panel is placed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Split direction produced by placing a Panel against this edge
    pub fn direction(self) -> SplitDirection {
        match self {
            Edge::Top | Edge::Bottom => SplitDirection::Horizontal,
            Edge::Left | Edge::Right => SplitDirection::Vertical,
        }
    }

    /// `Top` and `Left` place the incoming leaf as the first child
    pub fn incoming_first(self) -> bool {
        matches!(self, Edge::Top | Edge::Left)
    }
}

/// Failures of layout tree operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("panel {0} is not in the layout")]
    PanelNotFound(PanelId),
    #[error("panel {0} is already in the layout")]
    DuplicatePanel(PanelId),
    #[error("cannot remove the last panel of a layout")]
    LastPanel,
    #[error("no split node at path {0}")]
    InvalidPath(LayoutPath),
    #[error("cannot move panel {0} relative to itself")]
    SelfTarget(PanelId),
}
