//! Entity model: Window → Page → Panel → Tab
//!
//! - `Tab`: binds a stable identifier to at most one runtime terminal
//! - `Panel`: ordered Tabs with one active Tab; a leaf of a Page's layout
//! - `Page`: a layout tree of Panels with one active Panel
//! - `Window`: ordered Pages with one active Page
//!
//! Every mutator here is structural only. Nothing in this module touches a
//! terminal pool, a renderer, or the filesystem.

mod page;
mod panel;
mod tab;
mod window;

pub use page::Page;
pub use panel::Panel;
pub use tab::{SearchState, Tab};
pub use window::{TabLocation, Window};

use crate::ids::{PageId, PanelId, TabId};
use crate::layout::LayoutError;
use thiserror::Error;

/// Failures of structural mutations on the entity model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("tab {0} not found")]
    TabNotFound(TabId),
    #[error("panel {0} not found")]
    PanelNotFound(PanelId),
    #[error("page {0} not found")]
    PageNotFound(PageId),
    #[error("cannot remove the last tab of a panel")]
    LastTab,
    #[error("cannot remove the last panel of a page")]
    LastPanel,
    #[error("cannot remove the last page of a window")]
    LastPage,
    #[error("tab {0} appears more than once")]
    DuplicateTab(TabId),
    #[error("reorder list does not match the current members")]
    InvalidOrder,
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Index to keep selected after removing the element at `removed` from a list
/// that now has `remaining` elements: same slot, or the previous one at the end.
pub(crate) fn successor_index(removed: usize, remaining: usize) -> Option<usize> {
    if remaining == 0 {
        None
    } else {
        Some(removed.min(remaining - 1))
    }
}

/// Reorder `items` to follow `order`, which must be a permutation of their ids
pub(crate) fn apply_order<T, I: PartialEq + Copy>(
    items: &mut Vec<T>,
    order: &[I],
    id_of: impl Fn(&T) -> I,
) -> Result<(), ModelError> {
    if order.len() != items.len() {
        return Err(ModelError::InvalidOrder);
    }
    let mut positions = Vec::with_capacity(items.len());
    let mut seen = vec![false; order.len()];
    for item in items.iter() {
        let id = id_of(item);
        let position = order
            .iter()
            .position(|candidate| *candidate == id)
            .ok_or(ModelError::InvalidOrder)?;
        if std::mem::replace(&mut seen[position], true) {
            return Err(ModelError::InvalidOrder);
        }
        positions.push(position);
    }

    let mut indexed: Vec<(usize, T)> = positions.into_iter().zip(items.drain(..)).collect();
    indexed.sort_by_key(|(position, _)| *position);
    items.extend(indexed.into_iter().map(|(_, item)| item));
    Ok(())
}
