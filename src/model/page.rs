//! `Page`: a layout tree of Panels with one active Panel.

use super::ModelError;
use super::panel::Panel;
use super::tab::Tab;
use crate::ids::{PageId, PanelId, TabId, TerminalId};
use crate::layout::{Edge, LayoutPath, LayoutTree, PanelBounds};
use std::collections::{HashMap, HashSet};

/// One logical workspace: a split layout whose leaves are Panels
///
/// Invariant: the set of leaf ids in `layout` equals the key set of `panels`.
#[derive(Debug, Clone)]
pub struct Page {
    id: PageId,
    title: String,
    layout: LayoutTree,
    panels: HashMap<PanelId, Panel>,
    active_panel_id: PanelId,
    /// Set when a background terminal on this page rang the bell
    needs_attention: bool,
}

impl Page {
    /// Create a page holding one panel
    pub fn new(title: impl Into<String>, first_panel: Panel) -> Self {
        Self::with_id(PageId::new(), title, first_panel)
    }

    pub fn with_id(id: PageId, title: impl Into<String>, first_panel: Panel) -> Self {
        let panel_id = first_panel.id();
        let mut panels = HashMap::new();
        panels.insert(panel_id, first_panel);
        Self {
            id,
            title: title.into(),
            layout: LayoutTree::new(panel_id),
            panels,
            active_panel_id: panel_id,
            needs_attention: false,
        }
    }

    /// Assemble a page from a pre-built layout (session restore)
    ///
    /// Fails unless the layout leaves and the supplied panels match exactly.
    pub fn from_parts(
        id: PageId,
        title: impl Into<String>,
        layout: LayoutTree,
        panels: Vec<Panel>,
        active_panel_id: Option<PanelId>,
    ) -> Result<Self, ModelError> {
        let leaf_ids = layout.panel_ids();
        let by_id: HashMap<PanelId, Panel> =
            panels.into_iter().map(|p| (p.id(), p)).collect();
        if by_id.len() != leaf_ids.len() {
            return Err(ModelError::InvalidOrder);
        }
        for leaf in &leaf_ids {
            if !by_id.contains_key(leaf) {
                return Err(ModelError::PanelNotFound(*leaf));
            }
        }
        let mut seen = HashSet::new();
        for tab in by_id.values().flat_map(|panel| panel.tabs()) {
            if !seen.insert(tab.id()) {
                return Err(ModelError::DuplicateTab(tab.id()));
            }
        }
        let active = active_panel_id
            .filter(|id| by_id.contains_key(id))
            .unwrap_or(leaf_ids[0]);
        Ok(Self {
            id,
            title: title.into(),
            layout,
            panels: by_id,
            active_panel_id: active,
            needs_attention: false,
        })
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    pub fn needs_attention(&self) -> bool {
        self.needs_attention
    }

    pub fn set_needs_attention(&mut self, value: bool) {
        self.needs_attention = value;
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(&id)
    }

    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(&id)
    }

    pub fn contains_panel(&self, id: PanelId) -> bool {
        self.panels.contains_key(&id)
    }

    /// Panels in layout (reading) order
    pub fn panels(&self) -> Vec<&Panel> {
        self.layout
            .panel_ids()
            .into_iter()
            .filter_map(|id| self.panels.get(&id))
            .collect()
    }

    /// Panel ids in layout (reading) order
    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.layout.panel_ids()
    }

    pub fn active_panel_id(&self) -> PanelId {
        self.active_panel_id
    }

    pub fn active_panel(&self) -> Option<&Panel> {
        self.panels.get(&self.active_panel_id)
    }

    pub fn active_panel_mut(&mut self) -> Option<&mut Panel> {
        self.panels.get_mut(&self.active_panel_id)
    }

    pub fn set_active_panel(&mut self, id: PanelId) -> bool {
        if self.panels.contains_key(&id) {
            self.active_panel_id = id;
            true
        } else {
            false
        }
    }

    /// Panel holding a tab
    pub fn panel_of_tab(&self, tab_id: TabId) -> Option<PanelId> {
        self.panels
            .values()
            .find(|p| p.contains_tab(tab_id))
            .map(Panel::id)
    }

    pub fn tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.panels.values().find_map(|p| p.tab(tab_id))
    }

    pub fn tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.panels.values_mut().find_map(|p| p.tab_mut(tab_id))
    }

    /// All tabs in layout order
    pub fn tabs(&self) -> Vec<&Tab> {
        self.panels().into_iter().flat_map(|p| p.tabs()).collect()
    }

    pub fn tab_count(&self) -> usize {
        self.panels.values().map(Panel::tab_count).sum()
    }

    /// Active-tab terminal of every panel: what is on screen when this page is shown
    pub fn visible_terminal_ids(&self) -> Vec<TerminalId> {
        self.panels()
            .into_iter()
            .filter_map(Panel::visible_terminal_id)
            .collect()
    }

    /// Every materialized terminal on this page
    pub fn terminal_ids(&self) -> Vec<TerminalId> {
        self.panels()
            .into_iter()
            .flat_map(Panel::terminal_ids)
            .collect()
    }

    /// Tabs without a runtime terminal, in layout order
    pub fn unmaterialized_tab_ids(&self) -> Vec<TabId> {
        self.tabs()
            .into_iter()
            .filter(|t| !t.is_materialized())
            .map(Tab::id)
            .collect()
    }

    /// Split `target` by adding `new_panel` against `edge`; the new panel becomes active
    pub fn split_panel(
        &mut self,
        target: PanelId,
        edge: Edge,
        new_panel: Panel,
    ) -> Result<PanelId, ModelError> {
        if !self.panels.contains_key(&target) {
            return Err(ModelError::PanelNotFound(target));
        }
        let new_id = new_panel.id();
        self.layout.split(target, new_id, edge)?;
        self.panels.insert(new_id, new_panel);
        self.active_panel_id = new_id;
        Ok(new_id)
    }

    /// Remove a panel and collapse its parent split
    ///
    /// The last panel cannot be removed; the Window removes the page instead.
    /// If the active panel goes away, the panel now occupying the nearest
    /// position in reading order becomes active.
    pub fn remove_panel(&mut self, id: PanelId) -> Result<Panel, ModelError> {
        if !self.panels.contains_key(&id) {
            return Err(ModelError::PanelNotFound(id));
        }
        if self.panels.len() == 1 {
            return Err(ModelError::LastPanel);
        }

        let order_before = self.layout.panel_ids();
        let index = order_before.iter().position(|p| *p == id).unwrap_or(0);
        self.layout.remove_panel(id)?;
        let panel = self
            .panels
            .remove(&id)
            .ok_or(ModelError::PanelNotFound(id))?;

        if self.active_panel_id == id {
            let order_after = self.layout.panel_ids();
            if let Some(next) = super::successor_index(index, order_after.len()) {
                self.active_panel_id = order_after[next];
            }
        }
        Ok(panel)
    }

    /// Consume the page, yielding its panels in layout order
    pub fn into_panels(mut self) -> Vec<Panel> {
        self.layout
            .panel_ids()
            .into_iter()
            .filter_map(|id| self.panels.remove(&id))
            .collect()
    }

    /// Relocate a panel next to another one in the layout (no terminal churn)
    pub fn move_panel_in_layout(
        &mut self,
        source: PanelId,
        target: PanelId,
        edge: Edge,
    ) -> Result<(), ModelError> {
        for id in [source, target] {
            if !self.panels.contains_key(&id) {
                return Err(ModelError::PanelNotFound(id));
            }
        }
        self.layout.move_panel(source, target, edge)?;
        self.active_panel_id = source;
        Ok(())
    }

    pub fn ratio_at(&self, path: &LayoutPath) -> Option<f32> {
        self.layout.ratio_at(path)
    }

    /// Set a split ratio; returns the clamped value stored
    pub fn set_ratio(&mut self, path: &LayoutPath, ratio: f32) -> Result<f32, ModelError> {
        Ok(self.layout.set_ratio(path, ratio)?)
    }

    /// Recompute every panel's bounds for the given content area
    pub fn resolve_bounds(&mut self, content: PanelBounds, divider_width: f32) {
        for (id, bounds) in self.layout.calculate_bounds(content, divider_width) {
            if let Some(panel) = self.panels.get_mut(&id) {
                panel.set_bounds(bounds);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_page() -> (Page, PanelId) {
        let panel = Panel::new(Tab::new("Tab 1"));
        let panel_id = panel.id();
        (Page::new("Page 1", panel), panel_id)
    }

    #[test]
    fn test_split_activates_new_panel() {
        let (mut page, first) = single_page();
        let new_id = page
            .split_panel(first, Edge::Right, Panel::new(Tab::new("Tab 2")))
            .unwrap();
        assert_eq!(page.active_panel_id(), new_id);
        assert_eq!(page.panel_ids(), vec![first, new_id]);
        assert_eq!(page.tab_count(), 2);
    }

    #[test]
    fn test_split_unknown_target() {
        let (mut page, _) = single_page();
        let ghost = PanelId::new();
        let result = page.split_panel(ghost, Edge::Left, Panel::new(Tab::new("x")));
        assert_eq!(result.unwrap_err(), ModelError::PanelNotFound(ghost));
        assert_eq!(page.panel_count(), 1);
    }

    #[test]
    fn test_remove_last_panel_refused() {
        let (mut page, first) = single_page();
        assert_eq!(page.remove_panel(first).unwrap_err(), ModelError::LastPanel);
    }

    #[test]
    fn test_remove_active_panel_reselects_neighbor() {
        let (mut page, first) = single_page();
        let second = page
            .split_panel(first, Edge::Right, Panel::new(Tab::new("b")))
            .unwrap();
        let third = page
            .split_panel(second, Edge::Bottom, Panel::new(Tab::new("c")))
            .unwrap();

        page.set_active_panel(second);
        page.remove_panel(second).unwrap();
        assert_eq!(page.active_panel_id(), third);
        assert_eq!(page.panel_ids(), vec![first, third]);
    }

    #[test]
    fn test_resolve_bounds_assigns_every_panel() {
        let (mut page, first) = single_page();
        let second = page
            .split_panel(first, Edge::Bottom, Panel::new(Tab::new("b")))
            .unwrap();
        page.resolve_bounds(PanelBounds::new(0.0, 0.0, 100.0, 101.0), 1.0);

        assert_eq!(
            page.panel(first).unwrap().bounds(),
            PanelBounds::new(0.0, 0.0, 100.0, 50.0)
        );
        assert_eq!(
            page.panel(second).unwrap().bounds(),
            PanelBounds::new(0.0, 51.0, 100.0, 50.0)
        );
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        let panel = Panel::new(Tab::new("a"));
        let layout = LayoutTree::new(PanelId::new());
        let result = Page::from_parts(PageId::new(), "p", layout, vec![panel], None);
        assert!(matches!(result, Err(ModelError::PanelNotFound(_))));
    }

    #[test]
    fn test_from_parts_rejects_tab_in_two_panels() {
        let shared = TabId::new();
        let left = Panel::new(Tab::with_id(shared, "left"));
        let right = Panel::new(Tab::with_id(shared, "right"));
        let root = crate::layout::LayoutNode::split(
            crate::layout::SplitDirection::Vertical,
            0.5,
            crate::layout::LayoutNode::leaf(left.id()),
            crate::layout::LayoutNode::leaf(right.id()),
        );
        let layout = LayoutTree::from_root(root).unwrap();

        let result = Page::from_parts(PageId::new(), "p", layout, vec![left, right], None);
        assert_eq!(result.unwrap_err(), ModelError::DuplicateTab(shared));
    }
}
