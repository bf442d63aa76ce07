//! `Panel`: an ordered collection of Tabs with one active Tab.

use super::tab::Tab;
use super::{ModelError, apply_order, successor_index};
use crate::ids::{PanelId, TabId, TerminalId};
use crate::layout::PanelBounds;

/// A leaf of a Page's layout holding an ordered list of Tabs
///
/// A live Panel always holds at least one Tab. Removing the last Tab is
/// refused here; the Page removes the whole Panel instead.
#[derive(Debug, Clone)]
pub struct Panel {
    id: PanelId,
    tabs: Vec<Tab>,
    active_tab_id: TabId,
    /// Screen-space bounds from the last layout pass (ephemeral)
    bounds: PanelBounds,
}

impl Panel {
    /// Create a panel holding one tab
    pub fn new(first_tab: Tab) -> Self {
        Self::with_id(PanelId::new(), first_tab)
    }

    pub fn with_id(id: PanelId, first_tab: Tab) -> Self {
        Self {
            id,
            active_tab_id: first_tab.id(),
            tabs: vec![first_tab],
            bounds: PanelBounds::default(),
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn contains_tab(&self, id: TabId) -> bool {
        self.tabs.iter().any(|t| t.id() == id)
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id() == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id() == id)
    }

    pub fn tabs_mut(&mut self) -> impl Iterator<Item = &mut Tab> {
        self.tabs.iter_mut()
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id() == id)
    }

    pub fn active_tab_id(&self) -> TabId {
        self.active_tab_id
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tab(self.active_tab_id)
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        let id = self.active_tab_id;
        self.tab_mut(id)
    }

    /// Terminal of the active tab, i.e. the one visible when this panel is shown
    pub fn visible_terminal_id(&self) -> Option<TerminalId> {
        self.active_tab().and_then(Tab::terminal_id)
    }

    pub fn bounds(&self) -> PanelBounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: PanelBounds) {
        self.bounds = bounds;
    }

    /// Make a tab active. Returns false if the tab is not in this panel.
    pub fn set_active_tab(&mut self, id: TabId) -> bool {
        if self.contains_tab(id) {
            self.active_tab_id = id;
            true
        } else {
            false
        }
    }

    /// Append a tab and make it active
    pub fn add_tab(&mut self, tab: Tab) {
        self.active_tab_id = tab.id();
        self.tabs.push(tab);
    }

    /// Insert a tab at `index` (clamped to `0..=len`) and make it active
    pub fn insert_tab(&mut self, tab: Tab, index: usize) {
        let clamped = index.min(self.tabs.len());
        self.active_tab_id = tab.id();
        self.tabs.insert(clamped, tab);
    }

    /// Remove a tab, keeping the panel non-empty
    ///
    /// If the active tab is removed the tab now at the same index (or the
    /// previous one at the end) becomes active.
    pub fn remove_tab(&mut self, id: TabId) -> Result<Tab, ModelError> {
        let idx = self.index_of(id).ok_or(ModelError::TabNotFound(id))?;
        if self.tabs.len() == 1 {
            return Err(ModelError::LastTab);
        }

        let tab = self.tabs.remove(idx);
        if self.active_tab_id == id
            && let Some(new_idx) = successor_index(idx, self.tabs.len())
        {
            self.active_tab_id = self.tabs[new_idx].id();
        }
        Ok(tab)
    }

    /// Consume the panel, yielding its tabs (used when the whole panel goes away)
    pub fn into_tabs(self) -> Vec<Tab> {
        self.tabs
    }

    /// Move a tab to a new index within this panel (clamped)
    pub fn move_tab_to(&mut self, id: TabId, index: usize) -> Result<(), ModelError> {
        let idx = self.index_of(id).ok_or(ModelError::TabNotFound(id))?;
        let tab = self.tabs.remove(idx);
        let clamped = index.min(self.tabs.len());
        self.tabs.insert(clamped, tab);
        Ok(())
    }

    /// Reorder all tabs to match `order` (must be a permutation of the tab ids)
    pub fn reorder_tabs(&mut self, order: &[TabId]) -> Result<(), ModelError> {
        apply_order(&mut self.tabs, order, Tab::id)
    }

    /// Ids of every tab except `keep`
    pub fn tab_ids_except(&self, keep: TabId) -> Vec<TabId> {
        self.tabs
            .iter()
            .map(Tab::id)
            .filter(|id| *id != keep)
            .collect()
    }

    /// Ids of the tabs before `of` (empty if `of` is unknown)
    pub fn tab_ids_left_of(&self, of: TabId) -> Vec<TabId> {
        match self.index_of(of) {
            Some(idx) => self.tabs[..idx].iter().map(Tab::id).collect(),
            None => Vec::new(),
        }
    }

    /// Ids of the tabs after `of` (empty if `of` is unknown)
    pub fn tab_ids_right_of(&self, of: TabId) -> Vec<TabId> {
        match self.index_of(of) {
            Some(idx) => self.tabs[idx + 1..].iter().map(Tab::id).collect(),
            None => Vec::new(),
        }
    }

    /// Terminal ids of every materialized tab
    pub fn terminal_ids(&self) -> Vec<TerminalId> {
        self.tabs.iter().filter_map(Tab::terminal_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_with(n: usize) -> (Panel, Vec<TabId>) {
        let first = Tab::new("Tab 1");
        let mut ids = vec![first.id()];
        let mut panel = Panel::new(first);
        for i in 1..n {
            let tab = Tab::new(format!("Tab {}", i + 1));
            ids.push(tab.id());
            panel.add_tab(tab);
        }
        (panel, ids)
    }

    #[test]
    fn test_add_tab_activates_it() {
        let (panel, ids) = panel_with(3);
        assert_eq!(panel.active_tab_id(), ids[2]);
        assert_eq!(panel.tab_count(), 3);
    }

    #[test]
    fn test_remove_active_selects_same_index() {
        let (mut panel, ids) = panel_with(3);
        panel.set_active_tab(ids[1]);
        panel.remove_tab(ids[1]).unwrap();
        assert_eq!(panel.active_tab_id(), ids[2]);
    }

    #[test]
    fn test_remove_active_at_end_selects_previous() {
        let (mut panel, ids) = panel_with(3);
        panel.remove_tab(ids[2]).unwrap();
        assert_eq!(panel.active_tab_id(), ids[1]);
    }

    #[test]
    fn test_remove_inactive_keeps_active() {
        let (mut panel, ids) = panel_with(3);
        panel.remove_tab(ids[0]).unwrap();
        assert_eq!(panel.active_tab_id(), ids[2]);
    }

    #[test]
    fn test_last_tab_cannot_be_removed() {
        let (mut panel, ids) = panel_with(1);
        assert_eq!(panel.remove_tab(ids[0]), Err(ModelError::LastTab));
        assert_eq!(panel.tab_count(), 1);
    }

    #[test]
    fn test_scope_helpers() {
        let (panel, ids) = panel_with(4);
        assert_eq!(panel.tab_ids_left_of(ids[2]), vec![ids[0], ids[1]]);
        assert_eq!(panel.tab_ids_right_of(ids[2]), vec![ids[3]]);
        assert_eq!(panel.tab_ids_except(ids[1]), vec![ids[0], ids[2], ids[3]]);
        assert!(panel.tab_ids_left_of(TabId::new()).is_empty());
    }

    #[test]
    fn test_reorder_requires_permutation() {
        let (mut panel, ids) = panel_with(3);
        panel.reorder_tabs(&[ids[2], ids[0], ids[1]]).unwrap();
        let order: Vec<_> = panel.tabs().iter().map(Tab::id).collect();
        assert_eq!(order, vec![ids[2], ids[0], ids[1]]);

        assert_eq!(
            panel.reorder_tabs(&[ids[0], ids[0], ids[1]]),
            Err(ModelError::InvalidOrder)
        );
        assert_eq!(panel.reorder_tabs(&[ids[0]]), Err(ModelError::InvalidOrder));
        let unchanged: Vec<_> = panel.tabs().iter().map(Tab::id).collect();
        assert_eq!(unchanged, order);
    }

    #[test]
    fn test_move_tab_to_clamps() {
        let (mut panel, ids) = panel_with(3);
        panel.move_tab_to(ids[0], 99).unwrap();
        let order: Vec<_> = panel.tabs().iter().map(Tab::id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
    }
}
