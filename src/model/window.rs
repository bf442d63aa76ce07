//! `Window`: ordered Pages with one active Page.

use super::page::Page;
use super::panel::Panel;
use super::tab::Tab;
use super::{ModelError, apply_order, successor_index};
use crate::ids::{PageId, PanelId, TabId, TerminalId, WindowId};

/// Where a tab lives inside a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabLocation {
    pub page_id: PageId,
    pub panel_id: PanelId,
}

/// Top-level container of Pages
///
/// Invariant: at least one Page exists while the window is alive. Only
/// `force_remove_page` may break it, and the caller must then close the window.
#[derive(Debug, Clone)]
pub struct Window {
    id: WindowId,
    pages: Vec<Page>,
    active_page_id: PageId,
}

impl Window {
    /// Create a window holding one page
    pub fn new(first_page: Page) -> Self {
        Self::with_id(WindowId::new(), first_page)
    }

    pub fn with_id(id: WindowId, first_page: Page) -> Self {
        Self {
            id,
            active_page_id: first_page.id(),
            pages: vec![first_page],
        }
    }

    /// Window with one page, one panel and one fresh tab
    pub fn with_single_tab(tab_title: impl Into<String>) -> Self {
        let panel = Panel::new(Tab::new(tab_title));
        Self::new(Page::new("Page 1", panel))
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True only after `force_remove_page` took the last page
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id() == id)
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id() == id)
    }

    pub fn page_index(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id() == id)
    }

    pub fn active_page_id(&self) -> PageId {
        self.active_page_id
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.page(self.active_page_id)
    }

    pub fn active_page_mut(&mut self) -> Option<&mut Page> {
        let id = self.active_page_id;
        self.page_mut(id)
    }

    pub fn active_page_index(&self) -> Option<usize> {
        self.page_index(self.active_page_id)
    }

    /// Make a page active. Returns false if the page is unknown.
    pub fn set_active_page(&mut self, id: PageId) -> bool {
        if self.page(id).is_some() {
            self.active_page_id = id;
            true
        } else {
            false
        }
    }

    /// Append a page and make it active
    pub fn add_page(&mut self, page: Page) {
        self.active_page_id = page.id();
        self.pages.push(page);
    }

    /// Insert a page at `index` (clamped) without changing the active page
    pub fn insert_page(&mut self, page: Page, index: usize) {
        let clamped = index.min(self.pages.len());
        self.pages.insert(clamped, page);
    }

    /// Remove a page, keeping at least one
    pub fn remove_page(&mut self, id: PageId) -> Result<Page, ModelError> {
        let idx = self.page_index(id).ok_or(ModelError::PageNotFound(id))?;
        if self.pages.len() == 1 {
            return Err(ModelError::LastPage);
        }
        Ok(self.take_page_at(idx))
    }

    /// Remove a page even if it is the last one
    ///
    /// An emptied window must be destroyed by the caller.
    pub fn force_remove_page(&mut self, id: PageId) -> Option<Page> {
        let idx = self.page_index(id)?;
        Some(self.take_page_at(idx))
    }

    fn take_page_at(&mut self, idx: usize) -> Page {
        let page = self.pages.remove(idx);
        if self.active_page_id == page.id()
            && let Some(new_idx) = successor_index(idx, self.pages.len())
        {
            self.active_page_id = self.pages[new_idx].id();
        }
        page
    }

    /// Move a page to a new index (clamped)
    pub fn move_page_to(&mut self, id: PageId, index: usize) -> Result<(), ModelError> {
        let idx = self.page_index(id).ok_or(ModelError::PageNotFound(id))?;
        let page = self.pages.remove(idx);
        let clamped = index.min(self.pages.len());
        self.pages.insert(clamped, page);
        Ok(())
    }

    /// Reorder all pages to match `order` (must be a permutation of the page ids)
    pub fn reorder_pages(&mut self, order: &[PageId]) -> Result<(), ModelError> {
        apply_order(&mut self.pages, order, Page::id)
    }

    /// Ids of every page except `keep`
    pub fn page_ids_except(&self, keep: PageId) -> Vec<PageId> {
        self.pages
            .iter()
            .map(Page::id)
            .filter(|id| *id != keep)
            .collect()
    }

    pub fn page_ids_left_of(&self, of: PageId) -> Vec<PageId> {
        match self.page_index(of) {
            Some(idx) => self.pages[..idx].iter().map(Page::id).collect(),
            None => Vec::new(),
        }
    }

    pub fn page_ids_right_of(&self, of: PageId) -> Vec<PageId> {
        match self.page_index(of) {
            Some(idx) => self.pages[idx + 1..].iter().map(Page::id).collect(),
            None => Vec::new(),
        }
    }

    /// Locate a tab anywhere in the window
    pub fn find_tab(&self, tab_id: TabId) -> Option<TabLocation> {
        self.pages.iter().find_map(|page| {
            page.panel_of_tab(tab_id).map(|panel_id| TabLocation {
                page_id: page.id(),
                panel_id,
            })
        })
    }

    /// Page holding a panel
    pub fn find_panel(&self, panel_id: PanelId) -> Option<PageId> {
        self.pages
            .iter()
            .find(|p| p.contains_panel(panel_id))
            .map(Page::id)
    }

    /// Locate the tab bound to a runtime terminal
    pub fn find_terminal(&self, terminal_id: TerminalId) -> Option<(TabLocation, TabId)> {
        self.pages.iter().find_map(|page| {
            page.tabs()
                .into_iter()
                .find(|t| t.terminal_id() == Some(terminal_id))
                .and_then(|tab| {
                    page.panel_of_tab(tab.id()).map(|panel_id| {
                        (
                            TabLocation {
                                page_id: page.id(),
                                panel_id,
                            },
                            tab.id(),
                        )
                    })
                })
        })
    }

    pub fn tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.pages.iter().find_map(|p| p.tab(tab_id))
    }

    pub fn tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.pages.iter_mut().find_map(|p| p.tab_mut(tab_id))
    }

    pub fn panel(&self, panel_id: PanelId) -> Option<&Panel> {
        self.pages.iter().find_map(|p| p.panel(panel_id))
    }

    pub fn panel_mut(&mut self, panel_id: PanelId) -> Option<&mut Panel> {
        self.pages.iter_mut().find_map(|p| p.panel_mut(panel_id))
    }

    /// The active panel of the active page
    pub fn active_panel(&self) -> Option<&Panel> {
        self.active_page()?.active_panel()
    }

    /// The active tab of the active panel of the active page
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_panel()?.active_tab()
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        self.active_page_mut()?.active_panel_mut()?.active_tab_mut()
    }

    /// Terminals currently on screen: active tab of every panel of the active page
    pub fn visible_terminal_ids(&self) -> Vec<TerminalId> {
        self.active_page()
            .map(Page::visible_terminal_ids)
            .unwrap_or_default()
    }

    /// Every materialized terminal in the window
    pub fn terminal_ids(&self) -> Vec<TerminalId> {
        self.pages.iter().flat_map(Page::terminal_ids).collect()
    }

    pub fn tab_count(&self) -> usize {
        self.pages.iter().map(Page::tab_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with_pages(n: usize) -> (Window, Vec<PageId>) {
        let mut window = Window::with_single_tab("Tab 1");
        let mut ids = vec![window.active_page_id()];
        for i in 1..n {
            let page = Page::new(format!("Page {}", i + 1), Panel::new(Tab::new("t")));
            ids.push(page.id());
            window.add_page(page);
        }
        (window, ids)
    }

    #[test]
    fn test_last_page_guarded() {
        let (mut window, ids) = window_with_pages(1);
        assert_eq!(window.remove_page(ids[0]).unwrap_err(), ModelError::LastPage);
        assert!(window.force_remove_page(ids[0]).is_some());
        assert!(window.is_empty());
    }

    #[test]
    fn test_remove_active_page_selects_neighbor() {
        let (mut window, ids) = window_with_pages(3);
        window.set_active_page(ids[1]);
        window.remove_page(ids[1]).unwrap();
        assert_eq!(window.active_page_id(), ids[2]);
    }

    #[test]
    fn test_find_tab_across_pages() {
        let (window, ids) = window_with_pages(2);
        let tab_id = window.page(ids[1]).unwrap().tabs()[0].id();
        let location = window.find_tab(tab_id).unwrap();
        assert_eq!(location.page_id, ids[1]);
        assert!(window.find_tab(TabId::new()).is_none());
    }

    #[test]
    fn test_visible_terminals_only_from_active_page() {
        let (mut window, ids) = window_with_pages(2);
        let first_tab = window.page(ids[0]).unwrap().tabs()[0].id();
        let second_tab = window.page(ids[1]).unwrap().tabs()[0].id();
        window.tab_mut(first_tab).unwrap().bind_terminal(TerminalId(1));
        window.tab_mut(second_tab).unwrap().bind_terminal(TerminalId(2));

        assert_eq!(window.visible_terminal_ids(), vec![TerminalId(2)]);
        assert_eq!(window.terminal_ids().len(), 2);
        assert_eq!(
            window.find_terminal(TerminalId(1)).map(|(_, tab)| tab),
            Some(first_tab)
        );
    }

    #[test]
    fn test_move_and_reorder_pages() {
        let (mut window, ids) = window_with_pages(3);
        window.move_page_to(ids[0], 10).unwrap();
        let order: Vec<_> = window.pages().iter().map(Page::id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);

        window.reorder_pages(&ids).unwrap();
        let order: Vec<_> = window.pages().iter().map(Page::id).collect();
        assert_eq!(order, ids);
    }
}
