//! UI-facing wrappers: each builds one `WindowCommand` and runs `perform`.

use super::Coordinator;
use crate::command::{
    CloseScope, PageCommand, PageTarget, PanelCommand, SmartCloseOutcome, TabCommand, TabConfig,
    WindowCommand,
};
use crate::ids::{PageId, PanelId, TabId};
use crate::layout::{Edge, LayoutPath};
use std::path::PathBuf;

impl Coordinator {
    /// Tab bar click
    pub fn select_tab(&mut self, tab_id: TabId) -> bool {
        self.perform(TabCommand::Switch { tab_id }).is_ok()
    }

    /// New tab in the active panel, inheriting the active tab's directory
    pub fn add_tab(&mut self) -> Option<TabId> {
        self.perform(TabCommand::Add { panel_id: None }).created_tab_id
    }

    pub fn add_tab_with_config(
        &mut self,
        panel_id: Option<PanelId>,
        config: TabConfig,
    ) -> Option<TabId> {
        self.perform(TabCommand::AddWithConfig { panel_id, config })
            .created_tab_id
    }

    pub fn close_tab(&mut self, tab_id: TabId) -> bool {
        let Some(location) = self.window.find_tab(tab_id) else {
            log::debug!("close_tab: tab {} not in window {}", tab_id, self.id());
            return false;
        };
        self.perform(TabCommand::Close {
            panel_id: location.panel_id,
            scope: CloseScope::Single(tab_id),
        })
        .is_ok()
    }

    /// Close every tab of the panel except `keep`
    pub fn close_other_tabs(&mut self, keep: TabId) -> bool {
        let Some(location) = self.window.find_tab(keep) else {
            return false;
        };
        self.perform(TabCommand::Close {
            panel_id: location.panel_id,
            scope: CloseScope::Others { keep },
        })
        .is_ok()
    }

    /// Split the active panel; the new panel's tab starts in `cwd` if given
    pub fn split_panel(&mut self, edge: Edge, cwd: Option<PathBuf>) -> Option<PanelId> {
        self.perform(PanelCommand::Split {
            panel_id: None,
            edge,
            config: cwd.map(TabConfig::with_cwd),
        })
        .created_panel_id
    }

    pub fn close_panel(&mut self, panel_id: PanelId) -> bool {
        self.perform(PanelCommand::Close { panel_id }).is_ok()
    }

    /// Panel click
    pub fn set_active_panel(&mut self, panel_id: PanelId) -> bool {
        self.perform(PanelCommand::SetActive { panel_id }).is_ok()
    }

    /// Divider drag on the active page
    pub fn set_split_ratio(&mut self, path: LayoutPath, ratio: f32) -> bool {
        self.perform(PanelCommand::SetRatio {
            page_id: None,
            path,
            ratio,
        })
        .is_ok()
    }

    pub fn switch_page(&mut self, target: PageTarget) -> bool {
        self.perform(PageCommand::Switch(target)).is_ok()
    }

    pub fn new_page(&mut self, title: Option<String>) -> Option<PageId> {
        self.perform(PageCommand::Create {
            title,
            config: None,
        })
        .created_page_id
    }

    pub fn close_page(&mut self, page_id: PageId) -> bool {
        self.perform(PageCommand::Close(CloseScope::Single(page_id)))
            .is_ok()
    }

    pub fn rename_page(&mut self, page_id: PageId, title: impl Into<String>) -> bool {
        self.perform(PageCommand::Rename {
            page_id,
            title: title.into(),
        })
        .is_ok()
    }

    /// Close tab, else panel, else page
    ///
    /// `ShouldCloseWindow` means nothing was changed and the caller should
    /// close the window itself.
    pub fn smart_close(&mut self) -> Option<SmartCloseOutcome> {
        let result = self.perform(WindowCommand::SmartClose);
        if let Some(err) = &result.error {
            log::debug!("smart close on window {} refused: {}", self.id(), err);
        }
        result.smart_close
    }
}
