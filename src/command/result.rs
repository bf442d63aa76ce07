//! What a command did, and what the caller still has to do.

use crate::ids::{PageId, PanelId, TabId, TerminalId};
use crate::layout::{LayoutError, LayoutPath};
use crate::model::{ModelError, Tab};
use std::path::PathBuf;
use thiserror::Error;

/// Side effects a command requires, declared but not performed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    /// Panel bounds must be recomputed (and terminals resized)
    pub sync_layout: bool,
    pub render: bool,
    pub save_session: bool,
    /// Observers of the window structure (tab bar, remote control) must refresh
    pub update_trigger: bool,
}

impl Effects {
    /// Tree shape changed: everything
    pub fn structural() -> Self {
        Self {
            sync_layout: true,
            render: true,
            save_session: true,
            update_trigger: true,
        }
    }

    /// Membership or order changed but no bounds moved
    pub fn membership() -> Self {
        Self {
            sync_layout: false,
            render: true,
            save_session: true,
            update_trigger: true,
        }
    }

    /// Only the active selection changed
    pub fn selection() -> Self {
        Self {
            sync_layout: false,
            render: true,
            save_session: true,
            update_trigger: false,
        }
    }

    pub fn any(&self) -> bool {
        self.sync_layout || self.render || self.save_session || self.update_trigger
    }
}

/// A terminal the caller must create for a tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSpec {
    pub tab_id: TabId,
    /// Explicit start directory
    pub cwd: Option<PathBuf>,
    pub command: Option<String>,
    pub env: Vec<(String, String)>,
    /// Without an explicit `cwd`, start where this tab's terminal currently is
    pub inherit_cwd_from: Option<TabId>,
}

impl TerminalSpec {
    pub fn for_tab(tab_id: TabId) -> Self {
        Self {
            tab_id,
            cwd: None,
            command: None,
            env: Vec::new(),
            inherit_cwd_from: None,
        }
    }
}

/// Which step of the smart-close cascade ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartCloseOutcome {
    ClosedTab(TabId),
    ClosedPanel(PanelId),
    ClosedPage(PageId),
    /// Nothing left to close inside the window; the window itself should go
    ShouldCloseWindow,
}

/// Why a command was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("tab {0} not found")]
    TabNotFound(TabId),
    #[error("panel {0} not found")]
    PanelNotFound(PanelId),
    #[error("page {0} not found")]
    PageNotFound(PageId),
    #[error("cannot close the last tab of the window")]
    CannotCloseLastTab,
    #[error("cannot close the last panel of the window")]
    CannotCloseLastPanel,
    #[error("cannot close the last page of the window")]
    CannotCloseLastPage,
    #[error("window has no active page")]
    NoActivePage,
    #[error("page has no active panel")]
    NoActivePanel,
    #[error("no page at index {0}")]
    PageIndexOutOfRange(usize),
    #[error("tab {0} is already in this window")]
    DuplicateTab(TabId),
    #[error("order does not list every member exactly once")]
    InvalidOrder,
    #[error("no split at layout path {0}")]
    InvalidLayoutPath(LayoutPath),
    #[error("panel {0} cannot be placed there")]
    InvalidMove(PanelId),
}

impl CommandError {
    /// Boundary conditions that are normal no-ops rather than failures
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            CommandError::CannotCloseLastTab
                | CommandError::CannotCloseLastPanel
                | CommandError::CannotCloseLastPage
        )
    }
}

impl From<LayoutError> for CommandError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::PanelNotFound(id) => CommandError::PanelNotFound(id),
            LayoutError::DuplicatePanel(id) | LayoutError::SelfTarget(id) => {
                CommandError::InvalidMove(id)
            }
            LayoutError::LastPanel => CommandError::CannotCloseLastPanel,
            LayoutError::InvalidPath(path) => CommandError::InvalidLayoutPath(path),
        }
    }
}

impl From<ModelError> for CommandError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::TabNotFound(id) => CommandError::TabNotFound(id),
            ModelError::PanelNotFound(id) => CommandError::PanelNotFound(id),
            ModelError::PageNotFound(id) => CommandError::PageNotFound(id),
            ModelError::LastTab => CommandError::CannotCloseLastTab,
            ModelError::LastPanel => CommandError::CannotCloseLastPanel,
            ModelError::LastPage => CommandError::CannotCloseLastPage,
            ModelError::DuplicateTab(id) => CommandError::DuplicateTab(id),
            ModelError::InvalidOrder => CommandError::InvalidOrder,
            ModelError::Layout(err) => err.into(),
        }
    }
}

/// Outcome of one command
///
/// Produced once and consumed once by the coordinator; the lists say which
/// terminals to create, close, activate and background, and `effects`
/// says what else has to happen.
#[derive(Debug, Default)]
#[must_use]
pub struct CommandResult {
    pub success: bool,
    pub error: Option<CommandError>,
    /// Visible terminals: set to active mode
    pub terminals_to_activate: Vec<TerminalId>,
    /// Materialized but off screen: set to background mode
    pub terminals_to_deactivate: Vec<TerminalId>,
    pub terminals_to_create: Vec<TerminalSpec>,
    pub terminals_to_close: Vec<TerminalId>,
    /// Panels removed, directly or because their last tab went away
    pub removed_panel_ids: Vec<PanelId>,
    /// Pages removed, directly or because their last panel went away
    pub removed_page_ids: Vec<PageId>,
    pub created_tab_id: Option<TabId>,
    pub created_panel_id: Option<PanelId>,
    pub created_page_id: Option<PageId>,
    /// Tabs taken out of the window with their terminal binding intact
    pub released_tabs: Vec<Tab>,
    pub smart_close: Option<SmartCloseOutcome>,
    pub effects: Effects,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure(error: CommandError) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_errors() {
        assert!(CommandError::CannotCloseLastPage.is_expected());
        assert!(!CommandError::TabNotFound(TabId::new()).is_expected());
        assert!(!CommandError::NoActivePanel.is_expected());
    }

    #[test]
    fn test_model_error_mapping() {
        let path = LayoutPath::root();
        assert_eq!(
            CommandError::from(ModelError::Layout(LayoutError::InvalidPath(path.clone()))),
            CommandError::InvalidLayoutPath(path)
        );
        assert_eq!(
            CommandError::from(ModelError::LastTab),
            CommandError::CannotCloseLastTab
        );
    }
}
