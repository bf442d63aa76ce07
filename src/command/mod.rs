//! Window commands and their pure execution
//!
//! A [`WindowCommand`] is applied to a [`Window`](crate::model::Window) by
//! [`execute`], which mutates the entity model in place and returns a
//! [`CommandResult`] declaring every side effect the caller must perform.
//! Nothing here talks to a pool, a renderer, or storage.

mod execute;
mod page_ops;
mod panel_ops;
mod result;
mod tab_ops;


pub use execute::execute;
pub use result::{CommandError, CommandResult, Effects, SmartCloseOutcome, TerminalSpec};

use crate::ids::{PageId, PanelId, TabId};
use crate::layout::{Edge, LayoutPath};
use crate::model::Tab;
use std::path::PathBuf;

/// Which members of an ordered collection a close affects
///
/// Shared by tab and page closing so the cascade logic is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseScope<Id> {
    /// Just this one
    Single(Id),
    /// Everything except `keep`
    Others { keep: Id },
    /// Everything before `of`
    Left { of: Id },
    /// Everything after `of`
    Right { of: Id },
}

/// How to pick the page to switch to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    Id(PageId),
    Index(usize),
    /// The page after the active one, wrapping
    Next,
    /// The page before the active one, wrapping
    Previous,
}

/// Caller-supplied settings for a new tab's terminal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabConfig {
    /// Start here instead of inheriting the active tab's directory
    pub cwd: Option<PathBuf>,
    /// Run this instead of the default shell
    pub command: Option<String>,
    pub env: Vec<(String, String)>,
    pub title: Option<String>,
}

impl TabConfig {
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub enum TabCommand {
    /// Make a tab active, switching its page and panel as needed
    Switch { tab_id: TabId },
    /// Add a tab to a panel (default: the active panel)
    Add { panel_id: Option<PanelId> },
    AddWithConfig {
        panel_id: Option<PanelId>,
        config: TabConfig,
    },
    Close {
        panel_id: PanelId,
        scope: CloseScope<TabId>,
    },
    /// Take a tab out of the window without closing its terminal
    ///
    /// The tab is handed back in `CommandResult::released_tabs`.
    Remove { tab_id: TabId },
    Reorder {
        panel_id: PanelId,
        order: Vec<TabId>,
    },
    /// Move a tab to any panel of this window; `index: None` appends
    Move {
        tab_id: TabId,
        to_panel: PanelId,
        index: Option<usize>,
    },
    /// Adopt a tab coming from another window
    Insert {
        panel_id: Option<PanelId>,
        tab: Tab,
        index: Option<usize>,
    },
}

#[derive(Debug, Clone)]
pub enum PanelCommand {
    /// Split a panel (default: the active panel), placing a new panel against `edge`
    Split {
        panel_id: Option<PanelId>,
        edge: Edge,
        config: Option<TabConfig>,
    },
    Close { panel_id: PanelId },
    SetActive { panel_id: PanelId },
    /// Resize the split at `path` on a page (default: the active page)
    SetRatio {
        page_id: Option<PageId>,
        path: LayoutPath,
        ratio: f32,
    },
    /// Relocate an existing panel next to another on the same page
    MoveInLayout {
        source: PanelId,
        target: PanelId,
        edge: Edge,
    },
    /// Pull a tab out of its panel into a new panel next to `target`
    SplitWithTab {
        tab_id: TabId,
        target: PanelId,
        edge: Edge,
    },
}

#[derive(Debug, Clone)]
pub enum PageCommand {
    Switch(PageTarget),
    /// Append a page holding one panel with one new tab, and show it
    Create {
        title: Option<String>,
        config: Option<TabConfig>,
    },
    Close(CloseScope<PageId>),
    Reorder { order: Vec<PageId> },
    Move { page_id: PageId, index: usize },
    MoveToEnd { page_id: PageId },
    Rename { page_id: PageId, title: String },
}

/// Every structural change a window accepts
#[derive(Debug, Clone)]
pub enum WindowCommand {
    Tab(TabCommand),
    Panel(PanelCommand),
    Page(PageCommand),
    /// Close the innermost thing that can be closed: tab, then panel, then page
    SmartClose,
}

impl From<TabCommand> for WindowCommand {
    fn from(cmd: TabCommand) -> Self {
        WindowCommand::Tab(cmd)
    }
}

impl From<PanelCommand> for WindowCommand {
    fn from(cmd: PanelCommand) -> Self {
        WindowCommand::Panel(cmd)
    }
}

impl From<PageCommand> for WindowCommand {
    fn from(cmd: PageCommand) -> Self {
        WindowCommand::Page(cmd)
    }
}

impl WindowCommand {
    /// Short name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            WindowCommand::Tab(cmd) => match cmd {
                TabCommand::Switch { .. } => "tab.switch",
                TabCommand::Add { .. } => "tab.add",
                TabCommand::AddWithConfig { .. } => "tab.add_with_config",
                TabCommand::Close { .. } => "tab.close",
                TabCommand::Remove { .. } => "tab.remove",
                TabCommand::Reorder { .. } => "tab.reorder",
                TabCommand::Move { .. } => "tab.move",
                TabCommand::Insert { .. } => "tab.insert",
            },
            WindowCommand::Panel(cmd) => match cmd {
                PanelCommand::Split { .. } => "panel.split",
                PanelCommand::Close { .. } => "panel.close",
                PanelCommand::SetActive { .. } => "panel.set_active",
                PanelCommand::SetRatio { .. } => "panel.set_ratio",
                PanelCommand::MoveInLayout { .. } => "panel.move_in_layout",
                PanelCommand::SplitWithTab { .. } => "panel.split_with_tab",
            },
            WindowCommand::Page(cmd) => match cmd {
                PageCommand::Switch(_) => "page.switch",
                PageCommand::Create { .. } => "page.create",
                PageCommand::Close(_) => "page.close",
                PageCommand::Reorder { .. } => "page.reorder",
                PageCommand::Move { .. } => "page.move",
                PageCommand::MoveToEnd { .. } => "page.move_to_end",
                PageCommand::Rename { .. } => "page.rename",
            },
            WindowCommand::SmartClose => "window.smart_close",
        }
    }
}
