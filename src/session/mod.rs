//! Session state types for save/restore
//!
//! A session records every window's pages, their split layouts, and each
//! tab's stable id, title and working directory. Restoring rebuilds the
//! hierarchy with the same ids so terminals created afterwards are keyed
//! exactly as before.

pub mod capture;
pub mod restore;
pub mod storage;

pub use capture::capture_window;
pub use restore::{restore_window, validate_cwd};
pub use storage::SessionStore;

use crate::ids::{PageId, PanelId, TabId, WindowId};
use crate::layout::SplitDirection;
use serde::{Deserialize, Serialize};

/// Top-level session state: all windows at the time of save
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Timestamp when the session was saved (RFC 3339)
    pub saved_at: String,
    pub windows: Vec<SessionWindow>,
}

impl SessionState {
    /// Stamp a new state with the current time
    pub fn new(windows: Vec<SessionWindow>) -> Self {
        Self {
            saved_at: chrono::Utc::now().to_rfc3339(),
            windows,
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&SessionWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Insert or replace a window, keeping the position of an existing one
    pub fn upsert_window(&mut self, window: SessionWindow) {
        match self.windows.iter_mut().find(|w| w.id == window.id) {
            Some(existing) => *existing = window,
            None => self.windows.push(window),
        }
    }

    pub fn remove_window(&mut self, id: WindowId) -> bool {
        let before = self.windows.len();
        self.windows.retain(|w| w.id != id);
        self.windows.len() != before
    }
}

/// A single window in the saved session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWindow {
    pub id: WindowId,
    pub pages: Vec<SessionPage>,
    /// Index of the active page
    #[serde(default)]
    pub active_page_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPage {
    pub id: PageId,
    pub title: String,
    pub layout: SessionLayoutNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_panel_id: Option<PanelId>,
}

/// Recursive layout node for session persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionLayoutNode {
    Panel(SessionPanel),
    Split {
        direction: SplitDirection,
        /// Split ratio (0.0-1.0)
        ratio: f32,
        /// First child (top/left)
        first: Box<SessionLayoutNode>,
        /// Second child (bottom/right)
        second: Box<SessionLayoutNode>,
    },
}

impl SessionLayoutNode {
    /// Number of panels in this subtree
    pub fn panel_count(&self) -> usize {
        match self {
            SessionLayoutNode::Panel(_) => 1,
            SessionLayoutNode::Split { first, second, .. } => {
                first.panel_count() + second.panel_count()
            }
        }
    }

    /// Panels in layout order
    pub fn panels(&self) -> Vec<&SessionPanel> {
        match self {
            SessionLayoutNode::Panel(panel) => vec![panel],
            SessionLayoutNode::Split { first, second, .. } => {
                let mut panels = first.panels();
                panels.extend(second.panels());
                panels
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPanel {
    pub id: PanelId,
    pub tabs: Vec<SessionTab>,
    #[serde(default)]
    pub active_tab_index: usize,
}

/// A single tab in a saved session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTab {
    /// Stable id; the restored terminal is created under it
    pub id: TabId,
    pub title: String,
    /// Working directory at save time
    pub cwd: Option<String>,
}

/// Where sessions go when the coordinator's `save_session` effect fires
///
/// Fire-and-forget: implementations log their own failures.
pub trait SessionPersistence: Send + Sync {
    fn save_session(&self, window: &SessionWindow);

    /// The window was closed for good
    fn forget_window(&self, window_id: WindowId);
}

/// Persistence that stores nothing
#[derive(Debug, Default)]
pub struct NullPersistence;

impl SessionPersistence for NullPersistence {
    fn save_session(&self, _window: &SessionWindow) {}

    fn forget_window(&self, _window_id: WindowId) {}
}
