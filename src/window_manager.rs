//! Multi-window manager
//!
//! `WindowManager` owns every window's [`Coordinator`] by [`WindowId`] and is
//! the collaborator cross-window operations go through: moving a tab to
//! another window (or to a window of its own), restoring a saved session,
//! and closing windows when their last tab is gone.

use crate::command::{CommandError, SmartCloseOutcome};
use crate::coordinator::{AttachOutcome, Collaborators, Coordinator, CoordinatorSettings};
use crate::cwd::WorkingDirectoryRegistry;
use crate::ids::{PanelId, TabId, WindowId};
use crate::migration::{self, ReleasedTab};
use crate::model::{Page, Panel, Window};
use crate::pool::TerminalPool;
use crate::session::{SessionState, restore_window};
use std::collections::HashMap;
use std::path::PathBuf;
use termdeck_config::Config;
use thiserror::Error;

/// Builds the terminal pool for a new window
pub type PoolFactory = Box<dyn FnMut(WindowId) -> Box<dyn TerminalPool>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("window {0} not found")]
    WindowNotFound(WindowId),
    #[error("tab {0} is not in any window")]
    TabNotFound(TabId),
    #[error("tab {0} is already in window {1}")]
    SameWindow(TabId, WindowId),
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Owner of all windows
pub struct WindowManager {
    windows: HashMap<WindowId, Coordinator>,
    /// Creation order, for listing and fallbacks
    order: Vec<WindowId>,
    settings: CoordinatorSettings,
    /// Fallback directory for every window's registry
    home: PathBuf,
    collaborators: Collaborators,
    pool_factory: PoolFactory,
    /// Set once the last window has closed
    should_exit: bool,
}

impl WindowManager {
    pub fn new(
        settings: CoordinatorSettings,
        home: impl Into<PathBuf>,
        collaborators: Collaborators,
        pool_factory: PoolFactory,
    ) -> Self {
        Self {
            windows: HashMap::new(),
            order: Vec::new(),
            settings,
            home: home.into(),
            collaborators,
            pool_factory,
            should_exit: false,
        }
    }

    pub fn from_config(
        config: &Config,
        collaborators: Collaborators,
        pool_factory: PoolFactory,
    ) -> Self {
        Self::new(
            CoordinatorSettings::from_config(config),
            config.fallback_cwd(),
            collaborators,
            pool_factory,
        )
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    /// Window ids in creation order
    pub fn window_ids(&self) -> &[WindowId] {
        &self.order
    }

    pub fn get(&self, window_id: WindowId) -> Option<&Coordinator> {
        self.windows.get(&window_id)
    }

    pub fn get_mut(&mut self, window_id: WindowId) -> Option<&mut Coordinator> {
        self.windows.get_mut(&window_id)
    }

    /// Window currently holding a tab
    pub fn find_tab(&self, tab_id: TabId) -> Option<WindowId> {
        self.order.iter().copied().find(|id| {
            self.windows
                .get(id)
                .is_some_and(|c| c.window().find_tab(tab_id).is_some())
        })
    }

    /// Window currently holding a panel
    pub fn find_panel(&self, panel_id: PanelId) -> Option<WindowId> {
        self.order.iter().copied().find(|id| {
            self.windows
                .get(id)
                .is_some_and(|c| c.window().find_panel(panel_id).is_some())
        })
    }

    /// Open a window with one page, one panel and one tab
    pub fn create_window(&mut self) -> WindowId {
        let window = Window::with_single_tab("Tab 1");
        self.open(window, WorkingDirectoryRegistry::new(self.home.clone()))
    }

    /// Take over an already-built coordinator
    pub fn insert(&mut self, coordinator: Coordinator) -> WindowId {
        let window_id = coordinator.id();
        if self.windows.insert(window_id, coordinator).is_none() {
            self.order.push(window_id);
        } else {
            log::warn!("Window {} replaced an existing coordinator", window_id);
        }
        self.should_exit = false;
        window_id
    }

    fn open(&mut self, window: Window, registry: WorkingDirectoryRegistry) -> WindowId {
        let pool = (self.pool_factory)(window.id());
        let coordinator = Coordinator::new(
            window,
            registry,
            pool,
            self.collaborators.clone(),
            self.settings.clone(),
        );
        let window_id = self.insert(coordinator);
        log::info!(
            "Opened window {} (windows: {})",
            window_id,
            self.windows.len()
        );
        window_id
    }

    /// Close a window and every terminal in it
    pub fn close_window(&mut self, window_id: WindowId) -> bool {
        let Some(mut coordinator) = self.windows.remove(&window_id) else {
            return false;
        };
        self.order.retain(|id| *id != window_id);
        coordinator.shutdown();
        log::info!(
            "Closed window {} (remaining: {})",
            window_id,
            self.windows.len()
        );
        if self.windows.is_empty() {
            log::info!("Last window closed");
            self.should_exit = true;
        }
        true
    }

    /// Smart close in one window, closing the window when nothing else is left
    pub fn smart_close(&mut self, window_id: WindowId) -> Option<SmartCloseOutcome> {
        let outcome = self.windows.get_mut(&window_id)?.smart_close();
        if outcome == Some(SmartCloseOutcome::ShouldCloseWindow) {
            self.close_window(window_id);
        }
        outcome
    }

    /// Drain every window's pool events; windows whose last shell exited close
    pub fn handle_pool_events(&mut self) -> Vec<WindowId> {
        let finished: Vec<WindowId> = self
            .order
            .iter()
            .copied()
            .filter(|id| {
                self.windows
                    .get_mut(id)
                    .is_some_and(Coordinator::handle_pool_events)
            })
            .collect();
        for &window_id in &finished {
            self.close_window(window_id);
        }
        finished
    }

    /// Move a tab, live terminal included, into another window
    pub fn move_tab(
        &mut self,
        tab_id: TabId,
        to: WindowId,
        panel_id: Option<PanelId>,
        index: Option<usize>,
    ) -> Result<AttachOutcome, ManagerError> {
        let from = self
            .find_tab(tab_id)
            .ok_or(ManagerError::TabNotFound(tab_id))?;
        if from == to {
            return Err(ManagerError::SameWindow(tab_id, to));
        }
        let [Some(source), Some(dest)] = self.windows.get_disjoint_mut([&from, &to]) else {
            return Err(ManagerError::WindowNotFound(to));
        };
        Ok(migration::move_tab_to_window(
            source, dest, tab_id, panel_id, index,
        )?)
    }

    /// Give a tab a window of its own
    ///
    /// The new window's pool is built after the tab has left its old window,
    /// so the live terminal waits in the new window's attachment buffer
    /// until the pool is installed.
    pub fn move_tab_to_new_window(&mut self, tab_id: TabId) -> Result<WindowId, ManagerError> {
        let from = self
            .find_tab(tab_id)
            .ok_or(ManagerError::TabNotFound(tab_id))?;
        let source = self
            .windows
            .get_mut(&from)
            .ok_or(ManagerError::WindowNotFound(from))?;
        let ReleasedTab { tab, handle, cwd } = migration::release_tab(source, tab_id)?;

        let mut registry = WorkingDirectoryRegistry::new(self.home.clone());
        registry.register_pending(tab_id, Some(cwd));
        let window = Window::new(Page::new("Page 1", Panel::new(tab)));
        let mut coordinator = Coordinator::deferred(
            window,
            registry,
            self.collaborators.clone(),
            self.settings.clone(),
        );
        if let Some(handle) = handle {
            coordinator.accept_detached(tab_id, handle);
        }
        let pool = (self.pool_factory)(coordinator.id());
        coordinator.install_pool(pool);

        let window_id = self.insert(coordinator);
        log::info!("Tab {} moved to new window {}", tab_id, window_id);
        Ok(window_id)
    }

    /// Reopen every window of a saved session
    ///
    /// Windows that cannot be rebuilt are skipped. Returns how many opened.
    pub fn restore_session(&mut self, state: &SessionState) -> usize {
        log::info!(
            "Restoring session ({} windows) saved at {}",
            state.windows.len(),
            state.saved_at
        );
        let mut restored = 0;
        for saved in &state.windows {
            if self.windows.contains_key(&saved.id) {
                log::warn!("Session window {} is already open; skipping", saved.id);
                continue;
            }
            let mut registry = WorkingDirectoryRegistry::new(self.home.clone());
            match restore_window(saved, &mut registry) {
                Ok(window) => {
                    self.open(window, registry);
                    restored += 1;
                }
                Err(err) => log::warn!("Failed to restore window {}: {:#}", saved.id, err),
            }
        }
        restored
    }

    /// Persist every window
    pub fn save_all(&self) {
        for window_id in &self.order {
            if let Some(coordinator) = self.windows.get(window_id) {
                coordinator.save_session();
            }
        }
    }

    /// Close every window
    pub fn shutdown(&mut self) {
        for window_id in self.order.clone() {
            self.close_window(window_id);
        }
    }
}

impl std::fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("windows", &self.order)
            .field("should_exit", &self.should_exit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::MemoryTerminalPool;
    use std::time::Duration;

    fn manager() -> WindowManager {
        let mut next_base = 0;
        let settings = CoordinatorSettings {
            render_debounce: Duration::ZERO,
            ..CoordinatorSettings::default()
        };
        WindowManager::new(
            settings,
            "/home/user",
            Collaborators::default(),
            Box::new(move |_: WindowId| -> Box<dyn TerminalPool> {
                next_base += 1000;
                Box::new(MemoryTerminalPool::new().with_first_id(next_base))
            }),
        )
    }

    fn active_tab(manager: &WindowManager, window_id: WindowId) -> TabId {
        manager
            .get(window_id)
            .and_then(|c| c.window().active_tab())
            .map(|t| t.id())
            .unwrap()
    }

    #[test]
    fn test_move_tab_between_windows() {
        let mut manager = manager();
        let a = manager.create_window();
        let b = manager.create_window();
        let moving = manager.get_mut(a).unwrap().add_tab().unwrap();

        let outcome = manager.move_tab(moving, b, None, None).unwrap();
        assert!(matches!(outcome, AttachOutcome::Attached(_)));
        assert_eq!(manager.find_tab(moving), Some(b));
        assert_eq!(manager.get(a).unwrap().window().tab_count(), 1);
        assert_eq!(manager.get(b).unwrap().window().tab_count(), 2);
    }

    #[test]
    fn test_move_last_tab_is_refused() {
        let mut manager = manager();
        let a = manager.create_window();
        let b = manager.create_window();
        let only = active_tab(&manager, a);

        assert_eq!(
            manager.move_tab(only, b, None, None),
            Err(ManagerError::Command(CommandError::CannotCloseLastTab))
        );
        assert_eq!(manager.find_tab(only), Some(a));
    }

    #[test]
    fn test_move_within_same_window_is_refused() {
        let mut manager = manager();
        let a = manager.create_window();
        let tab = active_tab(&manager, a);
        assert_eq!(
            manager.move_tab(tab, a, None, None),
            Err(ManagerError::SameWindow(tab, a))
        );
    }

    #[test]
    fn test_move_tab_to_new_window() {
        let mut manager = manager();
        let a = manager.create_window();
        let moving = manager.get_mut(a).unwrap().add_tab().unwrap();

        let new_window = manager.move_tab_to_new_window(moving).unwrap();
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.find_tab(moving), Some(new_window));
        let coordinator = manager.get(new_window).unwrap();
        assert!(coordinator.window().tab(moving).unwrap().is_materialized());
    }

    #[test]
    fn test_smart_close_closes_window_at_the_end() {
        let mut manager = manager();
        let a = manager.create_window();
        assert_eq!(
            manager.smart_close(a),
            Some(SmartCloseOutcome::ShouldCloseWindow)
        );
        assert!(manager.is_empty());
        assert!(manager.should_exit());
    }
}
