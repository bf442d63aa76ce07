//! Installing, replacing and feeding the window's terminal pool.

use super::Coordinator;
use crate::command::{CommandError, CommandResult, TabCommand};
use crate::events::TerminalEvent;
use crate::ids::{PanelId, TabId, TerminalId};
use crate::model::Tab;
use crate::pool::{DetachedTerminal, TerminalPool};
use std::collections::HashMap;
use std::path::PathBuf;

/// How a detached terminal ended up after being handed to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Running in this window's pool under a new id
    Attached(TerminalId),
    /// Buffered until the pool is installed
    Buffered,
    /// No usable handle; the tab gets a fresh terminal in its old directory
    Recreated,
}

/// Result of adopting a tab from another window
#[derive(Debug)]
pub struct Adoption {
    /// Result of the insert command
    pub result: CommandResult,
    pub outcome: AttachOutcome,
    /// Handle this pool could not attach, to be destroyed by the pool that made it
    pub rejected: Option<DetachedTerminal>,
}

impl Coordinator {
    /// Give a deferred coordinator its pool
    ///
    /// Buffered attachments are drained here, exactly once: each handle is
    /// attached to its tab, and handles whose tab no longer exists are
    /// destroyed and reported. Then the active page is materialized.
    pub fn install_pool(&mut self, pool: Box<dyn TerminalPool>) {
        if self.pool.is_some() {
            log::warn!(
                "install_pool on window {} that already has a pool; replacing it",
                self.window.id()
            );
            drop(self.replace_pool(pool));
            return;
        }
        self.pool = Some(pool);

        for handle in self.pending_attachments.take_retired() {
            self.destroy_detached(handle);
        }
        for (tab_id, handle) in self.pending_attachments.drain() {
            let claimed = self
                .window
                .tab(tab_id)
                .is_some_and(|tab| !tab.is_materialized());
            if claimed {
                self.attach_to_tab(tab_id, handle);
            } else {
                log::error!(
                    "Unclaimed detached terminal {} for tab {}; destroying it",
                    handle.origin_id(),
                    tab_id
                );
                if let Some(pool) = self.pool.as_deref_mut() {
                    pool.destroy_detached(handle);
                }
            }
        }

        self.refresh_after_pool_change();
    }

    /// Hand this window a detached terminal for one of its tabs
    ///
    /// Without a pool the handle is buffered. With one it is attached now.
    pub fn accept_detached(&mut self, tab_id: TabId, handle: DetachedTerminal) -> AttachOutcome {
        if self.window.tab(tab_id).is_some_and(Tab::is_materialized) {
            log::warn!(
                "Tab {} already has a terminal; destroying incoming terminal {}",
                tab_id,
                handle.origin_id()
            );
            self.destroy_detached(handle);
            return AttachOutcome::Recreated;
        }
        if self.pool.is_none() {
            self.registry
                .mark_detached(tab_id, handle.cwd().map(|p| p.to_path_buf()));
            if let Some(displaced) = self.pending_attachments.insert(tab_id, handle) {
                log::error!(
                    "Second terminal buffered for tab {}; terminal {} will be destroyed",
                    tab_id,
                    displaced.origin_id()
                );
                self.pending_attachments.retire(displaced);
            }
            return AttachOutcome::Buffered;
        }
        match self.attach_to_tab(tab_id, handle) {
            Some(terminal_id) => AttachOutcome::Attached(terminal_id),
            None => AttachOutcome::Recreated,
        }
    }

    /// Check that a tab coming from another window could be inserted here
    pub fn can_adopt(&self, tab_id: TabId, panel_id: Option<PanelId>) -> Result<(), CommandError> {
        if self.window.find_tab(tab_id).is_some() {
            return Err(CommandError::DuplicateTab(tab_id));
        }
        match panel_id {
            Some(id) if self.window.panel(id).is_none() => Err(CommandError::PanelNotFound(id)),
            Some(_) => Ok(()),
            None => self
                .window
                .active_panel()
                .map(|_| ())
                .ok_or(CommandError::NoActivePanel),
        }
    }

    /// Insert a tab that left another window, resuming its terminal if possible
    ///
    /// With a pool the handle is attached before the tab is inserted so the
    /// tab arrives materialized. Without one the handle is buffered. Without
    /// a handle, or if attaching fails, the tab starts a fresh terminal in
    /// `cwd`.
    pub fn adopt_tab(
        &mut self,
        mut tab: Tab,
        handle: Option<DetachedTerminal>,
        cwd: PathBuf,
        panel_id: Option<PanelId>,
        index: Option<usize>,
    ) -> Adoption {
        let tab_id = tab.id();
        if let Err(err) = self.can_adopt(tab_id, panel_id) {
            log::warn!("Cannot adopt tab {}: {}", tab_id, err);
            return Adoption {
                result: CommandResult::failure(err),
                outcome: AttachOutcome::Recreated,
                rejected: handle,
            };
        }
        tab.unbind_terminal();
        let had_entry = self.registry.contains(tab_id);
        let mut rejected = None;

        let outcome = match (handle, self.pool.as_deref_mut()) {
            (Some(handle), Some(pool)) => match pool.attach_terminal(handle) {
                Ok(terminal_id) => {
                    tab.bind_terminal(terminal_id);
                    self.registry
                        .register_active(tab_id, terminal_id, Some(cwd.clone()));
                    AttachOutcome::Attached(terminal_id)
                }
                Err((err, handle)) => {
                    log::warn!(
                        "Could not attach terminal {} for tab {}: {}; starting a fresh one",
                        handle.origin_id(),
                        tab_id,
                        err
                    );
                    rejected = Some(handle);
                    self.registry.register_pending(tab_id, Some(cwd.clone()));
                    AttachOutcome::Recreated
                }
            },
            (Some(handle), None) => {
                self.registry.mark_detached(tab_id, Some(cwd.clone()));
                if let Some(displaced) = self.pending_attachments.insert(tab_id, handle) {
                    rejected = Some(displaced);
                }
                AttachOutcome::Buffered
            }
            (None, _) => {
                self.registry.register_pending(tab_id, Some(cwd.clone()));
                AttachOutcome::Recreated
            }
        };

        let result = self.perform(TabCommand::Insert {
            panel_id,
            tab,
            index,
        });
        if result.is_ok() {
            if let AttachOutcome::Attached(terminal_id) = outcome {
                log::info!("Adopted tab {} with terminal {}", tab_id, terminal_id);
                self.events.emit(TerminalEvent::Attached {
                    window_id: self.window.id(),
                    tab_id,
                    terminal_id,
                });
            }
        } else {
            log::error!("Adopting tab {} failed; its terminal is closed", tab_id);
            if let AttachOutcome::Attached(terminal_id) = outcome
                && let Some(pool) = self.pool.as_deref_mut()
            {
                pool.close_terminal_force(terminal_id);
            }
            if let Some(handle) = self.pending_attachments.remove(tab_id) {
                rejected = Some(handle);
            }
            if !had_entry {
                self.registry.remove(tab_id);
            }
        }

        Adoption {
            result,
            outcome,
            rejected,
        }
    }

    /// Attach `handle` and bind the result to `tab_id`
    ///
    /// On failure the tab is left Pending at the handle's directory.
    fn attach_to_tab(&mut self, tab_id: TabId, handle: DetachedTerminal) -> Option<TerminalId> {
        let cwd = handle.cwd().map(|p| p.to_path_buf());
        let pool = self.pool.as_deref_mut()?;
        match pool.attach_terminal(handle) {
            Ok(terminal_id) => {
                if let Some(tab) = self.window.tab_mut(tab_id) {
                    tab.bind_terminal(terminal_id);
                }
                // Detached -> Active, keeping the directory the handle carried
                self.registry.mark_detached(tab_id, cwd);
                self.registry.reattach_terminal(tab_id, terminal_id);
                log::info!("Attached terminal {} to tab {}", terminal_id, tab_id);
                self.events.emit(TerminalEvent::Attached {
                    window_id: self.window.id(),
                    tab_id,
                    terminal_id,
                });
                Some(terminal_id)
            }
            Err((err, handle)) => {
                log::warn!(
                    "Could not attach terminal {} to tab {}: {}; starting a fresh one",
                    handle.origin_id(),
                    tab_id,
                    err
                );
                pool.destroy_detached(handle);
                self.registry.register_pending(tab_id, cwd);
                None
            }
        }
    }

    /// Swap the window's pool for another, carrying live terminals across
    ///
    /// Every materialized terminal is detached from the old pool and
    /// attached to the new one. Tabs whose terminal does not make it get a
    /// fresh terminal at their last known directory when their page is
    /// shown. The old pool is returned to the caller.
    pub fn replace_pool(
        &mut self,
        mut new_pool: Box<dyn TerminalPool>,
    ) -> Option<Box<dyn TerminalPool>> {
        let Some(mut old_pool) = self.pool.take() else {
            self.install_pool(new_pool);
            return None;
        };

        let snapshot = self
            .registry
            .capture_before_pool_transition(&*old_pool);
        let bound: Vec<(TabId, TerminalId)> = self
            .window
            .pages()
            .iter()
            .flat_map(|page| page.tabs())
            .filter_map(|tab| tab.terminal_id().map(|id| (tab.id(), id)))
            .collect();

        let mut mapping = HashMap::new();
        for &(tab_id, old_id) in &bound {
            let Some(handle) = old_pool.detach_terminal(old_id) else {
                log::warn!("Terminal {} of tab {} could not be detached", old_id, tab_id);
                continue;
            };
            match new_pool.attach_terminal(handle) {
                Ok(new_id) => {
                    mapping.insert(old_id, new_id);
                }
                Err((err, handle)) => {
                    log::warn!("Terminal {} lost in pool swap: {}", old_id, err);
                    old_pool.destroy_detached(handle);
                }
            }
        }

        for &(tab_id, old_id) in &bound {
            if let Some(tab) = self.window.tab_mut(tab_id) {
                match mapping.get(&old_id) {
                    Some(&new_id) => {
                        tab.bind_terminal(new_id);
                    }
                    None => {
                        tab.unbind_terminal();
                    }
                }
            }
        }
        let unmapped = self
            .registry
            .restore_after_pool_transition(snapshot, &mapping);

        log::info!(
            "Pool swap on window {}: {} terminals moved, {} will be recreated",
            self.window.id(),
            mapping.len(),
            unmapped.len()
        );
        for &(tab_id, old_id) in &bound {
            if let Some(&terminal_id) = mapping.get(&old_id) {
                self.events.emit(TerminalEvent::Attached {
                    window_id: self.window.id(),
                    tab_id,
                    terminal_id,
                });
            }
        }

        self.pool = Some(new_pool);
        self.refresh_after_pool_change();
        Some(old_pool)
    }

    /// Take a tab's terminal out of the pool, leaving the tab unbound
    pub(crate) fn detach_tab_terminal(&mut self, tab: &mut Tab) -> Option<DetachedTerminal> {
        let terminal_id = tab.unbind_terminal()?;
        let handle = self.pool.as_deref_mut()?.detach_terminal(terminal_id);
        if handle.is_none() {
            log::warn!("Terminal {} of tab {} could not be detached", terminal_id, tab.id());
        }
        self.events.emit(TerminalEvent::Detached {
            window_id: self.window.id(),
            tab_id: tab.id(),
        });
        handle
    }

    /// Destroy a handle this window's pool produced
    pub(crate) fn destroy_detached(&mut self, handle: DetachedTerminal) {
        match self.pool.as_deref_mut() {
            Some(pool) => pool.destroy_detached(handle),
            None => {
                log::error!(
                    "No pool to destroy detached terminal {}; dropping it",
                    handle.origin_id()
                );
                drop(handle);
            }
        }
    }

    /// Destroy whatever is still buffered (the window is closing)
    pub(super) fn destroy_pending_attachments(&mut self) {
        for handle in self.pending_attachments.take_retired() {
            self.destroy_detached(handle);
        }
        for (tab_id, handle) in self.pending_attachments.drain() {
            log::error!(
                "Destroying unclaimed terminal {} for tab {}",
                handle.origin_id(),
                tab_id
            );
            self.destroy_detached(handle);
        }
    }

    fn refresh_after_pool_change(&mut self) {
        self.ensure_terminals_for_active_page();
        self.sync_activation();
        self.resolve_layout();
        self.resize_visible_terminals();
        self.scheduler.request();
    }
}
