//! Terminal lifecycle: creation, closing, pool modes and layout sync.

use super::Coordinator;
use crate::command::TerminalSpec;
use crate::cwd::NoCwdSource;
use crate::events::TerminalEvent;
use crate::ids::{PageId, TabId, TerminalId};
use crate::layout::PanelBounds;
use crate::model::{Page, Tab};
use crate::pool::TerminalMode;
use crate::session::capture_window;
use std::collections::HashMap;

impl Coordinator {
    /// Give every unmaterialized tab of a page a terminal
    ///
    /// Tabs that already have one are left alone, so calling this twice in a
    /// row creates each terminal once. Returns how many were created.
    pub fn ensure_terminals_for_page(&mut self, page_id: PageId) -> usize {
        let Some(page) = self.window.page(page_id) else {
            log::debug!("ensure_terminals_for_page: page {} not found", page_id);
            return 0;
        };
        let missing = page.unmaterialized_tab_ids();
        if missing.is_empty() {
            return 0;
        }

        self.resolve_layout();
        let created = missing
            .into_iter()
            .filter(|tab_id| self.create_terminal(&TerminalSpec::for_tab(*tab_id)).is_some())
            .count();
        if created > 0 {
            log::debug!("Materialized {} terminals on page {}", created, page_id);
        }
        created
    }

    /// Materialize the active page (after a restore, a pool swap, or a retry)
    pub fn ensure_terminals_for_active_page(&mut self) -> usize {
        self.ensure_terminals_for_page(self.window.active_page_id())
    }

    /// Create the terminal described by `spec` and bind it to its tab
    ///
    /// The start directory is the explicit one, else the directory of the
    /// tab to inherit from, else the registry's best-known path. On failure
    /// the tab stays Pending at that directory for a later retry.
    pub(super) fn create_terminal(&mut self, spec: &TerminalSpec) -> Option<TerminalId> {
        let tab_id = spec.tab_id;
        let cwd = match (&spec.cwd, spec.inherit_cwd_from) {
            (Some(cwd), _) => cwd.clone(),
            (None, Some(source)) => self.working_directory(source),
            (None, None) => self.registry.best_known_path(tab_id),
        };
        let (cols, rows) = self.grid_size_for(tab_id);
        self.registry.register_pending(tab_id, Some(cwd.clone()));

        let Some(pool) = self.pool.as_deref_mut() else {
            log::debug!("No pool yet; tab {} stays pending", tab_id);
            return None;
        };
        let created = match spec.command.as_deref() {
            Some(command) => pool.create_terminal(cols, rows, command, Some(&cwd), &spec.env),
            None => pool.create_terminal_with_id(tab_id, cols, rows, Some(&cwd), &spec.env),
        };

        match created {
            Ok(terminal_id) => {
                if let Some(tab) = self.window.tab_mut(tab_id) {
                    tab.bind_terminal(terminal_id);
                }
                self.registry.promote_pending(tab_id, terminal_id);
                let mode = if self.window.visible_terminal_ids().contains(&terminal_id) {
                    TerminalMode::Active
                } else {
                    TerminalMode::Background
                };
                pool.set_mode(terminal_id, mode);
                log::info!(
                    "Created terminal {} for tab {} ({}x{} in {:?})",
                    terminal_id,
                    tab_id,
                    cols,
                    rows,
                    cwd
                );
                self.events.emit(TerminalEvent::Created {
                    window_id: self.window.id(),
                    tab_id,
                    terminal_id,
                });
                Some(terminal_id)
            }
            Err(err) => {
                log::warn!("Failed to create terminal for tab {}: {}", tab_id, err);
                self.registry.retain_pending(tab_id);
                None
            }
        }
    }

    /// Close terminals whose tabs are gone, forcing busy ones
    pub(super) fn close_terminals(
        &mut self,
        terminal_ids: &[TerminalId],
        owners: &HashMap<TerminalId, TabId>,
    ) {
        let Some(pool) = self.pool.as_deref_mut() else {
            return;
        };
        for &terminal_id in terminal_ids {
            if !pool.close_terminal(terminal_id) {
                log::debug!("Terminal {} busy or gone; forcing close", terminal_id);
                pool.close_terminal_force(terminal_id);
            }
            self.events.emit(TerminalEvent::Closed {
                window_id: self.window.id(),
                tab_id: owners.get(&terminal_id).copied(),
                terminal_id,
            });
        }
    }

    pub(super) fn apply_modes(&mut self, activate: &[TerminalId], deactivate: &[TerminalId]) {
        let Some(pool) = self.pool.as_deref_mut() else {
            return;
        };
        for &id in activate {
            pool.set_mode(id, TerminalMode::Active);
        }
        for &id in deactivate {
            pool.set_mode(id, TerminalMode::Background);
        }
    }

    /// Recompute pool modes from the window alone
    pub(super) fn sync_activation(&mut self) {
        let visible = self.window.visible_terminal_ids();
        let hidden: Vec<TerminalId> = self
            .window
            .terminal_ids()
            .into_iter()
            .filter(|id| !visible.contains(id))
            .collect();
        self.apply_modes(&visible, &hidden);
    }

    /// Recompute every page's panel bounds for the current content area
    pub(super) fn resolve_layout(&mut self) {
        let page_ids: Vec<PageId> = self.window.pages().iter().map(Page::id).collect();
        for page_id in page_ids {
            if let Some(page) = self.window.page_mut(page_id) {
                page.resolve_bounds(self.content_bounds, self.settings.divider_width);
            }
        }
    }

    /// Resize the active page's terminals to their panels
    pub(super) fn resize_visible_terminals(&mut self) {
        let Some(pool) = self.pool.as_deref_mut() else {
            return;
        };
        let Some(page) = self.window.active_page() else {
            return;
        };
        let (cell_width, cell_height) = (self.settings.cell_width, self.settings.cell_height);
        for panel in page.panels() {
            let bounds = panel.bounds();
            if bounds.is_empty() {
                continue;
            }
            let (cols, rows) = bounds.grid_size(cell_width, cell_height);
            for terminal_id in panel.terminal_ids() {
                pool.resize_terminal(terminal_id, cols, rows);
            }
        }
    }

    /// Grid size of the panel holding a tab, or the configured default
    fn grid_size_for(&self, tab_id: TabId) -> (u16, u16) {
        self.window
            .find_tab(tab_id)
            .and_then(|location| self.window.panel(location.panel_id))
            .map(|panel| panel.bounds())
            .filter(|bounds| !bounds.is_empty())
            .map(|bounds| bounds.grid_size(self.settings.cell_width, self.settings.cell_height))
            .unwrap_or((self.settings.cols, self.settings.rows))
    }

    /// The window's content area changed size
    pub fn set_content_bounds(&mut self, bounds: PanelBounds) {
        self.content_bounds = bounds;
        self.resolve_layout();
        self.resize_visible_terminals();
        self.scheduler.request();
    }

    /// A visited page no longer needs attention
    pub(super) fn clear_active_page_attention(&mut self) {
        if let Some(page) = self.window.active_page_mut()
            && page.needs_attention()
        {
            page.set_needs_attention(false);
            let page_id = page.id();
            self.scheduler
                .surface()
                .set_page_needs_attention(page_id, false);
        }
    }

    /// Hand the current window state to persistence
    pub fn save_session(&self) {
        let snapshot = match self.pool.as_deref() {
            Some(pool) => capture_window(&self.window, &self.registry, pool),
            None => capture_window(&self.window, &self.registry, &NoCwdSource),
        };
        self.persistence.save_session(&snapshot);
    }

    /// Close every terminal of the window, which is going away
    ///
    /// Session state for the window is forgotten; buffered attachments are
    /// destroyed.
    pub fn shutdown(&mut self) {
        self.scheduler.cancel_pending();
        let owners = self.terminal_owners();
        let terminal_ids: Vec<TerminalId> = owners.keys().copied().collect();
        if let Some(pool) = self.pool.as_deref_mut() {
            for &terminal_id in &terminal_ids {
                pool.close_terminal_force(terminal_id);
            }
        }
        for terminal_id in terminal_ids {
            self.events.emit(TerminalEvent::Closed {
                window_id: self.window.id(),
                tab_id: owners.get(&terminal_id).copied(),
                terminal_id,
            });
        }
        let tab_ids: Vec<TabId> = self
            .window
            .pages()
            .iter()
            .flat_map(|page| page.tabs())
            .map(Tab::id)
            .collect();
        for tab_id in tab_ids {
            if let Some(tab) = self.window.tab_mut(tab_id) {
                tab.unbind_terminal();
            }
            self.registry.remove(tab_id);
        }
        self.destroy_pending_attachments();
        self.persistence.forget_window(self.window.id());
        log::info!("Window {} shut down", self.window.id());
    }
}
